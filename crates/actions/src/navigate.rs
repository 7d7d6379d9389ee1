//! Highlight cycling and tree navigation.

use tabtree_core::types::{position_of, Tab};
use tabtree_core::{CycleScope, Result};
use tabtree_tree::{cycle_index, Forest};
use tracing::debug;

use crate::identity::host_of;
use crate::manager::TabManager;

/// Positions `next-item` / `previous-item` cycle through, left to right.
pub fn cycle_scope(tabs: &[Tab], active: usize, scope: CycleScope) -> Vec<usize> {
    match scope {
        CycleScope::Window => (0..tabs.len()).collect(),
        CycleScope::Tree => Forest::new(tabs).tree_of(active),
        CycleScope::Group => {
            let group = tabs[active].group_id;
            (0..tabs.len()).filter(|&i| tabs[i].group_id == group).collect()
        }
    }
}

/// Steps `offset` places from `active` within `scope`. `None` when
/// `active` is not part of the scope or the scope is empty.
pub fn step_within(scope: &[usize], active: usize, offset: isize) -> Option<usize> {
    let pos = scope.iter().position(|&i| i == active)?;
    cycle_index(scope.len(), pos, offset).map(|k| scope[k])
}

/// Where the read-and-discard dive goes from `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dive {
    /// Highlight the first child and keep the current tab.
    Descend(usize),
    /// Highlight the target and close the current tab.
    Discard(usize),
    /// Close the current tab and let the browser pick the focus.
    CloseOnly,
    /// Last tab of the window: open a new-tab page, then close the current.
    Replace,
    Stay,
}

pub fn plan_dive(tabs: &[Tab], active: usize) -> Dive {
    let forest = Forest::new(tabs);
    if let Some(&child) = forest.children(active).first() {
        return Dive::Descend(child);
    }

    if let Some(parent) = forest.parent(active) {
        let siblings = forest.siblings(active);
        let right = siblings.iter().copied().find(|&i| i > active);
        let left = siblings.iter().copied().filter(|&i| i < active).max();
        return Dive::Discard(right.or(left).unwrap_or(parent));
    }

    if tabs.len() > 1 {
        return Dive::CloseOnly;
    }

    let on_new_tab = tabs[active]
        .effective_url()
        .and_then(host_of)
        .is_some_and(|host| host == "newtab");
    if on_new_tab {
        Dive::Stay
    } else {
        Dive::Replace
    }
}

impl TabManager {
    pub async fn cycle_highlight(&self, offset: isize) -> Result<()> {
        let Some((tabs, active)) = self.snapshot_with_active().await? else {
            return Ok(());
        };
        let scope = cycle_scope(&tabs, active, self.config.navigation.cycle_scope);
        let Some(target) = step_within(&scope, active, offset) else {
            return Ok(());
        };
        debug!(from = active, to = target, scope = ?self.config.navigation.cycle_scope, "Cycling highlight");
        self.highlight_with_marks(&tabs, target).await
    }

    pub async fn cycle_siblings(&self, offset: isize) -> Result<()> {
        let Some((tabs, active)) = self.snapshot_with_active().await? else {
            return Ok(());
        };
        let siblings = Forest::new(&tabs).siblings(active);
        let Some(target) = step_within(&siblings, active, offset) else {
            return Ok(());
        };
        self.highlight_with_marks(&tabs, target).await
    }

    pub async fn next_tab(&self) -> Result<()> {
        let Some((tabs, active)) = self.snapshot_with_active().await? else {
            return Ok(());
        };
        let Some(current) = tabs[active].id else {
            return Ok(());
        };

        let dive = plan_dive(&tabs, active);
        debug!(?dive, tab_id = current, "Diving");
        match dive {
            Dive::Descend(child) => self.drive_highlight(&tabs, &[child]).await,
            Dive::Discard(target) => {
                self.drive_highlight(&tabs, &[target]).await?;
                self.close_each(&[current]).await.map(|_| ())
            }
            Dive::CloseOnly => self.close_each(&[current]).await.map(|_| ()),
            Dive::Replace => {
                self.host.create_tab(None, None, true).await?;
                self.close_each(&[current]).await.map(|_| ())
            }
            Dive::Stay => Ok(()),
        }
    }

    /// Makes `target` active while keeping every marked tab highlighted.
    async fn highlight_with_marks(&self, tabs: &[Tab], target: usize) -> Result<()> {
        let marks = self.marks.get().await?;
        let mut indices = vec![target];
        indices.extend(
            marks
                .iter()
                .filter_map(|&id| position_of(tabs, id))
                .filter(|&i| i != target),
        );
        self.drive_highlight(tabs, &indices).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::NEW_TAB_URL;
    use crate::testing::{manager_for, manager_with_config, window};
    use tabtree_core::{BrowserHost, Config, GroupId};

    #[test]
    fn test_step_round_trip() {
        let scope = vec![1, 3, 4];
        assert_eq!(step_within(&scope, 4, 1), Some(1));
        assert_eq!(step_within(&scope, 1, -1), Some(4));
        let forward = step_within(&scope, 3, 1).unwrap();
        assert_eq!(step_within(&scope, forward, -1), Some(3));
        assert_eq!(step_within(&scope, 0, 1), None);
        assert_eq!(step_within(&[], 0, 1), None);
    }

    #[test]
    fn test_group_scope_for_ungrouped_tab() {
        let mut tabs = window(&[None, None, None, None]);
        tabs[1].group_id = GroupId::Group(2);
        tabs[2].group_id = GroupId::Group(2);
        assert_eq!(cycle_scope(&tabs, 0, CycleScope::Group), vec![0, 3]);
        assert_eq!(cycle_scope(&tabs, 2, CycleScope::Group), vec![1, 2]);
    }

    #[test]
    fn test_plan_dive() {
        // A <- B, A <- C, D
        let tabs = window(&[None, Some(1), Some(1), None]);
        assert_eq!(plan_dive(&tabs, 0), Dive::Descend(1));
        assert_eq!(plan_dive(&tabs, 1), Dive::Discard(2));
        assert_eq!(plan_dive(&tabs, 2), Dive::Discard(1));
        assert_eq!(plan_dive(&tabs, 3), Dive::CloseOnly);

        let only_child = window(&[None, Some(1)]);
        assert_eq!(plan_dive(&only_child, 1), Dive::Discard(0));

        let single = vec![Tab::new(1, 0).with_url("https://example.com/")];
        assert_eq!(plan_dive(&single, 0), Dive::Replace);
        let blank = vec![Tab::new(1, 0).with_url(NEW_TAB_URL)];
        assert_eq!(plan_dive(&blank, 0), Dive::Stay);
    }

    #[tokio::test]
    async fn test_cycle_wraps_and_keeps_marks() {
        let (browser, manager) = manager_for(window(&[None, None, None, None])).await;
        manager.marks().add(&[2]).await.unwrap();

        manager.cycle_highlight(-1).await.unwrap();
        let tabs = browser.query_tabs().await.unwrap();
        assert!(tabs[3].active);
        assert!(tabs[1].highlighted);
        assert!(!tabs[0].highlighted);

        manager.cycle_highlight(1).await.unwrap();
        let tabs = browser.query_tabs().await.unwrap();
        assert!(tabs[0].active);
    }

    #[tokio::test]
    async fn test_cycle_within_tree_scope() {
        let mut config = Config::default();
        config.navigation.cycle_scope = CycleScope::Tree;
        // trees {1, 3} and {2, 4}
        let (browser, manager) = manager_with_config(window(&[None, None, Some(1), Some(2)]), config).await;
        browser.highlight(&[2]).await.unwrap();

        manager.cycle_highlight(1).await.unwrap();
        assert!(browser.query_tabs().await.unwrap()[0].active);
    }

    #[tokio::test]
    async fn test_open_next_cycles_siblings() {
        // A <- B, A <- C, A <- D
        let (browser, manager) = manager_for(window(&[None, Some(1), Some(1), Some(1)])).await;
        browser.highlight(&[3]).await.unwrap();

        manager.cycle_siblings(1).await.unwrap();
        assert!(browser.query_tabs().await.unwrap()[1].active);
        manager.cycle_siblings(-1).await.unwrap();
        assert!(browser.query_tabs().await.unwrap()[3].active);
    }

    #[tokio::test]
    async fn test_next_tab_discards_into_sibling() {
        let (browser, manager) = manager_for(window(&[None, Some(1), Some(1)])).await;
        browser.highlight(&[1]).await.unwrap();

        manager.next_tab().await.unwrap();
        let tabs = browser.query_tabs().await.unwrap();
        assert_eq!(browser.order().await, vec![1, 3]);
        assert!(tabs[1].active);
    }

    #[tokio::test]
    async fn test_next_tab_replaces_last_tab() {
        let tabs = vec![Tab::new(1, 0).with_url("https://example.com/")];
        let (browser, manager) = manager_for(tabs).await;

        manager.next_tab().await.unwrap();
        let tabs = browser.query_tabs().await.unwrap();
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].url.as_deref(), Some(NEW_TAB_URL));
        assert!(tabs[0].active);

        // already on a new-tab page: nothing happens
        manager.next_tab().await.unwrap();
        assert_eq!(browser.order().await, vec![2]);
    }
}
