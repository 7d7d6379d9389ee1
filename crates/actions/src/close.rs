//! Tree-aware close operations.

use tabtree_core::{Result, Tab, TabId};
use tabtree_tree::{cycle_index, Forest};
use tracing::debug;

use crate::manager::{ids_of, TabManager};

/// Visited tabs of the subtree rooted at `active`. Ancestors, siblings and
/// never-viewed descendants stay open.
pub fn visited_subtree(tabs: &[Tab], active: usize) -> Vec<TabId> {
    let forest = Forest::new(tabs);
    let visited = forest
        .reachable(active)
        .into_iter()
        .filter(|&i| tabs[i].was_visited());
    ids_of(tabs, visited)
}

/// Every tab that is not highlighted.
pub fn unhighlighted(tabs: &[Tab]) -> Vec<TabId> {
    ids_of(tabs, (0..tabs.len()).filter(|&i| !tabs[i].highlighted))
}

/// Everything outside the active tab's group when it has one, otherwise
/// everything that is not highlighted.
pub fn outside_active_scope(tabs: &[Tab], active: usize) -> Vec<TabId> {
    let group = tabs[active].group_id;
    if group.is_grouped() {
        ids_of(tabs, (0..tabs.len()).filter(|&i| tabs[i].group_id != group))
    } else {
        unhighlighted(tabs)
    }
}

/// Every tab outside the whole tree containing `active`.
pub fn outside_active_tree(tabs: &[Tab], active: usize) -> Vec<TabId> {
    let tree = Forest::new(tabs).tree_of(active);
    ids_of(tabs, (0..tabs.len()).filter(|i| !tree.contains(i)))
}

impl TabManager {
    pub async fn close_visited_tree(&self) -> Result<()> {
        let Some((tabs, active)) = self.snapshot_with_active().await? else {
            return Ok(());
        };
        let ids = visited_subtree(&tabs, active);
        debug!(?ids, "Closing visited subtree");
        self.close_each(&ids).await.map(|_| ())
    }

    pub async fn close_other_tabs(&self) -> Result<()> {
        let tabs = self.snapshot().await?;
        self.close_each(&unhighlighted(&tabs)).await.map(|_| ())
    }

    pub async fn close_others(&self) -> Result<()> {
        let Some((tabs, active)) = self.snapshot_with_active().await? else {
            return Ok(());
        };
        self.close_each(&outside_active_scope(&tabs, active)).await.map(|_| ())
    }

    pub async fn close_other_trees(&self) -> Result<()> {
        let Some((tabs, active)) = self.snapshot_with_active().await? else {
            return Ok(());
        };
        self.close_each(&outside_active_tree(&tabs, active)).await.map(|_| ())
    }

    /// Steps the highlight one tab left, then closes the tab that was active.
    pub async fn close_tab_backward(&self) -> Result<()> {
        let Some((tabs, active)) = self.snapshot_with_active().await? else {
            return Ok(());
        };
        let Some(current) = tabs[active].id else {
            return Ok(());
        };
        if let Some(target) = cycle_index(tabs.len(), active, -1) {
            self.drive_highlight(&tabs, &[target]).await?;
        }
        self.close_each(&[current]).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{manager_for, window};
    use tabtree_core::{BrowserHost, GroupId};

    #[test]
    fn test_visited_subtree_only_closes_viewed_tabs() {
        // A <- B <- C, only C was viewed
        let mut tabs = window(&[None, Some(1), Some(2)]);
        tabs[2].last_accessed = Some(10.0);
        assert_eq!(visited_subtree(&tabs, 0), vec![3]);
    }

    #[test]
    fn test_close_scopes_differ() {
        // trees {1, 2} and {3, 4}; 1 and 3 highlighted, 1 active
        let mut tabs = window(&[None, Some(1), None, Some(3)]);
        tabs[0].active = true;
        tabs[0].highlighted = true;
        tabs[2].highlighted = true;

        assert_eq!(unhighlighted(&tabs), vec![2, 4]);
        assert_eq!(outside_active_tree(&tabs, 0), vec![3, 4]);
        assert_eq!(outside_active_scope(&tabs, 0), vec![2, 4]);

        tabs[0].group_id = GroupId::Group(7);
        tabs[3].group_id = GroupId::Group(7);
        assert_eq!(outside_active_scope(&tabs, 0), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_close_visited_tree_from_active() {
        let mut tabs = window(&[None, Some(1), Some(2), None]);
        tabs[1].active = true;
        tabs[1].last_accessed = Some(1.0);
        tabs[0].last_accessed = Some(1.0);
        let (browser, manager) = manager_for(tabs).await;

        manager.close_visited_tree().await.unwrap();
        // B closes; unvisited child C and ancestor A stay
        assert_eq!(browser.order().await, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn test_close_other_trees_uses_graph_openers() {
        let tabs = window(&[None, None, None, None]);
        let (browser, manager) = manager_for(tabs).await;
        manager.graph().append(2, 1).await.unwrap();
        manager.graph().append(3, 2).await.unwrap();
        browser.highlight(&[2]).await.unwrap();

        manager.close_other_trees().await.unwrap();
        assert_eq!(browser.order().await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_close_tab_backward() {
        let tabs = window(&[None, None, None]);
        let (browser, manager) = manager_for(tabs).await;
        browser.highlight(&[1]).await.unwrap();

        manager.close_tab_backward().await.unwrap();
        let state = browser.state().await;
        assert_eq!(browser.order().await, vec![1, 3]);
        assert!(state.tabs[0].active);
    }

    #[tokio::test]
    async fn test_closing_prunes_stores() {
        let tabs = window(&[None, Some(1), None]);
        let (browser, manager) = manager_for(tabs).await;
        manager.graph().append(2, 1).await.unwrap();
        manager.marks().add(&[3]).await.unwrap();

        manager.close_other_tabs().await.unwrap();
        assert_eq!(browser.order().await, vec![1]);
        assert!(manager.graph().get().await.unwrap().is_empty());
        assert!(manager.marks().get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_window_is_noop() {
        let (browser, manager) = manager_for(Vec::new()).await;
        manager.close_visited_tree().await.unwrap();
        manager.close_others().await.unwrap();
        manager.close_tab_backward().await.unwrap();
        assert!(browser.mutations().await.is_empty());
    }
}
