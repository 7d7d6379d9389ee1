//! In-process browser window implementing [`BrowserHost`].
//!
//! Mirrors the behaviour the engine relies on from a real browser: indices
//! are always contiguous, highlighting replaces the previous highlight and
//! activates the first index, grouped tabs are kept adjacent, and ids that
//! no longer exist are rejected. Every accepted mutation is recorded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabtree_core::{BrowserHost, Error, GroupId, Result, Tab, TabGroup, TabId};
use tokio::sync::Mutex;
use tracing::debug;

pub const NEW_TAB_URL: &str = "chrome://newtab/";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WindowState {
    #[serde(default)]
    pub tabs: Vec<Tab>,
    #[serde(default)]
    pub groups: Vec<TabGroup>,
    #[serde(default)]
    pub next_tab_id: TabId,
    #[serde(default)]
    pub next_group_id: i32,
}

impl WindowState {
    pub fn from_tabs(tabs: Vec<Tab>) -> Self {
        let mut state = Self {
            tabs,
            ..Default::default()
        };
        state.normalize();
        state
    }

    /// Restores the invariants a hand-written or stale state may violate:
    /// positional indices, exactly one active tab that is highlighted, id
    /// counters ahead of every id in use, and a group entry per group in use.
    pub fn normalize(&mut self) {
        self.reindex();

        let max_tab = self.tabs.iter().filter_map(|t| t.id).max().unwrap_or(0);
        self.next_tab_id = self.next_tab_id.max(max_tab + 1);

        for tab in &mut self.tabs {
            if tab.id.is_none() {
                tab.id = Some(self.next_tab_id);
                self.next_tab_id += 1;
            }
        }

        let in_use: Vec<i32> = self.tabs.iter().filter_map(|t| t.group_id.group()).collect();
        for group in &in_use {
            if !self.groups.iter().any(|g| g.id == *group) {
                self.groups.push(TabGroup {
                    id: *group,
                    ..Default::default()
                });
            }
        }
        self.prune_groups();
        let max_group = self.groups.iter().map(|g| g.id).max().unwrap_or(0);
        self.next_group_id = self.next_group_id.max(max_group + 1);

        let active = self
            .tabs
            .iter()
            .position(|t| t.active)
            .or_else(|| self.tabs.iter().position(|t| t.highlighted))
            .or(if self.tabs.is_empty() { None } else { Some(0) });
        if let Some(active) = active {
            for (i, tab) in self.tabs.iter_mut().enumerate() {
                tab.active = i == active;
            }
            self.tabs[active].highlighted = true;
        }
    }

    fn reindex(&mut self) {
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            tab.index = i;
        }
    }

    fn prune_groups(&mut self) {
        let tabs = &self.tabs;
        self.groups
            .retain(|g| tabs.iter().any(|t| t.group_id == GroupId::Group(g.id)));
    }

    fn position(&self, id: TabId) -> Result<usize> {
        self.tabs
            .iter()
            .position(|t| t.id == Some(id))
            .ok_or(Error::TabNotFound(id))
    }

    fn activate(&mut self, index: usize) {
        let now = chrono::Utc::now().timestamp_millis() as f64;
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            tab.active = i == index;
        }
        if let Some(tab) = self.tabs.get_mut(index) {
            tab.highlighted = true;
            tab.last_accessed = Some(now);
        }
    }

    fn close(&mut self, id: TabId) -> Result<()> {
        let pos = self.position(id)?;
        let removed = self.tabs.remove(pos);
        self.reindex();
        self.prune_groups();

        if removed.active && !self.tabs.is_empty() {
            let next = pos.min(self.tabs.len() - 1);
            for tab in &mut self.tabs {
                tab.highlighted = false;
            }
            self.activate(next);
        }
        Ok(())
    }

    fn move_to(&mut self, id: TabId, index: usize) -> Result<()> {
        let pos = self.position(id)?;
        let tab = self.tabs.remove(pos);
        let target = index.min(self.tabs.len());
        self.tabs.insert(target, tab);
        self.reindex();
        Ok(())
    }

    fn highlight(&mut self, indices: &[usize]) -> Result<()> {
        let Some(&first) = indices.first() else {
            return Err(Error::Host("highlight requires at least one index".to_string()));
        };
        if let Some(bad) = indices.iter().find(|&&i| i >= self.tabs.len()) {
            return Err(Error::NotFound(format!("tab index {}", bad)));
        }
        for tab in &mut self.tabs {
            tab.highlighted = false;
        }
        for &i in indices {
            self.tabs[i].highlighted = true;
        }
        self.activate(first);
        Ok(())
    }

    fn group(&mut self, ids: &[TabId], group: Option<i32>) -> Result<i32> {
        if ids.is_empty() {
            return Err(Error::Host("group requires at least one tab".to_string()));
        }
        for id in ids {
            self.position(*id)?;
        }

        let group_id = match group {
            Some(g) => {
                if !self.groups.iter().any(|existing| existing.id == g) {
                    return Err(Error::NotFound(format!("group {}", g)));
                }
                g
            }
            None => {
                let g = self.next_group_id;
                self.next_group_id += 1;
                self.groups.push(TabGroup {
                    id: g,
                    ..Default::default()
                });
                g
            }
        };

        // Pull the tabs out, then reinsert them as one run: after the
        // group's remaining members, or where the leftmost of them was.
        let leftmost = ids
            .iter()
            .filter_map(|id| self.position(*id).ok())
            .min()
            .unwrap_or(0);
        let mut moving = Vec::with_capacity(ids.len());
        let mut kept = Vec::with_capacity(self.tabs.len());
        let mut removed_before_anchor = 0;
        for (i, tab) in self.tabs.drain(..).enumerate() {
            if tab.id.is_some_and(|id| ids.contains(&id)) {
                if i < leftmost {
                    removed_before_anchor += 1;
                }
                moving.push(tab);
            } else {
                kept.push(tab);
            }
        }
        let anchor = kept
            .iter()
            .rposition(|t| t.group_id == GroupId::Group(group_id))
            .map(|last| last + 1)
            .unwrap_or(leftmost - removed_before_anchor);
        for tab in &mut moving {
            tab.group_id = GroupId::Group(group_id);
        }
        let tail = kept.split_off(anchor.min(kept.len()));
        kept.extend(moving);
        kept.extend(tail);
        self.tabs = kept;
        self.reindex();
        self.prune_groups();
        Ok(group_id)
    }

    fn ungroup(&mut self, ids: &[TabId]) -> Result<()> {
        for id in ids {
            let pos = self.position(*id)?;
            self.tabs[pos].group_id = GroupId::Ungrouped;
        }
        self.prune_groups();
        Ok(())
    }

    fn create(&mut self, opener: Option<TabId>, url: Option<&str>, active: bool) -> Tab {
        let id = self.next_tab_id;
        self.next_tab_id += 1;

        // Link-opened tabs land right after the opener's existing children.
        let at = match opener.and_then(|o| self.position(o).ok()) {
            Some(opener_pos) => {
                let mut at = opener_pos + 1;
                while at < self.tabs.len() && self.tabs[at].opener_tab_id == opener {
                    at += 1;
                }
                at
            }
            None => self.tabs.len(),
        };

        let mut tab = Tab::new(id, at).with_url(url.unwrap_or(NEW_TAB_URL));
        tab.opener_tab_id = opener;
        self.tabs.insert(at, tab);
        self.reindex();

        if active {
            for t in &mut self.tabs {
                t.highlighted = false;
            }
            self.activate(at);
        }
        self.tabs[at].clone()
    }
}

/// Mutations accepted by [`SimulatedBrowser`], in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    Close { ids: Vec<TabId> },
    Move { id: TabId, index: usize },
    Highlight { indices: Vec<usize> },
    Group { ids: Vec<TabId>, group: i32 },
    Ungroup { ids: Vec<TabId> },
    UpdateGroup { group: i32, title: Option<String>, collapsed: Option<bool> },
    Create { id: TabId, opener: Option<TabId> },
}

pub struct SimulatedBrowser {
    state: Mutex<WindowState>,
    log: Mutex<Vec<Mutation>>,
}

impl SimulatedBrowser {
    pub fn new(state: WindowState) -> Self {
        let mut state = state;
        state.normalize();
        Self {
            state: Mutex::new(state),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn from_tabs(tabs: Vec<Tab>) -> Self {
        Self::new(WindowState::from_tabs(tabs))
    }

    pub async fn state(&self) -> WindowState {
        self.state.lock().await.clone()
    }

    pub async fn mutations(&self) -> Vec<Mutation> {
        self.log.lock().await.clone()
    }

    /// Tab ids in window order.
    pub async fn order(&self) -> Vec<TabId> {
        self.state.lock().await.tabs.iter().filter_map(|t| t.id).collect()
    }

    /// Points a tab at `url` as if a navigation just committed.
    pub async fn navigate(&self, id: TabId, url: &str) -> Result<Tab> {
        let mut state = self.state.lock().await;
        let pos = state.position(id)?;
        let tab = &mut state.tabs[pos];
        tab.url = Some(url.to_string());
        tab.pending_url = None;
        tab.title = None;
        Ok(tab.clone())
    }

    async fn record(&self, mutation: Mutation) {
        debug!(?mutation, "Simulated mutation");
        self.log.lock().await.push(mutation);
    }
}

#[async_trait]
impl BrowserHost for SimulatedBrowser {
    async fn query_tabs(&self) -> Result<Vec<Tab>> {
        Ok(self.state.lock().await.tabs.clone())
    }

    async fn get_tab(&self, id: TabId) -> Result<Tab> {
        let state = self.state.lock().await;
        let pos = state.position(id)?;
        Ok(state.tabs[pos].clone())
    }

    async fn close_tabs(&self, ids: &[TabId]) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            for id in ids {
                state.position(*id)?;
            }
            for id in ids {
                state.close(*id)?;
            }
        }
        self.record(Mutation::Close { ids: ids.to_vec() }).await;
        Ok(())
    }

    async fn move_tab(&self, id: TabId, index: usize) -> Result<()> {
        self.state.lock().await.move_to(id, index)?;
        self.record(Mutation::Move { id, index }).await;
        Ok(())
    }

    async fn highlight(&self, indices: &[usize]) -> Result<()> {
        self.state.lock().await.highlight(indices)?;
        self.record(Mutation::Highlight {
            indices: indices.to_vec(),
        })
        .await;
        Ok(())
    }

    async fn group_tabs(&self, ids: &[TabId], group: Option<i32>) -> Result<i32> {
        let group = self.state.lock().await.group(ids, group)?;
        self.record(Mutation::Group {
            ids: ids.to_vec(),
            group,
        })
        .await;
        Ok(group)
    }

    async fn ungroup_tabs(&self, ids: &[TabId]) -> Result<()> {
        self.state.lock().await.ungroup(ids)?;
        self.record(Mutation::Ungroup { ids: ids.to_vec() }).await;
        Ok(())
    }

    async fn update_group(&self, group: i32, title: Option<&str>, collapsed: Option<bool>) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            let entry = state
                .groups
                .iter_mut()
                .find(|g| g.id == group)
                .ok_or_else(|| Error::NotFound(format!("group {}", group)))?;
            if let Some(title) = title {
                entry.title = title.to_string();
            }
            if let Some(collapsed) = collapsed {
                entry.collapsed = collapsed;
            }
        }
        self.record(Mutation::UpdateGroup {
            group,
            title: title.map(str::to_string),
            collapsed,
        })
        .await;
        Ok(())
    }

    async fn get_group(&self, group: i32) -> Result<TabGroup> {
        self.state
            .lock()
            .await
            .groups
            .iter()
            .find(|g| g.id == group)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("group {}", group)))
    }

    async fn create_tab(&self, opener: Option<TabId>, url: Option<&str>, active: bool) -> Result<Tab> {
        let tab = self.state.lock().await.create(opener, url, active);
        let id = tab.id.ok_or_else(|| Error::Host("created tab has no id".to_string()))?;
        self.record(Mutation::Create { id, opener }).await;
        Ok(tab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser(n: TabId) -> SimulatedBrowser {
        SimulatedBrowser::from_tabs((0..n).map(|i| Tab::new(i + 1, i as usize)).collect())
    }

    #[tokio::test]
    async fn test_normalize_activates_first_tab() {
        let browser = browser(3);
        let tabs = browser.query_tabs().await.unwrap();
        assert!(tabs[0].active && tabs[0].highlighted);
        assert_eq!(browser.state().await.next_tab_id, 4);
    }

    #[tokio::test]
    async fn test_close_reindexes_and_moves_focus() {
        let browser = browser(3);
        browser.close_tabs(&[1]).await.unwrap();
        let tabs = browser.query_tabs().await.unwrap();
        assert_eq!(tabs.iter().map(|t| t.index).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(tabs[0].id, Some(2));
        assert!(tabs[0].active);

        let err = browser.close_tabs(&[1]).await.unwrap_err();
        assert!(err.is_stale_reference());
    }

    #[tokio::test]
    async fn test_move_tab_final_index() {
        let browser = browser(4);
        browser.move_tab(1, 2).await.unwrap();
        assert_eq!(browser.order().await, vec![2, 3, 1, 4]);
        browser.move_tab(4, 0).await.unwrap();
        assert_eq!(browser.order().await, vec![4, 2, 3, 1]);
    }

    #[tokio::test]
    async fn test_highlight_replaces_and_activates_first() {
        let browser = browser(4);
        browser.highlight(&[2, 3]).await.unwrap();
        let tabs = browser.query_tabs().await.unwrap();
        assert!(tabs[2].active);
        assert!(!tabs[0].highlighted);
        assert!(tabs[3].highlighted && !tabs[3].active);
        assert!(tabs[2].last_accessed.is_some());

        assert!(browser.highlight(&[9]).await.unwrap_err().is_stale_reference());
    }

    #[tokio::test]
    async fn test_group_keeps_members_adjacent() {
        let browser = browser(5);
        let g = browser.group_tabs(&[2, 4], None).await.unwrap();
        assert_eq!(browser.order().await, vec![1, 2, 4, 3, 5]);

        let same = browser.group_tabs(&[5], Some(g)).await.unwrap();
        assert_eq!(same, g);
        assert_eq!(browser.order().await, vec![1, 2, 4, 5, 3]);

        browser.ungroup_tabs(&[2, 4, 5]).await.unwrap();
        assert!(browser.state().await.groups.is_empty());
    }

    #[tokio::test]
    async fn test_create_after_opener_children() {
        let browser = browser(3);
        let a = browser.create_tab(Some(1), Some("https://a.com/"), false).await.unwrap();
        let b = browser.create_tab(Some(1), None, false).await.unwrap();
        assert_eq!(a.index, 1);
        assert_eq!(browser.order().await, vec![1, 4, 5, 2, 3]);
        assert_eq!(b.url.as_deref(), Some(NEW_TAB_URL));

        let c = browser.create_tab(None, None, true).await.unwrap();
        let tabs = browser.query_tabs().await.unwrap();
        assert!(tabs[c.index].active);
    }

    #[tokio::test]
    async fn test_navigate_is_not_a_mutation() {
        let browser = browser(2);
        let tab = browser.navigate(2, "https://example.com/").await.unwrap();
        assert_eq!(tab.effective_url(), Some("https://example.com/"));
        assert!(browser.mutations().await.is_empty());
        assert!(browser.navigate(5, "https://example.com/").await.is_err());
    }
}
