//! Tab operations over the host browser.
//!
//! Every operation takes a fresh snapshot, resolves openers through the
//! opener graph, computes its intent on the forest and then issues one host
//! call per tab. Between the snapshot and each call other events may run, so
//! a tab that vanished in the meantime is logged and skipped rather than
//! failing the whole operation.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tabtree_core::types::{active_index, position_of, with_opener};
use tabtree_core::{
    BrowserHost, Command, Config, Result, SessionStorage, Tab, TabChange, TabEvent, TabId,
};
use tabtree_storage::{OpenerGraphStore, SelectionStore};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::identity::{HostIdentity, SiteIdentity};

pub struct TabManager {
    pub(crate) host: Arc<dyn BrowserHost>,
    pub(crate) graph: OpenerGraphStore,
    pub(crate) marks: SelectionStore,
    pub(crate) identity: Arc<dyn SiteIdentity>,
    pub(crate) config: Config,
    /// Highlight set most recently issued by this manager, used to tell
    /// our own highlight changes apart from the user's.
    pub(crate) driven_highlight: Mutex<Option<BTreeSet<TabId>>>,
}

impl TabManager {
    pub fn new(host: Arc<dyn BrowserHost>, storage: Arc<dyn SessionStorage>, config: Config) -> Self {
        let graph = OpenerGraphStore::new(storage.clone(), &config.storage.graph_key);
        let marks = SelectionStore::new(storage, &config.storage.marks_key);
        Self {
            host,
            graph,
            marks,
            identity: Arc::new(HostIdentity),
            config,
            driven_highlight: Mutex::new(None),
        }
    }

    pub fn with_identity(mut self, identity: Arc<dyn SiteIdentity>) -> Self {
        self.identity = identity;
        self
    }

    pub fn graph(&self) -> &OpenerGraphStore {
        &self.graph
    }

    pub fn marks(&self) -> &SelectionStore {
        &self.marks
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current window tabs with openers resolved through the graph store.
    pub async fn snapshot(&self) -> Result<Vec<Tab>> {
        let tabs = self.host.query_tabs().await?;
        let graph = self.graph.get().await?;
        Ok(with_opener(&tabs, &graph))
    }

    /// Snapshot plus the active tab position; `None` for an empty window.
    pub(crate) async fn snapshot_with_active(&self) -> Result<Option<(Vec<Tab>, usize)>> {
        let tabs = self.snapshot().await?;
        Ok(active_index(&tabs).map(|active| (tabs, active)))
    }

    pub async fn dispatch(&self, command: Command) -> Result<()> {
        info!(command = %command, "Running command");
        match command {
            Command::NextItem => self.cycle_highlight(1).await,
            Command::PreviousItem => self.cycle_highlight(-1).await,
            Command::CloseOtherTabs => self.close_other_tabs().await,
            Command::CloseOthers => self.close_others().await,
            Command::CloseOtherTrees => self.close_other_trees().await,
            Command::CloseVisitedTree => self.close_visited_tree().await,
            Command::CloseTabBackward => self.close_tab_backward().await,
            Command::NextTab => self.next_tab().await,
            Command::ToggleGrouping => self.toggle_grouping().await,
            Command::ToggleSelection => self.toggle_selection().await,
            Command::CancelSelection => self.cancel_selection().await,
            Command::MovePrevious => self.move_block(-1).await,
            Command::MoveNext => self.move_block(1).await,
            Command::GrowPrevious => self.grow_highlight(-1).await,
            Command::GrowNext => self.grow_highlight(1).await,
            Command::OpenPrevious => self.cycle_siblings(-1).await,
            Command::OpenNext => self.cycle_siblings(1).await,
            Command::PrintDebugInfo => {
                let report = self.debug_report().await?;
                info!("\n{}", report);
                Ok(())
            }
        }
    }

    pub async fn handle_event(&self, event: TabEvent) -> Result<()> {
        debug!(kind = event.kind(), "Handling tab event");
        match event {
            TabEvent::Created { tab } => self.on_created(&tab).await,
            TabEvent::Removed { tab_id } => self.forget_tab(tab_id).await,
            TabEvent::Updated { tab_id, change } => {
                if change == TabChange::NavigationComplete && self.config.grouping.auto_group_by_identity {
                    self.group_by_identity(tab_id).await
                } else {
                    Ok(())
                }
            }
            TabEvent::Highlighted { tab_ids } => self.on_highlighted(&tab_ids).await,
            TabEvent::Command { command } => self.dispatch(command).await,
        }
    }

    async fn on_created(&self, tab: &Tab) -> Result<()> {
        match (tab.id, tab.opener_tab_id) {
            (Some(id), Some(opener)) if id != opener => {
                debug!(tab_id = id, opener, "Recording opener");
                self.graph.append(id, opener).await
            }
            (None, _) => {
                debug!("Created tab has no id yet, skipping opener record");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Drops a closed tab from both stores.
    pub async fn forget_tab(&self, id: TabId) -> Result<()> {
        self.graph.remove(id).await?;
        self.marks.remove(&[id]).await
    }

    /// Prunes store entries for tabs that are no longer open.
    pub async fn reconcile(&self) -> Result<()> {
        let tabs = self.host.query_tabs().await?;
        let live: HashSet<TabId> = tabs.iter().filter_map(|t| t.id).collect();
        let dropped_pairs = self.graph.retain_live(&live).await?;
        let dropped_marks = self.marks.retain_live(&live).await?;
        if dropped_pairs > 0 || dropped_marks > 0 {
            info!(dropped_pairs, dropped_marks, "Reconciled session stores with window");
        }
        Ok(())
    }

    /// Closes each tab with its own host call. Tabs that are already gone
    /// are skipped. Returns the number of tabs closed.
    pub(crate) async fn close_each(&self, ids: &[TabId]) -> Result<usize> {
        let mut closed = 0;
        for &id in ids {
            if tolerate_stale(self.host.close_tabs(&[id]).await, "close tab")?.is_some() {
                closed += 1;
            }
            self.forget_tab(id).await?;
        }
        if closed > 0 {
            info!(closed, requested = ids.len(), "Closed tabs");
        }
        Ok(closed)
    }

    /// Highlights the tabs at snapshot positions `indices`, the first one
    /// becoming active. Positions are resolved again by id just before the
    /// call; tabs closed since the snapshot are dropped, and nothing happens
    /// if the first one is gone. The id set is remembered as our own change
    /// only when it differs from the current highlight, since an unchanged
    /// highlight produces no event.
    pub(crate) async fn drive_highlight(&self, tabs: &[Tab], indices: &[usize]) -> Result<()> {
        let Some(target) = indices.first().and_then(|&i| tabs.get(i)).and_then(|t| t.id) else {
            return Ok(());
        };
        let current = self.host.query_tabs().await?;
        if position_of(&current, target).is_none() {
            warn!(tab_id = target, "Highlight target closed since snapshot, skipping");
            return Ok(());
        }

        let mut positions = Vec::with_capacity(indices.len());
        let mut expected = BTreeSet::new();
        for id in ids_of(tabs, indices.iter().copied()) {
            if let Some(pos) = position_of(&current, id) {
                if expected.insert(id) {
                    positions.push(pos);
                }
            }
        }
        let highlighted: BTreeSet<TabId> = current.iter().filter(|t| t.highlighted).filter_map(|t| t.id).collect();
        *self.driven_highlight.lock().await = (expected != highlighted).then_some(expected);

        if tolerate_stale(self.host.highlight(&positions).await, "highlight")?.is_none() {
            *self.driven_highlight.lock().await = None;
        }
        Ok(())
    }
}

/// `Ok(None)` when the call hit a tab, group or index that no longer
/// exists; every other error passes through.
pub(crate) fn tolerate_stale<T>(result: Result<T>, what: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_stale_reference() => {
            warn!(error = %e, "Skipping {} on stale reference", what);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn ids_of(tabs: &[Tab], positions: impl IntoIterator<Item = usize>) -> Vec<TabId> {
    positions
        .into_iter()
        .filter_map(|i| tabs.get(i).and_then(|t| t.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::sim::Mutation;
    use crate::testing::{manager_for, window};
    use std::collections::BTreeSet;
    use tabtree_core::BrowserHost;

    #[tokio::test]
    async fn test_close_each_skips_tab_closed_elsewhere() {
        let (browser, manager) = manager_for(window(&[None, Some(1), None, None])).await;
        manager.graph().append(2, 1).await.unwrap();
        manager.marks().add(&[3]).await.unwrap();

        // tab 3 goes away between the snapshot and the close calls
        browser.close_tabs(&[3]).await.unwrap();
        let closed = manager.close_each(&[2, 3, 4]).await.unwrap();

        assert_eq!(closed, 2);
        assert_eq!(browser.order().await, vec![1]);
        assert!(manager.graph().get().await.unwrap().is_empty());
        assert!(manager.marks().get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_highlight_is_not_remembered() {
        let (_browser, manager) = manager_for(window(&[None, None, None])).await;
        manager.marks().add(&[2, 3]).await.unwrap();
        let tabs = manager.snapshot().await.unwrap();

        // tab 1 is already the only highlighted tab, so no event follows
        manager.drive_highlight(&tabs, &[0]).await.unwrap();
        assert!(manager.driven_highlight.lock().await.is_none());

        manager.on_highlighted(&[1]).await.unwrap();
        assert!(manager.marks().get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_highlight_resolves_positions_by_id() {
        let (browser, manager) = manager_for(window(&[None, None, None, None])).await;
        let tabs = manager.snapshot().await.unwrap();

        browser.close_tabs(&[2]).await.unwrap();
        manager.drive_highlight(&tabs, &[2, 3, 1]).await.unwrap();

        let now = browser.query_tabs().await.unwrap();
        assert_eq!(now[1].id, Some(3));
        assert!(now[1].active);
        assert!(now[2].highlighted);
        assert!(!now[0].highlighted);
        assert_eq!(*manager.driven_highlight.lock().await, Some(BTreeSet::from([3, 4])));
    }

    #[tokio::test]
    async fn test_highlight_skipped_when_target_closed() {
        let (browser, manager) = manager_for(window(&[None, None, None])).await;
        let tabs = manager.snapshot().await.unwrap();

        browser.close_tabs(&[3]).await.unwrap();
        manager.drive_highlight(&tabs, &[2, 0]).await.unwrap();

        assert!(!browser
            .mutations()
            .await
            .iter()
            .any(|m| matches!(m, Mutation::Highlight { .. })));
        assert!(manager.driven_highlight.lock().await.is_none());
    }
}
