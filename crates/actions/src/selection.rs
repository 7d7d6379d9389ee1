//! Marks: the user's own multi-select, kept in step with native highlight.

use std::collections::BTreeSet;
use tabtree_core::types::position_of;
use tabtree_core::{Result, TabId};
use tracing::{debug, info};

use crate::manager::TabManager;

impl TabManager {
    /// Marks or unmarks the active tab, then highlights it together with
    /// every marked tab.
    pub async fn toggle_selection(&self) -> Result<()> {
        let Some((tabs, active)) = self.snapshot_with_active().await? else {
            return Ok(());
        };
        let Some(id) = tabs[active].id else {
            return Ok(());
        };

        let marks = self.marks.get().await?;
        if marks.contains(&id) {
            self.marks.remove(&[id]).await?;
        } else {
            self.marks.add(&[id]).await?;
        }

        let marks = self.marks.get().await?;
        debug!(tab_id = id, marked = marks.len(), "Toggled mark");
        let mut indices = vec![active];
        indices.extend(
            marks
                .iter()
                .filter_map(|&m| position_of(&tabs, m))
                .filter(|&i| i != active),
        );
        self.drive_highlight(&tabs, &indices).await
    }

    pub async fn cancel_selection(&self) -> Result<()> {
        self.marks.clear().await?;
        let Some((tabs, active)) = self.snapshot_with_active().await? else {
            return Ok(());
        };
        self.drive_highlight(&tabs, &[active]).await
    }

    /// Reacts to a native highlight change. Changes this manager issued
    /// itself are ignored; any other change ends the multi-select and
    /// clears the marks unless it already matches them.
    pub async fn on_highlighted(&self, tab_ids: &[TabId]) -> Result<()> {
        let observed: BTreeSet<TabId> = tab_ids.iter().copied().collect();
        let driven = self.driven_highlight.lock().await.take();
        if driven.as_ref() == Some(&observed) {
            return Ok(());
        }

        let marks = self.marks.get().await?;
        if !marks.is_empty() && marks != observed {
            info!(marked = marks.len(), "Highlight changed outside a selection, clearing marks");
            self.marks.clear().await?;
        }
        Ok(())
    }
}
