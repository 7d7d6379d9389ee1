use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tabtree_core::{Result, SessionStorage, TabId};
use tracing::{debug, warn};

/// The user's explicit multi-select, kept apart from the browser's
/// highlight state. Stored as a list of tab ids under one session key.
pub struct SelectionStore {
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl SelectionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
        }
    }

    pub async fn get(&self) -> Result<BTreeSet<TabId>> {
        let raw = self.storage.get(&self.key).await?;
        Ok(match raw {
            None | Some(Value::Null) => BTreeSet::new(),
            Some(value) => serde_json::from_value::<Vec<TabId>>(value)
                .map(|ids| ids.into_iter().collect())
                .unwrap_or_else(|e| {
                    warn!(key = %self.key, error = %e, "Malformed marks, treating as empty");
                    BTreeSet::new()
                }),
        })
    }

    pub async fn add(&self, ids: &[TabId]) -> Result<()> {
        let mut marks = self.get().await?;
        let before = marks.len();
        marks.extend(ids.iter().copied());
        if marks.len() == before {
            return Ok(());
        }
        self.write(&marks).await
    }

    pub async fn remove(&self, ids: &[TabId]) -> Result<()> {
        let mut marks = self.get().await?;
        let before = marks.len();
        for id in ids {
            marks.remove(id);
        }
        if marks.len() == before {
            return Ok(());
        }
        self.write(&marks).await
    }

    pub async fn clear(&self) -> Result<()> {
        if self.get().await?.is_empty() {
            return Ok(());
        }
        debug!("Clearing marks");
        self.write(&BTreeSet::new()).await
    }

    /// Drops marks for tabs that no longer exist.
    pub async fn retain_live(&self, live: &HashSet<TabId>) -> Result<usize> {
        let marks = self.get().await?;
        let kept: BTreeSet<TabId> = marks.iter().copied().filter(|id| live.contains(id)).collect();
        let dropped = marks.len() - kept.len();
        if dropped > 0 {
            self.write(&kept).await?;
        }
        Ok(dropped)
    }

    async fn write(&self, marks: &BTreeSet<TabId>) -> Result<()> {
        let ids: Vec<TabId> = marks.iter().copied().collect();
        self.storage.set(&self.key, serde_json::to_value(ids)?).await
    }
}
