//! Durable `self -> opener` relation.
//!
//! The browser forgets or reassigns `openerTabId` (navigation, restores,
//! extension reloads), so every opener observed at creation time is recorded
//! here and merged back into snapshots. Stored as an ordered list of
//! `[selfId, openerId]` pairs under one session key.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tabtree_core::{Result, SessionStorage, TabId};
use tracing::{debug, warn};

pub type OpenerPair = (TabId, TabId);

pub struct OpenerGraphStore {
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl OpenerGraphStore {
    pub fn new(storage: Arc<dyn SessionStorage>, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
        }
    }

    /// Map `selfId -> openerId`. When a self id was appended more than once
    /// the last opener wins.
    pub async fn get(&self) -> Result<HashMap<TabId, TabId>> {
        Ok(self.pairs().await?.into_iter().collect())
    }

    /// Raw pairs in insertion order.
    pub async fn pairs(&self) -> Result<Vec<OpenerPair>> {
        let raw = self.storage.get(&self.key).await?;
        Ok(decode_pairs(&self.key, raw))
    }

    /// Records `opener` as the opener of `self_id`, replacing any earlier
    /// entry for the same tab.
    pub async fn append(&self, self_id: TabId, opener: TabId) -> Result<()> {
        let pairs = self.pairs().await?;
        if pairs.last() == Some(&(self_id, opener)) {
            return Ok(());
        }

        let mut updated: Vec<OpenerPair> = pairs
            .iter()
            .copied()
            .filter(|(id, _)| *id != self_id)
            .collect();
        if updated.len() != pairs.len() {
            debug!(tab_id = self_id, opener, "Replacing earlier opener entry");
        }
        updated.push((self_id, opener));

        self.write(&updated).await
    }

    /// Drops every pair in which `id` is either the tab or its opener.
    pub async fn remove(&self, id: TabId) -> Result<()> {
        let pairs = self.pairs().await?;
        let updated: Vec<OpenerPair> = pairs
            .iter()
            .copied()
            .filter(|(self_id, opener)| *self_id != id && *opener != id)
            .collect();

        if updated.len() == pairs.len() {
            return Ok(());
        }
        self.write(&updated).await
    }

    /// Drops pairs whose tab is no longer open. Openers that are gone are
    /// kept: the child then resolves as a root.
    pub async fn retain_live(&self, live: &HashSet<TabId>) -> Result<usize> {
        let pairs = self.pairs().await?;
        let updated: Vec<OpenerPair> = pairs
            .iter()
            .copied()
            .filter(|(self_id, _)| live.contains(self_id))
            .collect();

        let dropped = pairs.len() - updated.len();
        if dropped > 0 {
            self.write(&updated).await?;
        }
        Ok(dropped)
    }

    async fn write(&self, pairs: &[OpenerPair]) -> Result<()> {
        let value = serde_json::to_value(pairs)?;
        self.storage.set(&self.key, value).await
    }
}

fn decode_pairs(key: &str, raw: Option<Value>) -> Vec<OpenerPair> {
    match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(key, error = %e, "Malformed opener graph, treating as empty");
            Vec::new()
        }),
    }
}
