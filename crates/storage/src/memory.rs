use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tabtree_core::{Result, SessionStorage};
use tokio::sync::Mutex;

/// Process-local session storage. Lost when the process exits, which
/// matches the lifetime of the browser's session area.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
