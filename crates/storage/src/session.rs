use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tabtree_core::{Paths, Result, SessionStorage};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Session storage persisted as one JSON object on disk, so separate CLI
/// invocations observe the same session. Every call re-reads the file.
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(paths: &Paths) -> Self {
        Self::at(paths.session_file())
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Drops every stored key, the equivalent of a browser restart.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.path.exists() {
            tokio::fs::remove_file(&self.path).await?;
        }
        Ok(())
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => {
                warn!(path = %self.path.display(), kind = ?other, "Session file is not an object, starting empty");
                Ok(Map::new())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to parse session file, starting empty");
                Ok(Map::new())
            }
        }
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        all.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(all))?;
        tokio::fs::write(&self.path, content).await?;
        debug!(key, path = %self.path.display(), "Session key written");
        Ok(())
    }
}
