use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::paths::Paths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingConfig {
    /// Regroup a tab by site identity whenever it finishes navigating.
    #[serde(default = "default_auto_group_by_identity")]
    pub auto_group_by_identity: bool,
    /// Title used when the grouped hosts share no meaningful suffix.
    #[serde(default = "default_group_title")]
    pub default_title: String,
    #[serde(default)]
    pub collapse_new_groups: bool,
}

fn default_auto_group_by_identity() -> bool {
    true
}

fn default_group_title() -> String {
    "Tabs".to_string()
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            auto_group_by_identity: default_auto_group_by_identity(),
            default_title: default_group_title(),
            collapse_new_groups: false,
        }
    }
}

/// Which tabs `next-item` / `previous-item` cycle through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CycleScope {
    #[default]
    Window,
    Tree,
    Group,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NavigationConfig {
    #[serde(default)]
    pub cycle_scope: CycleScope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default = "default_graph_key")]
    pub graph_key: String,
    #[serde(default = "default_marks_key")]
    pub marks_key: String,
}

fn default_graph_key() -> String {
    "tabOpenerGraph".to_string()
}

fn default_marks_key() -> String {
    "tabMarks".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            graph_key: default_graph_key(),
            marks_key: default_marks_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.graph_key.trim().is_empty() || self.storage.marks_key.trim().is_empty() {
            return Err(Error::Config("storage keys must not be empty".to_string()));
        }
        if self.storage.graph_key == self.storage.marks_key {
            return Err(Error::Config(format!(
                "graph and marks share the storage key '{}'",
                self.storage.graph_key
            )));
        }
        Ok(())
    }
}
