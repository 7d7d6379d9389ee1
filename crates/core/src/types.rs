use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Browser tab identifier, unique within a browser session.
pub type TabId = i32;

/// Browser-native tab group membership. Serialized the way the browser
/// reports it: `-1` for ungrouped, otherwise the opaque group id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum GroupId {
    Ungrouped,
    Group(i32),
}

pub const GROUP_ID_NONE: i32 = -1;

impl GroupId {
    pub fn is_grouped(&self) -> bool {
        matches!(self, GroupId::Group(_))
    }

    pub fn group(&self) -> Option<i32> {
        match self {
            GroupId::Ungrouped => None,
            GroupId::Group(id) => Some(*id),
        }
    }
}

impl Default for GroupId {
    fn default() -> Self {
        GroupId::Ungrouped
    }
}

impl From<i32> for GroupId {
    fn from(raw: i32) -> Self {
        if raw < 0 {
            GroupId::Ungrouped
        } else {
            GroupId::Group(raw)
        }
    }
}

impl From<GroupId> for i32 {
    fn from(group: GroupId) -> Self {
        match group {
            GroupId::Ungrouped => GROUP_ID_NONE,
            GroupId::Group(id) => id,
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::Ungrouped => write!(f, "ungrouped"),
            GroupId::Group(id) => write!(f, "group:{}", id),
        }
    }
}

/// Read-only projection of a browser tab. Every component works on this
/// one shape; fields the browser may omit are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// `None` only while the browser is still creating the tab.
    #[serde(default)]
    pub id: Option<TabId>,
    pub index: usize,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener_tab_id: Option<TabId>,
    #[serde(default)]
    pub group_id: GroupId,
    /// Milliseconds since epoch of the last activation. `None` means the
    /// tab was never viewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Tab {
    pub fn new(id: TabId, index: usize) -> Self {
        Self {
            id: Some(id),
            index,
            ..Default::default()
        }
    }

    pub fn with_opener(mut self, opener: TabId) -> Self {
        self.opener_tab_id = Some(opener);
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// The URL the tab is showing or about to show.
    pub fn effective_url(&self) -> Option<&str> {
        self.pending_url.as_deref().or(self.url.as_deref())
    }

    pub fn was_visited(&self) -> bool {
        self.last_accessed.is_some()
    }
}

/// Overrides the browser-reported opener of every tab with the durable
/// opener graph entry when one exists.
pub fn with_opener(tabs: &[Tab], graph: &HashMap<TabId, TabId>) -> Vec<Tab> {
    tabs.iter()
        .map(|tab| {
            let mut resolved = tab.clone();
            if let Some(opener) = tab.id.and_then(|id| graph.get(&id)) {
                resolved.opener_tab_id = Some(*opener);
            }
            resolved
        })
        .collect()
}

/// Position of the active tab, falling back to the first highlighted tab.
pub fn active_index(tabs: &[Tab]) -> Option<usize> {
    tabs.iter()
        .position(|t| t.active)
        .or_else(|| tabs.iter().position(|t| t.highlighted))
}

pub fn position_of(tabs: &[Tab], id: TabId) -> Option<usize> {
    tabs.iter().position(|t| t.id == Some(id))
}

/// Browser-native tab group state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TabGroup {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub collapsed: bool,
}
