use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::types::{Tab, TabId};

/// Kind of change reported with a tab-updated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabChange {
    Loading,
    NavigationComplete,
    Other,
}

/// Browser events the engine subscribes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TabEvent {
    Created { tab: Tab },
    Removed { tab_id: TabId },
    Updated { tab_id: TabId, change: TabChange },
    Highlighted { tab_ids: Vec<TabId> },
    Command { command: Command },
}

impl TabEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TabEvent::Created { .. } => "created",
            TabEvent::Removed { .. } => "removed",
            TabEvent::Updated { .. } => "updated",
            TabEvent::Highlighted { .. } => "highlighted",
            TabEvent::Command { .. } => "command",
        }
    }
}
