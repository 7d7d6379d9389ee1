use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Keyboard commands understood by the engine. The string form is the
/// command name the host registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    NextItem,
    PreviousItem,
    CloseOtherTabs,
    CloseOthers,
    CloseOtherTrees,
    CloseVisitedTree,
    CloseTabBackward,
    NextTab,
    ToggleGrouping,
    ToggleSelection,
    CancelSelection,
    MovePrevious,
    MoveNext,
    GrowPrevious,
    GrowNext,
    OpenPrevious,
    OpenNext,
    PrintDebugInfo,
}

impl Command {
    pub const ALL: [Command; 18] = [
        Command::NextItem,
        Command::PreviousItem,
        Command::CloseOtherTabs,
        Command::CloseOthers,
        Command::CloseOtherTrees,
        Command::CloseVisitedTree,
        Command::CloseTabBackward,
        Command::NextTab,
        Command::ToggleGrouping,
        Command::ToggleSelection,
        Command::CancelSelection,
        Command::MovePrevious,
        Command::MoveNext,
        Command::GrowPrevious,
        Command::GrowNext,
        Command::OpenPrevious,
        Command::OpenNext,
        Command::PrintDebugInfo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::NextItem => "next-item",
            Command::PreviousItem => "previous-item",
            Command::CloseOtherTabs => "close-other-tabs",
            Command::CloseOthers => "close-others",
            Command::CloseOtherTrees => "close-other-trees",
            Command::CloseVisitedTree => "close-visited-tree",
            Command::CloseTabBackward => "close-tab-backward",
            Command::NextTab => "next-tab",
            Command::ToggleGrouping => "toggle-grouping",
            Command::ToggleSelection => "toggle-selection",
            Command::CancelSelection => "cancel-selection",
            Command::MovePrevious => "move-previous",
            Command::MoveNext => "move-next",
            Command::GrowPrevious => "grow-previous",
            Command::GrowNext => "grow-next",
            Command::OpenPrevious => "open-previous",
            Command::OpenNext => "open-next",
            Command::PrintDebugInfo => "print-debug-info",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::NextItem => "Highlight the next tab in the configured scope",
            Command::PreviousItem => "Highlight the previous tab in the configured scope",
            Command::CloseOtherTabs => "Close every tab that is not highlighted",
            Command::CloseOthers => "Close everything outside the active group (or highlight)",
            Command::CloseOtherTrees => "Close every tab outside the active tab's tree",
            Command::CloseVisitedTree => "Close the visited tabs of the active tab's subtree",
            Command::CloseTabBackward => "Close the active tab and step to the previous one",
            Command::NextTab => "Dive into the next unread tab, discarding the current one",
            Command::ToggleGrouping => "Group tabs by tree, or ungroup everything",
            Command::ToggleSelection => "Mark or unmark the active tab",
            Command::CancelSelection => "Clear all marks",
            Command::MovePrevious => "Move the highlighted block one tab left",
            Command::MoveNext => "Move the highlighted block one tab right",
            Command::GrowPrevious => "Grow or shrink the highlight towards the left",
            Command::GrowNext => "Grow or shrink the highlight towards the right",
            Command::OpenPrevious => "Activate the previous sibling tab",
            Command::OpenNext => "Activate the next sibling tab",
            Command::PrintDebugInfo => "Print the tab forest",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s.trim())
            .ok_or_else(|| Error::InvalidCommand(s.to_string()))
    }
}
