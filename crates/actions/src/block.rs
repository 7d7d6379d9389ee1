//! Moving and growing the highlighted block.

use std::ops::RangeInclusive;
use tabtree_core::types::active_index;
use tabtree_core::{Result, Tab, TabId};
use tracing::debug;

use crate::manager::{tolerate_stale, TabManager};

/// The run of highlighted tabs around the active tab.
pub fn highlighted_block(tabs: &[Tab]) -> Option<RangeInclusive<usize>> {
    let active = active_index(tabs)?;
    let mut lo = active;
    while lo > 0 && tabs[lo - 1].highlighted {
        lo -= 1;
    }
    let mut hi = active;
    while hi + 1 < tabs.len() && tabs[hi + 1].highlighted {
        hi += 1;
    }
    Some(lo..=hi)
}

/// Per-tab moves that shift the highlighted block by `offset`, clamped to
/// the window. Each move names the tab's final index; applied in order,
/// the displaced tabs end up on the far side of the block.
pub fn plan_block_move(tabs: &[Tab], offset: isize) -> Vec<(TabId, usize)> {
    let Some(block) = highlighted_block(tabs) else {
        return Vec::new();
    };
    let (lo, hi) = (*block.start(), *block.end());
    let len = hi - lo + 1;
    let max_start = tabs.len() - len;
    let target = (lo as isize + offset).clamp(0, max_start as isize) as usize;
    if target == lo {
        return Vec::new();
    }

    let mut moves: Vec<(TabId, usize)> = (lo..=hi)
        .enumerate()
        .filter_map(|(j, i)| tabs[i].id.map(|id| (id, target + j)))
        .collect();
    if target > lo {
        moves.reverse();
    }
    moves
}

/// Highlight after moving the edge opposite the active tab by `offset`.
/// With the active tab inside the block, the edge in the direction of
/// `offset` moves instead. The active tab comes first so it stays active.
/// `None` when the edge is already at the window border.
pub fn plan_grow(tabs: &[Tab], offset: isize) -> Option<Vec<usize>> {
    let block = highlighted_block(tabs)?;
    let anchor = active_index(tabs)?;
    let (lo, hi) = (*block.start(), *block.end());
    let move_hi = if anchor == lo && anchor != hi {
        true
    } else if anchor == hi && anchor != lo {
        false
    } else {
        offset > 0
    };
    let (edge, fixed) = if move_hi { (hi, lo) } else { (lo, hi) };
    let moved = (edge as isize + offset).clamp(0, tabs.len() as isize - 1) as usize;
    if moved == edge {
        return None;
    }

    let (from, to) = (fixed.min(moved), fixed.max(moved));
    let mut indices = vec![anchor];
    indices.extend((from..=to).filter(|&i| i != anchor));
    Some(indices)
}

impl TabManager {
    pub async fn move_block(&self, offset: isize) -> Result<()> {
        let tabs = self.snapshot().await?;
        let moves = plan_block_move(&tabs, offset);
        for (id, index) in moves {
            debug!(tab_id = id, index, "Moving tab");
            tolerate_stale(self.host.move_tab(id, index).await, "move tab")?;
        }
        Ok(())
    }

    pub async fn grow_highlight(&self, offset: isize) -> Result<()> {
        let tabs = self.snapshot().await?;
        match plan_grow(&tabs, offset) {
            Some(indices) => self.drive_highlight(&tabs, &indices).await,
            None => Ok(()),
        }
    }
}
