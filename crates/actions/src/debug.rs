//! Text rendering of the forest for `print-debug-info` and the CLI.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;
use tabtree_core::{Result, Tab, TabId};
use tabtree_tree::Forest;

use crate::manager::{tolerate_stale, TabManager};

/// One line per tab, trees in partition order, children indented under
/// their parent.
pub fn render_forest(tabs: &[Tab], marks: &BTreeSet<TabId>, titles: &HashMap<i32, String>) -> String {
    let forest = Forest::new(tabs);
    let mut out = String::new();
    let mut printed = vec![false; tabs.len()];

    for (n, tree) in forest.partition().iter().enumerate() {
        let _ = writeln!(out, "tree {} ({} tabs)", n + 1, tree.len());
        let root = forest.find_root(tree[0]).unwrap_or(tree[0]);

        let mut stack = vec![(root, 0usize)];
        while let Some((i, depth)) = stack.pop() {
            if printed[i] {
                continue;
            }
            printed[i] = true;
            render_tab(&mut out, &tabs[i], depth + 1, marks, titles);
            for &child in forest.children(i).iter().rev() {
                if !printed[child] && tree.contains(&child) {
                    stack.push((child, depth + 1));
                }
            }
        }

        for &i in tree {
            if !printed[i] {
                printed[i] = true;
                render_tab(&mut out, &tabs[i], 1, marks, titles);
            }
        }
    }
    out
}

fn render_tab(out: &mut String, tab: &Tab, depth: usize, marks: &BTreeSet<TabId>, titles: &HashMap<i32, String>) {
    let mut flags = String::new();
    if tab.active {
        flags.push('*');
    }
    if tab.id.is_some_and(|id| marks.contains(&id)) {
        flags.push('+');
    }
    if tab.was_visited() {
        flags.push('v');
    }

    let id = tab.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string());
    let label = tab.title.as_deref().or(tab.effective_url()).unwrap_or("");
    let _ = write!(out, "{}[{}] #{} {:<3}", "  ".repeat(depth), tab.index, id, flags);
    if let Some(group) = tab.group_id.group() {
        match titles.get(&group).filter(|t| !t.is_empty()) {
            Some(title) => {
                let _ = write!(out, " <{}: {}>", group, title);
            }
            None => {
                let _ = write!(out, " <{}>", group);
            }
        }
    }
    let _ = writeln!(out, " {}", label);
}

impl TabManager {
    pub async fn debug_report(&self) -> Result<String> {
        let tabs = self.snapshot().await?;
        let marks = self.marks.get().await?;

        let groups: BTreeSet<i32> = tabs.iter().filter_map(|t| t.group_id.group()).collect();
        let mut titles = HashMap::new();
        for group in groups {
            if let Some(info) = tolerate_stale(self.host.get_group(group).await, "read group")? {
                titles.insert(group, info.title);
            }
        }

        if tabs.is_empty() {
            return Ok("(empty window)\n".to_string());
        }
        Ok(render_forest(&tabs, &marks, &titles))
    }
}
