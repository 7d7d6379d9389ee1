//! Opener forest over a window snapshot.
//!
//! Nodes are snapshot positions. The edge `parent -> child` exists when the
//! child's (resolved) opener id equals the parent's id. Opener data is not
//! trusted: ids may point outside the snapshot, at the tab itself, or form
//! cycles across several tabs. Every walk here is bounded by the snapshot
//! length regardless.

use std::collections::{HashMap, VecDeque};
use tabtree_core::{Tab, TabId};
use tracing::debug;

pub struct Forest {
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl Forest {
    pub fn new(tabs: &[Tab]) -> Self {
        let mut by_id: HashMap<TabId, usize> = HashMap::with_capacity(tabs.len());
        for (pos, tab) in tabs.iter().enumerate() {
            if let Some(id) = tab.id {
                by_id.entry(id).or_insert(pos);
            }
        }

        let mut parent = vec![None; tabs.len()];
        let mut children = vec![Vec::new(); tabs.len()];
        for (pos, tab) in tabs.iter().enumerate() {
            let Some(opener) = tab.opener_tab_id else {
                continue;
            };
            // An opener outside the snapshot makes this tab a root.
            match by_id.get(&opener) {
                Some(&p) if p != pos => {
                    parent[pos] = Some(p);
                    children[p].push(pos);
                }
                _ => {}
            }
        }

        Self { parent, children }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parent.get(index).copied().flatten()
    }

    /// Direct children, left to right.
    pub fn children(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tabs sharing `index`'s parent, including `index`, left to right.
    /// Roots are siblings of each other.
    pub fn siblings(&self, index: usize) -> Vec<usize> {
        if index >= self.len() {
            return Vec::new();
        }
        match self.parent(index) {
            Some(p) => self.children[p].clone(),
            None => (0..self.len()).filter(|&i| self.parent[i].is_none()).collect(),
        }
    }

    /// Walks openers back from `start` to the tab that has none.
    ///
    /// If the chain loops, the loop member with the smallest index is the
    /// root, so every tab on or behind the loop agrees on it.
    pub fn find_root(&self, start: usize) -> Option<usize> {
        if start >= self.len() {
            return None;
        }

        let mut seen = vec![false; self.len()];
        let mut path = vec![start];
        seen[start] = true;
        let mut current = start;

        while let Some(p) = self.parent[current] {
            if seen[p] {
                let loop_start = path.iter().position(|&i| i == p).unwrap_or(0);
                let root = path[loop_start..].iter().copied().min().unwrap_or(p);
                debug!(start, root, "Opener chain loops, using lowest index as root");
                return Some(root);
            }
            seen[p] = true;
            path.push(p);
            current = p;
        }

        Some(current)
    }

    /// Breadth-first descendants of `root`, `root` included, each index once.
    ///
    /// A node is marked visited before it is enqueued and never enqueued
    /// again, which caps the traversal at `len` steps on cyclic input.
    pub fn reachable(&self, root: usize) -> Vec<usize> {
        if root >= self.len() {
            return Vec::new();
        }

        let mut visited = vec![false; self.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([root]);
        visited[root] = true;

        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &child in &self.children[current] {
                if !visited[child] {
                    visited[child] = true;
                    queue.push_back(child);
                }
            }
        }

        order
    }

    /// Every tab of the tree containing `index`, left to right.
    pub fn tree_of(&self, index: usize) -> Vec<usize> {
        let Some(root) = self.find_root(index) else {
            return Vec::new();
        };
        let mut tree = self.reachable(root);
        tree.sort_unstable();
        tree
    }

    /// Splits the snapshot into disjoint trees. Trees come out in discovery
    /// order; positions inside each tree are sorted left to right.
    pub fn partition(&self) -> Vec<Vec<usize>> {
        let mut assigned = vec![false; self.len()];
        let mut trees = Vec::new();

        for start in 0..self.len() {
            if assigned[start] {
                continue;
            }
            let root = self.find_root(start).unwrap_or(start);
            let mut tree: Vec<usize> = self
                .reachable(root)
                .into_iter()
                .filter(|&i| !assigned[i])
                .collect();
            if !tree.contains(&start) {
                tree.push(start);
            }
            for &i in &tree {
                assigned[i] = true;
            }
            tree.sort_unstable();
            trees.push(tree);
        }

        trees
    }
}

pub fn find_root(tabs: &[Tab], start: usize) -> Option<usize> {
    Forest::new(tabs).find_root(start)
}

pub fn reachable(tabs: &[Tab], root: usize) -> Vec<usize> {
    Forest::new(tabs).reachable(root)
}

pub fn partition(tabs: &[Tab]) -> Vec<Vec<usize>> {
    Forest::new(tabs).partition()
}
