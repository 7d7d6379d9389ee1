//! Fixtures shared by the operation tests.

use std::sync::Arc;
use tabtree_core::{Config, Tab, TabId};
use tabtree_storage::MemoryStorage;

use crate::manager::TabManager;
use crate::sim::SimulatedBrowser;

/// Tabs with ids `1..=n` in order; `openers[i]` is the opener of tab `i + 1`.
pub fn window(openers: &[Option<TabId>]) -> Vec<Tab> {
    openers
        .iter()
        .enumerate()
        .map(|(i, opener)| {
            let tab = Tab::new(i as TabId + 1, i);
            match opener {
                Some(o) => tab.with_opener(*o),
                None => tab,
            }
        })
        .collect()
}

pub async fn manager_for(tabs: Vec<Tab>) -> (Arc<SimulatedBrowser>, TabManager) {
    manager_with_config(tabs, Config::default()).await
}

pub async fn manager_with_config(tabs: Vec<Tab>, config: Config) -> (Arc<SimulatedBrowser>, TabManager) {
    let browser = Arc::new(SimulatedBrowser::from_tabs(tabs));
    let manager = TabManager::new(browser.clone(), Arc::new(MemoryStorage::new()), config);
    (browser, manager)
}
