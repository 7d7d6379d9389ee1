pub mod config_cmd;
pub mod event;
pub mod exec;
pub mod window;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabtree_actions::{SimulatedBrowser, TabManager, WindowState, NEW_TAB_URL};
use tabtree_core::{Config, Paths, Tab, TabId};
use tabtree_storage::FileStorage;
use tracing::debug;

pub fn paths_for(home: Option<PathBuf>) -> Paths {
    home.map(Paths::with_base).unwrap_or_default()
}

/// A window of `count` new-tab pages.
pub fn fresh_window(count: usize) -> WindowState {
    let tabs = (0..count)
        .map(|i| Tab::new(i as TabId + 1, i).with_url(NEW_TAB_URL))
        .collect();
    WindowState::from_tabs(tabs)
}

fn load_window(path: &Path) -> anyhow::Result<WindowState> {
    if !path.exists() {
        debug!(path = %path.display(), "No window state yet, starting with one tab");
        return Ok(fresh_window(1));
    }
    let content = std::fs::read_to_string(path)?;
    let state: WindowState = serde_json::from_str(&content)?;
    Ok(state)
}

/// Simulated window, session storage and engine wired together for one
/// CLI invocation.
pub struct Workspace {
    pub paths: Paths,
    pub storage: Arc<FileStorage>,
    pub browser: Arc<SimulatedBrowser>,
    pub manager: Arc<TabManager>,
}

impl Workspace {
    pub async fn open(home: Option<PathBuf>) -> anyhow::Result<Self> {
        let paths = paths_for(home);
        paths.ensure_dirs()?;
        let config = Config::load_or_default(&paths)?;
        let state = load_window(&paths.window_file())?;

        let storage = Arc::new(FileStorage::new(&paths));
        let browser = Arc::new(SimulatedBrowser::new(state));
        let manager = Arc::new(TabManager::new(browser.clone(), storage.clone(), config));
        manager.reconcile().await?;

        Ok(Self {
            paths,
            storage,
            browser,
            manager,
        })
    }

    pub async fn save(&self) -> anyhow::Result<()> {
        let state = self.browser.state().await;
        let content = serde_json::to_string_pretty(&state)?;
        std::fs::write(self.paths.window_file(), content)?;
        Ok(())
    }

    /// Prints the host mutations issued during this invocation.
    pub async fn print_mutations(&self) -> anyhow::Result<()> {
        let mutations = self.browser.mutations().await;
        if mutations.is_empty() {
            println!("  (no changes)");
        }
        for mutation in &mutations {
            println!("  → {}", serde_json::to_string(mutation)?);
        }
        Ok(())
    }
}
