use std::path::PathBuf;
use tabtree_core::{BrowserHost, TabChange, TabEvent, TabId};
use tabtree_tree::Forest;

use super::event::deliver;
use super::{fresh_window, paths_for, Workspace};

pub async fn show(home: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(home).await?;
    let state = ws.browser.state().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let tabs = ws.manager.snapshot().await?;
    let marks = ws.manager.marks().get().await?;
    let forest = Forest::new(&tabs);

    println!();
    println!("Window: {} tab(s), {} group(s)", tabs.len(), state.groups.len());
    println!("  File: {}", ws.paths.window_file().display());
    println!();
    println!("  {:<5} {:<5} {:<6} {:<7} {:<8} URL", "INDEX", "ID", "FLAGS", "OPENER", "GROUP");
    for (i, tab) in tabs.iter().enumerate() {
        let mut flags = String::new();
        if tab.active {
            flags.push('*');
        } else if tab.highlighted {
            flags.push('h');
        }
        if tab.id.is_some_and(|id| marks.contains(&id)) {
            flags.push('+');
        }
        if tab.was_visited() {
            flags.push('v');
        }
        let id = tab.id.map(|id| id.to_string()).unwrap_or_default();
        let opener = forest
            .parent(i)
            .and_then(|p| tabs[p].id)
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let group = tab.group_id.group().map(|g| g.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<5} {:<5} {:<6} {:<7} {:<8} {}",
            tab.index,
            id,
            flags,
            opener,
            group,
            tab.effective_url().unwrap_or("")
        );
    }
    Ok(())
}

/// Opens a tab the way a browser would and reports its creation.
pub async fn open(home: Option<PathBuf>, url: Option<String>, opener: Option<TabId>, active: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(home).await?;
    let tab = ws.browser.create_tab(opener, url.as_deref(), active).await?;
    let id = tab.id.unwrap_or_default();

    let mut events = vec![TabEvent::Created { tab }];
    if url.is_some() {
        events.push(TabEvent::Updated {
            tab_id: id,
            change: TabChange::NavigationComplete,
        });
    }
    deliver(&ws, events).await?;
    ws.save().await?;

    println!("✓ Opened tab {}", id);
    ws.print_mutations().await?;
    Ok(())
}

pub async fn navigate(home: Option<PathBuf>, id: TabId, url: &str) -> anyhow::Result<()> {
    let ws = Workspace::open(home).await?;
    ws.browser.navigate(id, url).await?;
    deliver(
        &ws,
        vec![TabEvent::Updated {
            tab_id: id,
            change: TabChange::NavigationComplete,
        }],
    )
    .await?;
    ws.save().await?;

    println!("✓ Tab {} navigated to {}", id, url);
    ws.print_mutations().await?;
    Ok(())
}

/// Highlights tabs as the user would, so the engine sees a foreign change.
pub async fn highlight(home: Option<PathBuf>, indices: &[usize]) -> anyhow::Result<()> {
    let ws = Workspace::open(home).await?;
    ws.browser.highlight(indices).await?;
    let tab_ids: Vec<TabId> = ws
        .browser
        .query_tabs()
        .await?
        .iter()
        .filter(|t| t.highlighted)
        .filter_map(|t| t.id)
        .collect();
    deliver(&ws, vec![TabEvent::Highlighted { tab_ids }]).await?;
    ws.save().await?;

    println!("✓ Highlighted {:?}", indices);
    Ok(())
}

pub async fn reset(home: Option<PathBuf>, tabs: usize) -> anyhow::Result<()> {
    let paths = paths_for(home.clone());
    paths.ensure_dirs()?;
    let state = fresh_window(tabs.max(1));
    std::fs::write(paths.window_file(), serde_json::to_string_pretty(&state)?)?;

    let ws = Workspace::open(home).await?;
    ws.storage.reset().await?;
    println!("✓ Window reset with {} tab(s), session cleared", state.tabs.len());
    Ok(())
}
