use std::path::PathBuf;
use tabtree_actions::{run_event_loop, EventBus};
use tabtree_core::types::position_of;
use tabtree_core::{BrowserHost, TabChange, TabEvent, TabId};
use tracing::warn;

use super::Workspace;

/// Event as given on the command line, before it is resolved against the
/// window.
pub enum Incoming {
    Created { id: TabId, opener: Option<TabId> },
    Removed { id: TabId },
    Navigated { id: TabId },
    Highlighted { ids: Vec<TabId> },
}

/// Applies the browser side of the event to the window, then lets the
/// engine observe it.
pub async fn run(home: Option<PathBuf>, incoming: Incoming) -> anyhow::Result<()> {
    let ws = Workspace::open(home).await?;

    let event = match incoming {
        Incoming::Created { id, opener } => {
            let mut tab = ws.browser.get_tab(id).await?;
            if opener.is_some() {
                tab.opener_tab_id = opener;
            }
            TabEvent::Created { tab }
        }
        Incoming::Removed { id } => {
            if let Err(e) = ws.browser.close_tabs(&[id]).await {
                warn!(tab_id = id, error = %e, "Tab already gone from the window");
            }
            TabEvent::Removed { tab_id: id }
        }
        Incoming::Navigated { id } => TabEvent::Updated {
            tab_id: id,
            change: TabChange::NavigationComplete,
        },
        Incoming::Highlighted { ids } => {
            let tabs = ws.browser.query_tabs().await?;
            let indices: Vec<usize> = ids.iter().filter_map(|&id| position_of(&tabs, id)).collect();
            if indices.len() != ids.len() {
                anyhow::bail!("unknown tab id in {:?}", ids);
            }
            ws.browser.highlight(&indices).await?;
            TabEvent::Highlighted { tab_ids: ids }
        }
    };

    let kind = event.kind();
    deliver(&ws, vec![event]).await?;
    ws.save().await?;

    println!("✓ Delivered {} event", kind);
    ws.print_mutations().await?;
    Ok(())
}

/// Feeds events through the bus and waits until the loop has drained them.
pub async fn deliver(ws: &Workspace, events: Vec<TabEvent>) -> anyhow::Result<usize> {
    let (tx, rx) = EventBus::new(events.len().max(1)).split();
    for event in events {
        tx.send(event).await?;
    }
    drop(tx);
    Ok(run_event_loop(ws.manager.clone(), rx, None).await)
}
