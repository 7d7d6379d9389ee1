use std::sync::Arc;
use tabtree_core::TabEvent;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::manager::TabManager;

pub struct EventBus {
    pub tx: mpsc::Sender<TabEvent>,
    pub rx: mpsc::Receiver<TabEvent>,
}

impl EventBus {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, rx) = mpsc::channel(buffer_size);
        Self { tx, rx }
    }

    pub fn split(self) -> (mpsc::Sender<TabEvent>, mpsc::Receiver<TabEvent>) {
        (self.tx, self.rx)
    }
}

/// Handles events one at a time until the channel closes or shutdown is
/// signalled. A failing event is logged and does not stop the loop.
/// Returns the number of events handled.
pub async fn run_event_loop(
    manager: Arc<TabManager>,
    mut rx: mpsc::Receiver<TabEvent>,
    mut shutdown_rx: Option<broadcast::Receiver<()>>,
) -> usize {
    info!("Tab event loop started");
    let mut handled = 0;

    loop {
        tokio::select! {
            _ = async {
                if let Some(ref mut rx) = shutdown_rx {
                    let _ = rx.recv().await;
                } else {
                    std::future::pending::<()>().await;
                }
            } => {
                debug!("Shutdown signalled");
                break;
            }
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        let kind = event.kind();
                        if let Err(e) = manager.handle_event(event).await {
                            warn!(kind, error = %e, "Tab event failed");
                        }
                        handled += 1;
                    }
                    None => break, // channel closed
                }
            }
        }
    }

    info!(handled, "Tab event loop stopped");
    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{manager_for, window};
    use tabtree_core::{Command, Tab};

    #[tokio::test]
    async fn test_events_processed_in_order() {
        let (browser, manager) = manager_for(window(&[None, None, None])).await;
        let manager = Arc::new(manager);
        let (tx, rx) = EventBus::new(16).split();

        tx.send(TabEvent::Created { tab: Tab::new(2, 1).with_opener(1) }).await.unwrap();
        tx.send(TabEvent::Command { command: Command::CloseOtherTrees }).await.unwrap();
        tx.send(TabEvent::Removed { tab_id: 99 }).await.unwrap();
        drop(tx);

        let handled = run_event_loop(manager.clone(), rx, None).await;
        assert_eq!(handled, 3);
        assert_eq!(browser.order().await, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let (browser, manager) = manager_for(window(&[None, None])).await;
        let manager = Arc::new(manager);
        let (tx, rx) = EventBus::new(4).split();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task = tokio::spawn(run_event_loop(manager.clone(), rx, Some(shutdown_rx)));
        tx.send(TabEvent::Highlighted { tab_ids: vec![7] }).await.unwrap();
        tx.send(TabEvent::Command { command: Command::CloseOtherTabs }).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        shutdown_tx.send(()).unwrap();

        assert_eq!(task.await.unwrap(), 2);
        assert_eq!(browser.order().await, vec![1]);
    }
}
