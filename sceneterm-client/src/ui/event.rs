//! Event handling for the application
//!
//! Combines terminal input with poller results and request outcomes into a
//! unified event stream consumed by the UI loop.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

use sceneterm_protocol::{GameInfo, MessageKind, NodeInfo, Packet, SceneRefresh};

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// Key press
    Key(KeyEvent),
    /// Terminal resize
    Resize { cols: u16, rows: u16 },
    /// Tick for periodic redraws
    Tick,
    /// Periodic structural refresh, with its request sequence number
    SceneRefreshed { seq: u64, refresh: SceneRefresh },
    /// Periodic properties of the selected node
    NodeInfo(NodeInfo),
    /// Periodic frame statistics
    GameInfo(GameInfo),
    /// Answer to a user-issued request, with its request sequence number
    Response { seq: u64, packet: Packet },
    /// A user-issued request failed
    RequestFailed { kind: MessageKind, error: String },
}

/// Event handler that combines input polling with background results
pub struct EventHandler {
    /// Sender for app events
    tx: mpsc::UnboundedSender<AppEvent>,
    /// Receiver for app events
    rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Tick rate for redraws
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, tick_rate }
    }

    /// Get a sender clone for background tasks
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    /// Start polling for terminal events on a background thread
    pub fn start_input_polling(&self) {
        let tx = self.tx.clone();
        let tick_rate = self.tick_rate;

        std::thread::spawn(move || {
            loop {
                // Poll with timeout for tick
                if event::poll(tick_rate).unwrap_or(false) {
                    let sent = match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                            tx.send(AppEvent::Key(key))
                        }
                        Ok(CrosstermEvent::Resize(cols, rows)) => tx.send(AppEvent::Resize { cols, rows }),
                        Ok(_) => Ok(()),
                        Err(e) => {
                            tracing::error!("Error reading terminal event: {}", e);
                            break;
                        }
                    };
                    if sent.is_err() {
                        break;
                    }
                } else if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });
    }

    /// Receive next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Try to receive without blocking
    pub fn try_next(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_send_receive() {
        let mut handler = EventHandler::new(Duration::from_millis(100));
        let sender = handler.sender();

        sender.send(AppEvent::Tick).unwrap();
        sender
            .send(AppEvent::RequestFailed {
                kind: MessageKind::NodeDelete,
                error: "boom".into(),
            })
            .unwrap();

        assert!(matches!(handler.next().await, Some(AppEvent::Tick)));
        assert!(matches!(
            handler.try_next(),
            Some(AppEvent::RequestFailed { kind: MessageKind::NodeDelete, .. })
        ));
        assert!(handler.try_next().is_none());
    }
}
