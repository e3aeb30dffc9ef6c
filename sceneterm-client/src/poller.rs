//! Background polling loops
//!
//! Three loops run at independent cadences, each doing one request per tick
//! and posting the answer to the UI. A transport failure drops the
//! connection inside [`InspectorClient`]; the next tick dials again. Nothing
//! is retried within a tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use sceneterm_protocol::{GameInfo, Message, NodeInfo, SceneRefresh};
use sceneterm_utils::TRANSPORT_TARGET;

use crate::connection::InspectorClient;
use crate::ui::AppEvent;

pub const SCENE_REFRESH_INTERVAL: Duration = Duration::from_millis(250);
pub const NODE_INFO_INTERVAL: Duration = Duration::from_millis(100);
pub const GAME_INFO_INTERVAL: Duration = Duration::from_millis(200);

/// Running polling loops; stopped on drop
pub struct Pollers {
    running: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl Pollers {
    pub fn spawn(client: &InspectorClient, events: UnboundedSender<AppEvent>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let handles = vec![
            spawn_loop(
                running.clone(),
                client.clone(),
                events.clone(),
                SCENE_REFRESH_INTERVAL,
                |seq, refresh: SceneRefresh| AppEvent::SceneRefreshed { seq, refresh },
            ),
            spawn_loop(
                running.clone(),
                client.clone(),
                events.clone(),
                NODE_INFO_INTERVAL,
                |_, info: NodeInfo| AppEvent::NodeInfo(info),
            ),
            spawn_loop(
                running.clone(),
                client.clone(),
                events,
                GAME_INFO_INTERVAL,
                |_, info: GameInfo| AppEvent::GameInfo(info),
            ),
        ];
        Self { running, handles }
    }

    /// Clear the shared flag; every loop exits at its next check
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Drop for Pollers {
    fn drop(&mut self) {
        self.stop();
        for handle in &self.handles {
            handle.abort();
        }
    }
}

fn spawn_loop<M>(
    running: Arc<AtomicBool>,
    client: InspectorClient,
    events: UnboundedSender<AppEvent>,
    interval: Duration,
    wrap: fn(u64, M) -> AppEvent,
) -> JoinHandle<()>
where
    M: Message + Default + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            if !running.load(Ordering::SeqCst) {
                break;
            }

            let result = client.send_sequenced(M::default()).await;

            // The answer is stale once quitting has begun.
            if !running.load(Ordering::SeqCst) {
                break;
            }

            match result {
                Ok((seq, response)) => {
                    if events.send(wrap(seq, response)).is_err() {
                        break;
                    }
                }
                Err(e) if e.is_retryable() => {
                    tracing::debug!(target: TRANSPORT_TARGET, "poll failed, reconnecting next tick: {}", e);
                }
                Err(e) => {
                    tracing::warn!("poll request failed: {}", e);
                }
            }
        }
    })
}
