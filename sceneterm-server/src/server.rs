//! Host-facing inspector server
//!
//! The host creates one [`InspectorServer`] and calls [`InspectorServer::update`]
//! once per tick and [`InspectorServer::draw`] once per frame. Networking runs
//! on a private tokio runtime thread; queued requests are applied during
//! `update`, on the host thread.

use std::net::SocketAddr;
use std::thread::JoinHandle;

use sceneterm_protocol::{Envelope, GameStats, Reply};
use sceneterm_utils::{ConnectionSettings, Result, SceneTermError};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};

use crate::draw::{draw_overlay, DebugCanvas};
use crate::graph::SceneGraph;
use crate::handlers::HandlerContext;
use crate::session::Session;
use crate::tcp::{run_tcp_accept_loop, Request};

/// Requests buffered between the network thread and the host
const REQUEST_QUEUE: usize = 64;

pub struct InspectorServer {
    session: Session,
    requests: mpsc::Receiver<Request>,
    local_addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    net_thread: Option<JoinHandle<()>>,
}

impl InspectorServer {
    /// Bind the configured address and start serving in the background
    pub fn start(settings: &ConnectionSettings) -> Result<Self> {
        let addr = settings.socket_addr();
        let listener = std::net::TcpListener::bind(&addr)
            .map_err(|e| SceneTermError::connection(format!("Failed to bind {}: {}", addr, e)))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (request_tx, requests) = mpsc::channel(REQUEST_QUEUE);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let net_thread = std::thread::Builder::new()
            .name("sceneterm-net".into())
            .spawn(move || {
                runtime.block_on(async move {
                    match tokio::net::TcpListener::from_std(listener) {
                        Ok(listener) => run_tcp_accept_loop(listener, request_tx, shutdown_rx).await,
                        Err(e) => error!("Failed to register listener: {}", e),
                    }
                });
            })?;

        info!(%local_addr, "inspector server listening");

        Ok(Self {
            session: Session::new(),
            requests,
            local_addr,
            shutdown_tx,
            net_thread: Some(net_thread),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Frame statistics reported back through `GameInfo`
    pub fn set_game_stats(&mut self, stats: GameStats) {
        self.session.set_stats(stats);
    }

    /// Per-tick entry point: session bookkeeping, then every queued request
    pub fn update<G: SceneGraph>(&mut self, scene: &mut G, library: &[G]) {
        self.session.update(scene);

        while let Ok(request) = self.requests.try_recv() {
            let reply = self.handle(scene, library, &request.envelope);
            // The connection may have gone away while queued.
            let _ = request.reply_tx.send(reply);
        }
    }

    /// Handle one envelope immediately, bypassing the network
    pub fn handle<G: SceneGraph>(&mut self, scene: &mut G, library: &[G], envelope: &Envelope) -> Reply {
        HandlerContext::new(&mut self.session, scene, library).handle_envelope(envelope)
    }

    pub fn draw<G: SceneGraph, C: DebugCanvas>(&mut self, scene: &G, canvas: &mut C) {
        draw_overlay(&mut self.session, scene, canvas);
    }
}

impl Drop for InspectorServer {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.net_thread.take() {
            if handle.join().is_err() {
                error!("inspector network thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, Transform};
    use futures::{SinkExt, StreamExt};
    use sceneterm_protocol::{
        ClientCodec, Message, NodeDelete, NodeSelect, NodeType, Packet, SceneRefresh,
    };
    use std::time::Duration;
    use tokio_util::codec::Framed;

    fn loopback() -> ConnectionSettings {
        ConnectionSettings {
            port: "0".into(),
            ..Default::default()
        }
    }

    fn scene() -> (MemoryGraph, u64) {
        let mut g = MemoryGraph::new("root");
        let r = g.root();
        let a = g.add(r, "a", NodeType::Model, Transform::default()).unwrap();
        g.add(r, "b", NodeType::Model, Transform::default()).unwrap();
        (g, a)
    }

    #[test]
    fn test_handle_without_network() {
        let mut server = InspectorServer::start(&loopback()).unwrap();
        let (mut g, a) = scene();
        server.update(&mut g, &[]);

        let env = NodeSelect { node_id: a }.encode().unwrap();
        assert!(matches!(server.handle(&mut g, &[], &env), Reply::Accepted(_)));
        assert_eq!(server.session().selected(), Some(a));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_requests_applied_during_update() {
        let mut server = InspectorServer::start(&loopback()).unwrap();
        let addr = server.local_addr();
        let (mut g, a) = scene();

        let client = tokio::spawn(async move {
            let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            let mut framed = Framed::new(stream, ClientCodec::new());

            framed.send(NodeSelect { node_id: a }.encode().unwrap()).await.unwrap();
            framed.next().await.unwrap().unwrap();

            framed.send(NodeDelete::default().encode().unwrap()).await.unwrap();
            let reply = framed.next().await.unwrap().unwrap();

            framed.send(SceneRefresh::default().encode().unwrap()).await.unwrap();
            let refresh = framed.next().await.unwrap().unwrap();
            (reply, refresh)
        });

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !client.is_finished() && std::time::Instant::now() < deadline {
            server.update(&mut g, &[]);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let (reply, refresh) = client.await.unwrap();

        let Reply::Accepted(env) = reply else {
            panic!("delete rejected");
        };
        match Packet::decode(&env).unwrap() {
            Packet::NodeDelete(d) => assert_eq!(d.scene_tree.unwrap().count(), 2),
            other => panic!("unexpected packet {:?}", other),
        }

        let Reply::Accepted(env) = refresh else {
            panic!("refresh rejected");
        };
        let refresh = SceneRefresh::decode(&env).unwrap();
        assert_eq!(refresh.epoch, 1);
        assert!(!g.contains(a));
    }
}
