//! Request handlers for inspector packets
//!
//! This module routes decoded packets to the handler for their kind. Every
//! handler takes the request packet and returns the same packet with its
//! response fields filled in. Handlers run on the host thread, one at a time.

mod debug;
mod node;
mod tree;

use sceneterm_protocol::{Envelope, NodeId, Packet, Reply};
use sceneterm_utils::TRANSPORT_TARGET;
use tracing::{debug, warn};

use crate::graph::SceneGraph;
use crate::session::Session;

/// Context for message handlers
///
/// Borrows everything a handler may touch for the duration of one request.
pub struct HandlerContext<'a, G: SceneGraph> {
    /// Selection, caches and flags
    pub session: &'a mut Session,
    /// The active scene, mutated in place
    pub scene: &'a mut G,
    /// Scenes that `NodeCreate` may instantiate from
    pub library: &'a [G],
}

impl<'a, G: SceneGraph> HandlerContext<'a, G> {
    pub fn new(session: &'a mut Session, scene: &'a mut G, library: &'a [G]) -> Self {
        Self {
            session,
            scene,
            library,
        }
    }

    /// Decode, dispatch and re-encode one request
    pub fn handle_envelope(&mut self, envelope: &Envelope) -> Reply {
        let packet = match Packet::decode(envelope) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(target: TRANSPORT_TARGET, kind = %envelope.kind, "rejecting request: {}", e);
                return Reply::rejected(envelope.kind.clone(), e);
            }
        };

        let kind = packet.kind();
        debug!(target: TRANSPORT_TARGET, %kind, "handling request");
        let response = self.route_message(packet);

        match response.encode() {
            Ok(env) => Reply::Accepted(env),
            Err(e) => {
                warn!(target: TRANSPORT_TARGET, %kind, "failed to encode response: {}", e);
                Reply::rejected(kind.tag(), e)
            }
        }
    }

    /// Route a packet to the appropriate handler
    pub fn route_message(&mut self, packet: Packet) -> Packet {
        match packet {
            // Snapshot and info handlers
            Packet::SceneRefresh(p) => self.handle_scene_refresh(p),
            Packet::NodeInfo(p) => self.handle_node_info(p),
            Packet::GameInfo(p) => self.handle_game_info(p),

            // Transform handlers
            Packet::NodeMove(p) => self.handle_move(p),
            Packet::NodeRotate(p) => self.handle_rotate(p),
            Packet::NodeReset(p) => self.handle_reset(p),
            Packet::CameraFollow(p) => self.handle_camera_follow(p),
            Packet::NodeSelect(p) => self.handle_select(p),

            // Structural handlers
            Packet::NodeCreate(p) => self.handle_create(p),
            Packet::NodeDuplicate(p) => self.handle_duplicate(p),
            Packet::NodeDelete(p) => self.handle_delete(p),
            Packet::NodeMoveInTree(p) => self.handle_move_in_tree(p),

            Packet::ToggleDebugDraw(p) => self.handle_toggle_debug_draw(p),
        }
    }

    /// Current selection, falling back to the root before the first update
    fn selected(&self) -> NodeId {
        self.session
            .selected()
            .filter(|id| self.scene.contains(*id))
            .unwrap_or_else(|| self.scene.root())
    }

    fn is_root(&self, id: NodeId) -> bool {
        id == self.scene.root()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;
    use sceneterm_protocol::{Message, NodeSelect, SceneRefresh, PROTOCOL_VERSION};

    #[test]
    fn test_envelope_round_trip_through_handler() {
        let mut fx = Fixture::new();
        let env = SceneRefresh::default().encode().unwrap();

        match fx.ctx().handle_envelope(&env) {
            Reply::Accepted(resp) => {
                let refresh = SceneRefresh::decode(&resp).unwrap();
                assert_eq!(refresh.scene_tree.unwrap().count(), 5);
                assert_eq!(refresh.epoch, 1);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_malformed_payload_is_rejected_not_fatal() {
        let mut fx = Fixture::new();
        let mut env = NodeSelect { node_id: fx.a }.encode().unwrap();
        env.payload.truncate(2);

        let reply = fx.ctx().handle_envelope(&env);
        assert!(matches!(reply, Reply::Rejected { ref kind, .. } if kind == "NodeSelect"));

        let ok = NodeSelect { node_id: fx.a }.encode().unwrap();
        assert!(matches!(fx.ctx().handle_envelope(&ok), Reply::Accepted(_)));
        assert_eq!(fx.session.selected(), Some(fx.a));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut fx = Fixture::new();
        let env = Envelope {
            protocol_version: PROTOCOL_VERSION,
            kind: "ResetNode".into(),
            payload: vec![],
        };
        match fx.ctx().handle_envelope(&env) {
            Reply::Rejected { kind, reason } => {
                assert_eq!(kind, "ResetNode");
                assert!(reason.contains("Unknown message kind"));
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }
}
