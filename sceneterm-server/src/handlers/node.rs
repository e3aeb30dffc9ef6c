//! Handlers acting on the selected node without changing tree shape

use sceneterm_protocol::{
    CameraFollow, GameInfo, Message, NodeInfo, NodeMove, NodeReset, NodeRotate, NodeSelect,
    Packet, SceneRefresh, Vec3,
};
use tracing::debug;

use super::HandlerContext;
use crate::graph::{SceneGraph, Transform};

/// Distance the camera is placed behind a node it follows
const FOLLOW_DISTANCE: f64 = 10.0;

impl<'a, G: SceneGraph> HandlerContext<'a, G> {
    pub(super) fn handle_scene_refresh(&mut self, mut packet: SceneRefresh) -> Packet {
        packet.scene_tree = Some(self.scene.snapshot());
        packet.epoch = self.session.epoch();
        packet.into_packet()
    }

    pub(super) fn handle_move(&mut self, packet: NodeMove) -> Packet {
        let selected = self.selected();
        self.scene.translate(selected, Vec3::new(packet.x, packet.y, packet.z));
        packet.into_packet()
    }

    pub(super) fn handle_rotate(&mut self, packet: NodeRotate) -> Packet {
        let selected = self.selected();
        self.scene.rotate(
            selected,
            Vec3::new(packet.x, packet.y, packet.z),
            packet.angle,
        );
        packet.into_packet()
    }

    pub(super) fn handle_select(&mut self, packet: NodeSelect) -> Packet {
        if self.scene.is_within(packet.node_id, self.scene.root()) {
            self.session.select(packet.node_id);
        } else {
            debug!(node_id = packet.node_id, "select: node not in active scene");
        }
        packet.into_packet()
    }

    /// Restore the selection's original parent and transform, then the
    /// original transforms of everything below it
    pub(super) fn handle_reset(&mut self, packet: NodeReset) -> Packet {
        let selected = self.selected();
        let nodes = self.scene.descendants(selected);

        for (i, id) in nodes.into_iter().enumerate() {
            let Some(og) = self.session.original_or_record(&*self.scene, id) else {
                continue;
            };
            if i == 0 {
                if let Some(parent) = og.parent {
                    if self.scene.parent(id) != Some(parent)
                        && self.scene.contains(parent)
                        && !self.scene.is_within(parent, id)
                    {
                        self.scene.attach(id, parent);
                    }
                }
            }
            self.scene.set_local_transform(id, og.transform);
        }
        packet.into_packet()
    }

    pub(super) fn handle_camera_follow(&mut self, packet: CameraFollow) -> Packet {
        let selected = self.selected();
        let Some(camera) = self.session.camera().filter(|c| self.scene.contains(*c)) else {
            debug!("camera follow: no camera known yet");
            return packet.into_packet();
        };
        if self.scene.is_within(selected, camera) {
            return packet.into_packet();
        }
        if self.scene.attach(camera, selected) {
            self.scene.set_local_transform(
                camera,
                Transform::at(Vec3::new(0.0, 0.0, FOLLOW_DISTANCE)),
            );
        }
        packet.into_packet()
    }

    pub(super) fn handle_node_info(&mut self, mut packet: NodeInfo) -> Packet {
        let selected = self.selected();
        let t = self.scene.local_transform(selected).unwrap_or_default();
        packet.id = selected;
        packet.position = t.position;
        packet.scale = t.scale;
        packet.rotation = t.rotation;
        packet.visible = self.scene.visible(selected);
        packet.node_type = self.scene.node_type(selected);
        packet.into_packet()
    }

    pub(super) fn handle_game_info(&mut self, mut packet: GameInfo) -> Packet {
        let stats = self.session.stats();
        packet.fps = stats.fps;
        packet.tps = stats.tps;
        packet.debug_info = stats.debug.clone();
        packet.into_packet()
    }
}
