//! Debug overlay drawn over the host's frame

use sceneterm_protocol::{NodeId, Vec3};

use crate::graph::SceneGraph;
use crate::session::Session;

/// Drawing surface supplied by the host each frame.
///
/// Positions are world-space; projecting them is the host's job.
pub trait DebugCanvas {
    /// The camera rendering this frame, if it is a node of the scene
    fn camera(&self) -> Option<NodeId>;

    fn draw_center(&mut self, position: Vec3, highlighted: bool);

    fn draw_label(&mut self, position: Vec3, text: &str, highlighted: bool);

    fn draw_line(&mut self, from: Vec3, to: Vec3);

    fn draw_wireframe(&mut self, node: NodeId);

    fn draw_bounds(&mut self, node: NodeId);
}

/// Mark the selected subtree and any enabled overlays.
///
/// Also remembers the canvas camera for `CameraFollow`.
pub fn draw_overlay<G: SceneGraph, C: DebugCanvas>(session: &mut Session, scene: &G, canvas: &mut C) {
    let camera = canvas.camera();
    session.set_camera(camera);

    let Some(selected) = session.selected().filter(|id| scene.contains(*id)) else {
        return;
    };
    let flags = session.debug_flags();

    for id in scene.descendants(selected) {
        if Some(id) == camera {
            continue;
        }
        let position = scene.world_position(id);
        let highlighted = id == selected;

        canvas.draw_center(position, highlighted);
        canvas.draw_label(position, scene.name(id).unwrap_or_default(), highlighted);

        if flags.hierarchy {
            if let Some(parent) = scene.parent(id) {
                canvas.draw_line(position, scene.world_position(parent));
            }
        }
        if flags.wireframe {
            canvas.draw_wireframe(id);
        }
        if flags.bounds {
            canvas.draw_bounds(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, Transform};
    use sceneterm_protocol::{DebugLayer, NodeType};

    #[derive(Default)]
    struct Recorder {
        camera: Option<NodeId>,
        labels: Vec<(String, bool)>,
        lines: usize,
        wireframes: Vec<NodeId>,
        bounds: Vec<NodeId>,
    }

    impl DebugCanvas for Recorder {
        fn camera(&self) -> Option<NodeId> {
            self.camera
        }

        fn draw_center(&mut self, _position: Vec3, _highlighted: bool) {}

        fn draw_label(&mut self, _position: Vec3, text: &str, highlighted: bool) {
            self.labels.push((text.to_string(), highlighted));
        }

        fn draw_line(&mut self, _from: Vec3, _to: Vec3) {
            self.lines += 1;
        }

        fn draw_wireframe(&mut self, node: NodeId) {
            self.wireframes.push(node);
        }

        fn draw_bounds(&mut self, node: NodeId) {
            self.bounds.push(node);
        }
    }

    fn scene() -> (MemoryGraph, NodeId, NodeId) {
        let mut g = MemoryGraph::new("root");
        let r = g.root();
        let cube = g.add(r, "cube", NodeType::Model, Transform::default()).unwrap();
        g.add(cube, "lamp", NodeType::Light, Transform::default()).unwrap();
        let cam = g.add(cube, "cam", NodeType::Camera, Transform::default()).unwrap();
        (g, cube, cam)
    }

    #[test]
    fn test_labels_selected_subtree_without_camera() {
        let (g, cube, cam) = scene();
        let mut session = Session::new();
        session.update(&g);
        session.select(cube);

        let mut canvas = Recorder {
            camera: Some(cam),
            ..Default::default()
        };
        draw_overlay(&mut session, &g, &mut canvas);

        assert_eq!(
            canvas.labels,
            vec![("cube".to_string(), true), ("lamp".to_string(), false)]
        );
        assert_eq!(canvas.lines, 0);
        assert!(canvas.wireframes.is_empty());
        assert_eq!(session.camera(), Some(cam));
    }

    #[test]
    fn test_flags_gate_overlays() {
        let (g, cube, _) = scene();
        let mut session = Session::new();
        session.update(&g);
        session.select(cube);
        session.toggle_debug(DebugLayer::Hierarchy);
        session.toggle_debug(DebugLayer::Bounds);

        let mut canvas = Recorder::default();
        draw_overlay(&mut session, &g, &mut canvas);

        assert_eq!(canvas.lines, 3);
        assert_eq!(canvas.bounds.len(), 3);
        assert!(canvas.wireframes.is_empty());
    }
}
