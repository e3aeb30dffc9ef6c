//! Scene graph abstraction the inspector operates on
//!
//! The host's 3D library sits behind [`SceneGraph`]. Node ids are the stable
//! identities that appear in snapshots; a graph is identified by its root id,
//! so replacing the active scene shows up as a new identity.

mod memory;

pub use memory::MemoryGraph;

use sceneterm_protocol::{Mat3, NodeId, NodeType, SceneNode, Vec3};

/// Local transform of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Mat3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Mat3::IDENTITY,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Map a point from this transform's local space into its parent's space
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let scaled = Vec3::new(p.x * self.scale.x, p.y * self.scale.y, p.z * self.scale.z);
        self.rotation.transform(scaled) + self.position
    }
}

/// Mutable hierarchical scene owned by the host.
///
/// Methods taking an id are no-ops (or return `None`/empty) for ids the graph
/// does not contain.
pub trait SceneGraph {
    fn root(&self) -> NodeId;

    /// Identity of the scene as a whole
    fn identity(&self) -> NodeId {
        self.root()
    }

    fn contains(&self, id: NodeId) -> bool;

    fn name(&self, id: NodeId) -> Option<&str>;

    fn set_name(&mut self, id: NodeId, name: &str);

    fn children(&self, id: NodeId) -> &[NodeId];

    fn parent(&self, id: NodeId) -> Option<NodeId>;

    fn local_transform(&self, id: NodeId) -> Option<Transform>;

    fn set_local_transform(&mut self, id: NodeId, transform: Transform);

    fn visible(&self, id: NodeId) -> bool;

    fn node_type(&self, id: NodeId) -> NodeType;

    /// Deep copy of a subtree with fresh ids, left detached
    fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId>;

    /// Deep copy of a subtree from another graph with fresh ids, left detached
    fn import_subtree(&mut self, source: &Self, id: NodeId) -> Option<NodeId>;

    /// Move `child` (with its subtree) to the end of `parent`'s children.
    ///
    /// Refuses to move the root or to create a cycle; returns whether it
    /// happened.
    fn attach(&mut self, child: NodeId, parent: NodeId) -> bool;

    /// Move a node to `index` among its siblings, clamped to the valid range
    fn reindex_child(&mut self, id: NodeId, index: usize);

    /// Detach a node and drop its whole subtree
    fn remove(&mut self, id: NodeId);

    /// Position among the parent's children
    fn index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// The node and everything below it, in pre-order
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    /// Whether `id` lies in the subtree rooted at `ancestor` (inclusive)
    fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(n) = cursor {
            if n == ancestor {
                return true;
            }
            cursor = self.parent(n);
        }
        false
    }

    fn translate(&mut self, id: NodeId, delta: Vec3) {
        if let Some(mut t) = self.local_transform(id) {
            t.position = t.position + delta;
            self.set_local_transform(id, t);
        }
    }

    /// Rotate about `axis` by `angle` radians; a zero axis leaves the node alone
    fn rotate(&mut self, id: NodeId, axis: Vec3, angle: f64) {
        let Some(rotation) = Mat3::from_axis_angle(axis, angle) else {
            return;
        };
        if let Some(mut t) = self.local_transform(id) {
            t.rotation = rotation * t.rotation;
            self.set_local_transform(id, t);
        }
    }

    fn world_position(&self, id: NodeId) -> Vec3 {
        let mut p = Vec3::ZERO;
        let mut cursor = Some(id);
        while let Some(n) = cursor {
            if let Some(t) = self.local_transform(n) {
                p = t.apply(p);
            }
            cursor = self.parent(n);
        }
        p
    }

    /// Wire snapshot of the subtree rooted at `id`
    fn snapshot_from(&self, id: NodeId) -> SceneNode {
        SceneNode {
            id,
            name: self.name(id).unwrap_or_default().to_string(),
            children: self
                .children(id)
                .iter()
                .map(|c| self.snapshot_from(*c))
                .collect(),
        }
    }

    fn snapshot(&self) -> SceneNode {
        self.snapshot_from(self.root())
    }
}
