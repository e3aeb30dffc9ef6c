use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use sceneterm_protocol::{NodeId, NodeType};

use super::{SceneGraph, Transform};

/// Ids are unique process-wide so nodes imported between graphs never collide
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> NodeId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    transform: Transform,
    visible: bool,
    node_type: NodeType,
}

/// Plain in-memory scene graph
#[derive(Debug, Clone)]
pub struct MemoryGraph {
    root: NodeId,
    nodes: HashMap<NodeId, Entry>,
}

impl MemoryGraph {
    pub fn new(root_name: &str) -> Self {
        let root = next_id();
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Entry {
                name: root_name.to_string(),
                parent: None,
                children: Vec::new(),
                transform: Transform::default(),
                visible: true,
                node_type: NodeType::Node,
            },
        );
        Self { root, nodes }
    }

    /// Append a new node under `parent`.
    ///
    /// Returns `None` when `parent` is not in the graph.
    pub fn add(
        &mut self,
        parent: NodeId,
        name: &str,
        node_type: NodeType,
        transform: Transform,
    ) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = next_id();
        self.nodes.insert(
            id,
            Entry {
                name: name.to_string(),
                parent: Some(parent),
                children: Vec::new(),
                transform,
                visible: true,
                node_type,
            },
        );
        self.nodes.get_mut(&parent)?.children.push(id);
        Some(id)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(e) = self.nodes.get_mut(&id) {
            e.visible = visible;
        }
    }

    /// First node in pre-order with exactly this name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.name(*id) == Some(name))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.nodes.get_mut(&id).and_then(|e| e.parent.take());
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
    }

    /// Clones of the entries under `id`, in pre-order
    fn subtree_entries(&self, id: NodeId) -> Option<Vec<(NodeId, Entry)>> {
        if !self.contains(id) {
            return None;
        }
        Some(
            self.descendants(id)
                .into_iter()
                .filter_map(|n| self.nodes.get(&n).map(|e| (n, e.clone())))
                .collect(),
        )
    }

    /// Insert copied entries under fresh ids. The first entry becomes the
    /// detached top of the copy.
    fn insert_copies(&mut self, entries: Vec<(NodeId, Entry)>) -> Option<NodeId> {
        let top = entries.first()?.0;
        let fresh: HashMap<NodeId, NodeId> =
            entries.iter().map(|(old, _)| (*old, next_id())).collect();

        for (old, mut entry) in entries {
            let Some(&new_id) = fresh.get(&old) else {
                continue;
            };
            entry.parent = if old == top {
                None
            } else {
                entry.parent.and_then(|p| fresh.get(&p).copied())
            };
            entry.children = entry
                .children
                .iter()
                .filter_map(|c| fresh.get(c).copied())
                .collect();
            self.nodes.insert(new_id, entry);
        }
        fresh.get(&top).copied()
    }
}

impl SceneGraph for MemoryGraph {
    fn root(&self) -> NodeId {
        self.root
    }

    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|e| e.name.as_str())
    }

    fn set_name(&mut self, id: NodeId, name: &str) {
        if let Some(e) = self.nodes.get_mut(&id) {
            e.name = name.to_string();
        }
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|e| e.parent)
    }

    fn local_transform(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(&id).map(|e| e.transform)
    }

    fn set_local_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(e) = self.nodes.get_mut(&id) {
            e.transform = transform;
        }
    }

    fn visible(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(|e| e.visible).unwrap_or(false)
    }

    fn node_type(&self, id: NodeId) -> NodeType {
        self.nodes.get(&id).map(|e| e.node_type).unwrap_or_default()
    }

    fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let entries = self.subtree_entries(id)?;
        self.insert_copies(entries)
    }

    fn import_subtree(&mut self, source: &Self, id: NodeId) -> Option<NodeId> {
        let entries = source.subtree_entries(id)?;
        self.insert_copies(entries)
    }

    fn attach(&mut self, child: NodeId, parent: NodeId) -> bool {
        if child == self.root
            || !self.contains(child)
            || !self.contains(parent)
            || self.is_within(parent, child)
        {
            return false;
        }
        self.detach(child);
        if let Some(e) = self.nodes.get_mut(&child) {
            e.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        true
    }

    fn reindex_child(&mut self, id: NodeId, index: usize) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(p) = self.nodes.get_mut(&parent) else {
            return;
        };
        p.children.retain(|c| *c != id);
        let index = index.min(p.children.len());
        p.children.insert(index, id);
    }

    fn remove(&mut self, id: NodeId) {
        if id == self.root || !self.contains(id) {
            return;
        }
        self.detach(id);
        for n in self.descendants(id) {
            self.nodes.remove(&n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sceneterm_protocol::Vec3;

    fn names(g: &MemoryGraph, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|id| g.name(*id).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_add_and_snapshot() {
        let mut g = MemoryGraph::new("root");
        let a = g.add(g.root(), "a", NodeType::Model, Transform::default()).unwrap();
        g.add(a, "a1", NodeType::Node, Transform::default()).unwrap();
        g.add(g.root(), "b", NodeType::Light, Transform::default()).unwrap();

        let snap = g.snapshot();
        let order: Vec<_> = snap.iter().map(|n| n.name.clone()).collect();
        assert_eq!(order, vec!["root", "a", "a1", "b"]);
        assert_eq!(g.node_type(a), NodeType::Model);
    }

    #[test]
    fn test_clone_subtree_gets_fresh_ids() {
        let mut g = MemoryGraph::new("root");
        let a = g.add(g.root(), "a", NodeType::Node, Transform::default()).unwrap();
        let a1 = g.add(a, "a1", NodeType::Node, Transform::default()).unwrap();
        let a2 = g.add(a, "a2", NodeType::Light, Transform::default()).unwrap();
        g.add(g.root(), "b", NodeType::Node, Transform::default()).unwrap();
        let before = g.len();

        let copy = g.clone_subtree(a).unwrap();
        assert_eq!(g.len(), before + 3);
        assert_ne!(copy, a);
        assert!(g.parent(copy).is_none());
        let kids = g.children(copy).to_vec();
        assert_eq!(names(&g, &kids), vec!["a1", "a2"]);
        assert!(!kids.contains(&a1) && !kids.contains(&a2));
        assert_eq!(g.parent(kids[1]), Some(copy));
        assert_eq!(g.node_type(kids[1]), NodeType::Light);
        assert_eq!(g.children(a), &[a1, a2]);
        assert_eq!(g.clone_subtree(999_999_999), None);
    }

    #[test]
    fn test_attach_refuses_cycles_and_root() {
        let mut g = MemoryGraph::new("root");
        let a = g.add(g.root(), "a", NodeType::Node, Transform::default()).unwrap();
        let a1 = g.add(a, "a1", NodeType::Node, Transform::default()).unwrap();

        assert!(!g.attach(a, a1));
        assert!(!g.attach(g.root(), a));
        assert!(g.attach(a1, g.root()));
        assert_eq!(names(&g, g.children(g.root())), vec!["a", "a1"]);
    }

    #[test]
    fn test_reindex_clamps() {
        let mut g = MemoryGraph::new("root");
        let r = g.root();
        let a = g.add(r, "a", NodeType::Node, Transform::default()).unwrap();
        g.add(r, "b", NodeType::Node, Transform::default()).unwrap();

        g.reindex_child(a, 99);
        assert_eq!(names(&g, g.children(r)), vec!["b", "a"]);
        assert_eq!(g.index(a), Some(1));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut g = MemoryGraph::new("root");
        let a = g.add(g.root(), "a", NodeType::Node, Transform::default()).unwrap();
        let a1 = g.add(a, "a1", NodeType::Node, Transform::default()).unwrap();

        g.remove(a);
        assert!(!g.contains(a));
        assert!(!g.contains(a1));
        assert!(g.children(g.root()).is_empty());
        g.remove(g.root());
        assert!(g.contains(g.root()));
    }

    #[test]
    fn test_world_position_accumulates() {
        let mut g = MemoryGraph::new("root");
        let a = g
            .add(g.root(), "a", NodeType::Node, Transform::at(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        let b = g
            .add(a, "b", NodeType::Node, Transform::at(Vec3::new(0.0, 2.0, 0.0)))
            .unwrap();
        assert_eq!(g.world_position(b), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_import_from_other_graph() {
        let mut library = MemoryGraph::new("props");
        let crate_id = library
            .add(library.root(), "Crate", NodeType::Model, Transform::default())
            .unwrap();

        let mut scene = MemoryGraph::new("level");
        let imported = scene.import_subtree(&library, crate_id).unwrap();
        assert!(scene.attach(imported, scene.root()));
        assert_eq!(scene.find_by_name("Crate"), Some(imported));
        assert!(library.contains(crate_id));
    }
}
