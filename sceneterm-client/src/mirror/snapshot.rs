use std::collections::HashMap;

use sceneterm_protocol::{NodeId, SceneNode};

/// A snapshot with parent links derived once, up front
///
/// Wire snapshots carry only child links.
#[derive(Debug)]
pub struct IndexedSnapshot<'a> {
    root: &'a SceneNode,
    /// Pre-order
    order: Vec<&'a SceneNode>,
    parents: HashMap<NodeId, NodeId>,
}

impl<'a> IndexedSnapshot<'a> {
    pub fn new(root: &'a SceneNode) -> Self {
        let mut order = Vec::new();
        let mut parents = HashMap::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            order.push(node);
            for child in node.children.iter().rev() {
                parents.insert(child.id, node.id);
                stack.push(child);
            }
        }
        Self {
            root,
            order,
            parents,
        }
    }

    /// Nodes in pre-order, root first
    pub fn iter(&self) -> impl Iterator<Item = &'a SceneNode> + '_ {
        self.order.iter().copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id == self.root.id || self.parents.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> SceneNode {
        SceneNode::new(1, "root").with_children(vec![
            SceneNode::new(2, "a").with_children(vec![SceneNode::new(4, "a1")]),
            SceneNode::new(3, "b"),
        ])
    }

    #[test]
    fn test_parents_and_order() {
        let t = tree();
        let idx = IndexedSnapshot::new(&t);
        let ids: Vec<NodeId> = idx.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 3]);
        assert_eq!(idx.parent(4), Some(2));
        assert_eq!(idx.parent(3), Some(1));
        assert_eq!(idx.parent(1), None);
        assert!(idx.contains(1) && idx.contains(4));
        assert!(!idx.contains(9));
        assert_eq!(idx.len(), 4);
    }
}
