//! Scene tree snapshot types

use serde::{Deserialize, Serialize};

/// Stable node identity assigned by the host's scene graph
pub type NodeId = u64;

/// One node of a scene tree snapshot.
///
/// `id` is unique within a snapshot and stays the same across snapshots for
/// the same graph node. Child order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SceneNode>) -> Self {
        self.children = children;
        self
    }

    /// Total number of nodes in this subtree, including self
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order traversal of the subtree
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        self.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Ids of the subtree in pre-order
    pub fn ids(&self) -> Vec<NodeId> {
        self.iter().map(|n| n.id).collect()
    }
}

/// Pre-order iterator over a [`SceneNode`] subtree
pub struct PreOrder<'a> {
    stack: Vec<&'a SceneNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a SceneNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Kind of object a graph node represents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[default]
    Node,
    Model,
    Camera,
    Light,
    Path,
    Grid,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Node => "Node",
            NodeType::Model => "Model",
            NodeType::Camera => "Camera",
            NodeType::Light => "Light",
            NodeType::Path => "Path",
            NodeType::Grid => "Grid",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural move applied by `NodeMoveInTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Become the last child of the preceding sibling
    Indent,
    /// Become the parent's next sibling
    DeIndent,
    MoveUp,
    MoveDown,
}

/// Debug overlay layers the host can draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebugLayer {
    Hierarchy,
    Wireframe,
    Bounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SceneNode {
        SceneNode::new(1, "root").with_children(vec![
            SceneNode::new(2, "a").with_children(vec![SceneNode::new(4, "a1")]),
            SceneNode::new(3, "b"),
        ])
    }

    #[test]
    fn test_preorder_ids() {
        assert_eq!(sample().ids(), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_count_and_find() {
        let tree = sample();
        assert_eq!(tree.count(), 4);
        assert_eq!(tree.find(4).map(|n| n.name.as_str()), Some("a1"));
        assert!(!tree.contains(99));
    }

    #[test]
    fn test_node_type_display() {
        assert_eq!(NodeType::Camera.to_string(), "Camera");
        assert_eq!(NodeType::default(), NodeType::Node);
    }
}
