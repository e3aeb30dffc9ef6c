//! Client-side mirror of the server's scene tree
//!
//! Snapshots arrive whole. The mirror maps them by node id onto a persistent
//! presentation tree so that UI-only state (expansion, the cursor) survives
//! each refresh.

mod reconcile;
mod snapshot;

use std::fmt::Debug;
use std::hash::Hash;

use sceneterm_protocol::NodeId;

pub use reconcile::Mirror;
pub use snapshot::IndexedSnapshot;

/// Presentation tree the mirror drives
///
/// Implemented by whatever widget renders the tree. Handles stay valid until
/// passed to [`TreeWidget::remove_node`].
pub trait TreeWidget {
    type Handle: Copy + Eq + Hash + Debug;

    /// Create a detached node carrying `id` as its payload
    fn create_node(&mut self, label: &str, id: NodeId) -> Self::Handle;

    fn set_label(&mut self, node: Self::Handle, label: &str);

    /// Replace the node's children, in order
    fn set_children(&mut self, node: Self::Handle, children: &[Self::Handle]);

    fn set_root(&mut self, node: Self::Handle);

    /// The node under the cursor
    fn current(&self) -> Option<Self::Handle>;

    fn set_current(&mut self, node: Self::Handle);

    fn is_expanded(&self, node: Self::Handle) -> bool;

    fn set_expanded(&mut self, node: Self::Handle, expanded: bool);

    fn payload(&self, node: Self::Handle) -> Option<NodeId>;

    fn remove_node(&mut self, node: Self::Handle);
}

/// Tree label with its expansion marker
pub fn decorate(name: &str, has_children: bool, expanded: bool) -> String {
    let marker = match (has_children, expanded) {
        (true, true) => "[=] ",
        (true, false) => "[+] ",
        (false, _) => " +  ",
    };
    format!("{}{}", marker, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decorate() {
        assert_eq!(decorate("Cube", true, true), "[=] Cube");
        assert_eq!(decorate("Cube", true, false), "[+] Cube");
        assert_eq!(decorate("Lamp", false, true), " +  Lamp");
        assert_eq!(decorate("Lamp", false, false), " +  Lamp");
    }
}
