//! Handlers that change the shape of the scene tree
//!
//! Each returns the node the client should select next along with a fresh
//! snapshot. Requests that turn out to be no-ops leave both fields empty.

use lazy_static::lazy_static;
use regex::Regex;
use sceneterm_protocol::{
    Message, MoveDirection, NodeCreate, NodeDelete, NodeDuplicate, NodeId, NodeMoveInTree, Packet,
};
use tracing::{debug, info};

use super::HandlerContext;
use crate::graph::SceneGraph;

lazy_static! {
    /// Trailing `<NNNN>` tag appended by a previous duplicate
    static ref DUPLICATE_TAG: Regex = Regex::new(r"<[0-9]{4}>$").unwrap();
}

/// Name for a duplicate: any previous tag replaced by a fresh one
pub(crate) fn duplicate_name(name: &str) -> String {
    let base = DUPLICATE_TAG.replace(name, "");
    format!("{}<{:04}>", base, fastrand::u32(0..10_000))
}

/// Distinct names of every non-root node across `scenes`, first sighting first
pub(crate) fn viable_names<G: SceneGraph>(scenes: &[&G]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for scene in scenes {
        for id in scene.descendants(scene.root()).into_iter().skip(1) {
            if let Some(name) = scene.name(id) {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}

fn find_named<G: SceneGraph>(scene: &G, name: &str) -> Option<NodeId> {
    scene
        .descendants(scene.root())
        .into_iter()
        .skip(1)
        .find(|id| scene.name(*id) == Some(name))
}

impl<'a, G: SceneGraph> HandlerContext<'a, G> {
    pub(super) fn handle_create(&mut self, mut packet: NodeCreate) -> Packet {
        if packet.node_to_create.is_empty() {
            packet.viable_nodes = if self.library.is_empty() {
                viable_names(&[&*self.scene])
            } else {
                viable_names(&self.library.iter().collect::<Vec<_>>())
            };
            return packet.into_packet();
        }

        let name = packet.node_to_create.as_str();
        let clone = if self.library.is_empty() {
            find_named(&*self.scene, name).and_then(|id| self.scene.clone_subtree(id))
        } else {
            let library = self.library;
            library.iter().find_map(|lib| {
                let id = find_named(lib, name)?;
                self.scene.import_subtree(lib, id)
            })
        };

        let Some(clone) = clone else {
            debug!(node_name = name, "create: no node with that name");
            return packet.into_packet();
        };

        let root = self.scene.root();
        self.scene.attach(clone, root);
        self.session.select(clone);
        info!(node_name = name, id = clone, "created node");

        packet.new_selected_node = Some(clone);
        packet.scene_tree = Some(self.scene.snapshot());
        packet.into_packet()
    }

    pub(super) fn handle_duplicate(&mut self, mut packet: NodeDuplicate) -> Packet {
        let selected = self.selected();
        if self.is_root(selected) {
            return packet.into_packet();
        }
        let (Some(parent), Some(index)) = (self.scene.parent(selected), self.scene.index(selected))
        else {
            return packet.into_packet();
        };
        let Some(clone) = self.scene.clone_subtree(selected) else {
            return packet.into_packet();
        };

        let name = duplicate_name(self.scene.name(selected).unwrap_or_default());
        self.scene.set_name(clone, &name);
        self.scene.attach(clone, parent);
        self.scene.reindex_child(clone, index + 1);
        self.session.select(clone);
        debug!(source = selected, id = clone, new_name = %name, "duplicated node");

        packet.new_selected_node = Some(clone);
        packet.scene_tree = Some(self.scene.snapshot());
        packet.into_packet()
    }

    /// Remove the selection; the prior sibling, or the parent when no
    /// siblings remain, becomes selected
    pub(super) fn handle_delete(&mut self, mut packet: NodeDelete) -> Packet {
        let selected = self.selected();
        if self.is_root(selected) {
            return packet.into_packet();
        }
        let (Some(parent), Some(index)) = (self.scene.parent(selected), self.scene.index(selected))
        else {
            return packet.into_packet();
        };

        self.scene.remove(selected);

        let siblings = self.scene.children(parent);
        let next = if siblings.is_empty() {
            parent
        } else {
            siblings[index.saturating_sub(1).min(siblings.len() - 1)]
        };
        self.session.select(next);
        debug!(removed = selected, selected = next, "deleted node");

        packet.new_selected_node = Some(next);
        packet.scene_tree = Some(self.scene.snapshot());
        packet.into_packet()
    }

    pub(super) fn handle_move_in_tree(&mut self, mut packet: NodeMoveInTree) -> Packet {
        let node = self.selected();
        if self.is_root(node) {
            return packet.into_packet();
        }
        let (Some(parent), Some(index)) = (self.scene.parent(node), self.scene.index(node)) else {
            return packet.into_packet();
        };
        let sibling_count = self.scene.children(parent).len();

        match packet.move_dir {
            MoveDirection::MoveUp => {
                if index > 0 {
                    self.scene.reindex_child(node, index - 1);
                }
            }
            MoveDirection::MoveDown => {
                if index + 1 < sibling_count {
                    self.scene.reindex_child(node, index + 1);
                }
            }
            MoveDirection::Indent => {
                if index > 0 {
                    let new_parent = self.scene.children(parent)[index - 1];
                    self.scene.attach(node, new_parent);
                }
            }
            MoveDirection::DeIndent => {
                if !self.is_root(parent) {
                    if let (Some(grandparent), Some(parent_index)) =
                        (self.scene.parent(parent), self.scene.index(parent))
                    {
                        if self.scene.attach(node, grandparent) {
                            self.scene.reindex_child(node, parent_index + 1);
                        }
                    }
                }
            }
        }

        packet.new_selected_node = Some(node);
        packet.scene_tree = Some(self.scene.snapshot());
        packet.into_packet()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use crate::graph::{MemoryGraph, Transform};
    use crate::session::Session;
    use sceneterm_protocol::NodeType;

    fn move_in_tree(fx: &mut Fixture, dir: MoveDirection) -> NodeMoveInTree {
        let packet = fx.ctx().route_message(NodeMoveInTree::new(dir).into_packet());
        NodeMoveInTree::from_packet(packet).unwrap()
    }

    #[test]
    fn test_duplicate_name_replaces_tag() {
        let name = duplicate_name("Sword<1234>");
        assert!(name.starts_with("Sword<"), "{}", name);
        assert!(DUPLICATE_TAG.is_match(&name));
        assert_eq!(name.len(), "Sword<0000>".len());
    }

    #[test]
    fn test_duplicate_name_appends_tag() {
        let name = duplicate_name("Crate");
        assert_eq!(&name[..6], "Crate<");
        assert!(name[6..10].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_duplicate_name_keeps_inner_tags() {
        let name = duplicate_name("A<1234>B");
        assert!(name.starts_with("A<1234>B<"));
    }

    #[test]
    fn test_duplicate_inserts_after_original() {
        let mut fx = Fixture::new();
        fx.scene.set_name(fx.a, "Sword<1234>");
        fx.session.select(fx.a);

        let packet = fx.ctx().route_message(NodeDuplicate::default().into_packet());
        let resp = NodeDuplicate::from_packet(packet).unwrap();

        let clone = resp.new_selected_node.unwrap();
        assert_eq!(fx.root_children(), vec![fx.a, clone, fx.b, fx.c]);
        assert_eq!(fx.session.selected(), Some(clone));
        let name = fx.scene.name(clone).unwrap();
        assert!(name.starts_with("Sword<"));
        assert_eq!(name.len(), "Sword<0000>".len());
        assert_eq!(resp.scene_tree.unwrap().count(), 6);
    }

    #[test]
    fn test_duplicate_root_is_noop() {
        let mut fx = Fixture::new();
        let packet = fx.ctx().route_message(NodeDuplicate::default().into_packet());
        let resp = NodeDuplicate::from_packet(packet).unwrap();
        assert!(resp.new_selected_node.is_none());
        assert!(resp.scene_tree.is_none());
        assert_eq!(fx.root_children().len(), 3);
    }

    #[test]
    fn test_delete_selects_prior_sibling() {
        let mut fx = Fixture::new();
        fx.session.select(fx.b);
        let packet = fx.ctx().route_message(NodeDelete::default().into_packet());
        let resp = NodeDelete::from_packet(packet).unwrap();

        assert_eq!(resp.new_selected_node, Some(fx.a));
        assert_eq!(fx.session.selected(), Some(fx.a));
        assert_eq!(fx.root_children(), vec![fx.a, fx.c]);
        assert!(!fx.scene.contains(fx.b1));
    }

    #[test]
    fn test_delete_first_child_selects_next() {
        let mut fx = Fixture::new();
        fx.session.select(fx.a);
        let packet = fx.ctx().route_message(NodeDelete::default().into_packet());
        let resp = NodeDelete::from_packet(packet).unwrap();
        assert_eq!(resp.new_selected_node, Some(fx.b));
    }

    #[test]
    fn test_delete_only_child_selects_parent() {
        let mut fx = Fixture::new();
        fx.session.select(fx.b1);
        let packet = fx.ctx().route_message(NodeDelete::default().into_packet());
        let resp = NodeDelete::from_packet(packet).unwrap();
        assert_eq!(resp.new_selected_node, Some(fx.b));
    }

    #[test]
    fn test_delete_root_is_noop() {
        let mut fx = Fixture::new();
        let packet = fx.ctx().route_message(NodeDelete::default().into_packet());
        let resp = NodeDelete::from_packet(packet).unwrap();
        assert!(resp.new_selected_node.is_none());
        assert_eq!(fx.scene.snapshot().count(), 5);
    }

    #[test]
    fn test_move_up_and_down() {
        let mut fx = Fixture::new();
        fx.session.select(fx.b);

        let resp = move_in_tree(&mut fx, MoveDirection::MoveUp);
        assert_eq!(resp.new_selected_node, Some(fx.b));
        assert_eq!(fx.root_children(), vec![fx.b, fx.a, fx.c]);

        move_in_tree(&mut fx, MoveDirection::MoveDown);
        move_in_tree(&mut fx, MoveDirection::MoveDown);
        assert_eq!(fx.root_children(), vec![fx.a, fx.c, fx.b]);
    }

    #[test]
    fn test_move_boundaries_are_noops() {
        let mut fx = Fixture::new();
        fx.session.select(fx.a);
        move_in_tree(&mut fx, MoveDirection::MoveUp);
        move_in_tree(&mut fx, MoveDirection::Indent);
        move_in_tree(&mut fx, MoveDirection::DeIndent);
        assert_eq!(fx.root_children(), vec![fx.a, fx.b, fx.c]);

        fx.session.select(fx.c);
        move_in_tree(&mut fx, MoveDirection::MoveDown);
        assert_eq!(fx.root_children(), vec![fx.a, fx.b, fx.c]);
    }

    #[test]
    fn test_indent_and_deindent() {
        let mut fx = Fixture::new();
        fx.session.select(fx.c);

        move_in_tree(&mut fx, MoveDirection::Indent);
        assert_eq!(fx.scene.children(fx.b).to_vec(), vec![fx.b1, fx.c]);

        move_in_tree(&mut fx, MoveDirection::DeIndent);
        assert_eq!(fx.root_children(), vec![fx.a, fx.b, fx.c]);

        fx.session.select(fx.b1);
        move_in_tree(&mut fx, MoveDirection::DeIndent);
        assert_eq!(fx.root_children(), vec![fx.a, fx.b, fx.b1, fx.c]);
    }

    #[test]
    fn test_move_root_is_noop() {
        let mut fx = Fixture::new();
        let resp = move_in_tree(&mut fx, MoveDirection::Indent);
        assert!(resp.new_selected_node.is_none());
        assert!(resp.scene_tree.is_none());
    }

    #[test]
    fn test_create_lists_active_scene_names_without_library() {
        let mut fx = Fixture::new();
        fx.scene.set_name(fx.c, "A");
        let packet = fx.ctx().route_message(NodeCreate::default().into_packet());
        let resp = NodeCreate::from_packet(packet).unwrap();
        assert_eq!(resp.viable_nodes, vec!["A", "B", "B1"]);
        assert!(resp.new_selected_node.is_none());
        assert!(resp.scene_tree.is_none());
    }

    #[test]
    fn test_create_clones_from_active_scene() {
        let mut fx = Fixture::new();
        let packet = fx.ctx().route_message(
            NodeCreate {
                node_to_create: "B".into(),
                ..Default::default()
            }
            .into_packet(),
        );
        let resp = NodeCreate::from_packet(packet).unwrap();

        let clone = resp.new_selected_node.unwrap();
        assert_eq!(fx.root_children().last(), Some(&clone));
        assert_eq!(fx.scene.children(clone).len(), 1);
        assert_eq!(fx.session.selected(), Some(clone));
        assert_eq!(resp.scene_tree.unwrap().count(), 7);
    }

    #[test]
    fn test_create_unknown_name_changes_nothing() {
        let mut fx = Fixture::new();
        fx.session.select(fx.a);
        let packet = fx.ctx().route_message(
            NodeCreate {
                node_to_create: "Dragon".into(),
                ..Default::default()
            }
            .into_packet(),
        );
        let resp = NodeCreate::from_packet(packet).unwrap();
        assert!(resp.new_selected_node.is_none());
        assert!(resp.scene_tree.is_none());
        assert_eq!(fx.session.selected(), Some(fx.a));
        assert_eq!(fx.scene.snapshot().count(), 5);
    }

    #[test]
    fn test_create_from_library() {
        let mut props = MemoryGraph::new("props");
        let r = props.root();
        let barrel = props.add(r, "Barrel", NodeType::Model, Transform::default()).unwrap();
        props.add(barrel, "Lid", NodeType::Model, Transform::default()).unwrap();
        let mut lights = MemoryGraph::new("lights");
        let lr = lights.root();
        lights.add(lr, "Lamp", NodeType::Light, Transform::default()).unwrap();
        lights.add(lr, "Barrel", NodeType::Model, Transform::default()).unwrap();
        let library = vec![props, lights];

        let mut scene = MemoryGraph::new("level");
        let mut session = Session::new();
        session.update(&scene);

        let mut ctx = HandlerContext::new(&mut session, &mut scene, &library);
        let listing = NodeCreate::from_packet(ctx.route_message(NodeCreate::default().into_packet()))
            .unwrap();
        assert_eq!(listing.viable_nodes, vec!["Barrel", "Lid", "Lamp"]);

        let created = NodeCreate::from_packet(ctx.route_message(
            NodeCreate {
                node_to_create: "Barrel".into(),
                ..Default::default()
            }
            .into_packet(),
        ))
        .unwrap();
        let id = created.new_selected_node.unwrap();
        assert_eq!(scene.parent(id), Some(scene.root()));
        assert_eq!(scene.children(id).len(), 1);
        assert!(!library[0].contains(id));
    }
}
