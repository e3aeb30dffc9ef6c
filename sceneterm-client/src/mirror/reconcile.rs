use std::collections::HashMap;

use sceneterm_protocol::{NodeId, SceneNode};

use super::snapshot::IndexedSnapshot;
use super::{decorate, TreeWidget};

/// Consecutive snapshots an id may be missing from before it is evicted
const EVICT_AFTER_MISSES: u8 = 2;

#[derive(Debug)]
struct MirrorNode<H> {
    handle: H,
    name: String,
    has_children: bool,
    /// Snapshots in a row that did not contain this id
    misses: u8,
}

/// Identity-keyed mirror over a presentation tree
///
/// Reconciling the same snapshot twice leaves everything as the first pass
/// did. Surviving ids keep their presentation node across snapshots.
pub struct Mirror<W: TreeWidget> {
    widget: W,
    nodes: HashMap<NodeId, MirrorNode<W::Handle>>,
    /// Selection requested by the last structural mutation
    pending_selection: Option<NodeId>,
    epoch: Option<u64>,
    root: Option<NodeId>,
    node_count: usize,
}

impl<W: TreeWidget> Mirror<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            nodes: HashMap::new(),
            pending_selection: None,
            epoch: None,
            root: None,
            node_count: 0,
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// Presentation node currently bound to `id`
    pub fn handle(&self, id: NodeId) -> Option<W::Handle> {
        self.nodes.get(&id).map(|n| n.handle)
    }

    /// Ids held by the mirror, including ones pending eviction
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in the last reconciled snapshot
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.name.as_str())
    }

    /// Id under the presentation cursor
    pub fn selected(&self) -> Option<NodeId> {
        self.widget.current().and_then(|h| self.widget.payload(h))
    }

    /// Move the cursor to `id` on the next reconcile
    pub fn select_next(&mut self, id: NodeId) {
        self.pending_selection = Some(id);
    }

    /// Move the cursor to `id` now if the mirror knows it
    pub fn select(&mut self, id: NodeId) -> bool {
        match self.handle(id) {
            Some(handle) => {
                self.widget.set_current(handle);
                true
            }
            None => false,
        }
    }

    /// Forget every node, e.g. after a scene switch
    pub fn clear(&mut self) {
        for (_, node) in self.nodes.drain() {
            self.widget.remove_node(node.handle);
        }
        self.root = None;
        self.node_count = 0;
    }

    /// Note the server's scene epoch; a change discards the mirror
    ///
    /// Returns whether the mirror was cleared.
    pub fn observe_epoch(&mut self, epoch: u64) -> bool {
        let switched = self.epoch.is_some_and(|seen| seen != epoch);
        if switched {
            tracing::debug!(epoch, "scene switched, discarding mirror");
            self.clear();
            self.pending_selection = None;
        }
        self.epoch = Some(epoch);
        switched
    }

    /// Patch the mirror and presentation tree to match `snapshot`
    pub fn reconcile(&mut self, snapshot: &SceneNode) {
        let indexed = IndexedSnapshot::new(snapshot);

        for node in indexed.iter() {
            let widget = &mut self.widget;
            let entry = self.nodes.entry(node.id).or_insert_with(|| MirrorNode {
                handle: widget.create_node(&node.name, node.id),
                name: node.name.clone(),
                has_children: false,
                misses: 0,
            });
            entry.misses = 0;
            entry.has_children = !node.children.is_empty();
            if entry.name != node.name {
                entry.name = node.name.clone();
            }
        }

        for node in indexed.iter() {
            let children: Vec<W::Handle> = node
                .children
                .iter()
                .filter_map(|c| self.nodes.get(&c.id).map(|m| m.handle))
                .collect();
            if let Some(parent) = self.nodes.get(&node.id) {
                self.widget.set_children(parent.handle, &children);
            }
        }

        self.evict_missing(&indexed);

        let Some(root) = self.handle(snapshot.id) else {
            return;
        };
        self.widget.set_root(root);
        self.root = Some(snapshot.id);
        self.node_count = indexed.len();

        let pending = self
            .pending_selection
            .take()
            .and_then(|id| self.nodes.get(&id).filter(|_| indexed.contains(id)))
            .map(|n| n.handle);
        match pending {
            Some(handle) => self.widget.set_current(handle),
            None => {
                let current_is_live = self.selected().is_some_and(|id| indexed.contains(id));
                if !current_is_live {
                    self.widget.set_current(root);
                }
            }
        }

        self.refresh_labels();
    }

    fn evict_missing(&mut self, indexed: &IndexedSnapshot<'_>) {
        let mut evicted = Vec::new();
        for (id, node) in self.nodes.iter_mut() {
            if indexed.contains(*id) {
                continue;
            }
            node.misses += 1;
            if node.misses >= EVICT_AFTER_MISSES {
                evicted.push(*id);
            }
        }
        for id in evicted {
            if let Some(node) = self.nodes.remove(&id) {
                self.widget.remove_node(node.handle);
            }
        }
    }

    /// Flip the expansion of `id` and relabel it
    pub fn toggle_expanded(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let handle = node.handle;
        let expanded = !self.widget.is_expanded(handle);
        self.widget.set_expanded(handle, expanded);
        let label = decorate(&node.name, node.has_children, expanded);
        self.widget.set_label(handle, &label);
    }

    /// Recompute every label from the node's name, children and expansion
    pub fn refresh_labels(&mut self) {
        for node in self.nodes.values() {
            let expanded = self.widget.is_expanded(node.handle);
            let label = decorate(&node.name, node.has_children, expanded);
            self.widget.set_label(node.handle, &label);
        }
    }

    /// First node, in tree order, whose name contains `query` (case-insensitive)
    pub fn find_by_name(&self, snapshot: &SceneNode, query: &str) -> Option<NodeId> {
        let query = query.to_lowercase();
        if query.is_empty() {
            return None;
        }
        snapshot
            .iter()
            .find(|n| n.name.to_lowercase().contains(&query))
            .map(|n| n.id)
            .filter(|id| self.nodes.contains_key(id))
    }
}
