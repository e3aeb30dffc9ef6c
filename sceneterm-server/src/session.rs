//! Authoritative inspector state held next to the host's scene
//!
//! The session owns the selection, the original-transform cache used by
//! reset, the debug overlay flags and the last frame statistics. It is driven
//! synchronously by the host through [`Session::update`] once per tick.

use std::collections::HashMap;

use sceneterm_protocol::{DebugLayer, GameStats, NodeId};
use tracing::{debug, info};

use crate::graph::{SceneGraph, Transform};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No graph has been supplied yet
    Uninitialized,
    /// A graph is attached and requests are served against it
    Active,
}

/// Transform and parent of a node as first observed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginalTransform {
    pub parent: Option<NodeId>,
    pub transform: Transform,
}

/// Which debug overlays are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags {
    pub hierarchy: bool,
    pub wireframe: bool,
    pub bounds: bool,
}

impl DebugFlags {
    pub fn is_on(&self, layer: DebugLayer) -> bool {
        match layer {
            DebugLayer::Hierarchy => self.hierarchy,
            DebugLayer::Wireframe => self.wireframe,
            DebugLayer::Bounds => self.bounds,
        }
    }

    /// Flip a layer and return its new state
    pub fn toggle(&mut self, layer: DebugLayer) -> bool {
        let flag = match layer {
            DebugLayer::Hierarchy => &mut self.hierarchy,
            DebugLayer::Wireframe => &mut self.wireframe,
            DebugLayer::Bounds => &mut self.bounds,
        };
        *flag = !*flag;
        *flag
    }
}

/// Server-side inspector session
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    selected: Option<NodeId>,
    originals: HashMap<NodeId, OriginalTransform>,
    debug: DebugFlags,
    camera: Option<NodeId>,
    epoch: u64,
    prev_identity: Option<NodeId>,
    stats: GameStats,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            selected: None,
            originals: HashMap::new(),
            debug: DebugFlags::default(),
            camera: None,
            epoch: 0,
            prev_identity: None,
            stats: GameStats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn select(&mut self, id: NodeId) {
        self.selected = Some(id);
    }

    /// Scene generation; changes whenever the active graph is replaced
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn debug_flags(&self) -> DebugFlags {
        self.debug
    }

    pub fn toggle_debug(&mut self, layer: DebugLayer) -> bool {
        self.debug.toggle(layer)
    }

    pub fn camera(&self) -> Option<NodeId> {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Option<NodeId>) {
        self.camera = camera;
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn set_stats(&mut self, stats: GameStats) {
        self.stats = stats;
    }

    pub fn original(&self, id: NodeId) -> Option<&OriginalTransform> {
        self.originals.get(&id)
    }

    pub fn original_count(&self) -> usize {
        self.originals.len()
    }

    /// Cached original of `id`, recording the current state if none exists
    pub fn original_or_record<G: SceneGraph>(
        &mut self,
        scene: &G,
        id: NodeId,
    ) -> Option<OriginalTransform> {
        if let Some(og) = self.originals.get(&id) {
            return Some(*og);
        }
        let og = OriginalTransform {
            parent: scene.parent(id),
            transform: scene.local_transform(id)?,
        };
        self.originals.insert(id, og);
        Some(og)
    }

    /// Per-tick bookkeeping against the host's current graph
    pub fn update<G: SceneGraph>(&mut self, scene: &G) {
        let root = scene.root();
        if self.state == SessionState::Uninitialized {
            info!(root, "inspector session active");
            self.state = SessionState::Active;
        }

        let current = self.selected;
        match current {
            Some(sel) if scene.is_within(sel, root) => {}
            stale => {
                if stale.is_some() {
                    debug!(?stale, root, "selection left the graph, selecting root");
                }
                self.selected = Some(root);
            }
        }

        let identity = scene.identity();
        if self.prev_identity != Some(identity) {
            let switched = self.prev_identity.is_some();
            self.prev_identity = Some(identity);
            self.epoch += 1;
            self.originals.clear();
            if switched {
                info!(identity, epoch = self.epoch, "active scene replaced");
                return;
            }
        }

        for id in scene.descendants(root) {
            self.original_or_record(scene, id);
        }
        self.originals.retain(|id, _| scene.contains(*id));
    }
}
