//! Main application struct and state management
//!
//! The App is the single consumer of [`AppEvent`]s and the only place the
//! mirror and tree model are mutated. Requests issued from the keyboard go
//! through one ordered [`RequestQueue`] and report back through the same
//! event channel. Every answer carrying a tree is tagged with its request
//! sequence number so an older tree never replaces a newer one.

use std::time::Duration;

use crossterm::event::KeyEvent;

use sceneterm_protocol::{
    CameraFollow, DebugLayer, GameInfo, Message, NodeCreate,
    NodeDelete, NodeDuplicate, NodeId, NodeInfo, NodeMove, NodeMoveInTree, NodeReset, NodeRotate,
    NodeSelect, Packet, SceneNode, SceneRefresh, ToggleDebugDraw, Vec3,
};
use sceneterm_utils::Result;
use tracing::debug;

use crate::connection::{ConnectionState, InspectorClient};
use crate::input::{self, Action, InputMode, Navigate, PromptAction};
use crate::mirror::Mirror;
use crate::poller::Pollers;
use crate::requests::RequestQueue;

use super::event::{AppEvent, EventHandler};
use super::render;
use super::terminal::Terminal;
use super::tree::TreeModel;

/// Debug overlays as last reported by the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugOverlays {
    pub hierarchy: bool,
    pub wireframe: bool,
    pub bounds: bool,
}

impl DebugOverlays {
    fn set(&mut self, layer: DebugLayer, on: bool) {
        match layer {
            DebugLayer::Hierarchy => self.hierarchy = on,
            DebugLayer::Wireframe => self.wireframe = on,
            DebugLayer::Bounds => self.bounds = on,
        }
    }
}

/// Main application
pub struct App {
    /// Server connection shared with the pollers
    client: InspectorClient,
    /// Event handler
    events: EventHandler,
    /// User-issued requests, sent in the order they were issued
    requests: RequestQueue,
    /// Sequence number of the request behind the tree on screen
    tree_seq: u64,
    /// Persistent mirror of the scene tree
    mirror: Mirror<TreeModel>,
    /// Last snapshot reconciled into the mirror
    snapshot: Option<SceneNode>,
    node_info: Option<NodeInfo>,
    game_info: Option<GameInfo>,
    mode: InputMode,
    /// Text typed into the search or clone prompt
    prompt: String,
    /// Names the server can instantiate, for clone completion
    viable_nodes: Vec<String>,
    overlays: DebugOverlays,
    /// Status message to display
    status_message: Option<String>,
    /// Selection last sent to the server
    last_selected: Option<NodeId>,
    quitting: bool,
}

impl App {
    /// Create a new application instance
    pub fn new(client: InspectorClient) -> Self {
        let events = EventHandler::new(Duration::from_millis(100));
        let requests = RequestQueue::spawn(&client, events.sender());
        Self {
            client,
            events,
            requests,
            tree_seq: 0,
            mirror: Mirror::new(TreeModel::new()),
            snapshot: None,
            node_info: None,
            game_info: None,
            mode: InputMode::Tree,
            prompt: String::new(),
            viable_nodes: Vec::new(),
            overlays: DebugOverlays::default(),
            status_message: None,
            last_selected: None,
            quitting: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quitting
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.client.state()
    }

    pub fn tree(&self) -> &TreeModel {
        self.mirror.widget()
    }

    pub fn node_count(&self) -> usize {
        self.mirror.node_count()
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.mirror.selected().and_then(|id| self.mirror.name(id))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.mirror.root()
    }

    pub fn node_info(&self) -> Option<&NodeInfo> {
        self.node_info.as_ref()
    }

    pub fn game_info(&self) -> Option<&GameInfo> {
        self.game_info.as_ref()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn overlays(&self) -> DebugOverlays {
        self.overlays
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Run the main application loop
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = Terminal::new()?;

        self.events.start_input_polling();
        let pollers = Pollers::spawn(&self.client, self.events.sender());

        while !self.should_quit() {
            terminal.terminal_mut().draw(|frame| render::draw(frame, self))?;

            match self.events.next().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
            // Drain whatever queued up while drawing
            while let Some(event) = self.events.try_next() {
                self.handle_event(event);
            }
        }

        pollers.stop();
        self.client.disconnect().await;
        Ok(())
    }

    /// Handle an application event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize { .. } | AppEvent::Tick => {}
            AppEvent::SceneRefreshed { seq, refresh } => self.on_scene_refresh(seq, refresh),
            AppEvent::NodeInfo(info) => self.node_info = Some(info),
            AppEvent::GameInfo(info) => self.game_info = Some(info),
            AppEvent::Response { seq, packet } => self.on_response(seq, packet),
            AppEvent::RequestFailed { kind, error } => {
                tracing::warn!(%kind, "request failed: {}", error);
                self.status_message = Some(format!("{} failed: {}", kind, error));
            }
        }
    }

    fn on_scene_refresh(&mut self, seq: u64, refresh: SceneRefresh) {
        if seq < self.tree_seq {
            debug!(seq, shown = self.tree_seq, "dropping stale scene refresh");
            return;
        }
        self.tree_seq = seq;
        if self.mirror.observe_epoch(refresh.epoch) {
            self.snapshot = None;
            self.last_selected = None;
        }
        if let Some(tree) = refresh.scene_tree {
            self.apply_snapshot(tree);
        }
    }

    fn on_response(&mut self, seq: u64, packet: Packet) {
        if packet.scene_tree().is_some() {
            if seq < self.tree_seq {
                // A newer tree is already shown; keep only the server's selection
                debug!(seq, shown = self.tree_seq, kind = %packet.kind(), "dropping stale tree");
                if let Some(id) = packet.new_selected_node() {
                    self.mirror.select(id);
                    self.last_selected = Some(id);
                }
                return;
            }
            self.tree_seq = seq;
        }

        if let Some(id) = packet.new_selected_node() {
            self.mirror.select_next(id);
            // The server already selected it
            self.last_selected = Some(id);
        }

        match packet {
            Packet::NodeCreate(create) => {
                if create.node_to_create.is_empty() {
                    self.viable_nodes = create.viable_nodes;
                } else if let Some(tree) = create.scene_tree {
                    self.status_message = Some(format!("Created {}", create.node_to_create));
                    self.apply_snapshot(tree);
                } else {
                    self.status_message = Some(format!("No node named {}", create.node_to_create));
                }
            }
            Packet::ToggleDebugDraw(toggle) => {
                self.overlays.set(toggle.layer, toggle.debug_draw_on);
            }
            Packet::NodeDuplicate(NodeDuplicate { scene_tree: Some(tree), .. })
            | Packet::NodeDelete(NodeDelete { scene_tree: Some(tree), .. })
            | Packet::NodeMoveInTree(NodeMoveInTree { scene_tree: Some(tree), .. }) => {
                self.apply_snapshot(tree);
            }
            _ => {}
        }
    }

    fn apply_snapshot(&mut self, tree: SceneNode) {
        self.mirror.reconcile(&tree);
        self.snapshot = Some(tree);
        self.sync_selection();
    }

    /// Tell the server when the cursor landed on a different node
    fn sync_selection(&mut self) {
        let selected = self.mirror.selected();
        if selected == self.last_selected {
            return;
        }
        self.last_selected = selected;
        if let Some(node_id) = selected {
            self.node_info = None;
            self.dispatch(NodeSelect { node_id });
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            InputMode::Tree => {
                let action = input::tree_action(&key);
                self.apply_action(action);
            }
            InputMode::Search | InputMode::Clone => {
                let action = input::prompt_action(&key);
                self.apply_prompt_action(action);
            }
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => self.quitting = true,
            Action::Navigate(nav) => {
                let tree = self.mirror.widget_mut();
                let moved = match nav {
                    Navigate::Up => tree.step(-1),
                    Navigate::Down => tree.step(1),
                    Navigate::Parent => tree.to_parent(),
                    Navigate::FirstChild => tree.to_first_child(),
                };
                if moved {
                    self.mirror.refresh_labels();
                    self.sync_selection();
                }
            }
            Action::ToggleExpand => {
                if let Some(id) = self.mirror.selected() {
                    self.mirror.toggle_expanded(id);
                }
            }
            Action::Move(delta) => self.dispatch(NodeMove {
                x: delta.x,
                y: delta.y,
                z: delta.z,
            }),
            Action::Rotate { axis, angle } => self.dispatch(rotate_request(axis, angle)),
            Action::Reset => self.dispatch(NodeReset),
            Action::Follow => self.dispatch(CameraFollow),
            Action::OpenPrompt(mode) => {
                self.mode = mode;
                self.prompt.clear();
                if mode == InputMode::Clone {
                    self.dispatch(NodeCreate::default());
                }
            }
            Action::Duplicate => self.dispatch(NodeDuplicate::default()),
            Action::Delete => self.dispatch(NodeDelete::default()),
            Action::MoveInTree(dir) => self.dispatch(NodeMoveInTree::new(dir)),
            Action::ToggleDebug(layer) => self.dispatch(ToggleDebugDraw::new(layer)),
        }
    }

    fn apply_prompt_action(&mut self, action: PromptAction) {
        match action {
            PromptAction::None => {}
            PromptAction::Insert(c) => self.prompt.push(c),
            PromptAction::Backspace => {
                self.prompt.pop();
            }
            PromptAction::Complete => {
                if self.mode == InputMode::Clone {
                    if let Some(name) = input::complete(&self.prompt, &self.viable_nodes) {
                        self.prompt = name.to_string();
                    }
                }
            }
            PromptAction::Cancel => self.close_prompt(),
            PromptAction::Submit => {
                let text = std::mem::take(&mut self.prompt);
                match self.mode {
                    InputMode::Search => self.search(&text),
                    InputMode::Clone if !text.is_empty() => self.dispatch(NodeCreate {
                        node_to_create: text,
                        ..Default::default()
                    }),
                    _ => {}
                }
                self.close_prompt();
            }
        }
    }

    fn close_prompt(&mut self) {
        self.mode = InputMode::Tree;
        self.prompt.clear();
    }

    fn search(&mut self, query: &str) {
        let found = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| self.mirror.find_by_name(snapshot, query));
        match found {
            Some(id) => {
                self.mirror.select(id);
                self.sync_selection();
            }
            None => self.status_message = Some(format!("No node matching \"{}\"", query)),
        }
    }

    /// Queue a request behind earlier ones; the outcome comes back as an event
    fn dispatch<M: Message>(&self, request: M) {
        self.requests.push(request);
    }
}

fn rotate_request(axis: Vec3, angle: f64) -> NodeRotate {
    NodeRotate {
        x: axis.x,
        y: axis.y,
        z: axis.z,
        angle,
    }
}

#[cfg(test)]
impl App {
    /// Events the app posted to itself, e.g. request outcomes
    pub(crate) async fn next_event(&mut self) -> Option<AppEvent> {
        tokio::time::timeout(Duration::from_secs(2), self.events.next())
            .await
            .ok()
            .flatten()
    }
}
