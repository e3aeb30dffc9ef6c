//! Message taxonomy for the inspector protocol
//!
//! Every request is answered by a response of the same kind and shape, with
//! the response-only fields filled in. Messages travel inside an [`Envelope`]
//! that names the kind by its string tag and carries the bincode payload
//! opaquely, so a server can reject one bad payload without losing framing.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::codec::CodecError;
use crate::types::{DebugInfo, DebugLayer, Mat3, MoveDirection, NodeId, NodeType, SceneNode, Vec3};
use crate::PROTOCOL_VERSION;

/// Closed set of message kinds with their wire tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    SceneRefresh,
    NodeMove,
    NodeRotate,
    NodeSelect,
    CameraFollow,
    NodeReset,
    NodeInfo,
    GameInfo,
    NodeCreate,
    NodeDuplicate,
    NodeDelete,
    NodeMoveInTree,
    ToggleDebugDrawHierarchy,
    ToggleDebugDrawWireframe,
    ToggleDebugDrawBounds,
}

impl MessageKind {
    pub const ALL: [MessageKind; 15] = [
        MessageKind::SceneRefresh,
        MessageKind::NodeMove,
        MessageKind::NodeRotate,
        MessageKind::NodeSelect,
        MessageKind::CameraFollow,
        MessageKind::NodeReset,
        MessageKind::NodeInfo,
        MessageKind::GameInfo,
        MessageKind::NodeCreate,
        MessageKind::NodeDuplicate,
        MessageKind::NodeDelete,
        MessageKind::NodeMoveInTree,
        MessageKind::ToggleDebugDrawHierarchy,
        MessageKind::ToggleDebugDrawWireframe,
        MessageKind::ToggleDebugDrawBounds,
    ];

    /// Wire tag for this kind
    pub fn tag(&self) -> &'static str {
        match self {
            MessageKind::SceneRefresh => "SceneRefresh",
            MessageKind::NodeMove => "NodeMove",
            MessageKind::NodeRotate => "NodeRotate",
            MessageKind::NodeSelect => "NodeSelect",
            MessageKind::CameraFollow => "CameraFollow",
            MessageKind::NodeReset => "NodeReset",
            MessageKind::NodeInfo => "NodeInfo",
            MessageKind::GameInfo => "GameInfo",
            MessageKind::NodeCreate => "NodeCreate",
            MessageKind::NodeDuplicate => "NodeDuplicate",
            MessageKind::NodeDelete => "NodeDelete",
            MessageKind::NodeMoveInTree => "NodeMoveInTree",
            MessageKind::ToggleDebugDrawHierarchy => "ToggleDebugDrawHierarchy",
            MessageKind::ToggleDebugDrawWireframe => "ToggleDebugDrawWireframe",
            MessageKind::ToggleDebugDrawBounds => "ToggleDebugDrawBounds",
        }
    }

    /// Look a kind up by its wire tag
    pub fn from_tag(tag: &str) -> Option<MessageKind> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Whether a successful response of this kind may change the tree shape
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            MessageKind::NodeCreate
                | MessageKind::NodeDuplicate
                | MessageKind::NodeDelete
                | MessageKind::NodeMoveInTree
        )
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl From<DebugLayer> for MessageKind {
    fn from(layer: DebugLayer) -> Self {
        match layer {
            DebugLayer::Hierarchy => MessageKind::ToggleDebugDrawHierarchy,
            DebugLayer::Wireframe => MessageKind::ToggleDebugDrawWireframe,
            DebugLayer::Bounds => MessageKind::ToggleDebugDrawBounds,
        }
    }
}

/// Framed unit on the wire: kind tag plus opaque payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub protocol_version: u32,
    pub kind: String,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(kind: MessageKind, payload: Vec<u8>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            kind: kind.tag().to_string(),
            payload,
        }
    }

    /// Resolve the kind tag, checking the protocol version first
    pub fn message_kind(&self) -> Result<MessageKind, CodecError> {
        if self.protocol_version != PROTOCOL_VERSION {
            return Err(CodecError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                found: self.protocol_version,
            });
        }
        MessageKind::from_tag(&self.kind).ok_or_else(|| CodecError::UnknownKind(self.kind.clone()))
    }
}

/// Server answer to one envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// The handled message, response fields populated
    Accepted(Envelope),
    /// The request could not be decoded or dispatched
    Rejected { kind: String, reason: String },
}

impl Reply {
    pub fn rejected(kind: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Reply::Rejected {
            kind: kind.into(),
            reason: reason.to_string(),
        }
    }
}

/// A typed protocol message.
///
/// The same type is used for the request and its response.
pub trait Message: Serialize + DeserializeOwned + Sized {
    fn kind(&self) -> MessageKind;

    fn into_packet(self) -> Packet;

    fn from_packet(packet: Packet) -> Option<Self>;

    fn encode(&self) -> Result<Envelope, CodecError> {
        Ok(Envelope::new(self.kind(), bincode::serialize(self)?))
    }

    fn decode(envelope: &Envelope) -> Result<Self, CodecError> {
        let found = envelope.message_kind()?;
        let msg: Self = bincode::deserialize(&envelope.payload)?;
        if msg.kind() != found {
            return Err(CodecError::KindMismatch {
                expected: msg.kind().tag().to_string(),
                found: envelope.kind.clone(),
            });
        }
        Ok(msg)
    }
}

/// Full scene tree of the active scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneRefresh {
    pub scene_tree: Option<SceneNode>,
    /// Incremented by the session each time the active scene is replaced
    pub epoch: u64,
}

/// Relative translation of the selected node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMove {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Axis-angle rotation (radians) of the selected node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRotate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSelect {
    pub node_id: NodeId,
}

/// Parent the host camera under the selected node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraFollow;

/// Restore the selected subtree to its originally observed transforms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeReset;

/// Properties of the selected node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Mat3,
    pub visible: bool,
    pub node_type: NodeType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    pub fps: f64,
    pub tps: f64,
    pub debug_info: DebugInfo,
}

/// Instantiate a named node, or list the names that can be instantiated.
///
/// An empty `node_to_create` asks for `viable_nodes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCreate {
    pub node_to_create: String,
    pub viable_nodes: Vec<String>,
    pub new_selected_node: Option<NodeId>,
    pub scene_tree: Option<SceneNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDuplicate {
    pub new_selected_node: Option<NodeId>,
    pub scene_tree: Option<SceneNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDelete {
    pub new_selected_node: Option<NodeId>,
    pub scene_tree: Option<SceneNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMoveInTree {
    pub move_dir: MoveDirection,
    pub new_selected_node: Option<NodeId>,
    pub scene_tree: Option<SceneNode>,
}

impl NodeMoveInTree {
    pub fn new(move_dir: MoveDirection) -> Self {
        Self {
            move_dir,
            new_selected_node: None,
            scene_tree: None,
        }
    }
}

/// Flip one debug overlay; the response carries the new state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleDebugDraw {
    pub layer: DebugLayer,
    pub debug_draw_on: bool,
}

impl ToggleDebugDraw {
    pub fn new(layer: DebugLayer) -> Self {
        Self {
            layer,
            debug_draw_on: false,
        }
    }
}

/// Closed enumeration of every typed message
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    SceneRefresh(SceneRefresh),
    NodeMove(NodeMove),
    NodeRotate(NodeRotate),
    NodeSelect(NodeSelect),
    CameraFollow(CameraFollow),
    NodeReset(NodeReset),
    NodeInfo(NodeInfo),
    GameInfo(GameInfo),
    NodeCreate(NodeCreate),
    NodeDuplicate(NodeDuplicate),
    NodeDelete(NodeDelete),
    NodeMoveInTree(NodeMoveInTree),
    ToggleDebugDraw(ToggleDebugDraw),
}

impl Packet {
    pub fn kind(&self) -> MessageKind {
        match self {
            Packet::SceneRefresh(m) => m.kind(),
            Packet::NodeMove(m) => m.kind(),
            Packet::NodeRotate(m) => m.kind(),
            Packet::NodeSelect(m) => m.kind(),
            Packet::CameraFollow(m) => m.kind(),
            Packet::NodeReset(m) => m.kind(),
            Packet::NodeInfo(m) => m.kind(),
            Packet::GameInfo(m) => m.kind(),
            Packet::NodeCreate(m) => m.kind(),
            Packet::NodeDuplicate(m) => m.kind(),
            Packet::NodeDelete(m) => m.kind(),
            Packet::NodeMoveInTree(m) => m.kind(),
            Packet::ToggleDebugDraw(m) => m.kind(),
        }
    }

    pub fn encode(&self) -> Result<Envelope, CodecError> {
        match self {
            Packet::SceneRefresh(m) => m.encode(),
            Packet::NodeMove(m) => m.encode(),
            Packet::NodeRotate(m) => m.encode(),
            Packet::NodeSelect(m) => m.encode(),
            Packet::CameraFollow(m) => m.encode(),
            Packet::NodeReset(m) => m.encode(),
            Packet::NodeInfo(m) => m.encode(),
            Packet::GameInfo(m) => m.encode(),
            Packet::NodeCreate(m) => m.encode(),
            Packet::NodeDuplicate(m) => m.encode(),
            Packet::NodeDelete(m) => m.encode(),
            Packet::NodeMoveInTree(m) => m.encode(),
            Packet::ToggleDebugDraw(m) => m.encode(),
        }
    }

    /// Decode an envelope by looking its tag up in the kind table
    pub fn decode(envelope: &Envelope) -> Result<Packet, CodecError> {
        let packet = match envelope.message_kind()? {
            MessageKind::SceneRefresh => SceneRefresh::decode(envelope)?.into_packet(),
            MessageKind::NodeMove => NodeMove::decode(envelope)?.into_packet(),
            MessageKind::NodeRotate => NodeRotate::decode(envelope)?.into_packet(),
            MessageKind::NodeSelect => NodeSelect::decode(envelope)?.into_packet(),
            MessageKind::CameraFollow => CameraFollow::decode(envelope)?.into_packet(),
            MessageKind::NodeReset => NodeReset::decode(envelope)?.into_packet(),
            MessageKind::NodeInfo => NodeInfo::decode(envelope)?.into_packet(),
            MessageKind::GameInfo => GameInfo::decode(envelope)?.into_packet(),
            MessageKind::NodeCreate => NodeCreate::decode(envelope)?.into_packet(),
            MessageKind::NodeDuplicate => NodeDuplicate::decode(envelope)?.into_packet(),
            MessageKind::NodeDelete => NodeDelete::decode(envelope)?.into_packet(),
            MessageKind::NodeMoveInTree => NodeMoveInTree::decode(envelope)?.into_packet(),
            MessageKind::ToggleDebugDrawHierarchy
            | MessageKind::ToggleDebugDrawWireframe
            | MessageKind::ToggleDebugDrawBounds => {
                ToggleDebugDraw::decode(envelope)?.into_packet()
            }
        };
        Ok(packet)
    }

    /// Selection the client should adopt after a structural response
    pub fn new_selected_node(&self) -> Option<NodeId> {
        match self {
            Packet::NodeCreate(m) => m.new_selected_node,
            Packet::NodeDuplicate(m) => m.new_selected_node,
            Packet::NodeDelete(m) => m.new_selected_node,
            Packet::NodeMoveInTree(m) => m.new_selected_node,
            _ => None,
        }
    }

    /// Tree carried by the response, if any
    pub fn scene_tree(&self) -> Option<&SceneNode> {
        match self {
            Packet::SceneRefresh(m) => m.scene_tree.as_ref(),
            Packet::NodeCreate(m) => m.scene_tree.as_ref(),
            Packet::NodeDuplicate(m) => m.scene_tree.as_ref(),
            Packet::NodeDelete(m) => m.scene_tree.as_ref(),
            Packet::NodeMoveInTree(m) => m.scene_tree.as_ref(),
            _ => None,
        }
    }
}

macro_rules! impl_message {
    ($ty:ident) => {
        impl Message for $ty {
            fn kind(&self) -> MessageKind {
                MessageKind::$ty
            }

            fn into_packet(self) -> Packet {
                Packet::$ty(self)
            }

            fn from_packet(packet: Packet) -> Option<Self> {
                match packet {
                    Packet::$ty(m) => Some(m),
                    _ => None,
                }
            }
        }
    };
}

impl_message!(SceneRefresh);
impl_message!(NodeMove);
impl_message!(NodeRotate);
impl_message!(NodeSelect);
impl_message!(CameraFollow);
impl_message!(NodeReset);
impl_message!(NodeInfo);
impl_message!(GameInfo);
impl_message!(NodeCreate);
impl_message!(NodeDuplicate);
impl_message!(NodeDelete);
impl_message!(NodeMoveInTree);

impl Message for ToggleDebugDraw {
    fn kind(&self) -> MessageKind {
        self.layer.into()
    }

    fn into_packet(self) -> Packet {
        Packet::ToggleDebugDraw(self)
    }

    fn from_packet(packet: Packet) -> Option<Self> {
        match packet {
            Packet::ToggleDebugDraw(m) => Some(m),
            _ => None,
        }
    }
}
