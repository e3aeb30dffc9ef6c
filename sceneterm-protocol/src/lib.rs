//! sceneterm-protocol: wire definitions shared by the inspector and its host
//!
//! Defines the message kinds, the typed request/response packets, the scene
//! snapshot types they carry, and the length-prefixed framing codec used over
//! TCP.

pub mod codec;
pub mod messages;
pub mod types;

pub use codec::{ClientCodec, CodecError, ServerCodec, MAX_MESSAGE_SIZE};
pub use messages::{
    CameraFollow, Envelope, GameInfo, Message, MessageKind, NodeCreate, NodeDelete,
    NodeDuplicate, NodeInfo, NodeMove, NodeMoveInTree, NodeReset, NodeRotate, NodeSelect, Packet,
    Reply, SceneRefresh, ToggleDebugDraw,
};
pub use types::{
    DebugInfo, DebugLayer, GameStats, Mat3, MoveDirection, NodeId, NodeType, SceneNode, Vec3,
};

/// Current protocol version
pub const PROTOCOL_VERSION: u32 = 1;

/// Port the host listens on when none is configured
pub const DEFAULT_PORT: &str = "7979";

/// Render a snapshot as pretty JSON for tooling output
pub fn snapshot_to_json(tree: &SceneNode) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tree)
}
