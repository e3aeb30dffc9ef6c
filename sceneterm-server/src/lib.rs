//! sceneterm server - embeddable inspector for live scene graphs
//!
//! A host application owns its scene behind [`SceneGraph`], starts an
//! [`InspectorServer`], and drives it from its own loop: `update` once per
//! tick, `draw` once per frame.

pub mod draw;
pub mod graph;
pub mod handlers;
pub mod server;
pub mod session;
pub mod tcp;

pub use draw::{draw_overlay, DebugCanvas};
pub use graph::{MemoryGraph, SceneGraph, Transform};
pub use handlers::HandlerContext;
pub use server::InspectorServer;
pub use session::{DebugFlags, OriginalTransform, Session, SessionState};
