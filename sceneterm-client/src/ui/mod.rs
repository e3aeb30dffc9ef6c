//! UI components for the sceneterm client
//!
//! Ratatui front end: the node tree on the left; keys, properties and game
//! statistics on the right; a status bar with the connection indicator.

mod app;
mod event;
mod render;
mod terminal;
mod tree;

pub use app::App;
pub use event::AppEvent;
