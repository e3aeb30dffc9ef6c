//! sceneterm-utils: Common utilities shared across sceneterm crates
//!
//! This crate provides:
//! - Unified error types ([`SceneTermError`], [`Result`])
//! - Logging infrastructure ([`init_logging`], [`LogConfig`])
//! - Connection settings shared by the inspector and the host ([`ConnectionSettings`])
//! - XDG-compliant path utilities ([`paths`] module)

pub mod error;
pub mod logging;
pub mod paths;
pub mod settings;

pub use error::{Result, SceneTermError};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogOutput, TRANSPORT_TARGET};
pub use settings::ConnectionSettings;

pub use paths::{config_dir, config_file, log_dir, state_dir};
