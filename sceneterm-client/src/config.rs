//! Client-side configuration loading
//!
//! Reads the `[connection]` table from the shared config file
//! (`~/.config/sceneterm/config.toml`). A missing or broken file falls back to
//! defaults with a warning; the inspector should still start.

use std::path::Path;

use sceneterm_utils::{config_file, ConnectionSettings};

/// Client configuration file layout
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
struct ClientConfig {
    connection: ConnectionSettings,
}

/// Load connection settings from the default config file
pub fn load_connection_settings() -> ConnectionSettings {
    load_connection_settings_from(&config_file())
}

/// Load connection settings from `path`
///
/// Returns defaults if the file doesn't exist or can't be parsed.
pub fn load_connection_settings_from(path: &Path) -> ConnectionSettings {
    if !path.exists() {
        tracing::debug!("Config file not found, using default connection settings");
        return ConnectionSettings::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str::<ClientConfig>(&content) {
            Ok(config) => {
                let c = &config.connection;
                tracing::debug!(
                    "Loaded connection settings from config: host={:?}, port={}, timeout={}ms",
                    c.host,
                    c.port,
                    c.request_timeout_ms
                );
                config.connection
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file {}: {}, using defaults", path.display(), e);
                ConnectionSettings::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}, using defaults", path.display(), e);
            ConnectionSettings::default()
        }
    }
}
