//! Connection settings shared by the inspector and the host

use std::time::Duration;

use serde::{Deserialize, Serialize};

use sceneterm_protocol::DEFAULT_PORT;

/// Host used when the configured host is blank
pub const LOOPBACK_HOST: &str = "127.0.0.1";

/// Where to reach the inspector server and how chatty to be about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Host to dial or bind; blank means loopback
    pub host: String,
    pub port: String,
    /// Silence per-request transport logging
    pub silent_logging: bool,
    /// Upper bound on one request/response exchange
    pub request_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT.to_string(),
            silent_logging: true,
            request_timeout_ms: 2000,
        }
    }
}

impl ConnectionSettings {
    /// `host:port`, substituting loopback for a blank host
    pub fn socket_addr(&self) -> String {
        let host = self.host.trim();
        let host = if host.is_empty() { LOOPBACK_HOST } else { host };
        let port = self.port.trim();
        let port = if port.is_empty() { DEFAULT_PORT } else { port };
        format!("{}:{}", host, port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
