//! Command-line argument parsing for the sceneterm client
//!
//! Uses clap for argument parsing with derive macros. Flags override the
//! `[connection]` table of the config file.

use clap::Parser;
use std::path::PathBuf;

use sceneterm_utils::ConnectionSettings;

/// sceneterm - live scene graph inspector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host running the inspector server (blank means loopback)
    #[arg(long, env = "SCENETERM_HOST")]
    pub host: Option<String>,

    /// Port of the inspector server
    #[arg(long, short = 'p', env = "SCENETERM_PORT")]
    pub port: Option<String>,

    /// Log per-request transport chatter
    ///
    /// Transport logging is silenced by default so a flaky connection does
    /// not flood the log file.
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,

    /// Request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Config file to read instead of the default location
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Print one scene snapshot as JSON and exit
    #[arg(long, default_value_t = false)]
    pub dump: bool,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Layer flag values over settings loaded from the config file
    pub fn apply(&self, mut settings: ConnectionSettings) -> ConnectionSettings {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = &self.port {
            settings.port = port.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.request_timeout_ms = timeout_ms;
        }
        if self.verbose {
            settings.silent_logging = false;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["sceneterm"]);
        assert!(!args.verbose);
        assert!(!args.dump);
        assert!(args.timeout_ms.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_apply_overrides() {
        let args = Args::parse_from([
            "sceneterm",
            "--host",
            "10.0.0.2",
            "-p",
            "9000",
            "--timeout-ms",
            "500",
            "-v",
        ]);
        let settings = args.apply(ConnectionSettings::default());
        assert_eq!(settings.socket_addr(), "10.0.0.2:9000");
        assert_eq!(settings.request_timeout_ms, 500);
        assert!(!settings.silent_logging);
    }

    #[test]
    fn test_apply_keeps_file_values() {
        let args = Args::parse_from(["sceneterm", "--dump"]);
        let from_file = ConnectionSettings {
            host: "game-box".into(),
            request_timeout_ms: 900,
            ..Default::default()
        };
        let settings = Args {
            host: None,
            port: None,
            ..args
        }
        .apply(from_file.clone());
        assert_eq!(settings, from_file);
    }
}
