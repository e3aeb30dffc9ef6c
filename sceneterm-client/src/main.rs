//! sceneterm - terminal inspector for live scene graphs
//!
//! Connects to the inspector server embedded in a running host, mirrors its
//! scene tree and lets the user select, move and restructure nodes.

use sceneterm_protocol::{snapshot_to_json, SceneRefresh};
use sceneterm_utils::{init_logging_with_config, LogConfig, Result, SceneTermError};

mod cli;
mod config;
mod connection;
mod input;
mod mirror;
mod poller;
mod requests;
mod ui;

use cli::Args;
use connection::InspectorClient;
use ui::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments first (before terminal setup)
    let args = Args::parse_args();

    let file_settings = match &args.config {
        Some(path) => config::load_connection_settings_from(path),
        None => config::load_connection_settings(),
    };
    let settings = args.apply(file_settings);

    // Log to file; the TUI owns the terminal
    init_logging_with_config(LogConfig::client().with_silenced_transport(settings.silent_logging))?;
    tracing::info!("sceneterm client starting");
    tracing::debug!("CLI args: {:?}", args);

    let client = InspectorClient::new(&settings);

    let result = if args.dump {
        dump_snapshot(&client).await
    } else {
        App::new(client).run().await
    };

    match result {
        Ok(()) => {
            tracing::info!("sceneterm client exiting normally");
            Ok(())
        }
        Err(e) => {
            tracing::error!("sceneterm client error: {}", e);
            // Print error to stderr after terminal restoration
            eprintln!("Error: {}", e);
            Err(e)
        }
    }
}

/// Print one snapshot of the active scene as JSON
async fn dump_snapshot(client: &InspectorClient) -> Result<()> {
    let refresh = client.send(SceneRefresh::default()).await?;
    let tree = refresh
        .scene_tree
        .ok_or_else(|| SceneTermError::protocol("server sent no scene tree"))?;
    let json = snapshot_to_json(&tree).map_err(|e| SceneTermError::internal(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
