//! sceneterm-demo - headless host with a small animated scene
//!
//! Runs the inspector server against an in-memory scene so the terminal
//! client has something to connect to.

use std::time::{Duration, Instant};

use clap::Parser;
use sceneterm_protocol::{DebugInfo, GameStats, NodeId, NodeType, Vec3, DEFAULT_PORT};
use sceneterm_server::{DebugCanvas, InspectorServer, MemoryGraph, SceneGraph, Transform};
use sceneterm_utils::{init_logging_with_config, ConnectionSettings, LogConfig, Result};
use tracing::{debug, info};

/// sceneterm-demo - serve a demo scene to the sceneterm inspector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "SCENETERM_HOST", default_value = "")]
    host: String,

    /// Port to listen on
    #[arg(long, short = 'p', env = "SCENETERM_PORT", default_value = DEFAULT_PORT)]
    port: String,

    /// Log every request, not just lifecycle events
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Ticks per second
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,
}

/// Canvas with no renderer behind it; only counts what it was asked to draw
#[derive(Default)]
struct CountingCanvas {
    camera: Option<NodeId>,
    centers: u64,
    overlays: u64,
}

impl DebugCanvas for CountingCanvas {
    fn camera(&self) -> Option<NodeId> {
        self.camera
    }

    fn draw_center(&mut self, _position: Vec3, _highlighted: bool) {
        self.centers += 1;
    }

    fn draw_label(&mut self, _position: Vec3, _text: &str, _highlighted: bool) {}

    fn draw_line(&mut self, _from: Vec3, _to: Vec3) {
        self.overlays += 1;
    }

    fn draw_wireframe(&mut self, _node: NodeId) {
        self.overlays += 1;
    }

    fn draw_bounds(&mut self, _node: NodeId) {
        self.overlays += 1;
    }
}

struct Demo {
    level: MemoryGraph,
    library: Vec<MemoryGraph>,
    camera: NodeId,
    spinner: NodeId,
}

fn build_demo() -> Demo {
    let mut level = MemoryGraph::new("Level");
    let root = level.root();

    // `add` only fails for a missing parent; every parent below was just created.
    let camera = level
        .add(root, "Camera", NodeType::Camera, Transform::at(Vec3::new(0.0, 2.0, 12.0)))
        .unwrap_or(root);
    let spinner = level
        .add(root, "Cube", NodeType::Model, Transform::default())
        .unwrap_or(root);
    level.add(spinner, "CubeLight", NodeType::Light, Transform::at(Vec3::new(0.0, 1.5, 0.0)));
    let floor = level
        .add(root, "Floor", NodeType::Grid, Transform::at(Vec3::new(0.0, -1.0, 0.0)))
        .unwrap_or(root);
    level.add(floor, "Waypoints", NodeType::Path, Transform::default());

    let mut props = MemoryGraph::new("Props");
    let props_root = props.root();
    props.add(props_root, "Crate", NodeType::Model, Transform::default());
    let barrel = props
        .add(props_root, "Barrel", NodeType::Model, Transform::default())
        .unwrap_or(props_root);
    props.add(barrel, "BarrelLid", NodeType::Model, Transform::at(Vec3::new(0.0, 0.6, 0.0)));
    props.add(props_root, "Lamp", NodeType::Light, Transform::default());

    Demo {
        level,
        library: vec![props],
        camera,
        spinner,
    }
}

fn frame_stats(demo: &Demo, frame_time: Duration, tick_rate: u32) -> GameStats {
    let total = demo.level.len() as u64;
    let drawn = demo
        .level
        .descendants(demo.level.root())
        .into_iter()
        .filter(|id| demo.level.visible(*id))
        .count() as u64;

    GameStats {
        fps: 1.0 / frame_time.as_secs_f64().max(f64::EPSILON),
        tps: f64::from(tick_rate),
        debug: DebugInfo {
            avg_frame_time: frame_time,
            drawn_parts: drawn,
            total_parts: total,
            drawn_tris: drawn * 12,
            total_tris: total * 12,
            ..Default::default()
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging_with_config(LogConfig::host().with_silenced_transport(!args.verbose))?;

    let settings = ConnectionSettings {
        host: args.host.clone(),
        port: args.port.clone(),
        silent_logging: !args.verbose,
        ..Default::default()
    };
    let mut server = InspectorServer::start(&settings)?;
    info!("demo scene served on {}", server.local_addr());

    let mut demo = build_demo();
    let mut canvas = CountingCanvas {
        camera: Some(demo.camera),
        ..Default::default()
    };

    let tick_rate = args.tick_rate.max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(1) / tick_rate);
    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let frame_time = now - last_frame;
                last_frame = now;

                demo.level.rotate(demo.spinner, Vec3::new(0.0, 1.0, 0.0), frame_time.as_secs_f64());
                server.set_game_stats(frame_stats(&demo, frame_time, tick_rate));

                server.update(&mut demo.level, &demo.library);
                server.draw(&demo.level, &mut canvas);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
        }
    }

    debug!(centers = canvas.centers, overlays = canvas.overlays, "overlay draw totals");
    Ok(())
}
