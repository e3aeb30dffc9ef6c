use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Renderer statistics reported by the host for `GameInfo`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub avg_frame_time: Duration,
    pub avg_light_time: Duration,
    pub avg_anim_time: Duration,
    pub drawn_parts: u64,
    pub total_parts: u64,
    pub drawn_tris: u64,
    pub total_tris: u64,
}

/// Frame-rate and renderer counters supplied to the session each tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub fps: f64,
    pub tps: f64,
    pub debug: DebugInfo,
}
