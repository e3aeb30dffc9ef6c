pub mod math;
pub mod scene;
pub mod stats;

pub use math::*;
pub use scene::*;
pub use stats::*;
