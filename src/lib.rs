//! Poly Pinball - continuous-time collision engine for a 2D pinball game
//!
//! Balls move along exact polynomial trajectories; the next contact with any
//! obstacle is found by polynomial root finding instead of time stepping.
//!
//! Core modules:
//! - `math`: Polynomials, planar vectors, truncated sin/cos series, intervals
//! - `sim`: Balls, collision paths, forms, collisions, game state
//! - `pipeline`: Background worker that precomputes future collisions
//! - `level`: Level description loading
//! - `settings`: Engine tuning

pub mod error;
pub mod level;
pub mod math;
pub mod pipeline;
pub mod settings;
pub mod sim;

pub use error::{EngineError, EngineResult};
pub use level::Level;
pub use pipeline::CollThread;
pub use settings::EngineSettings;

use math::Point;

/// Engine constants
pub mod consts {
    /// Roots closer than this to "now" are ignored (the contact that produced the trajectory)
    pub const ROOT_EPSILON: f64 = 1e-6;
    /// Bounding-box padding for line segments, keeps axis-aligned segments from having zero width
    pub const LINE_BOUND_PAD: f64 = 1e-6;
    /// Crossing times closer than this count as one crossing
    pub const CROSSING_MERGE_EPSILON: f64 = 1e-4;

    /// Terms of the sin/cos series used for rotating forms
    pub const TAYLOR_ORDER: usize = 8;
    /// Maximum truncation error of the sin/cos series
    pub const TAYLOR_TOLERANCE: f64 = 1e-4;
    /// Rotation windows searched before a rotating form reports no collision
    pub const MAX_ROTATION_SEGMENTS: usize = 64;

    /// Phases a periodic form walks through in one query
    pub const MAX_PERIODIC_PHASES: usize = 4096;
    /// Samples per period for the periodic bounding outline
    pub const OUTLINE_SAMPLES: usize = 256;
    /// Relative inflation of the periodic bounding outline
    pub const OUTLINE_PADDING: f64 = 0.2;
    /// Absolute inflation of the periodic bounding outline
    pub const OUTLINE_MARGIN: f64 = 1.0;

    /// Ball radius when a level does not set one
    pub const BALL_RADIUS: f64 = 20.0;

    /// Output channels in the pipeline ring
    pub const NUM_CHANNELS: usize = 16;
    /// Bounded capacity of each output channel
    pub const CHANNEL_CAPACITY: usize = 1000;
    /// State changes applied per `check_coll`
    pub const MAX_POPS_PER_CHECK: usize = 5;
    /// How long a blocked worker waits for input before retrying a publish (ms)
    pub const PUBLISH_RETRY_MS: u64 = 5;
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::TAU;
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> Point {
    Point::from_angle(theta).scale(r)
}

/// Convert cartesian (x, y) to polar (r, theta), theta in [0, 2π)
#[inline]
pub fn cartesian_to_polar(pos: Point) -> (f64, f64) {
    (pos.magnitude(), pos.angle())
}
