//! Exact algebra for continuous-time collision detection
//!
//! - `polynom`: polynomials in time and their real roots
//! - `vector`: 2D vectors over numbers or polynomials (trajectories)
//! - `taylor`: truncated sine/cosine series for time-varying rotations
//! - `interval`: time ranges used to restrict root searches

pub mod interval;
pub mod polynom;
pub mod taylor;
pub mod vector;

pub use interval::Interval;
pub use polynom::{Polynom, RootQuery};
pub use taylor::TaylorSeries;
pub use vector::{Point, Scalar, Trajectory, Vector};
