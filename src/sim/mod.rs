//! Continuous-time simulation module
//!
//! Everything that decides where balls go lives here. Nothing is stepped:
//! - Trajectories are exact polynomials in time
//! - Collisions are roots of polynomials, reported in absolute time
//! - Forms and balls are immutable values; a step replaces them
//! - No rendering, threading or platform dependencies

pub mod advance;
pub mod arc;
pub mod ball;
pub mod builders;
pub mod collision;
pub mod context;
pub mod form;
pub mod handler;
pub mod line;
pub mod material;
pub mod path;
pub mod state;

pub use advance::{Hook, Hooks, advance};
pub use arc::ArcPath;
pub use ball::{Ball, Probe, ball_surface};
pub use builders::{flipper, spinner};
pub use collision::{Collision, earliest};
pub use context::SimContext;
pub use form::{
    CircleForm, Form, LineForm, PeriodicForm, PolygonForm, RotateForm, TimeLimitedForm, TimeShiftForm,
    TranslateForm,
};
pub use handler::FormHandler;
pub use line::LinePath;
pub use material::Material;
pub use path::{CollDirection, Path, Surface};
pub use state::{ChangeInfo, GameState, StateChange, VarStore};
