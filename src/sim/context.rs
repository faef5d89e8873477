//! Query-time parameters shared by every collision search

use crate::consts::{MAX_PERIODIC_PHASES, MAX_ROTATION_SEGMENTS, ROOT_EPSILON};
use crate::math::TaylorSeries;
use crate::settings::EngineSettings;

#[derive(Debug, Clone)]
pub struct SimContext {
    /// sin/cos series for rotating forms
    pub taylor: TaylorSeries,
    /// Hits within this of a probe's start are ignored
    pub root_epsilon: f64,
    pub max_rotation_segments: usize,
    pub max_periodic_phases: usize,
}

impl SimContext {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            taylor: TaylorSeries::new(settings.taylor_order, settings.taylor_tolerance),
            root_epsilon: settings.root_epsilon,
            max_rotation_segments: settings.max_rotation_segments,
            max_periodic_phases: MAX_PERIODIC_PHASES,
        }
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self {
            taylor: TaylorSeries::default(),
            root_epsilon: ROOT_EPSILON,
            max_rotation_segments: MAX_ROTATION_SEGMENTS,
            max_periodic_phases: MAX_PERIODIC_PHASES,
        }
    }
}
