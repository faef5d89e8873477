//! Engine settings
//!
//! Tuning knobs for the collision search and the worker pipeline, read from a
//! JSON file. Missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    // === Rotation ===
    /// Terms of the sin/cos series
    pub taylor_order: usize,
    /// Allowed truncation error of the series per rotation window
    pub taylor_tolerance: f64,
    /// Windows searched before a rotating form gives up
    pub max_rotation_segments: usize,

    // === Root finding ===
    /// Hits this close after a probe's start are ignored
    pub root_epsilon: f64,

    // === Pipeline ===
    /// Output channels in the generation ring
    pub num_channels: usize,
    /// Buffered changes per channel before the worker waits
    pub channel_capacity: usize,
    /// Changes applied per `check_coll` call
    pub max_pops_per_check: usize,

    // === Periodic forms ===
    pub outline_samples: usize,
    pub outline_padding: f64,

    // === World ===
    /// Ball radius for levels that do not set one
    pub ball_radius: f64,
    /// Simulated seconds per wall-clock second (runner only)
    pub time_scale: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            taylor_order: TAYLOR_ORDER,
            taylor_tolerance: TAYLOR_TOLERANCE,
            max_rotation_segments: MAX_ROTATION_SEGMENTS,

            root_epsilon: ROOT_EPSILON,

            num_channels: NUM_CHANNELS,
            channel_capacity: CHANNEL_CAPACITY,
            max_pops_per_check: MAX_POPS_PER_CHECK,

            outline_samples: OUTLINE_SAMPLES,
            outline_padding: OUTLINE_PADDING,

            ball_radius: BALL_RADIUS,
            time_scale: 1.0,
        }
    }
}

impl EngineSettings {
    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Like [`load`](Self::load), but falls back to defaults when the file is missing
    pub fn load_or_default(path: impl AsRef<Path>) -> EngineResult<Self> {
        match Self::load(path) {
            Err(EngineError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.num_channels < 2 {
            return Err(EngineError::config("num_channels must be at least 2"));
        }
        if self.channel_capacity == 0 || self.max_pops_per_check == 0 {
            return Err(EngineError::config(
                "channel_capacity and max_pops_per_check must be positive",
            ));
        }
        if !(self.taylor_tolerance > 0.0 && self.root_epsilon > 0.0 && self.ball_radius > 0.0) {
            return Err(EngineError::config(
                "taylor_tolerance, root_epsilon and ball_radius must be positive",
            ));
        }
        if !(self.time_scale > 0.0 && self.time_scale.is_finite()) {
            return Err(EngineError::config(format!(
                "time_scale must be a positive number, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let s = EngineSettings::default();
        assert_eq!(s.taylor_order, 8);
        assert_eq!(s.num_channels, 16);
        assert_eq!(s.channel_capacity, 1000);
        assert_eq!(s.max_pops_per_check, 5);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s: EngineSettings = serde_json::from_str(r#"{ "taylor_order": 10, "ball_radius": 12.5 }"#).unwrap();
        assert_eq!(s.taylor_order, 10);
        assert_eq!(s.ball_radius, 12.5);
        assert_eq!(s.root_epsilon, ROOT_EPSILON);
    }

    #[test]
    fn test_validate_rejects_tiny_ring() {
        let s = EngineSettings {
            num_channels: 1,
            ..Default::default()
        };
        assert!(matches!(s.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let s = EngineSettings::load_or_default("/nonexistent/poly-pinball-settings.json").unwrap();
        assert_eq!(s, EngineSettings::default());
        assert!(EngineSettings::load("/nonexistent/poly-pinball-settings.json").is_err());
    }
}
