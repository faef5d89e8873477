//! Surface materials

use serde::{Deserialize, Serialize};

use crate::math::Point;

/// Restitution and minimum-speed floors applied when a ball hits a surface.
///
/// The impact velocity is split into the part along the surface normal (`ort`)
/// and the part along the surface (`par`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Multiplier for the normal component (it is also reversed)
    pub factor_ort: f64,
    /// Multiplier for the tangential component
    pub factor_par: f64,
    /// Minimum normal speed before scaling
    pub min_ort: f64,
    /// Minimum tangential speed before scaling
    pub min_par: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self::ELASTIC
    }
}

impl Material {
    /// Perfect mirror, no floors
    pub const ELASTIC: Material = Material::new(1.0, 1.0, 0.0, 0.0);

    /// Material of balls when they act as obstacles for each other
    pub const BALL: Material = Material::new(0.8, 0.95, 20.0, 1.0);

    pub const fn new(factor_ort: f64, factor_par: f64, min_ort: f64, min_par: f64) -> Self {
        Self {
            factor_ort,
            factor_par,
            min_ort,
            min_par,
        }
    }

    /// Outgoing velocity for a ball hitting a surface with the given normal.
    ///
    /// Result: `par * factor_par - ort * factor_ort`, where each component is
    /// first raised to its floor (zero-length components stay zero).
    pub fn reflect(&self, vel: Point, normal: Point) -> Point {
        let (ort, par) = vel.decompose(normal);
        let ort = floor_speed(ort, self.min_ort);
        let par = floor_speed(par, self.min_par);
        par.scale(self.factor_par) - ort.scale(self.factor_ort)
    }
}

fn floor_speed(v: Point, min: f64) -> Point {
    let speed = v.magnitude();
    if speed > 0.0 && speed < min {
        v.normalize().scale(min)
    } else {
        v
    }
}
