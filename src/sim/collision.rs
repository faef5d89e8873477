//! Collision results
//!
//! A collision found in some transformed frame is wrapped on the way out so
//! the outer caller always sees absolute time and world-frame directions:
//! `Rotated` turns the outgoing direction back, `Timed` replaces the time.

use std::sync::Arc;

use crate::math::Point;

use super::ball::Probe;
use super::path::{Path, Surface};

#[derive(Debug, Clone)]
pub enum Collision {
    /// Direct hit of a path
    Simple {
        /// Absolute time of impact
        time: f64,
        /// The probe as the path saw it
        probe: Probe,
        path: Path,
    },
    /// Hit found in a frame rotated against the world
    Rotated {
        inner: Box<Collision>,
        /// Rotation taking the inner frame's directions back to the outer frame
        angle: f64,
    },
    /// Hit found on another clock
    Timed { inner: Box<Collision>, time: f64 },
}

impl Collision {
    pub fn rotated(self, angle: f64) -> Self {
        Collision::Rotated {
            inner: Box::new(self),
            angle,
        }
    }

    pub fn timed(self, time: f64) -> Self {
        Collision::Timed {
            inner: Box::new(self),
            time,
        }
    }

    /// Absolute time of impact
    pub fn coll_t(&self) -> f64 {
        match self {
            Collision::Simple { time, .. } | Collision::Timed { time, .. } => *time,
            Collision::Rotated { inner, .. } => inner.coll_t(),
        }
    }

    /// Outgoing ball velocity after the surface material is applied
    pub fn result_dir(&self) -> Point {
        match self {
            Collision::Simple { time, probe, path } => {
                let pos = probe.pos(*time);
                path.surface().material.reflect(probe.vel(*time), path.normal_at(pos))
            }
            Collision::Rotated { inner, angle } => inner.result_dir().rotate(*angle, Point::ZERO),
            Collision::Timed { inner, .. } => inner.result_dir(),
        }
    }

    /// Surface data of the form that was hit
    pub fn obj_form(&self) -> &Arc<Surface> {
        match self {
            Collision::Simple { path, .. } => path.surface(),
            Collision::Rotated { inner, .. } | Collision::Timed { inner, .. } => inner.obj_form(),
        }
    }

    /// Wrapper depth, 0 for a direct hit
    pub fn depth(&self) -> usize {
        match self {
            Collision::Simple { .. } => 0,
            Collision::Rotated { inner, .. } | Collision::Timed { inner, .. } => 1 + inner.depth(),
        }
    }
}

/// The earlier of two optional collisions (first wins ties)
pub fn earliest(a: Option<Collision>, b: Option<Collision>) -> Option<Collision> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.coll_t() < a.coll_t() { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Polynom, Trajectory};
    use crate::sim::line::LinePath;
    use crate::sim::material::Material;
    use crate::sim::path::CollDirection;
    use std::f64::consts::FRAC_PI_2;

    fn floor_hit() -> Collision {
        let surface = Arc::new(Surface::new(Material::new(0.5, 1.0, 0.0, 0.0)).with_name("floor"));
        let path = Path::Line(LinePath::new(
            Point::new(-10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 1.0),
            CollDirection::FromOutside,
            surface,
        ));
        // from (0, 10) moving (1, -10), probe starts at t = 2
        let probe = Probe::new(
            Trajectory::new(Polynom::new(vec![0.0, 1.0]), Polynom::new(vec![10.0, -10.0])),
            2.0,
        );
        Collision::Simple { time: 3.0, probe, path }
    }

    #[test]
    fn test_simple_reflects_with_material() {
        let c = floor_hit();
        assert_eq!(c.coll_t(), 3.0);
        assert!(c.result_dir().distance(Point::new(1.0, 5.0)) < 1e-12);
        assert_eq!(c.obj_form().name, "floor");
        assert_eq!(c.depth(), 0);
    }

    #[test]
    fn test_rotated_turns_direction_only() {
        let c = floor_hit().rotated(FRAC_PI_2);
        assert_eq!(c.coll_t(), 3.0);
        // (1, 5) rotated clockwise by π/2
        assert!(c.result_dir().distance(Point::new(5.0, -1.0)) < 1e-12);
    }

    #[test]
    fn test_timed_replaces_time() {
        let c = floor_hit().timed(10.0).rotated(0.0);
        assert_eq!(c.coll_t(), 10.0);
        assert!(c.result_dir().distance(Point::new(1.0, 5.0)) < 1e-12);
        assert_eq!(c.obj_form().name, "floor");
        assert_eq!(c.depth(), 2);
    }

    #[test]
    fn test_earliest() {
        let a = floor_hit();
        let b = floor_hit().timed(1.0);
        assert_eq!(earliest(Some(a.clone()), Some(b)).map(|c| c.coll_t()), Some(1.0));
        assert_eq!(earliest(None, Some(a)).map(|c| c.coll_t()), Some(3.0));
        assert!(earliest(None, None).is_none());
    }
}
