//! Circular arc paths
//!
//! An arc is the circle `|p - center| = radius` restricted to an angular window
//! starting at `min_angle` and running counter-clockwise for `span` radians.
//! A ball hits it when
//! `(x(t) - cx)^2 + (y(t) - cy)^2 - r^2 = 0`
//! at a point inside the window, approaching from the allowed side.

use std::f64::consts::TAU;
use std::sync::Arc;

use crate::math::{Point, RootQuery, Trajectory};
use crate::{normalize_angle, polar_to_cartesian};

use super::path::{CollDirection, Surface};

/// Windows within this of a full turn are treated as the full circle
const FULL_CIRCLE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct ArcPath {
    pub center: Point,
    pub radius: f64,
    /// Window start (radians, normalized to [0, 2π))
    pub min_angle: f64,
    /// Counter-clockwise window length in (0, 2π]
    pub span: f64,
    pub direction: CollDirection,
    pub surface: Arc<Surface>,
}

impl ArcPath {
    /// Arc from `min_angle` counter-clockwise to `max_angle`.
    ///
    /// Equal angles (mod 2π) give the full circle.
    pub fn new(
        center: Point,
        radius: f64,
        min_angle: f64,
        max_angle: f64,
        direction: CollDirection,
        surface: Arc<Surface>,
    ) -> Self {
        let mut span = normalize_angle(max_angle - min_angle);
        if span < FULL_CIRCLE_EPSILON {
            span = TAU;
        }
        Self {
            center,
            radius,
            min_angle: normalize_angle(min_angle),
            span,
            direction,
            surface,
        }
    }

    pub fn full(center: Point, radius: f64, direction: CollDirection, surface: Arc<Surface>) -> Self {
        Self::new(center, radius, 0.0, 0.0, direction, surface)
    }

    pub fn max_angle(&self) -> f64 {
        normalize_angle(self.min_angle + self.span)
    }

    pub fn is_full(&self) -> bool {
        self.span >= TAU - FULL_CIRCLE_EPSILON
    }

    /// Check if an angle is within the window
    pub fn contains_angle(&self, theta: f64) -> bool {
        self.is_full() || normalize_angle(theta - self.min_angle) <= self.span
    }

    /// Outward unit normal at a point on the circle
    pub fn normal_at(&self, pos: Point) -> Point {
        (pos - self.center).normalize()
    }

    pub(crate) fn roots(&self, bahn: &Trajectory, query: &RootQuery) -> Vec<f64> {
        if self.radius <= 0.0 {
            return Vec::new();
        }
        let equation = &bahn.distance_sq(self.center) - self.radius * self.radius;
        let vel = bahn.deriv();
        equation.find_roots(query, |t| {
            let offset = bahn.apply(t) - self.center;
            self.contains_angle(offset.angle())
                && self.direction.admits(offset.dot(&vel.apply(t)))
        })
    }

    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self {
            center: self.center.rotate(angle, center),
            min_angle: normalize_angle(self.min_angle - angle),
            surface: Arc::clone(&self.surface),
            ..*self
        }
    }

    /// Sample points along the arc
    pub fn sample(&self, num_points: usize) -> Vec<Point> {
        (0..num_points)
            .map(|i| {
                let t = i as f64 / (num_points - 1).max(1) as f64;
                let theta = self.min_angle + t * self.span;
                self.center + polar_to_cartesian(self.radius, theta)
            })
            .collect()
    }
}
