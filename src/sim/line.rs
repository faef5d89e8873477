//! Straight segment paths
//!
//! A segment stores its line as an implicit equation solved for the dominant
//! axis: `y = m x + b` for flat segments, `x = m y + b` for steep ones, so
//! near-vertical segments never produce huge slopes. A hit must land inside the
//! segment's (slightly padded) bounding box.

use std::sync::Arc;

use crate::consts::LINE_BOUND_PAD;
use crate::math::{Point, Polynom, RootQuery, Trajectory};

use super::path::{CollDirection, Surface};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Equation {
    /// `y = slope * x + intercept`
    YOfX { slope: f64, intercept: f64 },
    /// `x = slope * y + intercept`
    XOfY { slope: f64, intercept: f64 },
    /// Coincident endpoints
    Degenerate,
}

#[derive(Debug, Clone)]
pub struct LinePath {
    pub pos1: Point,
    pub pos2: Point,
    /// Unit normal on the "outside" of the segment
    normal: Point,
    pub direction: CollDirection,
    pub surface: Arc<Surface>,
    equation: Equation,
    min: Point,
    max: Point,
}

impl LinePath {
    /// Segment from `pos1` to `pos2`; `normal` picks the outside and is normalized here
    pub fn new(
        pos1: Point,
        pos2: Point,
        normal: Point,
        direction: CollDirection,
        surface: Arc<Surface>,
    ) -> Self {
        let d = pos2 - pos1;
        let equation = if d.magnitude() <= f64::EPSILON * (1.0 + pos1.magnitude()) {
            Equation::Degenerate
        } else if d.x.abs() >= d.y.abs() {
            let slope = d.y / d.x;
            Equation::YOfX {
                slope,
                intercept: pos1.y - slope * pos1.x,
            }
        } else {
            let slope = d.x / d.y;
            Equation::XOfY {
                slope,
                intercept: pos1.x - slope * pos1.y,
            }
        };
        Self {
            pos1,
            pos2,
            normal: normal.normalize(),
            direction,
            surface,
            equation,
            min: Point::new(pos1.x.min(pos2.x) - LINE_BOUND_PAD, pos1.y.min(pos2.y) - LINE_BOUND_PAD),
            max: Point::new(pos1.x.max(pos2.x) + LINE_BOUND_PAD, pos1.y.max(pos2.y) + LINE_BOUND_PAD),
        }
    }

    pub fn normal(&self) -> Point {
        self.normal
    }

    pub fn is_degenerate(&self) -> bool {
        self.equation == Equation::Degenerate
    }

    fn in_bounds(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Signed residual of the implicit equation along the trajectory
    fn residual(&self, bahn: &Trajectory) -> Option<Polynom> {
        match self.equation {
            Equation::YOfX { slope, intercept } => Some(&bahn.y - &(&(&bahn.x * slope) + intercept)),
            Equation::XOfY { slope, intercept } => Some(&bahn.x - &(&(&bahn.y * slope) + intercept)),
            Equation::Degenerate => None,
        }
    }

    pub(crate) fn roots(&self, bahn: &Trajectory, query: &RootQuery) -> Vec<f64> {
        let Some(equation) = self.residual(bahn) else {
            return Vec::new();
        };
        let vel = bahn.deriv();
        equation.find_roots(query, |t| {
            self.in_bounds(bahn.apply(t)) && self.direction.admits(self.normal.dot(&vel.apply(t)))
        })
    }

    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self::new(
            self.pos1.rotate(angle, center),
            self.pos2.rotate(angle, center),
            self.normal.rotate(angle, Point::ZERO),
            self.direction,
            Arc::clone(&self.surface),
        )
    }
}
