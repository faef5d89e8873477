use crate::math::{Point, Trajectory};
use crate::sim::ball::Probe;
use crate::sim::collision::Collision;
use crate::sim::context::SimContext;

use super::Form;

/// A form displaced by a polynomial offset in absolute time
#[derive(Debug, Clone)]
pub struct TranslateForm {
    inner: Box<Form>,
    transform: Trajectory,
}

impl TranslateForm {
    pub fn new(inner: Form, transform: Trajectory) -> Self {
        Self {
            inner: Box::new(inner),
            transform,
        }
    }

    pub fn inner(&self) -> &Form {
        &self.inner
    }

    pub fn transform(&self) -> &Trajectory {
        &self.transform
    }

    /// The probe relative to the moving form; hit directions come back unchanged
    pub fn collide(&self, probe: &Probe, ctx: &SimContext) -> Option<Collision> {
        let offset = self.transform.shifted(probe.start_t);
        self.inner.collide(&probe.with_bahn(probe.bahn.clone() - offset), ctx)
    }

    pub fn points(&self, t: f64) -> Vec<Point> {
        let offset = self.transform.apply(t);
        self.inner.points(t).into_iter().map(|p| p + offset).collect()
    }

    /// Rotates the inner form and the displacement direction
    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self {
            inner: Box::new(self.inner.rotated(angle, center)),
            transform: self.transform.rotate(angle, Point::ZERO),
        }
    }
}
