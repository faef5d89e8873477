use crate::math::Point;
use crate::sim::ball::Probe;
use crate::sim::collision::Collision;
use crate::sim::context::SimContext;

use super::Form;

/// A form whose own clock starts at `start_time`.
///
/// The inner form sees time `t - start_time`. Before `start_time` it is not
/// there at all.
#[derive(Debug, Clone)]
pub struct TimeShiftForm {
    inner: Box<Form>,
    start_time: f64,
}

impl TimeShiftForm {
    pub fn new(inner: Form, start_time: f64) -> Self {
        Self {
            inner: Box::new(inner),
            start_time,
        }
    }

    pub fn inner(&self) -> &Form {
        &self.inner
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn collide(&self, probe: &Probe, ctx: &SimContext) -> Option<Collision> {
        if probe.horizon < self.start_time {
            return None;
        }
        let probe = if self.start_time > probe.start_t {
            probe.rebased(self.start_time)
        } else {
            probe.clone()
        };
        self.inner
            .collide(&probe.on_clock(self.start_time), ctx)
            .map(|c| {
                let time = c.coll_t() + self.start_time;
                c.timed(time)
            })
    }

    pub fn points(&self, t: f64) -> Vec<Point> {
        self.inner.points(t - self.start_time)
    }

    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self {
            inner: Box::new(self.inner.rotated(angle, center)),
            start_time: self.start_time,
        }
    }
}
