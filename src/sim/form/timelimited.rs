use crate::math::Point;
use crate::sim::ball::Probe;
use crate::sim::collision::Collision;
use crate::sim::context::SimContext;

use super::Form;

/// One form up to an absolute switch time, another one after it
#[derive(Debug, Clone)]
pub struct TimeLimitedForm {
    start: Box<Form>,
    switch_time: f64,
    end: Box<Form>,
}

impl TimeLimitedForm {
    pub fn new(start: Form, switch_time: f64, end: Form) -> Self {
        Self {
            start: Box::new(start),
            switch_time,
            end: Box::new(end),
        }
    }

    pub fn start_form(&self) -> &Form {
        &self.start
    }

    pub fn end_form(&self) -> &Form {
        &self.end
    }

    pub fn switch_time(&self) -> f64 {
        self.switch_time
    }

    pub fn collide(&self, probe: &Probe, ctx: &SimContext) -> Option<Collision> {
        if probe.start_t >= self.switch_time {
            return self.end.collide(probe, ctx);
        }
        let early = self.start.collide(&probe.until(self.switch_time), ctx);
        if let Some(c) = early.filter(|c| c.coll_t() < self.switch_time) {
            return Some(c);
        }
        if probe.horizon < self.switch_time {
            return None;
        }
        self.end.collide(&probe.rebased(self.switch_time), ctx)
    }

    pub fn points(&self, t: f64) -> Vec<Point> {
        if t < self.switch_time {
            self.start.points(t)
        } else {
            self.end.points(t)
        }
    }

    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self {
            start: Box::new(self.start.rotated(angle, center)),
            switch_time: self.switch_time,
            end: Box::new(self.end.rotated(angle, center)),
        }
    }
}
