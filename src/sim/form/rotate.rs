use crate::math::{Point, Polynom};
use crate::sim::ball::Probe;
use crate::sim::collision::Collision;
use crate::sim::context::SimContext;

use super::Form;

/// A form spinning at constant angular speed around a centre.
///
/// The inner form is seen in a frame rotated by
/// `angle(t) = -speed * (t - start_time) - start_angle`. The probe is rotated
/// into that frame piecewise: each window rotates exactly by the angle at the
/// window's midpoint and covers the remaining angle change with the truncated
/// sin/cos series, so the error stays within the series tolerance.
#[derive(Debug, Clone)]
pub struct RotateForm {
    inner: Box<Form>,
    center: Point,
    start_angle: f64,
    speed: f64,
    start_time: f64,
}

impl RotateForm {
    /// Angles in radians, `speed` in radians per time unit
    pub fn new(inner: Form, center: Point, start_angle: f64, speed: f64, start_time: f64) -> Self {
        Self {
            inner: Box::new(inner),
            center,
            start_angle,
            speed,
            start_time,
        }
    }

    pub fn inner(&self) -> &Form {
        &self.inner
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Frame angle at absolute time `t`
    pub fn angle_at(&self, t: f64) -> f64 {
        -self.speed * (t - self.start_time) - self.start_angle
    }

    pub fn collide(&self, probe: &Probe, ctx: &SimContext) -> Option<Collision> {
        if self.speed == 0.0 {
            let angle = self.angle_at(probe.start_t);
            let local = probe.with_bahn(probe.bahn.rotate(angle, self.center));
            return self.inner.collide(&local, ctx).map(|c| c.rotated(-angle));
        }

        let half = ctx.taylor.window() / self.speed.abs();
        // angle change relative to the window midpoint, in time since the window start
        let delta = Polynom::new(vec![self.speed * half, -self.speed]);
        let mut window_start = probe.start_t;
        for segment in 0..ctx.max_rotation_segments {
            if window_start > probe.horizon {
                return None;
            }
            let window_end = window_start + 2.0 * half;
            let mid_angle = self.angle_at(window_start + half);
            let base = if segment == 0 {
                probe.clone()
            } else {
                probe.rebased(window_start)
            };
            let bahn = base
                .bahn
                .rotate(mid_angle, self.center)
                .rotate_poly(&delta, self.center, &ctx.taylor);
            let local = Probe::new(bahn, window_start).until(window_end.min(probe.horizon));
            if let Some(c) = self.inner.collide(&local, ctx) {
                if c.coll_t() <= window_end {
                    let angle = self.angle_at(c.coll_t());
                    return Some(c.rotated(-angle));
                }
            }
            window_start = window_end;
        }
        log::debug!(
            "rotating form: no hit within {} windows",
            ctx.max_rotation_segments
        );
        None
    }

    /// Inner points turned to the world orientation at absolute time `t`
    pub fn points(&self, t: f64) -> Vec<Point> {
        let angle = self.angle_at(t);
        self.inner
            .points(t)
            .into_iter()
            .map(|p| p.rotate(-angle, self.center))
            .collect()
    }

    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self {
            inner: Box::new(self.inner.rotated(angle, center)),
            center: self.center.rotate(angle, center),
            ..*self
        }
    }
}
