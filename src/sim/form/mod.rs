//! Collidable scene objects
//!
//! Leaf forms (`Line`, `Circle`, `Polygon`) own their paths. Wrapper forms move
//! a probe into their inner form's frame, delegate, and wrap the result so the
//! caller sees absolute time and world directions:
//!
//! - `Rotate`: time-varying rotation around a centre
//! - `Translate`: time-varying displacement
//! - `TimeShift`: inner form runs on a clock starting at a given time
//! - `TimeLimited`: one form until a switch time, another afterwards
//! - `Periodic`: a cycle of forms, each active for a fixed duration

mod circle;
mod line;
mod periodic;
mod polygon;
mod rotate;
mod timelimited;
mod timeshift;
mod translate;

pub use circle::CircleForm;
pub use line::LineForm;
pub use periodic::PeriodicForm;
pub use polygon::PolygonForm;
pub use rotate::RotateForm;
pub use timelimited::TimeLimitedForm;
pub use timeshift::TimeShiftForm;
pub use translate::TranslateForm;

use std::sync::Arc;

use crate::math::Point;

use super::ball::{Ball, Probe};
use super::collision::Collision;
use super::context::SimContext;
use super::material::Material;
use super::path::{Path, Surface};

#[derive(Debug, Clone)]
pub enum Form {
    Line(LineForm),
    Circle(CircleForm),
    Polygon(PolygonForm),
    Rotate(RotateForm),
    Translate(TranslateForm),
    TimeShift(TimeShiftForm),
    TimeLimited(TimeLimitedForm),
    Periodic(PeriodicForm),
}

impl Form {
    /// Earliest collision of the ball with this form
    pub fn find_collision(&self, ball: &Ball, ctx: &SimContext) -> Option<Collision> {
        self.collide(&ball.probe(), ctx)
    }

    /// Earliest collision of a probe with this form
    pub fn collide(&self, probe: &Probe, ctx: &SimContext) -> Option<Collision> {
        match self {
            Form::Line(f) => collide_paths(f.paths(), probe, ctx),
            Form::Circle(f) => collide_paths(f.paths(), probe, ctx),
            Form::Polygon(f) => collide_paths(f.paths(), probe, ctx),
            Form::Rotate(f) => f.collide(probe, ctx),
            Form::Translate(f) => f.collide(probe, ctx),
            Form::TimeShift(f) => f.collide(probe, ctx),
            Form::TimeLimited(f) => f.collide(probe, ctx),
            Form::Periodic(f) => f.collide(probe, ctx),
        }
    }

    /// Outline points at absolute time `t`
    pub fn points(&self, t: f64) -> Vec<Point> {
        match self {
            Form::Line(f) => f.points(),
            Form::Circle(f) => f.points(),
            Form::Polygon(f) => f.points().to_vec(),
            Form::Rotate(f) => f.points(t),
            Form::Translate(f) => f.points(t),
            Form::TimeShift(f) => f.points(t),
            Form::TimeLimited(f) => f.points(t),
            Form::Periodic(f) => f.points(t),
        }
    }

    /// Copy rotated by a fixed `angle` around `center` (clockwise, like [`Point::rotate`])
    pub fn rotated(&self, angle: f64, center: Point) -> Form {
        match self {
            Form::Line(f) => Form::Line(f.rotated(angle, center)),
            Form::Circle(f) => Form::Circle(f.rotated(angle, center)),
            Form::Polygon(f) => Form::Polygon(f.rotated(angle, center)),
            Form::Rotate(f) => Form::Rotate(f.rotated(angle, center)),
            Form::Translate(f) => Form::Translate(f.rotated(angle, center)),
            Form::TimeShift(f) => Form::TimeShift(f.rotated(angle, center)),
            Form::TimeLimited(f) => Form::TimeLimited(f.rotated(angle, center)),
            Form::Periodic(f) => Form::Periodic(f.rotated(angle, center)),
        }
    }

    /// Surface of the first leaf form
    pub fn surface(&self) -> &Arc<Surface> {
        match self {
            Form::Line(f) => f.surface(),
            Form::Circle(f) => f.surface(),
            Form::Polygon(f) => f.surface(),
            Form::Rotate(f) => f.inner().surface(),
            Form::Translate(f) => f.inner().surface(),
            Form::TimeShift(f) => f.inner().surface(),
            Form::TimeLimited(f) => f.start_form().surface(),
            Form::Periodic(f) => f.first_form().surface(),
        }
    }

    pub fn material(&self) -> Material {
        self.surface().material
    }

    pub fn name(&self) -> &str {
        &self.surface().name
    }
}

/// Earliest hit over a leaf form's paths
fn collide_paths(paths: &[Path], probe: &Probe, ctx: &SimContext) -> Option<Collision> {
    paths
        .iter()
        .filter_map(|path| {
            path.find_collision(probe, ctx.root_epsilon)
                .map(|time| (time, path))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(time, path)| Collision::Simple {
            time,
            probe: probe.clone(),
            path: path.clone(),
        })
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    pub fn surface(name: &str) -> Arc<Surface> {
        Arc::new(Surface::new(Material::ELASTIC).with_name(name))
    }

    /// Ball at `pos` moving with `vel`, no acceleration, time origin `start_t`
    pub fn moving(pos: Point, vel: Point, start_t: f64) -> Ball {
        Ball::new(pos, vel, Point::ZERO, start_t)
    }
}
