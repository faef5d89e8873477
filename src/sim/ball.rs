//! Balls and probes
//!
//! A [`Ball`] is an immutable snapshot: origin, velocity and acceleration at its
//! own time origin `start_t`. Its trajectory (`bahn`) is a polynomial in the time
//! elapsed since `start_t`. Every `with_*` copy recomputes the trajectory.

use std::sync::Arc;

use crate::math::{Interval, Point, Polynom, Trajectory};

use super::form::{CircleForm, Form, TranslateForm};
use super::material::Material;
use super::path::Surface;

#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pos_0: Point,
    vel_0: Point,
    acc: Point,
    start_t: f64,
    bahn: Trajectory,
}

impl Ball {
    pub fn new(pos_0: Point, vel_0: Point, acc: Point, start_t: f64) -> Self {
        let bahn = Trajectory::new(
            Polynom::new(vec![pos_0.x, vel_0.x, acc.x * 0.5]),
            Polynom::new(vec![pos_0.y, vel_0.y, acc.y * 0.5]),
        );
        Self {
            pos_0,
            vel_0,
            acc,
            start_t,
            bahn,
        }
    }

    /// A ball at rest at `pos`, time origin 0
    pub fn at(pos: Point) -> Self {
        Self::new(pos, Point::ZERO, Point::ZERO, 0.0)
    }

    pub fn with_start_pos(&self, pos_0: Point) -> Self {
        Self::new(pos_0, self.vel_0, self.acc, self.start_t)
    }

    pub fn with_vel(&self, vel_0: Point) -> Self {
        Self::new(self.pos_0, vel_0, self.acc, self.start_t)
    }

    pub fn with_acc(&self, acc: Point) -> Self {
        Self::new(self.pos_0, self.vel_0, acc, self.start_t)
    }

    pub fn with_start_t(&self, start_t: f64) -> Self {
        Self::new(self.pos_0, self.vel_0, self.acc, start_t)
    }

    /// The same motion with its time origin moved to `t`
    pub fn from_time(&self, t: f64) -> Self {
        Self::new(self.pos(t), self.vel(t), self.acc, t)
    }

    pub fn pos_0(&self) -> Point {
        self.pos_0
    }

    pub fn vel_0(&self) -> Point {
        self.vel_0
    }

    pub fn acc(&self) -> Point {
        self.acc
    }

    pub fn start_t(&self) -> f64 {
        self.start_t
    }

    pub fn bahn(&self) -> &Trajectory {
        &self.bahn
    }

    /// Position at absolute time `t`
    pub fn pos(&self, t: f64) -> Point {
        self.bahn.apply(t - self.start_t)
    }

    /// Velocity at absolute time `t`
    pub fn vel(&self, t: f64) -> Point {
        self.vel_0 + self.acc.scale(t - self.start_t)
    }

    pub fn probe(&self) -> Probe {
        Probe::new(self.bahn.clone(), self.start_t)
    }

    /// This ball as an obstacle for other balls.
    ///
    /// A circle of radius `ball_radius` offset by another `ball_radius`, moving
    /// along this ball's trajectory expressed in absolute time.
    pub fn as_form(&self, ball_radius: f64, surface: Arc<Surface>) -> Form {
        let circle = CircleForm::closed(Point::ZERO, ball_radius, ball_radius, surface);
        let transform = self.bahn.shifted(-self.start_t);
        Form::Translate(TranslateForm::new(Form::Circle(circle), transform))
    }
}

/// Surface shared by every ball-as-obstacle form
pub fn ball_surface() -> Arc<Surface> {
    Arc::new(Surface::new(Material::BALL).with_name("ball"))
}

/// A trajectory plus the absolute time its parameter is measured from.
///
/// Wrapper forms hand transformed probes to their inner forms; a probe may
/// carry any polynomial, not just the quadratic of a [`Ball`]. `horizon` is the
/// last absolute time the trajectory is trusted; hits after it are not searched.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub bahn: Trajectory,
    pub start_t: f64,
    pub horizon: f64,
}

impl Probe {
    pub fn new(bahn: Trajectory, start_t: f64) -> Self {
        Self {
            bahn,
            start_t,
            horizon: f64::INFINITY,
        }
    }

    /// Position at absolute time `t`
    pub fn pos(&self, t: f64) -> Point {
        self.bahn.apply(t - self.start_t)
    }

    /// Velocity at absolute time `t`
    pub fn vel(&self, t: f64) -> Point {
        self.bahn.deriv().apply(t - self.start_t)
    }

    /// Same motion with the parameter origin moved to absolute time `t`
    pub fn rebased(&self, t: f64) -> Probe {
        Probe {
            bahn: self.bahn.shifted(t - self.start_t),
            start_t: t,
            horizon: self.horizon,
        }
    }

    /// Same motion read on a clock running `offset` behind absolute time
    pub fn on_clock(&self, offset: f64) -> Probe {
        Probe {
            bahn: self.bahn.clone(),
            start_t: self.start_t - offset,
            horizon: self.horizon - offset,
        }
    }

    /// Another trajectory on the same clock and horizon
    pub fn with_bahn(&self, bahn: Trajectory) -> Probe {
        Probe { bahn, ..*self }
    }

    /// Copy whose horizon is at most `t`
    pub fn until(&self, t: f64) -> Probe {
        Probe {
            horizon: self.horizon.min(t),
            ..self.clone()
        }
    }

    /// Trajectory-time range to search: after `eps`, up to the horizon
    pub fn search_range(&self, eps: f64) -> Interval {
        Interval::future(eps).restrict_max(self.horizon - self.start_t)
    }
}
