//! Planar vectors over numbers or polynomials
//!
//! `Vector<f64>` is a point or direction; `Vector<Polynom>` is a position as a
//! function of time (a trajectory). Operations that only make sense for one of
//! the two live in separate impl blocks, so calling e.g. `apply` on a plain
//! point is a compile error rather than a runtime check.

use std::ops::{Add, Mul, Neg, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::polynom::Polynom;
use super::taylor::TaylorSeries;
use crate::normalize_angle;

/// Coordinate type of a [`Vector`]
pub trait Scalar:
    Clone
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<Output = Self>
    + Mul<f64, Output = Self>
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
{
}

impl Scalar for f64 {}
impl Scalar for Polynom {}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector<T> {
    pub x: T,
    pub y: T,
}

/// A position or direction
pub type Point = Vector<f64>;

/// Position as a polynomial function of time
pub type Trajectory = Vector<Polynom>;

impl<T: Scalar> Vector<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x.clone() * factor, self.y.clone() * factor)
    }

    pub fn dot(&self, other: &Self) -> T {
        self.x.clone() * other.x.clone() + self.y.clone() * other.y.clone()
    }

    /// Rotate by `angle` around `center`.
    ///
    /// `(x, y) -> (x cos a + y sin a, -x sin a + y cos a)`, i.e. clockwise for
    /// positive angles in a y-up frame.
    pub fn rotate(&self, angle: f64, center: Point) -> Self {
        let (sin, cos) = angle.sin_cos();
        let dx = self.x.clone() - center.x;
        let dy = self.y.clone() - center.y;
        Self::new(
            dx.clone() * cos + dy.clone() * sin + center.x,
            dy * cos - dx * sin + center.y,
        )
    }

    /// Shift by a fixed point
    pub fn offset(&self, by: Point) -> Self {
        Self::new(self.x.clone() + by.x, self.y.clone() + by.y)
    }
}

impl<T: Scalar> Add for Vector<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Scalar> Sub for Vector<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl<T: Scalar> Neg for Vector<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl<T: Scalar> Mul<f64> for Vector<T> {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        self.scale(factor)
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for DVec2 {
    fn from(v: Point) -> Self {
        DVec2::new(v.x, v.y)
    }
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Unit vector at `angle` radians
    pub fn from_angle(angle: f64) -> Self {
        DVec2::from_angle(angle).into()
    }

    pub fn magnitude(&self) -> f64 {
        DVec2::from(*self).length()
    }

    /// Unit vector in the same direction; the zero vector stays zero
    pub fn normalize(&self) -> Self {
        DVec2::from(*self).normalize_or_zero().into()
    }

    /// Direction angle in `[0, 2π)`
    pub fn angle(&self) -> f64 {
        normalize_angle(self.y.atan2(self.x))
    }

    /// Counter-clockwise perpendicular
    pub fn orthogonal(&self) -> Self {
        DVec2::from(*self).perp().into()
    }

    /// Component of `self` along `onto`
    pub fn project(&self, onto: Point) -> Self {
        let onto = DVec2::from(onto);
        if onto.length_squared() == 0.0 {
            return Point::ZERO;
        }
        DVec2::from(*self).project_onto(onto).into()
    }

    /// Split into `(along normal, along surface)`
    pub fn decompose(&self, normal: Point) -> (Point, Point) {
        let along = self.project(normal);
        (along, *self - along)
    }

    pub fn distance(&self, other: Point) -> f64 {
        DVec2::from(*self).distance(other.into())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Constant trajectory sitting at this point
    pub fn to_trajectory(&self) -> Trajectory {
        Trajectory::new(Polynom::constant(self.x), Polynom::constant(self.y))
    }
}

impl Trajectory {
    /// Position at time `t`
    pub fn apply(&self, t: f64) -> Point {
        Point::new(self.x.eval(t), self.y.eval(t))
    }

    /// Velocity trajectory
    pub fn deriv(&self) -> Trajectory {
        Trajectory::new(self.x.deriv(), self.y.deriv())
    }

    /// Substitute `inner` for the time variable in both coordinates
    pub fn compose(&self, inner: &Polynom) -> Trajectory {
        Trajectory::new(self.x.compose(inner), self.y.compose(inner))
    }

    /// The same motion with `t = 0` moved to `t = offset`
    pub fn shifted(&self, offset: f64) -> Trajectory {
        self.compose(&Polynom::shift(offset))
    }

    pub fn reduce(&self) -> Trajectory {
        Trajectory::new(self.x.reduce(), self.y.reduce())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared distance to `center` as a polynomial in time
    pub fn distance_sq(&self, center: Point) -> Polynom {
        let d = self.offset(-center);
        d.dot(&d)
    }

    /// Rotate by a time-varying angle around `center`.
    ///
    /// sin/cos of the angle polynomial are replaced by their truncated series,
    /// so the result is accurate while `|angle(t)|` stays inside
    /// `series.window()`.
    pub fn rotate_poly(&self, angle: &Polynom, center: Point, series: &TaylorSeries) -> Trajectory {
        let sin = series.sin().compose(angle);
        let cos = series.cos().compose(angle);
        let dx = &self.x - center.x;
        let dy = &self.y - center.y;
        Trajectory::new(
            &(&(&dx * &cos) + &(&dy * &sin)) + center.x,
            &(&(&dy * &cos) - &(&dx * &sin)) + center.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn test_rotate_is_clockwise() {
        let p = Point::new(1.0, 0.0);
        assert!(close(p.rotate(FRAC_PI_2, Point::ZERO), Point::new(0.0, -1.0)));
        let around = Point::new(2.0, 0.0).rotate(PI, Point::new(1.0, 0.0));
        assert!(close(around, Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_angle_range() {
        assert!((Point::new(0.0, -1.0).angle() - 1.5 * PI).abs() < 1e-12);
        assert!(Point::new(1.0, 0.0).angle().abs() < 1e-12);
        assert!(close(Point::from_angle(FRAC_PI_2), Point::new(0.0, 1.0)));
    }

    #[test]
    fn test_decompose() {
        let v = Point::new(3.0, -4.0);
        let (ort, par) = v.decompose(Point::new(0.0, 2.0));
        assert!(close(ort, Point::new(0.0, -4.0)));
        assert!(close(par, Point::new(3.0, 0.0)));
        assert!(close(ort + par, v));
    }

    #[test]
    fn test_normalize_zero() {
        assert_eq!(Point::ZERO.normalize(), Point::ZERO);
        assert!((Point::new(3.0, 4.0).normalize().magnitude() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_trajectory_apply_and_deriv() {
        let bahn = Trajectory::new(Polynom::new(vec![1.0, 2.0]), Polynom::new(vec![0.0, 0.0, -5.0]));
        assert!(close(bahn.apply(2.0), Point::new(5.0, -20.0)));
        assert!(close(bahn.deriv().apply(2.0), Point::new(2.0, -20.0)));
        assert!(close(bahn.shifted(1.0).apply(1.0), bahn.apply(2.0)));
    }

    #[test]
    fn test_rotate_poly_matches_exact_rotation() {
        let series = TaylorSeries::new(10, 1e-6);
        let bahn = Trajectory::new(Polynom::new(vec![10.0, 1.0]), Polynom::new(vec![-3.0, 0.5]));
        // angle(t) = 0.3 t
        let angle = Polynom::new(vec![0.0, 0.3]);
        let center = Point::new(1.0, 2.0);
        let rotated = bahn.rotate_poly(&angle, center, &series);
        for t in [0.0, 0.5, 1.0, 2.0] {
            let exact = bahn.apply(t).rotate(0.3 * t, center);
            assert!(rotated.apply(t).distance(exact) < 1e-3, "t={t}");
        }
    }

    #[test]
    fn test_generic_rotate_on_trajectory() {
        let bahn = Trajectory::new(Polynom::new(vec![1.0, 1.0]), Polynom::zero());
        let rotated = bahn.rotate(FRAC_PI_2, Point::ZERO);
        assert!(close(rotated.apply(1.0), Point::new(0.0, -2.0)));
    }
}
