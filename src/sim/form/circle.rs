use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use crate::math::Point;
use crate::sim::arc::ArcPath;
use crate::sim::path::{CollDirection, Path, Surface};
use crate::{normalize_angle, polar_to_cartesian};

/// Outline points per full turn returned by [`CircleForm::points`]
const RESOLUTION: usize = 64;

/// Windows this close to a full turn are closed circles
const CLOSED_EPSILON: f64 = 1e-3;

/// A circle or circular arc of a given radius.
///
/// A closed circle is a single outer path. An open arc also gets an inner path
/// and a round cap at each end.
#[derive(Debug, Clone)]
pub struct CircleForm {
    center: Point,
    radius: f64,
    min_angle: f64,
    max_angle: f64,
    ball_radius: f64,
    surface: Arc<Surface>,
    paths: Vec<Path>,
}

impl CircleForm {
    pub fn closed(center: Point, radius: f64, ball_radius: f64, surface: Arc<Surface>) -> Self {
        Self::new(center, radius, 0.0, TAU, ball_radius, surface)
    }

    /// Arc from `min_angle` counter-clockwise to `max_angle` (radians)
    pub fn new(
        center: Point,
        radius: f64,
        min_angle: f64,
        max_angle: f64,
        ball_radius: f64,
        surface: Arc<Surface>,
    ) -> Self {
        let span = normalize_angle(max_angle - min_angle);
        let closed = span < CLOSED_EPSILON || span > TAU - CLOSED_EPSILON;
        let mut paths: Vec<Path> = Vec::new();
        if closed {
            paths.push(
                ArcPath::full(center, radius + ball_radius, CollDirection::FromOutside, Arc::clone(&surface)).into(),
            );
        } else {
            paths.push(
                ArcPath::new(
                    center,
                    radius + ball_radius,
                    min_angle,
                    max_angle,
                    CollDirection::FromOutside,
                    Arc::clone(&surface),
                )
                .into(),
            );
            if radius > ball_radius {
                paths.push(
                    ArcPath::new(
                        center,
                        radius - ball_radius,
                        min_angle,
                        max_angle,
                        CollDirection::FromInside,
                        Arc::clone(&surface),
                    )
                    .into(),
                );
            }
            paths.push(
                ArcPath::new(
                    center + polar_to_cartesian(radius, min_angle),
                    ball_radius,
                    min_angle - PI,
                    min_angle,
                    CollDirection::FromOutside,
                    Arc::clone(&surface),
                )
                .into(),
            );
            paths.push(
                ArcPath::new(
                    center + polar_to_cartesian(radius, max_angle),
                    ball_radius,
                    max_angle,
                    max_angle + PI,
                    CollDirection::FromOutside,
                    Arc::clone(&surface),
                )
                .into(),
            );
        }
        let max_angle = if closed { min_angle + TAU } else { min_angle + span };
        Self {
            center,
            radius,
            min_angle,
            max_angle,
            ball_radius,
            surface,
            paths,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_closed(&self) -> bool {
        self.max_angle - self.min_angle >= TAU - CLOSED_EPSILON
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn surface(&self) -> &Arc<Surface> {
        &self.surface
    }

    /// Points along the arc
    pub fn points(&self) -> Vec<Point> {
        let span = self.max_angle - self.min_angle;
        let n = ((RESOLUTION as f64 * span / TAU).ceil() as usize).max(2);
        (0..=n)
            .map(|i| {
                let theta = self.min_angle + span * i as f64 / n as f64;
                self.center + polar_to_cartesian(self.radius, theta)
            })
            .collect()
    }

    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self::new(
            self.center.rotate(angle, center),
            self.radius,
            self.min_angle - angle,
            self.max_angle - angle,
            self.ball_radius,
            Arc::clone(&self.surface),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::context::SimContext;
    use crate::sim::form::Form;
    use crate::sim::form::test_util::{moving, surface};

    #[test]
    fn test_closed_circle_single_path() {
        let c = CircleForm::closed(Point::ZERO, 50.0, 10.0, surface("bumper"));
        assert!(c.is_closed());
        assert_eq!(c.paths().len(), 1);

        let ball = moving(Point::new(-100.0, 0.0), Point::new(10.0, 0.0), 0.0);
        let hit = Form::Circle(c).find_collision(&ball, &SimContext::default()).unwrap();
        assert!((hit.coll_t() - 4.0).abs() < 1e-9);
        assert!(hit.result_dir().distance(Point::new(-10.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_open_arc_paths() {
        let c = CircleForm::new(Point::ZERO, 100.0, 0.0, PI, 10.0, surface("dome"));
        assert!(!c.is_closed());
        assert_eq!(c.paths().len(), 4);
    }

    #[test]
    fn test_inside_of_dome() {
        // upper half circle; a ball rising from the centre hits the inner path
        let c = Form::Circle(CircleForm::new(Point::ZERO, 100.0, 0.0, PI, 10.0, surface("dome")));
        let ball = moving(Point::ZERO, Point::new(0.0, 10.0), 0.0);
        let hit = c.find_collision(&ball, &SimContext::default()).unwrap();
        assert!((hit.coll_t() - 9.0).abs() < 1e-9);

        // going down misses the open half
        let ball = moving(Point::ZERO, Point::new(0.0, -10.0), 0.0);
        assert!(c.find_collision(&ball, &SimContext::default()).is_none());
    }

    #[test]
    fn test_end_cap_hit() {
        // right end of the dome sits at (100, 0); come up from below
        let c = Form::Circle(CircleForm::new(Point::ZERO, 100.0, 0.0, PI, 10.0, surface("dome")));
        let ball = moving(Point::new(100.0, -50.0), Point::new(0.0, 10.0), 0.0);
        let hit = c.find_collision(&ball, &SimContext::default()).unwrap();
        assert!((hit.coll_t() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_points_on_circle() {
        let c = CircleForm::new(Point::new(5.0, 5.0), 20.0, 0.0, PI / 2.0, 10.0, surface("quarter"));
        let pts = c.points();
        assert!(pts.iter().all(|p| (p.distance(Point::new(5.0, 5.0)) - 20.0).abs() < 1e-9));
        assert!(pts.last().unwrap().distance(Point::new(5.0, 25.0)) < 1e-9);
    }
}
