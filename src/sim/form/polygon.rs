use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use crate::math::{Interval, Point, Polynom, Trajectory};
use crate::normalize_angle;
use crate::sim::arc::ArcPath;
use crate::sim::ball::Probe;
use crate::sim::line::LinePath;
use crate::sim::path::{CollDirection, Path, Surface, all_crossings};

/// Probe point distance from an edge midpoint, relative to the edge length
const NORMAL_PROBE_FACTOR: f64 = 1e-3;

/// Turns flatter than this are neither capped nor mitred
const STRAIGHT_EPSILON: f64 = 1e-12;

/// How consecutive offset edges meet at a vertex
#[derive(Debug, Clone, Copy)]
enum Joint {
    /// Convex corner: round cap around the vertex
    Cap,
    /// Concave corner: both edges end at their intersection
    Mitre(Point),
    /// Collinear edges
    Straight,
}

/// A closed polygon.
///
/// Edge normals always point out of the polygon. The collidable paths are the
/// edges pushed out (or in, for collisions from inside) by the ball radius,
/// with round caps on convex corners and mitred joints on concave ones.
#[derive(Debug, Clone)]
pub struct PolygonForm {
    points: Vec<Point>,
    edge_normals: Vec<Point>,
    ball_radius: f64,
    self_direction: CollDirection,
    line_direction: CollDirection,
    surface: Arc<Surface>,
    paths: Vec<Path>,
}

impl PolygonForm {
    /// `self_direction` picks the offset side(s): outside, inside or both.
    /// `line_direction` is the gate put on every generated path.
    pub fn new(
        points: Vec<Point>,
        ball_radius: f64,
        self_direction: CollDirection,
        line_direction: CollDirection,
        surface: Arc<Surface>,
    ) -> Self {
        let edge_normals = find_edge_normals(&points, &surface);
        let mut form = Self {
            points,
            edge_normals,
            ball_radius,
            self_direction,
            line_direction,
            surface,
            paths: Vec::new(),
        };
        if form.points.len() >= 3 {
            form.paths = match self_direction {
                CollDirection::FromOutside => form.make_paths(1.0),
                CollDirection::FromInside => form.make_paths(-1.0),
                CollDirection::AllowAll => {
                    let mut paths = form.make_paths(1.0);
                    paths.extend(form.make_paths(-1.0));
                    paths
                }
            };
        }
        form
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn edge_normals(&self) -> &[Point] {
        &self.edge_normals
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn surface(&self) -> &Arc<Surface> {
        &self.surface
    }

    fn make_paths(&self, factor: f64) -> Vec<Path> {
        let n = self.points.len();
        let r = self.ball_radius;
        let normal = |i: usize| self.edge_normals[i % n].scale(factor);
        let point = |i: usize| self.points[i % n];

        // joints[i] sits at points[i + 1], between edge i and edge i + 1
        let joints: Vec<Joint> = (0..n)
            .map(|i| {
                let n_cur = normal(i);
                let n_next = normal(i + 1);
                let d_next = (point(i + 2) - point(i + 1)).normalize();
                let turn = d_next.dot(&n_cur);
                if turn < -STRAIGHT_EPSILON {
                    Joint::Cap
                } else if turn > STRAIGHT_EPSILON {
                    let a = point(i) + n_cur.scale(r);
                    let b = point(i + 1) + n_cur.scale(r);
                    let c = point(i + 1) + n_next.scale(r);
                    let d = point(i + 2) + n_next.scale(r);
                    line_intersection(a, b, c, d).map_or(Joint::Straight, Joint::Mitre)
                } else {
                    Joint::Straight
                }
            })
            .collect();

        let mut paths = Vec::with_capacity(2 * n);
        for i in 0..n {
            let n_cur = normal(i);
            let start = match joints[(i + n - 1) % n] {
                Joint::Mitre(q) => q,
                _ => point(i) + n_cur.scale(r),
            };
            let end = match joints[i] {
                Joint::Mitre(q) => q,
                _ => point(i + 1) + n_cur.scale(r),
            };
            paths.push(LinePath::new(start, end, n_cur, self.line_direction, Arc::clone(&self.surface)).into());

            if let Joint::Cap = joints[i] {
                let (a, b) = short_way(n_cur.angle(), normal(i + 1).angle());
                paths.push(
                    ArcPath::new(point(i + 1), r, a, b, self.line_direction, Arc::clone(&self.surface)).into(),
                );
            }
        }
        paths
    }

    /// Whether `pos` lies inside the polygon or within the ball radius of it
    pub fn covers(&self, pos: Point) -> bool {
        contains_point(&self.points, pos)
            || edges(&self.points).any(|(a, b)| segment_distance(pos, a, b) <= self.ball_radius)
    }

    /// Absolute time intervals during which the probe's centre is within the
    /// outer offset of this polygon, searched after `eps` and up to the probe's
    /// horizon. An interval still open at the end runs to the horizon.
    pub fn times_inside(&self, probe: &Probe, eps: f64) -> Vec<Interval> {
        let range = probe.search_range(eps);
        let crossings = all_crossings(&self.paths, &probe.bahn, range);
        let mut inside = match crossings.first() {
            Some(first) => !first.entering,
            None => self.covers(probe.pos(probe.start_t)),
        };
        let mut entered = probe.start_t;
        let mut intervals = Vec::new();
        for crossing in crossings {
            let t = crossing.t + probe.start_t;
            match (inside, crossing.entering) {
                (false, true) => {
                    entered = t;
                    inside = true;
                }
                (true, false) => {
                    intervals.push(Interval::closed(entered, t));
                    inside = false;
                }
                _ => {}
            }
        }
        if inside {
            intervals.push(Interval::closed(entered, probe.horizon));
        }
        intervals
    }

    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self::new(
            self.points.iter().map(|p| p.rotate(angle, center)).collect(),
            self.ball_radius,
            self.self_direction,
            self.line_direction,
            Arc::clone(&self.surface),
        )
    }
}

fn edges(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    (0..points.len()).map(move |i| (points[i], points[(i + 1) % points.len()]))
}

/// Outward normals by ray casting.
///
/// From a point just off each edge's midpoint along the candidate normal, a
/// ray along that normal crosses the boundary an odd number of times iff the
/// point is inside, in which case the normal is flipped.
fn find_edge_normals(points: &[Point], surface: &Arc<Surface>) -> Vec<Point> {
    let edge_paths: Vec<Path> = edges(points)
        .map(|(a, b)| LinePath::new(a, b, Point::ZERO, CollDirection::AllowAll, Arc::clone(surface)).into())
        .collect();
    edges(points)
        .map(|(a, b)| {
            let edge = b - a;
            let normal = edge.normalize().orthogonal();
            let probe_pt = (a + b).scale(0.5) + normal.scale(NORMAL_PROBE_FACTOR * edge.magnitude());
            let ray = Trajectory::new(
                Polynom::new(vec![probe_pt.x, normal.x]),
                Polynom::new(vec![probe_pt.y, normal.y]),
            );
            let mut hits: Vec<f64> = edge_paths
                .iter()
                .flat_map(|p| p.collision_times(&ray, Interval::open(0.0, f64::INFINITY)))
                .collect();
            hits.sort_by(f64::total_cmp);
            hits.dedup_by(|x, y| (*x - *y).abs() <= crate::consts::CROSSING_MERGE_EPSILON);
            if hits.len() % 2 == 1 { -normal } else { normal }
        })
        .collect()
}

/// Window from angle `a` to angle `b`, going the shorter way round
fn short_way(a: f64, b: f64) -> (f64, f64) {
    if normalize_angle(b - a) <= PI { (a, b) } else { (b, a) }
}

/// Intersection of the infinite lines through `a`-`b` and `c`-`d`
fn line_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<Point> {
    let r = b - a;
    let s = d - c;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let w = c - a;
    let u = (w.x * s.y - w.y * s.x) / denom;
    Some(a + r.scale(u))
}

/// Even-odd point-in-polygon test
fn contains_point(points: &[Point], pos: Point) -> bool {
    edges(points).fold(false, |inside, (a, b)| {
        if (a.y > pos.y) != (b.y > pos.y) {
            let x = a.x + (pos.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if pos.x < x {
                return !inside;
            }
        }
        inside
    })
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(&ab);
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab.scale(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ball::Ball;
    use crate::sim::context::SimContext;
    use crate::sim::form::Form;
    use crate::sim::form::test_util::{moving, surface};
    use proptest::prelude::*;

    fn square(ccw: bool) -> Vec<Point> {
        let mut pts = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        if !ccw {
            pts.reverse();
        }
        pts
    }

    fn centroid(points: &[Point]) -> Point {
        points.iter().fold(Point::ZERO, |acc, p| acc + *p).scale(1.0 / points.len() as f64)
    }

    fn outward(points: &[Point], normals: &[Point]) -> bool {
        let c = centroid(points);
        edges(points)
            .zip(normals)
            .all(|((a, b), n)| ((a + b).scale(0.5) - c).dot(n) > 0.0)
    }

    fn polygon(points: Vec<Point>, self_direction: CollDirection) -> PolygonForm {
        PolygonForm::new(points, 10.0, self_direction, CollDirection::FromOutside, surface("poly"))
    }

    fn outline(points: Vec<Point>) -> PolygonForm {
        PolygonForm::new(points, 10.0, CollDirection::FromOutside, CollDirection::AllowAll, surface("outline"))
    }

    #[test]
    fn test_normals_both_windings() {
        for ccw in [true, false] {
            let p = polygon(square(ccw), CollDirection::FromOutside);
            assert!(outward(p.points(), p.edge_normals()), "ccw={ccw}");
        }
    }

    #[test]
    fn test_outer_offset_has_caps() {
        let p = polygon(square(true), CollDirection::FromOutside);
        // 4 edges + 4 corner caps
        assert_eq!(p.paths().len(), 8);
        let inner = polygon(square(true), CollDirection::FromInside);
        // 4 mitred edges
        assert_eq!(inner.paths().len(), 4);
        let both = polygon(square(false), CollDirection::AllowAll);
        assert_eq!(both.paths().len(), 12);
    }

    #[test]
    fn test_hit_from_outside() {
        let form = Form::Polygon(polygon(square(false), CollDirection::FromOutside));
        let ball = moving(Point::new(50.0, 200.0), Point::new(0.0, -10.0), 0.0);
        let c = form.find_collision(&ball, &SimContext::default()).unwrap();
        assert!((c.coll_t() - 9.0).abs() < 1e-9);
        assert!(c.result_dir().distance(Point::new(0.0, 10.0)) < 1e-9);
    }

    #[test]
    fn test_corner_cap_hit() {
        let form = Form::Polygon(polygon(square(true), CollDirection::FromOutside));
        // diagonal approach towards the (100, 100) corner
        let ball = moving(Point::new(200.0, 200.0), Point::new(-10.0, -10.0), 0.0);
        let c = form.find_collision(&ball, &SimContext::default()).unwrap();
        let expected = (100.0 * 2f64.sqrt() - 10.0) / (10.0 * 2f64.sqrt());
        assert!((c.coll_t() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_hit_from_inside_mitred() {
        let form = Form::Polygon(polygon(square(true), CollDirection::FromInside));
        let ball = moving(Point::new(50.0, 50.0), Point::new(10.0, 0.0), 0.0);
        let c = form.find_collision(&ball, &SimContext::default()).unwrap();
        assert!((c.coll_t() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_concave_polygon_normals() {
        // L shape
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            Point::new(200.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 200.0),
            Point::new(0.0, 200.0),
        ];
        let p = polygon(pts, CollDirection::FromOutside);
        let expected = [
            Point::new(0.0, -1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.0),
        ];
        for (n, e) in p.edge_normals().iter().zip(expected) {
            assert!(n.distance(e) < 1e-12, "{n:?} vs {e:?}");
        }
        // 5 convex corners capped, the inner corner mitred
        assert_eq!(p.paths().len(), 11);
    }

    #[test]
    fn test_times_inside() {
        let p = outline(square(true));
        let ball = Ball::new(Point::new(-100.0, 50.0), Point::new(10.0, 0.0), Point::ZERO, 1.0);
        let intervals = p.times_inside(&ball.probe(), 1e-6);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].min - 10.0).abs() < 1e-9);
        assert!((intervals[0].max - 22.0).abs() < 1e-9);

        // starting inside: the interval opens at the probe start
        let inside = Ball::new(Point::new(50.0, 50.0), Point::new(10.0, 0.0), Point::ZERO, 1.0);
        let intervals = p.times_inside(&inside.probe(), 1e-6);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].min, 1.0);
        assert!((intervals[0].max - 7.0).abs() < 1e-9);

        // resting inside forever
        let parked = Ball::at(Point::new(50.0, 50.0));
        let intervals = p.times_inside(&parked.probe(), 1e-6);
        assert_eq!(intervals.len(), 1);
        assert!(intervals[0].max.is_infinite());
    }

    #[test]
    fn test_degenerate_polygon_has_no_paths() {
        let p = polygon(vec![Point::ZERO, Point::new(1.0, 0.0)], CollDirection::FromOutside);
        assert!(p.paths().is_empty());
    }

    proptest! {
        #[test]
        fn prop_regular_polygon_normals_point_out(
            sides in 3usize..12,
            radius in 10.0f64..500.0,
            phase in 0.0f64..TAU,
            ccw in any::<bool>(),
        ) {
            let mut pts: Vec<Point> = (0..sides)
                .map(|i| crate::polar_to_cartesian(radius, phase + TAU * i as f64 / sides as f64))
                .collect();
            if !ccw {
                pts.reverse();
            }
            let normals = find_edge_normals(&pts, &surface("p"));
            prop_assert!(outward(&pts, &normals));
        }
    }
}
