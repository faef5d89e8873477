use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::math::Point;
use crate::sim::arc::ArcPath;
use crate::sim::line::LinePath;
use crate::sim::path::{CollDirection, Path, Surface};

/// A straight segment: two offset edges plus a half-circle cap on each end
#[derive(Debug, Clone)]
pub struct LineForm {
    pos1: Point,
    pos2: Point,
    ball_radius: f64,
    surface: Arc<Surface>,
    paths: Vec<Path>,
}

impl LineForm {
    pub fn new(pos1: Point, pos2: Point, ball_radius: f64, surface: Arc<Surface>) -> Self {
        let dir = (pos2 - pos1).normalize();
        let paths = if dir == Point::ZERO {
            // coincident endpoints: a round post
            vec![ArcPath::full(pos1, ball_radius, CollDirection::FromOutside, Arc::clone(&surface)).into()]
        } else {
            let normal = dir.orthogonal();
            let offset = normal.scale(ball_radius);
            let angle = dir.angle();
            vec![
                LinePath::new(
                    pos1 + offset,
                    pos2 + offset,
                    normal,
                    CollDirection::FromOutside,
                    Arc::clone(&surface),
                )
                .into(),
                LinePath::new(
                    pos1 - offset,
                    pos2 - offset,
                    -normal,
                    CollDirection::FromOutside,
                    Arc::clone(&surface),
                )
                .into(),
                ArcPath::new(
                    pos1,
                    ball_radius,
                    angle + FRAC_PI_2,
                    angle - FRAC_PI_2,
                    CollDirection::FromOutside,
                    Arc::clone(&surface),
                )
                .into(),
                ArcPath::new(
                    pos2,
                    ball_radius,
                    angle - FRAC_PI_2,
                    angle + FRAC_PI_2,
                    CollDirection::FromOutside,
                    Arc::clone(&surface),
                )
                .into(),
            ]
        };
        Self {
            pos1,
            pos2,
            ball_radius,
            surface,
            paths,
        }
    }

    pub fn pos1(&self) -> Point {
        self.pos1
    }

    pub fn pos2(&self) -> Point {
        self.pos2
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn surface(&self) -> &Arc<Surface> {
        &self.surface
    }

    pub fn points(&self) -> Vec<Point> {
        vec![self.pos1, self.pos2]
    }

    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        Self::new(
            self.pos1.rotate(angle, center),
            self.pos2.rotate(angle, center),
            self.ball_radius,
            Arc::clone(&self.surface),
        )
    }
}
