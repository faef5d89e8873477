//! Collision paths
//!
//! A path is an atomic collidable curve, already offset by the ball radius, so
//! "ball touches obstacle" becomes "ball centre crosses path". Forms are built
//! from paths; every path of a leaf form shares that form's [`Surface`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::math::{Interval, Point, RootQuery, Trajectory};

use super::arc::ArcPath;
use super::ball::Probe;
use super::line::LinePath;
use super::material::Material;

/// Which side a path may be hit from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollDirection {
    #[serde(rename = "ALLOW_ALL", alias = "AllowAll")]
    AllowAll,
    #[serde(rename = "ALLOW_FROM_INSIDE", alias = "FromInside")]
    FromInside,
    #[default]
    #[serde(rename = "ALLOW_FROM_OUTSIDE", alias = "FromOutside")]
    FromOutside,
}

impl CollDirection {
    /// Gate on `outward_normal · velocity` at the impact point
    pub fn admits(&self, approach: f64) -> bool {
        match self {
            CollDirection::AllowAll => true,
            CollDirection::FromInside => approach > 0.0,
            CollDirection::FromOutside => approach < 0.0,
        }
    }
}

/// Per-form data every path of a leaf form points back to
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub name: String,
    pub material: Material,
    /// Hook names run when a ball hits this surface
    pub on_collision: Vec<String>,
    /// `false` lets balls pass through (hooks still run)
    pub do_reflect: bool,
}

impl Surface {
    pub fn new(material: Material) -> Self {
        Self {
            name: String::new(),
            material,
            on_collision: Vec::new(),
            do_reflect: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_hooks(mut self, hooks: Vec<String>) -> Self {
        self.on_collision = hooks;
        self
    }

    pub fn with_reflect(mut self, do_reflect: bool) -> Self {
        self.do_reflect = do_reflect;
        self
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(Material::default())
    }
}

#[derive(Debug, Clone)]
pub enum Path {
    Arc(ArcPath),
    Line(LinePath),
}

impl Path {
    pub fn surface(&self) -> &Arc<Surface> {
        match self {
            Path::Arc(arc) => &arc.surface,
            Path::Line(line) => &line.surface,
        }
    }

    fn roots(&self, bahn: &Trajectory, query: &RootQuery) -> Vec<f64> {
        match self {
            Path::Arc(arc) => arc.roots(bahn, query),
            Path::Line(line) => line.roots(bahn, query),
        }
    }

    /// Earliest absolute time the probe hits this path, strictly after
    /// `probe.start_t + eps` and no later than its horizon
    pub fn find_collision(&self, probe: &Probe, eps: f64) -> Option<f64> {
        self.roots(&probe.bahn, &RootQuery::earliest(probe.search_range(eps)))
            .first()
            .map(|s| s + probe.start_t)
    }

    /// Every valid hit inside `range`, in trajectory time, ascending
    pub fn collision_times(&self, bahn: &Trajectory, range: Interval) -> Vec<f64> {
        self.roots(bahn, &RootQuery::all(range))
    }

    /// Unit normal at a point on the path
    pub fn normal_at(&self, pos: Point) -> Point {
        match self {
            Path::Arc(arc) => arc.normal_at(pos),
            Path::Line(line) => line.normal(),
        }
    }

    /// Copy rotated by `angle` around `center` (see [`crate::math::Vector::rotate`])
    pub fn rotated(&self, angle: f64, center: Point) -> Path {
        match self {
            Path::Arc(arc) => Path::Arc(arc.rotated(angle, center)),
            Path::Line(line) => Path::Line(line.rotated(angle, center)),
        }
    }
}

impl From<ArcPath> for Path {
    fn from(arc: ArcPath) -> Self {
        Path::Arc(arc)
    }
}

impl From<LinePath> for Path {
    fn from(line: LinePath) -> Self {
        Path::Line(line)
    }
}

/// A trajectory passing through a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Trajectory time
    pub t: f64,
    /// Moving against the path's outward normal
    pub entering: bool,
}

/// All crossings of `bahn` with `paths` inside `range`, sorted.
///
/// Crossings of the same kind closer than `CROSSING_MERGE_EPSILON` (a corner
/// shared by two paths) count once.
pub fn all_crossings(paths: &[Path], bahn: &Trajectory, range: Interval) -> Vec<Crossing> {
    let vel = &bahn.deriv();
    let mut crossings: Vec<Crossing> = paths
        .iter()
        .flat_map(|path| {
            path.collision_times(bahn, range).into_iter().map(move |t| {
                let normal = path.normal_at(bahn.apply(t));
                Crossing {
                    t,
                    entering: normal.dot(&vel.apply(t)) < 0.0,
                }
            })
        })
        .collect();
    crossings.sort_by(|a, b| a.t.total_cmp(&b.t));
    crossings.dedup_by(|a, b| {
        a.entering == b.entering && (a.t - b.t).abs() <= crate::consts::CROSSING_MERGE_EPSILON
    });
    crossings
}
