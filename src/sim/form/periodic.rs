use std::sync::Arc;

use crate::consts::{OUTLINE_MARGIN, OUTLINE_PADDING, OUTLINE_SAMPLES};
use crate::error::{EngineError, EngineResult};
use crate::math::Point;
use crate::sim::ball::Probe;
use crate::sim::collision::Collision;
use crate::sim::context::SimContext;
use crate::sim::path::CollDirection;

use super::{Form, PolygonForm};

/// A cycle of forms, each present for its duration, repeating forever.
///
/// The cycle is anchored at absolute time 0. Every phase runs on its own clock
/// that starts when the phase begins. A padded bounding box around sampled
/// outline points of all phases limits the search to the times a ball is near.
#[derive(Debug, Clone)]
pub struct PeriodicForm {
    phases: Vec<(Form, f64)>,
    offsets: Vec<f64>,
    period: f64,
    outline: PolygonForm,
    ball_radius: f64,
    samples: usize,
    padding: f64,
}

impl PeriodicForm {
    pub fn new(phases: Vec<(Form, f64)>, ball_radius: f64) -> EngineResult<Self> {
        Self::with_outline(phases, ball_radius, OUTLINE_SAMPLES, OUTLINE_PADDING)
    }

    /// `samples` outline points are spread over the cycle; the box around
    /// them grows by `padding` times its half size.
    pub fn with_outline(
        phases: Vec<(Form, f64)>,
        ball_radius: f64,
        samples: usize,
        padding: f64,
    ) -> EngineResult<Self> {
        if phases.is_empty() {
            return Err(EngineError::config("periodic form needs at least one phase"));
        }
        if let Some((_, d)) = phases.iter().find(|(_, d)| !(d.is_finite() && *d > 0.0)) {
            return Err(EngineError::config(format!(
                "periodic phase duration must be positive, got {d}"
            )));
        }
        Ok(Self::assemble(phases, ball_radius, samples, padding))
    }

    fn assemble(phases: Vec<(Form, f64)>, ball_radius: f64, samples: usize, padding: f64) -> Self {
        let mut offsets = Vec::with_capacity(phases.len());
        let mut period = 0.0;
        for (_, duration) in &phases {
            offsets.push(period);
            period += duration;
        }
        let outline = build_outline(&phases, ball_radius, samples, padding);
        Self {
            phases,
            offsets,
            period,
            outline,
            ball_radius,
            samples,
            padding,
        }
    }

    pub fn phases(&self) -> &[(Form, f64)] {
        &self.phases
    }

    pub fn first_form(&self) -> &Form {
        &self.phases[0].0
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn outline(&self) -> &PolygonForm {
        &self.outline
    }

    /// Cycle number and phase index active at absolute time `t`
    fn phase_at(&self, t: f64) -> (i64, usize) {
        let cycle = (t / self.period).floor();
        let local = t - cycle * self.period;
        let idx = self
            .offsets
            .partition_point(|o| *o <= local)
            .saturating_sub(1)
            .min(self.phases.len() - 1);
        (cycle as i64, idx)
    }

    fn phase_start(&self, cycle: i64, idx: usize) -> f64 {
        cycle as f64 * self.period + self.offsets[idx]
    }

    pub fn collide(&self, probe: &Probe, ctx: &SimContext) -> Option<Collision> {
        for interval in self.outline.times_inside(probe, ctx.root_epsilon) {
            let t0 = interval.min.max(probe.start_t);
            let tmax = interval.max.min(probe.horizon);
            let (mut cycle, mut idx) = self.phase_at(t0);
            let mut exhausted = true;
            for _ in 0..ctx.max_periodic_phases {
                let (form, duration) = &self.phases[idx];
                let mov_start = self.phase_start(cycle, idx);
                if mov_start > tmax {
                    exhausted = false;
                    break;
                }
                let mov_end = mov_start + duration;
                let from = t0.max(mov_start);
                let base = if from > probe.start_t {
                    probe.rebased(from)
                } else {
                    probe.clone()
                };
                let local = base.until(mov_end.min(tmax)).on_clock(mov_start);
                if let Some(c) = form.collide(&local, ctx) {
                    let time = c.coll_t() + mov_start;
                    if time < mov_end && time <= tmax {
                        return Some(c.timed(time));
                    }
                }
                idx += 1;
                if idx == self.phases.len() {
                    idx = 0;
                    cycle += 1;
                }
            }
            if exhausted {
                log::debug!(
                    "periodic form: gave up after {} phases from t = {t0}",
                    ctx.max_periodic_phases
                );
                return None;
            }
        }
        None
    }

    /// Points of the phase active at absolute time `t`, on that phase's clock
    pub fn points(&self, t: f64) -> Vec<Point> {
        let (cycle, idx) = self.phase_at(t);
        self.phases[idx].0.points(t - self.phase_start(cycle, idx))
    }

    /// Rotates every phase and rebuilds the outline around them
    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        let phases = self
            .phases
            .iter()
            .map(|(form, duration)| (form.rotated(angle, center), *duration))
            .collect();
        Self::assemble(phases, self.ball_radius, self.samples, self.padding)
    }
}

/// Padded axis-aligned box around the phases' outline points
fn build_outline(phases: &[(Form, f64)], ball_radius: f64, samples: usize, padding: f64) -> PolygonForm {
    let per_phase = (samples / phases.len()).max(2);
    let mut lo = Point::new(f64::INFINITY, f64::INFINITY);
    let mut hi = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (form, duration) in phases {
        for k in 0..per_phase {
            let t = duration * k as f64 / (per_phase - 1) as f64;
            for p in form.points(t) {
                lo = Point::new(lo.x.min(p.x), lo.y.min(p.y));
                hi = Point::new(hi.x.max(p.x), hi.y.max(p.y));
            }
        }
    }
    if !(lo.is_finite() && hi.is_finite()) {
        lo = Point::ZERO;
        hi = Point::ZERO;
    }
    let center = (lo + hi).scale(0.5);
    let half = (hi - lo).scale(0.5);
    let half = Point::new(
        half.x * (1.0 + padding) + OUTLINE_MARGIN,
        half.y * (1.0 + padding) + OUTLINE_MARGIN,
    );
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
        .into_iter()
        .map(|(sx, sy)| center + Point::new(sx * half.x, sy * half.y))
        .collect();
    PolygonForm::new(
        corners,
        ball_radius,
        CollDirection::FromOutside,
        CollDirection::AllowAll,
        Arc::clone(phases[0].0.surface()),
    )
}
