//! One collision step
//!
//! Finds the earliest collision of any ball with any form or other ball, moves
//! the world to that instant, reflects the ball(s) involved and runs the hooks
//! of the surface that was hit.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::ball::ball_surface;
use super::collision::Collision;
use super::context::SimContext;
use super::form::Form;
use super::path::Surface;
use super::state::{ChangeInfo, GameState, StateChange};

/// Scripted reaction to a collision: `(state, collision time, ball index, change flags)`
pub type Hook = Arc<dyn Fn(&mut GameState, f64, usize, &mut ChangeInfo) + Send + Sync>;

/// Hooks by the name surfaces refer to them with
#[derive(Clone, Default)]
pub struct Hooks {
    map: BTreeMap<String, Hook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(&mut GameState, f64, usize, &mut ChangeInfo) + Send + Sync + 'static,
    {
        self.map.insert(name.into(), Arc::new(hook));
    }

    pub fn get(&self, name: &str) -> Option<&Hook> {
        self.map.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

/// Advance `state` to its next collision.
///
/// Returns `None` when no ball will ever hit anything (or the state already
/// ended); the state is then left untouched. Otherwise the returned change
/// carries the parts of the state the step touched, stamped `generation`.
pub fn advance(state: &mut GameState, hooks: &Hooks, ctx: &SimContext, generation: u64) -> Option<StateChange> {
    if state.is_end {
        return None;
    }
    let surfaces: Vec<Arc<Surface>> = state.balls.iter().map(|_| ball_surface()).collect();
    let ball_forms: Vec<Arc<Form>> = state
        .balls
        .iter()
        .zip(&surfaces)
        .map(|(ball, surface)| Arc::new(ball.as_form(state.ball_radius, Arc::clone(surface))))
        .collect();
    let mut forms = state.forms.clone();
    for form in &ball_forms {
        forms.add_form(Arc::clone(form));
    }

    let mut first: Option<(usize, Collision)> = None;
    for (i, ball) in state.balls.iter().enumerate() {
        let ball = if ball.start_t() < state.time {
            ball.from_time(state.time)
        } else {
            ball.clone()
        };
        let Some(c) = forms.find_collision(&ball, &ball_forms[i..=i], ctx) else {
            continue;
        };
        if first.as_ref().is_none_or(|(_, best)| c.coll_t() < best.coll_t()) {
            first = Some((i, c));
        }
    }
    let (i, coll) = first?;
    let t = coll.coll_t();
    let surface = Arc::clone(coll.obj_form());

    let ball = state.balls[i].from_time(t);
    if surface.do_reflect {
        let dir = coll.result_dir();
        if let Some(j) = surfaces.iter().position(|s| Arc::ptr_eq(s, &surface)) {
            log::debug!("ball {i} hit ball {j} at t = {t:.4}");
            state.balls[j] = state.balls[j].from_time(t).with_vel(-dir);
        }
        state.balls[i] = ball.with_vel(dir);
    } else {
        state.balls[i] = ball;
    }
    state.time = t;
    let mut info = ChangeInfo::default();
    info.set_balls_changed();

    for name in &surface.on_collision {
        match hooks.get(name) {
            Some(hook) => hook(state, t, i, &mut info),
            None => log::warn!("no hook named {name:?} (hit {:?} at t = {t:.4})", surface.name),
        }
    }

    if state.balls.is_empty() {
        log::info!("no balls left at t = {t:.4}");
        state.is_end = true;
    }
    Some(StateChange::capture(generation, t, state, info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point;
    use crate::sim::ball::Ball;
    use crate::sim::form::LineForm;
    use crate::sim::handler::FormHandler;
    use crate::sim::material::Material;
    use serde_json::json;

    fn floor(surface: Surface, ball_radius: f64) -> Form {
        Form::Line(LineForm::new(
            Point::new(-500.0, 0.0),
            Point::new(500.0, 0.0),
            ball_radius,
            Arc::new(surface),
        ))
    }

    fn state_with(balls: Vec<Ball>, forms: Vec<Form>) -> GameState {
        let mut handler = FormHandler::new();
        for form in forms {
            handler.add_form(form);
        }
        let mut state = GameState::new(balls, handler);
        state.ball_radius = 10.0;
        state
    }

    #[test]
    fn test_dropped_ball_bounces() {
        let ctx = SimContext::default();
        let surface = Surface::new(Material::new(0.5, 1.0, 0.0, 0.0)).with_name("floor");
        let ball = Ball::new(Point::new(0.0, 100.0), Point::ZERO, Point::new(0.0, -10.0), 0.0);
        let mut state = state_with(vec![ball], vec![floor(surface, 10.0)]);

        let change = advance(&mut state, &Hooks::new(), &ctx, 0).unwrap();
        // falls 90 to the offset line: t = sqrt(2 * 90 / 10)
        let expected = 18.0f64.sqrt();
        assert!((change.change_t - expected).abs() < 1e-9);
        let vel = state.balls[0].vel_0();
        assert!((vel.y - 0.5 * 10.0 * expected).abs() < 1e-9);
        assert!(vel.x.abs() < 1e-12);
        assert_eq!(state.balls[0].start_t(), change.change_t);
        assert!(change.new_balls.is_some());
    }

    #[test]
    fn test_times_strictly_increase() {
        let ctx = SimContext::default();
        let walls = vec![
            Form::Line(LineForm::new(
                Point::new(0.0, -100.0),
                Point::new(0.0, 100.0),
                10.0,
                Arc::new(Surface::default()),
            )),
            Form::Line(LineForm::new(
                Point::new(100.0, -100.0),
                Point::new(100.0, 100.0),
                10.0,
                Arc::new(Surface::default()),
            )),
        ];
        let ball = Ball::new(Point::new(50.0, 0.0), Point::new(20.0, 0.0), Point::ZERO, 0.0);
        let mut state = state_with(vec![ball], walls);
        let mut last = f64::NEG_INFINITY;
        for k in 0..10 {
            let change = advance(&mut state, &Hooks::new(), &ctx, 0).unwrap();
            assert!(change.change_t > last, "step {k}: {} after {last}", change.change_t);
            last = change.change_t;
        }
        // first bounce at 2, then every 4 time units
        assert!((last - (2.0 + 9.0 * 4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_ball_to_ball() {
        let ctx = SimContext::default();
        let a = Ball::new(Point::new(-100.0, 0.0), Point::new(10.0, 0.0), Point::ZERO, 0.0);
        let b = Ball::new(Point::new(100.0, 0.0), Point::new(-10.0, 0.0), Point::ZERO, 0.0);
        let mut state = state_with(vec![a, b], Vec::new());

        let change = advance(&mut state, &Hooks::new(), &ctx, 0).unwrap();
        // centres meet at distance 2r = 20 after closing 180 at 20 per unit
        assert!((change.change_t - 9.0).abs() < 1e-9);
        let va = state.balls[0].vel_0();
        let vb = state.balls[1].vel_0();
        assert!(va.distance(Point::new(-16.0, 0.0)) < 1e-9, "{va:?}");
        assert!(vb.distance(Point::new(16.0, 0.0)) < 1e-9, "{vb:?}");
        assert!((state.balls[1].start_t() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_pass_through_surface_keeps_velocity() {
        let ctx = SimContext::default();
        let gate = Surface::default().with_reflect(false).with_name("gate");
        let ball = Ball::new(Point::new(0.0, 50.0), Point::new(0.0, -10.0), Point::ZERO, 0.0);
        let mut state = state_with(vec![ball], vec![floor(gate, 10.0)]);
        let change = advance(&mut state, &Hooks::new(), &ctx, 0).unwrap();
        assert!((change.change_t - 4.0).abs() < 1e-9);
        assert_eq!(state.balls[0].vel_0(), Point::new(0.0, -10.0));
    }

    #[test]
    fn test_hooks_run_and_mark_changes() {
        let ctx = SimContext::default();
        let mut hooks = Hooks::new();
        hooks.register("score", |state: &mut GameState, t: f64, _ball: usize, info: &mut ChangeInfo| {
            let hits = state.vars.get("hits").and_then(|v| v.as_i64()).unwrap_or(0);
            state.vars.set("hits", json!(hits + 1), t);
            info.set_vars_changed();
        });
        hooks.register("drain", |state: &mut GameState, _t: f64, ball: usize, _info: &mut ChangeInfo| {
            state.balls.remove(ball);
        });

        let surface = Surface::default()
            .with_name("floor")
            .with_hooks(vec!["score".into(), "missing".into(), "drain".into()]);
        let ball = Ball::new(Point::new(0.0, 50.0), Point::new(0.0, -10.0), Point::ZERO, 0.0);
        let mut state = state_with(vec![ball], vec![floor(surface, 10.0)]);

        let change = advance(&mut state, &hooks, &ctx, 7).unwrap();
        assert_eq!(change.generation, 7);
        assert_eq!(change.new_vars.unwrap().get("hits"), Some(&json!(1)));
        assert!(change.is_end);
        assert!(state.is_end);
        assert!(advance(&mut state, &hooks, &ctx, 7).is_none());
    }

    #[test]
    fn test_nothing_to_hit() {
        let ctx = SimContext::default();
        let ball = Ball::new(Point::ZERO, Point::new(1.0, 0.0), Point::ZERO, 0.0);
        let mut state = state_with(vec![ball], Vec::new());
        assert!(advance(&mut state, &Hooks::new(), &ctx, 0).is_none());
        assert_eq!(state.time, 0.0);
    }
}
