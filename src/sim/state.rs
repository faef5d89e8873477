//! Game state and the deltas the collision worker publishes
//!
//! A [`GameState`] is the whole simulated world at one instant. The worker
//! advances its own copy collision by collision and sends each step as a
//! [`StateChange`]; the consumer applies changes to its copy in time order.

use std::collections::BTreeMap;

use serde_json::Value;

use super::ball::Ball;
use super::handler::FormHandler;
use crate::consts::BALL_RADIUS;

/// Script variables, each stamped with the simulation time it was written.
///
/// A write older than the stored one is dropped, so merging deltas from the
/// worker never rolls a variable back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarStore {
    vars: BTreeMap<String, (Value, f64)>,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value, time: f64) {
        let name = name.into();
        if let Some((_, prev)) = self.vars.get(&name) {
            if time < *prev {
                return;
            }
        }
        self.vars.insert(name, (value, time));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name).map(|(v, _)| v)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn merge(&mut self, other: &VarStore) {
        for (name, (value, time)) in &other.vars {
            self.set(name.clone(), value.clone(), *time);
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub balls: Vec<Ball>,
    pub forms: FormHandler,
    pub vars: VarStore,
    /// Radius every ball is simulated with
    pub ball_radius: f64,
    /// Time of the last applied change
    pub time: f64,
    /// No further changes will follow
    pub is_end: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            balls: Vec::new(),
            forms: FormHandler::new(),
            vars: VarStore::new(),
            ball_radius: BALL_RADIUS,
            time: 0.0,
            is_end: false,
        }
    }
}

impl GameState {
    pub fn new(balls: Vec<Ball>, forms: FormHandler) -> Self {
        Self {
            balls,
            forms,
            ..Default::default()
        }
    }

    /// Re-base every ball at `t`; later queries start from there
    pub fn rebase(&mut self, t: f64) {
        for ball in &mut self.balls {
            *ball = ball.from_time(t);
        }
        self.time = t;
    }
}

/// What a collision step (or the hooks it ran) touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeInfo {
    pub balls_changed: bool,
    pub forms_changed: bool,
    pub vars_changed: bool,
}

impl ChangeInfo {
    pub fn set_balls_changed(&mut self) {
        self.balls_changed = true;
    }

    pub fn set_forms_changed(&mut self) {
        self.forms_changed = true;
    }

    pub fn set_vars_changed(&mut self) {
        self.vars_changed = true;
    }
}

/// One published step. Only the parts that changed are carried.
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Worker generation that produced this change
    pub generation: u64,
    pub change_t: f64,
    pub new_balls: Option<Vec<Ball>>,
    pub new_forms: Option<FormHandler>,
    pub new_vars: Option<VarStore>,
    pub is_end: bool,
}

impl StateChange {
    /// Snapshot the parts of `state` that `info` marks as changed
    pub fn capture(generation: u64, change_t: f64, state: &GameState, info: ChangeInfo) -> Self {
        Self {
            generation,
            change_t,
            new_balls: info.balls_changed.then(|| state.balls.clone()),
            new_forms: info.forms_changed.then(|| state.forms.clone()),
            new_vars: info.vars_changed.then(|| state.vars.clone()),
            is_end: state.is_end,
        }
    }

    pub fn apply_to(&self, state: &mut GameState) {
        if let Some(balls) = &self.new_balls {
            state.balls = balls.clone();
        }
        if let Some(forms) = &self.new_forms {
            state.forms = forms.clone();
        }
        if let Some(vars) = &self.new_vars {
            state.vars.merge(vars);
        }
        if self.is_end {
            state.is_end = true;
        }
        state.time = state.time.max(self.change_t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point;
    use serde_json::json;

    #[test]
    fn test_var_store_ignores_older_writes() {
        let mut vars = VarStore::new();
        vars.set("score", json!(10), 2.0);
        vars.set("score", json!(5), 1.0);
        assert_eq!(vars.get("score"), Some(&json!(10)));
        vars.set("score", json!(20), 2.0);
        assert_eq!(vars.get("score"), Some(&json!(20)));
        assert!(!vars.is_defined("lives"));
    }

    #[test]
    fn test_var_store_merge() {
        let mut local = VarStore::new();
        local.set("a", json!(1), 5.0);
        local.set("b", json!("x"), 1.0);
        let mut incoming = VarStore::new();
        incoming.set("a", json!(0), 3.0);
        incoming.set("b", json!("y"), 4.0);
        incoming.set("c", json!(true), 4.0);
        local.merge(&incoming);
        assert_eq!(local.get("a"), Some(&json!(1)));
        assert_eq!(local.get("b"), Some(&json!("y")));
        assert_eq!(local.len(), 3);
    }

    #[test]
    fn test_change_carries_only_marked_parts() {
        let mut state = GameState::new(vec![Ball::at(Point::ZERO)], FormHandler::new());
        state.vars.set("hits", json!(1), 1.0);
        let info = ChangeInfo {
            balls_changed: true,
            ..Default::default()
        };
        let change = StateChange::capture(3, 1.0, &state, info);
        assert_eq!(change.generation, 3);
        assert!(change.new_balls.is_some());
        assert!(change.new_forms.is_none());
        assert!(change.new_vars.is_none());

        let mut consumer = GameState::default();
        change.apply_to(&mut consumer);
        assert_eq!(consumer.balls.len(), 1);
        assert!(consumer.vars.is_empty());
        assert_eq!(consumer.time, 1.0);
        assert!(!consumer.is_end);
    }

    #[test]
    fn test_rebase_keeps_motion() {
        let ball = Ball::new(Point::ZERO, Point::new(1.0, 2.0), Point::new(0.0, -1.0), 0.0);
        let mut state = GameState::new(vec![ball.clone()], FormHandler::new());
        state.rebase(3.0);
        assert_eq!(state.time, 3.0);
        assert_eq!(state.balls[0].start_t(), 3.0);
        assert!(state.balls[0].pos(5.0).distance(ball.pos(5.0)) < 1e-9);
    }
}
