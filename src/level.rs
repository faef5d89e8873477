//! Level description loading
//!
//! A level is a JSON document:
//!
//! ```json
//! {
//!   "global": { "ball_radius": 20 },
//!   "forms": [ { "type": "LineForm", "params": { ... } } ],
//!   "namedForms": { "gate": { "type": "CircleForm", "params": { ... } } },
//!   "balls": [ { "pos": { "x": 0, "y": 0 }, "vel": { "x": 10, "y": 0 } } ],
//!   "vars": { "score": 0 }
//! }
//! ```
//!
//! Angles and angular speeds are given in degrees. Leaf forms take an optional
//! `material`, `name`, `on_collision` (hook names) and `do_reflect`. Unknown
//! fields such as `color` are ignored; an unknown form `type` is an error.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{EngineError, EngineResult};
use crate::math::{Point, Trajectory};
use crate::settings::EngineSettings;
use crate::sim::{
    Ball, CircleForm, CollDirection, Form, FormHandler, GameState, LineForm, Material, PeriodicForm, PolygonForm,
    RotateForm, Surface, TimeLimitedForm, TimeShiftForm, TranslateForm,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub forms: Vec<FormDef>,
    #[serde(default, rename = "namedForms")]
    pub named_forms: BTreeMap<String, FormDef>,
    #[serde(default)]
    pub balls: Vec<BallDef>,
    /// Initial script variables, stamped at time 0
    #[serde(default)]
    pub vars: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Global {
    pub ball_radius: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BallDef {
    pub pos: Point,
    #[serde(default)]
    pub vel: Point,
    #[serde(default)]
    pub acc: Point,
    #[serde(default)]
    pub start_t: f64,
}

/// Surface fields shared by the leaf forms
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurfaceDef {
    #[serde(default)]
    pub material: Material,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub on_collision: Vec<String>,
    #[serde(default)]
    pub do_reflect: Option<bool>,
}

impl SurfaceDef {
    fn build(&self, kind: &str) -> Arc<Surface> {
        let surface = Surface::new(self.material)
            .with_name(self.name.clone().unwrap_or_else(|| kind.to_string()))
            .with_hooks(self.on_collision.clone())
            .with_reflect(self.do_reflect.unwrap_or(true));
        Arc::new(surface)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum FormDef {
    LineForm {
        pos1: Point,
        pos2: Point,
        #[serde(flatten)]
        surface: SurfaceDef,
    },
    CircleForm {
        pos: Point,
        radius: f64,
        #[serde(default)]
        min_angle: f64,
        #[serde(default = "full_turn")]
        max_angle: f64,
        #[serde(flatten)]
        surface: SurfaceDef,
    },
    PolygonForm {
        points: Vec<Point>,
        #[serde(default)]
        self_coll_direction: CollDirection,
        #[serde(default)]
        line_coll_direction: CollDirection,
        #[serde(flatten)]
        surface: SurfaceDef,
    },
    #[serde(alias = "RotatingForm")]
    RotateForm {
        center: Point,
        #[serde(default)]
        start_angle: f64,
        angle_speed: f64,
        #[serde(default)]
        start_time: f64,
        form: Box<FormDef>,
    },
    TransformForm {
        transform: Trajectory,
        form: Box<FormDef>,
    },
    /// `start_form` until the absolute time `form_duration`, then `end_form`
    TempForm {
        start_form: Box<FormDef>,
        form_duration: f64,
        end_form: Box<FormDef>,
    },
    TimedForm {
        start_time: f64,
        form: Box<FormDef>,
    },
    PeriodicForm {
        forms: Vec<PhaseDef>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhaseDef {
    pub form: FormDef,
    pub duration: f64,
}

fn full_turn() -> f64 {
    360.0
}

/// Construction parameters that come from the level or settings, not the form
#[derive(Debug, Clone, Copy)]
struct BuildParams {
    ball_radius: f64,
    outline_samples: usize,
    outline_padding: f64,
}

impl FormDef {
    fn build(&self, p: &BuildParams) -> EngineResult<Form> {
        let form = match self {
            FormDef::LineForm { pos1, pos2, surface } => {
                Form::Line(LineForm::new(*pos1, *pos2, p.ball_radius, surface.build("line")))
            }
            FormDef::CircleForm {
                pos,
                radius,
                min_angle,
                max_angle,
                surface,
            } => {
                if !(*radius >= 0.0) {
                    return Err(EngineError::config(format!("circle radius must be non-negative, got {radius}")));
                }
                Form::Circle(CircleForm::new(
                    *pos,
                    *radius,
                    min_angle.to_radians(),
                    max_angle.to_radians(),
                    p.ball_radius,
                    surface.build("circle"),
                ))
            }
            FormDef::PolygonForm {
                points,
                self_coll_direction,
                line_coll_direction,
                surface,
            } => {
                if points.len() < 3 {
                    return Err(EngineError::config(format!(
                        "polygon needs at least 3 points, got {}",
                        points.len()
                    )));
                }
                Form::Polygon(PolygonForm::new(
                    points.clone(),
                    p.ball_radius,
                    *self_coll_direction,
                    *line_coll_direction,
                    surface.build("polygon"),
                ))
            }
            FormDef::RotateForm {
                center,
                start_angle,
                angle_speed,
                start_time,
                form,
            } => Form::Rotate(RotateForm::new(
                form.build(p)?,
                *center,
                start_angle.to_radians(),
                angle_speed.to_radians(),
                *start_time,
            )),
            FormDef::TransformForm { transform, form } => {
                Form::Translate(TranslateForm::new(form.build(p)?, transform.clone()))
            }
            FormDef::TempForm {
                start_form,
                form_duration,
                end_form,
            } => Form::TimeLimited(TimeLimitedForm::new(start_form.build(p)?, *form_duration, end_form.build(p)?)),
            FormDef::TimedForm { start_time, form } => Form::TimeShift(TimeShiftForm::new(form.build(p)?, *start_time)),
            FormDef::PeriodicForm { forms } => {
                let phases = forms
                    .iter()
                    .map(|phase| Ok((phase.form.build(p)?, phase.duration)))
                    .collect::<EngineResult<Vec<_>>>()?;
                Form::Periodic(PeriodicForm::with_outline(
                    phases,
                    p.ball_radius,
                    p.outline_samples,
                    p.outline_padding,
                )?)
            }
        };
        Ok(form)
    }
}

impl Level {
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let level = Self::from_json(&text)?;
        log::info!("Loaded level {}", path.as_ref().display());
        Ok(level)
    }

    /// Parse a level; any shape error is a configuration error
    pub fn from_json(text: &str) -> EngineResult<Self> {
        serde_json::from_str(text).map_err(|e| EngineError::config(format!("invalid level: {e}")))
    }

    /// Build the initial game state with default engine settings
    pub fn into_state(&self) -> EngineResult<GameState> {
        self.into_state_with(&EngineSettings::default())
    }

    pub fn into_state_with(&self, settings: &EngineSettings) -> EngineResult<GameState> {
        let ball_radius = self.global.ball_radius.unwrap_or(settings.ball_radius);
        if !(ball_radius > 0.0) {
            return Err(EngineError::config(format!("ball_radius must be positive, got {ball_radius}")));
        }
        let params = BuildParams {
            ball_radius,
            outline_samples: settings.outline_samples,
            outline_padding: settings.outline_padding,
        };

        let mut forms = FormHandler::new();
        for def in &self.forms {
            forms.add_form(def.build(&params)?);
        }
        for (name, def) in &self.named_forms {
            forms.set_named_form(name.clone(), def.build(&params)?);
        }
        let balls = self
            .balls
            .iter()
            .map(|b| Ball::new(b.pos, b.vel, b.acc, b.start_t))
            .collect();

        let mut state = GameState::new(balls, forms);
        state.ball_radius = ball_radius;
        for (name, value) in &self.vars {
            state.vars.set(name.clone(), value.clone(), 0.0);
        }
        log::info!(
            "Level: {} forms, {} named forms, {} balls, ball radius {}",
            self.forms.len(),
            self.named_forms.len(),
            self.balls.len(),
            ball_radius
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Hooks, SimContext, advance};
    use serde_json::json;

    const TABLE: &str = r##"{
        "global": { "ball_radius": 10 },
        "forms": [
            { "type": "LineForm", "params": {
                "pos1": { "x": -200, "y": 0 }, "pos2": { "x": 200, "y": 0 },
                "material": { "factor_ort": 0.5, "factor_par": 1.0, "min_ort": 0, "min_par": 0 },
                "color": "#ffffff", "name": "floor", "on_collision": ["score"] } },
            { "type": "CircleForm", "params": {
                "pos": { "x": 0, "y": 300 }, "radius": 100, "min_angle": 0, "max_angle": 180 } },
            { "type": "PolygonForm", "params": {
                "points": [ { "x": 500, "y": 0 }, { "x": 600, "y": 0 }, { "x": 550, "y": 80 } ],
                "self_coll_direction": "ALLOW_FROM_OUTSIDE", "line_coll_direction": "ALLOW_ALL" } },
            { "type": "RotatingForm", "params": {
                "center": { "x": 900, "y": 0 }, "start_angle": 0, "angle_speed": 90, "start_time": 0,
                "form": { "type": "LineForm", "params": {
                    "pos1": { "x": 900, "y": 0 }, "pos2": { "x": 960, "y": 0 } } } } },
            { "type": "TransformForm", "params": {
                "transform": { "x": { "koefs": [0, 5] }, "y": { "koefs": [0] } },
                "form": { "type": "CircleForm", "params": { "pos": { "x": -900, "y": 0 }, "radius": 15 } } } },
            { "type": "TempForm", "params": {
                "start_form": { "type": "LineForm", "params": {
                    "pos1": { "x": -600, "y": 0 }, "pos2": { "x": -500, "y": 0 } } },
                "form_duration": 3,
                "end_form": { "type": "LineForm", "params": {
                    "pos1": { "x": -600, "y": 50 }, "pos2": { "x": -500, "y": 50 } } } } },
            { "type": "TimedForm", "params": {
                "start_time": 10,
                "form": { "type": "CircleForm", "params": { "pos": { "x": 0, "y": -600 }, "radius": 20 } } } },
            { "type": "PeriodicForm", "params": { "forms": [
                { "form": { "type": "LineForm", "params": {
                    "pos1": { "x": 0, "y": -900 }, "pos2": { "x": 50, "y": -900 } } }, "duration": 1 },
                { "form": { "type": "LineForm", "params": {
                    "pos1": { "x": 0, "y": -950 }, "pos2": { "x": 50, "y": -950 } } }, "duration": 2 } ] } }
        ],
        "namedForms": {
            "gate": { "type": "LineForm", "params": {
                "pos1": { "x": 300, "y": 300 }, "pos2": { "x": 400, "y": 300 }, "do_reflect": false } }
        },
        "balls": [ { "pos": { "x": 0, "y": 100 }, "acc": { "x": 0, "y": -10 } } ],
        "vars": { "score": 0 }
    }"##;

    #[test]
    fn test_loads_every_form_type() {
        let level = Level::from_json(TABLE).unwrap();
        assert_eq!(level.forms.len(), 8);
        let state = level.into_state().unwrap();
        assert_eq!(state.forms.len(), 9);
        assert_eq!(state.ball_radius, 10.0);
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.vars.get("score"), Some(&json!(0)));

        let gate = state.forms.get_named_form("gate").unwrap();
        assert!(!gate.surface().do_reflect);
        let kinds: Vec<&str> = state
            .forms
            .iter()
            .map(|f| match &**f {
                Form::Line(_) => "line",
                Form::Circle(_) => "circle",
                Form::Polygon(_) => "polygon",
                Form::Rotate(_) => "rotate",
                Form::Translate(_) => "translate",
                Form::TimeShift(_) => "timeshift",
                Form::TimeLimited(_) => "timelimited",
                Form::Periodic(_) => "periodic",
            })
            .collect();
        assert_eq!(
            kinds,
            ["line", "circle", "polygon", "rotate", "translate", "timelimited", "timeshift", "periodic", "line"]
        );
    }

    #[test]
    fn test_dropped_ball_from_level() {
        let mut state = Level::from_json(TABLE).unwrap().into_state().unwrap();
        let change = advance(&mut state, &Hooks::new(), &SimContext::default(), 0).unwrap();
        let expected = 18.0f64.sqrt();
        assert!((change.change_t - expected).abs() < 1e-9);
        assert!((state.balls[0].vel_0().y - 0.5 * 10.0 * expected).abs() < 1e-9);
    }

    #[test]
    fn test_degrees_become_radians() {
        let level = Level::from_json(TABLE).unwrap();
        let state = level.into_state().unwrap();
        let dome = state.forms.iter().nth(1).unwrap();
        // 0..180 degrees is the upper half: the last outline point is the left end
        let last = *dome.points(0.0).last().unwrap();
        assert!(last.distance(Point::new(-100.0, 300.0)) < 1e-9);
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let text = r#"{ "forms": [ { "type": "SplineForm", "params": {} } ] }"#;
        assert!(matches!(Level::from_json(text), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_bad_direction_is_config_error() {
        let text = r#"{ "forms": [ { "type": "PolygonForm", "params": {
            "points": [ { "x": 0, "y": 0 }, { "x": 1, "y": 0 }, { "x": 0, "y": 1 } ],
            "self_coll_direction": "SIDEWAYS" } } ] }"#;
        assert!(matches!(Level::from_json(text), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_bad_periodic_is_config_error() {
        let level = Level::from_json(r#"{ "forms": [ { "type": "PeriodicForm", "params": { "forms": [] } } ] }"#).unwrap();
        assert!(matches!(level.into_state(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_ball_radius_falls_back_to_settings() {
        let level = Level::from_json(r#"{ "balls": [ { "pos": { "x": 1, "y": 2 } } ] }"#).unwrap();
        let settings = EngineSettings {
            ball_radius: 7.5,
            ..Default::default()
        };
        let state = level.into_state_with(&settings).unwrap();
        assert_eq!(state.ball_radius, 7.5);
        assert_eq!(state.balls[0].vel_0(), Point::ZERO);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(Level::load("/nonexistent/level.json"), Err(EngineError::Io(_))));
    }
}
