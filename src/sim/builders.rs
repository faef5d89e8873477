//! Ready-made moving obstacles built from the basic forms

use std::f64::consts::TAU;

use crate::error::{EngineError, EngineResult};
use crate::math::Point;

use super::form::{Form, PeriodicForm, RotateForm, TimeLimitedForm};

/// A flipper arm swinging once between its rest and raised positions.
///
/// `line` is the arm at angle 0; `up_angle` and `down_angle` rotate it around
/// `pivot` (clockwise, like [`Form::rotated`]). The swing starts at `now`,
/// takes `duration` and leaves the arm resting at the other end.
pub fn flipper(
    line: &Form,
    pivot: Point,
    up_angle: f64,
    down_angle: f64,
    duration: f64,
    currently_up: bool,
    now: f64,
) -> Form {
    let up = line.rotated(up_angle, pivot);
    let down = line.rotated(down_angle, pivot);
    let speed = (up_angle - down_angle) / duration;
    let (from, to, speed) = if currently_up {
        (up, down, -speed)
    } else {
        (down, up, speed)
    };
    // Rotate turns by -angle_at(t) = speed * (t - now)
    let swing = Form::Rotate(RotateForm::new(from, pivot, 0.0, speed, now));
    Form::TimeLimited(TimeLimitedForm::new(swing, now + duration, to))
}

/// A form turning forever around `pivot`, one full turn per `period`.
///
/// Built as `steps` rotating copies, each covering an equal share of the turn,
/// so no single rotation query spans more than `period / steps`.
pub fn spinner(form: &Form, pivot: Point, period: f64, steps: usize, ball_radius: f64) -> EngineResult<Form> {
    if steps == 0 {
        return Err(EngineError::config("spinner needs at least one step"));
    }
    let step_angle = TAU / steps as f64;
    let step_duration = period / steps as f64;
    let phases = (0..steps)
        .map(|i| {
            let start = form.rotated(step_angle * i as f64, pivot);
            let turning = RotateForm::new(start, pivot, 0.0, step_angle / step_duration, 0.0);
            (Form::Rotate(turning), step_duration)
        })
        .collect();
    Ok(Form::Periodic(PeriodicForm::new(phases, ball_radius)?))
}
