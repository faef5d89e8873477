//! Poly Pinball headless runner
//!
//! Loads a level, starts the collision worker and drives it from a simulated
//! frame clock, logging every collision the frame loop applies.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use serde_json::Value;

use poly_pinball::sim::{ChangeInfo, GameState, Hooks};
use poly_pinball::{CollThread, EngineSettings, Level};

#[derive(Parser, Debug)]
#[command(name = "poly-pinball", version, about = "Run a pinball level without a window")]
struct Cli {
    /// Level JSON.
    level: PathBuf,

    /// Engine settings JSON; defaults are used when the file does not exist.
    #[arg(long, default_value = "poly-pinball.json")]
    settings: PathBuf,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 30.0)]
    duration: f64,

    /// Frames per simulated second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Do not sleep between frames.
    #[arg(long, default_value_t = false)]
    fast: bool,
}

/// Hooks levels can name in `on_collision`
fn standard_hooks() -> Hooks {
    let mut hooks = Hooks::new();
    hooks.register("score", |state: &mut GameState, t: f64, _ball: usize, info: &mut ChangeInfo| {
        let score = state.vars.get("score").and_then(Value::as_i64).unwrap_or(0);
        state.vars.set("score", Value::from(score + 1), t);
        info.set_vars_changed();
    });
    hooks.register("drain", |state: &mut GameState, _t: f64, ball: usize, info: &mut ChangeInfo| {
        state.balls.remove(ball);
        info.set_balls_changed();
    });
    hooks
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    anyhow::ensure!(cli.fps > 0, "--fps must be positive");
    anyhow::ensure!(cli.duration >= 0.0, "--duration must not be negative");

    let settings = EngineSettings::load_or_default(&cli.settings)
        .with_context(|| format!("reading settings {}", cli.settings.display()))?;
    let level = Level::load(&cli.level).with_context(|| format!("loading level {}", cli.level.display()))?;
    let state = level.into_state_with(&settings)?;

    let mut thread = CollThread::new(state, &settings, standard_hooks())?;
    let frame = 1.0 / f64::from(cli.fps);
    let frames = (cli.duration / (frame * settings.time_scale)).ceil() as u64;
    let mut events = 0usize;

    for n in 1..=frames {
        let now = (n as f64 * frame * settings.time_scale).min(cli.duration);
        if let Some((state, applied)) = thread.check_coll(now) {
            events += applied;
            if applied == settings.max_pops_per_check {
                log::warn!("frame {n}: applied {applied} changes, falling behind");
            }
            log::info!(
                "t = {:.4}: {applied} collision(s), {} balls, {} vars",
                state.time,
                state.balls.len(),
                state.vars.len()
            );
            if state.is_end {
                log::info!("no balls left");
                break;
            }
        }
        if !cli.fast {
            std::thread::sleep(Duration::from_secs_f64(frame));
        }
    }

    let state = thread.state();
    println!(
        "{} collisions, last at t = {:.4}, {} balls left",
        events,
        state.time,
        state.balls.len()
    );
    if let Some(score) = state.vars.get("score") {
        println!("score: {score}");
    }
    thread.stop()?;
    Ok(())
}
