//! Headless demo runner.
//!
//! ```text
//! flurry [effect | config.toml] [ticks]
//! ```
//!
//! Runs an effect preset (or a TOML config) at a fixed 60 Hz step and logs
//! the live count once per simulated second. Touch-driven effects get a
//! synthetic touch four times a second, sweeping across the bounds.
//! Set `RUST_LOG=flurry=debug` for per-tick summaries.

use flurry::{Bounds, Effect, FixedStep, SeededRandom, SimConfig, Vec2};
use std::error::Error;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const HZ: u64 = 60;
const TOUCHES_PER_SECOND: u64 = 4;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let target = args.next().unwrap_or_else(|| "explosion".to_string());
    let ticks = match args.next().map(|s| s.parse::<u64>()) {
        None => 10 * HZ,
        Some(Ok(n)) => n,
        Some(Err(err)) => {
            error!(%err, "tick count must be a non-negative integer");
            return ExitCode::FAILURE;
        }
    };

    let result = if target.ends_with(".toml") {
        run_config(&target, ticks)
    } else {
        run_effect(&target, ticks)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run_effect(name: &str, ticks: u64) -> Result<(), Box<dyn Error>> {
    let bounds = Bounds::from_size(400.0, 800.0);
    let Some(effect) = Effect::by_name(name, &bounds) else {
        return Err(format!(
            "unknown effect `{name}`; expected one of: {}",
            Effect::NAMES.join(", ")
        )
        .into());
    };

    let mut session = effect
        .simulation()
        .with_bounds(bounds)
        .with_random(SeededRandom::from_entropy())
        .start(FixedStep::limited(1.0 / HZ as f32, ticks))?;
    info!(effect = effect.name(), ticks, "running effect");

    let touch_every = HZ / TOUCHES_PER_SECOND;
    let mut tick = 0u64;
    loop {
        if effect.is_touch_driven() && tick % touch_every == 0 {
            let sweep = (tick as f32 / HZ as f32 * 0.5).fract();
            let at = Vec2::new(
                bounds.min.x + bounds.width() * sweep,
                bounds.min.y + bounds.height() * 0.3,
            );
            effect.touch(session.store_mut(), at);
        }

        let Some(report) = session.step() else {
            break;
        };
        tick += 1;
        if tick % HZ == 0 {
            info!(second = tick / HZ, live = report.live, "status");
        }
    }

    let summary = session.stop();
    info!(ticks = summary.ticks, released = summary.cleared, "effect finished");
    Ok(())
}

fn run_config(path: &str, ticks: u64) -> Result<(), Box<dyn Error>> {
    let config = SimConfig::from_path(path)?;
    let bounds = config.bounds();
    let spawn = config.spawn_config();
    let random = config.random();
    let dt = config.fixed_dt;

    let mut session = config
        .into_simulation(random)
        .start(FixedStep::limited(dt, ticks))?;
    info!(path, ticks, "running config");

    session.spawn(bounds.center(), 10, &spawn);
    let per_second = (1.0 / dt).round().max(1.0) as u64;
    let mut tick = 0u64;
    let steps = session.run(None, |report, _| {
        tick += 1;
        if tick % per_second == 0 {
            info!(second = tick / per_second, live = report.live, "status");
        }
    });

    let summary = session.stop();
    info!(ticks = steps, released = summary.cleared, "config run finished");
    Ok(())
}
