//! Countdown timer driven by tick deltas.
//!
//! Shares the simulation's clock instead of owning a platform timer. Display
//! formatting switches from `MM:SS.d` to `HH:MM:SS` once an hour or more
//! remains.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Five minutes.
pub const DEFAULT_DURATION: f64 = 300.0;

/// Emitted by [`Countdown::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownEvent {
    /// The countdown reached zero and has been reset.
    Completed,
}

/// A pausable countdown.
///
/// Seconds are kept as `f64` so long countdowns do not drift when advanced
/// in small steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    duration: f64,
    remaining: f64,
    running: bool,
}

impl Countdown {
    /// Paused countdown of `seconds`. Negative or non-finite values become zero.
    pub fn new(seconds: f64) -> Self {
        let duration = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        Self {
            duration,
            remaining: duration,
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            info!(remaining = self.remaining, "countdown started");
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Pause and go back to the configured duration.
    pub fn reset(&mut self) {
        self.pause();
        self.remaining = self.duration;
    }

    /// Pause and load a custom time. The configured duration is unchanged,
    /// so a later reset returns to it.
    pub fn set_custom_time(&mut self, hours: u32, minutes: u32) {
        self.pause();
        self.remaining = f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0;
    }

    /// Count down by `dt` seconds while running.
    ///
    /// On reaching zero the countdown resets and reports completion once.
    pub fn advance(&mut self, dt: f64) -> Option<CountdownEvent> {
        if !self.running || !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        if self.remaining - dt <= 0.0 {
            self.reset();
            info!("countdown completed");
            return Some(CountdownEvent::Completed);
        }
        self.remaining -= dt;
        None
    }

    /// Seconds left.
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `HH:MM:SS` with an hour or more left, `MM:SS.d` otherwise.
    pub fn display(&self) -> String {
        let whole = self.remaining as u64;
        let hours = whole / 3600;
        let minutes = (whole % 3600) / 60;
        let seconds = whole % 60;
        let tenths = (self.remaining.fract() * 10.0) as u64;
        if hours > 0 {
            format!("{hours:02}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes:02}:{seconds:02}.{tenths}")
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
