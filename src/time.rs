//! Tick sources.
//!
//! A [`TickSource`] hands out one time step per tick until it is stopped.
//! [`FixedStep`] is deterministic and suited to tests and headless runs;
//! [`FrameClock`] measures wall-clock time between frames.
//!
//! # Example
//!
//! ```ignore
//! use flurry::time::FrameClock;
//!
//! let mut clock = FrameClock::new().with_max_delta(Some(0.1));
//!
//! // In your frame loop:
//! let dt = clock.update();
//! store.tick(dt, &bounds);
//!
//! println!("Frame {} at {:.1} fps", clock.frame(), clock.fps());
//! ```

use std::time::Instant;

/// Periodic or frame-synchronized signal that drives ticks.
pub trait TickSource {
    /// Seconds to advance on the next tick, or `None` once stopped.
    fn next_delta(&mut self) -> Option<f32>;

    /// Stop producing ticks. Idempotent.
    fn stop(&mut self);

    fn is_stopped(&self) -> bool;
}

impl<T: TickSource + ?Sized> TickSource for Box<T> {
    fn next_delta(&mut self) -> Option<f32> {
        (**self).next_delta()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_stopped(&self) -> bool {
        (**self).is_stopped()
    }
}

/// Constant time step, optionally for a fixed number of ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedStep {
    dt: f32,
    remaining: Option<u64>,
    stopped: bool,
}

impl FixedStep {
    /// Endless source of `dt`-second steps.
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            remaining: None,
            stopped: false,
        }
    }

    /// 60 steps per simulated second.
    pub fn hz60() -> Self {
        Self::new(1.0 / 60.0)
    }

    /// Stop by itself after `ticks` steps.
    pub fn limited(dt: f32, ticks: u64) -> Self {
        Self {
            dt,
            remaining: Some(ticks),
            stopped: false,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Steps left before the source stops itself, if limited.
    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }
}

impl TickSource for FixedStep {
    fn next_delta(&mut self) -> Option<f32> {
        if self.stopped {
            return None;
        }
        if let Some(left) = self.remaining.as_mut() {
            if *left == 0 {
                self.stopped = true;
                return None;
            }
            *left -= 1;
        }
        Some(self.dt)
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }
}

/// Longest single step a [`FrameClock`] hands out by default, in seconds.
pub const DEFAULT_MAX_DELTA: f32 = 0.25;

/// Weight of the newest frame in the FPS moving average.
const FPS_SMOOTHING: f32 = 0.1;

/// Wall-clock frame timing as a tick source.
///
/// Each [`update`](FrameClock::update) measures the time since the previous
/// one, caps it at the maximum delta, then applies the time scale. The cap
/// keeps a frame that follows a long suspend from arriving as one huge
/// step. Time spent paused is never handed out.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last_frame: Instant,
    delta: f32,
    frames: u64,
    /// Moving average over measured (unscaled) frame times.
    fps: f32,
    paused: bool,
    /// Replaces measured deltas when set.
    fixed_delta: Option<f32>,
    max_delta: Option<f32>,
    /// 1.0 = normal speed.
    time_scale: f32,
    stopped: bool,
}

impl FrameClock {
    /// Clock measuring from now, capped at [`DEFAULT_MAX_DELTA`].
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: 0.0,
            frames: 0,
            fps: 0.0,
            paused: false,
            fixed_delta: None,
            max_delta: Some(DEFAULT_MAX_DELTA),
            time_scale: 1.0,
            stopped: false,
        }
    }

    /// Cap on a single delta before scaling. `None` hands out whatever was
    /// measured.
    pub fn with_max_delta(mut self, max: Option<f32>) -> Self {
        self.max_delta = max.map(|m| m.max(0.0));
        self
    }

    /// Measure the frame that just ended and return the step to simulate.
    ///
    /// Zero while paused.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let measured = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.paused {
            self.delta = 0.0;
            return 0.0;
        }

        if measured > 0.0 {
            let instant_fps = 1.0 / measured;
            self.fps = if self.frames == 0 {
                instant_fps
            } else {
                self.fps + (instant_fps - self.fps) * FPS_SMOOTHING
            };
        }
        self.frames += 1;

        let raw = self.fixed_delta.unwrap_or(measured);
        let capped = self.max_delta.map_or(raw, |max| raw.min(max));
        self.delta = capped * self.time_scale;
        self.delta
    }

    /// Step returned by the last update.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Unpaused frames measured so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frames
    }

    /// Smoothed frames per second of wall-clock time.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn max_delta(&self) -> Option<f32> {
        self.max_delta
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume without handing out the paused span.
    pub fn resume(&mut self) {
        if self.paused {
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Use a constant delta instead of measured frame time. `None` restores
    /// real timing. The maximum delta still applies.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.map(|d| d.max(0.0));
    }

    /// Negative or non-finite scales become zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    /// Forget measured frames and unpause. Settings are kept and a stopped
    /// clock stays stopped.
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.delta = 0.0;
        self.frames = 0;
        self.fps = 0.0;
        self.paused = false;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for FrameClock {
    fn next_delta(&mut self) -> Option<f32> {
        if self.stopped {
            return None;
        }
        Some(self.update())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fixed_step_limited() {
        let mut source = FixedStep::limited(0.25, 2);
        assert_eq!(source.next_delta(), Some(0.25));
        assert_eq!(source.next_delta(), Some(0.25));
        assert_eq!(source.next_delta(), None);
        assert!(source.is_stopped());
    }

    #[test]
    fn test_fixed_step_stop() {
        let mut source = FixedStep::hz60();
        assert!(source.next_delta().is_some());
        source.stop();
        assert_eq!(source.next_delta(), None);
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn TickSource> = Box::new(FixedStep::limited(0.1, 1));
        assert_eq!(source.next_delta(), Some(0.1));
        assert_eq!(source.next_delta(), None);
    }

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert!(!clock.is_paused());
        assert_eq!(clock.time_scale(), 1.0);
        assert_eq!(clock.max_delta(), Some(DEFAULT_MAX_DELTA));
    }

    #[test]
    fn test_clock_update() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let delta = clock.update();

        assert!(delta > 0.0);
        assert_eq!(clock.delta(), delta);
        assert_eq!(clock.frame(), 1);
        assert!(clock.fps() > 0.0);
    }

    #[test]
    fn test_clock_pause_hands_out_nothing() {
        let mut clock = FrameClock::new();
        clock.update();

        clock.pause();
        assert!(clock.is_paused());
        thread::sleep(Duration::from_millis(10));
        assert_eq!(clock.next_delta(), Some(0.0));
        assert_eq!(clock.frame(), 1);

        thread::sleep(Duration::from_millis(60));
        clock.toggle_pause();
        assert!(!clock.is_paused());
        assert!(clock.update() < 0.05);
    }

    #[test]
    fn test_clock_caps_long_frames() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(3600.0));
        assert_eq!(clock.update(), DEFAULT_MAX_DELTA);

        let mut uncapped = FrameClock::new().with_max_delta(None);
        uncapped.set_fixed_delta(Some(3600.0));
        assert_eq!(uncapped.update(), 3600.0);
    }

    #[test]
    fn test_clock_scale() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(0.1));
        clock.set_time_scale(2.0);
        assert_eq!(clock.time_scale(), 2.0);
        assert!((clock.update() - 0.2).abs() < 1e-6);

        clock.set_time_scale(-1.0);
        assert_eq!(clock.time_scale(), 0.0);
        clock.set_time_scale(f32::NAN);
        assert_eq!(clock.time_scale(), 0.0);
    }

    #[test]
    fn test_clock_fixed_delta() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(1.0 / 60.0));

        thread::sleep(Duration::from_millis(50));
        let delta = clock.update();
        assert!((delta - 1.0 / 60.0).abs() < 0.0001);
    }

    #[test]
    fn test_clock_reset_keeps_stop_and_settings() {
        let mut clock = FrameClock::new();
        clock.set_time_scale(0.5);
        clock.update();
        clock.stop();

        clock.reset();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.time_scale(), 0.5);
        assert!(clock.is_stopped());
        assert_eq!(clock.next_delta(), None);
    }

    #[test]
    fn test_clock_stop() {
        let mut clock = FrameClock::new();
        clock.stop();
        assert_eq!(clock.next_delta(), None);
    }
}
