//! Elapsed-time animation for entities that do not move by integration.
//!
//! Ripples, pulsing bubbles and sparkle rays are driven by their age rather
//! than by velocity. A [`Tween`] maps an entity's age to size, scale,
//! opacity and a radial offset along the entity's heading.
//!
//! # Example
//!
//! ```ignore
//! // Ripple: grow to 200, shrink the scale and fade out over one second.
//! let ripple = Tween::new(1.0)
//!     .easing(Easing::EaseOut)
//!     .size(0.0, 200.0)
//!     .scale(1.0, 0.0)
//!     .opacity(1.0, 0.0);
//! ```

use serde::{Deserialize, Serialize};

/// Interpolation curve applied to normalized tween progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    /// Quadratic, slow start.
    EaseIn,
    /// Quadratic, slow end.
    EaseOut,
    /// Quadratic on both ends.
    EaseInOut,
}

impl Easing {
    /// Map `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
        }
    }
}

/// What happens once a tween reaches its end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Repeat {
    /// Hold the final value.
    #[default]
    Once,
    /// Jump back to the start and play again.
    Loop,
    /// Play forward then backward, forever.
    PingPong,
}

/// Start and end value of one animated property.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub from: f32,
    pub to: f32,
}

impl Ramp {
    pub const fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn at(&self, t: f32) -> f32 {
        self.from + (self.to - self.from) * t
    }
}

/// Animated property values for one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TweenFrame {
    pub size: Option<f32>,
    pub scale: Option<f32>,
    pub opacity: Option<f32>,
    pub offset: Option<f32>,
}

/// Age-driven animation of size, scale, opacity and radial offset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tween {
    /// Length of one pass in seconds.
    pub duration: f32,
    /// Seconds of age before the first pass starts.
    pub delay: f32,
    pub easing: Easing,
    pub repeat: Repeat,
    pub size: Option<Ramp>,
    pub scale: Option<Ramp>,
    pub opacity: Option<Ramp>,
    /// Distance from the spawn origin along the entity's heading.
    pub offset: Option<Ramp>,
}

impl Default for Tween {
    fn default() -> Self {
        Self {
            duration: 1.0,
            delay: 0.0,
            easing: Easing::Linear,
            repeat: Repeat::Once,
            size: None,
            scale: None,
            opacity: None,
            offset: None,
        }
    }
}

impl Tween {
    /// Empty tween of the given duration; add properties with the builder methods.
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn size(mut self, from: f32, to: f32) -> Self {
        self.size = Some(Ramp::new(from, to));
        self
    }

    pub fn scale(mut self, from: f32, to: f32) -> Self {
        self.scale = Some(Ramp::new(from, to));
        self
    }

    pub fn opacity(mut self, from: f32, to: f32) -> Self {
        self.opacity = Some(Ramp::new(from, to));
        self
    }

    pub fn offset(mut self, from: f32, to: f32) -> Self {
        self.offset = Some(Ramp::new(from, to));
        self
    }

    /// Eased progress in `[0, 1]` for an entity of the given age.
    pub fn progress(&self, age: f32) -> f32 {
        let local = age - self.delay;
        if local <= 0.0 {
            return 0.0;
        }
        if self.duration <= 0.0 {
            return self.easing.apply(1.0);
        }

        let raw = local / self.duration;
        let t = match self.repeat {
            Repeat::Once => raw.min(1.0),
            Repeat::Loop => raw.fract(),
            Repeat::PingPong => {
                let cycle = raw % 2.0;
                if cycle > 1.0 {
                    2.0 - cycle
                } else {
                    cycle
                }
            }
        };
        self.easing.apply(t)
    }

    /// Property values at `age`.
    pub fn sample(&self, age: f32) -> TweenFrame {
        let t = self.progress(age);
        TweenFrame {
            size: self.size.map(|r| r.at(t)),
            scale: self.scale.map(|r| r.at(t)),
            opacity: self.opacity.map(|r| r.at(t)),
            offset: self.offset.map(|r| r.at(t)),
        }
    }

    /// Whether a one-shot tween has finished at `age`.
    pub fn is_finished(&self, age: f32) -> bool {
        self.repeat == Repeat::Once && age >= self.delay + self.duration
    }

    pub(crate) fn validate(&self) -> Result<(), crate::ConfigError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(crate::ConfigError::invalid(
                "tween.duration",
                format!("must be a positive number of seconds, got {}", self.duration),
            ));
        }
        if !(self.delay.is_finite() && self.delay >= 0.0) {
            return Err(crate::ConfigError::invalid(
                "tween.delay",
                format!("must be zero or positive, got {}", self.delay),
            ));
        }
        Ok(())
    }
}
