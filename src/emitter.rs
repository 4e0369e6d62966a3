//! Emitters for tick-driven spawning.
//!
//! Emitters are owned by the store and advanced at the start of every
//! accepted tick, so a whole effect runs off one shared clock instead of one
//! timer per object.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Emitter::Periodic`] | `count` entities every `interval` seconds |
//! | [`Emitter::Burst`] | `count` entities once, on the next tick |
//!
//! # Example
//!
//! ```ignore
//! // Snowfall: one flake above the top edge every half second.
//! .with_emitter(Emitter::periodic(0.5, 1, Placement::AboveTop, flake))
//! ```

use crate::bounds::Bounds;
use crate::entity::Entity;
use crate::error::ConfigError;
use crate::random::RandomSource;
use crate::spawn::SpawnConfig;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Upper bound on periodic rounds spawned by a single [`Emitter::advance`].
pub const MAX_CATCH_UP_ROUNDS: usize = 64;

/// Where emitted entities appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// At a fixed point.
    Point(Vec2),
    /// Just above the top edge, fully hidden: `y = min.y - size`, `x`
    /// uniform across the width.
    #[default]
    AboveTop,
    /// Uniformly inside the bounds.
    InBounds,
}

impl Placement {
    /// Point new entities are sampled at before [`place`](Self::place).
    pub fn anchor(&self, bounds: &Bounds) -> Vec2 {
        match *self {
            Placement::Point(p) => p,
            Placement::AboveTop | Placement::InBounds => bounds.center(),
        }
    }

    /// Move a freshly sampled entity into position. Also resets its origin.
    pub fn place(&self, entity: &mut Entity, bounds: &Bounds, random: &mut dyn RandomSource) {
        let position = match *self {
            Placement::Point(p) => p,
            Placement::AboveTop => Vec2::new(
                random.range(bounds.min.x, bounds.max.x),
                bounds.min.y - entity.size,
            ),
            Placement::InBounds => Vec2::new(
                random.range(bounds.min.x, bounds.max.x),
                random.range(bounds.min.y, bounds.max.y),
            ),
        };
        entity.position = position;
        entity.origin = position;
    }
}

/// A spawn timer owned by the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Emitter {
    /// Spawn `count` entities every `interval` seconds.
    Periodic {
        /// Seconds between spawns.
        interval: f32,
        count: usize,
        #[serde(default)]
        placement: Placement,
        #[serde(default)]
        spawn: SpawnConfig,
        /// Time accumulated toward the next spawn.
        #[serde(skip)]
        elapsed: f32,
    },

    /// Spawn `count` entities at `origin` on the next tick, then go idle.
    Burst {
        origin: Vec2,
        count: usize,
        #[serde(default)]
        spawn: SpawnConfig,
        #[serde(skip)]
        fired: bool,
    },
}

impl Emitter {
    pub fn periodic(interval: f32, count: usize, placement: Placement, spawn: SpawnConfig) -> Self {
        Emitter::Periodic {
            interval,
            count,
            placement,
            spawn,
            elapsed: 0.0,
        }
    }

    pub fn burst(origin: Vec2, count: usize, spawn: SpawnConfig) -> Self {
        Emitter::Burst {
            origin,
            count,
            spawn,
            fired: false,
        }
    }

    /// Advance the timer by `dt` and return how many entities are due.
    ///
    /// A periodic emitter catches up on the intervals that elapsed, so a
    /// long frame spawns several rounds at once. At most
    /// [`MAX_CATCH_UP_ROUNDS`] rounds are spawned per call; the rest of a
    /// very long frame is dropped.
    pub fn advance(&mut self, dt: f32) -> usize {
        match self {
            Emitter::Periodic {
                interval,
                count,
                elapsed,
                ..
            } => {
                if !(*interval > 0.0 && interval.is_finite()) || !dt.is_finite() || dt <= 0.0 {
                    return 0;
                }
                *elapsed += dt;
                if *elapsed < *interval {
                    return 0;
                }
                let rounds = (*elapsed / *interval).floor();
                *elapsed %= *interval;
                // Float-to-int casts saturate.
                let rounds = (rounds as usize).min(MAX_CATCH_UP_ROUNDS);
                count.saturating_mul(rounds)
            }
            Emitter::Burst { count, fired, .. } => {
                if *fired {
                    0
                } else {
                    *fired = true;
                    *count
                }
            }
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Emitter::Periodic { placement, .. } => *placement,
            Emitter::Burst { origin, .. } => Placement::Point(*origin),
        }
    }

    pub fn spawn_config(&self) -> &SpawnConfig {
        match self {
            Emitter::Periodic { spawn, .. } | Emitter::Burst { spawn, .. } => spawn,
        }
    }

    /// Whether this emitter will never spawn again.
    pub fn is_spent(&self) -> bool {
        matches!(self, Emitter::Burst { fired: true, .. })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Emitter::Periodic { interval, .. } = self {
            if !(interval.is_finite() && *interval > 0.0) {
                return Err(ConfigError::invalid(
                    "emitter.interval",
                    format!("must be a positive number of seconds, got {interval}"),
                ));
            }
        }
        if let Emitter::Burst { origin, .. } = self {
            if !origin.is_finite() {
                return Err(ConfigError::invalid("emitter.origin", "must be finite"));
            }
        }
        self.spawn_config().validate()
    }
}
