//! TOML configuration.
//!
//! Every option is optional; a missing key takes the neutral default.
//!
//! ```toml
//! fixed-dt = 0.016
//! seed = 7
//! velocity-range = { min = [-10.0, -10.0], max = [10.0, 10.0] }
//! size-range = { min = 4.0, max = 80.0 }
//! gravity = [0.0, 9.8]
//! boundary-restitution = 0.8
//! opacity-decay-rate = 0.99
//! scale-decay-rate = 0.995
//! max-entity-count = 2000
//! overflow = "evict-oldest"
//! expiry-policy = { kind = "opacity-threshold", threshold = 0.1 }
//!
//! [bounds]
//! width = 400.0
//! height = 400.0
//! ```

use crate::bounds::Bounds;
use crate::emitter::Emitter;
use crate::error::ConfigError;
use crate::lifecycle::ExpiryPolicy;
use crate::random::{RandomSource, SeededRandom};
use crate::rules::Dynamics;
use crate::simulation::Simulation;
use crate::spawn::{ColorSpec, ShapeSpec, Span, SpawnConfig, VelocitySpec};
use crate::store::{Capacity, Overflow};
use crate::time::FixedStep;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Simulation area as origin plus size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        let b = Bounds::default();
        Self {
            x: b.min.x,
            y: b.min.y,
            width: b.width(),
            height: b.height(),
        }
    }
}

impl From<BoundsConfig> for Bounds {
    fn from(c: BoundsConfig) -> Self {
        Bounds::new(c.x, c.y, c.width, c.height)
    }
}

/// Per-axis range for initial velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityRange {
    pub min: Vec2,
    pub max: Vec2,
}

/// Everything needed to build and drive a simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SimConfig {
    pub bounds: BoundsConfig,
    /// Seconds per tick for headless runs.
    pub fixed_dt: f32,
    /// Seed for reproducible runs. Entropy when absent.
    pub seed: Option<u64>,

    pub velocity_range: VelocityRange,
    pub size_range: Span,
    /// Seconds. Absent means entities never expire by lifetime.
    pub lifetime_range: Option<Span>,
    pub color: ColorSpec,
    pub shape: ShapeSpec,

    pub gravity: Vec2,
    pub drag: f32,
    pub jitter: Vec2,
    pub boundary_restitution: Option<f32>,
    pub wrap: bool,
    pub opacity_decay_rate: f32,
    pub scale_decay_rate: f32,

    pub max_entity_count: Option<usize>,
    pub overflow: Overflow,
    #[serde(alias = "expiry")]
    pub expiry_policy: ExpiryPolicy,
    pub emitters: Vec<Emitter>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let dynamics = Dynamics::default();
        Self {
            bounds: BoundsConfig::default(),
            fixed_dt: 1.0 / 60.0,
            seed: None,
            velocity_range: VelocityRange::default(),
            size_range: Span::fixed(10.0),
            lifetime_range: None,
            color: ColorSpec::default(),
            shape: ShapeSpec::default(),
            gravity: dynamics.gravity,
            drag: dynamics.drag,
            jitter: dynamics.jitter,
            boundary_restitution: dynamics.boundary_restitution,
            wrap: dynamics.wrap,
            opacity_decay_rate: dynamics.opacity_decay_rate,
            scale_decay_rate: dynamics.scale_decay_rate,
            max_entity_count: None,
            overflow: Overflow::default(),
            expiry_policy: ExpiryPolicy::default(),
            emitters: Vec::new(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read, parse and validate a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !Bounds::from(self.bounds).is_valid() {
            return Err(ConfigError::invalid(
                "bounds",
                "width and height must be positive and finite",
            ));
        }
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(ConfigError::invalid(
                "fixed-dt",
                format!("must be a positive number of seconds, got {}", self.fixed_dt),
            ));
        }
        self.spawn_config().validate()?;
        self.dynamics().validate()?;
        self.capacity().validate()?;
        self.expiry_policy.validate()?;
        self.emitters.iter().try_for_each(Emitter::validate)
    }

    pub fn dynamics(&self) -> Dynamics {
        Dynamics {
            gravity: self.gravity,
            drag: self.drag,
            jitter: self.jitter,
            boundary_restitution: self.boundary_restitution,
            wrap: self.wrap,
            opacity_decay_rate: self.opacity_decay_rate,
            scale_decay_rate: self.scale_decay_rate,
        }
    }

    pub fn capacity(&self) -> Capacity {
        Capacity {
            max: self.max_entity_count,
            overflow: self.overflow,
        }
    }

    /// Template for touch spawns and respawns.
    pub fn spawn_config(&self) -> SpawnConfig {
        SpawnConfig {
            velocity: VelocitySpec::Components {
                x: Span::new(self.velocity_range.min.x, self.velocity_range.max.x),
                y: Span::new(self.velocity_range.min.y, self.velocity_range.max.y),
            },
            size: self.size_range,
            lifetime: self.lifetime_range,
            color: self.color.clone(),
            shape: self.shape.clone(),
            ..SpawnConfig::default()
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds.into()
    }

    /// Tick source stepping `fixed-dt` seconds at a time.
    pub fn tick_source(&self) -> FixedStep {
        FixedStep::new(self.fixed_dt)
    }

    /// Seeded generator when `seed` is set, otherwise entropy.
    pub fn random(&self) -> SeededRandom {
        self.seed.map_or_else(SeededRandom::from_entropy, SeededRandom::new)
    }

    /// Builder carrying every option, with `random` as the generator.
    pub fn into_simulation<R: RandomSource + 'static>(self, random: R) -> Simulation {
        let mut sim = Simulation::new()
            .with_bounds(self.bounds())
            .with_dynamics(&self.dynamics())
            .with_expiry(self.expiry_policy)
            .with_capacity(self.capacity())
            .with_respawn_template(self.spawn_config())
            .with_random(random);
        for emitter in self.emitters {
            sim = sim.with_emitter(emitter);
        }
        sim
    }
}
