//! Ready-made effects.
//!
//! An [`Effect`] bundles a touch spawn template, physics, expiry, capacity
//! and emitters. Touch-driven effects spawn through [`Effect::touch`];
//! the rest are fully emitter-driven and start on the first tick.
//!
//! ```ignore
//! let effect = Effect::explosion();
//! let mut store = effect.simulation().build()?;
//! effect.touch(&mut store, Vec2::new(120.0, 300.0));
//! ```

use crate::bounds::Bounds;
use crate::emitter::{Emitter, Placement};
use crate::entity::Shape;
use crate::error::ConfigError;
use crate::lifecycle::ExpiryPolicy;
use crate::rules::Dynamics;
use crate::simulation::Simulation;
use crate::spawn::{ColorSpec, ShapeSpec, Span, SpawnConfig, VelocitySpec};
use crate::store::{Capacity, ParticleStore, SpawnReport};
use crate::tween::{Easing, Repeat, Tween};
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Ticks per second the per-tick constants below were tuned at.
const TUNED_HZ: f32 = 60.0;

const YELLOW: Vec3 = Vec3::new(1.0, 1.0, 0.0);
const BLUE: Vec3 = Vec3::new(0.0, 0.0, 1.0);
const VIOLET: Vec3 = Vec3::new(0.4, 0.2, 0.9);

/// A complete effect preset.
#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    name: &'static str,
    /// Entities per touch. Zero for effects that run without input.
    pub touch_count: usize,
    pub touch_spawn: SpawnConfig,
    pub dynamics: Dynamics,
    pub expiry: ExpiryPolicy,
    pub capacity: Capacity,
    pub emitters: Vec<Emitter>,
    /// Template for respawned entities.
    pub respawn: SpawnConfig,
}

impl Effect {
    /// Names accepted by [`Effect::by_name`].
    pub const NAMES: &'static [&'static str] = &[
        "explosion",
        "playground",
        "snowfall",
        "ripple",
        "orbit",
        "sparkle",
        "pulse",
    ];

    fn base(name: &'static str) -> Self {
        Self {
            name,
            touch_count: 0,
            touch_spawn: SpawnConfig::default(),
            dynamics: Dynamics::default(),
            expiry: ExpiryPolicy::Lifetime,
            capacity: Capacity::UNBOUNDED,
            emitters: Vec::new(),
            respawn: SpawnConfig::default(),
        }
    }

    /// Look up a preset. Position-based presets center on `bounds`.
    pub fn by_name(name: &str, bounds: &Bounds) -> Option<Self> {
        let center = bounds.center();
        let radius = bounds.width().min(bounds.height()) * 0.375;
        match name {
            "explosion" => Some(Self::explosion()),
            "playground" => Some(Self::playground()),
            "snowfall" => Some(Self::snowfall()),
            "ripple" => Some(Self::ripple()),
            "orbit" => Some(Self::orbit_bubbles(center, radius, 12)),
            "sparkle" => Some(Self::sparkle(center)),
            "pulse" => Some(Self::pulse_rings(center)),
            _ => None,
        }
    }

    /// Colorful shards flung from every touch, gone after five seconds.
    pub fn explosion() -> Self {
        Self {
            touch_count: 10,
            touch_spawn: SpawnConfig::new()
                .with_velocity(VelocitySpec::Components {
                    x: Span::new(-50.0, 500.0),
                    y: Span::new(-50.0, 500.0),
                })
                .with_size(Span::new(4.0, 80.0))
                .with_color(ColorSpec::Channels {
                    min: Vec3::splat(0.5),
                    max: Vec3::ONE,
                })
                .with_lifetime(Span::fixed(5.0)),
            capacity: Capacity::evict_above(5_000),
            ..Self::base("explosion")
        }
    }

    /// Bouncing, fading balls under gravity with a little sideways jitter.
    pub fn playground() -> Self {
        // 0.15 units/tick² of gravity and ±0.5 units/tick of jitter at 60 Hz.
        let dynamics = Dynamics {
            gravity: Vec2::new(0.0, 0.15 * TUNED_HZ * TUNED_HZ),
            jitter: Vec2::new(0.5 * TUNED_HZ, 0.0),
            boundary_restitution: Some(0.8),
            opacity_decay_rate: 0.99,
            scale_decay_rate: 0.995,
            ..Dynamics::default()
        };
        Self {
            touch_count: 5,
            touch_spawn: SpawnConfig::new()
                .with_velocity(VelocitySpec::Components {
                    x: Span::new(-300.0, 300.0),
                    y: Span::new(-300.0, 300.0),
                })
                .with_size(Span::new(10.0, 20.0))
                .with_color(ColorSpec::RandomHue {
                    saturation: 0.8,
                    value: 1.0,
                }),
            dynamics,
            expiry: ExpiryPolicy::opacity_below(0.1),
            capacity: Capacity::evict_above(2_000),
            ..Self::base("playground")
        }
    }

    /// White flakes falling from above the top edge, recycled at the bottom.
    pub fn snowfall() -> Self {
        let flake = SpawnConfig::new()
            .with_velocity(VelocitySpec::Components {
                x: Span::fixed(0.0),
                y: Span::new(140.0, 180.0),
            })
            .with_size(Span::new(5.0, 15.0));
        Self {
            emitters: vec![Emitter::periodic(0.5, 1, Placement::AboveTop, flake.clone())],
            expiry: ExpiryPolicy::respawn(),
            capacity: Capacity::reject_above(60),
            respawn: flake,
            ..Self::base("snowfall")
        }
    }

    /// A blue ring per tap: grows to 200, shrinks and fades over one second.
    pub fn ripple() -> Self {
        let tween = Tween::new(1.0)
            .easing(Easing::EaseOut)
            .size(0.0, 200.0)
            .scale(1.0, 0.0)
            .opacity(1.0, 0.0);
        Self {
            touch_count: 1,
            touch_spawn: SpawnConfig::new()
                .with_color(ColorSpec::Fixed { rgb: BLUE })
                .with_lifetime(Span::fixed(1.0))
                .with_tween(tween),
            capacity: Capacity::evict_above(64),
            ..Self::base("ripple")
        }
    }

    /// `count` bubbles on a circle, pulsing in sequence 0.2 s apart.
    pub fn orbit_bubbles(center: Vec2, radius: f32, count: usize) -> Self {
        let emitters = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * TAU;
                let tween = Tween::new(2.0)
                    .delay(i as f32 * 0.2)
                    .easing(Easing::EaseInOut)
                    .repeat(Repeat::PingPong)
                    .scale(0.5, 1.5)
                    .opacity(0.7, 0.0);
                let bubble = SpawnConfig::new()
                    .with_color(ColorSpec::Fixed { rgb: BLUE })
                    .with_tween(tween);
                Emitter::burst(center + Vec2::from_angle(angle) * radius, 1, bubble)
            })
            .collect();
        Self {
            emitters,
            capacity: Capacity::reject_above(count.max(1)),
            ..Self::base("orbit")
        }
    }

    /// Yellow core with eight rays shooting out at 45° steps, pulsing forever.
    pub fn sparkle(center: Vec2) -> Self {
        let pulse = Tween::new(1.0)
            .easing(Easing::EaseInOut)
            .repeat(Repeat::PingPong);
        let core = SpawnConfig::new()
            .with_size(Span::fixed(20.0))
            .with_color(ColorSpec::Fixed { rgb: YELLOW })
            .with_tween(pulse.clone().scale(1.0, 0.5).opacity(1.0, 0.0));
        let rays = SpawnConfig::new()
            .with_velocity(VelocitySpec::Fan {
                speed: Span::fixed(0.0),
                start_angle: 0.0,
            })
            .with_color(ColorSpec::Fixed { rgb: YELLOW })
            .with_shape(ShapeSpec::Fixed { shape: Shape::Ray })
            .with_tween(pulse.offset(0.0, 30.0).opacity(1.0, 0.0));
        Self {
            emitters: vec![
                Emitter::burst(center, 1, core),
                Emitter::burst(center, 8, rays),
            ],
            capacity: Capacity::reject_above(9),
            ..Self::base("sparkle")
        }
    }

    /// Five concentric rings breathing around a glowing core.
    pub fn pulse_rings(center: Vec2) -> Self {
        let breathe = Tween::new(3.0)
            .easing(Easing::EaseInOut)
            .repeat(Repeat::PingPong);
        let mut emitters: Vec<Emitter> = (0..5)
            .map(|i| {
                let i = i as f32;
                let ring = SpawnConfig::new()
                    .with_size(Span::fixed(200.0))
                    .with_color(ColorSpec::Choice {
                        colors: vec![
                            VIOLET,
                            Vec3::new(0.9, 0.3, 0.5),
                            Vec3::new(0.2, 0.8, 0.7),
                        ],
                    })
                    .with_shape(ShapeSpec::Fixed { shape: Shape::Ring })
                    .with_tween(
                        breathe
                            .clone()
                            .scale(0.2, 1.5 + i * 0.2)
                            .opacity(0.0, 0.8 - i * 0.15),
                    );
                Emitter::burst(center, 1, ring)
            })
            .collect();
        let core = SpawnConfig::new()
            .with_size(Span::fixed(50.0))
            .with_color(ColorSpec::Fixed { rgb: VIOLET })
            .with_tween(breathe.scale(0.8, 1.2));
        emitters.push(Emitter::burst(center, 1, core));
        Self {
            emitters,
            capacity: Capacity::reject_above(6),
            ..Self::base("pulse")
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the effect needs input to produce anything.
    pub fn is_touch_driven(&self) -> bool {
        self.touch_count > 0
    }

    /// Builder configured with this effect. Add bounds and randomness as needed.
    pub fn simulation(&self) -> Simulation {
        let mut sim = Simulation::new()
            .with_dynamics(&self.dynamics)
            .with_expiry(self.expiry)
            .with_capacity(self.capacity)
            .with_respawn_template(self.respawn.clone());
        for emitter in &self.emitters {
            sim = sim.with_emitter(emitter.clone());
        }
        sim
    }

    /// Spawn one touch worth of entities at `at`.
    pub fn touch(&self, store: &mut ParticleStore, at: Vec2) -> SpawnReport {
        store.spawn(at, self.touch_count, &self.touch_spawn)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.touch_spawn.validate()?;
        self.dynamics.validate()?;
        self.expiry.validate()?;
        self.capacity.validate()?;
        self.respawn.validate()?;
        self.emitters.iter().try_for_each(Emitter::validate)
    }
}
