//! A single simulated particle.
//!
//! An [`Entity`] is plain data plus one operation, [`Entity::integrate`],
//! which advances it by one tick. Entities never look at each other.

use crate::bounds::Bounds;
use crate::random::RandomSource;
use crate::rules::Rule;
use crate::tween::Tween;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier, unique among the live entities of a store.
///
/// Stores hand out ids from a monotonic counter and never reuse them, so a
/// respawned entity always gets a fresh id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Visual shape hint for the renderer. Not interpreted by the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    #[default]
    Circle,
    Ring,
    Square,
    Star,
    /// Thin bar, as used for sparkle rays.
    Ray,
}

impl Shape {
    /// Stable index for GPU instance data.
    pub fn index(self) -> u32 {
        match self {
            Shape::Circle => 0,
            Shape::Ring => 1,
            Shape::Square => 2,
            Shape::Star => 3,
            Shape::Ray => 4,
        }
    }
}

/// One particle, snowflake, ripple or ray.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    id: EntityId,
    /// Current position.
    pub position: Vec2,
    /// Units per second. Zero for purely tweened entities.
    pub velocity: Vec2,
    /// Base diameter in units.
    pub size: f32,
    /// Visual size multiplier.
    pub scale: f32,
    /// In `[0, 1]`.
    pub opacity: f32,
    /// RGB, 0.0-1.0.
    pub color: Vec3,
    pub shape: Shape,
    /// Seconds until lifetime expiry. `f32::INFINITY` for unbounded entities.
    pub remaining_lifetime: f32,
    /// Seconds since spawn.
    pub age: f32,
    /// Where the entity was spawned.
    pub origin: Vec2,
    /// Unit direction used for tweened radial offsets.
    pub heading: Vec2,
    pub tween: Option<Tween>,
}

impl Entity {
    /// Entity at rest with neutral visual attributes and unbounded lifetime.
    pub fn new(id: EntityId, position: Vec2) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            size: 10.0,
            scale: 1.0,
            opacity: 1.0,
            color: Vec3::ONE,
            shape: Shape::Circle,
            remaining_lifetime: f32::INFINITY,
            age: 0.0,
            origin: position,
            heading: Vec2::X,
            tween: None,
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_lifetime(mut self, seconds: f32) -> Self {
        self.remaining_lifetime = seconds;
        self
    }

    pub fn with_tween(mut self, tween: Tween) -> Self {
        self.tween = Some(tween);
        self
    }

    /// Rendered diameter: `size * scale`.
    #[inline]
    pub fn visual_size(&self) -> f32 {
        self.size * self.scale
    }

    /// Advance this entity by one tick of `dt` seconds.
    ///
    /// Order of operations:
    /// 1. `position += velocity * dt` using the velocity from before the tick
    /// 2. each rule in order (forces, walls, decay)
    /// 3. age and remaining lifetime advance by `dt`
    /// 4. an attached tween overwrites its animated properties
    /// 5. size, scale and opacity are floored at zero, opacity capped at one
    ///
    /// Mutates nothing but this entity; the only other input is `random`,
    /// which jitter rules draw from.
    pub fn integrate(
        &mut self,
        bounds: &Bounds,
        dt: f32,
        rules: &[Rule],
        random: &mut dyn RandomSource,
    ) {
        self.position += self.velocity * dt;

        for rule in rules {
            rule.apply(self, bounds, dt, random);
        }

        self.age += dt;
        self.remaining_lifetime -= dt;

        if let Some(tween) = &self.tween {
            let frame = tween.sample(self.age);
            if let Some(size) = frame.size {
                self.size = size;
            }
            if let Some(scale) = frame.scale {
                self.scale = scale;
            }
            if let Some(opacity) = frame.opacity {
                self.opacity = opacity;
            }
            if let Some(offset) = frame.offset {
                self.position = self.origin + self.heading * offset;
            }
        }

        self.size = self.size.max(0.0);
        self.scale = self.scale.max(0.0);
        self.opacity = self.opacity.clamp(0.0, 1.0);
    }
}
