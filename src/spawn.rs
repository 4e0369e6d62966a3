//! Spawn templates and the context used to sample them.
//!
//! A [`SpawnConfig`] describes the ranges new entities are drawn from.
//! Sampling goes through a [`SpawnContext`], which carries the spawn index
//! and origin alongside the store's random source and offers the usual
//! helpers (random ranges, indices, hues).
//!
//! ```ignore
//! // Explosion shards: 10 per touch, fast, colorful, five seconds of life.
//! let shards = SpawnConfig::new()
//!     .with_velocity(VelocitySpec::Components {
//!         x: Span::new(-50.0, 500.0),
//!         y: Span::new(-50.0, 500.0),
//!     })
//!     .with_size(Span::new(4.0, 80.0))
//!     .with_color(ColorSpec::Channels { min: Vec3::splat(0.5), max: Vec3::ONE })
//!     .with_lifetime(Span::fixed(5.0));
//! store.spawn(touch, 10, &shards);
//! ```

use crate::entity::{Entity, EntityId, Shape};
use crate::error::ConfigError;
use crate::random::RandomSource;
use crate::tween::Tween;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Closed range a value is drawn uniformly from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Degenerate range that always yields `value`.
    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[inline]
    pub fn sample(&self, random: &mut dyn RandomSource) -> f32 {
        random.range(self.min, self.max)
    }

    pub(crate) fn check(&self, field: &'static str, floor: Option<f32>) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(ConfigError::invalid(field, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(ConfigError::invalid(
                field,
                format!("min ({}) must not exceed max ({})", self.min, self.max),
            ));
        }
        if let Some(floor) = floor {
            if self.min < floor {
                return Err(ConfigError::invalid(
                    field,
                    format!("min must be >= {floor}, got {}", self.min),
                ));
            }
        }
        Ok(())
    }
}

/// How initial velocity is drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum VelocitySpec {
    /// Each axis drawn independently.
    Components { x: Span, y: Span },

    /// Speed and direction drawn independently. Angles in radians.
    Radial { speed: Span, angle: Span },

    /// Directions spread evenly over a full turn by spawn index, starting
    /// at `start_angle`. With zero speed this only sets the heading.
    Fan { speed: Span, start_angle: f32 },
}

impl Default for VelocitySpec {
    fn default() -> Self {
        VelocitySpec::Components {
            x: Span::fixed(0.0),
            y: Span::fixed(0.0),
        }
    }
}

/// How the color attribute is drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ColorSpec {
    Fixed { rgb: Vec3 },
    /// Each channel drawn independently between `min` and `max`.
    Channels { min: Vec3, max: Vec3 },
    /// Random hue at fixed saturation and value.
    RandomHue { saturation: f32, value: f32 },
    /// One of the listed colors.
    Choice { colors: Vec<Vec3> },
}

impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::Fixed { rgb: Vec3::ONE }
    }
}

/// How the shape attribute is drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ShapeSpec {
    Fixed { shape: Shape },
    Choice { shapes: Vec<Shape> },
}

impl Default for ShapeSpec {
    fn default() -> Self {
        ShapeSpec::Fixed {
            shape: Shape::Circle,
        }
    }
}

/// Template new entities are sampled from.
///
/// The default spawns white circles of size 10 at rest, fully opaque, with
/// unbounded lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SpawnConfig {
    pub velocity: VelocitySpec,
    pub size: Span,
    pub scale: Span,
    pub opacity: Span,
    /// Seconds. `None` means the entity never expires by lifetime.
    pub lifetime: Option<Span>,
    pub color: ColorSpec,
    pub shape: ShapeSpec,
    pub tween: Option<Tween>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            velocity: VelocitySpec::default(),
            size: Span::fixed(10.0),
            scale: Span::fixed(1.0),
            opacity: Span::fixed(1.0),
            lifetime: None,
            color: ColorSpec::default(),
            shape: ShapeSpec::default(),
            tween: None,
        }
    }
}

impl SpawnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(mut self, velocity: VelocitySpec) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_size(mut self, size: Span) -> Self {
        self.size = size;
        self
    }

    pub fn with_scale(mut self, scale: Span) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_opacity(mut self, opacity: Span) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Span) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn with_color(mut self, color: ColorSpec) -> Self {
        self.color = color;
        self
    }

    pub fn with_shape(mut self, shape: ShapeSpec) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_tween(mut self, tween: Tween) -> Self {
        self.tween = Some(tween);
        self
    }

    /// Check every range and choice list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.velocity {
            VelocitySpec::Components { x, y } => {
                x.check("velocity-range.x", None)?;
                y.check("velocity-range.y", None)?;
            }
            VelocitySpec::Radial { speed, angle } => {
                speed.check("velocity.speed", None)?;
                angle.check("velocity.angle", None)?;
            }
            VelocitySpec::Fan { speed, start_angle } => {
                speed.check("velocity.speed", None)?;
                if !start_angle.is_finite() {
                    return Err(ConfigError::invalid("velocity.start-angle", "must be finite"));
                }
            }
        }

        self.size.check("size-range", Some(0.0))?;
        self.scale.check("scale-range", Some(0.0))?;
        self.opacity.check("opacity-range", Some(0.0))?;
        if self.opacity.max > 1.0 {
            return Err(ConfigError::invalid("opacity-range", "max must be <= 1"));
        }
        if let Some(lifetime) = &self.lifetime {
            lifetime.check("lifetime-range", Some(0.0))?;
        }

        match &self.color {
            ColorSpec::Channels { min, max } if min.cmpgt(*max).any() => {
                return Err(ConfigError::invalid("color", "channel min must not exceed max"));
            }
            ColorSpec::Choice { colors } if colors.is_empty() => {
                return Err(ConfigError::invalid("color", "choice list is empty"));
            }
            _ => {}
        }
        if let ShapeSpec::Choice { shapes } = &self.shape {
            if shapes.is_empty() {
                return Err(ConfigError::invalid("shape", "choice list is empty"));
            }
        }
        if let Some(tween) = &self.tween {
            tween.validate()?;
        }
        Ok(())
    }

    /// Draw one entity at `ctx.origin`.
    ///
    /// Total over any template: size and scale are floored at zero, opacity
    /// is clamped to `[0, 1]` and an empty choice list yields the default
    /// color or shape. [`validate`](Self::validate) reports such templates.
    pub fn sample(&self, id: EntityId, ctx: &mut SpawnContext<'_>) -> Entity {
        let (velocity, heading) = match &self.velocity {
            VelocitySpec::Components { x, y } => {
                let v = Vec2::new(ctx.random_span(x), ctx.random_span(y));
                (v, v.try_normalize().unwrap_or(Vec2::X))
            }
            VelocitySpec::Radial { speed, angle } => {
                let dir = Vec2::from_angle(ctx.random_span(angle));
                (dir * ctx.random_span(speed), dir)
            }
            VelocitySpec::Fan { speed, start_angle } => {
                let dir = Vec2::from_angle(start_angle + ctx.progress() * TAU);
                (dir * ctx.random_span(speed), dir)
            }
        };

        let mut entity = Entity::new(id, ctx.origin);
        entity.velocity = velocity;
        entity.heading = heading;
        entity.size = ctx.random_span(&self.size);
        entity.scale = ctx.random_span(&self.scale);
        entity.opacity = ctx.random_span(&self.opacity);
        entity.remaining_lifetime = match &self.lifetime {
            Some(span) => ctx.random_span(span),
            None => f32::INFINITY,
        };
        entity.color = match &self.color {
            ColorSpec::Fixed { rgb } => *rgb,
            ColorSpec::Channels { min, max } => Vec3::new(
                ctx.random_range(min.x, max.x),
                ctx.random_range(min.y, max.y),
                ctx.random_range(min.z, max.z),
            ),
            ColorSpec::RandomHue { saturation, value } => ctx.random_hue(*saturation, *value),
            ColorSpec::Choice { colors } if colors.is_empty() => Vec3::ONE,
            ColorSpec::Choice { colors } => colors[ctx.random_index(colors.len())],
        };
        entity.shape = match &self.shape {
            ShapeSpec::Fixed { shape } => *shape,
            ShapeSpec::Choice { shapes } if shapes.is_empty() => Shape::default(),
            ShapeSpec::Choice { shapes } => shapes[ctx.random_index(shapes.len())],
        };

        if let Some(tween) = &self.tween {
            // Start from the tween's first frame so the entity is never drawn
            // with template values it is about to lose.
            let frame = tween.sample(0.0);
            if let Some(size) = frame.size {
                entity.size = size;
            }
            if let Some(scale) = frame.scale {
                entity.scale = scale;
            }
            if let Some(opacity) = frame.opacity {
                entity.opacity = opacity;
            }
            if let Some(offset) = frame.offset {
                entity.position = entity.origin + entity.heading * offset;
            }
            entity.tween = Some(tween.clone());
        }

        entity.size = entity.size.max(0.0);
        entity.scale = entity.scale.max(0.0);
        entity.opacity = entity.opacity.clamp(0.0, 1.0);
        entity
    }
}

/// Context provided while sampling a batch of spawns.
pub struct SpawnContext<'a> {
    /// Index of the entity being spawned (0 to count-1).
    pub index: usize,
    /// Total number of entities in this batch.
    pub count: usize,
    /// Spawn point.
    pub origin: Vec2,
    random: &'a mut dyn RandomSource,
}

impl<'a> SpawnContext<'a> {
    pub fn new(origin: Vec2, count: usize, random: &'a mut dyn RandomSource) -> Self {
        Self {
            index: 0,
            count,
            origin,
            random,
        }
    }

    /// Normalized progress through the batch (0.0 to just under 1.0).
    ///
    /// Useful for distributing entities evenly:
    /// ```ignore
    /// let angle = ctx.progress() * TAU;  // evenly around a circle
    /// ```
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.index as f32 / self.count as f32
    }

    /// The underlying generator.
    pub fn random_source(&mut self) -> &mut dyn RandomSource {
        &mut *self.random
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.random.next_unit()
    }

    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.random.range(min, max)
    }

    #[inline]
    pub fn random_span(&mut self, span: &Span) -> f32 {
        span.sample(self.random)
    }

    #[inline]
    pub fn random_index(&mut self, len: usize) -> usize {
        self.random.index(len)
    }

    // ========== Color helpers ==========

    /// Random color with given saturation and value (HSV model).
    pub fn random_hue(&mut self, saturation: f32, value: f32) -> Vec3 {
        let hue = self.random();
        hsv_to_rgb(hue, saturation, value)
    }
}

/// Convert HSV to RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}
