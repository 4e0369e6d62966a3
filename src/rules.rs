//! Per-tick particle behavior rules.
//!
//! Rules run in order inside [`Entity::integrate`](crate::Entity::integrate),
//! after the position step. Each one touches a single entity only, so the
//! result never depends on the order entities are visited in.
//!
//! # Rule Categories
//!
//! - **Forces**: Gravity, Drag, Jitter
//! - **Boundaries**: BounceWalls, WrapWalls
//! - **Decay**: FadeOut, ShrinkOut
//!
//! Most effects do not list rules by hand; [`Dynamics`] holds the
//! configuration-surface view (gravity, restitution, decay rates) and builds
//! the rules in canonical order.
//!
//! ```ignore
//! Simulation::new()
//!     .with_rule(Rule::Gravity(Vec2::new(0.0, 540.0)))
//!     .with_rule(Rule::Jitter(Vec2::new(30.0, 0.0)))
//!     .with_rule(Rule::BounceWalls { restitution: 0.8 })
//!     .with_rule(Rule::FadeOut(0.99))
//! ```

use crate::bounds::Bounds;
use crate::entity::Entity;
use crate::error::ConfigError;
use crate::random::RandomSource;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Rules that define entity behavior each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rule {
    /// Constant acceleration in units per second squared.
    ///
    /// Screen coordinates grow downward, so falling is positive y.
    ///
    /// ```ignore
    /// Rule::Gravity(Vec2::new(0.0, 540.0))
    /// ```
    Gravity(Vec2),

    /// Velocity damping: `velocity *= max(0, 1 - strength * dt)`.
    Drag(f32),

    /// Brownian jitter. Each tick adds a value drawn uniformly from
    /// `[-x, x)` to velocity.x and `[-y, y)` to velocity.y. Axes with a zero
    /// half-range draw nothing.
    Jitter(Vec2),

    /// Reflect entities off the bounds.
    ///
    /// When an entity lies outside the bounds its position is clamped to the
    /// edge and the offending velocity component is set to point back inside
    /// with magnitude `|v| * restitution`.
    BounceWalls {
        /// Fraction of speed kept on impact, in `[0, 1]`.
        restitution: f32,
    },

    /// Entities leaving one side re-enter from the opposite side.
    WrapWalls,

    /// Multiply opacity by this factor every tick.
    FadeOut(f32),

    /// Multiply scale by this factor every tick.
    ShrinkOut(f32),
}

impl Rule {
    /// Apply this rule to one entity.
    pub fn apply(&self, e: &mut Entity, bounds: &Bounds, dt: f32, random: &mut dyn RandomSource) {
        match *self {
            Rule::Gravity(g) => {
                e.velocity += g * dt;
            }

            Rule::Drag(strength) => {
                e.velocity *= (1.0 - strength * dt).max(0.0);
            }

            Rule::Jitter(half) => {
                if half.x != 0.0 {
                    e.velocity.x += random.symmetric(half.x);
                }
                if half.y != 0.0 {
                    e.velocity.y += random.symmetric(half.y);
                }
            }

            Rule::BounceWalls { restitution } => {
                if e.position.x < bounds.min.x {
                    e.position.x = bounds.min.x;
                    e.velocity.x = e.velocity.x.abs() * restitution;
                } else if e.position.x > bounds.max.x {
                    e.position.x = bounds.max.x;
                    e.velocity.x = -e.velocity.x.abs() * restitution;
                }
                if e.position.y < bounds.min.y {
                    e.position.y = bounds.min.y;
                    e.velocity.y = e.velocity.y.abs() * restitution;
                } else if e.position.y > bounds.max.y {
                    e.position.y = bounds.max.y;
                    e.velocity.y = -e.velocity.y.abs() * restitution;
                }
            }

            Rule::WrapWalls => {
                let w = bounds.width();
                let h = bounds.height();
                if e.position.x < bounds.min.x {
                    e.position.x += w;
                } else if e.position.x > bounds.max.x {
                    e.position.x -= w;
                }
                if e.position.y < bounds.min.y {
                    e.position.y += h;
                } else if e.position.y > bounds.max.y {
                    e.position.y -= h;
                }
            }

            Rule::FadeOut(factor) => {
                e.opacity *= factor;
            }

            Rule::ShrinkOut(factor) => {
                e.scale *= factor;
            }
        }
    }

    /// Check parameters are in their allowed domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Rule::Gravity(g) if !g.is_finite() => {
                Err(ConfigError::invalid("gravity", "must be finite"))
            }
            Rule::Drag(k) if !(k.is_finite() && k >= 0.0) => {
                Err(ConfigError::invalid("drag", format!("must be >= 0, got {k}")))
            }
            Rule::Jitter(j) if !j.is_finite() => {
                Err(ConfigError::invalid("jitter", "must be finite"))
            }
            Rule::BounceWalls { restitution } if !(0.0..=1.0).contains(&restitution) => {
                Err(ConfigError::invalid(
                    "boundary-restitution",
                    format!("must be in [0, 1], got {restitution}"),
                ))
            }
            Rule::FadeOut(f) if !(f > 0.0 && f <= 1.0) => Err(ConfigError::invalid(
                "opacity-decay-rate",
                format!("must be in (0, 1], got {f}"),
            )),
            Rule::ShrinkOut(f) if !(f > 0.0 && f <= 1.0) => Err(ConfigError::invalid(
                "scale-decay-rate",
                format!("must be in (0, 1], got {f}"),
            )),
            _ => Ok(()),
        }
    }
}

/// Physics half of the configuration surface.
///
/// Neutral values (zero gravity, decay of `1.0`, no restitution) produce no
/// rule, so `Dynamics::default()` builds an empty list.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Dynamics {
    /// Units per second squared.
    pub gravity: Vec2,
    pub drag: f32,
    /// Half-range of the per-tick velocity perturbation on each axis.
    pub jitter: Vec2,
    /// `None` leaves the bounds open.
    pub boundary_restitution: Option<f32>,
    pub wrap: bool,
    /// Per-tick opacity multiplier.
    pub opacity_decay_rate: f32,
    /// Per-tick scale multiplier.
    pub scale_decay_rate: f32,
}

impl Default for Dynamics {
    fn default() -> Self {
        Self {
            gravity: Vec2::ZERO,
            drag: 0.0,
            jitter: Vec2::ZERO,
            boundary_restitution: None,
            wrap: false,
            opacity_decay_rate: 1.0,
            scale_decay_rate: 1.0,
        }
    }
}

impl Dynamics {
    /// Rules in canonical order: Gravity, Drag, Jitter, walls, FadeOut, ShrinkOut.
    pub fn rules(&self) -> Vec<Rule> {
        let mut rules = Vec::new();

        if self.gravity != Vec2::ZERO {
            rules.push(Rule::Gravity(self.gravity));
        }
        if self.drag > 0.0 {
            rules.push(Rule::Drag(self.drag));
        }
        if self.jitter != Vec2::ZERO {
            rules.push(Rule::Jitter(self.jitter));
        }
        if let Some(restitution) = self.boundary_restitution {
            rules.push(Rule::BounceWalls { restitution });
        } else if self.wrap {
            rules.push(Rule::WrapWalls);
        }
        if self.opacity_decay_rate != 1.0 {
            rules.push(Rule::FadeOut(self.opacity_decay_rate));
        }
        if self.scale_decay_rate != 1.0 {
            rules.push(Rule::ShrinkOut(self.scale_decay_rate));
        }

        rules
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Neutral values are skipped by `rules()`, so validate them explicitly.
        Rule::FadeOut(self.opacity_decay_rate).validate()?;
        Rule::ShrinkOut(self.scale_decay_rate).validate()?;
        self.rules().iter().try_for_each(Rule::validate)
    }
}
