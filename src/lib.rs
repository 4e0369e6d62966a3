//! # Flurry
//!
//! A tick-driven particle simulation loop: spawn, integrate, cull.
//!
//! Flurry owns a set of short-lived, independently moving entities and
//! advances them once per tick. Input collaborators spawn entities, a tick
//! source drives time, and renderers read snapshots. Drawing, layout and
//! input handling stay outside the crate.
//!
//! ## Quick Start
//!
//! ```ignore
//! use flurry::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     let mut session = Simulation::new()
//!         .with_bounds(Bounds::from_size(400.0, 400.0))
//!         .with_rule(Rule::Gravity(Vec2::new(0.0, 540.0)))
//!         .with_rule(Rule::BounceWalls { restitution: 0.8 })
//!         .with_rule(Rule::FadeOut(0.99))
//!         .with_expiry(ExpiryPolicy::opacity_below(0.1))
//!         .start(FixedStep::hz60())?;
//!
//!     session.spawn(Vec2::new(100.0, 100.0), 5, &SpawnConfig::default());
//!     session.run(Some(300), |_, snapshot| {
//!         let _instances = snapshot.to_instances();
//!     });
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Entities
//!
//! An [`Entity`] carries position, velocity, size, scale, opacity, color,
//! shape and remaining lifetime. It changes only through
//! [`Entity::integrate`], which never looks at other entities.
//!
//! ### Rules
//!
//! Rules run every tick in order, after the position update:
//!
//! | Category | Rules |
//! |----------|-------|
//! | Forces | [`Rule::Gravity`], [`Rule::Drag`], [`Rule::Jitter`] |
//! | Boundaries | [`Rule::BounceWalls`], [`Rule::WrapWalls`] |
//! | Decay | [`Rule::FadeOut`], [`Rule::ShrinkOut`] |
//!
//! Entities that animate by age instead of velocity (ripples, pulsing
//! bubbles, sparkle rays) carry a [`Tween`].
//!
//! ### Expiry
//!
//! An [`ExpiryPolicy`] removes entities by lifetime, opacity threshold, or
//! by falling past the bottom edge, optionally respawning them at the top.
//!
//! ### Capacity
//!
//! Stores are unbounded unless a [`Capacity`] is set, in which case excess
//! spawns are rejected or the oldest entities evicted.

pub mod bounds;
pub mod config;
pub mod countdown;
pub mod effects;
mod emitter;
pub mod entity;
mod error;
pub mod lifecycle;
pub mod random;
pub mod rules;
mod simulation;
mod snapshot;
pub mod spawn;
mod store;
pub mod time;
pub mod tween;

pub use bounds::Bounds;
pub use bytemuck;
pub use config::SimConfig;
pub use countdown::{Countdown, CountdownEvent};
pub use effects::Effect;
pub use emitter::{Emitter, Placement, MAX_CATCH_UP_ROUNDS};
pub use entity::{Entity, EntityId, Shape};
pub use error::{ConfigError, SimulationError};
pub use glam::{Vec2, Vec3, Vec4};
pub use lifecycle::{Expiry, ExpiryPolicy};
pub use random::{FixedSequence, RandomSource, SeededRandom};
pub use rules::{Dynamics, Rule};
pub use simulation::{Session, SessionSummary, Simulation};
pub use snapshot::{RenderInstance, Snapshot};
pub use spawn::{ColorSpec, ShapeSpec, Span, SpawnConfig, SpawnContext, VelocitySpec};
pub use store::{Capacity, Overflow, ParticleStore, SpawnReport, TickReport};
pub use time::{FixedStep, FrameClock, TickSource};
pub use tween::{Easing, Repeat, Tween};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use flurry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bounds::Bounds;
    pub use crate::config::SimConfig;
    pub use crate::countdown::{Countdown, CountdownEvent};
    pub use crate::effects::Effect;
    pub use crate::emitter::{Emitter, Placement};
    pub use crate::entity::{Entity, EntityId, Shape};
    pub use crate::error::{ConfigError, SimulationError};
    pub use crate::lifecycle::ExpiryPolicy;
    pub use crate::random::{FixedSequence, RandomSource, SeededRandom};
    pub use crate::rules::{Dynamics, Rule};
    pub use crate::simulation::{Session, SessionSummary, Simulation};
    pub use crate::snapshot::{RenderInstance, Snapshot};
    pub use crate::spawn::{ColorSpec, ShapeSpec, Span, SpawnConfig, VelocitySpec};
    pub use crate::store::{Capacity, Overflow, ParticleStore, SpawnReport, TickReport};
    pub use crate::time::{FixedStep, FrameClock, TickSource};
    pub use crate::tween::{Easing, Repeat, Tween};
    pub use crate::{Vec2, Vec3, Vec4};
}
