//! Entity expiry.
//!
//! Every entity goes `Spawned -> Live -> Expired`. An [`ExpiryPolicy`]
//! decides when the last transition happens; the store removes expired
//! entities in the same tick they expire, so nothing is ever rendered past
//! its expiry.
//!
//! | Policy | Removed when |
//! |--------|--------------|
//! | [`ExpiryPolicy::Lifetime`] | `remaining_lifetime <= 0` |
//! | [`ExpiryPolicy::OpacityThreshold`] | `opacity < threshold` |
//! | [`ExpiryPolicy::OutOfBounds`] | `position.y > bounds.max.y + size` |
//!
//! Lifetime expiry applies under every policy. Entities spawned without a
//! lifetime carry `f32::INFINITY` and never trip it.

use crate::bounds::Bounds;
use crate::entity::Entity;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// When live entities are removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExpiryPolicy {
    /// Remove once the remaining lifetime reaches zero.
    #[default]
    Lifetime,

    /// Remove once opacity falls below `threshold`.
    OpacityThreshold { threshold: f32 },

    /// Remove once the entity has fallen fully past the bottom edge.
    ///
    /// With `respawn` set, every removed entity is replaced by a fresh one
    /// (new id) above the top edge, keeping the on-screen count constant.
    OutOfBounds {
        #[serde(default)]
        respawn: bool,
    },
}

/// Why an entity expired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    Lifetime,
    Faded,
    OutOfBounds,
}

impl ExpiryPolicy {
    /// Recycling snowfall: fall off the bottom, come back at the top.
    pub const fn respawn() -> Self {
        ExpiryPolicy::OutOfBounds { respawn: true }
    }

    pub const fn opacity_below(threshold: f32) -> Self {
        ExpiryPolicy::OpacityThreshold { threshold }
    }

    /// Expiry condition for `entity`, if one holds.
    pub fn check(&self, entity: &Entity, bounds: &Bounds) -> Option<Expiry> {
        if entity.remaining_lifetime <= 0.0 {
            return Some(Expiry::Lifetime);
        }
        match *self {
            ExpiryPolicy::Lifetime => None,
            ExpiryPolicy::OpacityThreshold { threshold } => {
                (entity.opacity < threshold).then_some(Expiry::Faded)
            }
            ExpiryPolicy::OutOfBounds { .. } => {
                (entity.position.y > bounds.max.y + entity.size).then_some(Expiry::OutOfBounds)
            }
        }
    }

    #[inline]
    pub fn is_expired(&self, entity: &Entity, bounds: &Bounds) -> bool {
        self.check(entity, bounds).is_some()
    }

    /// Whether an entity that expired for `reason` is replaced.
    #[inline]
    pub fn respawns(&self, reason: Expiry) -> bool {
        matches!(self, ExpiryPolicy::OutOfBounds { respawn: true }) && reason == Expiry::OutOfBounds
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let ExpiryPolicy::OpacityThreshold { threshold } = *self {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::invalid(
                    "expiry-policy.threshold",
                    format!("must be in [0, 1], got {threshold}"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use glam::Vec2;

    fn entity_at(y: f32) -> Entity {
        Entity::new(EntityId::from_raw(1), Vec2::new(50.0, y)).with_size(10.0)
    }

    #[test]
    fn test_lifetime() {
        let bounds = Bounds::from_size(400.0, 400.0);
        let policy = ExpiryPolicy::Lifetime;
        assert!(!policy.is_expired(&entity_at(10.0).with_lifetime(0.01), &bounds));
        assert_eq!(
            policy.check(&entity_at(10.0).with_lifetime(0.0), &bounds),
            Some(Expiry::Lifetime)
        );
        assert!(!policy.is_expired(&entity_at(9000.0), &bounds));
    }

    #[test]
    fn test_opacity_threshold() {
        let bounds = Bounds::from_size(400.0, 400.0);
        let policy = ExpiryPolicy::opacity_below(0.1);
        assert!(!policy.is_expired(&entity_at(10.0).with_opacity(0.1), &bounds));
        assert_eq!(
            policy.check(&entity_at(10.0).with_opacity(0.099), &bounds),
            Some(Expiry::Faded)
        );
        // Lifetime still applies
        assert!(policy.is_expired(&entity_at(10.0).with_lifetime(-0.5), &bounds));
    }

    #[test]
    fn test_out_of_bounds_needs_full_size_past_edge() {
        let bounds = Bounds::from_size(400.0, 400.0);
        let policy = ExpiryPolicy::respawn();
        assert!(!policy.is_expired(&entity_at(405.0), &bounds));
        assert!(!policy.is_expired(&entity_at(410.0), &bounds));
        assert_eq!(policy.check(&entity_at(410.5), &bounds), Some(Expiry::OutOfBounds));
        // Above the top is fine
        assert!(!policy.is_expired(&entity_at(-50.0), &bounds));
    }

    #[test]
    fn test_respawns_only_out_of_bounds() {
        let policy = ExpiryPolicy::respawn();
        assert!(policy.respawns(Expiry::OutOfBounds));
        assert!(!policy.respawns(Expiry::Lifetime));
        assert!(!ExpiryPolicy::OutOfBounds { respawn: false }.respawns(Expiry::OutOfBounds));
    }

    #[test]
    fn test_validate() {
        assert!(ExpiryPolicy::opacity_below(0.1).validate().is_ok());
        assert!(ExpiryPolicy::opacity_below(1.5).validate().is_err());
        assert!(ExpiryPolicy::opacity_below(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_deserialize_tagged() {
        #[derive(Deserialize)]
        struct Wrapper {
            expiry: ExpiryPolicy,
        }
        let w: Wrapper =
            toml::from_str("expiry = { kind = \"opacity-threshold\", threshold = 0.1 }").unwrap();
        assert_eq!(w.expiry, ExpiryPolicy::opacity_below(0.1));

        let w: Wrapper = toml::from_str("expiry = { kind = \"out-of-bounds\", respawn = true }").unwrap();
        assert_eq!(w.expiry, ExpiryPolicy::respawn());
    }
}
