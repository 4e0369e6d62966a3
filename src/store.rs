//! The particle store: spawn, advance, cull.
//!
//! [`ParticleStore`] is the sole owner and mutator of the live entity set.
//! Input collaborators call [`spawn`](ParticleStore::spawn), a tick source
//! calls [`tick`](ParticleStore::tick), and renderers read
//! [`snapshot`](ParticleStore::snapshot).
//!
//! A tick runs in four phases:
//!
//! 1. emitters advance and spawn whatever is due
//! 2. every live entity integrates (`position`, rules, age, tween)
//! 3. expired entities are removed, respawning where the policy asks for it
//! 4. counters are reported in a [`TickReport`]
//!
//! Entities are independent, so integration order never affects the
//! outcome. Live entities are kept oldest first; eviction takes from the
//! front.

use crate::bounds::Bounds;
use crate::emitter::{Emitter, Placement};
use crate::entity::{Entity, EntityId};
use crate::error::ConfigError;
use crate::lifecycle::ExpiryPolicy;
use crate::random::RandomSource;
use crate::rules::Rule;
use crate::snapshot::Snapshot;
use crate::spawn::{SpawnConfig, SpawnContext};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What to do with spawns that would exceed the cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    /// Drop the excess spawns.
    #[default]
    Reject,
    /// Remove the oldest live entities to make room.
    EvictOldest,
}

/// Optional upper bound on the live entity count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    /// `None` means unbounded.
    pub max: Option<usize>,
    pub overflow: Overflow,
}

impl Capacity {
    pub const UNBOUNDED: Capacity = Capacity {
        max: None,
        overflow: Overflow::Reject,
    };

    pub const fn reject_above(max: usize) -> Self {
        Self {
            max: Some(max),
            overflow: Overflow::Reject,
        }
    }

    pub const fn evict_above(max: usize) -> Self {
        Self {
            max: Some(max),
            overflow: Overflow::EvictOldest,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max == Some(0) {
            return Err(ConfigError::invalid("max-entity-count", "must be at least 1 when set"));
        }
        Ok(())
    }

    /// Make room for `requested` new entities in `entities`.
    ///
    /// Returns how many may be spawned, evicting from the front when the
    /// policy allows it.
    fn admit(&self, entities: &mut Vec<Entity>, requested: usize) -> Admission {
        let Some(max) = self.max else {
            return Admission {
                allowed: requested,
                ..Default::default()
            };
        };

        match self.overflow {
            Overflow::Reject => {
                let allowed = requested.min(max.saturating_sub(entities.len()));
                Admission {
                    allowed,
                    rejected: requested - allowed,
                    evicted: 0,
                }
            }
            Overflow::EvictOldest => {
                let allowed = requested.min(max);
                let evicted = (entities.len() + allowed).saturating_sub(max);
                entities.drain(..evicted);
                Admission {
                    allowed,
                    rejected: requested - allowed,
                    evicted,
                }
            }
        }
    }
}

#[derive(Default)]
struct Admission {
    allowed: usize,
    rejected: usize,
    evicted: usize,
}

/// Outcome of one [`ParticleStore::spawn`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub spawned: usize,
    /// Requested spawns dropped by the capacity policy.
    pub rejected: usize,
    /// Live entities removed to make room.
    pub evicted: usize,
}

/// Outcome of one [`ParticleStore::tick`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The tick was refused because `dt` or the bounds were invalid.
    pub skipped: bool,
    /// Entities spawned by emitters this tick.
    pub emitted: usize,
    pub integrated: usize,
    pub expired: usize,
    pub respawned: usize,
    /// Emitter spawns dropped by the capacity policy.
    pub rejected: usize,
    /// Live entities evicted for emitter spawns.
    pub evicted: usize,
    /// Live count after the tick.
    pub live: usize,
}

/// Owns the live entities and runs spawn, tick and cull.
///
/// Build one with [`Simulation`](crate::Simulation).
pub struct ParticleStore {
    entities: Vec<Entity>,
    rules: Vec<Rule>,
    expiry: ExpiryPolicy,
    capacity: Capacity,
    emitters: Vec<Emitter>,
    respawn: SpawnConfig,
    random: Box<dyn RandomSource>,
    next_id: u64,
    ticks: u64,
}

impl ParticleStore {
    pub(crate) fn new(
        rules: Vec<Rule>,
        expiry: ExpiryPolicy,
        capacity: Capacity,
        emitters: Vec<Emitter>,
        respawn: SpawnConfig,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            entities: Vec::new(),
            rules,
            expiry,
            capacity,
            emitters,
            respawn,
            random,
            next_id: 0,
            ticks: 0,
        }
    }

    /// Spawn `count` entities at `origin`, attributes drawn from `config`.
    ///
    /// `count == 0` is a no-op. Subject to the capacity policy. A template
    /// that fails validation still spawns, with out-of-range attributes
    /// clamped.
    pub fn spawn(&mut self, origin: Vec2, count: usize, config: &SpawnConfig) -> SpawnReport {
        if count == 0 {
            return SpawnReport::default();
        }
        if let Err(err) = config.validate() {
            warn!(%err, "spawn template is out of range; sampled values are clamped");
        }

        let admission = self.capacity.admit(&mut self.entities, count);
        spawn_into(
            &mut self.entities,
            &mut self.next_id,
            self.random.as_mut(),
            origin,
            admission.allowed,
            config,
            None,
        );

        let report = SpawnReport {
            spawned: admission.allowed,
            rejected: admission.rejected,
            evicted: admission.evicted,
        };
        if report.rejected > 0 || report.evicted > 0 {
            warn!(
                requested = count,
                spawned = report.spawned,
                rejected = report.rejected,
                evicted = report.evicted,
                max = ?self.capacity.max,
                "entity cap reached"
            );
        }
        report
    }

    /// Advance every live entity by `dt` seconds inside `bounds`, then cull.
    ///
    /// A negative or non-finite `dt`, or invalid bounds, leaves the store
    /// untouched and returns a report with `skipped` set. `dt == 0` is a
    /// no-op.
    pub fn tick(&mut self, dt: f32, bounds: &Bounds) -> TickReport {
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "rejected tick: dt must be finite and non-negative");
            return self.skipped();
        }
        if !bounds.is_valid() {
            warn!(?bounds, "rejected tick: bounds must be finite with positive extent");
            return self.skipped();
        }
        if dt == 0.0 {
            return TickReport {
                live: self.entities.len(),
                ..Default::default()
            };
        }

        let mut report = TickReport::default();

        // Emitters
        for emitter in &mut self.emitters {
            let due = emitter.advance(dt);
            if due == 0 {
                continue;
            }
            let admission = self.capacity.admit(&mut self.entities, due);
            let placement = emitter.placement();
            spawn_into(
                &mut self.entities,
                &mut self.next_id,
                self.random.as_mut(),
                placement.anchor(bounds),
                admission.allowed,
                emitter.spawn_config(),
                Some((&placement, bounds)),
            );
            report.emitted += admission.allowed;
            report.rejected += admission.rejected;
            report.evicted += admission.evicted;
        }
        self.emitters.retain(|e| !e.is_spent());
        // Steady-state effects run emitters against a full store every tick.
        if report.rejected > 0 || report.evicted > 0 {
            debug!(
                rejected = report.rejected,
                evicted = report.evicted,
                "entity cap reached while emitting"
            );
        }

        // Integrate
        for entity in &mut self.entities {
            entity.integrate(bounds, dt, &self.rules, self.random.as_mut());
        }
        report.integrated = self.entities.len();

        // Cull
        let expiry = self.expiry;
        let before = self.entities.len();
        let mut respawn = 0;
        self.entities.retain(|e| match expiry.check(e, bounds) {
            Some(reason) => {
                if expiry.respawns(reason) {
                    respawn += 1;
                }
                false
            }
            None => true,
        });
        report.expired = before - self.entities.len();

        if respawn > 0 {
            spawn_into(
                &mut self.entities,
                &mut self.next_id,
                self.random.as_mut(),
                bounds.center(),
                respawn,
                &self.respawn,
                Some((&Placement::AboveTop, bounds)),
            );
            report.respawned = respawn;
        }

        self.ticks += 1;
        report.live = self.entities.len();
        debug!(
            tick = self.ticks,
            dt,
            emitted = report.emitted,
            integrated = report.integrated,
            expired = report.expired,
            respawned = report.respawned,
            live = report.live,
            "tick"
        );
        report
    }

    fn skipped(&self) -> TickReport {
        TickReport {
            skipped: true,
            live: self.entities.len(),
            ..Default::default()
        }
    }

    /// Read-only view of the live entities, oldest first.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(&self.entities)
    }

    /// Remove every entity immediately and return how many were removed.
    /// Emitters and counters are kept.
    pub fn clear(&mut self) -> usize {
        let removed = self.entities.len();
        self.entities.clear();
        info!(removed, "cleared particle store");
        removed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Accepted ticks so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn expiry(&self) -> ExpiryPolicy {
        self.expiry
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    /// Add an emitter; it starts on the next tick.
    ///
    /// Emitters are not rejected here. One with a non-positive interval
    /// never fires.
    pub fn add_emitter(&mut self, emitter: Emitter) {
        if let Err(err) = emitter.validate() {
            warn!(%err, "added emitter failed validation");
        }
        self.emitters.push(emitter);
    }

    /// Template used when the expiry policy respawns an entity.
    pub fn set_respawn_template(&mut self, template: SpawnConfig) {
        self.respawn = template;
    }

    /// Mutable access to one live entity, e.g. to steer it from input.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }
}

impl std::fmt::Debug for ParticleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleStore")
            .field("live", &self.entities.len())
            .field("rules", &self.rules)
            .field("expiry", &self.expiry)
            .field("capacity", &self.capacity)
            .field("emitters", &self.emitters.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

/// Sample `count` entities and append them, fresh ids in spawn order.
fn spawn_into(
    entities: &mut Vec<Entity>,
    next_id: &mut u64,
    random: &mut dyn RandomSource,
    origin: Vec2,
    count: usize,
    config: &SpawnConfig,
    placement: Option<(&Placement, &Bounds)>,
) {
    entities.reserve(count);
    let mut ctx = SpawnContext::new(origin, count, random);
    for index in 0..count {
        ctx.index = index;
        let id = EntityId::from_raw(*next_id);
        *next_id += 1;
        let mut entity = config.sample(id, &mut ctx);
        if let Some((placement, bounds)) = placement {
            placement.place(&mut entity, bounds, ctx.random_source());
        }
        entities.push(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FixedSequence, SeededRandom};
    use crate::entity::Shape;
    use crate::spawn::{ColorSpec, ShapeSpec, Span};
    use crate::{Simulation, Vec3};

    fn bounds() -> Bounds {
        Bounds::from_size(400.0, 400.0)
    }

    fn store() -> ParticleStore {
        Simulation::new()
            .with_random(SeededRandom::new(1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_spawn_assigns_unique_ids() {
        let mut store = store();
        store.spawn(Vec2::ZERO, 3, &SpawnConfig::default());
        store.spawn(Vec2::ZERO, 2, &SpawnConfig::default());
        let mut ids: Vec<_> = store.snapshot().ids().collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_spawn_zero_is_noop() {
        let mut store = store();
        let report = store.spawn(Vec2::ZERO, 0, &SpawnConfig::default());
        assert_eq!(report, SpawnReport::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_dt_skips_tick() {
        let mut store = store();
        store.spawn(
            Vec2::new(10.0, 10.0),
            1,
            &SpawnConfig::new().with_velocity(crate::VelocitySpec::Components {
                x: Span::fixed(10.0),
                y: Span::fixed(0.0),
            }),
        );
        for dt in [-0.1, f32::NAN, f32::INFINITY] {
            let report = store.tick(dt, &bounds());
            assert!(report.skipped);
            assert_eq!(store.snapshot()[0].position, Vec2::new(10.0, 10.0));
        }
        assert_eq!(store.ticks(), 0);

        let report = store.tick(0.0, &bounds());
        assert!(!report.skipped);
        assert_eq!(store.snapshot()[0].position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_invalid_bounds_skip_tick() {
        let mut store = store();
        let report = store.tick(0.016, &Bounds::from_size(0.0, 100.0));
        assert!(report.skipped);
    }

    #[test]
    fn test_reject_overflow() {
        let mut store = Simulation::new()
            .with_capacity(Capacity::reject_above(4))
            .build()
            .unwrap();
        let report = store.spawn(Vec2::ZERO, 3, &SpawnConfig::default());
        assert_eq!(report.spawned, 3);
        let report = store.spawn(Vec2::ZERO, 3, &SpawnConfig::default());
        assert_eq!(
            report,
            SpawnReport {
                spawned: 1,
                rejected: 2,
                evicted: 0
            }
        );
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_evict_oldest_overflow() {
        let mut store = Simulation::new()
            .with_capacity(Capacity::evict_above(4))
            .build()
            .unwrap();
        store.spawn(Vec2::ZERO, 3, &SpawnConfig::default());
        let report = store.spawn(Vec2::ONE, 3, &SpawnConfig::default());
        assert_eq!(report.spawned, 3);
        assert_eq!(report.evicted, 2);
        assert_eq!(store.len(), 4);

        let ids: Vec<u64> = store.snapshot().ids().map(EntityId::raw).collect();
        assert_eq!(ids, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_evict_more_than_cap() {
        let mut store = Simulation::new()
            .with_capacity(Capacity::evict_above(2))
            .build()
            .unwrap();
        store.spawn(Vec2::ZERO, 1, &SpawnConfig::default());
        let report = store.spawn(Vec2::ZERO, 5, &SpawnConfig::default());
        assert_eq!(report.spawned, 2);
        assert_eq!(report.rejected, 3);
        assert_eq!(report.evicted, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_lifetime_expiry_removes_in_same_tick() {
        let mut store = store();
        store.spawn(
            Vec2::ZERO,
            2,
            &SpawnConfig::new().with_lifetime(Span::fixed(0.05)),
        );
        let report = store.tick(0.05, &bounds());
        assert_eq!(report.expired, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_burst_emitter_fires_on_next_tick() {
        let mut store = Simulation::new()
            .with_random(FixedSequence::constant(0.5))
            .with_emitter(Emitter::burst(Vec2::new(5.0, 5.0), 4, SpawnConfig::default()))
            .build()
            .unwrap();
        assert!(store.is_empty());
        let report = store.tick(0.016, &bounds());
        assert_eq!(report.emitted, 4);
        assert_eq!(store.len(), 4);
        assert!(store.emitters().is_empty());
        assert!(store.snapshot().iter().all(|e| e.position == Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_empty_color_choice_spawns_default_color() {
        let mut store = store();
        let config = SpawnConfig::new().with_color(ColorSpec::Choice { colors: vec![] });
        let report = store.spawn(Vec2::ZERO, 2, &config);
        assert_eq!(report.spawned, 2);
        assert!(store.snapshot().iter().all(|e| e.color == Vec3::ONE));
    }

    #[test]
    fn test_empty_shape_choice_spawns_default_shape() {
        let mut store = store();
        let config = SpawnConfig::new().with_shape(ShapeSpec::Choice { shapes: vec![] });
        store.spawn(Vec2::ZERO, 2, &config);
        assert_eq!(store.len(), 2);
        assert!(store.snapshot().iter().all(|e| e.shape == Shape::Circle));
    }

    #[test]
    fn test_negative_template_values_are_clamped_on_spawn() {
        let mut store = store();
        let config = SpawnConfig::new()
            .with_size(Span::fixed(-5.0))
            .with_scale(Span::new(-2.0, -1.0))
            .with_opacity(Span::fixed(1.5));
        store.spawn(Vec2::ZERO, 3, &config);
        for e in store.snapshot() {
            assert_eq!(e.size, 0.0);
            assert_eq!(e.scale, 0.0);
            assert_eq!(e.opacity, 1.0);
        }
    }

    #[test]
    fn test_added_emitter_with_empty_choices_emits() {
        let mut store = store();
        let template = SpawnConfig::new()
            .with_color(ColorSpec::Choice { colors: vec![] })
            .with_shape(ShapeSpec::Choice { shapes: vec![] });
        store.add_emitter(Emitter::burst(Vec2::new(5.0, 5.0), 3, template));
        let report = store.tick(0.016, &bounds());
        assert_eq!(report.emitted, 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store.spawn(Vec2::ZERO, 10, &SpawnConfig::default());
        assert_eq!(store.clear(), 10);
        assert!(store.is_empty());
        assert_eq!(store.tick(0.016, &bounds()).live, 0);
    }
}
