//! Simulation builder and scoped runner.
//!
//! [`Simulation`] collects rules, expiry, capacity and emitters with method
//! chaining, then either [`build`](Simulation::build)s a bare
//! [`ParticleStore`] or [`start`](Simulation::start)s a [`Session`] that
//! owns the store together with its tick source.

use crate::bounds::Bounds;
use crate::emitter::Emitter;
use crate::error::SimulationError;
use crate::lifecycle::ExpiryPolicy;
use crate::random::{RandomSource, SeededRandom};
use crate::rules::{Dynamics, Rule};
use crate::snapshot::Snapshot;
use crate::spawn::SpawnConfig;
use crate::store::{Capacity, ParticleStore, SpawnReport, TickReport};
use crate::time::TickSource;
use glam::Vec2;
use tracing::info;

/// A particle simulation builder.
///
/// Use method chaining to configure, then call `.build()` or `.start()`.
pub struct Simulation {
    bounds: Bounds,
    rules: Vec<Rule>,
    expiry: ExpiryPolicy,
    capacity: Capacity,
    emitters: Vec<Emitter>,
    respawn: SpawnConfig,
    random: Option<Box<dyn RandomSource>>,
}

impl Simulation {
    /// No rules, lifetime expiry, unbounded, entropy-seeded randomness.
    pub fn new() -> Self {
        Self {
            bounds: Bounds::default(),
            rules: Vec::new(),
            expiry: ExpiryPolicy::default(),
            capacity: Capacity::UNBOUNDED,
            emitters: Vec::new(),
            respawn: SpawnConfig::default(),
            random: None,
        }
    }

    /// Area a [`Session`] ticks in. Bare stores take bounds per tick instead.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Append a rule. Rules run every tick in the order added.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Append the rules for a set of physics parameters.
    pub fn with_dynamics(self, dynamics: &Dynamics) -> Self {
        self.with_rules(dynamics.rules())
    }

    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitters.push(emitter);
        self
    }

    /// Template for entities created by respawn-in-place expiry.
    pub fn with_respawn_template(mut self, template: SpawnConfig) -> Self {
        self.respawn = template;
        self
    }

    /// Generator for spawn attributes and jitter.
    pub fn with_random<R: RandomSource + 'static>(mut self, random: R) -> Self {
        self.random = Some(Box::new(random));
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Check every rule, limit, emitter and template.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.bounds.is_valid() {
            return Err(SimulationError::InvalidBounds);
        }
        self.rules.iter().try_for_each(Rule::validate)?;
        self.expiry.validate()?;
        self.capacity.validate()?;
        self.emitters.iter().try_for_each(Emitter::validate)?;
        self.respawn.validate()?;
        Ok(())
    }

    /// Validate and produce a store.
    pub fn build(self) -> Result<ParticleStore, SimulationError> {
        self.validate()?;
        Ok(self.into_store())
    }

    /// Validate, build and attach `source`.
    ///
    /// The returned session holds the tick subscription; dropping it stops
    /// the source and clears the store.
    pub fn start<S: TickSource>(self, mut source: S) -> Result<Session<S>, SimulationError> {
        if source.is_stopped() {
            return Err(SimulationError::TickSourceStopped);
        }
        if let Err(err) = self.validate() {
            source.stop();
            return Err(err);
        }

        let bounds = self.bounds;
        let store = self.into_store();
        info!(
            rules = store.rules().len(),
            emitters = store.emitters().len(),
            expiry = ?store.expiry(),
            "simulation session started"
        );
        Ok(Session {
            store,
            source,
            bounds,
            on_stop: None,
            summary: None,
        })
    }

    fn into_store(self) -> ParticleStore {
        let random = self
            .random
            .unwrap_or_else(|| Box::new(SeededRandom::from_entropy()));
        ParticleStore::new(
            self.rules,
            self.expiry,
            self.capacity,
            self.emitters,
            self.respawn,
            random,
        )
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

/// What a session did by the time it was torn down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Accepted ticks over the session's lifetime.
    pub ticks: u64,
    /// Entities released by the final clear.
    pub cleared: usize,
}

type StopListener = Box<dyn FnOnce(&SessionSummary) + Send>;

/// A running simulation: store plus tick source.
///
/// Dropping the session, on any exit path including unwinding, stops the
/// source and clears every entity. Teardown runs once; a listener set with
/// [`on_stop`](Session::on_stop) receives its [`SessionSummary`].
pub struct Session<S: TickSource> {
    store: ParticleStore,
    source: S,
    bounds: Bounds,
    on_stop: Option<StopListener>,
    summary: Option<SessionSummary>,
}

impl<S: TickSource> Session<S> {
    /// Pull one delta from the source and tick. `None` once the source stops.
    pub fn step(&mut self) -> Option<TickReport> {
        let dt = self.source.next_delta()?;
        Some(self.store.tick(dt, &self.bounds))
    }

    /// Tick until the source stops or `max_ticks` accepted steps have run,
    /// handing each frame to `on_frame`. Returns the number of steps taken.
    pub fn run<F>(&mut self, max_ticks: Option<u64>, mut on_frame: F) -> u64
    where
        F: FnMut(&TickReport, Snapshot<'_>),
    {
        let mut steps = 0;
        while max_ticks.map_or(true, |max| steps < max) {
            let Some(report) = self.step() else {
                break;
            };
            steps += 1;
            on_frame(&report, self.store.snapshot());
        }
        steps
    }

    /// Spawn into the running store, e.g. from a touch event.
    pub fn spawn(&mut self, origin: Vec2, count: usize, config: &SpawnConfig) -> SpawnReport {
        self.store.spawn(origin, count, config)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Follow a resized viewport.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Call `listener` with the summary when the session is torn down,
    /// whether by [`stop`](Self::stop), a plain drop or unwinding.
    /// Replaces any earlier listener.
    pub fn on_stop<F>(&mut self, listener: F)
    where
        F: FnOnce(&SessionSummary) + Send + 'static,
    {
        self.on_stop = Some(Box::new(listener));
    }

    /// End the session now. Same as dropping it, but hands back the summary.
    pub fn stop(mut self) -> SessionSummary {
        self.teardown()
    }

    fn teardown(&mut self) -> SessionSummary {
        if let Some(summary) = self.summary {
            return summary;
        }
        self.source.stop();
        let summary = SessionSummary {
            ticks: self.store.ticks(),
            cleared: self.store.clear(),
        };
        self.summary = Some(summary);
        info!(
            ticks = summary.ticks,
            cleared = summary.cleared,
            "simulation session stopped"
        );
        if let Some(listener) = self.on_stop.take() {
            listener(&summary);
        }
        summary
    }
}

impl<S: TickSource> Drop for Session<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
