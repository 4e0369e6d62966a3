//! Property tests for per-entity and store invariants.

use flurry::prelude::*;
use proptest::prelude::*;

fn bounds() -> Bounds {
    Bounds::from_size(400.0, 400.0)
}

fn coord() -> impl Strategy<Value = f32> {
    -100.0f32..500.0
}

fn speed() -> impl Strategy<Value = f32> {
    -800.0f32..800.0
}

fn entity(x: f32, y: f32, vx: f32, vy: f32) -> Entity {
    Entity::new(EntityId::from_raw(0), Vec2::new(x, y)).with_velocity(Vec2::new(vx, vy))
}

proptest! {
    #[test]
    fn prop_decay_never_negative_and_never_grows(
        x in coord(), y in coord(), vx in speed(), vy in speed(),
        opacity_rate in 0.5f32..0.9999,
        scale_rate in 0.5f32..0.9999,
        start_opacity in 0.0f32..=1.0,
        dt in 0.001f32..0.1,
        ticks in 1usize..50,
    ) {
        let rules = Dynamics {
            gravity: Vec2::new(0.0, 540.0),
            jitter: Vec2::new(30.0, 0.0),
            boundary_restitution: Some(0.8),
            opacity_decay_rate: opacity_rate,
            scale_decay_rate: scale_rate,
            ..Dynamics::default()
        }
        .rules();
        let mut rng = SeededRandom::new(1);
        let mut e = entity(x, y, vx, vy).with_opacity(start_opacity);

        for _ in 0..ticks {
            let (opacity, scale) = (e.opacity, e.scale);
            e.integrate(&bounds(), dt, &rules, &mut rng);
            prop_assert!(e.opacity >= 0.0 && e.scale >= 0.0 && e.size >= 0.0);
            prop_assert!(e.opacity <= opacity);
            prop_assert!(e.scale <= scale);
        }
    }

    #[test]
    fn prop_crossing_a_wall_flips_velocity(
        x in 0.0f32..=400.0, y in 0.0f32..=400.0,
        vx in speed(), vy in speed(),
        restitution in 0.05f32..=1.0,
        dt in 0.001f32..0.1,
    ) {
        let b = bounds();
        let rules = [Rule::BounceWalls { restitution }];
        let mut rng = FixedSequence::constant(0.5);
        let mut e = entity(x, y, vx, vy);

        let free = e.position + e.velocity * dt;
        e.integrate(&b, dt, &rules, &mut rng);

        prop_assert!(b.contains(e.position));
        if free.x > b.max.x {
            prop_assert!(vx > 0.0 && e.velocity.x < 0.0);
        }
        if free.x < b.min.x {
            prop_assert!(vx < 0.0 && e.velocity.x > 0.0);
        }
        if free.y > b.max.y {
            prop_assert!(vy > 0.0 && e.velocity.y < 0.0);
        }
        if free.y < b.min.y {
            prop_assert!(vy < 0.0 && e.velocity.y > 0.0);
        }
    }

    #[test]
    fn prop_spawn_adds_exactly_n_at_origin(
        n in 0usize..200,
        existing in 0usize..50,
        ox in coord(), oy in coord(),
        seed in any::<u64>(),
    ) {
        let mut store = Simulation::new()
            .with_random(SeededRandom::new(seed))
            .build()
            .unwrap();
        let config = Effect::explosion().touch_spawn;
        store.spawn(Vec2::ZERO, existing, &config);

        let origin = Vec2::new(ox, oy);
        let report = store.spawn(origin, n, &config);
        prop_assert_eq!(report.spawned, n);
        prop_assert_eq!(store.len(), existing + n);
        for e in store.snapshot().iter().skip(existing) {
            prop_assert_eq!(e.position, origin);
        }
    }

    #[test]
    fn prop_lifetime_expires_on_the_expected_tick(
        lifetime in 0.05f32..3.0,
        dt in 0.005f32..0.1,
    ) {
        let mut store = Simulation::new().build().unwrap();
        store.spawn(Vec2::ZERO, 1, &SpawnConfig::new().with_lifetime(Span::fixed(lifetime)));

        // `remaining_lifetime` drifts at most ~7e-5 s from f32 rounding over
        // 600 steps, which is under 0.05 of the smallest step here. Quotients
        // within that margin above a whole number may round either way.
        let ticks = f64::from(lifetime) / f64::from(dt);
        let expected = (ticks - 0.05).ceil() as usize;
        let mut removed_at = None;
        for tick in 1..=expected + 2 {
            store.tick(dt, &bounds());
            if store.is_empty() {
                removed_at = Some(tick);
                break;
            }
        }

        let removed_at = removed_at.unwrap_or(usize::MAX);
        prop_assert!(removed_at >= expected, "removed at {} before {}", removed_at, expected);
        prop_assert!(removed_at <= expected + 1, "removed at {} after {}", removed_at, expected + 1);
    }

    #[test]
    fn prop_capacity_is_never_exceeded(
        max in 1usize..100,
        batches in proptest::collection::vec(0usize..40, 1..20),
        evict in any::<bool>(),
    ) {
        let capacity = if evict { Capacity::evict_above(max) } else { Capacity::reject_above(max) };
        let mut store = Simulation::new().with_capacity(capacity).build().unwrap();
        for n in batches {
            let before = store.len();
            let report = store.spawn(Vec2::ZERO, n, &SpawnConfig::default());
            prop_assert!(store.len() <= max);
            prop_assert_eq!(report.spawned + report.rejected, n);
            prop_assert_eq!(store.len(), before + report.spawned - report.evicted);
        }
    }

    #[test]
    fn prop_ids_stay_unique(
        batches in proptest::collection::vec(1usize..20, 1..10),
        ticks in 0usize..30,
    ) {
        let effect = Effect::snowfall();
        let mut store = effect.simulation().with_random(SeededRandom::new(4)).build().unwrap();
        for n in batches {
            store.spawn(Vec2::new(200.0, 790.0), n, &effect.respawn);
            for _ in 0..ticks {
                store.tick(0.05, &Bounds::from_size(400.0, 800.0));
            }
            let mut ids: Vec<_> = store.snapshot().ids().collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
        }
    }
}
