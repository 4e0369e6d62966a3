//! End-to-end scenarios for the particle loop.
//!
//! Each test drives a store through spawn and tick calls only and checks
//! what a renderer would see in the snapshot.

use flurry::prelude::*;

fn square() -> Bounds {
    Bounds::from_size(400.0, 400.0)
}

// ============================================================================
// Opacity expiry
// ============================================================================

#[test]
fn test_fading_entities_expire_together_near_tick_230() {
    let mut store = Simulation::new()
        .with_rule(Rule::FadeOut(0.99))
        .with_expiry(ExpiryPolicy::opacity_below(0.1))
        .with_random(SeededRandom::new(42))
        .build()
        .unwrap();

    store.spawn(Vec2::new(100.0, 100.0), 5, &SpawnConfig::default());

    let mut emptied_at = None;
    for tick in 1..=313 {
        let report = store.tick(0.016, &square());
        assert!(!report.skipped);
        if store.is_empty() && emptied_at.is_none() {
            emptied_at = Some(tick);
            // All five share the same opacity, so they leave together.
            assert_eq!(report.expired, 5);
        }
        if emptied_at.is_none() {
            assert_eq!(store.len(), 5);
            for e in store.snapshot() {
                assert!(e.opacity >= 0.1);
            }
        }
    }

    let emptied_at = emptied_at.expect("entities should fade out within 313 ticks");
    assert!(
        (229..=231).contains(&emptied_at),
        "emptied at tick {emptied_at}, expected ~230"
    );
    assert!(store.is_empty());
}

// ============================================================================
// Respawn in place
// ============================================================================

#[test]
fn test_flake_past_bottom_is_replaced_at_top() {
    let flake = SpawnConfig::new()
        .with_velocity(VelocitySpec::Components {
            x: Span::fixed(0.0),
            y: Span::fixed(100.0),
        })
        .with_size(Span::fixed(10.0));
    let mut store = Simulation::new()
        .with_expiry(ExpiryPolicy::respawn())
        .with_respawn_template(flake.clone())
        .with_random(SeededRandom::new(3))
        .build()
        .unwrap();

    store.spawn(Vec2::new(200.0, 405.0), 1, &flake);
    let old_id = store.snapshot()[0].id();

    // 405 + 100 * 0.1 = 415 > 400 + 10
    let report = store.tick(0.1, &square());
    assert_eq!(report.expired, 1);
    assert_eq!(report.respawned, 1);
    assert_eq!(store.len(), 1);

    let fresh = &store.snapshot()[0];
    assert_ne!(fresh.id(), old_id);
    assert_eq!(fresh.position.y, -10.0);
    assert!((0.0..=400.0).contains(&fresh.position.x));
    assert_eq!(fresh.age, 0.0);
}

#[test]
fn test_flake_exactly_at_limit_is_kept() {
    let flake = SpawnConfig::new().with_size(Span::fixed(10.0));
    let mut store = Simulation::new()
        .with_expiry(ExpiryPolicy::respawn())
        .build()
        .unwrap();
    store.spawn(Vec2::new(200.0, 410.0), 1, &flake);
    let report = store.tick(0.016, &square());
    assert_eq!(report.expired, 0);
    assert_eq!(store.snapshot()[0].position.y, 410.0);
}

#[test]
fn test_snowfall_count_stays_capped() {
    let effect = Effect::snowfall();
    let bounds = Bounds::from_size(400.0, 800.0);
    let mut store = effect
        .simulation()
        .with_random(SeededRandom::new(9))
        .build()
        .unwrap();

    let mut peak = 0;
    for _ in 0..(60 * 60) {
        let report = store.tick(1.0 / 60.0, &bounds);
        peak = peak.max(report.live);
    }
    assert_eq!(peak, 60);
    assert_eq!(store.len(), 60);
    for flake in store.snapshot() {
        assert!(flake.position.y <= bounds.max.y + flake.size);
        assert!((5.0..=15.0).contains(&flake.size));
    }
}

#[test]
fn test_huge_dt_tick_returns() {
    let effect = Effect::snowfall();
    let bounds = Bounds::from_size(400.0, 800.0);
    let mut store = effect
        .simulation()
        .with_random(SeededRandom::new(5))
        .build()
        .unwrap();
    store.tick(1.0 / 60.0, &bounds);

    let report = store.tick(1.0e9, &bounds);
    assert!(!report.skipped);
    assert!(report.emitted <= flurry::MAX_CATCH_UP_ROUNDS);
    assert!(store.len() <= 60);

    // Back to normal cadence afterwards.
    let report = store.tick(1.0 / 60.0, &bounds);
    assert!(!report.skipped);
    assert!(store.len() <= 60);
}

// ============================================================================
// Spawn, tick, snapshot basics
// ============================================================================

#[test]
fn test_tick_on_empty_store_stays_empty() {
    let mut store = Simulation::new().build().unwrap();
    for _ in 0..10 {
        let report = store.tick(0.016, &square());
        assert_eq!(report.live, 0);
        assert!(store.is_empty());
    }
}

#[test]
fn test_spawn_adds_exactly_n_at_origin() {
    let mut store = Simulation::new()
        .with_random(SeededRandom::new(1))
        .build()
        .unwrap();
    let config = Effect::explosion().touch_spawn;
    store.spawn(Vec2::new(10.0, 20.0), 3, &config);

    let report = store.spawn(Vec2::new(100.0, 100.0), 25, &config);
    assert_eq!(report.spawned, 25);
    assert_eq!(store.len(), 28);
    assert!(store
        .snapshot()
        .iter()
        .skip(3)
        .all(|e| e.position == Vec2::new(100.0, 100.0)));
}

#[test]
fn test_lifetime_expiry_on_schedule() {
    let mut store = Simulation::new().build().unwrap();
    store.spawn(Vec2::ZERO, 4, &SpawnConfig::new().with_lifetime(Span::fixed(1.0)));

    for _ in 0..9 {
        store.tick(0.1, &square());
    }
    assert_eq!(store.len(), 4);

    store.tick(0.1, &square());
    store.tick(0.1, &square());
    assert!(store.is_empty());
}

#[test]
fn test_bounce_reverses_and_damps() {
    let mut store = Simulation::new()
        .with_rule(Rule::BounceWalls { restitution: 0.5 })
        .build()
        .unwrap();
    let config = SpawnConfig::new().with_velocity(VelocitySpec::Components {
        x: Span::fixed(200.0),
        y: Span::fixed(0.0),
    });
    store.spawn(Vec2::new(395.0, 200.0), 1, &config);

    store.tick(0.1, &square());
    let e = &store.snapshot()[0];
    assert_eq!(e.position.x, 400.0);
    assert_eq!(e.velocity.x, -100.0);
}

#[test]
fn test_snapshot_feeds_renderer() {
    let effect = Effect::ripple();
    let mut store = effect.simulation().build().unwrap();
    effect.touch(&mut store, Vec2::new(50.0, 60.0));
    store.tick(0.25, &square());

    let instances = store.snapshot().to_instances();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].position, [50.0, 60.0]);
    assert_eq!(instances[0].color, [0.0, 0.0, 1.0]);
    assert!(instances[0].opacity < 1.0);
}

#[test]
fn test_deterministic_with_same_seed() {
    let run = |seed| {
        let effect = Effect::playground();
        let mut store = effect
            .simulation()
            .with_random(SeededRandom::new(seed))
            .build()
            .unwrap();
        effect.touch(&mut store, Vec2::new(200.0, 200.0));
        for _ in 0..120 {
            store.tick(1.0 / 60.0, &square());
        }
        store.snapshot().iter().map(|e| e.position).collect::<Vec<_>>()
    };
    assert_eq!(run(77), run(77));
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_session_stop_clears_and_stops() {
    let mut session = Simulation::new()
        .with_bounds(square())
        .start(FixedStep::hz60())
        .unwrap();
    session.spawn(Vec2::new(1.0, 1.0), 50, &SpawnConfig::default());
    session.run(Some(10), |_, snapshot| assert_eq!(snapshot.len(), 50));
    assert!(!session.source().is_stopped());

    let summary = session.stop();
    assert_eq!(summary, SessionSummary { ticks: 10, cleared: 50 });
}

#[test]
fn test_session_drop_clears_and_stops() {
    let (tx, rx) = std::sync::mpsc::channel();
    {
        let mut session = Simulation::new()
            .with_bounds(square())
            .start(FixedStep::limited(1.0 / 60.0, 3))
            .unwrap();
        session.on_stop(move |summary| {
            let _ = tx.send(*summary);
        });
        session.spawn(Vec2::new(1.0, 1.0), 12, &SpawnConfig::default());
        while session.step().is_some() {}
        assert!(session.source().is_stopped());
    }

    assert_eq!(rx.try_recv(), Ok(SessionSummary { ticks: 3, cleared: 12 }));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_countdown_shares_tick_deltas() {
    let mut countdown = Countdown::new(1.0);
    countdown.start();

    let mut session = Simulation::new().start(FixedStep::limited(0.1, 20)).unwrap();
    let mut completions = 0;
    while session.step().is_some() {
        if countdown.advance(f64::from(session.source().dt())) == Some(CountdownEvent::Completed) {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);
    assert!(!countdown.is_running());
    assert_eq!(countdown.display(), "00:01.0");
}

#[test]
fn test_bad_ticks_never_corrupt_state() {
    let mut store = Simulation::new()
        .with_rule(Rule::Gravity(Vec2::new(0.0, 100.0)))
        .build()
        .unwrap();
    store.spawn(Vec2::new(5.0, 5.0), 2, &SpawnConfig::default());
    let before: Vec<_> = store.snapshot().iter().cloned().collect();

    assert!(store.tick(-0.016, &square()).skipped);
    assert!(store.tick(f32::INFINITY, &square()).skipped);
    assert!(store.tick(0.016, &Bounds::new(0.0, 0.0, f32::NAN, 10.0)).skipped);

    let after: Vec<_> = store.snapshot().iter().cloned().collect();
    assert_eq!(before, after);
}
