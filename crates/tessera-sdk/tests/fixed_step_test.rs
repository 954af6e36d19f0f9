//! Frame pacing through the engine: step counts, interpolation and stall policies.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tessera_sdk::prelude::*;
use tessera_sdk::FixedStepClock;

// Dyadic step and frame times keep the accumulator exact.
const STEP: f64 = 0.0625;

struct CountUpdates(Arc<AtomicU32>);

#[async_trait]
impl Module for CountUpdates {
    fn id(&self) -> &str {
        "test/count-updates"
    }

    fn update(&mut self, _ctx: &Context, dt: f64) -> anyhow::Result<()> {
        assert_eq!(dt, STEP);
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct CountAnyUpdates(Arc<AtomicU32>);

#[async_trait]
impl Module for CountAnyUpdates {
    fn id(&self) -> &str {
        "test/count-any-updates"
    }

    fn update(&mut self, _ctx: &Context, _dt: f64) -> anyhow::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn engine(policy: StallPolicy) -> (Engine, Arc<AtomicU32>) {
    let updates = Arc::new(AtomicU32::new(0));
    let config = EngineConfig::default()
        .with_fixed_step(STEP)
        .with_stall_policy(policy);
    let mut engine = Engine::new(config).unwrap();
    engine.add(CountUpdates(updates.clone())).unwrap();
    engine.init().await.unwrap();
    engine.start().await.unwrap();
    (engine, updates)
}

// ─────────────────────────────────────────────────────────────────────────────
// Uncapped stepping
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_steps_match_elapsed_time() {
    let (mut engine, updates) = engine(StallPolicy::Uncapped).await;
    let mut now = 1_000.0;
    engine.tick(now).unwrap();

    for delta in [7.8125, 31.25, 93.75, 0.0, 15.625, 250.0, 3.90625, 62.5] {
        now += delta;
        let tick = engine.tick(now).unwrap();
        assert!((0.0..1.0).contains(&tick.alpha));
        assert!(!tick.stalled);
    }

    let elapsed_s = (now - 1_000.0) / 1000.0;
    let expected = (elapsed_s / STEP).floor() as u64;
    assert_eq!(engine.step_count(), expected);
    assert_eq!(u64::from(updates.load(Ordering::SeqCst)), expected);
}

#[tokio::test]
async fn test_going_back_in_time_runs_no_update() {
    let (mut engine, updates) = engine(StallPolicy::Uncapped).await;
    engine.tick(500.0).unwrap();
    let tick = engine.tick(250.0).unwrap();
    assert_eq!(tick.steps, 0);
    let tick = engine.tick(f64::NAN).unwrap();
    assert_eq!(tick.steps, 0);
    assert_eq!(updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_default_step_matches_elapsed_time_every_frame() {
    let updates = Arc::new(AtomicU32::new(0));
    let config = EngineConfig::default().with_stall_policy(StallPolicy::Uncapped);
    let step = config.fixed_step;
    let mut engine = Engine::new(config).unwrap();
    engine.add(CountAnyUpdates(updates.clone())).unwrap();
    engine.init().await.unwrap();
    engine.start().await.unwrap();

    for frame in 0..=600u32 {
        let tick = engine.tick(f64::from(frame) * 1000.0 / 60.0).unwrap();
        assert!((0.0..1.0).contains(&tick.alpha), "frame {frame}");
        assert_eq!(updates.load(Ordering::SeqCst), frame, "frame {frame}");
    }
    assert_eq!(engine.step_count(), (10.0 / step).round() as u64);
}

// ─────────────────────────────────────────────────────────────────────────────
// Stall policies
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_clamp_frame_limits_catch_up() {
    let (mut engine, updates) = engine(StallPolicy::ClampFrame {
        max_frame_ms: 250.0,
    })
    .await;
    engine.tick(0.0).unwrap();

    let tick = engine.tick(10_000.0).unwrap();
    assert!(tick.stalled);
    assert_eq!(tick.steps, 4);
    assert_eq!(updates.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_drop_backlog_caps_steps_and_keeps_the_phase() {
    let (mut engine, updates) = engine(StallPolicy::DropBacklog { max_steps: 3 }).await;
    engine.tick(0.0).unwrap();

    // 10.5 steps worth of time.
    let tick = engine.tick(656.25).unwrap();
    assert!(tick.stalled);
    assert_eq!(tick.steps, 3);
    assert_eq!(tick.alpha, 0.5);
    assert_eq!(updates.load(Ordering::SeqCst), 3);
}

#[test]
fn test_clock_reset_forgets_the_time_base() {
    let mut clock = FixedStepClock::new(STEP, StallPolicy::Uncapped);
    clock.advance(0.0);
    clock.advance(31.25);
    assert_eq!(clock.accumulator(), 0.03125);

    clock.reset();
    assert_eq!(clock.advance(10_000.0).steps, 0);
    assert_eq!(clock.accumulator(), 0.0);
}
