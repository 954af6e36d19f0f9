//! Integration tests for the engine lifecycle, hook ordering and event fan-out.

use std::sync::{Arc, Mutex};

use tessera_sdk::prelude::*;
use tessera_sdk::{EnginePhase, HookPhase};
use tessera_core::error::ServiceError;

type Journal = Arc<Mutex<Vec<String>>>;

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Records every hook it receives as `"<hook>:<id>"`.
struct Probe {
    id: &'static str,
    journal: Journal,
    fail_update: bool,
    fail_on_event: bool,
}

impl Probe {
    fn new(id: &'static str, journal: &Journal) -> Self {
        Self {
            id,
            journal: journal.clone(),
            fail_update: false,
            fail_on_event: false,
        }
    }

    fn record(&self, hook: &str) {
        self.journal.lock().unwrap().push(format!("{hook}:{}", self.id));
    }
}

#[async_trait]
impl Module for Probe {
    fn id(&self) -> &str {
        self.id
    }

    async fn init(&mut self, _ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        self.record("init");
        Ok(())
    }

    async fn start(&mut self, _ctx: &Context) -> anyhow::Result<()> {
        self.record("start");
        Ok(())
    }

    fn update(&mut self, _ctx: &Context, _dt: f64) -> anyhow::Result<()> {
        self.record("update");
        if self.fail_update {
            anyhow::bail!("simulation exploded");
        }
        Ok(())
    }

    fn render(&mut self, _ctx: &Context, _alpha: f64) -> anyhow::Result<()> {
        self.record("render");
        Ok(())
    }

    fn on_event(&mut self, _ctx: &Context, event: &EngineEvent) -> anyhow::Result<()> {
        if let EngineEvent::Custom { name, .. } = event {
            self.record(&format!("event[{name}]"));
        }
        if self.fail_on_event {
            anyhow::bail!("handler broke");
        }
        Ok(())
    }

    fn destroy(&mut self, _ctx: &Context) {
        self.record("destroy");
    }
}

// Dyadic step so tick times map to exact step counts.
fn config() -> EngineConfig {
    EngineConfig::default().with_fixed_step(0.0625)
}

async fn running(modules: Vec<Box<dyn Module>>) -> Engine {
    tessera_sdk::logging::init_for_tests();
    let mut engine = Engine::new(config()).unwrap();
    for module in modules {
        engine.add_boxed(module).unwrap();
    }
    engine.init().await.unwrap();
    engine.start().await.unwrap();
    engine
}

// ─────────────────────────────────────────────────────────────────────────────
// Ordering
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_hooks_run_in_registration_order() {
    let log = journal();
    let mut engine = running(vec![
        Box::new(Probe::new("a", &log)),
        Box::new(Probe::new("b", &log)),
    ])
    .await;

    engine.tick(0.0).unwrap();
    let tick = engine.tick(62.5).unwrap();
    assert_eq!(tick.steps, 1);
    engine.stop();

    assert_eq!(
        entries(&log),
        vec![
            "init:a", "init:b", "start:a", "start:b", "render:a", "render:b", "update:a",
            "update:b", "render:a", "render:b", "destroy:a", "destroy:b",
        ]
    );
    assert_eq!(engine.frame_count(), 2);
    assert_eq!(engine.step_count(), 1);
}

#[tokio::test]
async fn test_all_updates_of_a_frame_precede_its_renders() {
    let log = journal();
    let mut engine = running(vec![
        Box::new(Probe::new("a", &log)),
        Box::new(Probe::new("b", &log)),
    ])
    .await;
    engine.tick(0.0).unwrap();
    log.lock().unwrap().clear();

    let tick = engine.tick(187.5).unwrap();
    assert_eq!(tick.steps, 3);

    let hooks = entries(&log);
    let last_update = hooks.iter().rposition(|h| h.starts_with("update")).unwrap();
    let first_render = hooks.iter().position(|h| h.starts_with("render")).unwrap();
    assert!(last_update < first_render);
    assert_eq!(hooks.len(), 3 * 2 + 2);
}

#[tokio::test]
async fn test_duplicate_ids_both_receive_every_hook() {
    let log = journal();
    let mut engine = running(vec![
        Box::new(Probe::new("dup", &log)),
        Box::new(Probe::new("dup", &log)),
    ])
    .await;
    assert_eq!(engine.module_ids(), vec!["dup", "dup"]);

    engine.tick(0.0).unwrap();
    engine.stop();

    assert_eq!(
        entries(&log),
        vec![
            "init:dup", "init:dup", "start:dup", "start:dup", "render:dup", "render:dup",
            "destroy:dup", "destroy:dup",
        ]
    );
}

#[tokio::test]
async fn test_alpha_stays_below_one() {
    let log = journal();
    let mut engine = running(vec![Box::new(Probe::new("a", &log))]).await;
    engine.tick(0.0).unwrap();
    for now in [15.625, 46.875, 62.5, 109.375, 125.0] {
        let tick = engine.tick(now).unwrap();
        assert!((0.0..1.0).contains(&tick.alpha));
        assert_eq!(engine.last_alpha(), tick.alpha);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle guards
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stop_destroys_exactly_once() {
    let log = journal();
    let mut engine = running(vec![Box::new(Probe::new("a", &log))]).await;
    engine.stop();
    engine.stop();
    drop(engine);

    let destroys = entries(&log).iter().filter(|h| h.starts_with("destroy")).count();
    assert_eq!(destroys, 1);
}

#[tokio::test]
async fn test_dropping_a_running_engine_destroys_modules() {
    let log = journal();
    let engine = running(vec![Box::new(Probe::new("a", &log))]).await;
    drop(engine);
    assert_eq!(entries(&log).last().map(String::as_str), Some("destroy:a"));
}

#[tokio::test]
async fn test_no_hook_runs_after_stop() {
    let log = journal();
    let mut engine = running(vec![Box::new(Probe::new("a", &log))]).await;
    engine.stop();
    let before = entries(&log).len();

    assert!(matches!(
        engine.tick(100.0),
        Err(EngineError::InvalidPhase {
            phase: EnginePhase::Stopped,
            ..
        })
    ));
    assert!(engine.emit(EngineEvent::custom("late", Default::default())).is_err());
    assert_eq!(entries(&log).len(), before);
}

#[tokio::test]
async fn test_lifecycle_methods_check_the_phase() {
    let log = journal();
    let mut engine = Engine::new(config()).unwrap();
    engine.add(Probe::new("a", &log)).unwrap();

    assert!(matches!(engine.tick(0.0), Err(EngineError::InvalidPhase { .. })));
    assert!(matches!(engine.start().await, Err(EngineError::InvalidPhase { .. })));

    engine.init().await.unwrap();
    assert_eq!(engine.phase(), EnginePhase::Initialized);
    assert!(engine.add(Probe::new("late", &log)).is_err());
    assert!(matches!(engine.init().await, Err(EngineError::InvalidPhase { .. })));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = EngineConfig::default().with_fixed_step(0.0);
    assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
}

// ─────────────────────────────────────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_errors_propagate_and_stop_the_frame() {
    let log = journal();
    let mut failing = Probe::new("bad", &log);
    failing.fail_update = true;
    let mut engine = running(vec![Box::new(failing), Box::new(Probe::new("next", &log))]).await;
    engine.tick(0.0).unwrap();
    log.lock().unwrap().clear();

    let err = engine.tick(62.5).unwrap_err();
    match &err {
        EngineError::ModuleLifecycle { module, phase, .. } => {
            assert_eq!(module, "bad");
            assert_eq!(*phase, HookPhase::Update);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(entries(&log), vec!["update:bad"]);
}

#[tokio::test]
async fn test_on_event_failures_are_isolated() {
    let log = journal();
    let mut broken = Probe::new("broken", &log);
    broken.fail_on_event = true;
    let mut engine = running(vec![Box::new(broken), Box::new(Probe::new("ok", &log))]).await;
    log.lock().unwrap().clear();

    engine
        .emit(EngineEvent::custom("ping", serde_json::json!({ "n": 1 })))
        .unwrap();

    assert_eq!(entries(&log), vec!["event[ping]:broken", "event[ping]:ok"]);
}

struct FailingInit;

#[async_trait]
impl Module for FailingInit {
    fn id(&self) -> &str {
        "bad/init"
    }

    async fn init(&mut self, _ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        anyhow::bail!("no device")
    }
}

#[tokio::test]
async fn test_init_failure_stops_the_engine() {
    let log = journal();
    let mut engine = Engine::new(config()).unwrap();
    engine
        .add(FailingInit)
        .unwrap()
        .add(Probe::new("after", &log))
        .unwrap();

    let err = engine.init().await.unwrap_err();
    assert!(err.to_string().contains("bad/init"));
    assert_eq!(engine.phase(), EnginePhase::Stopped);
    assert!(entries(&log).is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Services and events
// ─────────────────────────────────────────────────────────────────────────────

/// Emits a custom event from `update`.
struct Emitter;

#[async_trait]
impl Module for Emitter {
    fn id(&self) -> &str {
        "game/emitter"
    }

    fn update(&mut self, ctx: &Context, _dt: f64) -> anyhow::Result<()> {
        ctx.bus
            .emit(&EngineEvent::custom("game/step", serde_json::Value::Null));
        Ok(())
    }
}

#[tokio::test]
async fn test_events_emitted_in_hooks_reach_every_module_before_the_next_hook() {
    let log = journal();
    let mut engine = running(vec![
        Box::new(Probe::new("before", &log)),
        Box::new(Emitter),
        Box::new(Probe::new("after", &log)),
    ])
    .await;
    let bus_hits = Arc::new(Mutex::new(0));
    let hits = bus_hits.clone();
    let _sub = engine.bus().on_fn(EventKind::custom("game/step"), move |_| {
        *hits.lock().unwrap() += 1;
    });
    engine.tick(0.0).unwrap();
    log.lock().unwrap().clear();

    engine.tick(62.5).unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "update:before",
            "event[game/step]:before",
            "event[game/step]:after",
            "update:after",
            "render:before",
            "render:after",
        ]
    );
    assert_eq!(*bus_hits.lock().unwrap(), 1);
}

/// Re-emits every custom event it receives, forever.
struct Echo {
    heard: Arc<Mutex<usize>>,
}

#[async_trait]
impl Module for Echo {
    fn id(&self) -> &str {
        "game/echo"
    }

    fn on_event(&mut self, ctx: &Context, event: &EngineEvent) -> anyhow::Result<()> {
        *self.heard.lock().unwrap() += 1;
        ctx.bus.emit(event);
        Ok(())
    }
}

#[tokio::test]
async fn test_event_cascades_stop_after_the_round_limit() {
    let heard = Arc::new(Mutex::new(0));
    let mut engine = running(vec![Box::new(Echo {
        heard: heard.clone(),
    })])
    .await;

    engine
        .emit(EngineEvent::custom("echo", serde_json::Value::Null))
        .unwrap();
    assert_eq!(*heard.lock().unwrap(), tessera_sdk::MAX_FANOUT_ROUNDS);

    // The leftover echo was dropped, so the next emit starts a fresh cascade.
    engine
        .emit(EngineEvent::custom("echo", serde_json::Value::Null))
        .unwrap();
    assert_eq!(*heard.lock().unwrap(), 2 * tessera_sdk::MAX_FANOUT_ROUNDS);
}

tessera_core::define_token!(ScoreToken => Mutex<u32>, "test/score");

struct NeedsScore;

#[async_trait]
impl Module for NeedsScore {
    fn id(&self) -> &str {
        "game/needs-score"
    }

    async fn start(&mut self, ctx: &Context) -> anyhow::Result<()> {
        ctx.services.get_or_err::<ScoreToken>()?;
        Ok(())
    }
}

struct ProvidesScore;

#[async_trait]
impl Module for ProvidesScore {
    fn id(&self) -> &str {
        "game/score"
    }

    async fn init(&mut self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        ctx.services.set::<ScoreToken>(Arc::new(Mutex::new(0)));
        Ok(())
    }
}

#[tokio::test]
async fn test_missing_service_fails_start_with_attribution() {
    let mut engine = Engine::new(config()).unwrap();
    engine.add(NeedsScore).unwrap();
    engine.init().await.unwrap();

    let err = engine.start().await.unwrap_err();
    assert_eq!(
        err.service_error(),
        Some(&ServiceError::Missing {
            token: "test/score"
        })
    );
    assert!(err.to_string().contains("game/needs-score"));
}

#[tokio::test]
async fn test_whitelist_hides_ungranted_services() {
    let mut engine = Engine::new(config())
        .unwrap()
        .with_whitelist(|module: &dyn Module| match module.id() {
            "game/needs-score" => Some(Vec::new()),
            _ => None,
        });
    engine.add(ProvidesScore).unwrap().add(NeedsScore).unwrap();
    engine.init().await.unwrap();
    assert!(engine.services().unwrap().has::<ScoreToken>());

    let err = engine.start().await.unwrap_err();
    assert_eq!(
        err.service_error(),
        Some(&ServiceError::Unauthorized {
            token: "test/score",
            module: "game/needs-score".to_string(),
        })
    );
}

#[tokio::test]
async fn test_granted_services_resolve() {
    let mut engine = Engine::new(config())
        .unwrap()
        .with_whitelist(|module: &dyn Module| match module.id() {
            "game/needs-score" => Some(vec![TokenId::of::<ScoreToken>()]),
            _ => None,
        });
    engine.add(ProvidesScore).unwrap().add(NeedsScore).unwrap();
    engine.init().await.unwrap();
    engine.start().await.unwrap();
    assert_eq!(engine.phase(), EnginePhase::Running);
}

// ─────────────────────────────────────────────────────────────────────────────
// Run loop
// ─────────────────────────────────────────────────────────────────────────────

/// Requests a stop after a fixed number of renders.
struct StopAfter {
    remaining: u32,
    stop: StopHandle,
}

#[async_trait]
impl Module for StopAfter {
    fn id(&self) -> &str {
        "test/stop-after"
    }

    fn render(&mut self, _ctx: &Context, _alpha: f64) -> anyhow::Result<()> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.stop.request_stop();
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_run_ticks_until_stop_is_requested() {
    let log = journal();
    let mut engine = Engine::new(config().with_target_fps(500)).unwrap();
    let stop = engine.stop_handle();
    engine
        .add(Probe::new("a", &log))
        .unwrap()
        .add(StopAfter { remaining: 3, stop })
        .unwrap();

    engine.run().await.unwrap();

    assert_eq!(engine.frame_count(), 3);
    assert_eq!(engine.phase(), EnginePhase::Stopped);
    let hooks = entries(&log);
    assert_eq!(hooks.first().map(String::as_str), Some("init:a"));
    assert_eq!(hooks.last().map(String::as_str), Some("destroy:a"));
}
