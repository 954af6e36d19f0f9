//! Collaborator ports wired through the engine: a toy solver behind the
//! physics ports and an in-memory loader behind the assets port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tessera_core::ports::{
    AssetsPort, AssetsToken, BodyDesc, BodyHandle, BodyKind, ColliderShape, ImageInfo,
    PhysicsReadPort, PhysicsReadToken, PhysicsStepPort, PhysicsStepToken, PhysicsWritePort,
    PhysicsWriteToken, RayHit,
};
use tessera_sdk::prelude::*;
use tessera_sdk::EnginePhase;

#[derive(Debug, Clone, Copy)]
struct Body {
    position: Vec2,
    velocity: Vec2,
    force: Vec2,
    mass: f32,
    kind: BodyKind,
}

/// Explicit Euler integration without collisions.
#[derive(Default)]
struct ToySolver {
    bodies: Mutex<HashMap<BodyHandle, Body>>,
    next: Mutex<u64>,
}

impl ToySolver {
    fn with_body<R>(&self, body: BodyHandle, f: impl FnOnce(&mut Body) -> R) -> Option<R> {
        self.bodies.lock().unwrap().get_mut(&body).map(f)
    }
}

impl PhysicsReadPort for ToySolver {
    fn transform(&self, body: BodyHandle) -> Option<(Vec2, f32)> {
        self.with_body(body, |b| (b.position, 0.0))
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.with_body(body, |b| b.velocity)
    }

    fn query_rect(&self, area: Rect) -> Vec<BodyHandle> {
        let mut hits: Vec<BodyHandle> = self
            .bodies
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, b)| area.contains_point(b.position))
            .map(|(handle, _)| *handle)
            .collect();
        hits.sort_by_key(|h| h.0);
        hits
    }

    fn ray_cast(&self, _origin: Vec2, _direction: Vec2, _max_distance: f32) -> Option<RayHit> {
        None
    }
}

impl PhysicsWritePort for ToySolver {
    fn create_body(&self, desc: BodyDesc) -> BodyHandle {
        let mut next = self.next.lock().unwrap();
        *next += 1;
        let handle = BodyHandle(*next);
        self.bodies.lock().unwrap().insert(
            handle,
            Body {
                position: desc.position,
                velocity: desc.linear_velocity,
                force: Vec2::ZERO,
                mass: desc.mass,
                kind: desc.kind,
            },
        );
        handle
    }

    fn remove_body(&self, body: BodyHandle) -> bool {
        self.bodies.lock().unwrap().remove(&body).is_some()
    }

    fn set_transform(&self, body: BodyHandle, position: Vec2, _rotation: f32) -> bool {
        self.with_body(body, |b| b.position = position).is_some()
    }

    fn set_velocity(&self, body: BodyHandle, velocity: Vec2) -> bool {
        self.with_body(body, |b| b.velocity = velocity).is_some()
    }

    fn apply_force(&self, body: BodyHandle, force: Vec2) -> bool {
        self.with_body(body, |b| b.force = b.force + force).is_some()
    }

    fn apply_impulse(&self, body: BodyHandle, impulse: Vec2) -> bool {
        self.with_body(body, |b| b.velocity = b.velocity + impulse * (1.0 / b.mass))
            .is_some()
    }
}

impl PhysicsStepPort for ToySolver {
    fn step(&self, dt: f64, substeps: u32) {
        let h = dt as f32 / substeps.max(1) as f32;
        for body in self.bodies.lock().unwrap().values_mut() {
            if body.kind != BodyKind::Dynamic {
                continue;
            }
            for _ in 0..substeps.max(1) {
                body.velocity = body.velocity + body.force * (h / body.mass);
                body.position = body.position + body.velocity * h;
            }
            body.force = Vec2::ZERO;
        }
    }
}

/// Owns the solver and steps it once per fixed update.
struct PhysicsModule {
    solver: Arc<ToySolver>,
}

#[async_trait]
impl Module for PhysicsModule {
    fn id(&self) -> &str {
        "core/physics"
    }

    async fn init(&mut self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        ctx.services.set::<PhysicsReadToken>(self.solver.clone());
        ctx.services.set::<PhysicsWriteToken>(self.solver.clone());
        ctx.services.set::<PhysicsStepToken>(self.solver.clone());
        Ok(())
    }

    fn update(&mut self, _ctx: &Context, dt: f64) -> anyhow::Result<()> {
        self.solver.step(dt, 2);
        Ok(())
    }
}

/// Resolves image loads after yielding to the runtime once.
#[derive(Default)]
struct MemoryAssets {
    images: Mutex<HashMap<String, ImageInfo>>,
}

#[async_trait]
impl AssetsPort for MemoryAssets {
    async fn load_image(&self, key: &str, url: &str) -> anyhow::Result<ImageInfo> {
        tokio::task::yield_now().await;
        let info = match url {
            "mem://hero.png" => ImageInfo {
                width: 32,
                height: 48,
            },
            other => anyhow::bail!("no such image '{other}'"),
        };
        self.images.lock().unwrap().insert(key.to_string(), info);
        Ok(info)
    }

    fn image(&self, key: &str) -> Option<ImageInfo> {
        self.images.lock().unwrap().get(key).copied()
    }
}

struct AssetsModule;

#[async_trait]
impl Module for AssetsModule {
    fn id(&self) -> &str {
        "core/assets"
    }

    async fn init(&mut self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        ctx.services.set::<AssetsToken>(Arc::new(MemoryAssets::default()));
        Ok(())
    }
}

/// Loads its sprite in `start` and drops a ball in `start`.
struct Player {
    url: &'static str,
    ball: Arc<Mutex<Option<BodyHandle>>>,
}

impl Player {
    const ID: &'static str = "game/player";
}

#[async_trait]
impl Module for Player {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn start(&mut self, ctx: &Context) -> anyhow::Result<()> {
        let assets = ctx.services.get_or_err::<AssetsToken>()?;
        assets.load_image("hero", self.url).await?;

        let physics = ctx.services.get_or_err::<PhysicsWriteToken>()?;
        let ball = physics.create_body(BodyDesc {
            position: Vec2::new(0.0, 10.0),
            rotation: 0.0,
            kind: BodyKind::Dynamic,
            shape: ColliderShape::Circle(0.5),
            linear_velocity: Vec2::new(1.0, 0.0),
            mass: 2.0,
        });
        *self.ball.lock().unwrap() = Some(ball);
        Ok(())
    }
}

fn grants(module: &dyn Module) -> Option<Vec<TokenId>> {
    match module.id() {
        Player::ID => Some(vec![
            TokenId::of::<AssetsToken>(),
            TokenId::of::<PhysicsReadToken>(),
            TokenId::of::<PhysicsWriteToken>(),
        ]),
        _ => None,
    }
}

fn engine(url: &'static str) -> (Engine, Arc<Mutex<Option<BodyHandle>>>) {
    let ball = Arc::new(Mutex::new(None));
    let mut engine = Engine::new(EngineConfig::default().with_fixed_step(0.0625))
        .unwrap()
        .with_whitelist(grants);
    engine
        .add(PhysicsModule {
            solver: Arc::new(ToySolver::default()),
        })
        .unwrap()
        .add(AssetsModule)
        .unwrap()
        .add(Player {
            url,
            ball: ball.clone(),
        })
        .unwrap();
    (engine, ball)
}

// ─────────────────────────────────────────────────────────────────────────────
// Assets
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_awaits_asset_loads() {
    let (mut engine, _) = engine("mem://hero.png");
    engine.init().await.unwrap();
    engine.start().await.unwrap();

    let assets = engine.services().and_then(|s| s.get::<AssetsToken>()).unwrap();
    assert_eq!(
        assets.image("hero"),
        Some(ImageInfo {
            width: 32,
            height: 48
        })
    );
}

#[tokio::test]
async fn test_failed_load_fails_start() {
    let (mut engine, _) = engine("mem://missing.png");
    engine.init().await.unwrap();

    let err = engine.start().await.unwrap_err();
    assert!(err.to_string().contains(Player::ID));
    assert_eq!(engine.phase(), EnginePhase::Initialized);
}

// ─────────────────────────────────────────────────────────────────────────────
// Physics
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bodies_move_with_fixed_steps() {
    let (mut engine, ball) = engine("mem://hero.png");
    engine.init().await.unwrap();
    engine.start().await.unwrap();
    let ball = ball.lock().unwrap().unwrap();

    engine.tick(0.0).unwrap();
    engine.tick(250.0).unwrap();
    assert_eq!(engine.step_count(), 4);

    let physics = engine
        .services()
        .and_then(|s| s.get::<PhysicsReadToken>())
        .unwrap();
    let (position, _) = physics.transform(ball).unwrap();
    assert_eq!(position, Vec2::new(0.25, 10.0));
    assert_eq!(physics.query_rect(Rect::new(0.0, 9.0, 1.0, 2.0)), vec![ball]);
}

#[tokio::test]
async fn test_impulses_and_unknown_bodies() {
    let (mut engine, ball) = engine("mem://hero.png");
    engine.init().await.unwrap();
    engine.start().await.unwrap();
    let ball = ball.lock().unwrap().unwrap();
    let services = engine.services().unwrap();
    let write = services.get::<PhysicsWriteToken>().unwrap();
    let read = services.get::<PhysicsReadToken>().unwrap();

    assert!(write.apply_impulse(ball, Vec2::new(2.0, 0.0)));
    assert_eq!(read.velocity(ball), Some(Vec2::new(2.0, 0.0)));

    assert!(write.remove_body(ball));
    assert!(!write.set_velocity(ball, Vec2::ZERO));
    assert_eq!(read.transform(ball), None);
}

#[tokio::test]
async fn test_gameplay_cannot_step_the_solver() {
    let (mut engine, _) = engine("mem://hero.png");
    engine.init().await.unwrap();
    engine.start().await.unwrap();

    let view = tessera_core::service::ServiceView::restricted(
        engine.services().unwrap().clone(),
        Player::ID,
        grants(&Player {
            url: "",
            ball: Arc::default(),
        })
        .unwrap(),
    );
    assert!(view.get::<PhysicsStepToken>().is_none());
    assert!(view.has::<PhysicsWriteToken>());
}
