//! Headless sandbox: a few bouncing balls drawn through the log backend.
//!
//! Run with `RUST_LOG=debug` to see every backend call, and set
//! `TESSERA_FRAMES` to change how many frames are rendered before exiting.

use std::sync::Arc;

use tessera_sdk::logging;
use tessera_sdk::prelude::*;
use tessera_sdk::tessera_core::renderer::RenderQueueDrainToken;

const DEFAULT_FRAMES: u64 = 180;
const GRAVITY: f32 = -9.81;
const FLOOR_Y: f32 = 0.0;
const WALL_X: f32 = 8.0;

struct Ball {
    previous: Vec2,
    position: Vec2,
    velocity: Vec2,
    radius: f32,
}

/// Simulates balls under gravity and draws them interpolated between steps.
struct Bouncer {
    balls: Vec<Ball>,
    queue: Option<Arc<dyn RenderQueuePort>>,
    input: Option<Arc<dyn InputReadPort>>,
}

impl Bouncer {
    const ID: &'static str = "game/bouncer";

    fn new() -> Self {
        let balls = (0..5)
            .map(|i| {
                let position = Vec2::new(-4.0 + 2.0 * i as f32, 3.0 + i as f32);
                Ball {
                    previous: position,
                    position,
                    velocity: Vec2::new(1.5 - 0.75 * i as f32, 0.0),
                    radius: 0.25 + 0.05 * i as f32,
                }
            })
            .collect();
        Self {
            balls,
            queue: None,
            input: None,
        }
    }
}

#[async_trait]
impl Module for Bouncer {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn start(&mut self, ctx: &Context) -> anyhow::Result<()> {
        self.queue = Some(ctx.services.get_or_err::<RenderQueueWriteToken>()?);
        self.input = ctx.services.get::<InputReadToken>();
        Ok(())
    }

    fn update(&mut self, ctx: &Context, dt: f64) -> anyhow::Result<()> {
        let dt = dt as f32;
        let kick = self.input.as_ref().is_some_and(|i| i.is_down("Space"));
        for (index, ball) in self.balls.iter_mut().enumerate() {
            ball.previous = ball.position;
            if kick {
                ball.velocity.y += 0.5;
            }
            ball.velocity.y += GRAVITY * dt;
            ball.position = ball.position + ball.velocity * dt;

            if ball.position.y - ball.radius < FLOOR_Y && ball.velocity.y < 0.0 {
                ball.position.y = FLOOR_Y + ball.radius;
                ball.velocity.y = -ball.velocity.y * 0.8;
                ctx.bus.emit(&EngineEvent::custom(
                    "game/bounce",
                    serde_json::json!({ "ball": index }),
                ));
            }
            if ball.position.x.abs() + ball.radius > WALL_X {
                ball.velocity.x = -ball.velocity.x;
            }
        }
        Ok(())
    }

    fn render(&mut self, _ctx: &Context, alpha: f64) -> anyhow::Result<()> {
        let Some(queue) = &self.queue else {
            anyhow::bail!("bouncer rendered before start");
        };
        let mut commands = Vec::with_capacity(self.balls.len() + 1);
        commands.push(
            RenderCommand::rect("world", Space::World, -WALL_X, FLOOR_Y - 0.5, 2.0 * WALL_X, 0.5)
                .with_id("floor")
                .with_layer("bg")
                .with_material("flat/grey")
                .with_shape_bounds(),
        );
        for (index, ball) in self.balls.iter().enumerate() {
            let center = Vec2::lerp(ball.previous, ball.position, alpha as f32);
            commands.push(
                RenderCommand::circle("world", Space::World, center, ball.radius)
                    .with_id(format!("ball-{index}"))
                    .with_layer("actors")
                    .with_z(index as f32)
                    .with_material("flat/orange")
                    .with_shape_bounds(),
            );
        }
        queue.push_many(commands);
        Ok(())
    }
}

/// Draws a status line in the UI pass and counts bounces.
#[derive(Default)]
struct Hud {
    queue: Option<Arc<dyn RenderQueuePort>>,
    bounces: u64,
    frames: u64,
}

impl Hud {
    const ID: &'static str = "game/hud";
}

#[async_trait]
impl Module for Hud {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn start(&mut self, ctx: &Context) -> anyhow::Result<()> {
        self.queue = Some(ctx.services.get_or_err::<RenderQueueWriteToken>()?);
        Ok(())
    }

    fn render(&mut self, _ctx: &Context, _alpha: f64) -> anyhow::Result<()> {
        self.frames += 1;
        if let Some(queue) = &self.queue {
            queue.push(
                RenderCommand::text(
                    "ui",
                    Space::Ui,
                    Vec2::new(8.0, 20.0),
                    format!("frame {} | bounces {}", self.frames, self.bounces),
                    16.0,
                )
                .with_id("hud/status")
                .with_material("font/mono"),
            );
        }
        Ok(())
    }

    fn on_event(&mut self, _ctx: &Context, event: &EngineEvent) -> anyhow::Result<()> {
        if let EngineEvent::Custom { name, .. } = event {
            if name == "game/bounce" {
                self.bounces += 1;
            }
        }
        Ok(())
    }

    fn destroy(&mut self, _ctx: &Context) {
        log::info!("Hud: {} bounce(s) over {} frame(s).", self.bounces, self.frames);
    }
}

/// Stops the engine after a fixed number of rendered frames.
struct FrameLimit {
    remaining: u64,
    stop: StopHandle,
}

#[async_trait]
impl Module for FrameLimit {
    fn id(&self) -> &str {
        "sandbox/frame-limit"
    }

    fn render(&mut self, _ctx: &Context, _alpha: f64) -> anyhow::Result<()> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.stop.request_stop();
        }
        Ok(())
    }
}

fn frame_budget() -> u64 {
    match std::env::var("TESSERA_FRAMES") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Sandbox: ignoring invalid TESSERA_FRAMES '{raw}'.");
            DEFAULT_FRAMES
        }),
        Err(_) => DEFAULT_FRAMES,
    }
}

fn grants(module: &dyn Module) -> Option<Vec<TokenId>> {
    match module.id() {
        Bouncer::ID => Some(vec![
            TokenId::of::<RenderQueueWriteToken>(),
            TokenId::of::<InputReadToken>(),
        ]),
        Hud::ID => Some(vec![TokenId::of::<RenderQueueWriteToken>()]),
        RenderCoordinatorModule::ID => Some(vec![
            TokenId::of::<RenderQueueDrainToken>(),
            TokenId::of::<RenderBackendToken>(),
            TokenId::of::<CameraReadToken>(),
        ]),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info");

    let config = EngineConfig::new(800, 600).with_passes(vec![
        PassConfig::new("world", Space::World)
            .with_layers(["bg", "actors"])
            .with_clear(true),
        PassConfig::new("ui", Space::Ui),
    ]);
    let camera = CameraSnapshot {
        position: Vec2::new(0.0, 4.0),
        ..CameraSnapshot::default()
    };

    let mut engine = Engine::new(config)?.with_whitelist(grants);
    let stop = engine.stop_handle();
    engine
        .add(InputModule::new())?
        .add(CameraModule::with_snapshot(camera))?
        .add(RenderQueueModule::new())?
        .add(RenderBackendModule::new(LogBackend::new()))?
        .add(Bouncer::new())?
        .add(Hud::default())?
        .add(FrameLimit {
            remaining: frame_budget(),
            stop,
        })?
        .add(RenderCoordinatorModule::new())?;

    engine.run().await?;
    log::info!(
        "Sandbox: done after {} frame(s), {} step(s).",
        engine.frame_count(),
        engine.step_count()
    );
    Ok(())
}
