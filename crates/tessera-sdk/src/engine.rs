// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The engine: module list, lifecycle, fixed-step loop and event fan-out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tessera_core::config::EngineConfig;
use tessera_core::event::{EngineEvent, EventBus};
use tessera_core::module::{Context, InitContext, Module};
use tessera_core::service::{ServiceRegistry, ServiceView, TokenId};
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::{FixedStepClock, Tick};
use crate::error::{EngineError, EnginePhase, HookPhase};

/// Upper bound on the fan-out passes after a single hook. Events emitted by
/// `on_event` handlers are delivered in the next pass.
pub const MAX_FANOUT_ROUNDS: usize = 8;

/// Computes the tokens a module may see. `None` grants an unrestricted view.
pub type WhitelistResolver = Box<dyn Fn(&dyn Module) -> Option<Vec<TokenId>> + Send + Sync>;

/// A cloneable handle that asks a running engine to stop.
///
/// The request is honoured at the next frame boundary of [`Engine::run`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Requests a stop.
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

struct Slot {
    module: Box<dyn Module>,
    // Built when the registry is frozen; `None` until `init` completes.
    ctx: Option<Context>,
}

/// Drives an ordered list of [`Module`]s through their lifecycle.
///
/// Registration order is the dependency contract: a module may assume that
/// every module added before it has registered its services, and every hook
/// runs in that order.
///
/// Lifecycle: [`add`](Self::add) modules, then [`init`](Self::init) (full
/// registry access, then the registry is frozen and each module gets its
/// view), [`start`](Self::start), any number of [`tick`](Self::tick)s and
/// finally [`stop`](Self::stop). [`run`](Self::run) does all of it on a tokio
/// interval.
///
/// Events emitted on the bus reach bus subscribers immediately, and reach
/// module `on_event` hooks right after the hook that emitted them returns.
pub struct Engine {
    config: Arc<EngineConfig>,
    bus: EventBus<EngineEvent>,
    slots: Vec<Slot>,
    whitelist: Option<WhitelistResolver>,
    registry: Option<Arc<ServiceRegistry>>,
    clock: FixedStepClock,
    phase: EnginePhase,
    frames: u64,
    steps: u64,
    last_alpha: f64,
    stop: StopHandle,
}

impl Engine {
    /// Creates an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Engine: created ({}x{}, step {:.4}s, {:?}).",
            config.width,
            config.height,
            config.fixed_step,
            config.stall_policy
        );
        let clock = FixedStepClock::new(config.fixed_step, config.stall_policy);
        Ok(Self {
            config: Arc::new(config),
            bus: EventBus::with_outbox(),
            slots: Vec::new(),
            whitelist: None,
            registry: None,
            clock,
            phase: EnginePhase::Created,
            frames: 0,
            steps: 0,
            last_alpha: 0.0,
            stop: StopHandle::default(),
        })
    }

    /// Appends a module. Only allowed before `init`.
    ///
    /// Ids are not required to be unique; a duplicate is logged and both
    /// modules receive every hook.
    pub fn add<M: Module + 'static>(&mut self, module: M) -> Result<&mut Self, EngineError> {
        self.add_boxed(Box::new(module))
    }

    /// Appends an already boxed module. Only allowed before `init`.
    pub fn add_boxed(&mut self, module: Box<dyn Module>) -> Result<&mut Self, EngineError> {
        self.expect_phase(EnginePhase::Created, "add a module")?;
        let id = module.id();
        if self.slots.iter().any(|s| s.module.id() == id) {
            log::warn!("Engine: module id '{id}' is registered more than once.");
        }
        log::debug!("Engine: added module '{id}'.");
        self.slots.push(Slot { module, ctx: None });
        Ok(self)
    }

    /// Installs the resolver used to scope each module's service view.
    pub fn set_whitelist<F>(&mut self, resolver: F)
    where
        F: Fn(&dyn Module) -> Option<Vec<TokenId>> + Send + Sync + 'static,
    {
        self.whitelist = Some(Box::new(resolver));
    }

    /// Builder form of [`set_whitelist`](Self::set_whitelist).
    pub fn with_whitelist<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&dyn Module) -> Option<Vec<TokenId>> + Send + Sync + 'static,
    {
        self.set_whitelist(resolver);
        self
    }

    /// Runs every module's `init` in order with write access to the registry,
    /// then freezes the registry and builds each module's context.
    ///
    /// A failure stops the engine; no further hook runs.
    pub async fn init(&mut self) -> Result<(), EngineError> {
        self.expect_phase(EnginePhase::Created, "init")?;
        log::info!("Engine: initializing {} module(s).", self.slots.len());

        let mut registry = ServiceRegistry::new();
        for slot in &mut self.slots {
            log::debug!("Engine: init '{}'.", slot.module.id());
            let mut ctx = InitContext {
                config: &self.config,
                bus: &self.bus,
                services: &mut registry,
            };
            if let Err(source) = slot.module.init(&mut ctx).await {
                self.phase = EnginePhase::Stopped;
                return Err(EngineError::ModuleLifecycle {
                    module: slot.module.id().to_string(),
                    phase: HookPhase::Init,
                    source,
                });
            }
        }

        let registry = Arc::new(registry);
        for slot in &mut self.slots {
            let id = slot.module.id();
            let grants = self
                .whitelist
                .as_ref()
                .and_then(|resolve| resolve(slot.module.as_ref()));
            let services = match grants {
                Some(tokens) => {
                    log::debug!(
                        "Engine: '{id}' granted {:?}.",
                        tokens.iter().map(TokenId::name).collect::<Vec<_>>()
                    );
                    ServiceView::restricted(registry.clone(), id, tokens)
                }
                None => ServiceView::unrestricted(registry.clone(), id),
            };
            slot.ctx = Some(Context {
                config: self.config.clone(),
                bus: self.bus.clone(),
                services,
            });
        }
        log::info!("Engine: registry frozen with {:?}.", registry);
        self.registry = Some(registry);
        self.phase = EnginePhase::Initialized;

        // Events emitted during init are delivered once every module has a context.
        self.fan_out();
        Ok(())
    }

    /// Runs every module's `start` in order, awaiting each before the next.
    pub async fn start(&mut self) -> Result<(), EngineError> {
        self.expect_phase(EnginePhase::Initialized, "start")?;
        log::info!("Engine: starting.");
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            let Some(ctx) = slot.ctx.as_ref() else {
                continue;
            };
            log::debug!("Engine: start '{}'.", slot.module.id());
            let result = slot.module.start(ctx).await;
            self.fan_out();
            if let Err(source) = result {
                return Err(self.hook_error(index, HookPhase::Start, source));
            }
        }
        self.phase = EnginePhase::Running;
        Ok(())
    }

    /// Runs one frame at wall-clock time `now_ms`: zero or more fixed
    /// updates for every module, one render for every module, then one
    /// present for every module.
    ///
    /// The first tick only sets the time base. An error from any hook is
    /// returned immediately and leaves the rest of the frame undone.
    pub fn tick(&mut self, now_ms: f64) -> Result<Tick, EngineError> {
        self.expect_phase(EnginePhase::Running, "tick")?;
        let tick = self.clock.advance(now_ms);
        if tick.stalled {
            log::warn!(
                "Engine: long frame at {now_ms:.1}ms; stall policy {:?} applied.",
                self.config.stall_policy
            );
        }

        let dt = self.clock.fixed_step();
        for _ in 0..tick.steps {
            for index in 0..self.slots.len() {
                self.run_hook(index, HookPhase::Update, |module, ctx| module.update(ctx, dt))?;
            }
            self.steps += 1;
        }

        let alpha = tick.alpha;
        for index in 0..self.slots.len() {
            self.run_hook(index, HookPhase::Render, |module, ctx| module.render(ctx, alpha))?;
        }
        for index in 0..self.slots.len() {
            self.run_hook(index, HookPhase::Present, |module, ctx| module.present(ctx))?;
        }

        self.frames += 1;
        self.last_alpha = alpha;
        log::trace!(
            "Engine: frame {} ran {} step(s), alpha {:.3}.",
            self.frames,
            tick.steps,
            alpha
        );
        Ok(tick)
    }

    /// Publishes `event` on the bus and delivers it to every module's
    /// `on_event` before returning.
    pub fn emit(&mut self, event: EngineEvent) -> Result<(), EngineError> {
        if !matches!(
            self.phase,
            EnginePhase::Initialized | EnginePhase::Running
        ) {
            return Err(EngineError::InvalidPhase {
                action: "emit an event",
                phase: self.phase,
            });
        }
        self.bus.emit(&event);
        self.fan_out();
        Ok(())
    }

    /// Calls every module's `destroy` in registration order, exactly once.
    ///
    /// Further calls do nothing. Stopping before `init` destroys nothing
    /// since no module was initialized.
    pub fn stop(&mut self) {
        let previous = self.phase;
        if previous == EnginePhase::Stopped {
            return;
        }
        self.phase = EnginePhase::Stopped;
        self.stop.request_stop();
        if previous == EnginePhase::Created {
            log::info!("Engine: stopped before init.");
            return;
        }

        for slot in &mut self.slots {
            if let Some(ctx) = slot.ctx.as_ref() {
                log::debug!("Engine: destroy '{}'.", slot.module.id());
                slot.module.destroy(ctx);
            }
        }
        let discarded = self.bus.drain_outbox();
        if !discarded.is_empty() {
            log::debug!(
                "Engine: discarded {} event(s) emitted during destroy.",
                discarded.len()
            );
        }
        self.bus.clear();
        log::info!(
            "Engine: stopped after {} frame(s), {} step(s).",
            self.frames,
            self.steps
        );
    }

    /// Initializes and starts the engine if needed, then ticks at the
    /// configured frame rate until a stop is requested or a hook fails.
    /// Always stops the engine before returning.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        if self.phase == EnginePhase::Created {
            self.init().await?;
        }
        if self.phase == EnginePhase::Initialized {
            if let Err(e) = self.start().await {
                self.stop();
                return Err(e);
            }
        }
        self.expect_phase(EnginePhase::Running, "run")?;

        let mut interval = tokio::time::interval(self.config.frame_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let origin = Instant::now();
        log::info!(
            "Engine: running at {} fps target.",
            self.config.target_fps
        );

        while !self.stop.is_stop_requested() {
            interval.tick().await;
            let now_ms = origin.elapsed().as_secs_f64() * 1000.0;
            if let Err(e) = self.tick(now_ms) {
                log::error!("Engine: {e:#}");
                self.stop();
                return Err(e);
            }
        }
        self.stop();
        Ok(())
    }

    /// A handle that stops [`run`](Self::run) from anywhere, including from
    /// inside a module.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// A handle to the engine bus, for hosts that subscribe or emit directly.
    pub fn bus(&self) -> EventBus<EngineEvent> {
        self.bus.clone()
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The frozen registry, once `init` has completed.
    pub fn services(&self) -> Option<&Arc<ServiceRegistry>> {
        self.registry.as_ref()
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Module ids in registration order.
    pub fn module_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.module.id()).collect()
    }

    /// Frames ticked so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Fixed steps simulated so far.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// The interpolation factor passed to the last render.
    pub fn last_alpha(&self) -> f64 {
        self.last_alpha
    }

    fn expect_phase(&self, expected: EnginePhase, action: &'static str) -> Result<(), EngineError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn hook_error(&self, index: usize, phase: HookPhase, source: anyhow::Error) -> EngineError {
        EngineError::ModuleLifecycle {
            module: self.slots[index].module.id().to_string(),
            phase,
            source,
        }
    }

    fn run_hook<F>(&mut self, index: usize, phase: HookPhase, hook: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut dyn Module, &Context) -> anyhow::Result<()>,
    {
        let slot = &mut self.slots[index];
        let Some(ctx) = slot.ctx.as_ref() else {
            return Ok(());
        };
        let result = hook(slot.module.as_mut(), ctx);
        self.fan_out();
        result.map_err(|source| self.hook_error(index, phase, source))
    }

    // Delivers recorded bus events to every module's `on_event`, in
    // registration order. A failing handler is logged and skipped.
    fn fan_out(&mut self) {
        for _ in 0..MAX_FANOUT_ROUNDS {
            let events = self.bus.drain_outbox();
            if events.is_empty() {
                return;
            }
            for event in &events {
                for slot in &mut self.slots {
                    let Some(ctx) = slot.ctx.as_ref() else {
                        continue;
                    };
                    if let Err(e) = slot.module.on_event(ctx, event) {
                        log::error!(
                            "Engine: module '{}' failed to handle {:?}: {e:#}",
                            slot.module.id(),
                            event
                        );
                    }
                }
            }
        }
        let dropped = self.bus.drain_outbox();
        if !dropped.is_empty() {
            log::warn!(
                "Engine: dropped {} event(s) still pending after {MAX_FANOUT_ROUNDS} fan-out rounds.",
                dropped.len()
            );
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("phase", &self.phase)
            .field("modules", &self.module_ids())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
