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

//! The module contract: the engine's only extension point.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EngineConfig;
use crate::event::{EngineEvent, EventBus};
use crate::service::{ServiceRegistry, ServiceView};

/// What a module sees during `init`: full, writable access to the registry.
pub struct InitContext<'a> {
    /// The engine configuration.
    pub config: &'a EngineConfig,
    /// The engine bus.
    pub bus: &'a EventBus<EngineEvent>,
    /// The registry, writable while modules initialize.
    pub services: &'a mut ServiceRegistry,
}

/// What a module sees from `start` on.
///
/// Each module receives its own `Context` whose `services` view is scoped to
/// the tokens the engine's whitelist resolver granted it.
#[derive(Debug, Clone)]
pub struct Context {
    /// The engine configuration.
    pub config: Arc<EngineConfig>,
    /// The engine bus.
    pub bus: EventBus<EngineEvent>,
    /// This module's view of the frozen registry.
    pub services: ServiceView,
}

/// A unit of behavior driven by the engine.
///
/// Every hook has a no-op default, so a module implements only what it
/// needs. Hooks run one at a time, in registration order, on the engine's
/// thread; `update`, `render` and `on_event` must not block.
///
/// A module never refers to another module directly: it publishes services
/// during `init` and looks up the ports it depends on through its
/// [`Context`].
///
/// # Example
///
/// ```rust
/// use tessera_core::module::{Context, Module};
///
/// struct Ticker {
///     steps: u64,
/// }
///
/// #[async_trait::async_trait]
/// impl Module for Ticker {
///     fn id(&self) -> &str {
///         "demo/ticker"
///     }
///
///     fn update(&mut self, _ctx: &Context, _dt: f64) -> anyhow::Result<()> {
///         self.steps += 1;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Module: Send {
    /// Namespaced identifier, e.g. `"core/camera"` or `"game/player"`.
    fn id(&self) -> &str;

    /// Registers services. Runs before any module starts.
    async fn init(&mut self, _ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Resolves dependencies and loads resources. Every module has
    /// initialized, and the registry is frozen.
    async fn start(&mut self, _ctx: &Context) -> anyhow::Result<()> {
        Ok(())
    }

    /// Advances the simulation by exactly `dt` seconds.
    fn update(&mut self, _ctx: &Context, _dt: f64) -> anyhow::Result<()> {
        Ok(())
    }

    /// Produces render commands. `alpha` in `[0, 1)` is the fraction of a
    /// step elapsed since the last update.
    fn render(&mut self, _ctx: &Context, _alpha: f64) -> anyhow::Result<()> {
        Ok(())
    }

    /// Consumes what the frame produced. Runs once per frame, after every
    /// module's `render`, so consumers such as the render coordinator see
    /// all of the frame's output whatever their registration order.
    fn present(&mut self, _ctx: &Context) -> anyhow::Result<()> {
        Ok(())
    }

    /// Reacts to an event emitted on the engine bus.
    ///
    /// Delivery is deferred: events emitted from inside a hook reach
    /// `on_event` after that hook returns, while plain bus subscribers see
    /// them synchronously at emit time. Events emitted from `on_event` are
    /// delivered in further rounds; whatever is still pending after
    /// the engine's `MAX_FANOUT_ROUNDS` rounds is dropped with a warning.
    ///
    /// A failure here is logged and does not reach other modules.
    fn on_event(&mut self, _ctx: &Context, _event: &EngineEvent) -> anyhow::Result<()> {
        Ok(())
    }

    /// Releases resources. Called exactly once, when the engine stops.
    fn destroy(&mut self, _ctx: &Context) {}
}
