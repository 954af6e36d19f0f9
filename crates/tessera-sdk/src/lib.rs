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

//! The public-facing Software Development Kit (SDK) for the Tessera engine.
//!
//! It assembles the core contracts and the render pipeline into an
//! [`Engine`] that drives modules through a deterministic fixed-step loop.
//!
//! ```rust,no_run
//! use tessera_sdk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     tessera_sdk::logging::init("info");
//!
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!     engine
//!         .add(InputModule::new())?
//!         .add(CameraModule::new())?
//!         .add(RenderQueueModule::new())?
//!         .add(RenderBackendModule::new(LogBackend::new()))?
//!         .add(RenderCoordinatorModule::new())?;
//!     engine.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod clock;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;

pub use clock::{FixedStepClock, Tick};
pub use engine::{Engine, StopHandle, WhitelistResolver, MAX_FANOUT_ROUNDS};
pub use error::{EngineError, EnginePhase, HookPhase};
pub use input::{InputModule, InputState};

pub use tessera_core;
pub use tessera_render;

/// Everything a game module usually needs.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use crate::{Engine, EngineError, InputModule, StopHandle};
    pub use tessera_core::config::{EngineConfig, PassConfig, StallPolicy};
    pub use tessera_core::event::{EngineEvent, EventKind, PointerButton};
    pub use tessera_core::math::{Rect, Vec2};
    pub use tessera_core::module::{Context, InitContext, Module};
    pub use tessera_core::ports::{InputReadPort, InputReadToken};
    pub use tessera_core::renderer::{
        CameraReadPort, CameraReadToken, CameraSnapshot, CameraWritePort, CameraWriteToken,
        Material, RenderBackend, RenderBackendToken, RenderCommand, RenderQueuePort,
        RenderQueueWriteToken, Space,
    };
    pub use tessera_core::service::{ServiceToken, TokenId};
    pub use tessera_render::{
        CameraModule, LogBackend, RecordingBackend, RenderBackendModule,
        RenderCoordinatorModule, RenderQueueModule,
    };
}
