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

//! Headless backends and the module that publishes a backend.

mod logging;
mod recording;

pub use self::logging::LogBackend;
pub use self::recording::{BackendCall, CallLog, RecordingBackend};

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tessera_core::module::{InitContext, Module};
use tessera_core::renderer::{RenderBackend, RenderBackendToken};

/// Registers a backend under [`RenderBackendToken`] during `init`.
///
/// Grant that token to the render coordinator only; gameplay modules draw
/// through the render queue.
pub struct RenderBackendModule {
    backend: Arc<Mutex<dyn RenderBackend>>,
}

impl RenderBackendModule {
    /// Module id.
    pub const ID: &'static str = "core/backend";

    /// Wraps `backend`.
    pub fn new<B: RenderBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }
}

#[async_trait]
impl Module for RenderBackendModule {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn init(&mut self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        ctx.services.set::<RenderBackendToken>(self.backend.clone());
        Ok(())
    }
}
