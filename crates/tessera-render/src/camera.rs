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

//! The camera service and the module that publishes it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tessera_core::event::{EngineEvent, EventBus, Handler, Subscription};
use tessera_core::math::Vec2;
use tessera_core::module::{Context, InitContext, Module};
use tessera_core::renderer::{
    CameraReadPort, CameraReadToken, CameraSnapshot, CameraWritePort, CameraWriteToken,
};

/// The single 2D camera.
///
/// Reads return a copy; writes validate the new value, store it and then,
/// outside the lock, notify every listener with the new snapshot. A write
/// that leaves the camera unchanged notifies nobody.
pub struct CameraService {
    state: Mutex<CameraSnapshot>,
    listeners: EventBus<CameraSnapshot>,
}

impl CameraService {
    /// Creates a camera in the given state.
    pub fn new(initial: CameraSnapshot) -> Self {
        Self {
            state: Mutex::new(initial),
            listeners: EventBus::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, CameraSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn modify(&self, change: impl FnOnce(&mut CameraSnapshot)) -> bool {
        let updated = {
            let mut state = self.state();
            let mut next = *state;
            change(&mut next);
            if next == *state {
                return true;
            }
            *state = next;
            next
        };
        self.listeners.emit(&updated);
        true
    }
}

impl Default for CameraService {
    fn default() -> Self {
        Self::new(CameraSnapshot::default())
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl CameraReadPort for CameraService {
    fn snapshot(&self) -> CameraSnapshot {
        *self.state()
    }

    fn subscribe(&self, listener: Handler<CameraSnapshot>) -> Subscription {
        self.listeners.on((), listener)
    }
}

impl CameraWritePort for CameraService {
    fn set_position(&self, position: Vec2) -> bool {
        position.is_finite() && self.modify(|c| c.position = position)
    }

    fn translate(&self, delta: Vec2) -> bool {
        if !delta.is_finite() {
            return false;
        }
        let mut accepted = true;
        let result = self.modify(|c| {
            let moved = c.position + delta;
            if moved.is_finite() {
                c.position = moved;
            } else {
                accepted = false;
            }
        });
        result && accepted
    }

    fn set_rotation(&self, rotation: f32) -> bool {
        rotation.is_finite() && self.modify(|c| c.rotation = rotation)
    }

    fn set_zoom(&self, zoom: f32) -> bool {
        if !positive(zoom) {
            log::debug!("CameraService: rejected zoom {zoom}.");
            return false;
        }
        self.modify(|c| c.zoom = zoom)
    }

    fn set_pixels_per_meter(&self, pixels_per_meter: f32) -> bool {
        positive(pixels_per_meter) && self.modify(|c| c.pixels_per_meter = pixels_per_meter)
    }

    fn set_viewport(&self, width: f32, height: f32) -> bool {
        positive(width) && positive(height) && self.modify(|c| c.viewport = Vec2::new(width, height))
    }
}

/// Publishes a [`CameraService`] under the camera read and write tokens and
/// mirrors its changes onto the engine bus as [`EngineEvent::CameraChanged`].
///
/// The viewport follows the configured surface size and
/// [`EngineEvent::Resized`] events.
pub struct CameraModule {
    camera: Arc<CameraService>,
    forwarding: Option<Subscription>,
}

impl CameraModule {
    /// Module id.
    pub const ID: &'static str = "core/camera";

    /// A camera at the origin.
    pub fn new() -> Self {
        Self::with_snapshot(CameraSnapshot::default())
    }

    /// A camera starting in `initial`; the viewport is still taken from the
    /// engine configuration during `init`.
    pub fn with_snapshot(initial: CameraSnapshot) -> Self {
        Self {
            camera: Arc::new(CameraService::new(initial)),
            forwarding: None,
        }
    }

    /// A handle to the camera, for hosts that drive it directly.
    pub fn camera(&self) -> Arc<CameraService> {
        self.camera.clone()
    }
}

impl Default for CameraModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for CameraModule {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn init(&mut self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        self.camera.set_viewport(ctx.config.width as f32, ctx.config.height as f32);

        let bus = ctx.bus.clone();
        self.forwarding = Some(self.camera.subscribe(Arc::new(move |camera: &CameraSnapshot| {
            bus.emit(&EngineEvent::CameraChanged { camera: *camera });
        })));

        ctx.services.set::<CameraReadToken>(self.camera.clone());
        ctx.services.set::<CameraWriteToken>(self.camera.clone());
        Ok(())
    }

    fn on_event(&mut self, _ctx: &Context, event: &EngineEvent) -> anyhow::Result<()> {
        if let EngineEvent::Resized { width, height } = event {
            if !self.camera.set_viewport(*width as f32, *height as f32) {
                anyhow::bail!("cannot resize camera viewport to {width}x{height}");
            }
        }
        Ok(())
    }

    fn destroy(&mut self, _ctx: &Context) {
        if let Some(subscription) = self.forwarding.take() {
            subscription.unsubscribe();
        }
    }
}
