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

//! Render-side service interfaces and their tokens.

use std::sync::Mutex;

use super::backend::RenderBackend;
use super::camera::CameraSnapshot;
use super::command::{PassId, RenderCommand};
use crate::define_token;
use crate::event::{Handler, Subscription};
use crate::math::{Rect, Vec2};

/// Write side of the render queue, handed to any module that draws.
pub trait RenderQueuePort: Send + Sync {
    /// Appends a command to its pass's buffer. Commands for passes the
    /// coordinator does not know are accepted and discarded at frame end.
    fn push(&self, command: RenderCommand);

    /// Appends several commands, keeping their order.
    fn push_many(&self, commands: Vec<RenderCommand>) {
        for command in commands {
            self.push(command);
        }
    }
}

/// Read side of the render queue, used by the coordinator.
pub trait RenderQueueDrainPort: Send + Sync {
    /// Ensures a buffer exists for `pass_id`.
    fn register_pass(&self, pass_id: &str);

    /// Removes every buffered command of `pass_id` and returns them in
    /// insertion order. Returns an empty list for unknown passes.
    fn drain(&self, pass_id: &str) -> Vec<RenderCommand>;

    /// Drops every buffered command of `pass_id`.
    fn clear_pass(&self, pass_id: &str);

    /// The ids of every pass that has a buffer, in first-seen order.
    fn pass_ids(&self) -> Vec<PassId>;

    /// Number of commands currently buffered for `pass_id`.
    fn pending(&self, pass_id: &str) -> usize;
}

/// Read access to the camera.
pub trait CameraReadPort: Send + Sync {
    /// The current camera state.
    fn snapshot(&self) -> CameraSnapshot;

    /// Registers a listener called synchronously after every change.
    fn subscribe(&self, listener: Handler<CameraSnapshot>) -> Subscription;

    /// See [`CameraSnapshot::visible_rect`].
    fn visible_rect(&self) -> Rect {
        self.snapshot().visible_rect()
    }

    /// See [`CameraSnapshot::world_to_screen`].
    fn world_to_screen(&self, point: Vec2) -> Vec2 {
        self.snapshot().world_to_screen(point)
    }

    /// See [`CameraSnapshot::screen_to_world`].
    fn screen_to_world(&self, point: Vec2) -> Vec2 {
        self.snapshot().screen_to_world(point)
    }
}

/// Write access to the camera.
///
/// Setters return `false` and leave the camera unchanged when the value is
/// rejected (non-finite numbers, non-positive zoom or scale).
pub trait CameraWritePort: Send + Sync {
    /// Moves the camera center to `position`.
    fn set_position(&self, position: Vec2) -> bool;

    /// Moves the camera center by `delta`.
    fn translate(&self, delta: Vec2) -> bool;

    /// Sets the rotation in radians.
    fn set_rotation(&self, rotation: f32) -> bool;

    /// Sets the zoom factor.
    fn set_zoom(&self, zoom: f32) -> bool;

    /// Sets the pixels-per-meter ratio.
    fn set_pixels_per_meter(&self, pixels_per_meter: f32) -> bool;

    /// Sets the viewport size in pixels.
    fn set_viewport(&self, width: f32, height: f32) -> bool;
}

define_token!(
    /// Submit render commands.
    pub RenderQueueWriteToken => dyn RenderQueuePort, "render/queue.write"
);
define_token!(
    /// Drain render commands; reserved for the coordinator.
    pub RenderQueueDrainToken => dyn RenderQueueDrainPort, "render/queue.drain"
);
define_token!(
    /// Read the camera.
    pub CameraReadToken => dyn CameraReadPort, "camera/read"
);
define_token!(
    /// Move, rotate and zoom the camera.
    pub CameraWriteToken => dyn CameraWritePort, "camera/write"
);
define_token!(
    /// The active drawing backend.
    pub RenderBackendToken => Mutex<dyn RenderBackend>, "render/backend"
);
