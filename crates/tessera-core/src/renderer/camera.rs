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

//! Immutable camera state, shared by the camera service and the coordinator.

use serde::{Deserialize, Serialize};

use crate::event::BusEvent;
use crate::math::{Affine2, Rect, Vec2};

/// Default world-to-pixel ratio.
pub const DEFAULT_PIXELS_PER_METER: f32 = 32.0;

/// A point-in-time copy of the 2D camera.
///
/// World space is in meters with Y up. The camera maps `position` to the
/// center of the viewport, rotates the world by `-rotation` and scales it by
/// `pixels_per_meter * zoom`, flipping Y so that screen space is Y down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSnapshot {
    /// World position at the center of the viewport, in meters.
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise.
    pub rotation: f32,
    /// Zoom factor; always positive and finite.
    pub zoom: f32,
    /// Pixels per world meter at zoom `1.0`.
    pub pixels_per_meter: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl Default for CameraSnapshot {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            zoom: 1.0,
            pixels_per_meter: DEFAULT_PIXELS_PER_METER,
            viewport: Vec2::new(800.0, 600.0),
        }
    }
}

impl CameraSnapshot {
    /// A camera at the origin with the given viewport size.
    pub fn with_viewport(width: f32, height: f32) -> Self {
        Self {
            viewport: Vec2::new(width, height),
            ..Self::default()
        }
    }

    /// Effective pixels per meter, zoom included.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.pixels_per_meter * self.zoom
    }

    /// The world-to-screen transform.
    pub fn world_transform(&self) -> Affine2 {
        let s = self.scale();
        Affine2::translation(self.viewport * 0.5)
            * Affine2::scale(s, -s)
            * Affine2::rotation(-self.rotation)
            * Affine2::translation(-self.position)
    }

    /// Maps a world point (meters, Y up) to screen pixels (Y down).
    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        self.world_transform().transform_point(point)
    }

    /// Maps a screen pixel back to world meters.
    pub fn screen_to_world(&self, point: Vec2) -> Vec2 {
        let s = self.scale();
        let offset = point - self.viewport * 0.5;
        let local = Vec2::new(offset.x / s, -offset.y / s);
        self.position + local.rotate(self.rotation)
    }

    /// The axis-aligned world rectangle covering the whole viewport.
    ///
    /// With a rotated camera this is the bounding box of the four rotated
    /// viewport corners, so it may be larger than what is actually visible.
    pub fn visible_rect(&self) -> Rect {
        let (w, h) = (self.viewport.x, self.viewport.y);
        let corners = [
            self.screen_to_world(Vec2::new(0.0, 0.0)),
            self.screen_to_world(Vec2::new(w, 0.0)),
            self.screen_to_world(Vec2::new(0.0, h)),
            self.screen_to_world(Vec2::new(w, h)),
        ];
        Rect::bounding(&corners).unwrap_or_default()
    }
}

// Camera listeners subscribe to every change, so there is a single kind.
impl BusEvent for CameraSnapshot {
    type Kind = ();

    fn kind(&self) {}
}
