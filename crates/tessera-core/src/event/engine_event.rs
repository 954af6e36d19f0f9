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

//! The engine-wide event union.

use serde::{Deserialize, Serialize};

use super::BusEvent;
use crate::renderer::CameraSnapshot;

/// A pointer (mouse, pen or touch) button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Primary button, usually the left mouse button.
    Primary,
    /// Secondary button, usually the right mouse button.
    Secondary,
    /// Middle button or wheel press.
    Middle,
    /// Any other button, by index.
    Other(u8),
}

/// Events dispatched on the engine bus and fanned out to module `on_event` hooks.
///
/// Events are ephemeral: they are dispatched, never stored. Input adapters
/// translate raw device events into the input variants; game code uses
/// [`EngineEvent::Custom`] for its own messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A keyboard key went down. `key` is the layout-independent key name.
    KeyDown {
        /// Key name, e.g. `"ArrowLeft"` or `"KeyW"`.
        key: String,
    },
    /// A keyboard key went up.
    KeyUp {
        /// Key name.
        key: String,
    },
    /// The pointer moved, in UI pixels.
    PointerMove {
        /// Horizontal position in pixels.
        x: f32,
        /// Vertical position in pixels (y-down).
        y: f32,
    },
    /// A pointer button was pressed.
    PointerDown {
        /// Horizontal position in pixels.
        x: f32,
        /// Vertical position in pixels (y-down).
        y: f32,
        /// The button pressed.
        button: PointerButton,
    },
    /// A pointer button was released.
    PointerUp {
        /// Horizontal position in pixels.
        x: f32,
        /// Vertical position in pixels (y-down).
        y: f32,
        /// The button released.
        button: PointerButton,
    },
    /// The drawing surface changed size.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// The camera changed; carries the new snapshot.
    CameraChanged {
        /// The camera state after the change.
        camera: CameraSnapshot,
    },
    /// A game-defined event.
    Custom {
        /// Namespaced event name, e.g. `"game/score"`.
        name: String,
        /// Arbitrary payload.
        payload: serde_json::Value,
    },
}

impl EngineEvent {
    /// Builds a [`EngineEvent::Custom`] event.
    pub fn custom(name: impl Into<String>, payload: serde_json::Value) -> Self {
        EngineEvent::Custom {
            name: name.into(),
            payload,
        }
    }
}

/// The discriminant of an [`EngineEvent`], used as the subscription key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`EngineEvent::KeyDown`].
    KeyDown,
    /// See [`EngineEvent::KeyUp`].
    KeyUp,
    /// See [`EngineEvent::PointerMove`].
    PointerMove,
    /// See [`EngineEvent::PointerDown`].
    PointerDown,
    /// See [`EngineEvent::PointerUp`].
    PointerUp,
    /// See [`EngineEvent::Resized`].
    Resized,
    /// See [`EngineEvent::CameraChanged`].
    CameraChanged,
    /// A custom event with the given name.
    Custom(String),
}

impl EventKind {
    /// The subscription key for a custom event name.
    pub fn custom(name: impl Into<String>) -> Self {
        EventKind::Custom(name.into())
    }
}

impl BusEvent for EngineEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            EngineEvent::KeyDown { .. } => EventKind::KeyDown,
            EngineEvent::KeyUp { .. } => EventKind::KeyUp,
            EngineEvent::PointerMove { .. } => EventKind::PointerMove,
            EngineEvent::PointerDown { .. } => EventKind::PointerDown,
            EngineEvent::PointerUp { .. } => EventKind::PointerUp,
            EngineEvent::Resized { .. } => EventKind::Resized,
            EngineEvent::CameraChanged { .. } => EventKind::CameraChanged,
            EngineEvent::Custom { name, .. } => EventKind::Custom(name.clone()),
        }
    }
}
