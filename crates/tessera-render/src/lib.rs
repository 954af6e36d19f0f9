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

//! # Tessera Render
//!
//! The render pipeline behind the ports declared in `tessera_core::renderer`:
//! the per-pass [`RenderQueue`], the [`CameraService`], the
//! [`RenderCoordinator`] that culls, sorts and batches commands, and
//! headless backends. Each piece comes with a [`Module`](tessera_core::Module)
//! that publishes it during `init`.

#![warn(missing_docs)]

pub mod backend;
pub mod camera;
pub mod coordinator;
pub mod queue;

pub use backend::{BackendCall, CallLog, LogBackend, RecordingBackend, RenderBackendModule};
pub use camera::{CameraModule, CameraService};
pub use coordinator::{FrameStats, RenderCoordinator, RenderCoordinatorModule};
pub use queue::{RenderQueue, RenderQueueModule};
