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

//! Render data types and ports shared by producers, the coordinator and backends.
//!
//! Modules submit [`RenderCommand`]s through the [`RenderQueuePort`]; the
//! render coordinator drains them once per frame, culls, sorts and batches
//! them, and drives the [`RenderBackend`].

mod backend;
mod camera;
mod command;
mod pass;
mod ports;

pub use self::backend::{RenderBackend, TextMetrics};
pub use self::camera::{CameraSnapshot, DEFAULT_PIXELS_PER_METER};
pub use self::command::{CommandKind, Material, PassId, RenderCommand, Shape, Space};
pub use self::pass::{Batch, PassBegin, PassConfig};
pub use self::ports::{
    CameraReadPort, CameraReadToken, CameraWritePort, CameraWriteToken, RenderBackendToken,
    RenderQueueDrainPort, RenderQueueDrainToken, RenderQueuePort, RenderQueueWriteToken,
};
