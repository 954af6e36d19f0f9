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

//! The seam between the coordinator and a concrete graphics API.

use super::command::Space;
use super::pass::{Batch, PassBegin};

/// Measured extent of a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Advance width, in the space units of the request.
    pub width: f32,
    /// Line height, in the space units of the request.
    pub height: f32,
}

/// A drawing backend driven by the render coordinator.
///
/// For every non-empty pass the coordinator calls, in order: `clear` (only
/// when the pass is configured to), `begin_pass`, `submit_batch` once per
/// batch, and `end_pass`. Empty passes produce no call at all.
///
/// Backends are reached through a `Mutex` in the service registry; only the
/// coordinator locks it during a frame.
pub trait RenderBackend: Send {
    /// A short name for logs.
    fn name(&self) -> &str {
        "backend"
    }

    /// Clears the render target.
    fn clear(&mut self);

    /// Starts a pass.
    fn begin_pass(&mut self, pass: &PassBegin);

    /// Draws one batch of the current pass.
    fn submit_batch(&mut self, batch: &Batch);

    /// Finishes the current pass.
    fn end_pass(&mut self);

    /// Measures `text` at font `size`, when the backend has font metrics.
    fn measure_text(&self, _text: &str, _size: f32, _space: Space) -> Option<TextMetrics> {
        None
    }
}
