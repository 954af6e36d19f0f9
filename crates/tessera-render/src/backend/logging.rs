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

//! A backend that logs what it would draw.

use tessera_core::renderer::{Batch, PassBegin, RenderBackend};

/// Logs every call at `debug` level and keeps running totals.
#[derive(Debug, Default)]
pub struct LogBackend {
    current_pass: Option<String>,
    passes: u64,
    batches: u64,
    commands: u64,
}

impl LogBackend {
    /// Creates a backend with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes begun so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Batches submitted so far.
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Commands submitted so far.
    pub fn commands(&self) -> u64 {
        self.commands
    }
}

impl RenderBackend for LogBackend {
    fn name(&self) -> &str {
        "log"
    }

    fn clear(&mut self) {
        log::debug!("LogBackend: clear");
    }

    fn begin_pass(&mut self, pass: &PassBegin) {
        self.passes += 1;
        match &pass.camera {
            Some(camera) => log::debug!(
                "LogBackend: begin pass '{}' ({}) camera at ({:.2}, {:.2}) zoom {:.2}",
                pass.pass_id,
                pass.space,
                camera.position.x,
                camera.position.y,
                camera.zoom
            ),
            None => log::debug!("LogBackend: begin pass '{}' ({})", pass.pass_id, pass.space),
        }
        self.current_pass = Some(pass.pass_id.clone());
    }

    fn submit_batch(&mut self, batch: &Batch) {
        self.batches += 1;
        self.commands += batch.len() as u64;
        log::debug!(
            "LogBackend: [{}] {} x{} material '{}'",
            self.current_pass.as_deref().unwrap_or("?"),
            batch.kind,
            batch.len(),
            batch.material
        );
    }

    fn end_pass(&mut self) {
        if let Some(pass) = self.current_pass.take() {
            log::debug!("LogBackend: end pass '{pass}'");
        }
    }
}
