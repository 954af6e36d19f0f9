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

//! A backend that records every call, for tests and tooling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tessera_core::renderer::{Batch, PassBegin, RenderBackend, Space, TextMetrics};

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `clear()`.
    Clear,
    /// `begin_pass(..)`.
    BeginPass(PassBegin),
    /// `submit_batch(..)`.
    SubmitBatch(Batch),
    /// `end_pass()`.
    EndPass,
}

/// A shared, cloneable handle to the calls recorded by a [`RecordingBackend`].
///
/// Keep a handle before moving the backend into the engine to inspect what
/// it received.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl CallLog {
    fn lock(&self) -> MutexGuard<'_, Vec<BackendCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: BackendCall) {
        self.lock().push(call);
    }

    /// A copy of every call recorded so far.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().clone()
    }

    /// Removes and returns every call recorded so far.
    pub fn take_calls(&self) -> Vec<BackendCall> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of calls recorded so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// A backend that draws nothing and records every call into a [`CallLog`].
#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: CallLog,
}

impl RecordingBackend {
    /// Creates a backend with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to this backend's log.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// See [`CallLog::calls`].
    pub fn calls(&self) -> Vec<BackendCall> {
        self.log.calls()
    }

    /// See [`CallLog::take_calls`].
    pub fn take_calls(&self) -> Vec<BackendCall> {
        self.log.take_calls()
    }
}

impl RenderBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn clear(&mut self) {
        self.log.record(BackendCall::Clear);
    }

    fn begin_pass(&mut self, pass: &PassBegin) {
        self.log.record(BackendCall::BeginPass(pass.clone()));
    }

    fn submit_batch(&mut self, batch: &Batch) {
        self.log.record(BackendCall::SubmitBatch(batch.clone()));
    }

    fn end_pass(&mut self) {
        self.log.record(BackendCall::EndPass);
    }

    // Fixed-advance metrics: half the font size per character.
    fn measure_text(&self, text: &str, size: f32, _space: Space) -> Option<TextMetrics> {
        Some(TextMetrics {
            width: text.chars().count() as f32 * size * 0.5,
            height: size,
        })
    }
}
