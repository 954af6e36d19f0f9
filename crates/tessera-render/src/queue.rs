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

//! The per-pass render command buffer and the module that publishes it.

use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tessera_core::module::{InitContext, Module};
use tessera_core::renderer::{
    PassId, RenderCommand, RenderQueueDrainPort, RenderQueueDrainToken, RenderQueuePort,
    RenderQueueWriteToken,
};

#[derive(Default)]
struct Buffers {
    // Pass ids in first-seen order, so iteration is deterministic.
    order: Vec<PassId>,
    by_pass: HashMap<PassId, Vec<RenderCommand>>,
}

impl Buffers {
    fn buffer_mut(&mut self, pass_id: &str) -> &mut Vec<RenderCommand> {
        if !self.by_pass.contains_key(pass_id) {
            self.order.push(pass_id.to_string());
        }
        self.by_pass.entry(pass_id.to_string()).or_default()
    }
}

/// A per-pass, per-frame buffer of render commands.
///
/// Producers push through [`RenderQueuePort`]; the coordinator consumes each
/// buffer once per frame through [`RenderQueueDrainPort::drain`], which
/// swaps it for an empty one under the lock so a command is never returned
/// by two drains.
#[derive(Default)]
pub struct RenderQueue {
    buffers: Mutex<Buffers>,
}

impl RenderQueue {
    /// Creates an empty queue with no pass buffers.
    pub fn new() -> Self {
        Self::default()
    }

    fn buffers(&self) -> MutexGuard<'_, Buffers> {
        // Every critical section leaves the buffers consistent.
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total number of buffered commands across every pass.
    pub fn total_pending(&self) -> usize {
        self.buffers().by_pass.values().map(Vec::len).sum()
    }
}

impl RenderQueuePort for RenderQueue {
    fn push(&self, command: RenderCommand) {
        let mut buffers = self.buffers();
        let pass_id = command.pass_id.clone();
        buffers.buffer_mut(&pass_id).push(command);
    }

    fn push_many(&self, commands: Vec<RenderCommand>) {
        let mut buffers = self.buffers();
        for command in commands {
            let pass_id = command.pass_id.clone();
            buffers.buffer_mut(&pass_id).push(command);
        }
    }
}

impl RenderQueueDrainPort for RenderQueue {
    fn register_pass(&self, pass_id: &str) {
        self.buffers().buffer_mut(pass_id);
    }

    fn drain(&self, pass_id: &str) -> Vec<RenderCommand> {
        self.buffers()
            .by_pass
            .get_mut(pass_id)
            .map(mem::take)
            .unwrap_or_default()
    }

    fn clear_pass(&self, pass_id: &str) {
        if let Some(buffer) = self.buffers().by_pass.get_mut(pass_id) {
            buffer.clear();
        }
    }

    fn pass_ids(&self) -> Vec<PassId> {
        self.buffers().order.clone()
    }

    fn pending(&self, pass_id: &str) -> usize {
        self.buffers().by_pass.get(pass_id).map_or(0, Vec::len)
    }
}

/// Publishes a [`RenderQueue`] under both queue tokens.
///
/// Must be added before any module that renders, and before the render
/// coordinator.
pub struct RenderQueueModule {
    queue: Arc<RenderQueue>,
}

impl RenderQueueModule {
    /// Module id.
    pub const ID: &'static str = "core/render-queue";

    /// Creates the module with a fresh queue.
    pub fn new() -> Self {
        Self {
            queue: Arc::new(RenderQueue::new()),
        }
    }

    /// A handle to the queue, for hosts that inspect it directly.
    pub fn queue(&self) -> Arc<RenderQueue> {
        self.queue.clone()
    }
}

impl Default for RenderQueueModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for RenderQueueModule {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn init(&mut self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        for pass in &ctx.config.passes {
            self.queue.register_pass(&pass.id);
        }
        ctx.services.set::<RenderQueueWriteToken>(self.queue.clone());
        ctx.services.set::<RenderQueueDrainToken>(self.queue.clone());
        log::debug!(
            "RenderQueueModule: registered {} pass buffer(s).",
            ctx.config.passes.len()
        );
        Ok(())
    }
}
