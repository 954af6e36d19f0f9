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

//! The render coordinator: turns per-pass command buffers into ordered backend calls.
//!
//! Each frame, for every configured pass in order:
//!
//! 1. drain the pass's buffer; an empty pass makes no backend call,
//! 2. for world passes with a camera, cull commands whose bounding box misses
//!    the camera's visible rectangle (commands without one are kept),
//! 3. stable-sort by `(layer rank, z, material, kind, id)`,
//! 4. split the sorted list into maximal `(kind, material)` runs,
//! 5. call `clear` (if configured), `begin_pass`, `submit_batch` per batch, `end_pass`.
//!
//! Commands buffered for passes outside the configuration are discarded at
//! the end of the frame.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tessera_core::math::Rect;
use tessera_core::module::{Context, Module};
use tessera_core::renderer::{
    Batch, CameraReadPort, CameraReadToken, CameraSnapshot, PassBegin, PassConfig, PassId,
    RenderBackend, RenderBackendToken, RenderCommand, RenderQueueDrainPort,
    RenderQueueDrainToken, Space,
};

/// Counters for one coordinated frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Passes that reached the backend.
    pub passes_drawn: usize,
    /// Commands drained from configured passes.
    pub submitted: usize,
    /// Commands removed by culling.
    pub culled: usize,
    /// Commands handed to the backend.
    pub drawn: usize,
    /// Batches handed to the backend.
    pub batches: usize,
    /// Commands discarded because their pass is not configured.
    pub dropped: usize,
}

/// Keeps the commands whose bounding box intersects `visible`, or that have none.
///
/// Returns the survivors in their original order and the number removed.
pub fn cull(commands: Vec<RenderCommand>, visible: &Rect) -> (Vec<RenderCommand>, usize) {
    let before = commands.len();
    let kept: Vec<RenderCommand> = commands
        .into_iter()
        .filter(|cmd| cmd.aabb.map_or(true, |aabb| aabb.intersects(visible)))
        .collect();
    let culled = before - kept.len();
    (kept, culled)
}

// Missing z sorts as 0.0; -0.0 is folded into 0.0 so `total_cmp` ties them.
fn z_key(cmd: &RenderCommand) -> f32 {
    match cmd.z {
        Some(z) if z != 0.0 => z,
        _ => 0.0,
    }
}

fn compare(pass: &PassConfig, a: &RenderCommand, b: &RenderCommand) -> Ordering {
    pass.layer_rank(&a.layer)
        .cmp(&pass.layer_rank(&b.layer))
        .then_with(|| z_key(a).total_cmp(&z_key(b)))
        .then_with(|| a.material.cmp(&b.material))
        .then_with(|| a.kind().cmp(&b.kind()))
        .then_with(|| {
            a.id.as_deref()
                .unwrap_or("")
                .cmp(b.id.as_deref().unwrap_or(""))
        })
}

/// Sorts commands into draw order for `pass`.
///
/// The sort is stable, so commands with equal keys keep their submission order.
pub fn sort_commands(pass: &PassConfig, commands: &mut [RenderCommand]) {
    commands.sort_by(|a, b| compare(pass, a, b));
}

/// Groups sorted commands into maximal consecutive runs sharing kind and material.
pub fn build_batches(commands: Vec<RenderCommand>) -> Vec<Batch> {
    let mut batches: Vec<Batch> = Vec::new();
    for cmd in commands {
        if let Some(last) = batches.last_mut() {
            if last.kind == cmd.kind() && last.material == cmd.material {
                last.commands.push(cmd);
                continue;
            }
        }
        batches.push(Batch {
            kind: cmd.kind(),
            material: cmd.material.clone(),
            commands: vec![cmd],
        });
    }
    batches
}

/// Orders, groups and submits render commands once per frame.
#[derive(Debug)]
pub struct RenderCoordinator {
    passes: Vec<PassConfig>,
    frame: u64,
    // Unknown pass ids already reported, so the warning fires once per id.
    warned_unknown: HashSet<PassId>,
}

impl RenderCoordinator {
    /// Creates a coordinator drawing `passes` in the given order.
    pub fn new(passes: Vec<PassConfig>) -> Self {
        Self {
            passes,
            frame: 0,
            warned_unknown: HashSet::new(),
        }
    }

    /// The configured passes, in draw order.
    pub fn passes(&self) -> &[PassConfig] {
        &self.passes
    }

    /// Number of frames coordinated so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Coordinates one frame.
    ///
    /// `camera` is used for culling and handed to the backend for world
    /// passes; without a camera, world passes are not culled.
    pub fn render_frame(
        &mut self,
        queue: &dyn RenderQueueDrainPort,
        camera: Option<CameraSnapshot>,
        backend: &mut dyn RenderBackend,
    ) -> FrameStats {
        self.frame += 1;
        let mut stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };

        for pass in &self.passes {
            let drained = queue.drain(&pass.id);
            if drained.is_empty() {
                continue;
            }
            stats.submitted += drained.len();

            let pass_camera = match pass.space {
                Space::World => camera,
                Space::Ui => None,
            };
            let mut commands = match pass_camera {
                Some(cam) => {
                    let (kept, culled) = cull(drained, &cam.visible_rect());
                    stats.culled += culled;
                    kept
                }
                None => drained,
            };
            if commands.is_empty() {
                log::trace!("RenderCoordinator: pass '{}' fully culled.", pass.id);
                continue;
            }

            sort_commands(pass, &mut commands);
            stats.drawn += commands.len();
            let batches = build_batches(commands);
            stats.batches += batches.len();

            if pass.clear_before {
                backend.clear();
            }
            backend.begin_pass(&PassBegin {
                pass_id: pass.id.clone(),
                space: pass.space,
                camera: pass_camera,
            });
            for batch in &batches {
                backend.submit_batch(batch);
            }
            backend.end_pass();
            stats.passes_drawn += 1;
        }

        for pass_id in queue.pass_ids() {
            if self.passes.iter().any(|p| p.id == pass_id) {
                continue;
            }
            let dropped = queue.drain(&pass_id).len();
            if dropped == 0 {
                continue;
            }
            stats.dropped += dropped;
            if self.warned_unknown.insert(pass_id.clone()) {
                log::warn!(
                    "RenderCoordinator: dropping commands for unknown pass '{pass_id}' ({dropped} this frame)."
                );
            }
        }

        log::trace!("RenderCoordinator: {stats:?}");
        stats
    }
}

/// Runs the [`RenderCoordinator`] from the engine's present phase.
///
/// Resolves the queue drain handle and the backend (required) and the camera
/// (optional) through its capability view in `start`. Drawing happens in
/// `present`, after every module's `render`, so producers registered after
/// this module still reach the backend in the same frame.
pub struct RenderCoordinatorModule {
    coordinator: RenderCoordinator,
    queue: Option<Arc<dyn RenderQueueDrainPort>>,
    camera: Option<Arc<dyn CameraReadPort>>,
    backend: Option<Arc<Mutex<dyn RenderBackend>>>,
    last_stats: FrameStats,
}

impl RenderCoordinatorModule {
    /// Module id.
    pub const ID: &'static str = "core/render";

    /// Creates the module; the pass list is read from the engine configuration.
    pub fn new() -> Self {
        Self {
            coordinator: RenderCoordinator::new(Vec::new()),
            queue: None,
            camera: None,
            backend: None,
            last_stats: FrameStats::default(),
        }
    }

    /// Statistics of the most recent frame.
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }
}

impl Default for RenderCoordinatorModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for RenderCoordinatorModule {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn start(&mut self, ctx: &Context) -> anyhow::Result<()> {
        self.coordinator = RenderCoordinator::new(ctx.config.passes.clone());
        self.queue = Some(ctx.services.get_or_err::<RenderQueueDrainToken>()?);
        self.backend = Some(ctx.services.get_or_err::<RenderBackendToken>()?);
        self.camera = ctx.services.get::<CameraReadToken>();
        if self.camera.is_none() {
            log::info!("RenderCoordinator: no camera service; world passes will not be culled.");
        }
        log::debug!(
            "RenderCoordinator: drawing passes {:?}.",
            self.coordinator
                .passes()
                .iter()
                .map(|p| p.id.as_str())
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    fn present(&mut self, _ctx: &Context) -> anyhow::Result<()> {
        let (Some(queue), Some(backend)) = (&self.queue, &self.backend) else {
            anyhow::bail!("render coordinator presented before start");
        };
        let camera = self.camera.as_ref().map(|c| c.snapshot());
        let mut backend = backend.lock().unwrap_or_else(PoisonError::into_inner);
        self.last_stats = self
            .coordinator
            .render_frame(queue.as_ref(), camera, &mut *backend);
        Ok(())
    }
}
