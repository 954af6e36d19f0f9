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

//! Pass configuration and the per-pass values handed to a backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::camera::CameraSnapshot;
use super::command::{CommandKind, Material, PassId, RenderCommand, Space};

/// Static description of one render pass.
///
/// Passes are drawn in the order they appear in the engine configuration.
/// Layers named in `layer_order` sort by their rank; unknown layers rank `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassConfig {
    /// Unique pass id.
    pub id: PassId,
    /// The coordinate space of every command in the pass.
    pub space: Space,
    /// Rank of each named layer; lower ranks draw first.
    #[serde(default)]
    pub layer_order: BTreeMap<String, i32>,
    /// Whether the backend is asked to clear the target before this pass.
    #[serde(default)]
    pub clear_before: bool,
}

impl PassConfig {
    /// A pass with no layer ranks that does not clear.
    pub fn new(id: impl Into<PassId>, space: Space) -> Self {
        Self {
            id: id.into(),
            space,
            layer_order: BTreeMap::new(),
            clear_before: false,
        }
    }

    /// Ranks the given layers by their position in the list.
    pub fn with_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layer_order = layers
            .into_iter()
            .enumerate()
            .map(|(rank, name)| (name.into(), rank as i32))
            .collect();
        self
    }

    /// Sets the rank of a single layer.
    pub fn with_layer_rank(mut self, layer: impl Into<String>, rank: i32) -> Self {
        self.layer_order.insert(layer.into(), rank);
        self
    }

    /// Sets whether the pass clears the target first.
    pub fn with_clear(mut self, clear_before: bool) -> Self {
        self.clear_before = clear_before;
        self
    }

    /// The rank of `layer`, `0` when the pass does not name it.
    pub fn layer_rank(&self, layer: &str) -> i32 {
        self.layer_order.get(layer).copied().unwrap_or(0)
    }
}

/// Passed to [`RenderBackend::begin_pass`](super::RenderBackend::begin_pass).
#[derive(Debug, Clone, PartialEq)]
pub struct PassBegin {
    /// The pass being drawn.
    pub pass_id: PassId,
    /// Its coordinate space.
    pub space: Space,
    /// The camera for world passes; `None` for UI passes or without a camera service.
    pub camera: Option<CameraSnapshot>,
}

/// A run of consecutive commands sharing a kind and a material.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Shared command kind.
    pub kind: CommandKind,
    /// Shared material.
    pub material: Material,
    /// The commands, in draw order.
    pub commands: Vec<RenderCommand>,
}

impl Batch {
    /// Number of commands in the batch.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the batch holds no command.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
