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

//! Engine configuration, loaded once before the loop starts.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
pub use crate::renderer::PassConfig;
use crate::renderer::Space;

/// What the fixed-step clock does when a single frame reports a very long delta
/// (debugger pause, backgrounded window, slow machine).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StallPolicy {
    /// Simulate every elapsed step, however many.
    Uncapped,
    /// Treat any frame delta above `max_frame_ms` as exactly `max_frame_ms`.
    ClampFrame {
        /// Largest delta accepted per frame, in milliseconds.
        max_frame_ms: f64,
    },
    /// Run at most `max_steps` updates per frame and discard the remaining backlog.
    DropBacklog {
        /// Largest number of updates per frame.
        max_steps: u32,
    },
}

impl Default for StallPolicy {
    fn default() -> Self {
        StallPolicy::ClampFrame {
            max_frame_ms: 250.0,
        }
    }
}

/// Process-wide engine configuration.
///
/// Every field has a default, so a JSON document only needs the values it
/// changes:
///
/// ```rust
/// use tessera_core::config::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{ "width": 320, "height": 240 }"#).unwrap();
/// assert_eq!(config.width, 320);
/// assert_eq!(config.passes.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Frame rate the run loop aims for.
    #[serde(alias = "targetFPS")]
    pub target_fps: u32,
    /// Simulation step, in seconds.
    pub fixed_step: f64,
    /// Long-frame handling.
    pub stall_policy: StallPolicy,
    /// Render passes, in draw order.
    pub passes: Vec<PassConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            target_fps: 60,
            fixed_step: 1.0 / 60.0,
            stall_policy: StallPolicy::default(),
            passes: vec![
                PassConfig::new("world", Space::World).with_clear(true),
                PassConfig::new("ui", Space::Ui),
            ],
        }
    }
}

impl EngineConfig {
    /// Default configuration with the given surface size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Replaces the pass list.
    pub fn with_passes(mut self, passes: Vec<PassConfig>) -> Self {
        self.passes = passes;
        self
    }

    /// Sets the simulation step, in seconds.
    pub fn with_fixed_step(mut self, fixed_step: f64) -> Self {
        self.fixed_step = fixed_step;
        self
    }

    /// Sets the stall policy.
    pub fn with_stall_policy(mut self, policy: StallPolicy) -> Self {
        self.stall_policy = policy;
        self
    }

    /// Sets the target frame rate.
    pub fn with_target_fps(mut self, target_fps: u32) -> Self {
        self.target_fps = target_fps;
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loading engine config from '{}'.", path.display());
        Self::from_json_str(&text)
    }

    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "surface size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("targetFps must be positive".into()));
        }
        if !self.fixed_step.is_finite() || self.fixed_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fixedStep must be a positive number of seconds, got {}",
                self.fixed_step
            )));
        }
        match self.stall_policy {
            StallPolicy::ClampFrame { max_frame_ms } if max_frame_ms.is_nan() || max_frame_ms <= 0.0 => {
                return Err(ConfigError::Invalid(format!(
                    "stall policy maxFrameMs must be positive, got {max_frame_ms}"
                )));
            }
            StallPolicy::DropBacklog { max_steps: 0 } => {
                return Err(ConfigError::Invalid(
                    "stall policy maxSteps must be at least 1".into(),
                ));
            }
            _ => {}
        }
        if self.passes.is_empty() {
            return Err(ConfigError::Invalid("at least one pass is required".into()));
        }
        let mut seen = HashSet::new();
        for pass in &self.passes {
            if pass.id.is_empty() {
                return Err(ConfigError::Invalid("pass ids must not be empty".into()));
            }
            if !seen.insert(pass.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate pass id '{}'",
                    pass.id
                )));
            }
        }
        Ok(())
    }

    /// The configuration of pass `id`.
    pub fn pass(&self, id: &str) -> Option<&PassConfig> {
        self.passes.iter().find(|p| p.id == id)
    }

    /// Wall-clock time between frames at the target frame rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}
