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

//! Engine-level errors.

use std::fmt;

use tessera_core::error::{ConfigError, ServiceError};

/// The engine's lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Modules can be added.
    Created,
    /// Every module initialized; the registry is frozen.
    Initialized,
    /// Every module started; frames can be ticked.
    Running,
    /// Modules were destroyed, or initialization failed.
    Stopped,
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnginePhase::Created => "created",
            EnginePhase::Initialized => "initialized",
            EnginePhase::Running => "running",
            EnginePhase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// The module hook a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// `Module::init`.
    Init,
    /// `Module::start`.
    Start,
    /// `Module::update`.
    Update,
    /// `Module::render`.
    Render,
    /// `Module::present`.
    Present,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPhase::Init => "init",
            HookPhase::Start => "start",
            HookPhase::Update => "update",
            HookPhase::Render => "render",
            HookPhase::Present => "present",
        };
        f.write_str(name)
    }
}

/// Errors returned by the [`Engine`](crate::Engine).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A module hook returned an error.
    #[error("module '{module}' failed in {phase}")]
    ModuleLifecycle {
        /// Id of the failing module.
        module: String,
        /// The hook that failed.
        phase: HookPhase,
        /// The module's error.
        #[source]
        source: anyhow::Error,
    },
    /// A service lookup failed outside a module hook.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// A lifecycle method was called in the wrong phase.
    #[error("cannot {action} while the engine is {phase}")]
    InvalidPhase {
        /// The rejected operation.
        action: &'static str,
        /// The phase the engine was in.
        phase: EnginePhase,
    },
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// The underlying service error, when a module failed on a missing or
    /// unauthorized service.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            EngineError::Service(e) => Some(e),
            EngineError::ModuleLifecycle { source, .. } => source.downcast_ref::<ServiceError>(),
            _ => None,
        }
    }
}
