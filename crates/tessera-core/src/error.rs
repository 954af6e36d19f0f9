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

//! Error types shared across the engine core.

use std::path::PathBuf;

/// A failure to resolve a service through the registry or a view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// No module registered the token.
    #[error("missing service '{token}': no module registered it during init")]
    Missing {
        /// The token's diagnostic name.
        token: &'static str,
    },
    /// The token exists (or may exist) but is outside the caller's whitelist.
    #[error("module '{module}' is not authorized to access service '{token}'")]
    Unauthorized {
        /// The token's diagnostic name.
        token: &'static str,
        /// The module whose view rejected the access.
        module: String,
    },
}

/// A failure to load or validate an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        /// The path that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid JSON for the config schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configuration parsed but violates a constraint.
    #[error("invalid config: {0}")]
    Invalid(String),
}
