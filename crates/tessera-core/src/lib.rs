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

//! # Tessera Core
//!
//! Foundational crate containing the contracts every other Tessera crate
//! builds on: capability tokens and the service registry, the typed event
//! bus, the module trait, engine configuration, and the render data model
//! shared by producers, the coordinator and backends.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;
pub mod math;
pub mod module;
pub mod ports;
pub mod renderer;
pub mod service;

pub use config::EngineConfig;
pub use error::{ConfigError, ServiceError};
pub use module::{Context, InitContext, Module};
