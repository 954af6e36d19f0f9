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

//! A capability-scoped service locator for engine modules.
//!
//! Services are keyed by [`ServiceToken`] types rather than strings, so the
//! compiler rejects a registration whose value does not match the token's
//! interface. Modules fill the [`ServiceRegistry`] during `init()`; the engine
//! then freezes it and hands every module a [`ServiceView`] limited to the
//! tokens it was granted.
//!
//! # Design
//!
//! This follows the **Service Locator** pattern to satisfy the
//! **Interface Segregation Principle**: each module fetches only the ports it
//! needs, and adding new services never modifies the module context.

mod registry;
mod token;
mod view;

pub use self::registry::ServiceRegistry;
pub use self::token::{ServiceToken, TokenId};
pub use self::view::ServiceView;
