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

//! Provides the typed publish/subscribe primitives used by modules.
//!
//! The [`EventBus`] is generic over its event type so that `tessera-core`
//! stays decoupled from any particular event union; the engine itself runs on
//! [`EngineEvent`], a closed union with a [`EngineEvent::Custom`] escape
//! hatch for game-specific messages.

mod bus;
mod engine_event;

pub use self::bus::{BusEvent, EventBus, Handler, Subscription};
pub use self::engine_event::{EngineEvent, EventKind, PointerButton};
