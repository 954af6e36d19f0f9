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

//! Read-only view of the current input state.

use std::collections::BTreeSet;

use crate::define_token;
use crate::event::PointerButton;
use crate::math::Vec2;

/// Polled input state, kept current by an adapter listening to input events.
pub trait InputReadPort: Send + Sync {
    /// Returns `true` while `key` is held down.
    fn is_down(&self, key: &str) -> bool;

    /// The pointer buttons currently held.
    fn buttons(&self) -> BTreeSet<PointerButton>;

    /// The last known pointer position in UI pixels, if the pointer was seen.
    fn cursor(&self) -> Option<Vec2>;
}

define_token!(
    /// Poll keyboard and pointer state.
    pub InputReadToken => dyn InputReadPort, "input/read"
);
