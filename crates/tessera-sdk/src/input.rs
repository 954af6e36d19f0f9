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

//! Polled input state built from bus events.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tessera_core::event::{EngineEvent, PointerButton};
use tessera_core::math::Vec2;
use tessera_core::module::{Context, InitContext, Module};
use tessera_core::ports::{InputReadPort, InputReadToken};

#[derive(Debug, Default)]
struct State {
    keys: HashSet<String>,
    buttons: BTreeSet<PointerButton>,
    cursor: Option<Vec2>,
}

/// Current keyboard and pointer state.
#[derive(Debug, Default)]
pub struct InputState {
    state: Mutex<State>,
}

impl InputState {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Folds one event into the state. Returns `true` if it was an input event.
    pub fn apply(&self, event: &EngineEvent) -> bool {
        let mut state = self.state();
        match event {
            EngineEvent::KeyDown { key } => {
                state.keys.insert(key.clone());
            }
            EngineEvent::KeyUp { key } => {
                state.keys.remove(key);
            }
            EngineEvent::PointerMove { x, y } => {
                state.cursor = Some(Vec2::new(*x, *y));
            }
            EngineEvent::PointerDown { x, y, button } => {
                state.cursor = Some(Vec2::new(*x, *y));
                state.buttons.insert(*button);
            }
            EngineEvent::PointerUp { x, y, button } => {
                state.cursor = Some(Vec2::new(*x, *y));
                state.buttons.remove(button);
            }
            _ => return false,
        }
        true
    }

    /// Releases every key and button.
    pub fn release_all(&self) {
        let mut state = self.state();
        state.keys.clear();
        state.buttons.clear();
    }
}

impl InputReadPort for InputState {
    fn is_down(&self, key: &str) -> bool {
        self.state().keys.contains(key)
    }

    fn buttons(&self) -> BTreeSet<PointerButton> {
        self.state().buttons.clone()
    }

    fn cursor(&self) -> Option<Vec2> {
        self.state().cursor
    }
}

/// Publishes an [`InputState`] under [`InputReadToken`] and keeps it current
/// from the engine's input events.
///
/// Device adapters only need to emit [`EngineEvent`]s; gameplay modules
/// poll through the port.
#[derive(Default)]
pub struct InputModule {
    input: Arc<InputState>,
}

impl InputModule {
    /// Module id.
    pub const ID: &'static str = "core/input";

    /// Creates the module with no key held.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to the state, for hosts that read it directly.
    pub fn state(&self) -> Arc<InputState> {
        self.input.clone()
    }
}

#[async_trait]
impl Module for InputModule {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn init(&mut self, ctx: &mut InitContext<'_>) -> anyhow::Result<()> {
        ctx.services.set::<InputReadToken>(self.input.clone());
        Ok(())
    }

    fn on_event(&mut self, _ctx: &Context, event: &EngineEvent) -> anyhow::Result<()> {
        self.input.apply(event);
        Ok(())
    }

    fn destroy(&mut self, _ctx: &Context) {
        self.input.release_all();
    }
}
