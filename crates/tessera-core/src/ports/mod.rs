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

//! # Collaborator Ports
//!
//! Interface contracts for the adapters that sit around the engine core:
//! device input, the physics solver and the asset loader. Implementations
//! live outside the core and register themselves under the tokens below
//! during `init`.

pub mod assets;
pub mod input;
pub mod physics;

pub use self::assets::{AssetsPort, AssetsToken, ImageInfo};
pub use self::input::{InputReadPort, InputReadToken};
pub use self::physics::{
    BodyDesc, BodyHandle, BodyKind, ColliderShape, PhysicsReadPort, PhysicsReadToken,
    PhysicsStepPort, PhysicsStepToken, PhysicsWritePort, PhysicsWriteToken, RayHit,
};
