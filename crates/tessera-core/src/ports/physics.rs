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

//! # Physics Ports
//!
//! Contracts for a 2D rigid-body solver. The engine never simulates bodies
//! itself; a physics module wraps a solver and registers these ports.

use serde::{Deserialize, Serialize};

use crate::define_token;
use crate::math::{Rect, Vec2};

/// Opaque handle to a rigid body owned by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Defines how a body responds to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Responds to forces and collisions.
    Dynamic,
    /// Fixed in place, does not move.
    Static,
    /// Moved by game code, not by forces.
    Kinematic,
}

/// Supported collider shapes, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Box with half-extents.
    Box(Vec2),
    /// Circle with radius.
    Circle(f32),
}

/// Description for creating a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    /// Initial position in meters.
    pub position: Vec2,
    /// Initial rotation in radians.
    pub rotation: f32,
    /// Body kind.
    pub kind: BodyKind,
    /// Collision shape.
    pub shape: ColliderShape,
    /// Initial linear velocity in meters per second.
    pub linear_velocity: Vec2,
    /// Mass in kg (dynamic bodies only).
    pub mass: f32,
}

/// Result of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The body hit.
    pub body: BodyHandle,
    /// World-space hit point.
    pub point: Vec2,
    /// Surface normal at the hit point.
    pub normal: Vec2,
    /// Distance along the ray.
    pub distance: f32,
}

/// Queries against the current simulation state.
pub trait PhysicsReadPort: Send + Sync {
    /// Position and rotation of a body.
    fn transform(&self, body: BodyHandle) -> Option<(Vec2, f32)>;

    /// Linear velocity of a body.
    fn velocity(&self, body: BodyHandle) -> Option<Vec2>;

    /// Bodies whose colliders overlap `area`.
    fn query_rect(&self, area: Rect) -> Vec<BodyHandle>;

    /// The closest body along a ray, within `max_distance`.
    fn ray_cast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit>;
}

/// Body creation and manipulation. Setters return `false` for unknown bodies.
pub trait PhysicsWritePort: Send + Sync {
    /// Creates a body.
    fn create_body(&self, desc: BodyDesc) -> BodyHandle;

    /// Removes a body. Returns `false` if it did not exist.
    fn remove_body(&self, body: BodyHandle) -> bool;

    /// Teleports a body.
    fn set_transform(&self, body: BodyHandle, position: Vec2, rotation: f32) -> bool;

    /// Overrides a body's linear velocity.
    fn set_velocity(&self, body: BodyHandle, velocity: Vec2) -> bool;

    /// Applies a continuous force for the next step.
    fn apply_force(&self, body: BodyHandle, force: Vec2) -> bool;

    /// Applies an instantaneous impulse.
    fn apply_impulse(&self, body: BodyHandle, impulse: Vec2) -> bool;
}

/// Advances the simulation; usually called from one module's `update`.
pub trait PhysicsStepPort: Send + Sync {
    /// Advances by `dt` seconds, split into `substeps` (at least one).
    fn step(&self, dt: f64, substeps: u32);
}

define_token!(
    /// Query bodies.
    pub PhysicsReadToken => dyn PhysicsReadPort, "physics/read"
);
define_token!(
    /// Create and push bodies.
    pub PhysicsWriteToken => dyn PhysicsWritePort, "physics/write"
);
define_token!(
    /// Step the solver.
    pub PhysicsStepToken => dyn PhysicsStepPort, "physics/step"
);
