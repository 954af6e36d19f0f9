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

//! Provides the 2D mathematics primitives used by the engine core.
//!
//! World space is measured in meters with the Y axis pointing up; UI space is
//! measured in pixels with the Y axis pointing down. The camera transform in
//! [`affine_transform`] bridges the two.
//!
//! All angular functions in this module operate in **radians**.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, PI, TAU};

pub mod affine_transform;
pub mod geometry;
pub mod vector;

pub use self::affine_transform::Affine2;
pub use self::geometry::Rect;
pub use self::vector::Vec2;
