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

//! Axis-aligned rectangles used for culling and layout.

use serde::{Deserialize, Serialize};

use super::Vec2;

/// An axis-aligned rectangle described by its origin corner and its size.
///
/// The origin is the corner with the smallest coordinates on both axes, so the
/// same type serves world space (Y up) and UI space (Y down). A rectangle is a
/// simple but highly efficient volume for visibility culling.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Smallest x coordinate covered by the rectangle.
    pub x: f32,
    /// Smallest y coordinate covered by the rectangle.
    pub y: f32,
    /// Extent along the x axis. Never negative for rectangles built through the constructors.
    pub w: f32,
    /// Extent along the y axis. Never negative for rectangles built through the constructors.
    pub h: f32,
}

impl Rect {
    /// Creates a rectangle from its origin and size.
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle from two opposite corners, in any order.
    #[inline]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = Vec2::new(a.x.min(b.x), a.y.min(b.y));
        let max = Vec2::new(a.x.max(b.x), a.y.max(b.y));
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Creates a rectangle centered on `center` with the given half-extents.
    #[inline]
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        let half = Vec2::new(half_extents.x.abs(), half_extents.y.abs());
        Self::from_corners(center - half, center + half)
    }

    /// The smallest rectangle containing every point, or `None` for an empty slice.
    pub fn bounding(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min, mut max) = (*first, *first);
        for p in rest {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some(Self::from_corners(min, max))
    }

    /// The corner with the largest coordinates.
    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    /// The center point of the rectangle.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Checks if this rectangle overlaps another one.
    ///
    /// Touching edges count as an intersection.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        let (max, other_max) = (self.max(), other.max());
        self.x <= other_max.x && max.x >= other.x && self.y <= other_max.y && max.y >= other.y
    }

    /// Checks if a point lies inside the rectangle (edges included).
    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.w
            && point.y >= self.y
            && point.y <= self.y + self.h
    }
}
