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

//! A 2D affine transform, used to map world meters to screen pixels.

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::{Vec2, EPSILON};

/// A 2x3 affine matrix in column-major form.
///
/// A point is transformed as:
///
/// ```text
/// x' = a * x + c * y + tx
/// y' = b * x + d * y + ty
/// ```
///
/// The layout mirrors the `setTransform(a, b, c, d, e, f)` convention used by
/// 2D canvas-style backends, so a backend can forward the six fields as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine2 {
    /// Row 0, column 0.
    pub a: f32,
    /// Row 1, column 0.
    pub b: f32,
    /// Row 0, column 1.
    pub c: f32,
    /// Row 1, column 1.
    pub d: f32,
    /// Translation along x.
    pub tx: f32,
    /// Translation along y.
    pub ty: f32,
}

impl Affine2 {
    /// The identity transform (pixel space, y-down for UI passes).
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// A pure translation.
    #[inline]
    pub const fn translation(offset: Vec2) -> Self {
        Self {
            tx: offset.x,
            ty: offset.y,
            ..Self::IDENTITY
        }
    }

    /// A non-uniform scale about the origin.
    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// A counter-clockwise rotation about the origin, in radians.
    #[inline]
    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Applies the transform to a point.
    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// The determinant of the linear part.
    #[inline]
    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Computes the inverse transform, or `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() <= EPSILON * EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let a = self.d * inv;
        let b = -self.b * inv;
        let c = -self.c * inv;
        let d = self.a * inv;
        Some(Self {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Affine2 {
    type Output = Self;

    /// Composes two transforms; `rhs` is applied first.
    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            tx: self.a * rhs.tx + self.c * rhs.ty + self.tx,
            ty: self.b * rhs.tx + self.d * rhs.ty + self.ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FRAC_PI_2;

    #[test]
    fn test_composition_applies_rhs_first() {
        let t = Affine2::translation(Vec2::new(10.0, 0.0)) * Affine2::scale(2.0, 2.0);
        assert_eq!(t.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0));
    }

    #[test]
    fn test_inverse_round_trips() {
        let t = Affine2::translation(Vec2::new(3.0, -2.0))
            * Affine2::rotation(FRAC_PI_2)
            * Affine2::scale(4.0, -4.0);
        let inv = t.inverse().expect("transform should be invertible");
        let p = Vec2::new(0.25, 1.5);
        let back = inv.transform_point(t.transform_point(p));
        approx::assert_relative_eq!(back.x, p.x, epsilon = 1e-4);
        approx::assert_relative_eq!(back.y, p.y, epsilon = 1e-4);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Affine2::scale(0.0, 1.0).inverse().is_none());
    }
}
