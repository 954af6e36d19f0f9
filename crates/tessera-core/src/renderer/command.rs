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

//! Render commands: "what to draw", produced fresh every frame by modules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{Rect, Vec2};

/// Identifier of a render pass, e.g. `"world"` or `"ui"`.
pub type PassId = String;

/// The coordinate space a pass (and its commands) lives in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    /// Meters, Y up, relative to the camera.
    #[default]
    World,
    /// Pixels, Y down, relative to the top-left corner of the surface.
    Ui,
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Space::World => write!(f, "world"),
            Space::Ui => write!(f, "ui"),
        }
    }
}

/// The discriminant of a [`Shape`].
///
/// The derived ordering is alphabetical by kind name and is part of the
/// coordinator's sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// A filled circle.
    Circle,
    /// A filled axis-aligned rectangle.
    Rect,
    /// An image or a frame of a sprite sheet.
    Sprite,
    /// A run of text.
    Text,
}

impl CommandKind {
    /// The lowercase kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Circle => "circle",
            CommandKind::Rect => "rect",
            CommandKind::Sprite => "sprite",
            CommandKind::Text => "text",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to a backend material, e.g. `"flat/blue"` or `"sprite/hero"`.
///
/// The core never interprets the name; it only compares it for sorting and batching.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Material(pub String);

impl Material {
    /// Creates a material reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The material name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}

impl From<&str> for Material {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Material {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind-specific geometry of a render command, in the command's space units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// A rectangle with its origin at the smallest coordinates.
    Rect {
        /// Origin x.
        x: f32,
        /// Origin y.
        y: f32,
        /// Width.
        w: f32,
        /// Height.
        h: f32,
    },
    /// A circle.
    Circle {
        /// Center x.
        x: f32,
        /// Center y.
        y: f32,
        /// Radius.
        radius: f32,
    },
    /// Text anchored at its baseline origin.
    Text {
        /// Anchor x.
        x: f32,
        /// Anchor y.
        y: f32,
        /// The string to draw.
        text: String,
        /// Font size in space units.
        size: f32,
    },
    /// An image, optionally cropped to a frame of a sprite sheet.
    Sprite {
        /// Asset key of the image.
        image: String,
        /// Destination origin x.
        x: f32,
        /// Destination origin y.
        y: f32,
        /// Destination width.
        w: f32,
        /// Destination height.
        h: f32,
        /// Source rectangle in image pixels; the whole image when `None`.
        frame: Option<Rect>,
        /// Rotation about the destination center, in radians.
        rotation: f32,
    },
}

impl Shape {
    /// The discriminant of this shape.
    pub fn kind(&self) -> CommandKind {
        match self {
            Shape::Rect { .. } => CommandKind::Rect,
            Shape::Circle { .. } => CommandKind::Circle,
            Shape::Text { .. } => CommandKind::Text,
            Shape::Sprite { .. } => CommandKind::Sprite,
        }
    }

    /// A conservative bounding box of the geometry.
    ///
    /// Text has no intrinsic bounds without font metrics, so it returns `None`.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Shape::Rect { x, y, w, h } => Some(Rect::from_corners(
                Vec2::new(*x, *y),
                Vec2::new(x + w, y + h),
            )),
            Shape::Circle { x, y, radius } => Some(Rect::from_center_half_extents(
                Vec2::new(*x, *y),
                Vec2::new(*radius, *radius),
            )),
            Shape::Text { .. } => None,
            Shape::Sprite {
                x, y, w, h, rotation, ..
            } => {
                let rect = Rect::from_corners(Vec2::new(*x, *y), Vec2::new(x + w, y + h));
                if *rotation == 0.0 {
                    return Some(rect);
                }
                // The rotated box fits in the circle around its center.
                let radius = Vec2::new(rect.w, rect.h).length() * 0.5;
                Some(Rect::from_center_half_extents(
                    rect.center(),
                    Vec2::new(radius, radius),
                ))
            }
        }
    }
}

/// A single draw request submitted to the render queue.
///
/// Commands are owned by the queue from submission until the coordinator
/// drains them, and are never mutated after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderCommand {
    /// The pass this command belongs to.
    pub pass_id: PassId,
    /// The coordinate space of the geometry.
    pub space: Space,
    /// Named layer, ranked by the pass's layer order.
    pub layer: String,
    /// Ordering key inside a layer; `None` sorts as `0`.
    pub z: Option<f32>,
    /// Stable identifier, used as the final sort tie-breaker.
    pub id: Option<String>,
    /// The material the backend paints with.
    pub material: Material,
    /// Bounding box for culling; commands without one are never culled.
    pub aabb: Option<Rect>,
    /// Kind-specific geometry.
    pub shape: Shape,
}

impl RenderCommand {
    /// Creates a command on the `"default"` layer with the default material.
    pub fn new(pass_id: impl Into<PassId>, space: Space, shape: Shape) -> Self {
        Self {
            pass_id: pass_id.into(),
            space,
            layer: "default".to_string(),
            z: None,
            id: None,
            material: Material::default(),
            aabb: None,
            shape,
        }
    }

    /// A rectangle command.
    pub fn rect(pass_id: impl Into<PassId>, space: Space, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(pass_id, space, Shape::Rect { x, y, w, h })
    }

    /// A circle command.
    pub fn circle(pass_id: impl Into<PassId>, space: Space, center: Vec2, radius: f32) -> Self {
        Self::new(
            pass_id,
            space,
            Shape::Circle {
                x: center.x,
                y: center.y,
                radius,
            },
        )
    }

    /// A text command.
    pub fn text(
        pass_id: impl Into<PassId>,
        space: Space,
        anchor: Vec2,
        text: impl Into<String>,
        size: f32,
    ) -> Self {
        Self::new(
            pass_id,
            space,
            Shape::Text {
                x: anchor.x,
                y: anchor.y,
                text: text.into(),
                size,
            },
        )
    }

    /// A sprite command drawing the whole image into `dest`.
    pub fn sprite(
        pass_id: impl Into<PassId>,
        space: Space,
        image: impl Into<String>,
        dest: Rect,
    ) -> Self {
        Self::new(
            pass_id,
            space,
            Shape::Sprite {
                image: image.into(),
                x: dest.x,
                y: dest.y,
                w: dest.w,
                h: dest.h,
                frame: None,
                rotation: 0.0,
            },
        )
    }

    /// Sets the layer name.
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    /// Sets the z ordering key.
    pub fn with_z(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    /// Sets the stable id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the material.
    pub fn with_material(mut self, material: impl Into<Material>) -> Self {
        self.material = material.into();
        self
    }

    /// Sets an explicit culling box.
    pub fn with_aabb(mut self, aabb: Rect) -> Self {
        self.aabb = Some(aabb);
        self
    }

    /// Sets the culling box to the shape's own bounds, when it has any.
    pub fn with_shape_bounds(mut self) -> Self {
        self.aabb = self.shape.bounds();
        self
    }

    /// The kind of this command.
    pub fn kind(&self) -> CommandKind {
        self.shape.kind()
    }
}
