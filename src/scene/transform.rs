//! Vector, colour and transform value types

use serde::{Deserialize, Serialize};

use crate::core::types::{DMat4, DQuat, DVec3, EulerRot};

/// Three-component vector used for positions, Euler rotations, scales and sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    fn one() -> Self {
        Self::ONE
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<DVec3> for Vector3 {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for DVec3 {
    fn from(v: Vector3) -> Self {
        DVec3::new(v.x, v.y, v.z)
    }
}

/// Linear RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<DVec3> for Color {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Color> for DVec3 {
    fn from(c: Color) -> Self {
        DVec3::new(c.r, c.g, c.b)
    }
}

/// Placement of an object or camera, optionally relative to a parent.
///
/// `rotation` holds XYZ Euler angles in degrees. A `parent_id` of 0 means
/// the transform is in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub parent_id: i32,
    pub position: Vector3,
    #[serde(default)]
    pub rotation: Vector3,
    #[serde(default = "Vector3::one")]
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            parent_id: 0,
            position: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
        }
    }
}

impl Transform {
    /// Identity transform (no translation, rotation, or scaling).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a translation-only transform.
    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: i32) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_rotation(mut self, rotation: Vector3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3) -> Self {
        self.scale = scale;
        self
    }

    pub fn has_parent(&self) -> bool {
        self.parent_id != 0
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// Rotation as a quaternion (XYZ order, degrees converted to radians).
    pub fn rotation_quat(&self) -> DQuat {
        DQuat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }

    /// Convert to a 4x4 matrix.
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            self.scale.into(),
            self.rotation_quat(),
            self.position.into(),
        )
    }
}
