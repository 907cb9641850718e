//! Scene cameras and projections

use serde::{Deserialize, Serialize};

use crate::core::error::UnsetFieldAccess;

use super::transform::Transform;

/// Default vertical field of view in degrees
pub const DEFAULT_FOV: f64 = 60.0;

/// Pinhole projection with a vertical field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub fov: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self { fov: DEFAULT_FOV }
    }
}

impl PerspectiveCamera {
    /// Field of view in radians.
    pub fn fov_radians(&self) -> f64 {
        self.fov.to_radians()
    }
}

/// Camera projection. Exactly one variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    Perspective(PerspectiveCamera),
}

impl Projection {
    /// Variant key as it appears in JSON documents.
    pub fn name(&self) -> &'static str {
        match self {
            Projection::Perspective(_) => "perspective",
        }
    }
}

/// Viewpoint placed in the scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Camera {
    pub id: i32,
    pub transform: Transform,
    projection: Option<Projection>,
}

impl Camera {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn has_projection(&self) -> bool {
        self.projection.is_some()
    }

    pub fn projection(&self) -> Result<&Projection, UnsetFieldAccess> {
        self.projection
            .as_ref()
            .ok_or_else(|| UnsetFieldAccess::new("projection"))
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = Some(projection);
    }

    pub fn clear_projection(&mut self) {
        self.projection = None;
    }

    pub fn perspective(&self) -> Result<&PerspectiveCamera, UnsetFieldAccess> {
        match &self.projection {
            Some(Projection::Perspective(perspective)) => Ok(perspective),
            None => Err(UnsetFieldAccess::new("perspective")),
        }
    }

    /// Mutable access to the perspective projection, selecting a default
    /// perspective first if no projection is set.
    pub fn perspective_mut(&mut self) -> &mut PerspectiveCamera {
        let projection = self
            .projection
            .get_or_insert_with(|| Projection::Perspective(PerspectiveCamera::default()));
        match projection {
            Projection::Perspective(perspective) => perspective,
        }
    }

    pub fn set_perspective(&mut self, fov: f64) {
        self.projection = Some(Projection::Perspective(PerspectiveCamera { fov }));
    }

    /// Fail if the projection union is unset.
    pub fn ensure_complete(&self) -> Result<(), UnsetFieldAccess> {
        self.projection().map(|_| ())
    }
}
