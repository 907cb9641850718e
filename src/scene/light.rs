//! Scene lights

use serde::{Deserialize, Serialize};

use crate::core::error::UnsetFieldAccess;

use super::transform::{Color, Transform};

/// Omnidirectional light at the transform position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointLight {}

/// Parallel light shining along the transform's rotated -Z axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalLight {}

/// Uniform light arriving from every direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentLight {}

/// Spherical area light centred on the transform position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSphere {
    pub radius: f64,
}

/// Kind of light source. Exactly one variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    Point(PointLight),
    Directional(DirectionalLight),
    Environment(EnvironmentLight),
    Sphere(LightSphere),
}

impl LightKind {
    /// Variant key as it appears in JSON documents.
    pub fn name(&self) -> &'static str {
        match self {
            LightKind::Point(_) => "point",
            LightKind::Directional(_) => "directional",
            LightKind::Environment(_) => "environment",
            LightKind::Sphere(_) => "sphere",
        }
    }
}

/// Light source placed in the scene. `color` defaults to white.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Light {
    pub id: i32,
    pub transform: Transform,
    pub color: Color,
    kind: Option<LightKind>,
}

impl Light {
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

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_kind(mut self, kind: LightKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn has_kind(&self) -> bool {
        self.kind.is_some()
    }

    pub fn kind(&self) -> Result<&LightKind, UnsetFieldAccess> {
        self.kind.as_ref().ok_or_else(|| UnsetFieldAccess::new("kind"))
    }

    pub fn set_kind(&mut self, kind: LightKind) {
        self.kind = Some(kind);
    }

    pub fn clear_kind(&mut self) {
        self.kind = None;
    }

    pub fn point(&self) -> Result<&PointLight, UnsetFieldAccess> {
        match &self.kind {
            Some(LightKind::Point(point)) => Ok(point),
            _ => Err(UnsetFieldAccess::new("point")),
        }
    }

    pub fn set_point(&mut self) {
        self.kind = Some(LightKind::Point(PointLight {}));
    }

    pub fn directional(&self) -> Result<&DirectionalLight, UnsetFieldAccess> {
        match &self.kind {
            Some(LightKind::Directional(directional)) => Ok(directional),
            _ => Err(UnsetFieldAccess::new("directional")),
        }
    }

    pub fn set_directional(&mut self) {
        self.kind = Some(LightKind::Directional(DirectionalLight {}));
    }

    pub fn environment(&self) -> Result<&EnvironmentLight, UnsetFieldAccess> {
        match &self.kind {
            Some(LightKind::Environment(environment)) => Ok(environment),
            _ => Err(UnsetFieldAccess::new("environment")),
        }
    }

    pub fn set_environment(&mut self) {
        self.kind = Some(LightKind::Environment(EnvironmentLight {}));
    }

    pub fn sphere(&self) -> Result<&LightSphere, UnsetFieldAccess> {
        match &self.kind {
            Some(LightKind::Sphere(sphere)) => Ok(sphere),
            _ => Err(UnsetFieldAccess::new("sphere")),
        }
    }

    pub fn set_sphere(&mut self, radius: f64) {
        self.kind = Some(LightKind::Sphere(LightSphere { radius }));
    }

    /// Fail if the kind union is unset.
    pub fn ensure_complete(&self) -> Result<(), UnsetFieldAccess> {
        self.kind().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_light_is_white_without_kind() {
        let light = Light::new(3);
        assert_eq!(light.color, Color::WHITE);
        assert!(!light.has_kind());
        assert_eq!(light.ensure_complete().unwrap_err().field, "kind");
    }

    #[test]
    fn test_kind_exclusivity() {
        let mut light = Light::new(1);
        light.set_point();
        assert!(light.point().is_ok());

        light.set_directional();
        assert_eq!(light.point().unwrap_err().field, "point");
        assert!(light.directional().is_ok());

        light.set_environment();
        assert!(light.directional().is_err());
        assert!(light.environment().is_ok());

        light.set_sphere(0.25);
        assert!(light.environment().is_err());
        assert_eq!(light.sphere().unwrap().radius, 0.25);
        assert_eq!(light.kind().unwrap().name(), "sphere");

        light.clear_kind();
        assert!(light.sphere().is_err());
    }

    #[test]
    fn test_light_kind_json_shape() {
        let value = serde_json::to_value(LightKind::Sphere(LightSphere { radius: 2.0 })).unwrap();
        assert_eq!(value, serde_json::json!({ "sphere": { "radius": 2.0 } }));

        let value = serde_json::to_value(LightKind::Directional(DirectionalLight {})).unwrap();
        assert_eq!(value, serde_json::json!({ "directional": {} }));
    }
}
