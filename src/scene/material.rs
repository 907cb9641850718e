//! Surface materials

use serde::{Deserialize, Serialize};

use super::transform::Color;

/// Marks an object as solid shaded. Carries no parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidMaterial {}

/// Diffuse material with a single albedo colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LambertReflectionMaterial {
    pub color: Color,
}

/// Default index of refraction for specular materials
pub const DEFAULT_ETA: f64 = 1.5;

fn default_eta() -> f64 {
    DEFAULT_ETA
}

/// Perfect mirror or dielectric with index of refraction `eta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecularReflectionMaterial {
    #[serde(default = "default_eta")]
    pub eta: f64,
}

impl Default for SpecularReflectionMaterial {
    fn default() -> Self {
        Self { eta: DEFAULT_ETA }
    }
}

/// Surface material. Exactly one variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Solid(SolidMaterial),
    LambertReflection(LambertReflectionMaterial),
    SpecularReflection(SpecularReflectionMaterial),
}

impl Material {
    /// Variant key as it appears in JSON documents.
    pub fn name(&self) -> &'static str {
        match self {
            Material::Solid(_) => "solid",
            Material::LambertReflection(_) => "lambert_reflection",
            Material::SpecularReflection(_) => "specular_reflection",
        }
    }

    pub fn solid() -> Self {
        Material::Solid(SolidMaterial {})
    }

    pub fn lambert(color: Color) -> Self {
        Material::LambertReflection(LambertReflectionMaterial { color })
    }

    pub fn specular(eta: f64) -> Self {
        Material::SpecularReflection(SpecularReflectionMaterial { eta })
    }
}

/// Named entry of the scene material library, referenced from objects by id.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDefinition {
    pub id: String,
    pub material: Material,
}

impl MaterialDefinition {
    pub fn new(id: impl Into<String>, material: Material) -> Self {
        Self {
            id: id.into(),
            material,
        }
    }
}

/// How a scene object gets its material: inline, or by library id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectMaterial {
    Material(Material),
    MaterialId(String),
}
