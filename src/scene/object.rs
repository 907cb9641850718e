//! Scene objects and their geometry kinds

use serde::{Deserialize, Serialize};

use crate::core::error::UnsetFieldAccess;

use super::material::{
    LambertReflectionMaterial, Material, ObjectMaterial, SolidMaterial, SpecularReflectionMaterial,
};
use super::transform::{Color, Transform, Vector3};

/// Geometry stored in an external mesh file. The reference is never opened here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshedObject {
    pub reference: String,
}

impl MeshedObject {
    pub fn new(reference: impl Into<String>) -> Self {
        Self { reference: reference.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub radius: f64,
}

/// Axis-aligned box centred on the object origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub size: Vector3,
}

/// Infinite plane through the origin, normal along +Y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plane {}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub radius: f64,
}

/// What a scene object is made of. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    MeshedObject(MeshedObject),
    Sphere(Sphere),
    Cube(Cube),
    Plane(Plane),
    Disk(Disk),
}

impl ObjectKind {
    /// Variant key as it appears in JSON documents.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::MeshedObject(_) => "meshed_object",
            ObjectKind::Sphere(_) => "sphere",
            ObjectKind::Cube(_) => "cube",
            ObjectKind::Plane(_) => "plane",
            ObjectKind::Disk(_) => "disk",
        }
    }
}

/// A renderable object: transform, material and geometry kind.
///
/// The material and kind unions start out unset. The material is either
/// inline or a `material_id` into the scene material library. Setting a variant replaces
/// whatever sibling was set before; reading a variant that is not the active
/// one fails with [`UnsetFieldAccess`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneObject {
    pub id: i32,
    pub transform: Transform,
    material: Option<ObjectMaterial>,
    kind: Option<ObjectKind>,
}

impl SceneObject {
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

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(ObjectMaterial::Material(material));
        self
    }

    pub fn with_material_id(mut self, material_id: impl Into<String>) -> Self {
        self.material = Some(ObjectMaterial::MaterialId(material_id.into()));
        self
    }

    pub fn with_object_material(mut self, material: ObjectMaterial) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_kind(mut self, kind: ObjectKind) -> Self {
        self.kind = Some(kind);
        self
    }

    // --- material union ---

    pub fn has_material(&self) -> bool {
        self.material.is_some()
    }

    /// The material union itself, inline or by reference.
    pub fn object_material(&self) -> Result<&ObjectMaterial, UnsetFieldAccess> {
        self.material
            .as_ref()
            .ok_or_else(|| UnsetFieldAccess::new("material"))
    }

    pub fn set_object_material(&mut self, material: ObjectMaterial) {
        self.material = Some(material);
    }

    /// The inline material. Fails if the union is unset or holds a `material_id`.
    pub fn material(&self) -> Result<&Material, UnsetFieldAccess> {
        match &self.material {
            Some(ObjectMaterial::Material(material)) => Ok(material),
            _ => Err(UnsetFieldAccess::new("material")),
        }
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = Some(ObjectMaterial::Material(material));
    }

    pub fn material_id(&self) -> Result<&str, UnsetFieldAccess> {
        match &self.material {
            Some(ObjectMaterial::MaterialId(id)) => Ok(id),
            _ => Err(UnsetFieldAccess::new("material_id")),
        }
    }

    pub fn set_material_id(&mut self, material_id: impl Into<String>) {
        self.material = Some(ObjectMaterial::MaterialId(material_id.into()));
    }

    pub fn clear_material(&mut self) {
        self.material = None;
    }

    pub fn solid(&self) -> Result<&SolidMaterial, UnsetFieldAccess> {
        match self.material() {
            Ok(Material::Solid(solid)) => Ok(solid),
            _ => Err(UnsetFieldAccess::new("material.solid")),
        }
    }

    pub fn set_solid(&mut self) {
        self.set_material(Material::solid());
    }

    pub fn lambert_reflection(&self) -> Result<&LambertReflectionMaterial, UnsetFieldAccess> {
        match self.material() {
            Ok(Material::LambertReflection(lambert)) => Ok(lambert),
            _ => Err(UnsetFieldAccess::new("material.lambert_reflection")),
        }
    }

    pub fn set_lambert_reflection(&mut self, color: Color) {
        self.set_material(Material::lambert(color));
    }

    pub fn specular_reflection(&self) -> Result<&SpecularReflectionMaterial, UnsetFieldAccess> {
        match self.material() {
            Ok(Material::SpecularReflection(specular)) => Ok(specular),
            _ => Err(UnsetFieldAccess::new("material.specular_reflection")),
        }
    }

    pub fn set_specular_reflection(&mut self, eta: f64) {
        self.set_material(Material::specular(eta));
    }

    // --- kind union ---

    pub fn has_kind(&self) -> bool {
        self.kind.is_some()
    }

    pub fn kind(&self) -> Result<&ObjectKind, UnsetFieldAccess> {
        self.kind.as_ref().ok_or_else(|| UnsetFieldAccess::new("kind"))
    }

    pub fn set_kind(&mut self, kind: ObjectKind) {
        self.kind = Some(kind);
    }

    pub fn clear_kind(&mut self) {
        self.kind = None;
    }

    pub fn meshed_object(&self) -> Result<&MeshedObject, UnsetFieldAccess> {
        match &self.kind {
            Some(ObjectKind::MeshedObject(meshed)) => Ok(meshed),
            _ => Err(UnsetFieldAccess::new("meshed_object")),
        }
    }

    /// Mutable access to the meshed object, switching the kind to an empty
    /// meshed object first if another (or no) kind is set.
    pub fn meshed_object_mut(&mut self) -> &mut MeshedObject {
        match self.kind {
            Some(ObjectKind::MeshedObject(ref mut meshed)) => meshed,
            _ => {
                self.kind = Some(ObjectKind::MeshedObject(MeshedObject::default()));
                self.meshed_object_mut()
            }
        }
    }

    pub fn set_meshed_object(&mut self, meshed: MeshedObject) {
        self.kind = Some(ObjectKind::MeshedObject(meshed));
    }

    pub fn sphere(&self) -> Result<&Sphere, UnsetFieldAccess> {
        match &self.kind {
            Some(ObjectKind::Sphere(sphere)) => Ok(sphere),
            _ => Err(UnsetFieldAccess::new("sphere")),
        }
    }

    pub fn set_sphere(&mut self, radius: f64) {
        self.kind = Some(ObjectKind::Sphere(Sphere { radius }));
    }

    pub fn cube(&self) -> Result<&Cube, UnsetFieldAccess> {
        match &self.kind {
            Some(ObjectKind::Cube(cube)) => Ok(cube),
            _ => Err(UnsetFieldAccess::new("cube")),
        }
    }

    pub fn set_cube(&mut self, size: Vector3) {
        self.kind = Some(ObjectKind::Cube(Cube { size }));
    }

    pub fn plane(&self) -> Result<&Plane, UnsetFieldAccess> {
        match &self.kind {
            Some(ObjectKind::Plane(plane)) => Ok(plane),
            _ => Err(UnsetFieldAccess::new("plane")),
        }
    }

    pub fn set_plane(&mut self) {
        self.kind = Some(ObjectKind::Plane(Plane {}));
    }

    pub fn disk(&self) -> Result<&Disk, UnsetFieldAccess> {
        match &self.kind {
            Some(ObjectKind::Disk(disk)) => Ok(disk),
            _ => Err(UnsetFieldAccess::new("disk")),
        }
    }

    pub fn set_disk(&mut self, radius: f64) {
        self.kind = Some(ObjectKind::Disk(Disk { radius }));
    }

    /// Fail with the first unset union of this object.
    pub fn ensure_complete(&self) -> Result<(), UnsetFieldAccess> {
        self.object_material()?;
        self.kind()?;
        Ok(())
    }
}
