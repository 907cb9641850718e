//! Scene root: version, render options, objects and cameras.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::error::{UnsetFieldAccess, ValidationError};

use super::camera::Camera;
use super::light::Light;
use super::material::{Material, MaterialDefinition, ObjectMaterial};
use super::object::SceneObject;
use super::transform::Transform;

/// Scene schema version produced by `Scene::new`
pub const SCENE_VERSION: u32 = 1;

/// Output image settings and the camera to render from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub camera_id: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            camera_id: 0,
            width: 640,
            height: 320,
        }
    }
}

/// Root of a scene description.
///
/// `scene_objects`, `cameras`, `lights` and `materials` are ordered; both
/// codecs preserve order. `materials` is the library that objects reference
/// through `material_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub version: u32,
    pub render_options: Option<RenderOptions>,
    pub scene_objects: Vec<SceneObject>,
    pub cameras: Vec<Camera>,
    pub lights: Vec<Light>,
    pub materials: Vec<MaterialDefinition>,
}

impl Scene {
    /// Create an empty scene at the current schema version.
    pub fn new() -> Self {
        Self {
            version: SCENE_VERSION,
            ..Default::default()
        }
    }

    pub fn with_render_options(mut self, render_options: RenderOptions) -> Self {
        self.render_options = Some(render_options);
        self
    }

    /// Append an object, returning its index.
    pub fn add_object(&mut self, object: SceneObject) -> usize {
        self.scene_objects.push(object);
        self.scene_objects.len() - 1
    }

    /// Append a camera, returning its index.
    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    /// Append a light, returning its index.
    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    /// Add a material to the library, returning its index.
    pub fn add_material(&mut self, material: MaterialDefinition) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn scene_object(&self, id: i32) -> Option<&SceneObject> {
        self.scene_objects.iter().find(|o| o.id == id)
    }

    pub fn scene_object_mut(&mut self, id: i32) -> Option<&mut SceneObject> {
        self.scene_objects.iter_mut().find(|o| o.id == id)
    }

    pub fn camera(&self, id: i32) -> Option<&Camera> {
        self.cameras.iter().find(|c| c.id == id)
    }

    pub fn camera_mut(&mut self, id: i32) -> Option<&mut Camera> {
        self.cameras.iter_mut().find(|c| c.id == id)
    }

    pub fn light(&self, id: i32) -> Option<&Light> {
        self.lights.iter().find(|l| l.id == id)
    }

    pub fn light_mut(&mut self, id: i32) -> Option<&mut Light> {
        self.lights.iter_mut().find(|l| l.id == id)
    }

    /// Library material with the given id.
    pub fn material(&self, id: &str) -> Option<&MaterialDefinition> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Material an object is drawn with, following `material_id` into the
    /// library. `None` if the union is unset or the id is unknown.
    pub fn resolve_material<'a>(&'a self, object: &'a SceneObject) -> Option<&'a Material> {
        match object.object_material().ok()? {
            ObjectMaterial::Material(material) => Some(material),
            ObjectMaterial::MaterialId(id) => self.material(id).map(|m| &m.material),
        }
    }

    /// Camera selected by the render options, falling back to the first camera.
    pub fn active_camera(&self) -> Option<&Camera> {
        self.render_options
            .and_then(|options| self.camera(options.camera_id))
            .or_else(|| self.cameras.first())
    }

    /// Fail with the first unset union in the scene, with an indexed path
    /// such as `scene_objects[2].material`.
    pub fn ensure_complete(&self) -> Result<(), UnsetFieldAccess> {
        for (i, object) in self.scene_objects.iter().enumerate() {
            object
                .ensure_complete()
                .map_err(|e| e.within(format!("scene_objects[{}]", i)))?;
        }
        for (i, camera) in self.cameras.iter().enumerate() {
            camera
                .ensure_complete()
                .map_err(|e| e.within(format!("cameras[{}]", i)))?;
        }
        for (i, light) in self.lights.iter().enumerate() {
            light
                .ensure_complete()
                .map_err(|e| e.within(format!("lights[{}]", i)))?;
        }
        Ok(())
    }

    /// Check ids and cross references.
    ///
    /// Not run by the codecs: any constructible scene encodes and decodes,
    /// this is an opt-in check for producers and consumers.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ensure_complete()?;

        let mut object_ids = HashSet::new();
        for object in &self.scene_objects {
            if !object_ids.insert(object.id) {
                return Err(ValidationError::DuplicateObjectId(object.id));
            }
        }

        let mut camera_ids = HashSet::new();
        for camera in &self.cameras {
            if !camera_ids.insert(camera.id) {
                return Err(ValidationError::DuplicateCameraId(camera.id));
            }
        }

        let mut light_ids = HashSet::new();
        for light in &self.lights {
            if !light_ids.insert(light.id) {
                return Err(ValidationError::DuplicateLightId(light.id));
            }
        }

        let mut material_ids = HashSet::new();
        for material in &self.materials {
            if !material_ids.insert(material.id.as_str()) {
                return Err(ValidationError::DuplicateMaterialId(material.id.clone()));
            }
        }

        let known_parent = |transform: &Transform| {
            !transform.has_parent()
                || object_ids.contains(&transform.parent_id)
                || camera_ids.contains(&transform.parent_id)
                || light_ids.contains(&transform.parent_id)
        };

        for object in &self.scene_objects {
            if !known_parent(&object.transform) {
                return Err(ValidationError::UnknownParent {
                    owner: format!("scene object {}", object.id),
                    parent_id: object.transform.parent_id,
                });
            }
            if let Ok(material_id) = object.material_id() {
                if !material_ids.contains(material_id) {
                    return Err(ValidationError::UnknownMaterial {
                        object_id: object.id,
                        material_id: material_id.to_string(),
                    });
                }
            }
        }
        for camera in &self.cameras {
            if !known_parent(&camera.transform) {
                return Err(ValidationError::UnknownParent {
                    owner: format!("camera {}", camera.id),
                    parent_id: camera.transform.parent_id,
                });
            }
        }
        for light in &self.lights {
            if !known_parent(&light.transform) {
                return Err(ValidationError::UnknownParent {
                    owner: format!("light {}", light.id),
                    parent_id: light.transform.parent_id,
                });
            }
        }

        if let Some(options) = &self.render_options {
            if !camera_ids.contains(&options.camera_id) {
                return Err(ValidationError::UnknownRenderCamera(options.camera_id));
            }
        }

        Ok(())
    }
}
