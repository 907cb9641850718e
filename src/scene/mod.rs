//! Scene schema: the in-memory value tree both codecs read and write

pub mod camera;
pub mod graph;
pub mod light;
pub mod material;
pub mod object;
pub mod transform;

pub use camera::{Camera, PerspectiveCamera, Projection, DEFAULT_FOV};
pub use graph::{RenderOptions, Scene, SCENE_VERSION};
pub use light::{DirectionalLight, EnvironmentLight, Light, LightKind, LightSphere, PointLight};
pub use material::{
    LambertReflectionMaterial, Material, MaterialDefinition, ObjectMaterial, SolidMaterial,
    SpecularReflectionMaterial, DEFAULT_ETA,
};
pub use object::{Cube, Disk, MeshedObject, ObjectKind, Plane, SceneObject, Sphere};
pub use transform::{Color, Transform, Vector3};
