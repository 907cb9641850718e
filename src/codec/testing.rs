//! Scene fixtures shared by codec and storage tests

use crate::scene::{
    Camera, Color, Light, LightKind, LightSphere, Material, MaterialDefinition, MeshedObject,
    ObjectKind, RenderOptions, Scene, SceneObject, Transform, Vector3,
};

/// The cow scene: one solid meshed object and one perspective camera.
pub fn cow_scene() -> Scene {
    let mut scene = Scene::new();

    let mut object = SceneObject::new(0)
        .with_transform(Transform::from_position(Vector3::new(1.0, 1.0, 1.0)));
    object.set_solid();
    object.set_meshed_object(MeshedObject::new("cow.obj"));
    scene.add_object(object);

    let mut camera = Camera::new(0)
        .with_transform(Transform::from_position(Vector3::new(1.01, 2.76, 3.0)));
    camera.set_perspective(60.0);
    scene.add_camera(camera);

    scene
}

/// The cow scene plus a material library, an object using it by id, and
/// two lights.
pub fn lit_scene() -> Scene {
    let mut scene = cow_scene();
    scene.add_material(MaterialDefinition::new("red", Material::lambert(Color::new(1.0, 0.0, 0.0))));
    scene.add_material(MaterialDefinition::new("glass", Material::specular(1.33)));

    let mut ball = SceneObject::new(1)
        .with_transform(Transform::from_position(Vector3::new(-1.0, 0.5, 0.0)))
        .with_material_id("glass");
    ball.set_sphere(0.5);
    scene.add_object(ball);

    let mut sun = Light::new(2).with_transform(
        Transform::identity().with_rotation(Vector3::new(-45.0, 30.0, 0.0)),
    );
    sun.set_directional();
    scene.add_light(sun);

    let mut bulb = Light::new(3)
        .with_transform(Transform::from_position(Vector3::new(0.0, 4.0, 0.0)))
        .with_color(Color::new(1.0, 0.9, 0.8));
    bulb.set_sphere(0.25);
    scene.add_light(bulb);

    scene
}

/// Small linear congruential generator so generated scenes are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn id(&mut self) -> i32 {
        self.next() as i32 - (1 << 30)
    }

    /// Mix of human-entered decimals and arbitrary finite doubles.
    fn float(&mut self) -> f64 {
        match self.below(4) {
            0 => (self.below(2_000_001) as f64 - 1_000_000.0) / 1000.0,
            1 => self.below(100) as f64,
            2 => {
                let bits = (self.next() << 32) | self.next();
                let v = f64::from_bits(bits);
                if v.is_finite() { v } else { -0.0 }
            }
            _ => (self.below(1000) as f64) * 0.01,
        }
    }

    fn vec3(&mut self) -> Vector3 {
        Vector3::new(self.float(), self.float(), self.float())
    }

    fn material(&mut self) -> Material {
        match self.below(3) {
            0 => Material::solid(),
            1 => Material::lambert(Color::new(self.float(), self.float(), self.float())),
            _ => Material::specular(self.float()),
        }
    }

    fn transform(&mut self) -> Transform {
        Transform {
            parent_id: if self.below(3) == 0 { self.id() } else { 0 },
            position: self.vec3(),
            rotation: self.vec3(),
            scale: self.vec3(),
        }
    }
}

const REFERENCES: &[&str] = &["cow.obj", "", "meshes/teapot.obj", "ünïcødé/\"quoted\".obj", "C:\\models\\bunny.obj"];

/// Library ids; objects may reference ids missing from the library.
const MATERIAL_IDS: &[&str] = &["red", "glass", "mirror \"polished\""];

/// Deterministic pseudo-random scene covering every variant.
pub fn generated_scene(seed: u64) -> Scene {
    let mut rng = Lcg(seed.wrapping_add(0x9e37_79b9_7f4a_7c15));
    let mut scene = Scene {
        version: rng.below(4) as u32,
        ..Default::default()
    };

    if rng.below(2) == 0 {
        scene.render_options = Some(RenderOptions {
            camera_id: rng.id(),
            width: rng.next() as u32,
            height: rng.below(4096) as u32,
        });
    }

    for i in 0..rng.below(3) {
        let material = rng.material();
        scene.add_material(MaterialDefinition::new(MATERIAL_IDS[i as usize], material));
    }

    for _ in 0..rng.below(6) {
        let object = SceneObject::new(rng.id()).with_transform(rng.transform());
        let mut object = if rng.below(3) == 0 {
            object.with_material_id(MATERIAL_IDS[rng.below(MATERIAL_IDS.len() as u64) as usize])
        } else {
            object.with_material(rng.material())
        };
        match rng.below(5) {
            0 => object.set_meshed_object(MeshedObject::new(
                REFERENCES[rng.below(REFERENCES.len() as u64) as usize],
            )),
            1 => object.set_sphere(rng.float()),
            2 => object.set_cube(rng.vec3()),
            3 => object.set_kind(ObjectKind::Plane(Default::default())),
            _ => object.set_disk(rng.float()),
        }
        scene.add_object(object);
    }

    for _ in 0..rng.below(4) {
        let mut camera = Camera::new(rng.id()).with_transform(rng.transform());
        camera.set_perspective(rng.float());
        scene.add_camera(camera);
    }

    for _ in 0..rng.below(4) {
        let kind = match rng.below(4) {
            0 => LightKind::Point(Default::default()),
            1 => LightKind::Directional(Default::default()),
            2 => LightKind::Environment(Default::default()),
            _ => LightKind::Sphere(LightSphere { radius: rng.float() }),
        };
        let light = Light::new(rng.id())
            .with_transform(rng.transform())
            .with_color(Color::new(rng.float(), rng.float(), rng.float()))
            .with_kind(kind);
        scene.add_light(light);
    }

    scene
}
