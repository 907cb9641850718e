use criterion::{criterion_group, criterion_main, Criterion, black_box};

use cowscene::codec::{self, JsonStyle};
use cowscene::scene::{
    Camera, Color, Light, Material, MaterialDefinition, MeshedObject, RenderOptions, Scene, SceneObject,
    Transform, Vector3,
};

/// Scene with `count` objects cycling through every kind and material.
fn build_scene(count: i32) -> Scene {
    let mut scene = Scene::new().with_render_options(RenderOptions {
        camera_id: 0,
        width: 1920,
        height: 1080,
    });
    scene.add_material(MaterialDefinition::new("glass", Material::specular(1.5)));

    for id in 0..count {
        let f = id as f64;
        let mut object = SceneObject::new(id).with_transform(
            Transform::from_position(Vector3::new(f * 1.5, f * 0.25, -f))
                .with_rotation(Vector3::new(0.0, f * 7.0, 0.0)),
        );
        if id % 3 == 0 {
            object.set_solid();
        } else if id % 3 == 1 {
            object.set_material_id("glass");
        } else {
            object.set_lambert_reflection(Color::new(0.8, 0.2, f / count as f64));
        }
        match id % 5 {
            0 => object.set_meshed_object(MeshedObject::new(format!("meshes/cow_{}.obj", id))),
            1 => object.set_sphere(f * 0.1 + 1.0),
            2 => object.set_cube(Vector3::splat(2.0)),
            3 => object.set_plane(),
            _ => object.set_disk(3.0),
        }
        scene.add_object(object);
    }

    let mut camera = Camera::new(0).with_transform(Transform::from_position(Vector3::new(1.01, 2.76, 3.0)));
    camera.set_perspective(60.0);
    scene.add_camera(camera);

    let mut sun = Light::new(count).with_transform(Transform::identity().with_rotation(Vector3::new(-45.0, 0.0, 0.0)));
    sun.set_directional();
    scene.add_light(sun);

    scene
}

fn bench_binary_encode(c: &mut Criterion) {
    let scene = build_scene(1000);

    c.bench_function("binary_encode_1000", |b| {
        b.iter(|| codec::encode(black_box(&scene)))
    });
}

fn bench_binary_decode(c: &mut Criterion) {
    let bytes = codec::encode(&build_scene(1000)).unwrap();

    c.bench_function("binary_decode_1000", |b| {
        b.iter(|| codec::decode(black_box(&bytes)))
    });
}

fn bench_json_encode(c: &mut Criterion) {
    let scene = build_scene(1000);

    c.bench_function("json_encode_pretty_1000", |b| {
        b.iter(|| codec::encode_json_with(black_box(&scene), JsonStyle::Pretty))
    });

    c.bench_function("json_encode_compact_1000", |b| {
        b.iter(|| codec::encode_json_with(black_box(&scene), JsonStyle::Compact))
    });
}

fn bench_json_decode(c: &mut Criterion) {
    let text = codec::encode_json(&build_scene(1000)).unwrap();

    c.bench_function("json_decode_1000", |b| {
        b.iter(|| codec::decode_json(black_box(&text)))
    });
}

fn bench_detect(c: &mut Criterion) {
    let bytes = codec::encode(&build_scene(10)).unwrap();
    let text = codec::encode_json(&build_scene(10)).unwrap();

    c.bench_function("detect_encoding", |b| {
        b.iter(|| {
            codec::detect(black_box(&bytes));
            codec::detect(black_box(text.as_bytes()))
        })
    });
}

criterion_group!(
    benches,
    bench_binary_encode,
    bench_binary_decode,
    bench_json_encode,
    bench_json_decode,
    bench_detect,
);
criterion_main!(benches);
