//! JSON scene encoding
//!
//! Field names are snake_case and stable. Unions are written the way
//! hand-authored scene files expect them:
//!
//! ```json
//! {
//!   "id": 0,
//!   "transform": { "position": { "x": 1.0, "y": 1.0, "z": 1.0 } },
//!   "material": { "solid": {} },
//!   "meshed_object": { "reference": "cow.obj" }
//! }
//! ```
//!
//! A scene object carries either an inline `material`, an object holding
//! exactly one variant key, or a `material_id` naming an entry of the
//! top-level `materials` library. Object kinds, light kinds and camera
//! projections sit directly on their owner, and exactly one of their keys
//! must be present. `lights` and `materials` may be omitted and are not
//! written when empty.
//!
//! Documents carry no layout version. The scene `version` field is data: it
//! is written and read back as is, never checked, exactly as in the binary
//! body. Compatibility rests on field names, and unknown fields are dropped
//! with a warning.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{DecodeError, Error, UnsetFieldAccess};
use crate::core::types::Result;
use crate::scene::{
    Camera, Color, Light, LightKind, Material, MaterialDefinition, ObjectKind, ObjectMaterial,
    Projection, RenderOptions, Scene, SceneObject, Transform,
};

/// Whitespace layout of encoded documents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JsonStyle {
    /// Indented, one field per line
    #[default]
    Pretty,
    /// Single line, no insignificant whitespace
    Compact,
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const SCENE_FIELDS: &[&str] = &[
    "version",
    "render_options",
    "scene_objects",
    "cameras",
    "lights",
    "materials",
];
const RENDER_OPTIONS_FIELDS: &[&str] = &["camera_id", "width", "height"];
const OBJECT_FIELDS: &[&str] = &["id", "transform"];
const CAMERA_FIELDS: &[&str] = &["id", "transform"];
const LIGHT_FIELDS: &[&str] = &["id", "transform", "color"];
const TRANSFORM_FIELDS: &[&str] = &["parent_id", "position", "rotation", "scale"];

const OBJECT_MATERIAL_KEYS: &[&str] = &["material", "material_id"];
const OBJECT_KIND_KEYS: &[&str] = &["meshed_object", "sphere", "cube", "plane", "disk"];
const MATERIAL_KEYS: &[&str] = &["solid", "lambert_reflection", "specular_reflection"];
const PROJECTION_KEYS: &[&str] = &["perspective"];
const LIGHT_KIND_KEYS: &[&str] = &["point", "directional", "environment", "sphere"];

/// camelCase spellings emitted by other scene-format writers
const ALIASES: &[(&str, &str)] = &[
    ("sceneObjects", "scene_objects"),
    ("renderOptions", "render_options"),
    ("cameraId", "camera_id"),
    ("parentId", "parent_id"),
    ("materialId", "material_id"),
    ("meshedObject", "meshed_object"),
    ("lambertReflection", "lambert_reflection"),
    ("specularReflection", "specular_reflection"),
];

/// Fields of each variant payload, for unknown-key reporting.
fn payload_fields(variant: &str) -> &'static [&'static str] {
    match variant {
        "meshed_object" => &["reference"],
        "sphere" | "disk" => &["radius"],
        "cube" => &["size"],
        "lambert_reflection" => &["color"],
        "specular_reflection" => &["eta"],
        "perspective" => &["fov"],
        _ => &[],
    }
}

// --- document types ---

#[derive(Debug, Serialize, Deserialize)]
struct SceneDocument {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    render_options: Option<RenderOptions>,
    scene_objects: Vec<SceneObjectDocument>,
    cameras: Vec<CameraDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lights: Vec<LightDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    materials: Vec<MaterialDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SceneObjectDocument {
    id: i32,
    transform: Transform,
    #[serde(flatten)]
    material: ObjectMaterial,
    #[serde(flatten)]
    kind: ObjectKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct CameraDocument {
    id: i32,
    transform: Transform,
    #[serde(flatten)]
    projection: Projection,
}

#[derive(Debug, Serialize, Deserialize)]
struct LightDocument {
    id: i32,
    transform: Transform,
    #[serde(default)]
    color: Color,
    #[serde(flatten)]
    kind: LightKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct MaterialDocument {
    id: String,
    #[serde(flatten)]
    material: Material,
}

impl TryFrom<&SceneObject> for SceneObjectDocument {
    type Error = UnsetFieldAccess;

    fn try_from(object: &SceneObject) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: object.id,
            transform: object.transform,
            material: object.object_material()?.clone(),
            kind: object.kind()?.clone(),
        })
    }
}

impl TryFrom<&Camera> for CameraDocument {
    type Error = UnsetFieldAccess;

    fn try_from(camera: &Camera) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: camera.id,
            transform: camera.transform,
            projection: *camera.projection()?,
        })
    }
}

impl TryFrom<&Light> for LightDocument {
    type Error = UnsetFieldAccess;

    fn try_from(light: &Light) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: light.id,
            transform: light.transform,
            color: light.color,
            kind: *light.kind()?,
        })
    }
}

impl From<&MaterialDefinition> for MaterialDocument {
    fn from(definition: &MaterialDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            material: definition.material,
        }
    }
}

/// Convert each element, prefixing unset-field paths with `owner[i]`.
fn documents<'a, T: 'a, D>(
    items: &'a [T],
    owner: &str,
    convert: impl Fn(&'a T) -> std::result::Result<D, UnsetFieldAccess>,
) -> std::result::Result<Vec<D>, UnsetFieldAccess> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| convert(item).map_err(|e| e.within(format!("{}[{}]", owner, i))))
        .collect()
}

impl TryFrom<&Scene> for SceneDocument {
    type Error = UnsetFieldAccess;

    fn try_from(scene: &Scene) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            version: scene.version,
            render_options: scene.render_options,
            scene_objects: documents(&scene.scene_objects, "scene_objects", SceneObjectDocument::try_from)?,
            cameras: documents(&scene.cameras, "cameras", CameraDocument::try_from)?,
            lights: documents(&scene.lights, "lights", LightDocument::try_from)?,
            materials: scene.materials.iter().map(MaterialDocument::from).collect(),
        })
    }
}

impl From<SceneDocument> for Scene {
    fn from(document: SceneDocument) -> Self {
        Scene {
            version: document.version,
            render_options: document.render_options,
            scene_objects: document
                .scene_objects
                .into_iter()
                .map(|o| {
                    SceneObject::new(o.id)
                        .with_transform(o.transform)
                        .with_object_material(o.material)
                        .with_kind(o.kind)
                })
                .collect(),
            cameras: document
                .cameras
                .into_iter()
                .map(|c| {
                    Camera::new(c.id)
                        .with_transform(c.transform)
                        .with_projection(c.projection)
                })
                .collect(),
            lights: document
                .lights
                .into_iter()
                .map(|l| {
                    Light::new(l.id)
                        .with_transform(l.transform)
                        .with_color(l.color)
                        .with_kind(l.kind)
                })
                .collect(),
            materials: document
                .materials
                .into_iter()
                .map(|m| MaterialDefinition::new(m.id, m.material))
                .collect(),
        }
    }
}

// --- encoding ---

/// Serialize a scene to pretty-printed JSON.
pub fn encode_json(scene: &Scene) -> Result<String> {
    encode_json_with(scene, JsonStyle::Pretty)
}

/// Serialize a scene to JSON with the given layout.
///
/// Fails with `Error::UnsetField` for an unset union and `Error::Encode`
/// for NaN or infinite numbers, which JSON cannot represent.
pub fn encode_json_with(scene: &Scene, style: JsonStyle) -> Result<String> {
    let document = SceneDocument::try_from(scene)?;
    ensure_finite(&document)?;

    let text = match style {
        JsonStyle::Pretty => serde_json::to_string_pretty(&document),
        JsonStyle::Compact => serde_json::to_string(&document),
    }
    .map_err(|e| Error::Encode(e.to_string()))?;

    debug!(
        "Encoded JSON scene: {} objects, {} cameras, {} lights, {} materials, {} bytes",
        document.scene_objects.len(),
        document.cameras.len(),
        document.lights.len(),
        document.materials.len(),
        text.len()
    );
    Ok(text)
}

/// Path suffix of the first non-finite number in a material.
fn non_finite_material(material: &Material) -> Option<&'static str> {
    match material {
        Material::Solid(_) => None,
        Material::LambertReflection(lambert) => {
            (!lambert.color.is_finite()).then_some("lambert_reflection.color")
        }
        Material::SpecularReflection(specular) => {
            (!specular.eta.is_finite()).then_some("specular_reflection.eta")
        }
    }
}

fn ensure_finite(document: &SceneDocument) -> Result<()> {
    fn check(ok: bool, path: impl FnOnce() -> String) -> Result<()> {
        if ok {
            Ok(())
        } else {
            Err(Error::Encode(format!("{} is not a finite number", path())))
        }
    }

    for (i, object) in document.scene_objects.iter().enumerate() {
        check(object.transform.is_finite(), || format!("scene_objects[{}].transform", i))?;
        if let ObjectMaterial::Material(material) = &object.material {
            let field = non_finite_material(material);
            check(field.is_none(), || {
                format!("scene_objects[{}].material.{}", i, field.unwrap_or_default())
            })?;
        }
        let kind_ok = match &object.kind {
            ObjectKind::Sphere(sphere) => sphere.radius.is_finite(),
            ObjectKind::Disk(disk) => disk.radius.is_finite(),
            ObjectKind::Cube(cube) => cube.size.is_finite(),
            ObjectKind::MeshedObject(_) | ObjectKind::Plane(_) => true,
        };
        check(kind_ok, || format!("scene_objects[{}].{}", i, object.kind.name()))?;
    }

    for (i, camera) in document.cameras.iter().enumerate() {
        check(camera.transform.is_finite(), || format!("cameras[{}].transform", i))?;
        let Projection::Perspective(perspective) = &camera.projection;
        check(perspective.fov.is_finite(), || format!("cameras[{}].perspective.fov", i))?;
    }

    for (i, light) in document.lights.iter().enumerate() {
        check(light.transform.is_finite(), || format!("lights[{}].transform", i))?;
        check(light.color.is_finite(), || format!("lights[{}].color", i))?;
        if let LightKind::Sphere(sphere) = &light.kind {
            check(sphere.radius.is_finite(), || format!("lights[{}].sphere.radius", i))?;
        }
    }

    for (i, material) in document.materials.iter().enumerate() {
        let field = non_finite_material(&material.material);
        check(field.is_none(), || format!("materials[{}].{}", i, field.unwrap_or_default()))?;
    }

    Ok(())
}

// --- decoding ---

/// Parse a JSON scene from text.
pub fn decode_json(text: &str) -> std::result::Result<Scene, DecodeError> {
    decode_json_slice(text.as_bytes())
}

/// Parse a JSON scene from UTF-8 bytes. A leading byte-order mark is ignored.
pub fn decode_json_slice(data: &[u8]) -> std::result::Result<Scene, DecodeError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut value: Value = serde_json::from_slice(data).map_err(DecodeError::InvalidJson)?;

    prepare_scene(&mut value)?;

    let document: SceneDocument =
        serde_json::from_value(value).map_err(|e| DecodeError::mismatch(e.to_string()))?;

    debug!(
        "Decoded JSON scene: {} objects, {} cameras, {} lights, {} materials from {} bytes",
        document.scene_objects.len(),
        document.cameras.len(),
        document.lights.len(),
        document.materials.len(),
        data.len()
    );
    Ok(document.into())
}

/// Normalize key spellings and check union exclusivity before handing the
/// value to serde, which would otherwise pick the first variant key it meets.
fn prepare_scene(value: &mut Value) -> std::result::Result<(), DecodeError> {
    let root = as_object_mut(value, "$")?;
    normalize_keys(root, "$")?;
    warn_unknown(root, "$", &[SCENE_FIELDS]);

    if let Some(options) = root.get_mut("render_options").filter(|v| !v.is_null()) {
        let options = as_object_mut(options, "$.render_options")?;
        normalize_keys(options, "$.render_options")?;
        warn_unknown(options, "$.render_options", &[RENDER_OPTIONS_FIELDS]);
    }

    if let Some(Value::Array(objects)) = root.get_mut("scene_objects") {
        for (i, object) in objects.iter_mut().enumerate() {
            prepare_scene_object(object, &format!("$.scene_objects[{}]", i))?;
        }
    }

    if let Some(Value::Array(cameras)) = root.get_mut("cameras") {
        for (i, camera) in cameras.iter_mut().enumerate() {
            prepare_camera(camera, &format!("$.cameras[{}]", i))?;
        }
    }

    if let Some(Value::Array(lights)) = root.get_mut("lights") {
        for (i, light) in lights.iter_mut().enumerate() {
            prepare_light(light, &format!("$.lights[{}]", i))?;
        }
    }

    if let Some(Value::Array(materials)) = root.get_mut("materials") {
        for (i, material) in materials.iter_mut().enumerate() {
            prepare_material(material, &format!("$.materials[{}]", i), false)?;
        }
    }

    Ok(())
}

fn prepare_scene_object(value: &mut Value, path: &str) -> std::result::Result<(), DecodeError> {
    let object = as_object_mut(value, path)?;
    normalize_keys(object, path)?;
    warn_unknown(object, path, &[OBJECT_FIELDS, OBJECT_MATERIAL_KEYS, OBJECT_KIND_KEYS]);

    single_variant(object, OBJECT_MATERIAL_KEYS, path, "material")?;
    let kind = single_variant(object, OBJECT_KIND_KEYS, path, "object kind")?;
    prepare_payload(object, kind, path)?;

    if let Some(transform) = object.get_mut("transform") {
        prepare_transform(transform, &format!("{}.transform", path))?;
    }

    if let Some(material) = object.get_mut("material") {
        prepare_material(material, &format!("{}.material", path), true)?;
    }

    Ok(())
}

/// Check a material object: an optional `id` plus exactly one variant key.
/// Inline materials may carry an `id`, which is dropped.
fn prepare_material(value: &mut Value, path: &str, inline: bool) -> std::result::Result<(), DecodeError> {
    let material = as_object_mut(value, path)?;
    normalize_keys(material, path)?;

    if inline {
        if let Some(id) = material.remove("id") {
            debug!("Dropping id {} of inline material at {}", id, path);
        }
    }

    if let Some(unknown) = material
        .keys()
        .find(|k| k.as_str() != "id" && !MATERIAL_KEYS.contains(&k.as_str()))
    {
        return Err(DecodeError::mismatch(format!(
            "{}: unknown material variant \"{}\"",
            path, unknown
        )));
    }

    let variant = single_variant(material, MATERIAL_KEYS, path, "material")?;
    prepare_payload(material, variant, path)
}

fn prepare_camera(value: &mut Value, path: &str) -> std::result::Result<(), DecodeError> {
    let camera = as_object_mut(value, path)?;
    normalize_keys(camera, path)?;
    warn_unknown(camera, path, &[CAMERA_FIELDS, PROJECTION_KEYS]);

    let projection = single_variant(camera, PROJECTION_KEYS, path, "projection")?;
    prepare_payload(camera, projection, path)?;

    if let Some(transform) = camera.get_mut("transform") {
        prepare_transform(transform, &format!("{}.transform", path))?;
    }

    Ok(())
}

fn prepare_light(value: &mut Value, path: &str) -> std::result::Result<(), DecodeError> {
    let light = as_object_mut(value, path)?;
    normalize_keys(light, path)?;
    warn_unknown(light, path, &[LIGHT_FIELDS, LIGHT_KIND_KEYS]);

    let kind = single_variant(light, LIGHT_KIND_KEYS, path, "light kind")?;
    prepare_payload(light, kind, path)?;

    if let Some(transform) = light.get_mut("transform") {
        prepare_transform(transform, &format!("{}.transform", path))?;
    }

    Ok(())
}

fn prepare_transform(value: &mut Value, path: &str) -> std::result::Result<(), DecodeError> {
    let transform = as_object_mut(value, path)?;
    normalize_keys(transform, path)?;
    warn_unknown(transform, path, &[TRANSFORM_FIELDS]);
    Ok(())
}

fn prepare_payload(
    owner: &mut Map<String, Value>,
    variant: &'static str,
    path: &str,
) -> std::result::Result<(), DecodeError> {
    let path = format!("{}.{}", path, variant);
    if let Some(payload) = owner.get_mut(variant) {
        let payload = as_object_mut(payload, &path)?;
        warn_unknown(payload, &path, &[payload_fields(variant)]);
    }
    Ok(())
}

/// Exactly one of `keys` must be present in `map`; returns it.
fn single_variant(
    map: &Map<String, Value>,
    keys: &[&'static str],
    path: &str,
    union: &str,
) -> std::result::Result<&'static str, DecodeError> {
    let present: Vec<&'static str> = keys.iter().copied().filter(|k| map.contains_key(*k)).collect();
    match present.as_slice() {
        [one] => Ok(*one),
        [] => Err(DecodeError::mismatch(format!(
            "{}: no {} set, expected one of {}",
            path,
            union,
            keys.join(", ")
        ))),
        many => Err(DecodeError::mismatch(format!(
            "{}: {} is a union but {} variants are set ({})",
            path,
            union,
            many.len(),
            many.join(", ")
        ))),
    }
}

fn as_object_mut<'a>(
    value: &'a mut Value,
    path: &str,
) -> std::result::Result<&'a mut Map<String, Value>, DecodeError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::mismatch(format!(
            "{}: expected an object, found {}",
            path,
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn normalize_keys(map: &mut Map<String, Value>, path: &str) -> std::result::Result<(), DecodeError> {
    for (alias, canonical) in ALIASES {
        if let Some(value) = map.remove(*alias) {
            if map.contains_key(*canonical) {
                return Err(DecodeError::mismatch(format!(
                    "{}: both \"{}\" and \"{}\" are set",
                    path, alias, canonical
                )));
            }
            map.insert(canonical.to_string(), value);
        }
    }
    Ok(())
}

fn warn_unknown(map: &Map<String, Value>, path: &str, known: &[&[&str]]) {
    for key in map.keys() {
        if !known.iter().any(|fields| fields.contains(&key.as_str())) {
            warn!("Ignoring unknown field \"{}\" at {}", key, path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::binary;
    use crate::codec::testing::{cow_scene, generated_scene, lit_scene};
    use crate::scene::Vector3;
    use serde_json::json;

    fn mismatch(text: &str) -> String {
        match decode_json(text) {
            Err(DecodeError::SchemaMismatch(msg)) => msg,
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_cow_scene_document() {
        let text = encode_json_with(&cow_scene(), JsonStyle::Compact).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({
                "version": 1,
                "scene_objects": [{
                    "id": 0,
                    "transform": {
                        "parent_id": 0,
                        "position": { "x": 1.0, "y": 1.0, "z": 1.0 },
                        "rotation": { "x": 0.0, "y": 0.0, "z": 0.0 },
                        "scale": { "x": 1.0, "y": 1.0, "z": 1.0 }
                    },
                    "material": { "solid": {} },
                    "meshed_object": { "reference": "cow.obj" }
                }],
                "cameras": [{
                    "id": 0,
                    "transform": {
                        "parent_id": 0,
                        "position": { "x": 1.01, "y": 2.76, "z": 3.0 },
                        "rotation": { "x": 0.0, "y": 0.0, "z": 0.0 },
                        "scale": { "x": 1.0, "y": 1.0, "z": 1.0 }
                    },
                    "perspective": { "fov": 60.0 }
                }]
            })
        );
        assert!(text.starts_with("{\"version\":1,"));
        assert!(!text.contains("render_options"));
    }

    #[test]
    fn test_pretty_and_compact_agree() {
        let scene = cow_scene();
        let pretty = encode_json(&scene).unwrap();
        let compact = encode_json_with(&scene, JsonStyle::Compact).unwrap();
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
        assert_eq!(decode_json(&pretty).unwrap(), decode_json(&compact).unwrap());
    }

    #[test]
    fn test_roundtrip_generated_scenes() {
        for seed in 0..64 {
            let scene = generated_scene(seed);
            let text = encode_json(&scene).unwrap();
            assert_eq!(decode_json(&text).unwrap(), scene, "seed {}", seed);
        }
    }

    #[test]
    fn test_codecs_agree() {
        for seed in 0..32 {
            let scene = generated_scene(seed);
            let via_binary = binary::decode(&binary::encode(&scene).unwrap()).unwrap();
            let via_json = decode_json(&encode_json(&scene).unwrap()).unwrap();
            assert_eq!(via_binary, via_json, "seed {}", seed);
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        for seed in 0..16 {
            let scene = generated_scene(seed);
            assert_eq!(encode_json(&scene).unwrap(), encode_json(&scene.clone()).unwrap());
        }
    }

    #[test]
    fn test_hand_written_scene() {
        let text = r#"
        {
            "version": 1,
            "render_options": { "camera_id": 0, "width": 1000, "height": 1000 },
            "scene_objects": [
                {
                    "id": 0,
                    "transform": { "position": { "x": 1, "y": 1, "z": 1 } },
                    "material": { "solid": {} },
                    "meshed_object": { "reference": "cow.obj" }
                }
            ],
            "cameras": [
                {
                    "id": 0,
                    "transform": { "position": { "x": 1.01, "y": 2.76, "z": 3.0 } },
                    "perspective": { "fov": 60 }
                }
            ]
        }"#;

        let scene = decode_json(text).unwrap();
        assert_eq!(scene, cow_scene().with_render_options(RenderOptions {
            camera_id: 0,
            width: 1000,
            height: 1000,
        }));

        let transform = scene.cameras[0].transform;
        assert_eq!(transform.position.x, 1.01);
        assert_eq!(transform.rotation, Vector3::ZERO);
        assert_eq!(transform.scale, Vector3::ONE);
        assert_eq!(transform.parent_id, 0);
    }

    #[test]
    fn test_short_decimals_are_stable() {
        for literal in ["1.01", "2.76", "0.1", "123.456", "-0.000001", "99999.9", "3.14159"] {
            let text = format!(
                r#"{{"version":1,"scene_objects":[],"cameras":[{{"id":0,"transform":{{"position":{{"x":{0},"y":0,"z":0}}}},"perspective":{{"fov":{0}}}}}]}}"#,
                literal
            );
            let scene = decode_json(&text).unwrap();
            let expected: f64 = literal.parse().unwrap();
            assert_eq!(scene.cameras[0].transform.position.x, expected);

            let again = decode_json(&encode_json(&scene).unwrap()).unwrap();
            assert_eq!(again.cameras[0].perspective().unwrap().fov, expected);
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(decode_json("this is not json"), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(decode_json(r#"{"version": 1,}"#), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(decode_json(""), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(
            decode_json_slice(b"{\"version\": \xff}"),
            Err(DecodeError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_two_kind_keys_rejected() {
        let msg = mismatch(
            r#"{"version":1,"cameras":[],"scene_objects":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},
                "material":{"solid":{}},
                "meshed_object":{"reference":"cow.obj"},
                "sphere":{"radius":1}
            }]}"#,
        );
        assert!(msg.contains("$.scene_objects[0]"), "{}", msg);
        assert!(msg.contains("meshed_object, sphere"), "{}", msg);
    }

    #[test]
    fn test_two_material_keys_rejected() {
        let msg = mismatch(
            r#"{"version":1,"cameras":[],"scene_objects":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},
                "material":{"solid":{},"lambert_reflection":{"color":{"r":1,"g":1,"b":1}}},
                "plane":{}
            }]}"#,
        );
        assert!(msg.contains("$.scene_objects[0].material"), "{}", msg);
    }

    #[test]
    fn test_missing_variant_rejected() {
        let msg = mismatch(
            r#"{"version":1,"scene_objects":[],"cameras":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}}
            }]}"#,
        );
        assert!(msg.contains("no projection set"), "{}", msg);

        mismatch(
            r#"{"version":1,"cameras":[],"scene_objects":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},
                "material":{},"plane":{}
            }]}"#,
        );
    }

    #[test]
    fn test_unknown_material_variant_rejected() {
        let msg = mismatch(
            r#"{"version":1,"cameras":[],"scene_objects":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},
                "material":{"glass":{}},"plane":{}
            }]}"#,
        );
        assert!(msg.contains("glass"), "{}", msg);
    }

    #[test]
    fn test_type_mismatch_rejected() {
        mismatch(r#"{"version":"one","scene_objects":[],"cameras":[]}"#);
        mismatch(r#"{"version":1,"scene_objects":{},"cameras":[]}"#);
        mismatch(r#"[1, 2, 3]"#);
        mismatch(
            r#"{"version":1,"cameras":[],"scene_objects":[{
                "id":"zero","transform":{"position":{"x":0,"y":0,"z":0}},
                "material":{"solid":{}},"plane":{}
            }]}"#,
        );
        mismatch(
            r#"{"version":1,"cameras":[],"scene_objects":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},
                "material":{"solid":{}},"meshed_object":{"reference":7}
            }]}"#,
        );
        mismatch(
            r#"{"version":1,"cameras":[],"scene_objects":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},
                "material":"solid","plane":{}
            }]}"#,
        );
    }

    #[test]
    fn test_missing_required_field_rejected() {
        mismatch(r#"{"scene_objects":[],"cameras":[]}"#);
        mismatch(r#"{"version":1,"scene_objects":[]}"#);
        mismatch(
            r#"{"version":1,"scene_objects":[],"cameras":[{
                "id":0,"transform":{},"perspective":{"fov":60}
            }]}"#,
        );
        mismatch(
            r#"{"version":1,"scene_objects":[],"cameras":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},"perspective":{}
            }]}"#,
        );
    }

    #[test]
    fn test_camel_case_aliases() {
        let text = r#"{
            "version": 1,
            "renderOptions": { "cameraId": 3, "width": 64, "height": 32 },
            "sceneObjects": [{
                "id": 1,
                "transform": { "parentId": 3, "position": { "x": 0, "y": 0, "z": 0 } },
                "material": { "lambertReflection": { "color": { "r": 0.5, "g": 0.5, "b": 0.5 } } },
                "meshedObject": { "reference": "cow.obj" }
            }],
            "cameras": []
        }"#;
        let scene = decode_json(text).unwrap();
        assert_eq!(scene.render_options.unwrap().camera_id, 3);
        let object = &scene.scene_objects[0];
        assert_eq!(object.transform.parent_id, 3);
        assert_eq!(object.lambert_reflection().unwrap().color.r, 0.5);
        assert_eq!(object.meshed_object().unwrap().reference, "cow.obj");

        let msg = mismatch(r#"{"version":1,"scene_objects":[],"sceneObjects":[],"cameras":[]}"#);
        assert!(msg.contains("sceneObjects"), "{}", msg);
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let text = r#"{
            "version": 1,
            "fog": { "density": 0.1 },
            "scene_objects": [{
                "id": 4,
                "name": "cow",
                "transform": { "position": { "x": 0, "y": 0, "z": 0 } },
                "material": { "solid": {} },
                "sphere": { "radius": 2, "segments": 32 }
            }],
            "cameras": []
        }"#;
        let scene = decode_json(text).unwrap();
        assert_eq!(scene.scene_objects[0].sphere().unwrap().radius, 2.0);
        assert!(!encode_json(&scene).unwrap().contains("fog"));
    }

    #[test]
    fn test_bom_is_ignored() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(encode_json(&cow_scene()).unwrap().as_bytes());
        assert_eq!(decode_json_slice(&bytes).unwrap(), cow_scene());
    }

    #[test]
    fn test_unset_union_fails_encode() {
        let mut scene = cow_scene();
        scene.scene_objects[0].clear_kind();
        match encode_json(&scene) {
            Err(Error::UnsetField(unset)) => assert_eq!(unset.field, "scene_objects[0].kind"),
            other => panic!("expected UnsetField, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_fails_encode() {
        let mut scene = cow_scene();
        scene.cameras[0].perspective_mut().fov = f64::INFINITY;
        match encode_json(&scene) {
            Err(Error::Encode(msg)) => assert!(msg.contains("cameras[0].perspective.fov"), "{}", msg),
            other => panic!("expected Encode, got {:?}", other),
        }

        let mut scene = cow_scene();
        scene.scene_objects[0].transform.position.y = f64::NAN;
        assert!(matches!(encode_json(&scene), Err(Error::Encode(_))));
    }

    #[test]
    fn test_lights_and_material_library_roundtrip() {
        let scene = lit_scene();
        let text = encode_json(&scene).unwrap();
        assert_eq!(decode_json(&text).unwrap(), scene);

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["scene_objects"][1]["material_id"], json!("glass"));
        assert!(value["scene_objects"][1].get("material").is_none());
        assert_eq!(value["materials"][1], json!({ "id": "glass", "specular_reflection": { "eta": 1.33 } }));
        assert_eq!(value["lights"][0]["directional"], json!({}));
        assert_eq!(value["lights"][1]["sphere"], json!({ "radius": 0.25 }));

        let via_binary = binary::decode(&binary::encode(&scene).unwrap()).unwrap();
        assert_eq!(via_binary, decode_json(&text).unwrap());
    }

    #[test]
    fn test_camel_case_document_with_lights() {
        let text = r#"{
            "version": 1,
            "sceneObjects": [{
                "id": 0,
                "transform": { "position": { "x": 0, "y": 0, "z": 0 } },
                "materialId": "red",
                "sphere": { "radius": 1 }
            }, {
                "id": 1,
                "transform": { "parentId": 0, "position": { "x": 0, "y": 2, "z": 0 } },
                "material": { "id": "inline", "specularReflection": {} },
                "cube": { "size": 0.5 }
            }],
            "cameras": [],
            "lights": [{
                "id": 2,
                "transform": {
                    "position": { "x": 0, "y": 10, "z": 0 },
                    "rotation": { "x": -45, "y": 0, "z": 0 }
                },
                "directional": {}
            }, {
                "id": 3,
                "transform": { "position": { "x": 0, "y": 0, "z": 0 } },
                "color": { "r": 0.2, "g": 0.3, "b": 0.4 },
                "environment": {}
            }],
            "materials": [{
                "id": "red",
                "lambertReflection": { "color": { "r": 1, "g": 0, "b": 0 } }
            }]
        }"#;
        let scene = decode_json(text).unwrap();
        assert_eq!(scene.scene_objects[0].material_id().unwrap(), "red");
        assert_eq!(scene.scene_objects[1].specular_reflection().unwrap().eta, 1.5);
        assert_eq!(scene.lights.len(), 2);
        assert!(scene.lights[0].directional().is_ok());
        assert_eq!(scene.lights[0].color, Color::WHITE);
        assert_eq!(scene.lights[0].transform.rotation.x, -45.0);
        assert!(scene.lights[1].environment().is_ok());
        assert_eq!(scene.lights[1].color.b, 0.4);
        assert!(scene.validate().is_ok());

        let red = scene.resolve_material(&scene.scene_objects[0]).unwrap();
        assert!(matches!(red, Material::LambertReflection(l) if l.color.r == 1.0));

        let again = decode_json(&encode_json(&scene).unwrap()).unwrap();
        assert_eq!(again, scene);
        assert_eq!(again.lights.len(), 2);
    }

    #[test]
    fn test_material_and_material_id_rejected() {
        let msg = mismatch(
            r#"{"version":1,"cameras":[],"scene_objects":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},
                "material":{"solid":{}},"material_id":"red","plane":{}
            }]}"#,
        );
        assert!(msg.contains("material, material_id"), "{}", msg);

        let msg = mismatch(
            r#"{"version":1,"cameras":[],"scene_objects":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},"plane":{}
            }]}"#,
        );
        assert!(msg.contains("no material set"), "{}", msg);
    }

    #[test]
    fn test_light_union_checked() {
        let msg = mismatch(
            r#"{"version":1,"scene_objects":[],"cameras":[],"lights":[{
                "id":0,"transform":{"position":{"x":0,"y":0,"z":0}},"point":{},"sphere":{"radius":1}
            }]}"#,
        );
        assert!(msg.contains("$.lights[0]"), "{}", msg);
        assert!(msg.contains("point, sphere"), "{}", msg);

        let msg = mismatch(
            r#"{"version":1,"scene_objects":[],"cameras":[],"lights":[{"id":0,"transform":{"position":{"x":0,"y":0,"z":0}}}]}"#,
        );
        assert!(msg.contains("no light kind set"), "{}", msg);

        let msg = mismatch(
            r#"{"version":1,"scene_objects":[],"cameras":[],"materials":[{"id":"m"}]}"#,
        );
        assert!(msg.contains("$.materials[0]"), "{}", msg);
    }

    #[test]
    fn test_non_finite_light_and_material_fail_encode() {
        let mut scene = lit_scene();
        scene.lights[1].color.g = f64::NAN;
        match encode_json(&scene) {
            Err(Error::Encode(msg)) => assert!(msg.contains("lights[1].color"), "{}", msg),
            other => panic!("expected Encode, got {:?}", other),
        }

        let mut scene = lit_scene();
        scene.materials[1].material = Material::specular(f64::INFINITY);
        match encode_json(&scene) {
            Err(Error::Encode(msg)) => {
                assert!(msg.contains("materials[1].specular_reflection.eta"), "{}", msg)
            }
            other => panic!("expected Encode, got {:?}", other),
        }
    }

    #[test]
    fn test_scene_version_is_data() {
        let mut scene = cow_scene();
        scene.version = 999;
        let text = encode_json(&scene).unwrap();
        assert_eq!(decode_json(&text).unwrap().version, 999);
        assert_eq!(binary::decode(&binary::encode(&scene).unwrap()).unwrap().version, 999);

        let scene = decode_json(r#"{"version":0,"scene_objects":[],"cameras":[]}"#).unwrap();
        assert_eq!(scene.version, 0);
    }
}
