//! Compact binary scene encoding
//!
//! Layout (little-endian throughout):
//!
//! ```text
//! header   "COWS" | major u16 | minor u16
//! body     version u32
//!          render_options: present u8 (0 | 1) [record]
//!          scene_objects:  count u32, records
//!          cameras:        count u32, records
//!          lights:         count u32, records
//!          materials:      count u32, records
//! record   length u32 | payload
//! union    tag u8 | record
//! string   length u32 | UTF-8 bytes
//! vector3  x f64 | y f64 | z f64
//! ```
//!
//! Every structured value sits in a length-prefixed record, so a reader can
//! step over fields appended by a newer minor revision. Those bytes are
//! dropped, not preserved. Within the current minor any leftover byte is an
//! error.

use std::io::Write;

use log::debug;

use crate::core::error::{DecodeError, Error};
use crate::core::types::Result;
use crate::scene::{
    Camera, Color, Cube, DirectionalLight, Disk, EnvironmentLight, LambertReflectionMaterial, Light,
    LightKind, LightSphere, Material, MaterialDefinition, MeshedObject, ObjectKind, ObjectMaterial,
    PerspectiveCamera, Plane, PointLight, Projection, RenderOptions, Scene, SceneObject,
    SolidMaterial, SpecularReflectionMaterial, Sphere, Transform, Vector3,
};

/// Leading bytes of every binary scene
pub const MAGIC: &[u8; 4] = b"COWS";
/// Layout major revision; readers reject any other major
pub const FORMAT_MAJOR: u16 = 1;
/// Layout minor revision; newer minors only append fields
pub const FORMAT_MINOR: u16 = 0;

const HEADER_LEN: usize = 8;

const OBJECT_MATERIAL_INLINE: u8 = 1;
const OBJECT_MATERIAL_ID: u8 = 2;

const MATERIAL_SOLID: u8 = 1;
const MATERIAL_LAMBERT_REFLECTION: u8 = 2;
const MATERIAL_SPECULAR_REFLECTION: u8 = 3;

const KIND_MESHED_OBJECT: u8 = 1;
const KIND_SPHERE: u8 = 2;
const KIND_CUBE: u8 = 3;
const KIND_PLANE: u8 = 4;
const KIND_DISK: u8 = 5;

const PROJECTION_PERSPECTIVE: u8 = 1;

const LIGHT_POINT: u8 = 1;
const LIGHT_DIRECTIONAL: u8 = 2;
const LIGHT_ENVIRONMENT: u8 = 3;
const LIGHT_SPHERE: u8 = 4;

/// Serialize a scene to bytes.
///
/// Fails with `Error::UnsetField` if any object or camera has an unset union.
pub fn encode(scene: &Scene) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(
        HEADER_LEN
            + 24
            + scene.scene_objects.len() * 160
            + scene.cameras.len() * 120
            + scene.lights.len() * 140
            + scene.materials.len() * 48,
    );

    out.extend_from_slice(MAGIC);
    write_u16(&mut out, FORMAT_MAJOR);
    write_u16(&mut out, FORMAT_MINOR);
    write_u32(&mut out, scene.version);

    match &scene.render_options {
        Some(options) => {
            out.push(1);
            write_record(&mut out, |out| {
                write_render_options(out, options);
                Ok(())
            })?;
        }
        None => out.push(0),
    }

    write_u32(&mut out, count_u32(scene.scene_objects.len(), "scene_objects")?);
    for (i, object) in scene.scene_objects.iter().enumerate() {
        write_record(&mut out, |out| write_scene_object(out, object))
            .map_err(|e| scoped(e, format!("scene_objects[{}]", i)))?;
    }

    write_u32(&mut out, count_u32(scene.cameras.len(), "cameras")?);
    for (i, camera) in scene.cameras.iter().enumerate() {
        write_record(&mut out, |out| write_camera(out, camera))
            .map_err(|e| scoped(e, format!("cameras[{}]", i)))?;
    }

    write_u32(&mut out, count_u32(scene.lights.len(), "lights")?);
    for (i, light) in scene.lights.iter().enumerate() {
        write_record(&mut out, |out| write_light(out, light))
            .map_err(|e| scoped(e, format!("lights[{}]", i)))?;
    }

    write_u32(&mut out, count_u32(scene.materials.len(), "materials")?);
    for material in &scene.materials {
        write_record(&mut out, |out| write_material_definition(out, material))?;
    }

    debug!(
        "Encoded binary scene: {} objects, {} cameras, {} lights, {} materials, {} bytes",
        scene.scene_objects.len(),
        scene.cameras.len(),
        scene.lights.len(),
        scene.materials.len(),
        out.len()
    );
    Ok(out)
}

/// Serialize a scene into a writer.
///
/// The scene is encoded completely before the first byte is written, so an
/// unset union never leaves a partial scene in `writer`.
pub fn encode_to(scene: &Scene, writer: &mut impl Write) -> Result<()> {
    let bytes = encode(scene)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Parse a binary scene.
pub fn decode(data: &[u8]) -> std::result::Result<Scene, DecodeError> {
    if !data.starts_with(MAGIC) {
        if data.len() < MAGIC.len() && MAGIC.starts_with(data) {
            return Err(DecodeError::Truncated {
                offset: data.len(),
                needed: MAGIC.len() - data.len(),
            });
        }
        return Err(DecodeError::UnrecognizedFormat);
    }

    let mut reader = Reader::new(data);
    reader.take(MAGIC.len())?;
    let major = reader.u16()?;
    let minor = reader.u16()?;
    if major != FORMAT_MAJOR {
        return Err(DecodeError::UnknownVersion { major, minor });
    }
    if minor > FORMAT_MINOR {
        debug!(
            "Reading binary scene written by newer minor revision {}.{}; unknown fields will be dropped",
            major, minor
        );
    }

    let version = reader.u32()?;

    let render_options = match reader.u8()? {
        0 => None,
        1 => {
            let mut record = reader.record()?;
            let options = read_render_options(&mut record)?;
            record.finish("render_options", minor)?;
            Some(options)
        }
        other => {
            return Err(DecodeError::mismatch(format!(
                "render_options presence byte must be 0 or 1, got {}",
                other
            )))
        }
    };

    let count = reader.u32()? as usize;
    let mut scene_objects = Vec::with_capacity(count.min(reader.remaining() / 4));
    for _ in 0..count {
        let mut record = reader.record()?;
        let object = read_scene_object(&mut record, minor)?;
        record.finish("scene_object", minor)?;
        scene_objects.push(object);
    }

    let count = reader.u32()? as usize;
    let mut cameras = Vec::with_capacity(count.min(reader.remaining() / 4));
    for _ in 0..count {
        let mut record = reader.record()?;
        let camera = read_camera(&mut record, minor)?;
        record.finish("camera", minor)?;
        cameras.push(camera);
    }

    let count = reader.u32()? as usize;
    let mut lights = Vec::with_capacity(count.min(reader.remaining() / 4));
    for _ in 0..count {
        let mut record = reader.record()?;
        let light = read_light(&mut record, minor)?;
        record.finish("light", minor)?;
        lights.push(light);
    }

    let count = reader.u32()? as usize;
    let mut materials = Vec::with_capacity(count.min(reader.remaining() / 4));
    for _ in 0..count {
        let mut record = reader.record()?;
        let material = read_material_definition(&mut record, minor)?;
        record.finish("material definition", minor)?;
        materials.push(material);
    }

    reader.finish("scene", minor)?;

    debug!(
        "Decoded binary scene: {} objects, {} cameras, {} lights, {} materials from {} bytes",
        scene_objects.len(),
        cameras.len(),
        lights.len(),
        materials.len(),
        data.len()
    );

    Ok(Scene {
        version,
        render_options,
        scene_objects,
        cameras,
        lights,
        materials,
    })
}

fn scoped(err: Error, owner: String) -> Error {
    match err {
        Error::UnsetField(unset) => Error::UnsetField(unset.within(owner)),
        other => other,
    }
}

fn count_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::Encode(format!("too many {}: {}", what, len)))
}

// --- writers ---

fn write_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_f64(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_vec3(out: &mut Vec<u8>, v: Vector3) {
    write_f64(out, v.x);
    write_f64(out, v.y);
    write_f64(out, v.z);
}

fn write_color(out: &mut Vec<u8>, c: Color) {
    write_f64(out, c.r);
    write_f64(out, c.g);
    write_f64(out, c.b);
}

fn write_string(out: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = u32::try_from(s.len())
        .map_err(|_| Error::Encode(format!("string of {} bytes exceeds the format limit", s.len())))?;
    write_u32(out, len);
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Write a length-prefixed record whose payload is produced by `body`.
fn write_record(out: &mut Vec<u8>, body: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> Result<()> {
    let len_pos = out.len();
    out.extend_from_slice(&[0u8; 4]);
    body(out)?;
    let len = count_u32(out.len() - len_pos - 4, "record bytes")?;
    out[len_pos..len_pos + 4].copy_from_slice(&len.to_le_bytes());
    Ok(())
}

fn write_union(
    out: &mut Vec<u8>,
    tag: u8,
    body: impl FnOnce(&mut Vec<u8>) -> Result<()>,
) -> Result<()> {
    out.push(tag);
    write_record(out, body)
}

fn write_render_options(out: &mut Vec<u8>, options: &RenderOptions) {
    write_i32(out, options.camera_id);
    write_u32(out, options.width);
    write_u32(out, options.height);
}

fn write_transform(out: &mut Vec<u8>, transform: &Transform) -> Result<()> {
    write_record(out, |out| {
        write_i32(out, transform.parent_id);
        write_vec3(out, transform.position);
        write_vec3(out, transform.rotation);
        write_vec3(out, transform.scale);
        Ok(())
    })
}

fn write_material(out: &mut Vec<u8>, material: &Material) -> Result<()> {
    match material {
        Material::Solid(_) => write_union(out, MATERIAL_SOLID, |_| Ok(())),
        Material::LambertReflection(lambert) => write_union(out, MATERIAL_LAMBERT_REFLECTION, |out| {
            write_color(out, lambert.color);
            Ok(())
        }),
        Material::SpecularReflection(specular) => {
            write_union(out, MATERIAL_SPECULAR_REFLECTION, |out| {
                write_f64(out, specular.eta);
                Ok(())
            })
        }
    }
}

fn write_object_material(out: &mut Vec<u8>, material: &ObjectMaterial) -> Result<()> {
    match material {
        ObjectMaterial::Material(material) => {
            write_union(out, OBJECT_MATERIAL_INLINE, |out| write_material(out, material))
        }
        ObjectMaterial::MaterialId(id) => write_union(out, OBJECT_MATERIAL_ID, |out| write_string(out, id)),
    }
}

fn write_material_definition(out: &mut Vec<u8>, definition: &MaterialDefinition) -> Result<()> {
    write_string(out, &definition.id)?;
    write_material(out, &definition.material)
}

fn write_light_kind(out: &mut Vec<u8>, kind: &LightKind) -> Result<()> {
    match kind {
        LightKind::Point(_) => write_union(out, LIGHT_POINT, |_| Ok(())),
        LightKind::Directional(_) => write_union(out, LIGHT_DIRECTIONAL, |_| Ok(())),
        LightKind::Environment(_) => write_union(out, LIGHT_ENVIRONMENT, |_| Ok(())),
        LightKind::Sphere(sphere) => write_union(out, LIGHT_SPHERE, |out| {
            write_f64(out, sphere.radius);
            Ok(())
        }),
    }
}

fn write_light(out: &mut Vec<u8>, light: &Light) -> Result<()> {
    write_i32(out, light.id);
    write_transform(out, &light.transform)?;
    write_color(out, light.color);
    write_light_kind(out, light.kind()?)
}

fn write_kind(out: &mut Vec<u8>, kind: &ObjectKind) -> Result<()> {
    match kind {
        ObjectKind::MeshedObject(meshed) => {
            write_union(out, KIND_MESHED_OBJECT, |out| write_string(out, &meshed.reference))
        }
        ObjectKind::Sphere(sphere) => write_union(out, KIND_SPHERE, |out| {
            write_f64(out, sphere.radius);
            Ok(())
        }),
        ObjectKind::Cube(cube) => write_union(out, KIND_CUBE, |out| {
            write_vec3(out, cube.size);
            Ok(())
        }),
        ObjectKind::Plane(_) => write_union(out, KIND_PLANE, |_| Ok(())),
        ObjectKind::Disk(disk) => write_union(out, KIND_DISK, |out| {
            write_f64(out, disk.radius);
            Ok(())
        }),
    }
}

fn write_scene_object(out: &mut Vec<u8>, object: &SceneObject) -> Result<()> {
    write_i32(out, object.id);
    write_transform(out, &object.transform)?;
    write_object_material(out, object.object_material()?)?;
    write_kind(out, object.kind()?)
}

fn write_camera(out: &mut Vec<u8>, camera: &Camera) -> Result<()> {
    write_i32(out, camera.id);
    write_transform(out, &camera.transform)?;
    match camera.projection()? {
        Projection::Perspective(perspective) => write_union(out, PROJECTION_PERSPECTIVE, |out| {
            write_f64(out, perspective.fov);
            Ok(())
        }),
    }
}

// --- readers ---

/// Cursor over a byte slice. `base` is the absolute offset of `data[0]`
/// in the whole input, kept for error reporting.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> std::result::Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                offset: self.base + self.data.len(),
                needed: n - self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> std::result::Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u8(&mut self) -> std::result::Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> std::result::Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> std::result::Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i32(&mut self) -> std::result::Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn f64(&mut self) -> std::result::Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    fn vec3(&mut self) -> std::result::Result<Vector3, DecodeError> {
        Ok(Vector3::new(self.f64()?, self.f64()?, self.f64()?))
    }

    fn color(&mut self) -> std::result::Result<Color, DecodeError> {
        Ok(Color::new(self.f64()?, self.f64()?, self.f64()?))
    }

    fn string(&mut self, field: &str) -> std::result::Result<String, DecodeError> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DecodeError::mismatch(format!("{} is not valid UTF-8", field)))
    }

    /// Split off the next length-prefixed record as its own reader.
    fn record(&mut self) -> std::result::Result<Reader<'a>, DecodeError> {
        let len = self.u32()? as usize;
        let base = self.base + self.pos;
        let data = self.take(len)?;
        Ok(Reader { data, pos: 0, base })
    }

    /// Check that the record was fully consumed. Bytes left over from a
    /// newer minor revision are skipped.
    fn finish(self, what: &str, minor: u16) -> std::result::Result<(), DecodeError> {
        let left = self.remaining();
        if left == 0 {
            return Ok(());
        }
        if minor > FORMAT_MINOR {
            debug!(
                "Skipping {} unknown byte(s) at end of {} (offset {})",
                left,
                what,
                self.base + self.pos
            );
            return Ok(());
        }
        Err(DecodeError::mismatch(format!(
            "{} unexpected byte(s) at end of {} (offset {})",
            left,
            what,
            self.base + self.pos
        )))
    }
}

fn read_render_options(reader: &mut Reader) -> std::result::Result<RenderOptions, DecodeError> {
    Ok(RenderOptions {
        camera_id: reader.i32()?,
        width: reader.u32()?,
        height: reader.u32()?,
    })
}

fn read_transform(reader: &mut Reader, minor: u16) -> std::result::Result<Transform, DecodeError> {
    let mut record = reader.record()?;
    let transform = Transform {
        parent_id: record.i32()?,
        position: record.vec3()?,
        rotation: record.vec3()?,
        scale: record.vec3()?,
    };
    record.finish("transform", minor)?;
    Ok(transform)
}

fn read_material(reader: &mut Reader, minor: u16) -> std::result::Result<Material, DecodeError> {
    let tag = reader.u8()?;
    let material = match tag {
        MATERIAL_SOLID => {
            reader.record()?.finish("solid", minor)?;
            Material::Solid(SolidMaterial {})
        }
        MATERIAL_LAMBERT_REFLECTION => {
            let mut record = reader.record()?;
            let color = record.color()?;
            record.finish("lambert_reflection", minor)?;
            Material::LambertReflection(LambertReflectionMaterial { color })
        }
        MATERIAL_SPECULAR_REFLECTION => {
            let mut record = reader.record()?;
            let eta = record.f64()?;
            record.finish("specular_reflection", minor)?;
            Material::SpecularReflection(SpecularReflectionMaterial { eta })
        }
        _ => return Err(DecodeError::MalformedVariant { union: "material", tag }),
    };
    Ok(material)
}

fn read_object_material(reader: &mut Reader, minor: u16) -> std::result::Result<ObjectMaterial, DecodeError> {
    let tag = reader.u8()?;
    let material = match tag {
        OBJECT_MATERIAL_INLINE => {
            let mut record = reader.record()?;
            let material = read_material(&mut record, minor)?;
            record.finish("material", minor)?;
            ObjectMaterial::Material(material)
        }
        OBJECT_MATERIAL_ID => {
            let mut record = reader.record()?;
            let id = record.string("material_id")?;
            record.finish("material_id", minor)?;
            ObjectMaterial::MaterialId(id)
        }
        _ => return Err(DecodeError::MalformedVariant { union: "object material", tag }),
    };
    Ok(material)
}

fn read_material_definition(
    reader: &mut Reader,
    minor: u16,
) -> std::result::Result<MaterialDefinition, DecodeError> {
    let id = reader.string("materials.id")?;
    let material = read_material(reader, minor)?;
    Ok(MaterialDefinition { id, material })
}

fn read_light_kind(reader: &mut Reader, minor: u16) -> std::result::Result<LightKind, DecodeError> {
    let tag = reader.u8()?;
    if !matches!(tag, LIGHT_POINT | LIGHT_DIRECTIONAL | LIGHT_ENVIRONMENT | LIGHT_SPHERE) {
        return Err(DecodeError::MalformedVariant { union: "light kind", tag });
    }

    let mut record = reader.record()?;
    let kind = match tag {
        LIGHT_POINT => LightKind::Point(PointLight {}),
        LIGHT_DIRECTIONAL => LightKind::Directional(DirectionalLight {}),
        LIGHT_ENVIRONMENT => LightKind::Environment(EnvironmentLight {}),
        _ => LightKind::Sphere(LightSphere { radius: record.f64()? }),
    };
    record.finish(kind.name(), minor)?;
    Ok(kind)
}

fn read_light(reader: &mut Reader, minor: u16) -> std::result::Result<Light, DecodeError> {
    let id = reader.i32()?;
    let transform = read_transform(reader, minor)?;
    let color = reader.color()?;
    let kind = read_light_kind(reader, minor)?;
    Ok(Light::new(id)
        .with_transform(transform)
        .with_color(color)
        .with_kind(kind))
}

fn read_kind(reader: &mut Reader, minor: u16) -> std::result::Result<ObjectKind, DecodeError> {
    let tag = reader.u8()?;
    if !matches!(tag, KIND_MESHED_OBJECT | KIND_SPHERE | KIND_CUBE | KIND_PLANE | KIND_DISK) {
        return Err(DecodeError::MalformedVariant { union: "object kind", tag });
    }

    let mut record = reader.record()?;
    let kind = match tag {
        KIND_MESHED_OBJECT => ObjectKind::MeshedObject(MeshedObject {
            reference: record.string("meshed_object.reference")?,
        }),
        KIND_SPHERE => ObjectKind::Sphere(Sphere { radius: record.f64()? }),
        KIND_CUBE => ObjectKind::Cube(Cube { size: record.vec3()? }),
        KIND_PLANE => ObjectKind::Plane(Plane {}),
        _ => ObjectKind::Disk(Disk { radius: record.f64()? }),
    };
    record.finish(kind.name(), minor)?;
    Ok(kind)
}

fn read_projection(reader: &mut Reader, minor: u16) -> std::result::Result<Projection, DecodeError> {
    let tag = reader.u8()?;
    match tag {
        PROJECTION_PERSPECTIVE => {
            let mut record = reader.record()?;
            let fov = record.f64()?;
            record.finish("perspective", minor)?;
            Ok(Projection::Perspective(PerspectiveCamera { fov }))
        }
        _ => Err(DecodeError::MalformedVariant { union: "projection", tag }),
    }
}

fn read_scene_object(reader: &mut Reader, minor: u16) -> std::result::Result<SceneObject, DecodeError> {
    let id = reader.i32()?;
    let transform = read_transform(reader, minor)?;
    let material = read_object_material(reader, minor)?;
    let kind = read_kind(reader, minor)?;
    Ok(SceneObject::new(id)
        .with_transform(transform)
        .with_object_material(material)
        .with_kind(kind))
}

fn read_camera(reader: &mut Reader, minor: u16) -> std::result::Result<Camera, DecodeError> {
    let id = reader.i32()?;
    let transform = read_transform(reader, minor)?;
    let projection = read_projection(reader, minor)?;
    Ok(Camera::new(id).with_transform(transform).with_projection(projection))
}
