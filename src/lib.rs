//! cowscene - Scene description interchange with binary and JSON encodings
//!
//! A [`Scene`] holds render options, scene objects and cameras. It can be
//! written as a compact binary file or as human-editable JSON, and read back
//! from either without saying which:
//!
//! ```no_run
//! use cowscene::scene::{Camera, MeshedObject, Scene, SceneObject, Transform, Vector3};
//!
//! let mut scene = Scene::new();
//!
//! let mut cow = SceneObject::new(0).with_transform(Transform::from_position(Vector3::splat(1.0)));
//! cow.set_solid();
//! cow.set_meshed_object(MeshedObject::new("cow.obj"));
//! scene.add_object(cow);
//!
//! let mut camera = Camera::new(0).with_transform(Transform::from_position(Vector3::new(1.01, 2.76, 3.0)));
//! camera.set_perspective(60.0);
//! scene.add_camera(camera);
//!
//! cowscene::save(&scene, "cow.cowscene")?;
//! cowscene::save_as_json(&scene, "cow.json")?;
//! assert_eq!(cowscene::read("cow.cowscene")?, cowscene::read("cow.json")?);
//! # Ok::<(), cowscene::Error>(())
//! ```

pub mod core;
pub mod scene;
pub mod codec;
pub mod storage;

pub use crate::core::{DecodeError, Error, Result, UnsetFieldAccess, ValidationError};
pub use codec::{decode, decode_json, encode, encode_json, Encoding, JsonStyle};
pub use scene::Scene;
pub use storage::{read, save, save_as_json, SceneFormatIO, SceneIO, SceneIoConfig, SCENE_FILE_EXTENSION};

#[cfg(feature = "async")]
pub use storage::{read_async, save_as_json_async, save_async};
