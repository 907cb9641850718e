//! Scene persistence: the `SceneIO` facade over both codecs

pub mod disk_io;

#[cfg(feature = "async")]
pub mod async_io;

pub use disk_io::{read, save, save_as_json, SceneFormatIO, SceneIO, SceneIoConfig, SCENE_FILE_EXTENSION};

#[cfg(feature = "async")]
pub use async_io::{read_async, save_as_json_async, save_async};
