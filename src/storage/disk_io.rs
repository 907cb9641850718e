//! Synchronous scene file I/O
//!
//! Writes encode the whole scene in memory first, then land it through a
//! temp file in the target directory that is persisted over the target in a
//! single rename. Readers see either the previous file or the new one.
//!
//! A replaced file keeps its permissions. New files get the same mode as
//! `File::create` would give them, which is `0o666` less the umask on Unix.

use std::io::Write;
use std::path::Path;

use log::{debug, info};
use tempfile::Builder;

use crate::codec::{self, Encoding, JsonStyle};
use crate::core::error::DecodeError;
use crate::core::types::Result;
use crate::scene::Scene;

/// Conventional extension for scene files of either encoding
pub const SCENE_FILE_EXTENSION: &str = "cowscene";

/// Options for [`SceneFormatIO`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneIoConfig {
    /// Layout of documents written by `save_as_json`
    pub json_style: JsonStyle,
    /// Flush the temp file to stable storage before it replaces the target
    pub sync_on_save: bool,
}

impl SceneIoConfig {
    pub fn with_json_style(mut self, json_style: JsonStyle) -> Self {
        self.json_style = json_style;
        self
    }

    pub fn with_sync_on_save(mut self, sync_on_save: bool) -> Self {
        self.sync_on_save = sync_on_save;
        self
    }
}

/// Saving and loading scenes in either encoding.
pub trait SceneIO {
    /// Write `scene` to `path` in the binary encoding.
    fn save(&self, scene: &Scene, path: &Path) -> Result<()>;

    /// Write `scene` to `path` in the JSON encoding.
    fn save_as_json(&self, scene: &Scene, path: &Path) -> Result<()>;

    /// Load a scene from `path`, whichever encoding it was saved in.
    fn read(&self, path: &Path) -> Result<Scene>;

    fn encode(&self, scene: &Scene) -> Result<Vec<u8>>;

    fn encode_as_json(&self, scene: &Scene) -> Result<String>;

    /// Decode a buffer in either encoding.
    fn decode(&self, data: &[u8]) -> Result<Scene>;
}

/// [`SceneIO`] backed by the local filesystem
#[derive(Debug, Clone, Default)]
pub struct SceneFormatIO {
    config: SceneIoConfig,
}

impl SceneFormatIO {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SceneIoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SceneIoConfig {
        &self.config
    }

    pub(crate) fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = Builder::new();
        builder.prefix(".cowscene").suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }

        // Dropping the temp file on any error path removes it
        let mut file = builder.tempfile_in(dir)?;
        if let Ok(existing) = std::fs::metadata(path) {
            file.as_file().set_permissions(existing.permissions())?;
        }
        file.write_all(bytes)?;
        if self.config.sync_on_save {
            file.as_file().sync_all()?;
        }
        file.persist(path).map_err(|e| e.error)?;
        debug!("Replaced {:?} with {} bytes", path, bytes.len());
        Ok(())
    }
}

impl SceneIO for SceneFormatIO {
    fn save(&self, scene: &Scene, path: &Path) -> Result<()> {
        let bytes = self.encode(scene)?;
        self.write_atomic(path, &bytes)?;
        info!("Saved binary scene to {:?} ({} bytes)", path, bytes.len());
        Ok(())
    }

    fn save_as_json(&self, scene: &Scene, path: &Path) -> Result<()> {
        let text = self.encode_as_json(scene)?;
        self.write_atomic(path, text.as_bytes())?;
        info!("Saved JSON scene to {:?} ({} bytes)", path, text.len());
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Scene> {
        let data = std::fs::read(path)?;
        let scene = self.decode(&data)?;
        info!(
            "Read scene from {:?}: {} objects, {} cameras, {} lights",
            path,
            scene.scene_objects.len(),
            scene.cameras.len(),
            scene.lights.len()
        );
        Ok(scene)
    }

    fn encode(&self, scene: &Scene) -> Result<Vec<u8>> {
        codec::encode(scene)
    }

    fn encode_as_json(&self, scene: &Scene) -> Result<String> {
        codec::encode_json_with(scene, self.config.json_style)
    }

    fn decode(&self, data: &[u8]) -> Result<Scene> {
        let encoding = codec::detect(data).ok_or(DecodeError::UnrecognizedFormat)?;
        debug!("Detected {} scene encoding ({} bytes)", encoding.name(), data.len());
        let scene = match encoding {
            Encoding::Binary => codec::decode(data)?,
            Encoding::Json => codec::decode_json_slice(data)?,
        };
        Ok(scene)
    }
}

/// Save `scene` to `path` in the binary encoding with default options.
pub fn save(scene: &Scene, path: impl AsRef<Path>) -> Result<()> {
    SceneFormatIO::new().save(scene, path.as_ref())
}

/// Save `scene` to `path` as pretty-printed JSON.
pub fn save_as_json(scene: &Scene, path: impl AsRef<Path>) -> Result<()> {
    SceneFormatIO::new().save_as_json(scene, path.as_ref())
}

/// Read a scene file of either encoding.
pub fn read(path: impl AsRef<Path>) -> Result<Scene> {
    SceneFormatIO::new().read(path.as_ref())
}
