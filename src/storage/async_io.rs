//! Async scene file I/O on tokio
//!
//! Same encodings and error mapping as the synchronous facade. Saves run the
//! synchronous atomic write on the blocking pool, so each save gets its own
//! temp file and concurrent saves to one target never share it.

use std::io;
use std::path::Path;

use log::info;

use crate::core::types::Result;
use crate::scene::Scene;

use super::disk_io::{SceneFormatIO, SceneIO};

async fn write_atomic(io: &SceneFormatIO, path: &Path, bytes: Vec<u8>) -> Result<()> {
    let scene_io = io.clone();
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || scene_io.write_atomic(&path, &bytes))
        .await
        .map_err(io::Error::other)?
}

/// Save `scene` to `path` in the binary encoding.
pub async fn save_async(io: &SceneFormatIO, scene: &Scene, path: &Path) -> Result<()> {
    let bytes = io.encode(scene)?;
    let len = bytes.len();
    write_atomic(io, path, bytes).await?;
    info!("Saved binary scene to {:?} ({} bytes)", path, len);
    Ok(())
}

/// Save `scene` to `path` in the JSON encoding.
pub async fn save_as_json_async(io: &SceneFormatIO, scene: &Scene, path: &Path) -> Result<()> {
    let text = io.encode_as_json(scene)?;
    let len = text.len();
    write_atomic(io, path, text.into_bytes()).await?;
    info!("Saved JSON scene to {:?} ({} bytes)", path, len);
    Ok(())
}

/// Read a scene file of either encoding.
pub async fn read_async(io: &SceneFormatIO, path: &Path) -> Result<Scene> {
    let data = tokio::fs::read(path).await?;
    let scene = io.decode(&data)?;
    info!(
        "Read scene from {:?}: {} objects, {} cameras, {} lights",
        path,
        scene.scene_objects.len(),
        scene.cameras.len(),
        scene.lights.len()
    );
    Ok(scene)
}
