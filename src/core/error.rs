//! Error types for scene encoding, decoding and storage

use thiserror::Error;

/// A union variant (or the union itself) was read while unset.
///
/// This is a programmer error: a `SceneObject` without a material, a
/// `Camera` without a projection, or asking for `meshed_object()` on an
/// object that holds a sphere. Encoders surface it instead of writing an
/// ambiguous "no variant" state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unset field access: {field}")]
pub struct UnsetFieldAccess {
    pub field: String,
}

impl UnsetFieldAccess {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }

    /// Prefix the field path with the owning location, e.g. `scene_objects[3]`.
    pub fn within(self, owner: impl AsRef<str>) -> Self {
        Self {
            field: format!("{}.{}", owner.as_ref(), self.field),
        }
    }
}

/// Malformed or incompatible input data
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Truncated input: needed {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("Unknown format version: {major}.{minor}")]
    UnknownVersion { major: u16, minor: u16 },

    #[error("Malformed variant: tag {tag} is not a known {union} variant")]
    MalformedVariant { union: &'static str, tag: u8 },

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Unrecognized format: input is neither a binary nor a JSON scene")]
    UnrecognizedFormat,
}

impl DecodeError {
    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }
}

/// Structural problems reported by `Scene::validate`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Duplicate scene object id: {0}")]
    DuplicateObjectId(i32),

    #[error("Duplicate camera id: {0}")]
    DuplicateCameraId(i32),

    #[error("Duplicate light id: {0}")]
    DuplicateLightId(i32),

    #[error("Duplicate material id: \"{0}\"")]
    DuplicateMaterialId(String),

    #[error("Scene object {object_id} references material \"{material_id}\" which is not in the material library")]
    UnknownMaterial { object_id: i32, material_id: String },

    #[error("{owner} references parent id {parent_id} which is not present on the scene")]
    UnknownParent { owner: String, parent_id: i32 },

    #[error("Render options reference camera id {0} which is not present on the scene")]
    UnknownRenderCamera(i32),

    #[error(transparent)]
    Incomplete(#[from] UnsetFieldAccess),
}

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    UnsetField(#[from] UnsetFieldAccess),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encode error: {0}")]
    Encode(String),
}

impl Error {
    /// The decode error carried by this error, if any.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Error::Decode(err) => Some(err),
            _ => None,
        }
    }
}
