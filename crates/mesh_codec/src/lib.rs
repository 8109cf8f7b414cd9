//! Mesh container decode and export.
//!
//! Decodes downloaded model blobs into [`generation_structs::MeshAsset`]
//! values and exports assets back out for external tools. Supported inputs
//! are raw-geometry formats (OBJ, STL) and the GLB scenegraph container;
//! exports are OBJ and binary STL.

mod decode;
mod export;
mod glb;

use thiserror::Error;

pub use decode::{MAX_INPUT_BYTES, decode};
pub use export::{export_obj, export_stl};

/// Errors produced while decoding a model blob.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The filename hint carried an extension no decoder handles.
    #[error("unsupported model format '{0}'")]
    UnsupportedFormat(String),

    /// Input exceeds the accepted size limit.
    #[error("model file too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// The bytes do not parse as the indicated format.
    #[error("malformed {format} data: {detail}")]
    Malformed {
        format: &'static str,
        detail: String,
    },

    /// The container parsed but held no usable triangle geometry.
    #[error("model contains no triangle geometry")]
    MissingGeometry,

    /// The GLB JSON chunk failed to deserialize.
    #[error("invalid scene description: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    pub(crate) fn malformed(format: &'static str, detail: impl Into<String>) -> Self {
        Self::Malformed {
            format,
            detail: detail.into(),
        }
    }
}
