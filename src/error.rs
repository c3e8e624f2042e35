//! Error types shared by the graphics facade and the model loader.
//!
//! Library code never terminates the process: every creation or binding
//! failure is returned to the caller, which decides whether startup aborts.

use std::path::PathBuf;

use crate::graphics::backend::ResourceId;

pub type Result<T, E = GraphicsError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("resource {0:?} does not exist or was already released")]
    UnknownResource(ResourceId),

    #[error("swap chain buffers are still referenced by {0} live resource(s)")]
    SwapChainBuffersInUse(usize),

    #[error("no swap chain has been created")]
    NoSwapChain,

    #[error("binding slot {slot} is not supported for {what}")]
    UnsupportedSlot { what: &'static str, slot: u32 },

    #[error("invalid input layout: {0}")]
    InvalidInputLayout(String),

    #[error("buffer {0:?} would be empty")]
    EmptyBuffer(String),

    #[error("buffer of {size} bytes cannot hold {needed} bytes")]
    BufferTooSmall { size: u64, needed: u64 },

    #[error("shader {path:?} failed to compile: {message}")]
    ShaderCompilation { path: PathBuf, message: String },

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image")]
    Image(#[from] image::ImageError),

    #[error("backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load OBJ file")]
    Obj(#[from] tobj::LoadError),

    #[error("failed to parse glTF file")]
    Gltf(#[from] gltf::Error),

    #[error("unsupported model format: {0:?}")]
    UnsupportedFormat(String),

    #[error("malformed geometry in mesh {mesh:?}: {reason}")]
    MalformedGeometry { mesh: String, reason: String },
}
