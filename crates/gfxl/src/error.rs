use std::path::PathBuf;

use thiserror::Error;

use crate::device::{CubeFace, ShaderStage};

pub type Result<T, E = GfxError> = std::result::Result<T, E>;

/// Errors surfaced by resource creation.
///
/// Failures are reported on the diagnostic channel of the owning
/// [`Gfx`](crate::device::Gfx) before they are returned.
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("graphics driver error: {0}")]
    Backend(String),

    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {log}")]
    Link { log: String },

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    PixelData { expected: usize, actual: usize },

    #[error("cubemap faces failed to load: {failed:?}")]
    CubemapFaces { failed: Vec<CubeFace> },

    #[error("sprite atlas tile size {width}x{height} does not fit a {image_width}x{image_height} image")]
    EmptyAtlasTile {
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
}
