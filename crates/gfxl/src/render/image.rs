//! Image decoding.

use std::path::Path;

use image::{RgbImage, RgbaImage};

use crate::error::{GfxError, Result};

fn open(path: &Path) -> Result<image::DynamicImage> {
    image::open(path).map_err(|source| GfxError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes any supported format to 8-bit RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    Ok(open(path)?.into_rgba8())
}

/// Decodes any supported format to 8-bit RGB; alpha is dropped.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    Ok(open(path)?.into_rgb8())
}
