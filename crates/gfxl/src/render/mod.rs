//! GPU resource handles.
//!
//! Every handle keeps a clone of the [`Gfx`](crate::device::Gfx) that created
//! it, owns its driver objects exclusively and releases them on drop.
//!
//! Bindings are global driver state: a handle's `bind` lasts until the next
//! bind of the same slot, and uploads leave their targets unbound.

mod camera;
mod cubemap;
pub mod image;
mod mesh;
mod shader;
mod sprite;
mod texture;

pub use camera::{CAMERA_BINDING, Camera, CameraUniform};
pub use cubemap::Cubemap;
pub use mesh::Mesh;
pub use shader::{Shader, UniformValue};
pub use sprite::{SpriteAtlas, UvRect};
pub use texture::Texture2D;

/// Image files written on demand for tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;

    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gfxl-fixtures-{}", std::process::id()));
        let _ = std::fs::create_dir_all(&dir);
        dir.join(format!("{name}.png"))
    }

    pub fn rgba_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = path(name);
        RgbaImage::from_pixel(width, height, Rgba([200, 40, 90, 255]))
            .save(&path)
            .unwrap();
        path
    }

    pub fn rgb_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = path(name);
        RgbImage::from_pixel(width, height, Rgb([20, 60, 160]))
            .save(&path)
            .unwrap();
        path
    }
}
