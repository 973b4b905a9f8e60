use std::path::Path;

use crate::device::{
    Gfx, ImageTarget, PixelFormat, SamplerDesc, TextureId, TextureTarget,
};
use crate::error::{GfxError, Result};

use super::image::load_rgba;

/// A 2D RGBA texture with cached size.
pub struct Texture2D {
    gfx: Gfx,
    id: Option<TextureId>,
    width: u32,
    height: u32,
}

impl Texture2D {
    pub fn new(gfx: &Gfx) -> Self {
        Self {
            gfx: gfx.clone(),
            id: None,
            width: 0,
            height: 0,
        }
    }

    /// Decodes `path` to RGBA8 and uploads it with linear filtering, edge
    /// clamping and mipmaps.
    ///
    /// On decode failure the texture object is released and the texture is
    /// left empty.
    pub fn load_from_image_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load_with_sampler(path.as_ref(), SamplerDesc::LINEAR_CLAMP)
    }

    /// Uploads tightly packed RGBA8 `pixels` (row 0 first).
    pub fn upload_rgba(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
        self.upload(width, height, pixels, SamplerDesc::LINEAR_CLAMP)
    }

    pub(crate) fn load_with_sampler(&mut self, path: &Path, sampler: SamplerDesc) -> Result<()> {
        self.release();
        let id = self.create()?;

        let image = match load_rgba(path) {
            Ok(image) => image,
            Err(err) => {
                self.release();
                return Err(self.gfx.fail(err));
            }
        };

        log::debug!(
            "{}: {}x{} rgba texture {}",
            path.display(),
            image.width(),
            image.height(),
            id.get()
        );
        self.upload(image.width(), image.height(), image.as_raw(), sampler)
    }

    fn upload(&mut self, width: u32, height: u32, pixels: &[u8], sampler: SamplerDesc) -> Result<()> {
        let expected = width as usize * height as usize * PixelFormat::Rgba8.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(self.gfx.fail(GfxError::PixelData {
                expected,
                actual: pixels.len(),
            }));
        }

        let id = match self.id {
            Some(id) => id,
            None => self.create()?,
        };

        let backend = self.gfx.backend();
        backend.active_texture_unit(0);
        backend.bind_texture(TextureTarget::Texture2D, Some(id));
        backend.tex_image(ImageTarget::Texture2D, width, height, PixelFormat::Rgba8, pixels);
        backend.set_sampler(TextureTarget::Texture2D, sampler);
        backend.generate_mipmaps(TextureTarget::Texture2D);
        backend.bind_texture(TextureTarget::Texture2D, None);

        self.width = width;
        self.height = height;
        Ok(())
    }

    fn create(&mut self) -> Result<TextureId> {
        let id = self
            .gfx
            .backend()
            .create_texture()
            .map_err(|e| self.gfx.fail(GfxError::Backend(e)))?;
        self.id = Some(id);
        Ok(id)
    }

    /// Binds to texture `unit`. An empty texture unbinds the unit.
    pub fn bind(&self, unit: u32) {
        let backend = self.gfx.backend();
        backend.active_texture_unit(unit);
        backend.bind_texture(TextureTarget::Texture2D, self.id);
    }

    /// Width and height in pixels; zero until something was uploaded.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_loaded(&self) -> bool {
        self.id.is_some() && self.width > 0
    }

    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    pub(crate) fn gfx(&self) -> &Gfx {
        &self.gfx
    }

    fn release(&mut self) {
        self.width = 0;
        self.height = 0;
        if let Some(id) = self.id.take() {
            self.gfx.release(|backend| backend.delete_texture(id));
        }
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, Filter, HeadlessBackend, Wrap};
    use crate::render::fixtures;
    use std::rc::Rc;

    fn setup() -> (Rc<HeadlessBackend>, Gfx) {
        let hb = Rc::new(HeadlessBackend::new());
        let gfx = Gfx::new(hb.clone());
        (hb, gfx)
    }

    #[test]
    fn image_file_uploads_rgba_with_linear_clamp_and_mipmaps() {
        let (hb, gfx) = setup();
        let path = fixtures::rgba_png("texture-ok", 4, 2);

        let mut texture = Texture2D::new(&gfx);
        texture.load_from_image_file(&path).unwrap();

        assert_eq!(texture.size(), (4, 2));
        assert!(texture.is_loaded());

        let state = hb.state();
        let stored = &state.textures[&texture.id().unwrap()];
        let image = &stored.images[&ImageTarget::Texture2D];
        assert_eq!(image.format, PixelFormat::Rgba8);
        assert_eq!(image.pixels.len(), 4 * 2 * 4);
        assert!(stored.mipmapped);

        let sampler = stored.sampler.unwrap();
        assert_eq!(sampler.min_filter, Filter::Linear);
        assert_eq!(sampler.wrap, Wrap::ClampToEdge);
    }

    #[test]
    fn decode_failure_releases_texture() {
        let (hb, gfx) = setup();
        let errors = Rc::new(std::cell::Cell::new(0));
        let counter = errors.clone();
        gfx.set_error_callback(move |_| counter.set(counter.get() + 1));

        let mut texture = Texture2D::new(&gfx);
        let err = texture.load_from_image_file("missing/wall.png").unwrap_err();

        assert!(matches!(err, GfxError::Decode { .. }));
        assert!(!texture.is_loaded());
        assert_eq!(texture.id(), None);
        assert_eq!(errors.get(), 1);
        assert_eq!(hb.state().live_objects(), 0);
    }

    #[test]
    fn upload_rgba_checks_buffer_length() {
        let (hb, gfx) = setup();
        let mut texture = Texture2D::new(&gfx);

        let err = texture.upload_rgba(2, 2, &[255; 15]).unwrap_err();

        assert!(matches!(err, GfxError::PixelData { expected: 16, actual: 15 }));
        assert!(hb.calls().is_empty());
    }

    #[test]
    fn upload_rgba_reuses_texture_object() {
        let (hb, gfx) = setup();
        let mut texture = Texture2D::new(&gfx);

        texture.upload_rgba(1, 1, &[255, 0, 0, 255]).unwrap();
        let first = texture.id();
        texture.upload_rgba(2, 1, &[0; 8]).unwrap();

        assert_eq!(texture.id(), first);
        assert_eq!(texture.size(), (2, 1));
        assert_eq!(hb.state().textures.len(), 1);
    }

    #[test]
    fn bind_selects_unit() {
        let (hb, gfx) = setup();
        let mut texture = Texture2D::new(&gfx);
        texture.upload_rgba(1, 1, &[0; 4]).unwrap();
        hb.clear_calls();

        texture.bind(3);

        assert_eq!(
            hb.calls(),
            vec![
                Call::ActiveTextureUnit(3),
                Call::BindTexture(TextureTarget::Texture2D, texture.id()),
            ]
        );
        assert_eq!(
            hb.state().bound_textures.get(&(3, TextureTarget::Texture2D)).copied(),
            texture.id()
        );
    }

    #[test]
    fn upload_keeps_bindings_on_other_units() {
        let (hb, gfx) = setup();
        let mut a = Texture2D::new(&gfx);
        a.upload_rgba(1, 1, &[0; 4]).unwrap();
        a.bind(3);

        let mut b = Texture2D::new(&gfx);
        b.upload_rgba(2, 1, &[0; 8]).unwrap();

        assert_eq!(
            hb.state().bound_textures.get(&(3, TextureTarget::Texture2D)).copied(),
            a.id()
        );
        assert_eq!(hb.state().active_unit, 0);
    }

    #[test]
    fn drop_releases_texture() {
        let (hb, gfx) = setup();
        {
            let mut texture = Texture2D::new(&gfx);
            texture.upload_rgba(1, 1, &[0; 4]).unwrap();
        }
        assert!(hb.state().textures.is_empty());
    }
}
