use std::path::Path;

use crate::device::{
    CubeFace, Gfx, ImageTarget, PixelFormat, SamplerDesc, TextureId, TextureTarget,
};
use crate::error::{GfxError, Result};

use super::image::load_rgb;

/// Six-face RGB environment texture.
pub struct Cubemap {
    gfx: Gfx,
    id: Option<TextureId>,
}

impl Cubemap {
    pub fn new(gfx: &Gfx) -> Self {
        Self {
            gfx: gfx.clone(),
            id: None,
        }
    }

    /// Loads the six faces of a skybox.
    ///
    /// Face mapping: right +X, left -X, top +Y, bottom -Y, back +Z, front -Z.
    /// A face that fails to decode is reported and skipped; the others are
    /// still uploaded and mipmaps are generated once at the end. The returned
    /// error then lists every failed face.
    pub fn load_from_image_files(
        &mut self,
        front: impl AsRef<Path>,
        back: impl AsRef<Path>,
        left: impl AsRef<Path>,
        right: impl AsRef<Path>,
        top: impl AsRef<Path>,
        bottom: impl AsRef<Path>,
    ) -> Result<()> {
        let faces = [
            (CubeFace::NegativeZ, front.as_ref()),
            (CubeFace::PositiveZ, back.as_ref()),
            (CubeFace::NegativeX, left.as_ref()),
            (CubeFace::PositiveX, right.as_ref()),
            (CubeFace::PositiveY, top.as_ref()),
            (CubeFace::NegativeY, bottom.as_ref()),
        ];

        self.release();
        let id = self
            .gfx
            .backend()
            .create_texture()
            .map_err(|e| self.gfx.fail(GfxError::Backend(e)))?;
        self.id = Some(id);

        let backend = self.gfx.backend();
        backend.active_texture_unit(0);
        backend.bind_texture(TextureTarget::Cubemap, Some(id));

        let mut failed = Vec::new();
        for (face, path) in faces {
            match load_rgb(path) {
                Ok(image) => backend.tex_image(
                    ImageTarget::CubeFace(face),
                    image.width(),
                    image.height(),
                    PixelFormat::Rgb8,
                    image.as_raw(),
                ),
                Err(err) => {
                    self.gfx.fail(err);
                    failed.push(face);
                }
            }
        }

        backend.set_sampler(TextureTarget::Cubemap, SamplerDesc::LINEAR_CLAMP);
        backend.generate_mipmaps(TextureTarget::Cubemap);
        backend.bind_texture(TextureTarget::Cubemap, None);

        if failed.is_empty() {
            Ok(())
        } else {
            Err(GfxError::CubemapFaces { failed })
        }
    }

    pub fn bind(&self, unit: u32) {
        let backend = self.gfx.backend();
        backend.active_texture_unit(unit);
        backend.bind_texture(TextureTarget::Cubemap, self.id);
    }

    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.gfx.release(|backend| backend.delete_texture(id));
        }
    }
}

impl Drop for Cubemap {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, HeadlessBackend};
    use crate::render::fixtures;
    use std::path::PathBuf;
    use std::rc::Rc;

    fn setup() -> (Rc<HeadlessBackend>, Gfx) {
        let hb = Rc::new(HeadlessBackend::new());
        let gfx = Gfx::new(hb.clone());
        (hb, gfx)
    }

    /// front, back, left, right, top, bottom; each face a distinct width.
    fn faces(tag: &str) -> [PathBuf; 6] {
        std::array::from_fn(|i| fixtures::rgb_png(&format!("{tag}-{i}"), i as u32 + 1, 1))
    }

    fn load(cubemap: &mut Cubemap, f: &[PathBuf; 6]) -> Result<()> {
        cubemap.load_from_image_files(&f[0], &f[1], &f[2], &f[3], &f[4], &f[5])
    }

    #[test]
    fn faces_land_on_their_targets() {
        let (hb, gfx) = setup();
        let files = faces("cube-map");
        let mut cubemap = Cubemap::new(&gfx);

        load(&mut cubemap, &files).unwrap();

        let state = hb.state();
        let texture = &state.textures[&cubemap.id().unwrap()];
        let width = |face| texture.images[&ImageTarget::CubeFace(face)].width;
        assert_eq!(width(CubeFace::NegativeZ), 1);
        assert_eq!(width(CubeFace::PositiveZ), 2);
        assert_eq!(width(CubeFace::NegativeX), 3);
        assert_eq!(width(CubeFace::PositiveX), 4);
        assert_eq!(width(CubeFace::PositiveY), 5);
        assert_eq!(width(CubeFace::NegativeY), 6);
        assert!(
            texture
                .images
                .values()
                .all(|image| image.format == PixelFormat::Rgb8)
        );
        assert_eq!(texture.sampler, Some(SamplerDesc::LINEAR_CLAMP));
    }

    #[test]
    fn load_keeps_bindings_on_other_units() {
        let (hb, gfx) = setup();
        let mut sky = Cubemap::new(&gfx);
        load(&mut sky, &faces("cube-unit-a")).unwrap();
        sky.bind(3);

        let mut other = Cubemap::new(&gfx);
        load(&mut other, &faces("cube-unit-b")).unwrap();

        assert_eq!(
            hb.state().bound_textures.get(&(3, TextureTarget::Cubemap)).copied(),
            sky.id()
        );
    }

    #[test]
    fn one_bad_face_still_uploads_the_other_five() {
        let (hb, gfx) = setup();
        let mut files = faces("cube-bad");
        files[4] = PathBuf::from("missing/top.png");
        let mut cubemap = Cubemap::new(&gfx);

        let err = load(&mut cubemap, &files).unwrap_err();

        match err {
            GfxError::CubemapFaces { failed } => assert_eq!(failed, vec![CubeFace::PositiveY]),
            other => panic!("unexpected error: {other}"),
        }

        let calls = hb.calls();
        let uploads = calls
            .iter()
            .filter(|c| matches!(c, Call::TexImage { .. }))
            .count();
        let mipmaps = calls
            .iter()
            .filter(|c| matches!(c, Call::GenerateMipmaps(TextureTarget::Cubemap)))
            .count();
        assert_eq!(uploads, 5);
        assert_eq!(mipmaps, 1);
        assert!(cubemap.id().is_some());
    }

    #[test]
    fn each_failed_face_is_reported() {
        let (_hb, gfx) = setup();
        let reported = Rc::new(std::cell::Cell::new(0));
        let counter = reported.clone();
        gfx.set_error_callback(move |_| counter.set(counter.get() + 1));

        let mut cubemap = Cubemap::new(&gfx);
        let _ = cubemap.load_from_image_files("a", "b", "c", "d", "e", "f");

        assert_eq!(reported.get(), 6);
    }

    #[test]
    fn reload_replaces_texture() {
        let (hb, gfx) = setup();
        let files = faces("cube-reload");
        let mut cubemap = Cubemap::new(&gfx);

        load(&mut cubemap, &files).unwrap();
        load(&mut cubemap, &files).unwrap();

        assert_eq!(hb.state().textures.len(), 1);
    }
}
