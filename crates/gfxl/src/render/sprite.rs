use std::path::Path;

use crate::device::{Gfx, SamplerDesc};
use crate::error::{GfxError, Result};
use crate::math::Vector2;

use super::Texture2D;

/// Normalized texture rectangle; `min` is the top-left corner of the tile in
/// image space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UvRect {
    pub min: Vector2,
    pub max: Vector2,
}

/// A texture cut into a regular grid of equally sized tiles.
///
/// Tiles are numbered row-major from the top-left. Partial tiles at the
/// right and bottom edges are not addressable.
pub struct SpriteAtlas {
    texture: Texture2D,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    rows: u32,
}

impl SpriteAtlas {
    pub fn new(gfx: &Gfx) -> Self {
        Self {
            texture: Texture2D::new(gfx),
            tile_width: 0,
            tile_height: 0,
            columns: 0,
            rows: 0,
        }
    }

    /// Loads the atlas image with nearest filtering and sets the tile size.
    ///
    /// Fails when not even one whole tile fits the image.
    pub fn load_from_image_file(
        &mut self,
        path: impl AsRef<Path>,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<()> {
        self.columns = 0;
        self.rows = 0;
        self.texture
            .load_with_sampler(path.as_ref(), SamplerDesc::NEAREST_CLAMP)?;

        let (width, height) = self.texture.size();
        let columns = width.checked_div(tile_width).unwrap_or(0);
        let rows = height.checked_div(tile_height).unwrap_or(0);

        if columns == 0 || rows == 0 {
            return Err(self.texture.gfx().fail(GfxError::EmptyAtlasTile {
                width: tile_width,
                height: tile_height,
                image_width: width,
                image_height: height,
            }));
        }

        self.tile_width = tile_width;
        self.tile_height = tile_height;
        self.columns = columns;
        self.rows = rows;
        Ok(())
    }

    /// Columns and rows of whole tiles.
    pub fn grid(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    /// UV rectangle of tile `index`, `None` past the last tile.
    pub fn tile_uv(&self, index: u32) -> Option<UvRect> {
        if index >= self.tile_count() {
            return None;
        }

        let (width, height) = self.texture.size();
        let column = index % self.columns;
        let row = index / self.columns;

        let min = Vector2::new(
            (column * self.tile_width) as f32 / width as f32,
            (row * self.tile_height) as f32 / height as f32,
        );
        let extent = Vector2::new(
            self.tile_width as f32 / width as f32,
            self.tile_height as f32 / height as f32,
        );

        Some(UvRect {
            min,
            max: min + extent,
        })
    }

    pub fn texture(&self) -> &Texture2D {
        &self.texture
    }

    pub fn bind(&self, unit: u32) {
        self.texture.bind(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Filter, HeadlessBackend};
    use crate::render::fixtures;
    use std::rc::Rc;

    fn setup() -> (Rc<HeadlessBackend>, Gfx) {
        let hb = Rc::new(HeadlessBackend::new());
        let gfx = Gfx::new(hb.clone());
        (hb, gfx)
    }

    #[test]
    fn grid_counts_whole_tiles() {
        let (_hb, gfx) = setup();
        let path = fixtures::rgba_png("atlas-grid", 70, 32);

        let mut atlas = SpriteAtlas::new(&gfx);
        atlas.load_from_image_file(&path, 16, 16).unwrap();

        assert_eq!(atlas.grid(), (4, 2));
        assert_eq!(atlas.tile_count(), 8);
        assert_eq!(atlas.tile_size(), (16, 16));
    }

    #[test]
    fn tile_uv_is_row_major_from_top_left() {
        let (_hb, gfx) = setup();
        let path = fixtures::rgba_png("atlas-uv", 64, 32);

        let mut atlas = SpriteAtlas::new(&gfx);
        atlas.load_from_image_file(&path, 16, 16).unwrap();

        let first = atlas.tile_uv(0).unwrap();
        assert_eq!(first.min, Vector2::new(0.0, 0.0));
        assert_eq!(first.max, Vector2::new(0.25, 0.5));

        let sixth = atlas.tile_uv(5).unwrap();
        assert_eq!(sixth.min, Vector2::new(0.25, 0.5));
        assert_eq!(sixth.max, Vector2::new(0.5, 1.0));

        assert_eq!(atlas.tile_uv(8), None);
    }

    #[test]
    fn atlas_uses_nearest_filtering() {
        let (hb, gfx) = setup();
        let path = fixtures::rgba_png("atlas-filter", 8, 8);

        let mut atlas = SpriteAtlas::new(&gfx);
        atlas.load_from_image_file(&path, 4, 4).unwrap();

        let state = hb.state();
        let id = atlas.texture().id().unwrap();
        let sampler = state.textures[&id].sampler.unwrap();
        assert_eq!(sampler.mag_filter, Filter::Nearest);
    }

    #[test]
    fn oversized_tile_is_rejected() {
        let (_hb, gfx) = setup();
        let path = fixtures::rgba_png("atlas-big", 8, 8);

        let mut atlas = SpriteAtlas::new(&gfx);
        let err = atlas.load_from_image_file(&path, 16, 4).unwrap_err();

        assert!(matches!(err, GfxError::EmptyAtlasTile { width: 16, .. }));
        assert_eq!(atlas.tile_count(), 0);
        assert_eq!(atlas.tile_uv(0), None);
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let (_hb, gfx) = setup();
        let path = fixtures::rgba_png("atlas-zero", 8, 8);

        let mut atlas = SpriteAtlas::new(&gfx);
        assert!(atlas.load_from_image_file(&path, 0, 8).is_err());
    }
}
