use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::device::{
    BufferId, BufferTarget, BufferUsage, Gfx, Primitive, VertexArrayId,
};
use crate::error::{GfxError, Result};
use crate::model::{parse_obj, Vertex};

/// GPU geometry: a vertex array, an interleaved vertex buffer and an optional
/// index buffer.
///
/// A mesh starts empty. Drawing an empty mesh issues an empty draw.
pub struct Mesh {
    gfx: Gfx,
    vertex_array: Option<VertexArrayId>,
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
    vertex_count: u32,
    index_count: u32,
}

impl Mesh {
    pub fn new(gfx: &Gfx) -> Self {
        Self {
            gfx: gfx.clone(),
            vertex_array: None,
            vertex_buffer: None,
            index_buffer: None,
            vertex_count: 0,
            index_count: 0,
        }
    }

    /// Uploads `vertices` and, when non-empty, `indices`.
    ///
    /// Attribute layout follows [`Vertex::ATTRIBUTES`]. Objects from an earlier
    /// upload are released first.
    pub fn upload_data(&mut self, vertices: &[Vertex], indices: Option<&[u32]>) -> Result<()> {
        self.release();

        let backend = self.gfx.backend();
        let fail = |e: String| self.gfx.fail(GfxError::Backend(e));

        let vertex_array = backend.create_vertex_array().map_err(fail)?;
        self.vertex_array = Some(vertex_array);
        backend.bind_vertex_array(Some(vertex_array));

        let vertex_buffer = backend.create_buffer().map_err(fail)?;
        self.vertex_buffer = Some(vertex_buffer);
        backend.bind_buffer(BufferTarget::Vertex, Some(vertex_buffer));
        backend.buffer_data(
            BufferTarget::Vertex,
            bytemuck::cast_slice(vertices),
            BufferUsage::StaticDraw,
        );
        self.vertex_count = vertices.len() as u32;

        if let Some(indices) = indices.filter(|i| !i.is_empty()) {
            let index_buffer = backend.create_buffer().map_err(fail)?;
            self.index_buffer = Some(index_buffer);
            backend.bind_buffer(BufferTarget::Index, Some(index_buffer));
            backend.buffer_data(
                BufferTarget::Index,
                bytemuck::cast_slice(indices),
                BufferUsage::StaticDraw,
            );
            self.index_count = indices.len() as u32;
        }

        for attribute in Vertex::ATTRIBUTES {
            backend.vertex_attribute(attribute);
        }

        // VAO first: it captures the index buffer binding.
        backend.bind_vertex_array(None);
        backend.bind_buffer(BufferTarget::Vertex, None);

        Ok(())
    }

    /// Parses an OBJ file and uploads its expanded triangle list, unindexed.
    ///
    /// A file that cannot be opened leaves the mesh untouched.
    pub fn load_from_model_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_error = |source| GfxError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(|e| self.gfx.fail(io_error(e)))?;
        let model = parse_obj(BufReader::new(file)).map_err(|e| self.gfx.fail(io_error(e)))?;

        log::debug!(
            "{}: {} triangles, {} faces skipped",
            path.display(),
            model.triangle_count(),
            model.skipped_faces
        );

        self.upload_data(&model.vertices, None)
    }

    /// Draws the whole mesh, indexed when an index buffer exists.
    pub fn render(&self, primitive: Primitive) {
        let backend = self.gfx.backend();
        backend.bind_vertex_array(self.vertex_array);

        if self.index_buffer.is_some() && self.index_count > 0 {
            backend.draw_elements(primitive, self.index_count);
        } else {
            backend.draw_arrays(primitive, 0, self.vertex_count);
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_array.is_some()
    }

    fn release(&mut self) {
        let vertex_array = self.vertex_array.take();
        let buffers = [self.vertex_buffer.take(), self.index_buffer.take()];
        self.vertex_count = 0;
        self.index_count = 0;

        self.gfx.release(|backend| {
            if let Some(vertex_array) = vertex_array {
                backend.delete_vertex_array(vertex_array);
            }
            for buffer in buffers.into_iter().flatten() {
                backend.delete_buffer(buffer);
            }
        });
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        self.release();
    }
}
