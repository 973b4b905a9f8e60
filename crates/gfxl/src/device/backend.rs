use super::types::{
    BufferId, BufferTarget, BufferUsage, Capability, ImageTarget, PixelFormat, Primitive,
    ProgramId, SamplerDesc, ShaderId, ShaderStage, TextureId, TextureTarget, Uniform, UniformSlot,
    VertexArrayId, VertexAttribute,
};

/// Driver operations used by the resource handles.
///
/// This is the seam between gfxl and the graphics API. Every method maps to one
/// (or a fixed handful of) driver calls; none of them validates its arguments
/// beyond what the driver does. Implementations are single-threaded and take
/// `&self`; state lives in the driver or behind interior mutability.
///
/// Operations that target "the bound object" (buffer data, texture images,
/// uniforms) act on whatever was bound last through this backend.
pub trait Backend {
    /// Short name used in logs.
    fn name(&self) -> &str;

    // ── shaders ───────────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String>;

    /// Submits `source` and compiles it. Returns the compile status.
    fn compile_shader(&self, shader: ShaderId, source: &str) -> bool;

    fn shader_info_log(&self, shader: ShaderId) -> String;

    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> Result<ProgramId, String>;

    fn attach_shader(&self, program: ProgramId, shader: ShaderId);

    /// Links `program`. Returns the link status.
    fn link_program(&self, program: ProgramId) -> bool;

    fn program_info_log(&self, program: ProgramId) -> String;

    fn delete_program(&self, program: ProgramId);

    fn use_program(&self, program: Option<ProgramId>);

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformSlot>;

    /// Writes a uniform of the program in use. `None` is a silent no-op.
    fn set_uniform(&self, slot: Option<UniformSlot>, value: Uniform);

    // ── buffers / vertex arrays ───────────────────────────────────────────

    fn create_vertex_array(&self) -> Result<VertexArrayId, String>;

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>);

    fn delete_vertex_array(&self, vertex_array: VertexArrayId);

    fn create_buffer(&self) -> Result<BufferId, String>;

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);

    /// Replaces the storage of the buffer bound to `target` with `data`.
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    /// Allocates `size` bytes of uninitialized storage for the bound buffer.
    fn buffer_storage(&self, target: BufferTarget, size: usize, usage: BufferUsage);

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]);

    /// Binds a byte range of `buffer` to an indexed binding point.
    fn bind_buffer_range(
        &self,
        target: BufferTarget,
        binding: u32,
        buffer: BufferId,
        offset: usize,
        size: usize,
    );

    fn delete_buffer(&self, buffer: BufferId);

    /// Describes and enables one attribute of the bound vertex array.
    fn vertex_attribute(&self, attribute: VertexAttribute);

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<TextureId, String>;

    fn active_texture_unit(&self, unit: u32);

    fn bind_texture(&self, target: TextureTarget, texture: Option<TextureId>);

    fn tex_image(
        &self,
        target: ImageTarget,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    );

    fn set_sampler(&self, target: TextureTarget, sampler: SamplerDesc);

    fn generate_mipmaps(&self, target: TextureTarget);

    fn delete_texture(&self, texture: TextureId);

    // ── frame ─────────────────────────────────────────────────────────────

    fn draw_arrays(&self, primitive: Primitive, first: u32, count: u32);

    /// Draws `count` `u32` indices from the bound index buffer.
    fn draw_elements(&self, primitive: Primitive, count: u32);

    /// Clears color, depth and stencil.
    fn clear(&self, color: [f32; 4]);

    fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32);

    fn set_capability(&self, capability: Capability, enabled: bool);

    fn set_depth_write(&self, enabled: bool);
}
