//! Graphics device layer.
//!
//! This module is responsible for:
//! - the `Backend` seam over the driver (OpenGL through glow, or headless)
//! - typed driver object ids and the enums/descriptors passed to the backend
//! - the `Gfx` context shared by resource handles

mod backend;
mod context;
mod gl;
mod headless;
mod types;

pub use backend::Backend;
pub use context::Gfx;
pub use gl::GlBackend;
pub use headless::{
    Call, HeadlessBackend, HeadlessImage, HeadlessProgram, HeadlessShader, HeadlessState,
    HeadlessTexture, HEADLESS_COMPILE_ERROR_MARKER,
};
pub use types::{
    BufferId, BufferTarget, BufferUsage, Capability, CubeFace, Filter, ImageTarget, PixelFormat,
    Primitive, ProgramId, SamplerDesc, ShaderId, ShaderStage, TextureId, TextureTarget, Uniform,
    UniformSlot, VertexArrayId, VertexAttribute, Wrap,
};
