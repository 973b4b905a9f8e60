use glow::{HasContext, PixelUnpackData};

use super::backend::Backend;
use super::types::{
    BufferId, BufferTarget, BufferUsage, Capability, CubeFace, Filter, ImageTarget, PixelFormat,
    Primitive, ProgramId, SamplerDesc, ShaderId, ShaderStage, TextureId, TextureTarget, Uniform,
    UniformSlot, VertexArrayId, VertexAttribute, Wrap,
};

/// OpenGL backend over `glow`.
///
/// Every call assumes the context that produced `gl` is current on the calling
/// thread. The window shim guarantees this for the contexts it creates.
pub struct GlBackend {
    gl: glow::Context,
}

impl GlBackend {
    pub fn new(gl: glow::Context) -> Self {
        unsafe {
            // Tightly packed rows; RGB faces of odd width would otherwise skew.
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        }

        let backend = Self { gl };
        backend.log_driver_info();
        backend
    }

    /// Raw context, for callers that need GL state gfxl does not wrap.
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }

    fn log_driver_info(&self) {
        unsafe {
            let vendor = self.gl.get_parameter_string(glow::VENDOR);
            let renderer = self.gl.get_parameter_string(glow::RENDERER);
            let version = self.gl.get_parameter_string(glow::VERSION);
            log::info!("OpenGL {version} ({renderer}, {vendor})");
        }
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
    }
}

fn primitive_enum(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Points => glow::POINTS,
        Primitive::Lines => glow::LINES,
        Primitive::LineLoop => glow::LINE_LOOP,
        Primitive::LineStrip => glow::LINE_STRIP,
        Primitive::Triangles => glow::TRIANGLES,
        Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
        Primitive::TriangleFan => glow::TRIANGLE_FAN,
    }
}

fn buffer_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Vertex => glow::ARRAY_BUFFER,
        BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
        BufferTarget::Uniform => glow::UNIFORM_BUFFER,
    }
}

fn usage_enum(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
    }
}

fn texture_enum(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2D => glow::TEXTURE_2D,
        TextureTarget::Cubemap => glow::TEXTURE_CUBE_MAP,
    }
}

fn image_enum(target: ImageTarget) -> u32 {
    match target {
        ImageTarget::Texture2D => glow::TEXTURE_2D,
        ImageTarget::CubeFace(face) => match face {
            CubeFace::PositiveX => glow::TEXTURE_CUBE_MAP_POSITIVE_X,
            CubeFace::NegativeX => glow::TEXTURE_CUBE_MAP_NEGATIVE_X,
            CubeFace::PositiveY => glow::TEXTURE_CUBE_MAP_POSITIVE_Y,
            CubeFace::NegativeY => glow::TEXTURE_CUBE_MAP_NEGATIVE_Y,
            CubeFace::PositiveZ => glow::TEXTURE_CUBE_MAP_POSITIVE_Z,
            CubeFace::NegativeZ => glow::TEXTURE_CUBE_MAP_NEGATIVE_Z,
        },
    }
}

fn filter_enum(filter: Filter) -> i32 {
    (match filter {
        Filter::Nearest => glow::NEAREST,
        Filter::Linear => glow::LINEAR,
    }) as i32
}

fn wrap_enum(wrap: Wrap) -> i32 {
    (match wrap {
        Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        Wrap::Repeat => glow::REPEAT,
    }) as i32
}

#[inline]
fn shader(id: ShaderId) -> glow::Shader {
    glow::NativeShader(id.0)
}

#[inline]
fn program(id: ProgramId) -> glow::Program {
    glow::NativeProgram(id.0)
}

#[inline]
fn buffer(id: BufferId) -> glow::Buffer {
    glow::NativeBuffer(id.0)
}

#[inline]
fn vertex_array(id: VertexArrayId) -> glow::VertexArray {
    glow::NativeVertexArray(id.0)
}

#[inline]
fn texture(id: TextureId) -> glow::Texture {
    glow::NativeTexture(id.0)
}

impl Backend for GlBackend {
    fn name(&self) -> &str {
        "opengl"
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        unsafe { self.gl.create_shader(stage_enum(stage)).map(|s| ShaderId(s.0)) }
    }

    fn compile_shader(&self, id: ShaderId, source: &str) -> bool {
        unsafe {
            self.gl.shader_source(shader(id), source);
            self.gl.compile_shader(shader(id));
            self.gl.get_shader_compile_status(shader(id))
        }
    }

    fn shader_info_log(&self, id: ShaderId) -> String {
        unsafe { self.gl.get_shader_info_log(shader(id)) }
    }

    fn delete_shader(&self, id: ShaderId) {
        unsafe { self.gl.delete_shader(shader(id)) }
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        unsafe { self.gl.create_program().map(|p| ProgramId(p.0)) }
    }

    fn attach_shader(&self, p: ProgramId, s: ShaderId) {
        unsafe { self.gl.attach_shader(program(p), shader(s)) }
    }

    fn link_program(&self, p: ProgramId) -> bool {
        unsafe {
            self.gl.link_program(program(p));
            self.gl.get_program_link_status(program(p))
        }
    }

    fn program_info_log(&self, p: ProgramId) -> String {
        unsafe { self.gl.get_program_info_log(program(p)) }
    }

    fn delete_program(&self, p: ProgramId) {
        unsafe { self.gl.delete_program(program(p)) }
    }

    fn use_program(&self, p: Option<ProgramId>) {
        unsafe { self.gl.use_program(p.map(program)) }
    }

    fn uniform_location(&self, p: ProgramId, name: &str) -> Option<UniformSlot> {
        unsafe {
            self.gl
                .get_uniform_location(program(p), name)
                .map(|loc| UniformSlot(loc.0))
        }
    }

    fn set_uniform(&self, slot: Option<UniformSlot>, value: Uniform) {
        let Some(slot) = slot else { return };
        let loc = glow::NativeUniformLocation(slot.0);
        let loc = Some(&loc);

        unsafe {
            match value {
                Uniform::Float(v) => self.gl.uniform_1_f32(loc, v),
                Uniform::Int(v) => self.gl.uniform_1_i32(loc, v),
                Uniform::Vec2(v) => self.gl.uniform_2_f32_slice(loc, &v),
                Uniform::Vec3(v) => self.gl.uniform_3_f32_slice(loc, &v),
                Uniform::Vec4(v) => self.gl.uniform_4_f32_slice(loc, &v),
                Uniform::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(loc, false, &m),
            }
        }
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        unsafe { self.gl.create_vertex_array().map(|v| VertexArrayId(v.0)) }
    }

    fn bind_vertex_array(&self, id: Option<VertexArrayId>) {
        unsafe { self.gl.bind_vertex_array(id.map(vertex_array)) }
    }

    fn delete_vertex_array(&self, id: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(vertex_array(id)) }
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        unsafe { self.gl.create_buffer().map(|b| BufferId(b.0)) }
    }

    fn bind_buffer(&self, target: BufferTarget, id: Option<BufferId>) {
        unsafe { self.gl.bind_buffer(buffer_enum(target), id.map(buffer)) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_enum(target), data, usage_enum(usage))
        }
    }

    fn buffer_storage(&self, target: BufferTarget, size: usize, usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_size(buffer_enum(target), size as i32, usage_enum(usage))
        }
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_sub_data_u8_slice(buffer_enum(target), offset as i32, data)
        }
    }

    fn bind_buffer_range(
        &self,
        target: BufferTarget,
        binding: u32,
        id: BufferId,
        offset: usize,
        size: usize,
    ) {
        unsafe {
            self.gl.bind_buffer_range(
                buffer_enum(target),
                binding,
                Some(buffer(id)),
                offset as i32,
                size as i32,
            )
        }
    }

    fn delete_buffer(&self, id: BufferId) {
        unsafe { self.gl.delete_buffer(buffer(id)) }
    }

    fn vertex_attribute(&self, attr: VertexAttribute) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                attr.location,
                attr.components as i32,
                glow::FLOAT,
                false,
                attr.stride as i32,
                attr.offset as i32,
            );
            self.gl.enable_vertex_attrib_array(attr.location);
        }
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        unsafe { self.gl.create_texture().map(|t| TextureId(t.0)) }
    }

    fn active_texture_unit(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture(&self, target: TextureTarget, id: Option<TextureId>) {
        unsafe { self.gl.bind_texture(texture_enum(target), id.map(texture)) }
    }

    fn tex_image(
        &self,
        target: ImageTarget,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    ) {
        let format = match format {
            PixelFormat::Rgb8 => glow::RGB,
            PixelFormat::Rgba8 => glow::RGBA,
        };

        unsafe {
            self.gl.tex_image_2d(
                image_enum(target),
                0,
                format as i32,
                width as i32,
                height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn set_sampler(&self, target: TextureTarget, sampler: SamplerDesc) {
        let target = texture_enum(target);
        let wrap = wrap_enum(sampler.wrap);

        unsafe {
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, filter_enum(sampler.min_filter));
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, filter_enum(sampler.mag_filter));
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, wrap);
        }
    }

    fn generate_mipmaps(&self, target: TextureTarget) {
        unsafe { self.gl.generate_mipmap(texture_enum(target)) }
    }

    fn delete_texture(&self, id: TextureId) {
        unsafe { self.gl.delete_texture(texture(id)) }
    }

    fn draw_arrays(&self, primitive: Primitive, first: u32, count: u32) {
        unsafe {
            self.gl
                .draw_arrays(primitive_enum(primitive), first as i32, count as i32)
        }
    }

    fn draw_elements(&self, primitive: Primitive, count: u32) {
        unsafe {
            self.gl.draw_elements(
                primitive_enum(primitive),
                count as i32,
                glow::UNSIGNED_INT,
                0,
            )
        }
    }

    fn clear(&self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT | glow::STENCIL_BUFFER_BIT);
        }
    }

    fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.viewport(x, y, width as i32, height as i32) }
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        let cap = match capability {
            Capability::Blend => glow::BLEND,
            Capability::DepthTest => glow::DEPTH_TEST,
            Capability::CullFace => glow::CULL_FACE,
        };

        unsafe {
            if !enabled {
                self.gl.disable(cap);
                return;
            }

            match capability {
                Capability::Blend => {
                    self.gl
                        .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                }
                Capability::CullFace => {
                    self.gl.cull_face(glow::BACK);
                    self.gl.front_face(glow::CCW);
                }
                Capability::DepthTest => {}
            }
            self.gl.enable(cap);
        }
    }

    fn set_depth_write(&self, enabled: bool) {
        unsafe { self.gl.depth_mask(enabled) }
    }
}
