use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;

use super::backend::Backend;
use super::types::{
    BufferId, BufferTarget, BufferUsage, Capability, ImageTarget, PixelFormat, Primitive,
    ProgramId, SamplerDesc, ShaderId, ShaderStage, TextureId, TextureTarget, Uniform, UniformSlot,
    VertexArrayId, VertexAttribute,
};

/// Source marker that makes headless compilation fail.
pub const HEADLESS_COMPILE_ERROR_MARKER: &str = "#error";

/// A driver call observed by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderId, ShaderStage),
    CompileShader(ShaderId),
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    AttachShader(ProgramId, ShaderId),
    LinkProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    UniformLocation(ProgramId, String),
    SetUniform(UniformSlot, Uniform),
    CreateVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    DeleteVertexArray(VertexArrayId),
    CreateBuffer(BufferId),
    BindBuffer(BufferTarget, Option<BufferId>),
    BufferData(BufferTarget, usize),
    BufferSubData(BufferTarget, usize, usize),
    BindBufferRange { binding: u32, buffer: BufferId, offset: usize, size: usize },
    DeleteBuffer(BufferId),
    VertexAttribute(VertexAttribute),
    CreateTexture(TextureId),
    ActiveTextureUnit(u32),
    BindTexture(TextureTarget, Option<TextureId>),
    TexImage { target: ImageTarget, width: u32, height: u32, format: PixelFormat },
    SetSampler(TextureTarget, SamplerDesc),
    GenerateMipmaps(TextureTarget),
    DeleteTexture(TextureId),
    DrawArrays { primitive: Primitive, first: u32, count: u32 },
    DrawElements { primitive: Primitive, count: u32 },
    Clear([f32; 4]),
    Viewport(i32, i32, u32, u32),
    Capability(Capability, bool),
    DepthWrite(bool),
}

#[derive(Debug, Clone)]
pub struct HeadlessShader {
    pub stage: ShaderStage,
    pub compiled: bool,
    pub info_log: String,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessProgram {
    pub attached: Vec<ShaderId>,
    pub linked: bool,
    pub info_log: String,
}

/// One uploaded image level.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessTexture {
    pub target: Option<TextureTarget>,
    pub images: HashMap<ImageTarget, HeadlessImage>,
    pub sampler: Option<SamplerDesc>,
    pub mipmapped: bool,
}

/// Everything the headless driver knows about.
#[derive(Debug, Default)]
pub struct HeadlessState {
    next_id: u32,

    pub shaders: HashMap<ShaderId, HeadlessShader>,
    pub programs: HashMap<ProgramId, HeadlessProgram>,
    pub buffers: HashMap<BufferId, Vec<u8>>,
    pub vertex_arrays: HashSet<VertexArrayId>,
    pub textures: HashMap<TextureId, HeadlessTexture>,

    pub current_program: Option<ProgramId>,
    pub bound_vertex_array: Option<VertexArrayId>,
    pub bound_buffers: HashMap<BufferTarget, BufferId>,
    pub uniform_bindings: HashMap<u32, (BufferId, usize, usize)>,
    pub active_unit: u32,
    pub bound_textures: HashMap<(u32, TextureTarget), TextureId>,

    slots: HashMap<(ProgramId, String), UniformSlot>,
    /// Last value written per (program, slot).
    pub uniforms: HashMap<(ProgramId, UniformSlot), Uniform>,

    pub calls: Vec<Call>,
}

impl HeadlessState {
    fn alloc(&mut self) -> NonZeroU32 {
        self.next_id = self.next_id.saturating_add(1);
        NonZeroU32::new(self.next_id).unwrap_or(NonZeroU32::MAX)
    }

    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        self.bound_buffers.get(&target).copied()
    }

    fn bound_texture(&self, target: TextureTarget) -> Option<TextureId> {
        self.bound_textures.get(&(self.active_unit, target)).copied()
    }

    /// Number of live driver objects of every kind.
    pub fn live_objects(&self) -> usize {
        self.shaders.len()
            + self.programs.len()
            + self.buffers.len()
            + self.vertex_arrays.len()
            + self.textures.len()
    }
}

/// A [`Backend`] that needs no GPU.
///
/// It allocates ids, tracks object lifetimes, bindings, buffer contents, texture
/// images and uniform values, and records every call. Compilation fails for
/// sources containing [`HEADLESS_COMPILE_ERROR_MARKER`]; linking fails when the
/// program has no vertex stage attached.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    state: RefCell<HeadlessState>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, HeadlessState> {
        self.state.borrow()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Contents of `buffer`, if it is alive.
    pub fn buffer_contents(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, String> {
        let mut st = self.state.borrow_mut();
        let id = ShaderId(st.alloc());
        st.shaders.insert(
            id,
            HeadlessShader {
                stage,
                compiled: false,
                info_log: String::new(),
            },
        );
        st.calls.push(Call::CreateShader(id, stage));
        Ok(id)
    }

    fn compile_shader(&self, id: ShaderId, source: &str) -> bool {
        let mut st = self.state.borrow_mut();
        st.calls.push(Call::CompileShader(id));

        let Some(shader) = st.shaders.get_mut(&id) else {
            return false;
        };

        match source
            .lines()
            .position(|line| line.trim_start().starts_with(HEADLESS_COMPILE_ERROR_MARKER))
        {
            Some(line) => {
                shader.compiled = false;
                let text = source.lines().nth(line).unwrap_or_default().trim();
                shader.info_log = format!("0:{}: error: {text}", line + 1);
            }
            None => {
                shader.compiled = true;
                shader.info_log.clear();
            }
        }
        shader.compiled
    }

    fn shader_info_log(&self, id: ShaderId) -> String {
        self.state
            .borrow()
            .shaders
            .get(&id)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, id: ShaderId) {
        let mut st = self.state.borrow_mut();
        st.shaders.remove(&id);
        st.calls.push(Call::DeleteShader(id));
    }

    fn create_program(&self) -> Result<ProgramId, String> {
        let mut st = self.state.borrow_mut();
        let id = ProgramId(st.alloc());
        st.programs.insert(id, HeadlessProgram::default());
        st.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        let mut st = self.state.borrow_mut();
        if let Some(p) = st.programs.get_mut(&program) {
            p.attached.push(shader);
        }
        st.calls.push(Call::AttachShader(program, shader));
    }

    fn link_program(&self, program: ProgramId) -> bool {
        let mut st = self.state.borrow_mut();
        st.calls.push(Call::LinkProgram(program));

        let has_vertex = st.programs.get(&program).is_some_and(|p| {
            p.attached.iter().any(|s| {
                st.shaders
                    .get(s)
                    .is_some_and(|s| s.compiled && s.stage == ShaderStage::Vertex)
            })
        });

        let Some(p) = st.programs.get_mut(&program) else {
            return false;
        };

        p.linked = has_vertex;
        p.info_log = if has_vertex {
            String::new()
        } else {
            "error: program has no compiled vertex stage attached".to_string()
        };
        p.linked
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ProgramId) {
        let mut st = self.state.borrow_mut();
        st.programs.remove(&program);
        if st.current_program == Some(program) {
            st.current_program = None;
        }
        st.calls.push(Call::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<ProgramId>) {
        let mut st = self.state.borrow_mut();
        st.current_program = program;
        st.calls.push(Call::UseProgram(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformSlot> {
        let mut st = self.state.borrow_mut();
        st.calls.push(Call::UniformLocation(program, name.to_string()));

        if !st.programs.get(&program).is_some_and(|p| p.linked) {
            return None;
        }

        let next = UniformSlot(st.slots.len() as u32);
        Some(*st.slots.entry((program, name.to_string())).or_insert(next))
    }

    fn set_uniform(&self, slot: Option<UniformSlot>, value: Uniform) {
        let Some(slot) = slot else { return };
        let mut st = self.state.borrow_mut();
        if let Some(program) = st.current_program {
            st.uniforms.insert((program, slot), value);
        }
        st.calls.push(Call::SetUniform(slot, value));
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, String> {
        let mut st = self.state.borrow_mut();
        let id = VertexArrayId(st.alloc());
        st.vertex_arrays.insert(id);
        st.calls.push(Call::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayId>) {
        let mut st = self.state.borrow_mut();
        st.bound_vertex_array = vertex_array;
        st.calls.push(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        let mut st = self.state.borrow_mut();
        st.vertex_arrays.remove(&vertex_array);
        if st.bound_vertex_array == Some(vertex_array) {
            st.bound_vertex_array = None;
        }
        st.calls.push(Call::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&self) -> Result<BufferId, String> {
        let mut st = self.state.borrow_mut();
        let id = BufferId(st.alloc());
        st.buffers.insert(id, Vec::new());
        st.calls.push(Call::CreateBuffer(id));
        Ok(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        let mut st = self.state.borrow_mut();
        match buffer {
            Some(b) => {
                st.bound_buffers.insert(target, b);
            }
            None => {
                st.bound_buffers.remove(&target);
            }
        }
        st.calls.push(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        let mut st = self.state.borrow_mut();
        if let Some(b) = st.bound_buffer(target) {
            st.buffers.insert(b, data.to_vec());
        }
        st.calls.push(Call::BufferData(target, data.len()));
    }

    fn buffer_storage(&self, target: BufferTarget, size: usize, _usage: BufferUsage) {
        let mut st = self.state.borrow_mut();
        if let Some(b) = st.bound_buffer(target) {
            st.buffers.insert(b, vec![0; size]);
        }
        st.calls.push(Call::BufferData(target, size));
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        let mut st = self.state.borrow_mut();
        if let Some(b) = st.bound_buffer(target) {
            if let Some(bytes) = st.buffers.get_mut(&b) {
                // Out-of-range writes are dropped, as GL_INVALID_VALUE would.
                if let Some(dst) = bytes.get_mut(offset..offset + data.len()) {
                    dst.copy_from_slice(data);
                }
            }
        }
        st.calls.push(Call::BufferSubData(target, offset, data.len()));
    }

    fn bind_buffer_range(
        &self,
        _target: BufferTarget,
        binding: u32,
        buffer: BufferId,
        offset: usize,
        size: usize,
    ) {
        let mut st = self.state.borrow_mut();
        st.uniform_bindings.insert(binding, (buffer, offset, size));
        st.calls.push(Call::BindBufferRange {
            binding,
            buffer,
            offset,
            size,
        });
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut st = self.state.borrow_mut();
        st.buffers.remove(&buffer);
        st.bound_buffers.retain(|_, b| *b != buffer);
        st.uniform_bindings.retain(|_, (b, _, _)| *b != buffer);
        st.calls.push(Call::DeleteBuffer(buffer));
    }

    fn vertex_attribute(&self, attribute: VertexAttribute) {
        self.record(Call::VertexAttribute(attribute));
    }

    fn create_texture(&self) -> Result<TextureId, String> {
        let mut st = self.state.borrow_mut();
        let id = TextureId(st.alloc());
        st.textures.insert(id, HeadlessTexture::default());
        st.calls.push(Call::CreateTexture(id));
        Ok(id)
    }

    fn active_texture_unit(&self, unit: u32) {
        let mut st = self.state.borrow_mut();
        st.active_unit = unit;
        st.calls.push(Call::ActiveTextureUnit(unit));
    }

    fn bind_texture(&self, target: TextureTarget, texture: Option<TextureId>) {
        let mut st = self.state.borrow_mut();
        let unit = st.active_unit;
        match texture {
            Some(t) => {
                st.bound_textures.insert((unit, target), t);
                if let Some(tex) = st.textures.get_mut(&t) {
                    tex.target.get_or_insert(target);
                }
            }
            None => {
                st.bound_textures.remove(&(unit, target));
            }
        }
        st.calls.push(Call::BindTexture(target, texture));
    }

    fn tex_image(
        &self,
        target: ImageTarget,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    ) {
        let mut st = self.state.borrow_mut();
        if let Some(t) = st.bound_texture(target.texture_target()) {
            if let Some(tex) = st.textures.get_mut(&t) {
                tex.images.insert(
                    target,
                    HeadlessImage {
                        width,
                        height,
                        format,
                        pixels: pixels.to_vec(),
                    },
                );
            }
        }
        st.calls.push(Call::TexImage {
            target,
            width,
            height,
            format,
        });
    }

    fn set_sampler(&self, target: TextureTarget, sampler: SamplerDesc) {
        let mut st = self.state.borrow_mut();
        if let Some(t) = st.bound_texture(target) {
            if let Some(tex) = st.textures.get_mut(&t) {
                tex.sampler = Some(sampler);
            }
        }
        st.calls.push(Call::SetSampler(target, sampler));
    }

    fn generate_mipmaps(&self, target: TextureTarget) {
        let mut st = self.state.borrow_mut();
        if let Some(t) = st.bound_texture(target) {
            if let Some(tex) = st.textures.get_mut(&t) {
                tex.mipmapped = true;
            }
        }
        st.calls.push(Call::GenerateMipmaps(target));
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut st = self.state.borrow_mut();
        st.textures.remove(&texture);
        st.bound_textures.retain(|_, t| *t != texture);
        st.calls.push(Call::DeleteTexture(texture));
    }

    fn draw_arrays(&self, primitive: Primitive, first: u32, count: u32) {
        self.record(Call::DrawArrays {
            primitive,
            first,
            count,
        });
    }

    fn draw_elements(&self, primitive: Primitive, count: u32) {
        self.record(Call::DrawElements { primitive, count });
    }

    fn clear(&self, color: [f32; 4]) {
        self.record(Call::Clear(color));
    }

    fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        self.record(Call::Capability(capability, enabled));
    }

    fn set_depth_write(&self, enabled: bool) {
        self.record(Call::DepthWrite(enabled));
    }
}
