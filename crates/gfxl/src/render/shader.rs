use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::device::{Gfx, ProgramId, ShaderId, ShaderStage, Uniform, UniformSlot};
use crate::error::{GfxError, Result};
use crate::math::{Matrix4, Vector2, Vector3, Vector4};

/// Values accepted by [`Shader::set_var`].
pub trait UniformValue {
    fn to_uniform(&self) -> Uniform;
}

impl UniformValue for f32 {
    fn to_uniform(&self) -> Uniform {
        Uniform::Float(*self)
    }
}

impl UniformValue for i32 {
    fn to_uniform(&self) -> Uniform {
        Uniform::Int(*self)
    }
}

impl UniformValue for Vector2 {
    fn to_uniform(&self) -> Uniform {
        Uniform::Vec2(self.to_array())
    }
}

impl UniformValue for Vector3 {
    fn to_uniform(&self) -> Uniform {
        Uniform::Vec3(self.to_array())
    }
}

impl UniformValue for Vector4 {
    fn to_uniform(&self) -> Uniform {
        Uniform::Vec4(self.to_array())
    }
}

impl UniformValue for Matrix4 {
    fn to_uniform(&self) -> Uniform {
        Uniform::Mat4(self.to_cols_array())
    }
}

/// A shader program under construction or ready for drawing.
///
/// Lifecycle:
/// 1. `Shader::new`
/// 2. one `load_and_compile` / `compile_source` per stage
/// 3. `link`, which frees the compiled stages whatever the outcome
/// 4. `bind` + `set_var` + draw
///
/// Dropping the shader releases the program and any stages not yet linked.
pub struct Shader {
    gfx: Gfx,
    program: Option<ProgramId>,
    stages: Vec<ShaderId>,

    /// Name → location, filled on first use of each name.
    locations: RefCell<HashMap<String, Option<UniformSlot>>>,
}

impl Shader {
    pub fn new(gfx: &Gfx) -> Self {
        Self {
            gfx: gfx.clone(),
            program: None,
            stages: Vec::new(),
            locations: RefCell::new(HashMap::new()),
        }
    }

    /// Reads `path` and compiles it as `stage`.
    ///
    /// On failure the stage is discarded and the reason is reported on the
    /// diagnostic channel; previously compiled stages are kept.
    pub fn load_and_compile(&mut self, path: impl AsRef<Path>, stage: ShaderStage) -> Result<()> {
        let path = path.as_ref();
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(source) => {
                return Err(self.gfx.fail(GfxError::Io {
                    path: path.to_path_buf(),
                    source,
                }));
            }
        };

        self.compile_source(&source, stage)
    }

    /// Compiles in-memory `source` as `stage`.
    pub fn compile_source(&mut self, source: &str, stage: ShaderStage) -> Result<()> {
        let backend = self.gfx.backend();
        let id = backend
            .create_shader(stage)
            .map_err(|e| self.gfx.fail(GfxError::Backend(e)))?;

        if !backend.compile_shader(id, source) {
            let log = backend.shader_info_log(id);
            backend.delete_shader(id);
            return Err(self.gfx.fail(GfxError::Compile { stage, log }));
        }

        self.stages.push(id);
        Ok(())
    }

    /// Links all compiled stages into a program.
    ///
    /// The stages are deleted afterwards in both outcomes. On failure the
    /// program is deleted as well and the shader is left unlinked. Relinking
    /// replaces (and releases) an earlier program.
    pub fn link(&mut self) -> Result<()> {
        let backend = self.gfx.backend();
        let program = backend
            .create_program()
            .map_err(|e| self.gfx.fail(GfxError::Backend(e)))?;

        for &stage in &self.stages {
            backend.attach_shader(program, stage);
        }

        let linked = backend.link_program(program);

        for stage in self.stages.drain(..) {
            backend.delete_shader(stage);
        }

        if !linked {
            let log = backend.program_info_log(program);
            backend.delete_program(program);
            return Err(self.gfx.fail(GfxError::Link { log }));
        }

        if let Some(old) = self.program.replace(program) {
            backend.delete_program(old);
        }
        self.locations.borrow_mut().clear();

        Ok(())
    }

    pub fn is_linked(&self) -> bool {
        self.program.is_some()
    }

    /// Compiled stages waiting for `link`.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    /// Makes this program current. An unlinked shader unbinds.
    pub fn bind(&self) {
        self.gfx.backend().use_program(self.program);
    }

    pub fn unbind(gfx: &Gfx) {
        gfx.backend().use_program(None);
    }

    /// Writes a uniform of this program.
    ///
    /// The program must be bound. Unknown names (and unlinked shaders) are a
    /// silent no-op, as with the driver.
    pub fn set_var<V: UniformValue + ?Sized>(&self, name: &str, value: &V) {
        let slot = self.location(name);
        self.gfx.backend().set_uniform(slot, value.to_uniform());
    }

    fn location(&self, name: &str) -> Option<UniformSlot> {
        let program = self.program?;

        if let Some(slot) = self.locations.borrow().get(name) {
            return *slot;
        }

        let slot = self.gfx.backend().uniform_location(program, name);
        self.locations.borrow_mut().insert(name.to_string(), slot);
        slot
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        let program = self.program.take();
        let stages = std::mem::take(&mut self.stages);

        self.gfx.release(|backend| {
            for stage in stages {
                backend.delete_shader(stage);
            }
            if let Some(program) = program {
                backend.delete_program(program);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, HeadlessBackend};
    use std::rc::Rc;

    const VS: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\n";
    const FS: &str = "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }\n";
    const BROKEN: &str = "#version 330 core\n#error missing semicolon\n";

    fn setup() -> (Rc<HeadlessBackend>, Gfx) {
        let hb = Rc::new(HeadlessBackend::new());
        let gfx = Gfx::new(hb.clone());
        (hb, gfx)
    }

    #[test]
    fn compile_appends_stage() {
        let (hb, gfx) = setup();
        let mut shader = Shader::new(&gfx);

        shader.compile_source(VS, ShaderStage::Vertex).unwrap();
        shader.compile_source(FS, ShaderStage::Fragment).unwrap();

        assert_eq!(shader.stage_count(), 2);
        assert_eq!(hb.state().shaders.len(), 2);
    }

    #[test]
    fn compile_failure_discards_stage_and_reports() {
        let (hb, gfx) = setup();
        let errors = Rc::new(RefCell::new(Vec::<String>::new()));
        let out = errors.clone();
        gfx.set_error_callback(move |text| out.borrow_mut().push(text.to_owned()));

        let mut shader = Shader::new(&gfx);
        let err = shader.compile_source(BROKEN, ShaderStage::Fragment).unwrap_err();

        assert!(matches!(err, GfxError::Compile { stage: ShaderStage::Fragment, .. }));
        assert_eq!(shader.stage_count(), 0);
        assert!(hb.state().shaders.is_empty());
        assert_eq!(errors.borrow().len(), 1);
        assert!(errors.borrow()[0].contains("missing semicolon"));
    }

    #[test]
    fn link_with_no_compiled_stages_fails_cleanly() {
        let (hb, gfx) = setup();
        let mut shader = Shader::new(&gfx);

        assert!(shader.compile_source(BROKEN, ShaderStage::Vertex).is_err());
        let err = shader.link().unwrap_err();

        assert!(matches!(err, GfxError::Link { .. }));
        assert!(!shader.is_linked());
        let state = hb.state();
        assert!(state.shaders.is_empty());
        assert!(state.programs.is_empty());
    }

    #[test]
    fn link_success_frees_stages() {
        let (hb, gfx) = setup();
        let mut shader = Shader::new(&gfx);
        shader.compile_source(VS, ShaderStage::Vertex).unwrap();
        shader.compile_source(FS, ShaderStage::Fragment).unwrap();

        shader.link().unwrap();

        assert!(shader.is_linked());
        assert_eq!(shader.stage_count(), 0);
        assert!(hb.state().shaders.is_empty());
        assert_eq!(hb.state().programs.len(), 1);
    }

    #[test]
    fn failed_link_frees_stages_and_program() {
        let (hb, gfx) = setup();
        let mut shader = Shader::new(&gfx);
        // Fragment only: the headless driver requires a vertex stage.
        shader.compile_source(FS, ShaderStage::Fragment).unwrap();

        assert!(shader.link().is_err());

        assert_eq!(hb.state().live_objects(), 0);
        let deleted_stage = hb
            .calls()
            .iter()
            .any(|c| matches!(c, Call::DeleteShader(_)));
        assert!(deleted_stage);
    }

    #[test]
    fn missing_file_is_reported_without_creating_a_stage() {
        let (hb, gfx) = setup();
        let mut shader = Shader::new(&gfx);

        let err = shader
            .load_and_compile("does/not/exist.vs", ShaderStage::Vertex)
            .unwrap_err();

        assert!(matches!(err, GfxError::Io { .. }));
        assert!(hb.calls().is_empty());
    }

    #[test]
    fn load_and_compile_reads_file() {
        let (_hb, gfx) = setup();
        let path = std::env::temp_dir().join(format!("gfxl-shader-{}.vs", std::process::id()));
        fs::write(&path, VS).unwrap();

        let mut shader = Shader::new(&gfx);
        shader.load_and_compile(&path, ShaderStage::Vertex).unwrap();
        assert_eq!(shader.stage_count(), 1);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn set_var_resolves_each_name_once() {
        let (hb, gfx) = setup();
        let mut shader = Shader::new(&gfx);
        shader.compile_source(VS, ShaderStage::Vertex).unwrap();
        shader.link().unwrap();
        shader.bind();
        hb.clear_calls();

        shader.set_var("Ambient.intensity", &0.35f32);
        shader.set_var("Ambient.intensity", &0.5f32);
        shader.set_var("LightCount", &1i32);

        let lookups = hb
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::UniformLocation(..)))
            .count();
        assert_eq!(lookups, 2);

        let program = shader.program().unwrap();
        let state = hb.state();
        let values: Vec<Uniform> = state
            .uniforms
            .iter()
            .filter(|((p, _), _)| *p == program)
            .map(|(_, v)| *v)
            .collect();
        assert!(values.contains(&Uniform::Float(0.5)));
        assert!(values.contains(&Uniform::Int(1)));
    }

    #[test]
    fn set_var_accepts_vectors_and_matrices() {
        let (hb, gfx) = setup();
        let mut shader = Shader::new(&gfx);
        shader.compile_source(VS, ShaderStage::Vertex).unwrap();
        shader.link().unwrap();
        shader.bind();

        shader.set_var("Lights[0].position", &Vector3::new(1.0, 1.0, -1.7));
        shader.set_var("Tint", &Vector4::ONE);
        shader.set_var("Resolution", &Vector2::new(1600.0, 900.0));
        shader.set_var("Model", &Matrix4::IDENTITY);

        let set = hb
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::SetUniform(..)))
            .count();
        assert_eq!(set, 4);
    }

    #[test]
    fn relink_releases_previous_program() {
        let (hb, gfx) = setup();
        let mut shader = Shader::new(&gfx);
        shader.compile_source(VS, ShaderStage::Vertex).unwrap();
        shader.link().unwrap();
        let first = shader.program().unwrap();

        shader.compile_source(VS, ShaderStage::Vertex).unwrap();
        shader.link().unwrap();

        assert_ne!(shader.program(), Some(first));
        assert_eq!(hb.state().programs.len(), 1);
    }

    #[test]
    fn drop_releases_program_and_pending_stages() {
        let (hb, gfx) = setup();
        {
            let mut linked = Shader::new(&gfx);
            linked.compile_source(VS, ShaderStage::Vertex).unwrap();
            linked.link().unwrap();

            let mut pending = Shader::new(&gfx);
            pending.compile_source(FS, ShaderStage::Fragment).unwrap();
        }
        assert_eq!(hb.state().live_objects(), 0);
    }
}
