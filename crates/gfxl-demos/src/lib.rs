//! Shared helpers for the demo binaries.

use std::env;
use std::path::{Path, PathBuf};

use gfxl::device::{Gfx, ShaderStage};
use gfxl::logging::{init_logging, LoggingConfig};
use gfxl::render::Shader;

/// Overrides the asset root.
pub const ASSETS_ENV: &str = "GFXL_ASSETS";

/// Asset root: `$GFXL_ASSETS` when set, else this crate's `assets/`.
pub fn assets_dir() -> PathBuf {
    match env::var_os(ASSETS_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"),
    }
}

pub fn asset(relative: impl AsRef<Path>) -> PathBuf {
    assets_dir().join(relative)
}

/// Logger setup shared by the demos: `RUST_LOG` when set, else `info`.
pub fn init() {
    init_logging(LoggingConfig::default());
}

/// Builds a vertex + fragment program from two asset files.
///
/// Compile and link failures were already reported on the diagnostic
/// channel; the returned shader is then unlinked and binding it unbinds.
pub fn load_program(gfx: &Gfx, vertex: &str, fragment: &str) -> Shader {
    let mut shader = Shader::new(gfx);
    for (file, stage) in [(vertex, ShaderStage::Vertex), (fragment, ShaderStage::Fragment)] {
        if let Err(err) = shader.load_and_compile(asset(file), stage) {
            log::warn!("{file}: {stage} stage skipped: {err}");
        }
    }
    if let Err(err) = shader.link() {
        log::warn!("{vertex} + {fragment}: program left unlinked: {err}");
    }
    shader
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_assets_are_found() {
        let dir = assets_dir();
        assert!(dir.join("glsl").is_dir(), "{} has no glsl/", dir.display());
        assert!(asset("cube.obj").is_file());
    }

    #[test]
    fn bundled_cube_has_36_vertices() {
        let file = std::fs::File::open(asset("cube.obj")).unwrap();
        let model = gfxl::model::parse_obj(std::io::BufReader::new(file)).unwrap();
        assert_eq!(model.vertices.len(), 36);
        assert_eq!(model.skipped_faces, 0);
    }

    #[test]
    fn bundled_sphere_uses_full_references() {
        let file = std::fs::File::open(asset("sphere.obj")).unwrap();
        let model = gfxl::model::parse_obj(std::io::BufReader::new(file)).unwrap();
        assert_eq!(model.skipped_faces, 0);
        assert_eq!(model.vertices.len(), 960 * 3);
        assert!(model.vertices.iter().any(|v| v.texcoord != gfxl::math::Vector2::ZERO));
    }

    #[test]
    fn bundled_shaders_load_headless() {
        let gfx = Gfx::new(std::rc::Rc::new(gfxl::HeadlessBackend::new()));
        let shader = load_program(&gfx, "glsl/gfxl.vs", "glsl/gfxl.fs");
        assert!(shader.is_linked());
    }

    #[test]
    fn missing_vertex_stage_leaves_program_unlinked() {
        let gfx = Gfx::new(std::rc::Rc::new(gfxl::HeadlessBackend::new()));
        let errors = std::rc::Rc::new(std::cell::Cell::new(0));
        let seen = errors.clone();
        gfx.set_error_callback(move |_| seen.set(seen.get() + 1));

        let shader = load_program(&gfx, "glsl/missing.vs", "glsl/gfxl.fs");

        assert!(!shader.is_linked());
        assert_eq!(errors.get(), 2);
    }
}
