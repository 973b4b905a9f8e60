//! Full-screen fragment raytracer.
//!
//! Keys: `F1` reloads the shader, `Escape` quits.

use anyhow::Result;
use gfxl::core::{run, App, AppControl, FrameCtx};
use gfxl::device::{Gfx, Primitive};
use gfxl::input::Key;
use gfxl::math::{Vector2, Vector3};
use gfxl::model::Vertex;
use gfxl::render::{Mesh, Shader};
use gfxl::window::WindowSettings;
use gfxl_demos::load_program;

const QUAD: [Vertex; 6] = [
    Vertex::at(Vector3::new(-1.0, -1.0, 0.0)),
    Vertex::at(Vector3::new(-1.0, 1.0, 0.0)),
    Vertex::at(Vector3::new(1.0, 1.0, 0.0)),
    Vertex::at(Vector3::new(-1.0, -1.0, 0.0)),
    Vertex::at(Vector3::new(1.0, 1.0, 0.0)),
    Vertex::at(Vector3::new(1.0, -1.0, 0.0)),
];

struct Resources {
    quad: Mesh,
    shader: Shader,
}

#[derive(Default)]
struct Raytracer {
    resources: Option<Resources>,
}

fn shader(gfx: &Gfx) -> Shader {
    load_program(gfx, "glsl/raytracer.vs", "glsl/raytracer.fs")
}

impl App for Raytracer {
    fn init(&mut self, gfx: &Gfx) -> Result<()> {
        gfx.set_error_callback(|text| eprintln!("{text}"));

        let mut quad = Mesh::new(gfx);
        quad.upload_data(&QUAD, None)?;

        self.resources = Some(Resources {
            quad,
            shader: shader(gfx),
        });
        Ok(())
    }

    fn on_key(&mut self, gfx: &Gfx, key: Key, pressed: bool) -> AppControl {
        match (key, pressed) {
            (Key::Escape, true) => AppControl::Exit,
            (Key::F1, true) => {
                if let Some(resources) = self.resources.as_mut() {
                    resources.shader = shader(gfx);
                    log::info!("raytracer shader reloaded (linked: {})", resources.shader.is_linked());
                }
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let Some(resources) = self.resources.as_ref() else {
            return AppControl::Exit;
        };

        let gfx = ctx.gfx();
        gfx.clear(0.35, 0.1, 0.27);

        let (width, height) = ctx.size();
        resources.shader.bind();
        resources.shader.set_var("Time", &ctx.time.elapsed);
        resources
            .shader
            .set_var("Resolution", &Vector2::new(width as f32, height as f32));
        resources.quad.render(Primitive::Triangles);

        AppControl::Continue
    }
}

fn main() -> Result<()> {
    gfxl_demos::init();
    run(
        WindowSettings::new("Raytracer", 1600, 900),
        Raytracer::default(),
    )
}
