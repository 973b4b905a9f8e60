//! A triangle under an orbit camera.
//!
//! Keys: arrows orbit, `PageUp`/`PageDown` zoom, `Escape` quits.

use anyhow::Result;
use gfxl::core::{run, App, AppControl, FrameCtx};
use gfxl::device::{Gfx, Primitive};
use gfxl::input::Key;
use gfxl::math::{to_radians, Matrix4, Vector3, Vector4};
use gfxl::model::Vertex;
use gfxl::render::{Camera, Mesh, Shader};
use gfxl::window::WindowSettings;
use gfxl_demos::load_program;

/// Radians per second.
const ORBIT_SPEED: f32 = 1.5;
const ZOOM_SPEED: f32 = 4.0;

struct Scene {
    camera: Camera,
    triangle: Mesh,
    shader: Shader,
}

struct Editor {
    scene: Option<Scene>,
    yaw: f32,
    pitch: f32,
    distance: f32,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            scene: None,
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            distance: 5.0,
        }
    }
}

impl Editor {
    fn eye(&self) -> Vector3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw) * self.distance
    }

    fn steer(&mut self, ctx: &FrameCtx<'_>) {
        let dt = ctx.time.dt;
        let axis = |negative, positive| {
            (ctx.key_down(positive) as i32 - ctx.key_down(negative) as i32) as f32
        };

        self.yaw += axis(Key::ArrowLeft, Key::ArrowRight) * ORBIT_SPEED * dt;
        self.pitch = (self.pitch + axis(Key::ArrowDown, Key::ArrowUp) * ORBIT_SPEED * dt)
            .clamp(to_radians(-85.0), to_radians(85.0));
        self.distance =
            (self.distance + axis(Key::PageUp, Key::PageDown) * ZOOM_SPEED * dt).clamp(1.0, 50.0);
    }
}

impl App for Editor {
    fn init(&mut self, gfx: &Gfx) -> Result<()> {
        let mut triangle = Mesh::new(gfx);
        triangle.upload_data(
            &[
                Vertex::at(Vector3::new(-0.5, -0.5, 0.0)),
                Vertex::at(Vector3::new(0.5, -0.5, 0.0)),
                Vertex::at(Vector3::new(0.0, 0.5, 0.0)),
            ],
            None,
        )?;

        let shader = load_program(gfx, "glsl/gfxl.vs", "glsl/editor.fs");
        shader.bind();
        shader.set_var("Model", &Matrix4::IDENTITY);
        shader.set_var("Tint", &Vector4::new(1.0, 0.72, 0.08, 1.0));

        self.scene = Some(Scene {
            camera: Camera::new(gfx),
            triangle,
            shader,
        });
        Ok(())
    }

    fn on_key(&mut self, _gfx: &Gfx, key: Key, pressed: bool) -> AppControl {
        if key == Key::Escape && pressed {
            AppControl::Exit
        } else {
            AppControl::Continue
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        self.steer(ctx);
        let eye = self.eye();

        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Exit;
        };

        scene.camera.position = eye;
        scene.camera.look_at = Vector3::ZERO;
        scene
            .camera
            .set_to_perspective(to_radians(45.0), ctx.aspect_ratio(), 0.1, 1000.0);
        if let Err(err) = scene.camera.update() {
            log::error!("camera update failed: {err}");
            return AppControl::Exit;
        }

        let gfx = ctx.gfx();
        gfx.clear(0.35, 0.1, 0.27);
        scene.shader.bind();
        scene.triangle.render(Primitive::Triangles);

        AppControl::Continue
    }
}

fn main() -> Result<()> {
    gfxl_demos::init();
    run(WindowSettings::new("Editor", 1600, 900), Editor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eye_sits_on_negative_z() {
        let eye = Editor::default().eye();
        assert!(eye.x.abs() < 1e-5);
        assert!((eye.z + 5.0).abs() < 1e-5);
    }
}
