//! Forward-rendered sphere under a skybox.
//!
//! Keys: `R` reloads the surface shader, `Escape` quits.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use gfxl::device::{Capability, Gfx, Primitive};
use gfxl::input::Key;
use gfxl::math::{to_radians, Matrix4, Vector3};
use gfxl::render::{Camera, Cubemap, Mesh, Shader, Texture2D};
use gfxl::window::{Window, WindowSettings};
use gfxl_demos::{asset, load_program};

const CLEAR: [f32; 3] = [0.35, 0.1, 0.27];

struct Scene {
    camera: Camera,
    sphere: Mesh,
    cube: Mesh,
    surface: Shader,
    skybox: Shader,
    environment: Cubemap,
    albedo: Texture2D,
    normal: Texture2D,
    metallic: Texture2D,
    roughness: Texture2D,
}

impl Scene {
    fn load(gfx: &Gfx, aspect_ratio: f32) -> Result<Self> {
        gfx.enable(Capability::Blend);
        gfx.enable(Capability::DepthTest);
        gfx.enable(Capability::CullFace);

        // Missing or broken assets are reported and leave the handle empty.
        let texture = |path: &str| {
            let mut texture = Texture2D::new(gfx);
            let _ = texture.load_from_image_file(asset(path));
            texture
        };

        let mut environment = Cubemap::new(gfx);
        let _ = environment.load_from_image_files(
            asset("cubemaps/dusk/front.png"),
            asset("cubemaps/dusk/back.png"),
            asset("cubemaps/dusk/left.png"),
            asset("cubemaps/dusk/right.png"),
            asset("cubemaps/dusk/top.png"),
            asset("cubemaps/dusk/bottom.png"),
        );

        let mut sphere = Mesh::new(gfx);
        let _ = sphere.load_from_model_file(asset("sphere.obj"));
        let mut cube = Mesh::new(gfx);
        let _ = cube.load_from_model_file(asset("cube.obj"));

        let skybox = load_program(gfx, "glsl/skybox.vs", "glsl/skybox.fs");
        skybox.bind();
        skybox.set_var("Skybox", &0i32);

        let mut camera = Camera::new(gfx);
        camera.position = Vector3::new(0.0, 0.0, -5.0);
        camera.look_at = Vector3::ZERO;
        camera.set_to_perspective(to_radians(45.0), aspect_ratio, 0.1, 1000.0);
        camera.update()?;

        Ok(Self {
            camera,
            sphere,
            cube,
            surface: surface_shader(gfx),
            skybox,
            environment,
            albedo: texture("materials/rusted-iron/albedo.png"),
            normal: texture("materials/rusted-iron/normal.png"),
            metallic: texture("materials/rusted-iron/metallic.png"),
            roughness: texture("materials/rusted-iron/roughness.png"),
        })
    }

    fn render(&mut self, gfx: &Gfx, time: f32) {
        gfx.clear(CLEAR[0], CLEAR[1], CLEAR[2]);

        self.environment.bind(0);
        self.albedo.bind(1);
        self.normal.bind(2);
        self.metallic.bind(3);
        self.roughness.bind(4);

        draw_skybox(gfx, &self.skybox, &self.cube);

        self.surface.bind();
        self.surface
            .set_var("Model", &Matrix4::from_rotation_y(time * 0.5));
        self.sphere.render(Primitive::Triangles);
    }
}

/// Draws the inside of `cube` behind everything else.
///
/// The skybox vertex shader writes depth 1.0, which never passes `LESS`
/// against a cleared depth buffer, so the depth test is off for this draw.
fn draw_skybox(gfx: &Gfx, shader: &Shader, cube: &Mesh) {
    gfx.disable(Capability::CullFace);
    gfx.disable(Capability::DepthTest);
    shader.bind();
    cube.render(Primitive::Triangles);
    gfx.enable(Capability::DepthTest);
    gfx.enable(Capability::CullFace);
}

fn surface_shader(gfx: &Gfx) -> Shader {
    let shader = load_program(gfx, "glsl/gfxl.vs", "glsl/gfxl.fs");
    shader.bind();

    shader.set_var("LightCount", &2i32);
    shader.set_var("Ambient.color", &Vector3::ONE);
    shader.set_var("Ambient.intensity", &0.35f32);

    shader.set_var("Material.albedo", &1i32);
    shader.set_var("Material.normal", &2i32);
    shader.set_var("Material.metallic", &3i32);
    shader.set_var("Material.roughness", &4i32);

    shader.set_var("Lights[0].position", &Vector3::new(1.0, 1.0, -1.7));
    shader.set_var("Lights[0].color", &Vector3::ONE);
    shader.set_var("Lights[0].intensity", &10.0f32);

    shader.set_var("Lights[1].position", &Vector3::new(0.0, -1.5, 0.0));
    shader.set_var("Lights[1].color", &Vector3::new(0.0, 0.5, 0.75));
    shader.set_var("Lights[1].intensity", &5.0f32);

    shader.set_var("Skybox", &0i32);
    shader
}

fn main() -> Result<()> {
    gfxl_demos::init();

    let settings = WindowSettings {
        double_buffer: true,
        ..WindowSettings::new("Sandbox", 1600, 900)
    };
    let mut window = Window::new(settings)?;
    let gfx = window.gfx().clone();

    let reload = Rc::new(Cell::new(false));
    let quit = Rc::new(Cell::new(false));
    {
        let (reload, quit) = (reload.clone(), quit.clone());
        window.set_key_callback(move |key, pressed| match (key, pressed) {
            (Key::R, true) => reload.set(true),
            (Key::Escape, true) => quit.set(true),
            _ => {}
        });
    }

    let (width, height) = window.size();
    let mut scene = Scene::load(&gfx, width as f32 / height.max(1) as f32)?;
    let mut clock = gfxl::time::FrameClock::new();

    while !window.should_close() {
        window.poll_events();
        if quit.get() {
            window.request_close();
        }

        if reload.replace(false) {
            gfx.message(format_args!("Reloading shaders..."));
            scene.surface = surface_shader(&gfx);
            gfx.message(format_args!("\tDone!"));
        }

        let (width, height) = window.size();
        if width > 0 && height > 0 {
            scene
                .camera
                .set_to_perspective(to_radians(45.0), width as f32 / height as f32, 0.1, 1000.0);
        }
        scene.camera.update()?;

        let time = clock.tick();
        scene.render(&gfx, time.elapsed);
        window.swap_buffers()?;
    }

    drop(scene);
    window.terminate();
    Ok(())
}
