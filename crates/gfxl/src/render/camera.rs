use bytemuck::{Pod, Zeroable};

use crate::device::{BufferId, BufferTarget, BufferUsage, Gfx};
use crate::error::{GfxError, Result};
use crate::math::{Matrix4, Vector3, WORLD_UP};

/// Uniform binding point the camera block is attached to.
pub const CAMERA_BINDING: u32 = 0;

/// Layout of the camera uniform block. GLSL 3.30 blocks default to binding 0:
///
/// ```glsl
/// layout (std140) uniform Camera {
///     mat4 view;       // offset 0
///     mat4 projection; // offset 64
///     vec3 position;   // offset 128
/// };
/// ```
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [f32; 16],
    pub projection: [f32; 16],
    pub position: [f32; 3],
}

impl CameraUniform {
    pub const SIZE: usize = std::mem::size_of::<CameraUniform>();
}

/// Look-at camera mirrored into a uniform buffer.
pub struct Camera {
    gfx: Gfx,
    pub position: Vector3,
    pub look_at: Vector3,
    view: Matrix4,
    projection: Matrix4,
    buffer: Option<BufferId>,
}

impl Camera {
    pub fn new(gfx: &Gfx) -> Self {
        Self {
            gfx: gfx.clone(),
            position: Vector3::ZERO,
            look_at: Vector3::NEG_Z,
            view: Matrix4::IDENTITY,
            projection: Matrix4::IDENTITY,
            buffer: None,
        }
    }

    /// Right-handed GL perspective. `fov` is the vertical field of view in
    /// radians.
    pub fn set_to_perspective(&mut self, fov: f32, aspect_ratio: f32, near: f32, far: f32) {
        self.projection = Matrix4::perspective_rh_gl(fov, aspect_ratio, near, far);
    }

    /// Recomputes the view matrix and writes view, projection and position
    /// to the uniform buffer, creating it (bound at [`CAMERA_BINDING`]) on
    /// first use.
    ///
    /// `position == look_at` yields a NaN view.
    pub fn update(&mut self) -> Result<()> {
        let backend = self.gfx.backend();

        let buffer = match self.buffer {
            Some(buffer) => buffer,
            None => {
                let buffer = backend
                    .create_buffer()
                    .map_err(|e| self.gfx.fail(GfxError::Backend(e)))?;
                backend.bind_buffer(BufferTarget::Uniform, Some(buffer));
                backend.buffer_storage(BufferTarget::Uniform, CameraUniform::SIZE, BufferUsage::DynamicDraw);
                backend.bind_buffer_range(
                    BufferTarget::Uniform,
                    CAMERA_BINDING,
                    buffer,
                    0,
                    CameraUniform::SIZE,
                );
                self.buffer = Some(buffer);
                buffer
            }
        };

        self.view = Matrix4::look_at_rh(self.position, self.look_at, WORLD_UP);

        let block = CameraUniform {
            view: self.view.to_cols_array(),
            projection: self.projection.to_cols_array(),
            position: self.position.to_array(),
        };

        backend.bind_buffer(BufferTarget::Uniform, Some(buffer));
        backend.buffer_sub_data(BufferTarget::Uniform, 0, bytemuck::bytes_of(&block));
        backend.bind_buffer(BufferTarget::Uniform, None);

        Ok(())
    }

    /// View matrix as of the last `update`.
    pub fn view(&self) -> Matrix4 {
        self.view
    }

    pub fn projection(&self) -> Matrix4 {
        self.projection
    }

    pub fn uniform_buffer(&self) -> Option<BufferId> {
        self.buffer
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.gfx.release(|backend| backend.delete_buffer(buffer));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, HeadlessBackend};
    use crate::math::{to_radians, Vector4};
    use std::rc::Rc;

    fn setup() -> (Rc<HeadlessBackend>, Gfx) {
        let hb = Rc::new(HeadlessBackend::new());
        let gfx = Gfx::new(hb.clone());
        (hb, gfx)
    }

    fn camera(gfx: &Gfx) -> Camera {
        let mut camera = Camera::new(gfx);
        camera.position = Vector3::new(0.0, 1.0, 5.0);
        camera.look_at = Vector3::ZERO;
        camera.set_to_perspective(to_radians(45.0), 16.0 / 9.0, 0.1, 100.0);
        camera
    }

    #[test]
    fn block_is_two_matrices_and_a_vec3() {
        assert_eq!(CameraUniform::SIZE, 140);
    }

    #[test]
    fn first_update_creates_and_binds_buffer() {
        let (hb, gfx) = setup();
        let mut camera = camera(&gfx);
        assert_eq!(camera.uniform_buffer(), None);

        camera.update().unwrap();

        let buffer = camera.uniform_buffer().unwrap();
        let state = hb.state();
        assert_eq!(state.buffers[&buffer].len(), 140);
        assert_eq!(state.uniform_bindings[&CAMERA_BINDING], (buffer, 0, 140));
    }

    #[test]
    fn buffer_is_created_once() {
        let (hb, gfx) = setup();
        let mut camera = camera(&gfx);

        camera.update().unwrap();
        camera.position.x = 2.0;
        camera.update().unwrap();

        let created = hb
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateBuffer(_)))
            .count();
        assert_eq!(created, 1);
    }

    #[test]
    fn repeated_update_writes_identical_bytes() {
        let (hb, gfx) = setup();
        let mut camera = camera(&gfx);

        camera.update().unwrap();
        let buffer = camera.uniform_buffer().unwrap();
        let first = hb.buffer_contents(buffer).unwrap();
        camera.update().unwrap();
        let second = hb.buffer_contents(buffer).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn buffer_mirrors_view_projection_position() {
        let (hb, gfx) = setup();
        let mut camera = camera(&gfx);
        camera.update().unwrap();

        let bytes = hb.buffer_contents(camera.uniform_buffer().unwrap()).unwrap();
        let block: CameraUniform = bytemuck::pod_read_unaligned(&bytes);

        assert_eq!(block.view, camera.view().to_cols_array());
        assert_eq!(block.projection, camera.projection().to_cols_array());
        assert_eq!(block.position, [0.0, 1.0, 5.0]);
    }

    #[test]
    fn view_looks_down_the_target_direction() {
        let (_hb, gfx) = setup();
        let mut camera = camera(&gfx);
        camera.update().unwrap();

        // The target sits on the camera's -Z axis in view space.
        let target = camera.view() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(target.z < 0.0);
        assert!(target.x.abs() < 1e-5);
    }

    #[test]
    fn projection_defaults_to_identity() {
        let (_hb, gfx) = setup();
        assert_eq!(Camera::new(&gfx).projection(), Matrix4::IDENTITY);
    }

    #[test]
    fn drop_releases_uniform_buffer() {
        let (hb, gfx) = setup();
        {
            let mut camera = camera(&gfx);
            camera.update().unwrap();
        }
        assert!(hb.state().buffers.is_empty());
    }
}
