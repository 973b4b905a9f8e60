//! Math aliases.
//!
//! Thin names over `glam` so the rest of the crate (and callers) read in the
//! vocabulary of the renderer rather than of the math library.

pub use glam::{IVec2, IVec3, IVec4, Mat4, Vec2, Vec3, Vec4};

pub type Vector2 = Vec2;
pub type Vector3 = Vec3;
pub type Vector4 = Vec4;
pub type Matrix4 = Mat4;
pub type Vector2i = IVec2;
pub type Vector3i = IVec3;
pub type Vector4i = IVec4;

pub const PI: f32 = std::f32::consts::PI;

/// World-space up axis used by look-at transforms.
pub const WORLD_UP: Vector3 = Vec3::Y;

#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees.to_radians()
}

#[inline]
pub fn to_degrees(radians: f32) -> f32 {
    radians.to_degrees()
}
