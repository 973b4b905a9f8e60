//! gfxl: a small OpenGL abstraction for demos and tools.
//!
//! Resource handles (`Shader`, `Mesh`, `Texture2D`, `Cubemap`, `Camera`,
//! `SpriteAtlas`) own their driver objects and release them on drop. Every
//! handle is created from a [`Gfx`] context, which a [`Window`] provides for
//! the real driver and [`HeadlessBackend`] provides without a GPU.

pub mod core;
pub mod device;
pub mod error;
pub mod input;
pub mod logging;
pub mod math;
pub mod model;
pub mod render;
pub mod time;
pub mod window;

pub use device::{Capability, Gfx, HeadlessBackend, Primitive, ShaderStage};
pub use error::{GfxError, Result};
pub use render::{Camera, Cubemap, Mesh, Shader, SpriteAtlas, Texture2D};
pub use window::{Window, WindowSettings};
