use crate::device::Gfx;
use crate::input::{InputFrame, Key};
use crate::time::FrameTime;
use crate::window::Window;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
pub struct FrameCtx<'a> {
    window: &'a Window,

    /// Key transitions since the previous frame.
    pub input: &'a InputFrame,
    pub time: FrameTime,
}

impl<'a> FrameCtx<'a> {
    pub(crate) fn new(window: &'a Window, input: &'a InputFrame, time: FrameTime) -> Self {
        Self {
            window,
            input,
            time,
        }
    }

    pub fn gfx(&self) -> &'a Gfx {
        self.window.gfx()
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.window.key_down(key)
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.window.size()
    }

    /// Width over height; 1 for a collapsed window.
    pub fn aspect_ratio(&self) -> f32 {
        match self.size() {
            (w, h) if w > 0 && h > 0 => w as f32 / h as f32,
            _ => 1.0,
        }
    }
}
