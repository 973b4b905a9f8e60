use anyhow::Result;

use crate::device::Gfx;
use crate::input::Key;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`run`](super::run).
pub trait App {
    /// Called once, after the window and its GL context exist. GPU resources
    /// are created here.
    fn init(&mut self, gfx: &Gfx) -> Result<()>;

    /// Called for every key press or release, before the frame.
    fn on_key(&mut self, gfx: &Gfx, key: Key, pressed: bool) -> AppControl {
        let _ = (gfx, key, pressed);
        AppControl::Continue
    }

    /// Called once per frame, between event polling and the buffer swap.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;
}
