//! Keyboard input.
//!
//! Public API is platform-agnostic and does not expose winit types. The window
//! translates platform key events into [`KeyEvent`]s and feeds them through
//! [`InputState::apply`].

mod frame;
mod state;
mod types;

pub(crate) mod platform {
    pub(crate) mod winit;
}

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{Key, KeyEvent, KeyState};
