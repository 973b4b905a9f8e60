use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{Key, KeyEvent, KeyState};

/// Held keys and focus of one window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a key event and records it in `frame` when it is a transition.
    ///
    /// Returns the transition, if any: a press of a key not held, or a release
    /// of a held key. Repeats and unmatched releases return `None`.
    pub fn apply(&mut self, frame: &mut InputFrame, event: KeyEvent) -> Option<KeyEvent> {
        if event.repeat {
            return None;
        }

        let changed = match event.state {
            KeyState::Pressed => self.keys_down.insert(event.key),
            KeyState::Released => self.keys_down.remove(&event.key),
        };

        if !changed {
            return None;
        }

        frame.push(event);
        Some(event)
    }

    /// Updates focus. Losing focus releases every held key, returned in no
    /// particular order.
    pub fn set_focused(&mut self, frame: &mut InputFrame, focused: bool) -> Vec<KeyEvent> {
        self.focused = focused;
        if focused {
            return Vec::new();
        }

        let released: Vec<KeyEvent> = self.keys_down.drain().map(KeyEvent::released).collect();
        for event in &released {
            frame.push(*event);
        }
        released
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}
