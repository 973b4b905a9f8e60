use std::collections::HashSet;

use super::types::{Key, KeyEvent};

/// Key transitions observed since the last [`Window::take_frame`].
///
/// [`Window::take_frame`]: crate::window::Window::take_frame
#[derive(Debug, Default, Clone)]
pub struct InputFrame {
    /// Transitions in arrival order. Auto-repeats are not transitions.
    pub events: Vec<KeyEvent>,

    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }

    pub(crate) fn push(&mut self, event: KeyEvent) {
        if event.state.is_pressed() {
            self.keys_pressed.insert(event.key);
        } else {
            self.keys_released.insert(event.key);
        }
        self.events.push(event);
    }
}
