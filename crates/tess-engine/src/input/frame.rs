use std::collections::HashSet;

use super::types::Key;

/// Per-frame input deltas.
///
/// `InputState` provides the current state (held keys/buttons, pointer position).
/// `InputFrame` provides the transitions accumulated since the last frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Keys pressed this frame (repeats excluded).
    pub keys_pressed: HashSet<Key>,

    /// Pointer motion this frame, in logical pixels.
    pub pointer_delta: (f32, f32),

    /// Vertical wheel motion this frame, in lines.
    pub wheel_lines: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.pointer_delta = (0.0, 0.0);
        self.wheel_lines = 0.0;
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_drops_all_deltas() {
        let mut f = InputFrame {
            pointer_delta: (3.0, -2.0),
            wheel_lines: 1.5,
            ..Default::default()
        };
        f.keys_pressed.insert(Key::T);
        f.clear();
        assert!(!f.key_pressed(Key::T));
        assert_eq!(f.pointer_delta, (0.0, 0.0));
        assert_eq!(f.wheel_lines, 0.0);
    }
}
