use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};

/// Current input state for a single window.
///
/// Holds "is down" information and current pointer position.
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // On focus loss, clear "down" sets to avoid stuck keys/buttons.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                // The first position after entering carries no motion.
                if let Some((px, py)) = self.pointer_pos {
                    frame.pointer_delta.0 += x - px;
                    frame.pointer_delta.1 += y - py;
                }
                self.pointer_pos = Some((x, y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(key) {
                        frame.keys_pressed.insert(key);
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(&key);
                }
            },

            InputEvent::PointerButton { button, state } => match state {
                MouseButtonState::Pressed => {
                    self.buttons_down.insert(button);
                }
                MouseButtonState::Released => {
                    self.buttons_down.remove(&button);
                }
            },

            InputEvent::MouseWheel(delta) => {
                frame.wheel_lines += delta.lines_y();
            }
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    fn apply(state: &mut InputState, frame: &mut InputFrame, ev: InputEvent) {
        state.apply_event(frame, ev);
    }

    #[test]
    fn key_press_is_reported_once() {
        let (mut s, mut f) = (InputState::default(), InputFrame::default());
        let press = InputEvent::Key { key: Key::W, state: KeyState::Pressed, repeat: false };
        apply(&mut s, &mut f, press.clone());
        apply(&mut s, &mut f, InputEvent::Key { key: Key::W, state: KeyState::Pressed, repeat: true });
        assert!(f.key_pressed(Key::W));
        assert!(s.key_down(Key::W));

        f.clear();
        apply(&mut s, &mut f, InputEvent::Key { key: Key::W, state: KeyState::Pressed, repeat: true });
        assert!(!f.key_pressed(Key::W), "held key is not a new press");
    }

    #[test]
    fn pointer_delta_accumulates_after_first_position() {
        let (mut s, mut f) = (InputState::default(), InputFrame::default());
        apply(&mut s, &mut f, InputEvent::PointerMoved { x: 10.0, y: 10.0 });
        assert_eq!(f.pointer_delta, (0.0, 0.0));
        apply(&mut s, &mut f, InputEvent::PointerMoved { x: 15.0, y: 8.0 });
        apply(&mut s, &mut f, InputEvent::PointerMoved { x: 20.0, y: 9.0 });
        assert_eq!(f.pointer_delta, (10.0, -1.0));

        f.clear();
        assert_eq!(f.pointer_delta, (0.0, 0.0));
    }

    #[test]
    fn pointer_leave_resets_motion_baseline() {
        let (mut s, mut f) = (InputState::default(), InputFrame::default());
        apply(&mut s, &mut f, InputEvent::PointerMoved { x: 0.0, y: 0.0 });
        apply(&mut s, &mut f, InputEvent::PointerLeft);
        apply(&mut s, &mut f, InputEvent::PointerMoved { x: 300.0, y: 300.0 });
        assert_eq!(f.pointer_delta, (0.0, 0.0));
    }

    #[test]
    fn wheel_lines_sum_both_delta_kinds() {
        let (mut s, mut f) = (InputState::default(), InputFrame::default());
        apply(&mut s, &mut f, InputEvent::MouseWheel(MouseWheelDelta::Line { x: 0.0, y: 1.0 }));
        apply(&mut s, &mut f, InputEvent::MouseWheel(MouseWheelDelta::Pixel { x: 0.0, y: 40.0 }));
        assert!((f.wheel_lines - 3.0).abs() < 1e-6);
    }

    #[test]
    fn focus_loss_releases_held_inputs() {
        let (mut s, mut f) = (InputState::default(), InputFrame::default());
        apply(&mut s, &mut f, InputEvent::PointerButton {
            button: MouseButton::Left,
            state: MouseButtonState::Pressed,
        });
        assert!(s.button_down(MouseButton::Left));
        apply(&mut s, &mut f, InputEvent::Focused(false));
        assert!(!s.button_down(MouseButton::Left));
    }
}
