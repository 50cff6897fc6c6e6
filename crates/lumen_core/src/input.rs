use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::PhysicalKey;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Keyboard and mouse state, fed from winit window events by the runner and
/// read by cameras and app code during the update phase.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    /// Keys that went down since the last [`InputState::end_frame`].
    keys_pressed: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    mouse_pos: Option<(f64, f64)>,
    /// Accumulated cursor motion since the last `consume_mouse_delta`.
    mouse_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Default::default()
    }

    /// Folds one winit event into the state.  Returns `true` if it was an
    /// input event.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.update_key(code, event.state == ElementState::Pressed);
                }
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.update_mouse_button(*button, *state == ElementState::Pressed);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.set_mouse_position(position.x, position.y);
                true
            }
            WindowEvent::Focused(false) => {
                // keys released while unfocused never reach us
                self.keys_down.clear();
                self.mouse_buttons.clear();
                true
            }
            _ => false,
        }
    }

    pub fn update_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// `true` while `key` is held.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// `true` only during the frame in which `key` went down.
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn update_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.mouse_buttons.insert(button);
        } else {
            self.mouse_buttons.remove(&button);
        }
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Records the cursor position in window coordinates.  The first sample
    /// only establishes the origin and produces no motion.
    pub fn set_mouse_position(&mut self, x: f64, y: f64) {
        if let Some((px, py)) = self.mouse_pos {
            self.mouse_delta.0 += (x - px) as f32;
            self.mouse_delta.1 += (y - py) as f32;
        }
        self.mouse_pos = Some((x, y));
    }

    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse_pos.unwrap_or((0.0, 0.0))
    }

    /// Returns and resets the cursor motion accumulated since the last call.
    pub fn consume_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Clears per-frame edge state.  Called by the runner after drawing.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_delta = (0.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_tracking() {
        let mut state = InputState::new();
        assert!(!state.is_key_pressed(KeyCode::KeyA));
        state.update_key(KeyCode::KeyA, true);
        assert!(state.is_key_pressed(KeyCode::KeyA));
        assert!(state.just_pressed(KeyCode::KeyA));

        state.end_frame();
        state.update_key(KeyCode::KeyA, true); // key repeat
        assert!(!state.just_pressed(KeyCode::KeyA));

        state.update_key(KeyCode::KeyA, false);
        assert!(!state.is_key_pressed(KeyCode::KeyA));
    }

    #[test]
    fn mouse_motion_accumulates_until_consumed() {
        let mut state = InputState::new();
        state.set_mouse_position(10.0, 20.0);
        assert_eq!(state.consume_mouse_delta(), (0.0, 0.0));

        state.set_mouse_position(15.0, 25.0);
        state.set_mouse_position(17.0, 24.0);
        assert_eq!(state.mouse_position(), (17.0, 24.0));
        assert_eq!(state.consume_mouse_delta(), (7.0, 4.0));
        assert_eq!(state.consume_mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn buttons() {
        let mut state = InputState::new();
        state.update_mouse_button(MouseButton::Left, true);
        assert!(state.is_button_down(MouseButton::Left));
        state.update_mouse_button(MouseButton::Left, false);
        assert!(!state.is_button_down(MouseButton::Left));
    }
}
