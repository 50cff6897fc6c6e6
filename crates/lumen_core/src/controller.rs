use std::collections::HashMap;

use glam::Vec3;

use crate::input::{InputState, KeyCode, MouseButton};

/// Key bindings and motion parameters for a free-look camera.
///
/// Directions are in camera space: `+Z` forward, `+X` right, `+Y` up.
///
/// # Example
/// ```rust,ignore
/// use lumen_core::{Controller, KeyCode};
/// use glam::Vec3;
///
/// let mut controller = Controller::with_default_bindings();
/// controller.bind(KeyCode::ArrowUp, Vec3::Z);
/// controller.speed = 2.0;
/// ```
#[derive(Debug, Clone)]
pub struct Controller {
    mappings: HashMap<KeyCode, Vec3>,

    /// World units per second.  Default: `5.0`
    pub speed: f32,

    /// Multiplier while [`Controller::fast_key`] is held.  Default: `4.0`
    pub fast_multiplier: f32,

    /// Multiplier while [`Controller::slow_key`] is held.  Default: `0.25`
    pub slow_multiplier: f32,

    pub fast_key: KeyCode,
    pub slow_key: KeyCode,

    /// Radians per pixel of mouse drag.  Default: `0.005`
    pub mouse_sensitivity: f32,

    /// Button that has to be held for mouse look.
    pub look_button: MouseButton,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// No key bindings, default speeds.
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
            speed: 5.0,
            fast_multiplier: 4.0,
            slow_multiplier: 0.25,
            fast_key: KeyCode::ShiftLeft,
            slow_key: KeyCode::ControlLeft,
            mouse_sensitivity: 0.005,
            look_button: MouseButton::Left,
        }
    }

    /// WASD for planar motion, Space / Q for up / down.
    pub fn with_default_bindings() -> Self {
        let mut ctl = Self::new();
        ctl.bind(KeyCode::KeyW, Vec3::Z);
        ctl.bind(KeyCode::KeyS, Vec3::NEG_Z);
        ctl.bind(KeyCode::KeyA, Vec3::NEG_X);
        ctl.bind(KeyCode::KeyD, Vec3::X);
        ctl.bind(KeyCode::Space, Vec3::Y);
        ctl.bind(KeyCode::KeyQ, Vec3::NEG_Y);
        ctl
    }

    /// Binds `key` to a camera-space direction, replacing any earlier binding.
    pub fn bind(&mut self, key: KeyCode, dir: Vec3) {
        self.mappings.insert(key, dir);
    }

    pub fn unbind(&mut self, key: KeyCode) {
        self.mappings.remove(&key);
    }

    /// Sum of the directions whose keys are held.  Not normalised.
    pub fn direction(&self, input: &InputState) -> Vec3 {
        self.mappings
            .iter()
            .filter(|(key, _)| input.is_key_pressed(**key))
            .fold(Vec3::ZERO, |acc, (_, dir)| acc + *dir)
    }

    /// Effective speed for the modifier keys currently held.
    pub fn current_speed(&self, input: &InputState) -> f32 {
        let mut speed = self.speed;
        if input.is_key_pressed(self.fast_key) {
            speed *= self.fast_multiplier;
        }
        if input.is_key_pressed(self.slow_key) {
            speed *= self.slow_multiplier;
        }
        speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_sums_held_keys() {
        let ctl = Controller::with_default_bindings();
        let mut input = InputState::new();
        input.update_key(KeyCode::KeyW, true);
        input.update_key(KeyCode::KeyD, true);
        assert_eq!(ctl.direction(&input), Vec3::new(1.0, 0.0, 1.0));
        input.update_key(KeyCode::KeyS, true);
        assert_eq!(ctl.direction(&input), Vec3::X);
    }

    #[test]
    fn modifiers_scale_speed() {
        let ctl = Controller::new();
        let mut input = InputState::new();
        assert_eq!(ctl.current_speed(&input), 5.0);
        input.update_key(KeyCode::ShiftLeft, true);
        assert_eq!(ctl.current_speed(&input), 20.0);
    }
}
