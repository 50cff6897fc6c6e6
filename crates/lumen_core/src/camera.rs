//! Free-look perspective camera.
//!
//! Unlike [`crate::Transform`], the camera recomputes eagerly: the projection
//! on [`Camera::update_projection`] (construction and every resize) and the
//! view on [`Camera::update`] or any explicit pose change.  Getters only hand
//! out the cached matrices.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::controller::Controller;
use crate::input::InputState;

/// Pitch is kept just short of straight up / down so the view basis never
/// degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Lens parameters that stay fixed across resizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.01,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    /// Radians around world Y; `0` looks down `-Z`.
    yaw: f32,
    /// Radians around the camera X axis; positive looks up.
    pitch: f32,
    lens: Lens,
    aspect: f32,

    view: Mat4,
    projection: Mat4,

    pub controller: Controller,
}

impl Camera {
    /// Camera at `position` looking down `-Z`.
    pub fn new(position: Vec3, aspect: f32, lens: Lens) -> Self {
        let mut cam = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            lens,
            aspect,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            controller: Controller::with_default_bindings(),
        };
        cam.update_view();
        cam.update_projection(aspect);
        cam
    }

    /// Same as [`Camera::new`] but pre-rotated to face `target`.
    pub fn looking_at(position: Vec3, target: Vec3, aspect: f32, lens: Lens) -> Self {
        let mut cam = Self::new(position, aspect, lens);
        let dir = (target - position).normalize_or_zero();
        if dir != Vec3::ZERO {
            cam.yaw = (-dir.x).atan2(-dir.z);
            cam.pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
            cam.update_view();
        }
        cam
    }

    // ── Matrices ────────────────────────────────────────────────────────────

    #[inline]
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    #[inline]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Rebuilds the projection for a new `width / height` ratio.  Degenerate
    /// ratios (zero-sized or minimised windows) are ignored.
    pub fn update_projection(&mut self, aspect: f32) {
        if !aspect.is_finite() || aspect <= 0.0 {
            log::debug!("ignoring degenerate aspect ratio {aspect}");
            return;
        }
        self.aspect = aspect;
        self.projection =
            Mat4::perspective_rh(self.lens.fov_y, aspect, self.lens.near, self.lens.far);
    }

    fn update_view(&mut self) {
        self.view = Mat4::look_to_rh(self.position, self.forward(), Vec3::Y);
    }

    // ── Pose ────────────────────────────────────────────────────────────────

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    #[inline]
    pub fn lens(&self) -> Lens {
        self.lens
    }

    /// `(yaw, pitch)` in radians.
    #[inline]
    pub fn orientation(&self) -> (f32, f32) {
        (self.yaw, self.pitch)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view();
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_view();
    }

    fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    // ── Per-frame input ─────────────────────────────────────────────────────

    /// Integrates one frame of free-look input, then rebuilds the view.
    ///
    /// Held keys move the camera along its own axes (vertical motion stays
    /// along world `Y`); dragging with the controller's look button turns it.
    pub fn update(&mut self, dt: f32, input: &mut InputState) {
        let dir = self.controller.direction(input);
        if dir.length_squared() > 1e-6 {
            let step = self.controller.current_speed(input) * dt;
            self.position += (self.forward() * dir.z + self.right() * dir.x + Vec3::Y * dir.y)
                .normalize_or_zero()
                * step;
        }

        if input.is_button_down(self.controller.look_button) {
            let (dx, dy) = input.consume_mouse_delta();
            let sens = self.controller.mouse_sensitivity;
            self.yaw -= dx * sens;
            self.pitch = (self.pitch - dy * sens).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;

    #[test]
    fn resize_changes_projection_only() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, -5.0), 16.0 / 9.0, Lens::default());
        let view = *cam.view();
        let before = cam.projection().x_axis.x;

        cam.update_projection(4.0 / 3.0);

        assert_ne!(cam.projection().x_axis.x, before);
        assert_eq!(*cam.view(), view);
        let f = 1.0 / (Lens::default().fov_y * 0.5).tan();
        assert!((cam.projection().x_axis.x - f / (4.0 / 3.0)).abs() < 1e-5);
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut cam = Camera::new(Vec3::ZERO, 2.0, Lens::default());
        let proj = *cam.projection();
        cam.update_projection(0.0);
        assert_eq!(*cam.projection(), proj);
        assert_eq!(cam.aspect(), 2.0);
    }

    #[test]
    fn forward_key_moves_along_view_direction() {
        let mut cam = Camera::new(Vec3::ZERO, 1.0, Lens::default());
        let mut input = InputState::new();
        input.update_key(KeyCode::KeyW, true);
        cam.update(0.5, &mut input);
        assert!((cam.position() - Vec3::new(0.0, 0.0, -2.5)).length() < 1e-5);
        // origin is now 2.5 units behind the camera (view space looks down -Z)
        let p = cam.view().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, 2.5)).length() < 1e-5);
    }

    #[test]
    fn mouse_drag_turns_and_clamps_pitch() {
        let mut cam = Camera::new(Vec3::ZERO, 1.0, Lens::default());
        let mut input = InputState::new();
        input.update_mouse_button(cam.controller.look_button, true);
        input.set_mouse_position(0.0, 0.0);
        input.set_mouse_position(0.0, -10_000.0);
        cam.update(0.016, &mut input);
        let (_, pitch) = cam.orientation();
        assert!((pitch - PITCH_LIMIT).abs() < 1e-6);
        assert!(cam.forward().y > 0.99);
    }

    #[test]
    fn looking_at_faces_target() {
        let cam = Camera::looking_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, 5.0),
            1.0,
            Lens::default(),
        );
        assert!((cam.forward() - Vec3::X).length() < 1e-5);
    }
}
