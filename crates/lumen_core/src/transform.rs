//! Per-object transform with lazily cached world matrices.
//!
//! Every mutator bumps a dirty counter.  The first matrix getter that observes
//! a non-zero counter rebuilds **both** the world matrix and its inverse
//! transpose, then clears the counter, so the two are never out of step with
//! each other or with the last-set position / rotation / scale.
//!
//! # Example
//! ```rust,ignore
//! use lumen_core::Transform;
//! use glam::Vec3;
//!
//! let mut t = Transform::default();
//! t.set_position(Vec3::new(1.0, 0.0, 0.0));
//! t.rotate(Vec3::new(0.0, 0.5, 0.0));
//! let world = t.world_matrix(); // rebuilt once here
//! let again = t.world_matrix(); // cached
//! assert_eq!(world, again);
//! ```

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, pitch/yaw/roll rotation (radians) and scale of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    /// `x` = pitch, `y` = yaw, `z` = roll.
    rotation: Vec3,
    scale: Vec3,

    world: Mat4,
    world_inverse_transpose: Mat4,
    /// Number of mutations since the matrices were last rebuilt.
    dirty: u32,
    #[cfg(test)]
    rebuilds: u32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            world: Mat4::IDENTITY,
            world_inverse_transpose: Mat4::IDENTITY,
            dirty: 0,
            #[cfg(test)]
            rebuilds: 0,
        }
    }
}

impl Transform {
    /// Transform placed at `position` with no rotation and unit scale.
    pub fn from_position(position: Vec3) -> Self {
        let mut t = Self::default();
        t.set_position(position);
        t
    }

    // ── Absolute setters ────────────────────────────────────────────────────

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty += 1;
    }

    /// Sets pitch (`x`), yaw (`y`) and roll (`z`) in radians.
    pub fn set_rotation(&mut self, pitch_yaw_roll: Vec3) {
        self.rotation = pitch_yaw_roll;
        self.dirty += 1;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty += 1;
    }

    // ── Relative mutators ───────────────────────────────────────────────────

    /// Offsets the position in world space.
    pub fn move_absolute(&mut self, offset: Vec3) {
        self.position += offset;
        self.dirty += 1;
    }

    /// Adds to pitch / yaw / roll.
    pub fn rotate(&mut self, pitch_yaw_roll: Vec3) {
        self.rotation += pitch_yaw_roll;
        self.dirty += 1;
    }

    /// Multiplies the current scale component-wise.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
        self.dirty += 1;
    }

    // ── Getters ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn pitch_yaw_roll(&self) -> Vec3 {
        self.rotation
    }

    #[inline]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// `true` when a mutator ran after the last matrix rebuild.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// World matrix `T * R * S` (scale applied first, then roll-pitch-yaw
    /// rotation, then translation).
    pub fn world_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.world
    }

    /// Inverse transpose of the world matrix, used to transform normals.
    pub fn world_inverse_transpose_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.world_inverse_transpose
    }

    fn refresh(&mut self) {
        if self.dirty == 0 {
            return;
        }
        self.world = compose(self.position, self.rotation, self.scale);
        self.world_inverse_transpose = self.world.inverse().transpose();
        self.dirty = 0;
        #[cfg(test)]
        {
            self.rebuilds += 1;
        }
    }
}

/// Roll about Z, then pitch about X, then yaw about Y.
#[inline]
pub fn rotation_roll_pitch_yaw(pitch_yaw_roll: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        pitch_yaw_roll.y,
        pitch_yaw_roll.x,
        pitch_yaw_roll.z,
    )
}

fn compose(position: Vec3, pitch_yaw_roll: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_quat(rotation_roll_pitch_yaw(pitch_yaw_roll))
        * Mat4::from_scale(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(p: Vec3, r: Vec3, s: Vec3) -> Mat4 {
        Mat4::from_translation(p)
            * Mat4::from_rotation_y(r.y)
            * Mat4::from_rotation_x(r.x)
            * Mat4::from_rotation_z(r.z)
            * Mat4::from_scale(s)
    }

    #[test]
    fn identity_by_default() {
        let mut t = Transform::default();
        assert!(t.world_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
        assert!(t
            .world_inverse_transpose_matrix()
            .abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn matrix_reflects_last_set_values() {
        let mut t = Transform::default();
        t.set_position(Vec3::new(9.0, 9.0, 9.0));
        t.set_scale(Vec3::splat(4.0));
        t.move_absolute(Vec3::new(1.0, 0.0, 0.0));
        t.set_position(Vec3::new(1.0, 2.0, 3.0));
        t.rotate(Vec3::new(0.1, 0.2, 0.3));
        t.rotate(Vec3::new(0.1, 0.0, 0.0));
        t.set_scale(Vec3::new(2.0, 1.0, 1.0));
        t.scale_by(Vec3::new(1.0, 3.0, 1.0));

        let want = expected(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.2, 0.2, 0.3),
            Vec3::new(2.0, 3.0, 1.0),
        );
        assert!(t.world_matrix().abs_diff_eq(want, 1e-5));
    }

    #[test]
    fn rebuilds_once_per_batch_of_mutations() {
        let mut t = Transform::default();
        t.set_position(Vec3::X);
        t.rotate(Vec3::Y);
        t.scale_by(Vec3::splat(2.0));
        assert!(t.is_dirty());

        let a = t.world_matrix();
        let b = t.world_inverse_transpose_matrix();
        let c = t.world_matrix();
        assert_eq!(t.rebuilds, 1);
        assert_eq!(a, c);
        assert!(b.abs_diff_eq(a.inverse().transpose(), 1e-5));
        assert!(!t.is_dirty());

        t.move_absolute(Vec3::Z);
        let d = t.world_matrix();
        assert_eq!(t.rebuilds, 2);
        assert!((d.w_axis.truncate() - Vec3::new(1.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn inverse_transpose_refreshes_without_world_getter() {
        let mut t = Transform::default();
        t.set_scale(Vec3::new(2.0, 4.0, 8.0));
        let it = t.world_inverse_transpose_matrix();
        assert!(it.abs_diff_eq(Mat4::from_scale(Vec3::new(0.5, 0.25, 0.125)), 1e-6));
        assert_eq!(t.rebuilds, 1);
    }

    #[test]
    fn scale_is_multiplicative() {
        let mut t = Transform::default();
        t.set_scale(Vec3::new(2.0, 2.0, 2.0));
        t.scale_by(Vec3::new(0.5, 2.0, 1.0));
        assert_eq!(t.scale(), Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(t.pitch_yaw_roll(), Vec3::ZERO);
    }
}
