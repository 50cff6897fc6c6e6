//! Scene lights in the exact layout the lit shader reads.
//!
//! A [`Light`] is 64 bytes: four 16-byte rows, each a `vec3` packed with one
//! scalar, then the two cone angles and explicit padding.  The matching WGSL
//! declaration lives in `assets/shaders/lit.wgsl`; field order and padding
//! must stay identical on both sides.

use glam::Vec3;

use crate::error::CapacityError;

/// Number of lights the pixel payload carries.  The shader declares an
/// `array<Light, 5>` of the same length.
pub const MAX_LIGHTS: usize = 5;

/// Light kind tag as stored in [`Light::kind`].
///
/// Specular variants are accepted and round-trip through the payload, but the
/// lit shader currently shades them exactly like their matte counterparts.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    DirectionalMatte = 0,
    DirectionalSpecular = 1,
    PointMatte = 2,
    PointSpecular = 3,
    SpotMatte = 4,
    SpotSpecular = 5,
}

impl LightKind {
    pub fn is_specular(self) -> bool {
        (self as i32) % 2 == 1
    }

    /// Same geometric kind with the specular flag set.
    pub fn specular(self) -> Self {
        match self {
            Self::DirectionalMatte | Self::DirectionalSpecular => Self::DirectionalSpecular,
            Self::PointMatte | Self::PointSpecular => Self::PointSpecular,
            Self::SpotMatte | Self::SpotSpecular => Self::SpotSpecular,
        }
    }
}

impl TryFrom<i32> for LightKind {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        Ok(match value {
            0 => Self::DirectionalMatte,
            1 => Self::DirectionalSpecular,
            2 => Self::PointMatte,
            3 => Self::PointSpecular,
            4 => Self::SpotMatte,
            5 => Self::SpotSpecular,
            other => return Err(other),
        })
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Light {
    /// Directional and spot lights.
    pub direction: [f32; 3],
    /// A [`LightKind`] discriminant.
    pub kind: i32,
    /// Point and spot lights.
    pub position: [f32; 3],
    /// Attenuation range of point and spot lights.
    pub range: f32,
    pub color: [f32; 3],
    pub intensity: f32,
    /// Full intensity inside this cone (radians).
    pub spot_inner_angle: f32,
    /// No light outside this cone (radians).
    pub spot_outer_angle: f32,
    pub padding: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<Light>() == 64);

impl Default for Light {
    /// A black directional light: present in the array, contributes nothing.
    fn default() -> Self {
        Self::directional(Vec3::NEG_Y, Vec3::ONE, 0.0)
    }
}

impl Light {
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero().to_array(),
            kind: LightKind::DirectionalMatte as i32,
            position: [0.0; 3],
            range: 0.0,
            color: color.to_array(),
            intensity,
            spot_inner_angle: 0.0,
            spot_outer_angle: 0.0,
            padding: [0.0; 2],
        }
    }

    pub fn point(position: Vec3, range: f32, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::PointMatte as i32,
            position: position.to_array(),
            range,
            ..Self::directional(Vec3::ZERO, color, intensity)
        }
    }

    /// Cone angles are in radians; `inner <= outer`.
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        range: f32,
        (inner, outer): (f32, f32),
        color: Vec3,
        intensity: f32,
    ) -> Self {
        Self {
            kind: LightKind::SpotMatte as i32,
            position: position.to_array(),
            range,
            spot_inner_angle: inner,
            spot_outer_angle: outer,
            ..Self::directional(direction, color, intensity)
        }
    }

    /// Switches to the specular variant of the current kind.
    pub fn with_specular(mut self) -> Self {
        if let Some(kind) = self.kind() {
            self.kind = kind.specular() as i32;
        }
        self
    }

    /// Decoded kind, `None` if the raw tag is not a known variant.
    pub fn kind(&self) -> Option<LightKind> {
        LightKind::try_from(self.kind).ok()
    }

    pub fn color(&self) -> Vec3 {
        Vec3::from_array(self.color)
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color.to_array();
    }
}

/// Exactly [`MAX_LIGHTS`] lights with bounds-checked access.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightArray {
    lights: [Light; MAX_LIGHTS],
}

impl LightArray {
    pub fn new(lights: [Light; MAX_LIGHTS]) -> Self {
        Self { lights }
    }

    pub fn get(&self, index: usize) -> Result<&Light, CapacityError> {
        let i = CapacityError::check("light", index, MAX_LIGHTS)?;
        Ok(&self.lights[i])
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Light, CapacityError> {
        let i = CapacityError::check("light", index, MAX_LIGHTS)?;
        Ok(&mut self.lights[i])
    }

    pub fn set(&mut self, index: usize, light: Light) -> Result<(), CapacityError> {
        *self.get_mut(index)? = light;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    /// The whole array, ready to be copied into a GPU payload.
    #[inline]
    pub fn as_array(&self) -> &[Light; MAX_LIGHTS] {
        &self.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn layout_matches_shader_rows() {
        assert_eq!(offset_of!(Light, direction), 0);
        assert_eq!(offset_of!(Light, kind), 12);
        assert_eq!(offset_of!(Light, position), 16);
        assert_eq!(offset_of!(Light, range), 28);
        assert_eq!(offset_of!(Light, color), 32);
        assert_eq!(offset_of!(Light, intensity), 44);
        assert_eq!(offset_of!(Light, spot_inner_angle), 48);
        assert_eq!(offset_of!(Light, spot_outer_angle), 52);
        assert_eq!(std::mem::size_of::<[Light; MAX_LIGHTS]>() % 16, 0);
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(
            Light::directional(Vec3::X, Vec3::ONE, 1.0).kind(),
            Some(LightKind::DirectionalMatte)
        );
        let spot = Light::spot(Vec3::ZERO, Vec3::NEG_Y, 10.0, (0.2, 0.4), Vec3::ONE, 2.0);
        assert_eq!(spot.kind(), Some(LightKind::SpotMatte));
        assert_eq!(spot.with_specular().kind(), Some(LightKind::SpotSpecular));
        assert!(LightKind::PointSpecular.is_specular());
        assert_eq!(LightKind::try_from(9), Err(9));
    }

    #[test]
    fn array_access_is_bounds_checked() {
        let mut lights = LightArray::default();
        assert!(lights.set(4, Light::point(Vec3::ONE, 5.0, Vec3::X, 1.0)).is_ok());
        let err = lights.set(MAX_LIGHTS, Light::default()).unwrap_err();
        assert_eq!(err.index, MAX_LIGHTS);
        assert_eq!(err.capacity, MAX_LIGHTS);
        assert!(lights.get(7).is_err());
        assert_eq!(lights.get(4).map(|l| l.range), Ok(5.0));
    }
}
