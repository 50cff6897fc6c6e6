//! Sky box drawn after every entity.
//!
//! An inside-out unit cube rendered with the `sky` shader pair: the vertex
//! stage strips the view translation and pushes the cube to the far plane,
//! so it only fills pixels no entity covered.

use std::sync::Arc;

use glam::Vec3;
use lumen_core::Color;

use crate::error::RenderError;
use crate::frame::{CameraPacket, FrameCommand, FrameRecorder};
use crate::geometry::GeometryBuffer;
use crate::handle::{SamplerId, ShaderPairId, TextureId};
use crate::payload::SkyVertexData;
use crate::resources::texture::rgba8;
use crate::staging::ShaderStage;

pub struct Sky {
    pub mesh: Arc<GeometryBuffer>,
    pub shaders: ShaderPairId,
    pub cubemap: TextureId,
    pub sampler: SamplerId,
}

impl Sky {
    pub fn draw(&self, rec: &mut FrameRecorder<'_>, camera: &CameraPacket) -> Result<(), RenderError> {
        rec.set_shaders(self.shaders);
        rec.push(FrameCommand::BindTexture {
            slot: 0,
            texture: self.cubemap,
        });
        rec.push(FrameCommand::BindSampler {
            slot: 0,
            sampler: self.sampler,
        });
        rec.stage(&SkyVertexData::new(camera), ShaderStage::Vertex, 0)?;
        self.mesh.draw(rec.plan_mut());
        Ok(())
    }
}

/// Colours of a generated gradient sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyGradient {
    pub zenith: Color,
    pub horizon: Color,
    pub ground: Color,
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            zenith: Color::rgb(0.16, 0.32, 0.65),
            horizon: Color::rgb(0.75, 0.82, 0.9),
            ground: Color::rgb(0.22, 0.2, 0.18),
        }
    }
}

impl SkyGradient {
    pub fn color(&self, dir: Vec3) -> Color {
        let y = dir.normalize_or_zero().y;
        if y >= 0.0 {
            self.horizon.lerp(self.zenith, y)
        } else {
            self.horizon.lerp(self.ground, -y)
        }
    }

    /// Six `size`×`size` RGBA8 faces in `+X, -X, +Y, -Y, +Z, -Z` order.
    pub fn faces(&self, size: u32) -> [Vec<u8>; 6] {
        std::array::from_fn(|face| {
            let mut out = Vec::with_capacity(size as usize * size as usize * 4);
            for y in 0..size {
                for x in 0..size {
                    let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                    let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                    out.extend_from_slice(&rgba8(self.color(face_direction(face, u, v))));
                }
            }
            out
        })
    }
}

/// Direction through texel `(u, v)` in `[-1, 1]` of cube face `face`.
/// `v` grows downwards, matching texture row order.
fn face_direction(face: usize, u: f32, v: f32) -> Vec3 {
    match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texel(face: &[u8], size: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * size + x) * 4) as usize;
        [face[i], face[i + 1], face[i + 2], face[i + 3]]
    }

    #[test]
    fn poles_take_zenith_and_ground() {
        let g = SkyGradient::default();
        let faces = g.faces(3);
        assert!(faces.iter().all(|f| f.len() == 3 * 3 * 4));
        assert_eq!(texel(&faces[2], 3, 1, 1), rgba8(g.zenith));
        assert_eq!(texel(&faces[3], 3, 1, 1), rgba8(g.ground));
    }

    #[test]
    fn side_faces_are_upright() {
        let g = SkyGradient {
            zenith: Color::WHITE,
            horizon: Color::rgb(0.5, 0.5, 0.5),
            ground: Color::BLACK,
        };
        let faces = g.faces(8);
        for face in [0, 1, 4, 5] {
            let top = texel(&faces[face], 8, 4, 0)[0];
            let bottom = texel(&faces[face], 8, 4, 7)[0];
            assert!(top > bottom, "face {face}: top {top} bottom {bottom}");
        }
    }
}
