use glam::Vec3;

use super::push_face;
use crate::geometry::MeshData;

/// Unit cube: 24 vertices (4 per face, so every face gets its own normal and
/// UVs) and 36 indices.
pub fn cube() -> MeshData {
    let mut mesh = MeshData::default();
    #[rustfmt::skip]
    let faces = [
        (Vec3::Z,     Vec3::X,     Vec3::Y),     // front
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),     // back
        (Vec3::X,     Vec3::NEG_Z, Vec3::Y),     // right
        (Vec3::NEG_X, Vec3::Z,     Vec3::Y),     // left
        (Vec3::Y,     Vec3::X,     Vec3::NEG_Z), // top
        (Vec3::NEG_Y, Vec3::X,     Vec3::Z),     // bottom
    ];
    for (normal, right, up) in faces {
        push_face(&mut mesh, normal * 0.5, right, up, 0.5);
    }
    mesh
}
