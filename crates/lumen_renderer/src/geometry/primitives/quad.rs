use glam::Vec3;

use super::push_face;
use crate::geometry::MeshData;

/// Unit quad in the XZ plane facing `+Y`.
pub fn quad() -> MeshData {
    let mut mesh = MeshData::default();
    push_face(&mut mesh, Vec3::ZERO, Vec3::X, Vec3::NEG_Z, 0.5);
    mesh
}

/// [`quad`] plus a back face with flipped normals, so it stays visible with
/// back-face culling from either side.
pub fn double_sided_quad() -> MeshData {
    let mut mesh = quad();
    push_face(&mut mesh, Vec3::ZERO, Vec3::NEG_X, Vec3::NEG_Z, 0.5);
    mesh
}
