//! Procedural meshes centred at the origin, roughly one unit across.
//!
//! All primitives wind counter-clockwise seen from outside (the side the
//! normals point to) and carry tangents.

mod cube;
mod frustum;
mod quad;
mod sphere;
mod torus;

pub use cube::cube;
pub use frustum::{cone, cylinder, frustum};
pub use quad::{double_sided_quad, quad};
pub use sphere::sphere;
pub use torus::torus;

use glam::Vec3;

use super::{MeshData, Vertex};

/// Appends a square face of half-size `half` centred at `center`.
///
/// `right × up` must equal `normal`; `u` grows along `right`, `v` grows
/// against `up` (top-left origin).
fn push_face(mesh: &mut MeshData, center: Vec3, right: Vec3, up: Vec3, half: f32) {
    let normal = right.cross(up).normalize();
    let base = mesh.vertices.len() as u32;
    for (s, t) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
        let position = center + (right * s + up * t) * half;
        mesh.vertices.push(Vertex {
            position: position.to_array(),
            uv: [(s + 1.0) * 0.5, 1.0 - (t + 1.0) * 0.5],
            normal: normal.to_array(),
            tangent: right.normalize().to_array(),
        });
    }
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}
