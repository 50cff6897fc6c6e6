use std::f32::consts::TAU;

use crate::geometry::{MeshData, Vertex};

/// Torus around Y.  `major` is the distance from the centre to the middle of
/// the tube, `minor` the tube radius.
pub fn torus(major: f32, minor: f32, rings: u32, sides: u32) -> MeshData {
    let (rings, sides) = (rings.max(3), sides.max(3));
    let mut mesh = MeshData::default();

    for i in 0..=rings {
        let u = TAU * i as f32 / rings as f32;
        let (cu, su) = (u.cos(), u.sin());
        for j in 0..=sides {
            let v = TAU * j as f32 / sides as f32;
            let (cv, sv) = (v.cos(), v.sin());
            let normal = [cv * cu, sv, cv * su];
            mesh.vertices.push(Vertex {
                position: [
                    (major + minor * cv) * cu,
                    minor * sv,
                    (major + minor * cv) * su,
                ],
                uv: [i as f32 / rings as f32, j as f32 / sides as f32],
                normal,
                tangent: [-su, 0.0, cu],
            });
        }
    }

    let row = sides + 1;
    for i in 0..rings {
        for j in 0..sides {
            let a = i * row + j;
            let (b, c, d) = (a + row, a + 1, a + row + 1);
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    mesh
}
