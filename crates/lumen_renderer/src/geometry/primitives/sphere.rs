use std::f32::consts::{PI, TAU};

use crate::geometry::{MeshData, Vertex};

/// UV sphere of diameter 1.  `slices` run around Y, `stacks` pole to pole.
/// The seam column is duplicated so UVs wrap cleanly.
pub fn sphere(slices: u32, stacks: u32) -> MeshData {
    let (slices, stacks) = (slices.max(3), stacks.max(2));
    let radius = 0.5;
    let mut mesh = MeshData::default();

    for r in 0..=stacks {
        let phi = PI * r as f32 / stacks as f32;
        for s in 0..=slices {
            let theta = TAU * s as f32 / slices as f32;
            let n = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            mesh.vertices.push(Vertex {
                position: n.map(|c| c * radius),
                uv: [s as f32 / slices as f32, r as f32 / stacks as f32],
                normal: n,
                tangent: [-theta.sin(), 0.0, theta.cos()],
            });
        }
    }

    let row = slices + 1;
    for r in 0..stacks {
        for s in 0..slices {
            let a = r * row + s;
            let (b, c, d) = (a + row, a + 1, a + row + 1);
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    mesh
}
