use std::f32::consts::TAU;

use glam::Vec3;

use crate::geometry::{MeshData, Vertex};

/// Cylinder of height 1 and radius 0.5 with capped ends.
pub fn cylinder(segments: u32) -> MeshData {
    frustum(0.5, 0.5, 1.0, segments)
}

/// Cone of height 1 and base radius 0.5.
pub fn cone(segments: u32) -> MeshData {
    frustum(0.5, 0.0, 1.0, segments)
}

/// Truncated cone along Y, centred at the origin.  Zero radii produce a
/// point instead of a cap.
pub fn frustum(bottom_radius: f32, top_radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height * 0.5;
    let slope = (bottom_radius - top_radius) / height;
    let ring = |i: u32| {
        let theta = TAU * i as f32 / segments as f32;
        (theta.cos(), theta.sin())
    };

    let mut mesh = MeshData::default();

    // side: one bottom / top vertex pair per segment edge, seam duplicated
    for i in 0..=segments {
        let (c, s) = ring(i);
        let normal = Vec3::new(c, slope, s).normalize().to_array();
        let u = i as f32 / segments as f32;
        mesh.vertices.push(Vertex::new(
            [bottom_radius * c, -half, bottom_radius * s],
            [u, 1.0],
            normal,
        ));
        mesh.vertices.push(Vertex::new(
            [top_radius * c, half, top_radius * s],
            [u, 0.0],
            normal,
        ));
    }
    for i in 0..segments {
        let (a, b, c, d) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
        mesh.indices.extend_from_slice(&[a, b, c]);
        if top_radius > 0.0 {
            mesh.indices.extend_from_slice(&[b, d, c]);
        }
    }

    if bottom_radius > 0.0 {
        push_cap(&mut mesh, bottom_radius, -half, segments, false);
    }
    if top_radius > 0.0 {
        push_cap(&mut mesh, top_radius, half, segments, true);
    }

    mesh.generate_tangents();
    mesh
}

fn push_cap(mesh: &mut MeshData, radius: f32, y: f32, segments: u32, up: bool) {
    let normal = if up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
    let center = mesh.vertices.len() as u32;
    mesh.vertices.push(Vertex::new([0.0, y, 0.0], [0.5, 0.5], normal));
    for i in 0..=segments {
        let theta = TAU * i as f32 / segments as f32;
        let (c, s) = (theta.cos(), theta.sin());
        mesh.vertices.push(Vertex::new(
            [radius * c, y, radius * s],
            [0.5 + c * 0.5, 0.5 + s * 0.5],
            normal,
        ));
    }
    for i in 0..segments {
        let (p, q) = (center + 1 + i, center + 2 + i);
        if up {
            mesh.indices.extend_from_slice(&[center, q, p]);
        } else {
            mesh.indices.extend_from_slice(&[center, p, q]);
        }
    }
}
