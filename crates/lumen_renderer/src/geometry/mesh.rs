//! CPU mesh data and the immutable GPU geometry built from it.

use glam::Vec3;

use crate::frame::{FrameCommand, FramePlan};
use crate::handle::MeshId;

use super::Vertex;

/// Vertices plus `u32` triangle-list indices, as produced by the primitive
/// generators or an external loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the index list forms whole triangles over existing
    /// vertices.
    pub fn validate(&self) -> Result<(), String> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err("mesh has no geometry".to_owned());
        }
        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "{} indices do not form whole triangles",
                self.indices.len()
            ));
        }
        let count = self.vertices.len() as u32;
        if let Some(bad) = self.indices.iter().find(|&&i| i >= count) {
            return Err(format!("index {bad} out of range for {count} vertices"));
        }
        Ok(())
    }

    /// Appends `other`, rebasing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Recomputes every tangent from positions and UVs, then
    /// Gram-Schmidt-orthogonalises it against the vertex normal.
    pub fn generate_tangents(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (va, vb, vc) = (self.vertices[a], self.vertices[b], self.vertices[c]);

            let e1 = Vec3::from(vb.position) - Vec3::from(va.position);
            let e2 = Vec3::from(vc.position) - Vec3::from(va.position);
            let (du1, dv1) = (vb.uv[0] - va.uv[0], vb.uv[1] - va.uv[1]);
            let (du2, dv2) = (vc.uv[0] - va.uv[0], vc.uv[1] - va.uv[1]);

            let det = du1 * dv2 - du2 * dv1;
            if det.abs() < 1e-8 {
                continue;
            }
            let tangent = (e1 * dv2 - e2 * dv1) / det;
            for i in [a, b, c] {
                accum[i] += tangent;
            }
        }

        for (vertex, t) in self.vertices.iter_mut().zip(accum) {
            let n = Vec3::from(vertex.normal);
            let t = (t - n * n.dot(t)).normalize_or_zero();
            let t = if t == Vec3::ZERO { n.any_orthonormal_vector() } else { t };
            vertex.tangent = t.to_array();
        }
    }
}

/// An immutable vertex / index buffer pair living on the GPU.
///
/// Only the id and the counts are kept on the CPU side.  Contents never
/// change after upload; new geometry means a new `GeometryBuffer`.  Entities
/// share one instance through `Arc`.
#[derive(Debug, PartialEq, Eq)]
pub struct GeometryBuffer {
    id: MeshId,
    vertex_count: u32,
    index_count: u32,
}

impl GeometryBuffer {
    pub(crate) fn new(id: MeshId, vertex_count: u32, index_count: u32) -> Self {
        Self {
            id,
            vertex_count,
            index_count,
        }
    }

    #[inline]
    pub fn id(&self) -> MeshId {
        self.id
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[inline]
    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }

    /// Records an indexed draw of the whole buffer.
    pub fn draw(&self, plan: &mut FramePlan) {
        plan.push(FrameCommand::DrawIndexed {
            mesh: self.id,
            index_count: self.index_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_catches_broken_index_lists() {
        let mut mesh = MeshData {
            vertices: vec![Vertex::default(); 3],
            indices: vec![0, 1, 2],
        };
        assert!(mesh.validate().is_ok());
        mesh.indices.push(0);
        assert!(mesh.validate().is_err());
        mesh.indices = vec![0, 1, 3];
        assert!(mesh.validate().unwrap_err().contains("out of range"));
        assert!(MeshData::default().validate().is_err());
    }

    #[test]
    fn append_rebases_indices() {
        let tri = MeshData {
            vertices: vec![Vertex::default(); 3],
            indices: vec![0, 1, 2],
        };
        let mut both = tri.clone();
        both.append(&tri);
        assert_eq!(both.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(both.triangle_count(), 2);
    }

    #[test]
    fn draw_uses_the_full_index_range() {
        let geometry = GeometryBuffer::new(MeshId(7), 24, 36);
        let mut plan = FramePlan::new(0);
        geometry.draw(&mut plan);
        assert_eq!(
            plan.commands(),
            &[FrameCommand::DrawIndexed {
                mesh: MeshId(7),
                index_count: 36
            }]
        );
        assert_eq!(geometry.triangle_count(), 12);
    }
}
