/// GPU vertex used by every built-in pipeline.
///
/// Position, UV, normal and tangent, tightly packed (44 bytes).  The matching
/// WGSL attribute locations are declared in `assets/shaders/lit.wgsl`; the
/// sky shader reads the position only.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    /// Direction of increasing `u`, orthogonal to the normal.
    pub tangent: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Float32x3,
        3 => Float32x3
    ];

    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            normal,
            tangent: [0.0; 3],
        }
    }

    /// Layout to pass to `wgpu::VertexState::buffers`.
    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_follow_field_offsets() {
        assert_eq!(std::mem::size_of::<Vertex>(), 44);
        let layout = Vertex::layout();
        let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20, 32]);
        assert_eq!(layout.array_stride, 44);
    }
}
