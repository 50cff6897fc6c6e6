/// Immutable buffer creation.  Vertex and index data are uploaded once at
/// creation and never written again, so neither buffer gets `COPY_DST`.
use wgpu::util::DeviceExt;

/// Creates a GPU vertex buffer from a slice of `Pod` data.
pub fn create_vertex<T: bytemuck::Pod>(device: &wgpu::Device, label: &str, data: &[T]) -> wgpu::Buffer {
    create_immutable(device, label, bytemuck::cast_slice(data), wgpu::BufferUsages::VERTEX)
}

/// Creates a GPU index buffer of `u32` indices.
pub fn create_index(device: &wgpu::Device, label: &str, data: &[u32]) -> wgpu::Buffer {
    create_immutable(device, label, bytemuck::cast_slice(data), wgpu::BufferUsages::INDEX)
}

fn create_immutable(
    device: &wgpu::Device,
    label: &str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage,
    })
}
