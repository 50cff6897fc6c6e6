use crate::pipeline::BindingLayouts;

use super::{ConstantStager, ShaderStage, MAX_CONSTANT_SLOTS};

/// The GPU buffer behind a [`ConstantStager`] plus one dynamic-offset bind
/// group per shader stage.
///
/// Every slot of a stage group views the same buffer through a window of
/// [`ConstantStager::binding_size`] bytes; draws select their region with
/// dynamic offsets.  The buffer carries one window of tail padding so a
/// region staged at the very end of the ring can still be bound.
pub struct GpuConstantRing {
    buffer: wgpu::Buffer,
    vertex_group: wgpu::BindGroup,
    pixel_group: wgpu::BindGroup,
}

impl GpuConstantRing {
    pub fn new(device: &wgpu::Device, layouts: &BindingLayouts, stager: &ConstantStager) -> Self {
        let window = stager.binding_size();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Constant Ring"),
            size: stager.capacity() + window,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let group = |stage: ShaderStage| {
            let entries: Vec<wgpu::BindGroupEntry> = (0..MAX_CONSTANT_SLOTS)
                .map(|slot| wgpu::BindGroupEntry {
                    binding: slot,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(window),
                    }),
                })
                .collect();
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "Constant Ring: vertex",
                    ShaderStage::Pixel => "Constant Ring: pixel",
                }),
                layout: layouts.constants(stage),
                entries: &entries,
            })
        };
        let vertex_group = group(ShaderStage::Vertex);
        let pixel_group = group(ShaderStage::Pixel);

        Self {
            buffer,
            vertex_group,
            pixel_group,
        }
    }

    /// Pushes everything staged since the last upload.  Must run before the
    /// frame's command buffer is submitted.
    pub fn upload(&self, queue: &wgpu::Queue, stager: &mut ConstantStager) -> u64 {
        stager.flush(|offset, bytes| queue.write_buffer(&self.buffer, offset, bytes))
    }

    #[inline]
    pub fn bind_group(&self, stage: ShaderStage) -> &wgpu::BindGroup {
        match stage {
            ShaderStage::Vertex => &self.vertex_group,
            ShaderStage::Pixel => &self.pixel_group,
        }
    }
}
