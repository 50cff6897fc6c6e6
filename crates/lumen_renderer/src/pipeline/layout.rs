/// Bind-group layouts shared by every forward pipeline.
///
/// Groups 0 and 1 are the constant ring's stage groups and are identical for
/// every shader pair.  Group 2, the material group, depends on which texture
/// and sampler slots a pair declares, so it is built per pair.
use crate::material::SAMPLER_BINDING_BASE;
use crate::shader::ShaderPairDesc;
use crate::staging::{ShaderStage, MAX_CONSTANT_SLOTS};

pub struct BindingLayouts {
    /// group(0): vertex constant slots, one dynamic-offset uniform each.
    pub vertex_constants: wgpu::BindGroupLayout,
    /// group(1): pixel constant slots.
    pub pixel_constants: wgpu::BindGroupLayout,
}

impl BindingLayouts {
    /// `window` is the byte size every constant slot binding views.
    pub fn new(device: &wgpu::Device, window: u64) -> Self {
        let constants = |stage: ShaderStage, label: &str| {
            let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..MAX_CONSTANT_SLOTS)
                .map(|slot| wgpu::BindGroupLayoutEntry {
                    binding: slot,
                    visibility: stage.visibility(),
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(window),
                    },
                    count: None,
                })
                .collect();
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &entries,
            })
        };

        Self {
            vertex_constants: constants(ShaderStage::Vertex, "Layout: Vertex Constants"),
            pixel_constants: constants(ShaderStage::Pixel, "Layout: Pixel Constants"),
        }
    }

    #[inline]
    pub fn constants(&self, stage: ShaderStage) -> &wgpu::BindGroupLayout {
        match stage {
            ShaderStage::Vertex => &self.vertex_constants,
            ShaderStage::Pixel => &self.pixel_constants,
        }
    }

    /// group(2) for one shader pair: texture slot `s` at binding `s`, sampler
    /// slot `s` at binding `128 + s`.
    pub fn material_layout(
        &self,
        device: &wgpu::Device,
        desc: &ShaderPairDesc,
    ) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("Layout: Material ({})", desc.name)),
            entries: &material_entries(desc),
        })
    }
}

fn material_entries(desc: &ShaderPairDesc) -> Vec<wgpu::BindGroupLayoutEntry> {
    let textures = desc.layout.textures.iter().map(|tex| wgpu::BindGroupLayoutEntry {
        binding: tex.slot,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: tex.kind.view_dimension(),
            multisampled: false,
        },
        count: None,
    });
    let samplers = desc.layout.samplers.iter().map(|&slot| wgpu::BindGroupLayoutEntry {
        binding: SAMPLER_BINDING_BASE + slot,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });
    textures.chain(samplers).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderLibrary;

    #[test]
    fn material_entries_follow_declared_slots() {
        let lib = ShaderLibrary::with_builtins(None).unwrap();
        let lit = lib.get(lib.id("lit").unwrap()).unwrap();
        let bindings: Vec<u32> = material_entries(lit).iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, SAMPLER_BINDING_BASE]);

        let sky = lib.get(lib.id("sky").unwrap()).unwrap();
        let entries = material_entries(sky);
        assert!(matches!(
            entries[0].ty,
            wgpu::BindingType::Texture {
                view_dimension: wgpu::TextureViewDimension::Cube,
                ..
            }
        ));
    }
}
