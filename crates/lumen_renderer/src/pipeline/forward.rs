/// Render pipeline for one shader pair.
///
/// Compiles the pair's WGSL module and links it against the shared constant
/// layouts, the pair's material layout, the [`Vertex`] layout and the pair's
/// raster state.
use crate::geometry::Vertex;
use crate::pipeline::BindingLayouts;
use crate::render_target::DepthTarget;
use crate::shader::ShaderPairDesc;

pub struct ForwardPipeline {
    pub inner: wgpu::RenderPipeline,
    pub material_layout: wgpu::BindGroupLayout,
}

impl ForwardPipeline {
    pub fn new(
        device: &wgpu::Device,
        layouts: &BindingLayouts,
        desc: &ShaderPairDesc,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&desc.name),
            source: wgpu::ShaderSource::Wgsl(desc.source.as_str().into()),
        });
        let material_layout = layouts.material_layout(device, desc);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", desc.name)),
            bind_group_layouts: &[
                &layouts.vertex_constants,
                &layouts.pixel_constants,
                &material_layout,
            ],
            push_constant_ranges: &[],
        });

        let raster = desc.layout.raster;
        let inner = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Render Pipeline", desc.name)),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(&desc.vertex_entry),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(&desc.pixel_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: raster.cull,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthTarget::FORMAT,
                depth_write_enabled: raster.depth_write,
                depth_compare: raster.depth_compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        log::debug!("compiled pipeline for shader pair `{}`", desc.name);

        Self {
            inner,
            material_layout,
        }
    }
}
