/// Replays a recorded [`FramePlan`] on wgpu.
///
/// Two phases, as with every pass in this crate:
///
/// - `prepare` folds the plan through a [`PipelineState`], resolves every
///   draw against its shader pair's declared slots and makes sure the
///   pipeline and material bind group each draw needs exist.  Nothing is
///   encoded yet, so a bad frame fails before any GPU work is recorded.
/// - `execute` uploads the staged constants, encodes the scene pass and
///   submits it at `Present`.  Pipeline, material group and vertex / index
///   buffers are only re-set when they differ from the previous draw; the
///   two constant groups are re-set on every draw with that draw's dynamic
///   offsets.
use std::collections::HashMap;

use wgpu::{
    CommandEncoder, Device, LoadOp, Operations, Queue, RenderPassColorAttachment,
    RenderPassDepthStencilAttachment, RenderPassDescriptor, StoreOp, TextureView,
};

use crate::error::RenderError;
use crate::frame::{FrameCommand, FramePlan, MaterialKey, PipelineState, ResolvedDraw};
use crate::handle::{MeshId, ShaderPairId};
use crate::material::SAMPLER_BINDING_BASE;
use crate::overlay::OverlayRenderer;
use crate::pipeline::{BindingLayouts, PipelineCache};
use crate::render_target::DepthTarget;
use crate::resources::GpuResources;
use crate::shader::ShaderLibrary;
use crate::staging::{ConstantStager, GpuConstantRing, ShaderStage};

/// What one executed frame cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draws: u32,
    pub pipeline_changes: u32,
    pub material_changes: u32,
    pub mesh_changes: u32,
    pub bytes_uploaded: u64,
    pub presented: bool,
}

pub struct ForwardPass {
    layouts: BindingLayouts,
    ring: GpuConstantRing,
    pipelines: PipelineCache,
    materials: HashMap<MaterialKey, wgpu::BindGroup>,
    depth: DepthTarget,
    format: wgpu::TextureFormat,
}

impl ForwardPass {
    pub fn new(
        device: &Device,
        stager: &ConstantStager,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let layouts = BindingLayouts::new(device, stager.binding_size());
        let ring = GpuConstantRing::new(device, &layouts, stager);
        Self {
            layouts,
            ring,
            pipelines: PipelineCache::default(),
            materials: HashMap::new(),
            depth: DepthTarget::new(device, width, height),
            format,
        }
    }

    pub fn name(&self) -> &str {
        "Forward Pass"
    }

    pub fn prepare(
        &mut self,
        device: &Device,
        shaders: &ShaderLibrary,
        resources: &GpuResources,
        plan: &FramePlan,
    ) -> Result<Vec<ResolvedDraw>, RenderError> {
        let mut state = PipelineState::new();
        let mut draws = Vec::with_capacity(plan.draw_count());
        for command in plan {
            state.apply(command)?;
            let FrameCommand::DrawIndexed { mesh, index_count } = *command else {
                continue;
            };
            let draw = state.resolve_draw(shaders, mesh, index_count)?;
            resources.mesh(draw.mesh)?;
            self.pipelines
                .ensure(device, &self.layouts, shaders, draw.shaders(), self.format)?;
            self.ensure_material(device, shaders, resources, &draw.material)?;
            draws.push(draw);
        }
        Ok(draws)
    }

    fn ensure_material(
        &mut self,
        device: &Device,
        shaders: &ShaderLibrary,
        resources: &GpuResources,
        key: &MaterialKey,
    ) -> Result<(), RenderError> {
        if self.materials.contains_key(key) {
            return Ok(());
        }
        let desc = shaders.get(key.shaders)?;
        let pipeline = self.pipelines.get(key.shaders)?;

        let mut entries = Vec::with_capacity(key.textures.len() + key.samplers.len());
        for (decl, &id) in desc.layout.textures.iter().zip(&key.textures) {
            let texture = resources.texture(id)?;
            if texture.kind != decl.kind {
                return Err(RenderError::TextureKindMismatch {
                    id,
                    shader: desc.name.clone(),
                    slot: decl.slot,
                });
            }
            entries.push(wgpu::BindGroupEntry {
                binding: decl.slot,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }
        for (&slot, &id) in desc.layout.samplers.iter().zip(&key.samplers) {
            entries.push(wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING_BASE + slot,
                resource: wgpu::BindingResource::Sampler(resources.sampler(id)?),
            });
        }

        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Material: {}", desc.name)),
            layout: &pipeline.material_layout,
            entries: &entries,
        });
        log::debug!("created material bind group {key:?}");
        self.materials.insert(key.clone(), group);
        Ok(())
    }

    /// Flushes the stager's written ranges into the ring buffer.
    pub fn upload(&self, queue: &Queue, stager: &mut ConstantStager) -> u64 {
        self.ring.upload(queue, stager)
    }

    /// Encodes and submits `plan`.  `draws` must come from
    /// [`ForwardPass::prepare`] on the same plan.
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &mut self,
        device: &Device,
        queue: &Queue,
        resources: &GpuResources,
        plan: &FramePlan,
        draws: &[ResolvedDraw],
        target: &TextureView,
        (width, height): (u32, u32),
        mut overlay: Option<&mut dyn OverlayRenderer>,
    ) -> Result<FrameStats, RenderError> {
        self.depth.ensure_size(device, width, height);

        let mut stats = FrameStats::default();
        let mut encoder: Option<CommandEncoder> =
            Some(device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            }));
        let mut rpass: Option<wgpu::RenderPass<'static>> = None;
        let mut pending = draws.iter();

        let mut pipeline: Option<ShaderPairId> = None;
        let mut material: Option<&MaterialKey> = None;
        let mut mesh: Option<MeshId> = None;

        for command in plan {
            match *command {
                FrameCommand::ClearTargets(color) => {
                    let enc = encoder
                        .as_mut()
                        .ok_or(RenderError::InvalidCommandOrder("ClearTargets"))?;
                    rpass = Some(
                        enc.begin_render_pass(&RenderPassDescriptor {
                            label: Some(self.name()),
                            color_attachments: &[Some(RenderPassColorAttachment {
                                view: target,
                                resolve_target: None,
                                ops: Operations {
                                    load: LoadOp::Clear(color.to_wgpu()),
                                    store: StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                                view: &self.depth.view,
                                depth_ops: Some(Operations {
                                    load: LoadOp::Clear(1.0),
                                    store: StoreOp::Store,
                                }),
                                stencil_ops: None,
                            }),
                            occlusion_query_set: None,
                            timestamp_writes: None,
                        })
                        .forget_lifetime(),
                    );
                    pipeline = None;
                    material = None;
                    mesh = None;
                }
                FrameCommand::DrawIndexed { .. } => {
                    let draw = pending
                        .next()
                        .ok_or(RenderError::InvalidCommandOrder("DrawIndexed"))?;
                    let pass = rpass
                        .as_mut()
                        .ok_or(RenderError::InvalidCommandOrder("DrawIndexed"))?;

                    if pipeline != Some(draw.shaders()) {
                        pass.set_pipeline(&self.pipelines.get(draw.shaders())?.inner);
                        pipeline = Some(draw.shaders());
                        material = None;
                        stats.pipeline_changes += 1;
                    }
                    if material != Some(&draw.material) {
                        let group = self
                            .materials
                            .get(&draw.material)
                            .ok_or(RenderError::UnknownShaderPair(draw.shaders()))?;
                        pass.set_bind_group(2, group, &[]);
                        material = Some(&draw.material);
                        stats.material_changes += 1;
                    }
                    for stage in ShaderStage::ALL {
                        pass.set_bind_group(
                            stage.bind_group(),
                            self.ring.bind_group(stage),
                            draw.offsets(stage),
                        );
                    }
                    if mesh != Some(draw.mesh) {
                        let buffers = resources.mesh(draw.mesh)?;
                        pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
                        pass.set_index_buffer(
                            buffers.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        mesh = Some(draw.mesh);
                        stats.mesh_changes += 1;
                    }
                    pass.draw_indexed(0..draw.index_count, 0, 0..1);
                    stats.draws += 1;
                }
                FrameCommand::RenderOverlay => {
                    drop(rpass.take());
                    if let (Some(gui), Some(enc)) = (overlay.as_mut(), encoder.as_mut()) {
                        gui.render(device, queue, enc, target);
                    }
                }
                FrameCommand::Present => {
                    drop(rpass.take());
                    let enc = encoder
                        .take()
                        .ok_or(RenderError::InvalidCommandOrder("Present"))?;
                    queue.submit(std::iter::once(enc.finish()));
                    stats.presented = true;
                }
                FrameCommand::RebindTargets => {
                    self.depth.ensure_size(device, width, height);
                }
                // Folded into the resolved draws by `prepare`.
                FrameCommand::BindPersistentConstants
                | FrameCommand::SetShaders(_)
                | FrameCommand::BindTexture { .. }
                | FrameCommand::BindSampler { .. }
                | FrameCommand::BindConstants(_) => {}
            }
        }

        drop(rpass);
        if let Some(enc) = encoder {
            log::warn!("frame {} recorded without Present; submitting anyway", plan.frame());
            queue.submit(std::iter::once(enc.finish()));
        }
        Ok(stats)
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn material_group_count(&self) -> usize {
        self.materials.len()
    }
}
