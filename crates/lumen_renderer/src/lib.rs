/// `lumen_renderer`: constant staging, frame recording and wgpu execution.
///
/// # Module layout
///
/// | Module          | Responsibility                                          |
/// |-----------------|---------------------------------------------------------|
/// | `staging`       | Ring allocator, `ConstantStager`, GPU constant ring     |
/// | `payload`       | Byte-exact vertex / pixel / sky constant structs        |
/// | `geometry`      | `Vertex`, `MeshData`, `GeometryBuffer`, primitives      |
/// | `material`      | Surface parameters + texture / sampler slots            |
/// | `shader`        | `ShaderLibrary`, per-pair slot layouts                  |
/// | `resources`     | GPU buffer / texture / sampler registry                 |
/// | `entity`        | Transform + shared mesh + shared material               |
/// | `scene`         | `SceneContext` handed to the orchestrator               |
/// | `sky`           | Cubemap sky box                                         |
/// | `overlay`       | Queued overlay edits, `OverlayRenderer` hook            |
/// | `frame`         | `FrameOrchestrator`, recorded `FramePlan`, state checks |
/// | `pipeline`      | Bind-group layouts + per-pair `ForwardPipeline`         |
/// | `render_target` | Depth attachment, off-screen colour                     |
/// | `passes`        | `ForwardPass`, the executor                             |
pub mod entity;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod handle;
pub mod material;
pub mod overlay;
pub mod passes;
pub mod payload;
pub mod pipeline;
pub mod render_target;
pub mod resources;
pub mod scene;
pub mod shader;
pub mod sky;
pub mod staging;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use glam;

pub use entity::Entity;
pub use error::RenderError;
pub use frame::{FrameCommand, FrameOrchestrator, FramePlan};
pub use geometry::{primitives, GeometryBuffer, MeshData, Vertex};
pub use handle::{MeshId, SamplerId, ShaderPairId, TextureId};
pub use material::{Material, SharedMaterial};
pub use overlay::{MeshStats, OverlayEdit, OverlayQueue, OverlayRenderer};
pub use passes::FrameStats;
pub use payload::{PixelData, SkyVertexData, VertexData};
pub use resources::GpuResources;
pub use scene::SceneContext;
pub use shader::{ShaderLayout, ShaderLibrary};
pub use sky::{Sky, SkyGradient};
pub use staging::{ConstantStager, StagingConfig, StagingStats};

// ── Internal imports ──────────────────────────────────────────────────────────

use std::sync::Arc;

use lumen_core::{GpuContext, Time};

use passes::ForwardPass;

/// Payload sizes one entity draw stages: vertex then pixel constants.
pub const ENTITY_PAYLOADS: [u64; 2] = [
    std::mem::size_of::<VertexData>() as u64,
    std::mem::size_of::<PixelData>() as u64,
];

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Top-level renderer.
///
/// Each frame goes through the orchestrator (record the plan and stage the
/// constants) and then the forward pass (prepare → upload → execute).
/// Resources are created up front through [`Renderer::resources`].
pub struct Renderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pub resources: GpuResources,
    pub shaders: ShaderLibrary,
    orchestrator: FrameOrchestrator,
    forward: ForwardPass,
    width: u32,
    height: u32,
}

impl Renderer {
    /// `staging.alignment` is raised to the device's dynamic-offset
    /// alignment if it is smaller.
    pub fn new(
        ctx: &GpuContext,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        shaders: ShaderLibrary,
        mut staging: StagingConfig,
    ) -> Result<Self, RenderError> {
        staging.alignment = staging.alignment.max(ctx.uniform_offset_alignment());
        let orchestrator = FrameOrchestrator::new(staging)?;
        let forward = ForwardPass::new(&ctx.device, orchestrator.stager(), format, width, height);
        log::info!(
            "renderer ready: {width}x{height} {format:?}, {} shader pairs",
            shaders.len()
        );

        Ok(Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            resources: GpuResources::new(ctx),
            shaders,
            orchestrator,
            forward,
            width,
            height,
        })
    }

    /// Records, uploads and submits one frame into `target`.
    pub fn render(
        &mut self,
        scene: &mut SceneContext,
        edits: &mut OverlayQueue,
        time: &Time,
        target: &wgpu::TextureView,
        overlay: Option<&mut dyn OverlayRenderer>,
    ) -> Result<FrameStats, RenderError> {
        let plan = self.orchestrator.record_frame(scene, edits, time)?;
        let draws = self
            .forward
            .prepare(&self.device, &self.shaders, &self.resources, &plan)?;
        let uploaded = self
            .forward
            .upload(&self.queue, self.orchestrator.stager_mut());
        let mut stats = self.forward.execute(
            &self.device,
            &self.queue,
            &self.resources,
            &plan,
            &draws,
            target,
            (self.width, self.height),
            overlay,
        )?;
        stats.bytes_uploaded = uploaded;
        Ok(stats)
    }

    /// Records the new target size.  The depth attachment follows on the
    /// next frame; camera projections are the scene's business.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) || width == 0 || height == 0 {
            return;
        }
        log::info!("renderer resized to {width}x{height}");
        self.width = width;
        self.height = height;
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Staging counters of the most recently recorded frame.
    pub fn staging_stats(&self) -> &StagingStats {
        self.orchestrator.stager().stats()
    }

    #[inline]
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }
}
