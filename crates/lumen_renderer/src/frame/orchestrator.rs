//! Per-frame sequencing.
//!
//! [`FrameOrchestrator::record_frame`] turns the scene into a [`FramePlan`]:
//!
//! ```text
//! ClearTargets → BindPersistentConstants
//!   → per entity: [SetShaders] BindTexture* BindSampler* BindConstants×2 DrawIndexed
//!   → sky
//!   → RenderOverlay → Present → RebindTargets
//! ```
//!
//! Overlay edits queued since the previous frame are applied first, so every
//! draw of a frame sees the same material and light values.

use lumen_core::Time;

use crate::error::RenderError;
use crate::frame::{CameraPacket, FrameCommand, FramePlan};
use crate::handle::ShaderPairId;
use crate::overlay::OverlayQueue;
use crate::payload::FrameConstants;
use crate::scene::SceneContext;
use crate::staging::{ConstantStager, ShaderStage, StagedBinding, StagingConfig};

/// Records commands of one frame and stages their constant payloads.
pub struct FrameRecorder<'a> {
    plan: FramePlan,
    stager: &'a mut ConstantStager,
    current_shaders: Option<ShaderPairId>,
}

impl<'a> FrameRecorder<'a> {
    pub fn new(frame: u64, stager: &'a mut ConstantStager) -> Self {
        Self {
            plan: FramePlan::new(frame),
            stager,
            current_shaders: None,
        }
    }

    #[inline]
    pub fn push(&mut self, command: FrameCommand) {
        self.plan.push(command);
    }

    #[inline]
    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    #[inline]
    pub fn plan_mut(&mut self) -> &mut FramePlan {
        &mut self.plan
    }

    /// Records `SetShaders` unless `id` is already the active pair.
    pub fn set_shaders(&mut self, id: ShaderPairId) {
        if self.current_shaders != Some(id) {
            self.plan.push(FrameCommand::SetShaders(id));
            self.current_shaders = Some(id);
        }
    }

    /// Stages `payload` and binds the fresh region to `(stage, slot)`.
    pub fn stage<T: bytemuck::Pod>(
        &mut self,
        payload: &T,
        stage: ShaderStage,
        slot: u32,
    ) -> Result<StagedBinding, RenderError> {
        let binding = self.stager.stage_pod(payload, stage, slot)?;
        self.plan.push(FrameCommand::BindConstants(binding));
        Ok(binding)
    }

    pub fn finish(self) -> FramePlan {
        self.plan
    }
}

pub struct FrameOrchestrator {
    stager: ConstantStager,
}

impl FrameOrchestrator {
    pub fn new(config: StagingConfig) -> Result<Self, RenderError> {
        Ok(Self {
            stager: ConstantStager::new(config)?,
        })
    }

    pub fn record_frame(
        &mut self,
        scene: &mut SceneContext,
        overlay: &mut OverlayQueue,
        time: &Time,
    ) -> Result<FramePlan, RenderError> {
        let edits = overlay.apply(scene)?;
        if edits > 0 {
            log::debug!("applied {edits} overlay edits");
        }

        self.stager.begin_frame();
        let frame = FrameConstants {
            camera: CameraPacket::from(scene.active_camera()),
            elapsed: time.elapsed as f32,
            ambient: scene.ambient,
            lights: scene.lights,
        };

        let mut rec = FrameRecorder::new(self.stager.stats().frame, &mut self.stager);
        rec.push(FrameCommand::ClearTargets(scene.clear_color));
        rec.push(FrameCommand::BindPersistentConstants);
        for entity in &mut scene.entities {
            entity.draw(&mut rec, &frame)?;
        }
        if let Some(sky) = &scene.sky {
            sky.draw(&mut rec, &frame.camera)?;
        }
        rec.push(FrameCommand::RenderOverlay);
        rec.push(FrameCommand::Present);
        rec.push(FrameCommand::RebindTargets);
        let plan = rec.finish();

        let stats = self.stager.stats();
        log::debug!(
            "frame {}: {} draws, {} stage calls, {} bytes staged, {} wraps",
            stats.frame,
            plan.draw_count(),
            stats.stage_calls,
            stats.bytes_staged,
            stats.wraps
        );
        Ok(plan)
    }

    #[inline]
    pub fn stager(&self) -> &ConstantStager {
        &self.stager
    }

    #[inline]
    pub fn stager_mut(&mut self) -> &mut ConstantStager {
        &mut self.stager
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;
    use lumen_core::{Camera, Color, Lens, Light};

    use super::*;
    use crate::entity::Entity;
    use crate::frame::PipelineState;
    use crate::geometry::GeometryBuffer;
    use crate::handle::{MeshId, SamplerId, TextureId};
    use crate::material::Material;
    use crate::overlay::OverlayEdit;
    use crate::payload::{PixelData, VertexData};
    use crate::shader::{ShaderLayout, ShaderLibrary};
    use crate::sky::Sky;

    const VERTEX: u64 = std::mem::size_of::<VertexData>() as u64;
    const PIXEL: u64 = std::mem::size_of::<PixelData>() as u64;

    fn orchestrator(draws: u32) -> FrameOrchestrator {
        FrameOrchestrator::new(StagingConfig::sized_for(draws, &[VERTEX, PIXEL], 256, 1)).unwrap()
    }

    /// `count` entities cycling through three materials on two shader pairs.
    fn scene(count: usize) -> SceneContext {
        let mut scene = SceneContext::new(Camera::new(Vec3::Z * 5.0, 1.5, Lens::default()));
        let mesh = scene.add_mesh("cube", Arc::new(GeometryBuffer::new(MeshId(0), 24, 36)));
        let materials: Vec<_> = (0..3)
            .map(|i| {
                let mut m = Material::new(format!("m{i}"), ShaderPairId(i / 2), Color::WHITE);
                m.add_texture(0, TextureId(i)).unwrap();
                m.add_sampler(0, SamplerId(0)).unwrap();
                let shared = m.into_shared();
                scene.add_material(shared.clone());
                shared
            })
            .collect();
        for i in 0..count {
            let mut e = Entity::new(mesh.clone(), materials[i % 3].clone());
            e.transform.set_position(Vec3::new(i as f32, 0.0, 0.0));
            scene.spawn(e);
        }
        scene
    }

    #[test]
    fn twenty_one_entities_never_wrap() {
        let mut orch = orchestrator(21);
        let mut scene = scene(21);
        let mut overlay = OverlayQueue::new();
        for frame in 0..4 {
            let plan = orch
                .record_frame(&mut scene, &mut overlay, &Time::fixed(frame, 0.016))
                .unwrap();
            assert_eq!(plan.draw_count(), 21);
            assert_eq!(orch.stager().stats().wraps, 0);
            assert_eq!(orch.stager().stats().stage_calls, 42);
            assert_eq!(orch.stager().stats().discard_maps, 1);
        }
    }

    #[test]
    fn frame_follows_the_state_machine() {
        let mut orch = orchestrator(4);
        let mut scene = scene(2);
        let plan = orch
            .record_frame(&mut scene, &mut OverlayQueue::new(), &Time::default())
            .unwrap();
        let names: Vec<&str> = plan.commands().iter().map(FrameCommand::name).collect();
        assert_eq!(
            names,
            [
                "ClearTargets",
                "BindPersistentConstants",
                "SetShaders",
                "BindTexture",
                "BindSampler",
                "BindConstants",
                "BindConstants",
                "DrawIndexed",
                "BindTexture",
                "BindSampler",
                "BindConstants",
                "BindConstants",
                "DrawIndexed",
                "RenderOverlay",
                "Present",
                "RebindTargets",
            ]
        );
    }

    #[test]
    fn shader_changes_are_deduplicated() {
        let mut orch = orchestrator(6);
        let mut scene = scene(6);
        let plan = orch
            .record_frame(&mut scene, &mut OverlayQueue::new(), &Time::default())
            .unwrap();
        // materials use pairs 0, 0, 1, 0, 0, 1
        let switches: Vec<_> = plan
            .commands()
            .iter()
            .filter_map(|c| match c {
                FrameCommand::SetShaders(id) => Some(id.0),
                _ => None,
            })
            .collect();
        assert_eq!(switches, [0, 1, 0, 1]);
    }

    #[test]
    fn recorded_plan_resolves_against_shader_layouts() {
        let mut lib = ShaderLibrary::new(None);
        lib.load("lit", ShaderLayout::lit()).unwrap();
        lib.load("sky", ShaderLayout::sky()).unwrap();
        let mut orch = orchestrator(4);
        let mut scene = scene(1);
        scene.entities[0].material().borrow_mut().set_shaders(ShaderPairId(0));
        scene.sky = Some(Sky {
            mesh: Arc::new(GeometryBuffer::new(MeshId(1), 24, 36)),
            shaders: ShaderPairId(1),
            cubemap: TextureId(9),
            sampler: SamplerId(0),
        });

        let plan = orch
            .record_frame(&mut scene, &mut OverlayQueue::new(), &Time::default())
            .unwrap();
        let mut state = PipelineState::new();
        let mut draws = Vec::new();
        for cmd in &plan {
            state.apply(cmd).unwrap();
            if let FrameCommand::DrawIndexed { mesh, index_count } = *cmd {
                draws.push(state.resolve_draw(&lib, mesh, index_count).unwrap());
            }
        }
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].material.textures, vec![TextureId(9)]);
        assert!(state.targets_bound());
    }

    #[test]
    fn payloads_carry_scene_state() {
        let mut orch = orchestrator(4);
        let mut scene = scene(1);
        scene
            .lights
            .set(3, Light::spot(Vec3::Y, Vec3::NEG_Y, 8.0, (0.2, 0.5), Vec3::X, 2.0))
            .unwrap();
        let mut overlay = OverlayQueue::new();
        overlay.push(OverlayEdit::MaterialTint {
            material: 0,
            tint: Color::GREEN,
        });

        let plan = orch
            .record_frame(&mut scene, &mut overlay, &Time::fixed(10, 0.5))
            .unwrap();
        let pixel = plan
            .commands()
            .iter()
            .find_map(|c| match c {
                FrameCommand::BindConstants(b) if b.stage == ShaderStage::Pixel => Some(*b),
                _ => None,
            })
            .unwrap();
        let data: PixelData = bytemuck::pod_read_unaligned(orch.stager().staged_bytes(&pixel));
        assert_eq!(data.tint, Color::GREEN.to_array());
        assert_eq!(data.elapsed, 5.0);
        assert_eq!(data.lights[3], *scene.lights.get(3).unwrap());
        assert_eq!(data.camera_position, [0.0, 0.0, 5.0]);
    }

    #[test]
    fn overlay_error_aborts_the_frame() {
        let mut orch = orchestrator(4);
        let mut scene = scene(1);
        let mut overlay = OverlayQueue::new();
        overlay.push(OverlayEdit::ActiveCamera(3));
        let err = orch
            .record_frame(&mut scene, &mut overlay, &Time::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::Capacity(_)));
        assert_eq!(orch.stager().stats().stage_calls, 0);
    }
}
