//! Tracked pipeline binding state.
//!
//! [`PipelineState`] folds [`FrameCommand`]s into the bindings they leave
//! behind, the way an immediate-mode context would.  Bindings persist until
//! overwritten, including across draws with different shader pairs.
//! [`PipelineState::resolve_draw`] checks the state against the shader
//! pair's declared slots right before a draw.

use std::collections::BTreeMap;

use crate::error::RenderError;
use crate::frame::FrameCommand;
use crate::handle::{MeshId, SamplerId, ShaderPairId, TextureId};
use crate::shader::ShaderLibrary;
use crate::staging::{ShaderStage, StagedBinding, MAX_CONSTANT_SLOTS};

/// Identity of a material bind group: the resources bound to the declared
/// texture and sampler slots of one shader pair, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    pub shaders: ShaderPairId,
    pub textures: Vec<TextureId>,
    pub samplers: Vec<SamplerId>,
}

/// Everything the executor needs to issue one draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDraw {
    pub material: MaterialKey,
    /// Dynamic offsets per stage, indexed by slot.
    pub offsets: [[u32; MAX_CONSTANT_SLOTS as usize]; 2],
    pub mesh: MeshId,
    pub index_count: u32,
}

impl ResolvedDraw {
    #[inline]
    pub fn shaders(&self) -> ShaderPairId {
        self.material.shaders
    }

    #[inline]
    pub fn offsets(&self, stage: ShaderStage) -> &[u32] {
        &self.offsets[stage.bind_group() as usize]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    shaders: Option<ShaderPairId>,
    textures: BTreeMap<u32, TextureId>,
    samplers: BTreeMap<u32, SamplerId>,
    constants: BTreeMap<(ShaderStage, u32), StagedBinding>,
    constants_bound: bool,
    targets_bound: bool,
    scene_pass_open: bool,
}

impl Default for PipelineState {
    /// Targets start bound; the swapchain is attached at startup.
    fn default() -> Self {
        Self {
            shaders: None,
            textures: BTreeMap::new(),
            samplers: BTreeMap::new(),
            constants: BTreeMap::new(),
            constants_bound: false,
            targets_bound: true,
            scene_pass_open: false,
        }
    }
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, command: &FrameCommand) -> Result<(), RenderError> {
        match *command {
            FrameCommand::ClearTargets(_) => {
                if !self.targets_bound {
                    return Err(RenderError::TargetsUnbound(command.name()));
                }
                self.scene_pass_open = true;
            }
            FrameCommand::DrawIndexed { .. } => {
                if !self.targets_bound {
                    return Err(RenderError::TargetsUnbound(command.name()));
                }
                if !self.scene_pass_open {
                    return Err(RenderError::InvalidCommandOrder(command.name()));
                }
            }
            FrameCommand::BindPersistentConstants => {
                self.constants.clear();
                self.constants_bound = true;
            }
            FrameCommand::SetShaders(id) => self.shaders = Some(id),
            FrameCommand::BindTexture { slot, texture } => {
                self.textures.insert(slot, texture);
            }
            FrameCommand::BindSampler { slot, sampler } => {
                self.samplers.insert(slot, sampler);
            }
            FrameCommand::BindConstants(binding) => {
                if !self.constants_bound {
                    return Err(RenderError::PersistentConstantsUnbound);
                }
                self.constants.insert((binding.stage, binding.slot), binding);
            }
            FrameCommand::RenderOverlay => self.scene_pass_open = false,
            FrameCommand::Present => {
                self.scene_pass_open = false;
                self.targets_bound = false;
            }
            FrameCommand::RebindTargets => self.targets_bound = true,
        }
        Ok(())
    }

    /// Validates the current bindings against the active shader pair.
    pub fn resolve_draw(
        &self,
        shaders: &ShaderLibrary,
        mesh: MeshId,
        index_count: u32,
    ) -> Result<ResolvedDraw, RenderError> {
        let id = self.shaders.ok_or(RenderError::NoShaders)?;
        let desc = shaders.get(id)?;

        for decl in &desc.layout.constants {
            let bound = self.constants.get(&(decl.stage, decl.slot)).ok_or_else(|| {
                RenderError::UnboundConstant {
                    shader: desc.name.clone(),
                    stage: decl.stage,
                    slot: decl.slot,
                }
            })?;
            if bound.size < decl.size {
                return Err(RenderError::LayoutMismatch {
                    shader: desc.name.clone(),
                    stage: decl.stage,
                    slot: decl.slot,
                    expected: decl.size,
                    actual: bound.size,
                });
            }
        }

        let mut offsets = [[0u32; MAX_CONSTANT_SLOTS as usize]; 2];
        for (&(stage, slot), binding) in &self.constants {
            offsets[stage.bind_group() as usize][slot as usize] = binding.offset as u32;
        }

        let textures = desc
            .layout
            .textures
            .iter()
            .map(|decl| {
                self.textures
                    .get(&decl.slot)
                    .copied()
                    .ok_or_else(|| RenderError::UnboundTexture {
                        shader: desc.name.clone(),
                        slot: decl.slot,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let samplers = desc
            .layout
            .samplers
            .iter()
            .map(|&slot| {
                self.samplers
                    .get(&slot)
                    .copied()
                    .ok_or_else(|| RenderError::UnboundSampler {
                        shader: desc.name.clone(),
                        slot,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolvedDraw {
            material: MaterialKey {
                shaders: id,
                textures,
                samplers,
            },
            offsets,
            mesh,
            index_count,
        })
    }

    #[inline]
    pub fn shaders(&self) -> Option<ShaderPairId> {
        self.shaders
    }

    pub fn texture(&self, slot: u32) -> Option<TextureId> {
        self.textures.get(&slot).copied()
    }

    pub fn sampler(&self, slot: u32) -> Option<SamplerId> {
        self.samplers.get(&slot).copied()
    }

    pub fn constant(&self, stage: ShaderStage, slot: u32) -> Option<&StagedBinding> {
        self.constants.get(&(stage, slot))
    }

    #[inline]
    pub fn targets_bound(&self) -> bool {
        self.targets_bound
    }

    /// `true` between `ClearTargets` and the following `RenderOverlay`.
    #[inline]
    pub fn scene_pass_open(&self) -> bool {
        self.scene_pass_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderLayout;
    use lumen_core::Color;

    fn lit_library() -> (ShaderLibrary, ShaderPairId) {
        let lib = ShaderLibrary::with_builtins(None).unwrap();
        let lit = lib.id("lit").unwrap();
        (lib, lit)
    }

    fn binding(stage: ShaderStage, offset: u64, size: u64) -> FrameCommand {
        FrameCommand::BindConstants(StagedBinding {
            stage,
            slot: 0,
            offset,
            size,
        })
    }

    fn lit_state(lit: ShaderPairId, pixel_size: u64) -> PipelineState {
        let mut state = PipelineState::new();
        for cmd in [
            FrameCommand::ClearTargets(Color::BLACK),
            FrameCommand::BindPersistentConstants,
            FrameCommand::SetShaders(lit),
            FrameCommand::BindTexture {
                slot: 0,
                texture: TextureId(4),
            },
            FrameCommand::BindSampler {
                slot: 0,
                sampler: SamplerId(1),
            },
            binding(ShaderStage::Vertex, 512, 256),
            binding(ShaderStage::Pixel, 768, pixel_size),
        ] {
            state.apply(&cmd).unwrap();
        }
        state
    }

    #[test]
    fn resolves_offsets_and_material_key() {
        let (lib, lit) = lit_library();
        let draw = lit_state(lit, 384).resolve_draw(&lib, MeshId(2), 36).unwrap();
        assert_eq!(draw.offsets(ShaderStage::Vertex), &[512, 0, 0, 0]);
        assert_eq!(draw.offsets(ShaderStage::Pixel), &[768, 0, 0, 0]);
        assert_eq!(draw.material.textures, vec![TextureId(4)]);
        assert_eq!(draw.material.samplers, vec![SamplerId(1)]);
        assert_eq!(draw.shaders(), lit);
    }

    #[test]
    fn short_payload_is_a_layout_mismatch() {
        let (lib, lit) = lit_library();
        let err = lit_state(lit, 368).resolve_draw(&lib, MeshId(0), 3).unwrap_err();
        assert!(matches!(
            err,
            RenderError::LayoutMismatch {
                stage: ShaderStage::Pixel,
                expected: 384,
                actual: 368,
                ..
            }
        ));
    }

    #[test]
    fn missing_bindings_are_reported() {
        let (lib, lit) = lit_library();
        let mut state = PipelineState::new();
        assert!(matches!(
            state.resolve_draw(&lib, MeshId(0), 3),
            Err(RenderError::NoShaders)
        ));

        state.apply(&FrameCommand::BindPersistentConstants).unwrap();
        state.apply(&FrameCommand::SetShaders(lit)).unwrap();
        state.apply(&binding(ShaderStage::Vertex, 0, 256)).unwrap();
        assert!(matches!(
            state.resolve_draw(&lib, MeshId(0), 3),
            Err(RenderError::UnboundConstant {
                stage: ShaderStage::Pixel,
                slot: 0,
                ..
            })
        ));

        state.apply(&binding(ShaderStage::Pixel, 256, 384)).unwrap();
        assert!(matches!(
            state.resolve_draw(&lib, MeshId(0), 3),
            Err(RenderError::UnboundTexture { slot: 0, .. })
        ));
    }

    #[test]
    fn present_unbinds_targets_until_rebind() {
        let mut state = PipelineState::new();
        state.apply(&FrameCommand::Present).unwrap();
        assert!(matches!(
            state.apply(&FrameCommand::ClearTargets(Color::BLACK)),
            Err(RenderError::TargetsUnbound("ClearTargets"))
        ));
        state.apply(&FrameCommand::RebindTargets).unwrap();
        assert!(state.apply(&FrameCommand::ClearTargets(Color::BLACK)).is_ok());
    }

    #[test]
    fn draws_only_inside_the_scene_pass() {
        let draw = FrameCommand::DrawIndexed {
            mesh: MeshId(0),
            index_count: 3,
        };
        let mut state = PipelineState::new();
        assert!(matches!(
            state.apply(&draw),
            Err(RenderError::InvalidCommandOrder("DrawIndexed"))
        ));
        state.apply(&FrameCommand::ClearTargets(Color::BLACK)).unwrap();
        assert!(state.apply(&draw).is_ok());
        state.apply(&FrameCommand::RenderOverlay).unwrap();
        assert!(!state.scene_pass_open());
        assert!(state.apply(&draw).is_err());
    }

    #[test]
    fn constants_need_the_persistent_groups() {
        let mut state = PipelineState::new();
        assert!(matches!(
            state.apply(&binding(ShaderStage::Vertex, 0, 256)),
            Err(RenderError::PersistentConstantsUnbound)
        ));
        state.apply(&FrameCommand::BindPersistentConstants).unwrap();
        state.apply(&binding(ShaderStage::Vertex, 0, 256)).unwrap();
        assert!(state.constant(ShaderStage::Vertex, 0).is_some());
        // rebinding the groups drops last frame's regions
        state.apply(&FrameCommand::BindPersistentConstants).unwrap();
        assert!(state.constant(ShaderStage::Vertex, 0).is_none());
    }

    #[test]
    fn custom_layout_declares_extra_slots() {
        let mut lib = ShaderLibrary::new(None);
        let layout = ShaderLayout::lit().with_constant(ShaderStage::Vertex, 2, 64);
        let id = lib.load("lit", layout).unwrap();
        let mut state = lit_state(id, 384);
        assert!(matches!(
            state.resolve_draw(&lib, MeshId(0), 3),
            Err(RenderError::UnboundConstant { slot: 2, .. })
        ));
        state
            .apply(&FrameCommand::BindConstants(StagedBinding {
                stage: ShaderStage::Vertex,
                slot: 2,
                offset: 1024,
                size: 64,
            }))
            .unwrap();
        let draw = state.resolve_draw(&lib, MeshId(0), 3).unwrap();
        assert_eq!(draw.offsets(ShaderStage::Vertex), &[512, 0, 1024, 0]);
    }
}
