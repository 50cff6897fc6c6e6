//! Surface parameters plus the texture / sampler slots a draw binds.
//!
//! Materials are shared between entities as [`SharedMaterial`]
//! (`Rc<RefCell<_>>`): one logical thread records frames, and live edits
//! (tint, UV transform) land between frames through the overlay queue.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use glam::Vec2;
use lumen_core::{CapacityError, Color};

use crate::frame::{FrameCommand, FramePlan};
use crate::handle::{SamplerId, ShaderPairId, TextureId};

pub const MAX_TEXTURE_SLOTS: usize = 128;
pub const MAX_SAMPLER_SLOTS: usize = 16;

/// Binding index of sampler slot `s` inside the material bind group.
pub const SAMPLER_BINDING_BASE: u32 = MAX_TEXTURE_SLOTS as u32;

pub type SharedMaterial = Rc<RefCell<Material>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    shaders: ShaderPairId,
    tint: Color,
    uv_scale: Vec2,
    uv_offset: Vec2,
    roughness: f32,
    metal: bool,
    textures: BTreeMap<u32, TextureId>,
    samplers: BTreeMap<u32, SamplerId>,
}

impl Material {
    pub fn new(name: impl Into<String>, shaders: ShaderPairId, tint: Color) -> Self {
        Self {
            name: name.into(),
            shaders,
            tint,
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            roughness: 1.0,
            metal: false,
            textures: BTreeMap::new(),
            samplers: BTreeMap::new(),
        }
    }

    pub fn into_shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    // ── Slots ───────────────────────────────────────────────────────────────

    /// Assigns `texture` to `slot`, replacing whatever was there.
    pub fn add_texture(&mut self, slot: u32, texture: TextureId) -> Result<(), CapacityError> {
        CapacityError::check("texture slot", slot as usize, MAX_TEXTURE_SLOTS)?;
        self.textures.insert(slot, texture);
        Ok(())
    }

    pub fn add_sampler(&mut self, slot: u32, sampler: SamplerId) -> Result<(), CapacityError> {
        CapacityError::check("sampler slot", slot as usize, MAX_SAMPLER_SLOTS)?;
        self.samplers.insert(slot, sampler);
        Ok(())
    }

    pub fn texture(&self, slot: u32) -> Option<TextureId> {
        self.textures.get(&slot).copied()
    }

    pub fn sampler(&self, slot: u32) -> Option<SamplerId> {
        self.samplers.get(&slot).copied()
    }

    /// Records one bind per populated slot, textures then samplers, each in
    /// ascending slot order.
    pub fn bind_textures_and_samplers(&self, plan: &mut FramePlan) {
        for (&slot, &texture) in &self.textures {
            plan.push(FrameCommand::BindTexture { slot, texture });
        }
        for (&slot, &sampler) in &self.samplers {
            plan.push(FrameCommand::BindSampler { slot, sampler });
        }
    }

    // ── Parameters ──────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn shaders(&self) -> ShaderPairId {
        self.shaders
    }

    pub fn set_shaders(&mut self, shaders: ShaderPairId) {
        self.shaders = shaders;
    }

    #[inline]
    pub fn tint(&self) -> Color {
        self.tint
    }

    pub fn set_tint(&mut self, tint: Color) {
        self.tint = tint;
    }

    #[inline]
    pub fn uv_scale(&self) -> Vec2 {
        self.uv_scale
    }

    pub fn set_uv_scale(&mut self, scale: Vec2) {
        self.uv_scale = scale;
    }

    #[inline]
    pub fn uv_offset(&self) -> Vec2 {
        self.uv_offset
    }

    pub fn set_uv_offset(&mut self, offset: Vec2) {
        self.uv_offset = offset;
    }

    /// `0` is mirror-like, `1` fully diffuse.
    #[inline]
    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = roughness.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn is_metal(&self) -> bool {
        self.metal
    }

    pub fn set_metal(&mut self, metal: bool) {
        self.metal = metal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PipelineState;

    fn textured() -> Material {
        let mut m = Material::new("brick", ShaderPairId(0), Color::WHITE);
        m.add_texture(5, TextureId(2)).unwrap();
        m.add_texture(0, TextureId(1)).unwrap();
        m.add_sampler(3, SamplerId(0)).unwrap();
        m
    }

    #[test]
    fn binds_in_ascending_slot_order() {
        let mut plan = FramePlan::new(0);
        textured().bind_textures_and_samplers(&mut plan);
        assert_eq!(
            plan.commands(),
            &[
                FrameCommand::BindTexture {
                    slot: 0,
                    texture: TextureId(1)
                },
                FrameCommand::BindTexture {
                    slot: 5,
                    texture: TextureId(2)
                },
                FrameCommand::BindSampler {
                    slot: 3,
                    sampler: SamplerId(0)
                },
            ]
        );
    }

    #[test]
    fn binding_twice_leaves_identical_state() {
        let shared = textured().into_shared();
        let other_entity = Rc::clone(&shared);

        let mut once = PipelineState::new();
        let mut plan = FramePlan::new(0);
        shared.borrow().bind_textures_and_samplers(&mut plan);
        for cmd in &plan {
            once.apply(cmd).unwrap();
        }

        let mut twice = PipelineState::new();
        let mut plan = FramePlan::new(0);
        shared.borrow().bind_textures_and_samplers(&mut plan);
        other_entity.borrow().bind_textures_and_samplers(&mut plan);
        for cmd in &plan {
            twice.apply(cmd).unwrap();
        }

        assert_eq!(once, twice);
        assert_eq!(twice.texture(5), Some(TextureId(2)));
    }

    #[test]
    fn slot_capacity_is_enforced() {
        let mut m = Material::new("m", ShaderPairId(0), Color::WHITE);
        assert!(m.add_texture(127, TextureId(0)).is_ok());
        let err = m.add_texture(128, TextureId(0)).unwrap_err();
        assert_eq!((err.index, err.capacity), (128, MAX_TEXTURE_SLOTS));
        assert!(m.add_sampler(15, SamplerId(0)).is_ok());
        assert!(m.add_sampler(16, SamplerId(0)).is_err());
        assert_eq!(m.texture(128), None);
    }

    #[test]
    fn slots_are_stable_and_replaceable() {
        let mut m = textured();
        m.add_texture(5, TextureId(9)).unwrap();
        assert_eq!(m.texture(5), Some(TextureId(9)));
        assert_eq!(m.texture(0), Some(TextureId(1)));
    }

    #[test]
    fn live_edits_are_seen_through_every_handle() {
        let shared = Material::new("m", ShaderPairId(0), Color::WHITE).into_shared();
        let alias = Rc::clone(&shared);
        shared.borrow_mut().set_tint(Color::RED);
        shared.borrow_mut().set_uv_offset(Vec2::new(0.5, 0.0));
        assert_eq!(alias.borrow().tint(), Color::RED);
        assert_eq!(alias.borrow().uv_offset(), Vec2::new(0.5, 0.0));
        alias.borrow_mut().set_roughness(3.0);
        assert_eq!(shared.borrow().roughness(), 1.0);
    }
}
