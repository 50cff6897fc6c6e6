use lumen_core::Color;

use crate::handle::{MeshId, SamplerId, ShaderPairId, TextureId};
use crate::staging::StagedBinding;

/// One step of a recorded frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameCommand {
    /// Clears colour and depth; opens the scene pass.
    ClearTargets(Color),
    /// Binds the constant ring's stage groups.  Per-slot regions from earlier
    /// frames are forgotten.
    BindPersistentConstants,
    SetShaders(ShaderPairId),
    BindTexture { slot: u32, texture: TextureId },
    BindSampler { slot: u32, sampler: SamplerId },
    BindConstants(StagedBinding),
    DrawIndexed { mesh: MeshId, index_count: u32 },
    /// Closes the scene pass and hands the target to the overlay.
    RenderOverlay,
    /// Submits the frame.  Leaves the render targets unbound.
    Present,
    RebindTargets,
}

impl FrameCommand {
    pub fn name(&self) -> &'static str {
        match self {
            FrameCommand::ClearTargets(_) => "ClearTargets",
            FrameCommand::BindPersistentConstants => "BindPersistentConstants",
            FrameCommand::SetShaders(_) => "SetShaders",
            FrameCommand::BindTexture { .. } => "BindTexture",
            FrameCommand::BindSampler { .. } => "BindSampler",
            FrameCommand::BindConstants(_) => "BindConstants",
            FrameCommand::DrawIndexed { .. } => "DrawIndexed",
            FrameCommand::RenderOverlay => "RenderOverlay",
            FrameCommand::Present => "Present",
            FrameCommand::RebindTargets => "RebindTargets",
        }
    }
}

/// Commands of one frame, in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    frame: u64,
    commands: Vec<FrameCommand>,
}

impl FramePlan {
    pub fn new(frame: u64) -> Self {
        Self {
            frame,
            commands: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, command: FrameCommand) {
        self.commands.push(command);
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn commands(&self) -> &[FrameCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn draw_count(&self) -> usize {
        self.count(|c| matches!(c, FrameCommand::DrawIndexed { .. }))
    }

    pub fn count(&self, pred: impl Fn(&FrameCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl<'a> IntoIterator for &'a FramePlan {
    type Item = &'a FrameCommand;
    type IntoIter = std::slice::Iter<'a, FrameCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
