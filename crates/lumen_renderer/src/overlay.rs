//! What an external debug overlay may read and edit.
//!
//! Edits are queued while the overlay runs and applied by the orchestrator at
//! the start of the next recorded frame, never in the middle of one.  Drawing
//! the overlay itself is delegated to an [`OverlayRenderer`] at the
//! `RenderOverlay` step.

use glam::{Vec2, Vec3};
use lumen_core::{CapacityError, Color};

use crate::geometry::GeometryBuffer;
use crate::scene::SceneContext;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayEdit {
    MaterialTint { material: usize, tint: Color },
    MaterialUvScale { material: usize, scale: Vec2 },
    MaterialUvOffset { material: usize, offset: Vec2 },
    LightColor { light: usize, color: Vec3 },
    LightIntensity { light: usize, intensity: f32 },
    ActiveCamera(usize),
}

impl OverlayEdit {
    pub fn apply(self, scene: &mut SceneContext) -> Result<(), CapacityError> {
        match self {
            OverlayEdit::MaterialTint { material, tint } => {
                scene.material(material)?.borrow_mut().set_tint(tint)
            }
            OverlayEdit::MaterialUvScale { material, scale } => {
                scene.material(material)?.borrow_mut().set_uv_scale(scale)
            }
            OverlayEdit::MaterialUvOffset { material, offset } => {
                scene.material(material)?.borrow_mut().set_uv_offset(offset)
            }
            OverlayEdit::LightColor { light, color } => {
                scene.lights.get_mut(light)?.set_color(color)
            }
            OverlayEdit::LightIntensity { light, intensity } => {
                scene.lights.get_mut(light)?.intensity = intensity
            }
            OverlayEdit::ActiveCamera(index) => scene.set_active_camera(index)?,
        }
        Ok(())
    }
}

/// Edits waiting for the next frame, in submission order.
#[derive(Debug, Default)]
pub struct OverlayQueue {
    edits: Vec<OverlayEdit>,
}

impl OverlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: OverlayEdit) {
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies every queued edit in order and empties the queue.  Stops at
    /// the first out-of-range index; the edits after it are discarded.
    pub fn apply(&mut self, scene: &mut SceneContext) -> Result<usize, CapacityError> {
        let mut applied = 0;
        for edit in self.edits.drain(..) {
            edit.apply(scene)?;
            applied += 1;
        }
        Ok(applied)
    }
}

/// Read-only geometry counts shown by the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshStats {
    pub name: String,
    pub vertices: u32,
    pub indices: u32,
    pub triangles: u32,
}

impl MeshStats {
    pub fn new(name: &str, mesh: &GeometryBuffer) -> Self {
        Self {
            name: name.to_owned(),
            vertices: mesh.vertex_count(),
            indices: mesh.index_count(),
            triangles: mesh.triangle_count(),
        }
    }
}

/// Draws an external GUI over the finished scene.
///
/// Called once per frame after the scene pass is closed, with the frame's
/// colour target.  Implementations open their own render pass and must load,
/// not clear, the target.
pub trait OverlayRenderer {
    fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    );

    /// Called whenever the colour target changes size.
    #[allow(unused_variables)]
    fn resize(&mut self, width: u32, height: u32) {}
}
