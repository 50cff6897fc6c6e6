use lumen_core::{InputState, Time};
use lumen_renderer::{OverlayEdit, OverlayQueue, Renderer, SceneContext};

use crate::builder::AppConfig;

/// Handed to [`crate::LumenApp::setup`] once the window and GPU are ready.
pub struct SetupContext<'a> {
    /// Upload meshes, textures and samplers through `renderer.resources`.
    pub renderer: &'a mut Renderer,
    pub config: &'a AppConfig,
    /// Physical pixels.
    pub window_size: (u32, u32),
}

impl SetupContext<'_> {
    /// Width / height, `1.0` for a zero height.
    pub fn aspect(&self) -> f32 {
        aspect(self.window_size)
    }
}

/// Per-frame context passed to every [`crate::LumenApp`] callback after
/// setup.
///
/// ```rust,ignore
/// fn update(&mut self, ctx: &mut AppContext) {
///     if ctx.input.just_pressed(KeyCode::Digit2) {
///         ctx.edit(OverlayEdit::ActiveCamera(1));
///     }
/// }
/// ```
pub struct AppContext<'a> {
    /// Keyboard and mouse state.  Mutable because cameras consume the
    /// accumulated mouse motion.
    pub input: &'a mut InputState,

    pub time: Time,

    /// Physical pixels.
    pub window_size: (u32, u32),

    pub scene: &'a mut SceneContext,

    /// Edits queued here are applied when the next frame is recorded.
    pub overlay: &'a mut OverlayQueue,

    /// Read-only: sizes and staging counters.
    pub renderer: &'a Renderer,

    pub(crate) exit_requested: bool,
}

impl<'a> AppContext<'a> {
    /// Stops the event loop after the current callback.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn edit(&mut self, edit: OverlayEdit) {
        self.overlay.push(edit);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.window_size.0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.window_size.1
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        aspect(self.window_size)
    }
}

fn aspect((w, h): (u32, u32)) -> f32 {
    if h == 0 {
        1.0
    } else {
        w as f32 / h as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_guards_zero_height() {
        assert_eq!(aspect((1600, 800)), 2.0);
        assert_eq!(aspect((1600, 0)), 1.0);
    }
}
