use lumen_renderer::{OverlayRenderer, SceneContext};

use crate::context::{AppContext, SetupContext};

/// The trait every Lumen application implements.
///
/// Only `setup` is required: it builds the scene the runner renders every
/// frame.  The remaining hooks default to doing nothing.
///
/// ```rust,ignore
/// struct Viewer;
///
/// impl LumenApp for Viewer {
///     fn setup(&mut self, ctx: &mut SetupContext) -> anyhow::Result<SceneContext> {
///         let camera = Camera::new(Vec3::new(0.0, 1.0, 5.0), ctx.aspect(), Lens::default());
///         Ok(SceneContext::new(camera))
///     }
///
///     fn update(&mut self, ctx: &mut AppContext) {
///         if ctx.input.just_pressed(KeyCode::Escape) {
///             ctx.request_exit();
///         }
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait LumenApp {
    /// Called once after the window and GPU are ready.  An error aborts the
    /// app before the first frame.
    fn setup(&mut self, ctx: &mut SetupContext) -> anyhow::Result<SceneContext>;

    /// Called every frame before the frame is recorded.  The active camera
    /// integrates free-look input right after this returns.
    fn update(&mut self, ctx: &mut AppContext) {}

    /// Called after the surface, the renderer and every camera projection
    /// have followed the new size.
    fn on_resize(&mut self, new_size: (u32, u32), ctx: &mut AppContext) {}

    /// Every raw winit window event, after [`lumen_core::InputState`] has
    /// seen it.
    fn on_window_event(&mut self, event: &winit::event::WindowEvent, ctx: &mut AppContext) {}

    /// External GUI drawn at the frame's overlay step, if any.
    fn overlay_renderer(&mut self) -> Option<&mut dyn OverlayRenderer> {
        None
    }
}
