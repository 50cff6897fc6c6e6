//! Windowed runner for the Lumen renderer: winit event loop, TOML
//! configuration and `fern` logging around a [`LumenApp`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use lumen_app::{App, AppContext, KeyCode, LumenApp, SetupContext};
//! use lumen_app::{Camera, Lens, SceneContext, Vec3};
//!
//! struct Viewer;
//!
//! impl LumenApp for Viewer {
//!     fn setup(&mut self, ctx: &mut SetupContext) -> anyhow::Result<SceneContext> {
//!         let camera = Camera::new(Vec3::new(0.0, 1.0, 5.0), ctx.aspect(), Lens::default());
//!         Ok(SceneContext::new(camera))
//!     }
//!
//!     fn update(&mut self, ctx: &mut AppContext) {
//!         if ctx.input.just_pressed(KeyCode::Escape) {
//!             ctx.request_exit();
//!         }
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     App::new(Viewer).with_title("Viewer").run()
//! }
//! ```

pub mod builder;
pub mod context;
mod graphics;
pub mod logging;
mod runner;
pub mod traits;

pub use builder::{App, AppConfig};
pub use context::{AppContext, SetupContext};
pub use traits::LumenApp;

pub use lumen_core::{
    Camera, Color, InputState, KeyCode, Lens, Light, MouseButton, Time, Transform,
};
pub use lumen_renderer::{OverlayEdit, Renderer, SceneContext};

pub use lumen_core::glam::{Mat4, Vec2, Vec3, Vec4};
