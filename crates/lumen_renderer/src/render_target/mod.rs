//! Size-dependent attachments.
//!
//! The swapchain supplies the colour view of a windowed frame; the renderer
//! owns only the [`DepthTarget`] that goes with it.  [`ColorTarget`] is the
//! off-screen stand-in for headless rendering.

pub mod color;
pub mod depth;

pub use color::ColorTarget;
pub use depth::DepthTarget;
