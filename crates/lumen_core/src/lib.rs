//! `lumen_core`: GPU-agnostic state shared by the renderer and the app.
//!
//! | Module       | Responsibility                                          |
//! |--------------|---------------------------------------------------------|
//! | `transform`  | Position / rotation / scale with lazy world matrices    |
//! | `camera`     | Free-look camera with cached view / projection          |
//! | `controller` | Key bindings and speeds for camera motion               |
//! | `light`      | GPU-layout light records and the fixed light array      |
//! | `color`      | Linear RGBA colour                                      |
//! | `input`      | Keyboard / mouse state fed from winit                   |
//! | `time`       | Frame clock                                             |
//! | `context`    | wgpu adapter / device bootstrap                         |

pub mod camera;
pub mod color;
pub mod context;
pub mod controller;
pub mod error;
pub mod input;
pub mod light;
pub mod time;
pub mod transform;

pub use glam;

pub use camera::{Camera, Lens};
pub use color::Color;
pub use context::{ContextError, GpuContext};
pub use controller::Controller;
pub use error::CapacityError;
pub use input::{InputState, KeyCode, MouseButton};
pub use light::{Light, LightArray, LightKind, MAX_LIGHTS};
pub use time::{Time, TimeClock};
pub use transform::Transform;
