//! Frame recording.
//!
//! A frame is first recorded on the CPU into a [`FramePlan`], an ordered list
//! of [`FrameCommand`]s, by the [`FrameOrchestrator`].  The GPU executor
//! (`passes::ForwardPass`) replays the plan afterwards.  Keeping the two
//! apart makes the per-frame sequencing testable without a device.

pub mod commands;
pub mod orchestrator;
pub mod packet;
pub mod state;

pub use commands::{FrameCommand, FramePlan};
pub use orchestrator::{FrameOrchestrator, FrameRecorder};
pub use packet::CameraPacket;
pub use state::{MaterialKey, PipelineState, ResolvedDraw};
