//! Per-draw constant data staging.
//!
//! A single ring of GPU memory receives every constant payload of a frame.
//! [`ConstantStager`] owns the CPU side (allocation, mapping policy, dirty
//! tracking, statistics) and is testable without a device;
//! [`GpuConstantRing`] owns the `wgpu::Buffer` and the dynamic-offset bind
//! groups the draws are bound through.

pub mod gpu;
pub mod ring;
pub mod stager;

use thiserror::Error;

pub use gpu::GpuConstantRing;
pub use ring::{align_up, RingAllocator, RingRegion};
pub use stager::{
    ConstantStager, MapMode, ShaderStage, StagedBinding, StagingConfig, StagingStats,
    CONSTANT_ALIGNMENT, MAX_CONSTANT_SLOTS,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagingError {
    #[error("constant payload is empty")]
    EmptyPayload,

    #[error("constant payload of {len} bytes is not padded to a multiple of 16 bytes")]
    Unpadded { len: usize },

    #[error("constant slot {slot} exceeds the per-stage limit of 4 slots")]
    SlotOutOfRange { slot: u32 },

    #[error("constant payload of {size} bytes exceeds the {limit}-byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error(
        "frame overflow: {requested} more bytes would overwrite the {frame_bytes} bytes \
         already staged this frame (ring capacity {capacity})"
    )]
    FrameOverflow {
        requested: u64,
        frame_bytes: u64,
        capacity: u64,
    },

    #[error("ring of {capacity} bytes cannot hold {draws} draws of {per_draw} bytes each")]
    InsufficientCapacity { capacity: u64, draws: u32, per_draw: u64 },

    #[error("ring alignment {0} is not a power of two")]
    InvalidAlignment(u64),

    #[error("ring capacity of {0} bytes does not fit a 32-bit dynamic offset")]
    CapacityTooLarge(u64),
}
