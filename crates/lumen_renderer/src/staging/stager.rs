use std::ops::Range;

use super::ring::{align_up, RingAllocator};
use super::StagingError;

/// Constant payloads must be padded to this many bytes.
pub const CONSTANT_ALIGNMENT: u64 = 16;

/// Constant slots per shader stage.
pub const MAX_CONSTANT_SLOTS: u32 = 4;

/// Pipeline stage a constant region is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Vertex, ShaderStage::Pixel];

    /// Bind group holding this stage's constant slots.
    #[inline]
    pub fn bind_group(self) -> u32 {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Pixel => 1,
        }
    }

    #[inline]
    pub fn visibility(self) -> wgpu::ShaderStages {
        match self {
            ShaderStage::Vertex => wgpu::ShaderStages::VERTEX,
            ShaderStage::Pixel => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

/// CPU write mode used for a staging map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// First map of a frame: prior contents are irrelevant to the writer.
    WriteDiscard,
    /// Later maps in the same frame: only fresh bytes are written, nothing
    /// the GPU may still read is touched.
    WriteNoOverwrite,
}

/// A staged region bound to `(stage, slot)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StagedBinding {
    pub stage: ShaderStage,
    pub slot: u32,
    /// Byte offset into the ring; used as the dynamic offset.
    pub offset: u64,
    /// Payload length in bytes.
    pub size: u64,
}

/// Ring sizing.  Build with [`StagingConfig::sized_for`] unless the capacity
/// is dictated from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingConfig {
    /// Ring size in bytes.
    pub capacity: u64,
    /// Device dynamic-offset alignment; clamped to at least
    /// [`CONSTANT_ALIGNMENT`].
    pub alignment: u64,
    pub max_draws_per_frame: u32,
    /// Payload sizes staged for one draw, e.g. `[vertex, pixel]`.
    pub draw_payloads: Vec<u64>,
}

impl StagingConfig {
    /// Ring holding `frames` whole frames of `max_draws` draws each.
    pub fn sized_for(max_draws: u32, draw_payloads: &[u64], alignment: u64, frames: u32) -> Self {
        let mut config = Self {
            capacity: 0,
            alignment,
            max_draws_per_frame: max_draws,
            draw_payloads: draw_payloads.to_vec(),
        };
        config.capacity = config.frame_bytes() * u64::from(frames.max(1));
        config
    }

    #[inline]
    pub fn ring_alignment(&self) -> u64 {
        self.alignment.max(CONSTANT_ALIGNMENT)
    }

    /// Ring bytes one draw reserves once every payload is aligned.
    pub fn per_draw_bytes(&self) -> u64 {
        let align = self.ring_alignment();
        self.draw_payloads.iter().map(|&p| align_up(p, align)).sum()
    }

    pub fn frame_bytes(&self) -> u64 {
        self.per_draw_bytes() * u64::from(self.max_draws_per_frame)
    }

    /// Largest single payload the ring binds, rounded to
    /// [`CONSTANT_ALIGNMENT`].
    pub fn max_payload_bytes(&self) -> u64 {
        self.draw_payloads
            .iter()
            .map(|&p| align_up(p, CONSTANT_ALIGNMENT))
            .max()
            .unwrap_or(CONSTANT_ALIGNMENT)
    }

    /// Rejects rings that cannot hold one full frame.  A ring without room
    /// for a second frame works but reuses last frame's bytes immediately,
    /// which is only logged.
    pub fn validate(&self) -> Result<(), StagingError> {
        let align = self.ring_alignment();
        if !align.is_power_of_two() {
            return Err(StagingError::InvalidAlignment(self.alignment));
        }
        let capacity = align_up(self.capacity, align);
        if capacity > u64::from(u32::MAX) {
            return Err(StagingError::CapacityTooLarge(capacity));
        }
        let frame = self.frame_bytes();
        if capacity == 0 || frame > capacity {
            return Err(StagingError::InsufficientCapacity {
                capacity,
                draws: self.max_draws_per_frame,
                per_draw: self.per_draw_bytes(),
            });
        }
        if capacity < frame * 2 {
            log::warn!(
                "constant ring of {capacity} bytes has no slack beyond one {frame}-byte frame"
            );
        }
        Ok(())
    }
}

/// Per-frame staging counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingStats {
    pub frame: u64,
    pub stage_calls: u32,
    /// Payload bytes copied.
    pub bytes_staged: u64,
    /// Ring bytes reserved, including alignment padding.
    pub bytes_reserved: u64,
    pub wraps: u32,
    pub discard_maps: u32,
    pub no_overwrite_maps: u32,
}

/// CPU side of the constant ring.
///
/// Every [`ConstantStager::stage`] call reserves a fresh aligned region,
/// "maps" it, copies the payload into a persistent CPU shadow of the ring and
/// records the written range.  [`ConstantStager::flush`] hands the coalesced
/// ranges to the GPU uploader once per frame.
pub struct ConstantStager {
    config: StagingConfig,
    ring: RingAllocator,
    shadow: Vec<u8>,
    dirty: Vec<Range<u64>>,
    max_payload: u64,

    mapped_this_frame: bool,
    last_map: Option<MapMode>,
    frame: u64,
    stats: StagingStats,
    last_stats: StagingStats,
}

impl ConstantStager {
    pub fn new(config: StagingConfig) -> Result<Self, StagingError> {
        config.validate()?;
        let ring = RingAllocator::new(config.capacity, config.ring_alignment())?;
        log::info!(
            "constant ring: {} bytes, alignment {}, {} bytes per draw",
            ring.capacity(),
            ring.alignment(),
            config.per_draw_bytes()
        );
        Ok(Self {
            shadow: vec![0; ring.capacity() as usize],
            max_payload: config.max_payload_bytes(),
            config,
            ring,
            dirty: Vec::new(),
            mapped_this_frame: false,
            last_map: None,
            frame: 0,
            stats: StagingStats::default(),
            last_stats: StagingStats::default(),
        })
    }

    /// Opens a new frame: rolls the statistics over and resets the map policy.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        self.last_stats = std::mem::replace(
            &mut self.stats,
            StagingStats {
                frame: self.frame,
                ..Default::default()
            },
        );
        self.ring.begin_frame();
        self.mapped_this_frame = false;
    }

    /// Copies `data` into a fresh region and returns its binding for
    /// `(stage, slot)`.
    ///
    /// `data` must already be padded to [`CONSTANT_ALIGNMENT`].
    pub fn stage(
        &mut self,
        data: &[u8],
        stage: ShaderStage,
        slot: u32,
    ) -> Result<StagedBinding, StagingError> {
        if data.is_empty() {
            return Err(StagingError::EmptyPayload);
        }
        if data.len() as u64 % CONSTANT_ALIGNMENT != 0 {
            return Err(StagingError::Unpadded { len: data.len() });
        }
        if slot >= MAX_CONSTANT_SLOTS {
            return Err(StagingError::SlotOutOfRange { slot });
        }
        let len = data.len() as u64;
        if len > self.max_payload {
            return Err(StagingError::PayloadTooLarge {
                size: len,
                limit: self.max_payload,
            });
        }

        let region = self.ring.allocate(len)?;
        if region.wrapped {
            self.stats.wraps += 1;
            log::debug!("constant ring wrapped in frame {}", self.frame);
        }

        self.map();
        let start = region.offset as usize;
        self.shadow[start..start + data.len()].copy_from_slice(data);
        self.unmap(region.offset..region.offset + len);

        self.stats.stage_calls += 1;
        self.stats.bytes_staged += len;
        self.stats.bytes_reserved += region.size;

        Ok(StagedBinding {
            stage,
            slot,
            offset: region.offset,
            size: len,
        })
    }

    /// [`ConstantStager::stage`] for a `Pod` payload struct.
    pub fn stage_pod<T: bytemuck::Pod>(
        &mut self,
        payload: &T,
        stage: ShaderStage,
        slot: u32,
    ) -> Result<StagedBinding, StagingError> {
        self.stage(bytemuck::bytes_of(payload), stage, slot)
    }

    fn map(&mut self) -> MapMode {
        let mode = if self.mapped_this_frame {
            self.stats.no_overwrite_maps += 1;
            MapMode::WriteNoOverwrite
        } else {
            self.stats.discard_maps += 1;
            MapMode::WriteDiscard
        };
        self.mapped_this_frame = true;
        self.last_map = Some(mode);
        mode
    }

    /// Records the written range, merging it into the previous one when the
    /// two are separated by alignment padding at most.
    fn unmap(&mut self, written: Range<u64>) {
        let align = self.ring.alignment();
        if let Some(last) = self.dirty.last_mut() {
            if written.start >= last.start && written.start <= align_up(last.end, align) {
                last.end = last.end.max(written.end);
                return;
            }
        }
        self.dirty.push(written);
    }

    /// Hands every written range to `write(offset, bytes)` and clears them.
    /// Returns the number of bytes handed over.
    pub fn flush(&mut self, mut write: impl FnMut(u64, &[u8])) -> u64 {
        let mut flushed = 0;
        for range in self.dirty.drain(..) {
            write(range.start, &self.shadow[range.start as usize..range.end as usize]);
            flushed += range.end - range.start;
        }
        flushed
    }

    /// Bytes currently staged for `binding`.
    pub fn staged_bytes(&self, binding: &StagedBinding) -> &[u8] {
        let start = binding.offset as usize;
        &self.shadow[start..start + binding.size as usize]
    }

    /// Counters of the frame in progress.
    #[inline]
    pub fn stats(&self) -> &StagingStats {
        &self.stats
    }

    /// Counters of the previous, completed frame.
    #[inline]
    pub fn last_frame_stats(&self) -> &StagingStats {
        &self.last_stats
    }

    #[inline]
    pub fn last_map_mode(&self) -> Option<MapMode> {
        self.last_map
    }

    #[inline]
    pub fn pending_ranges(&self) -> &[Range<u64>] {
        &self.dirty
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.ring.capacity()
    }

    #[inline]
    pub fn alignment(&self) -> u64 {
        self.ring.alignment()
    }

    /// Size every ring binding exposes to shaders.
    #[inline]
    pub fn binding_size(&self) -> u64 {
        self.max_payload
    }

    #[inline]
    pub fn config(&self) -> &StagingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX_BYTES: u64 = 256;
    const PIXEL_BYTES: u64 = 384;

    fn stager_for(draws: u32, alignment: u64, frames: u32) -> ConstantStager {
        let config =
            StagingConfig::sized_for(draws, &[VERTEX_BYTES, PIXEL_BYTES], alignment, frames);
        ConstantStager::new(config).unwrap()
    }

    fn draw(stager: &mut ConstantStager, fill: u8) -> Result<(), StagingError> {
        stager.stage(&[fill; VERTEX_BYTES as usize], ShaderStage::Vertex, 0)?;
        stager.stage(&[fill; PIXEL_BYTES as usize], ShaderStage::Pixel, 0)?;
        Ok(())
    }

    #[test]
    fn rejects_malformed_payloads() {
        let mut s = stager_for(4, 16, 2);
        assert_eq!(s.stage(&[], ShaderStage::Vertex, 0), Err(StagingError::EmptyPayload));
        assert_eq!(
            s.stage(&[0; 20], ShaderStage::Vertex, 0),
            Err(StagingError::Unpadded { len: 20 })
        );
        assert_eq!(
            s.stage(&[0; 16], ShaderStage::Pixel, MAX_CONSTANT_SLOTS),
            Err(StagingError::SlotOutOfRange { slot: 4 })
        );
        assert!(matches!(
            s.stage(&[0; 512], ShaderStage::Pixel, 0),
            Err(StagingError::PayloadTooLarge { size: 512, limit: 384 })
        ));
        assert_eq!(s.stats().stage_calls, 0);
    }

    #[test]
    fn twenty_one_draws_fit_a_ring_sized_for_twenty_one() {
        let mut s = stager_for(21, 256, 1);
        assert_eq!(s.capacity(), 21 * (256 + 512));

        for frame in 0..3u8 {
            s.begin_frame();
            for _ in 0..21 {
                draw(&mut s, frame).unwrap();
            }
            assert_eq!(s.stats().wraps, 0, "frame {frame} wrapped");
            assert_eq!(s.stats().stage_calls, 42);
        }
        // a 22nd draw has nowhere to go without clobbering this frame
        assert!(matches!(
            draw(&mut s, 9),
            Err(StagingError::FrameOverflow { .. })
        ));
    }

    #[test]
    fn regions_are_aligned_and_hold_the_payload() {
        let mut s = stager_for(8, 64, 2);
        s.begin_frame();
        let a = s.stage(&[1; 256], ShaderStage::Vertex, 0).unwrap();
        let b = s.stage(&[2; 48], ShaderStage::Pixel, 2).unwrap();
        assert_eq!(a.offset % 64, 0);
        assert_eq!(b.offset % 64, 0);
        assert!(a.offset + a.size <= b.offset);
        assert_eq!((b.stage, b.slot, b.size), (ShaderStage::Pixel, 2, 48));
        assert!(s.staged_bytes(&a).iter().all(|&x| x == 1));
        assert!(s.staged_bytes(&b).iter().all(|&x| x == 2));
    }

    #[test]
    fn discard_on_first_map_of_each_frame() {
        let mut s = stager_for(4, 16, 3);
        s.begin_frame();
        draw(&mut s, 0).unwrap();
        assert_eq!(s.last_map_mode(), Some(MapMode::WriteNoOverwrite));
        draw(&mut s, 0).unwrap();
        assert_eq!((s.stats().discard_maps, s.stats().no_overwrite_maps), (1, 3));

        s.begin_frame();
        s.stage(&[0; 16], ShaderStage::Vertex, 1).unwrap();
        assert_eq!(s.last_map_mode(), Some(MapMode::WriteDiscard));
        assert_eq!(s.last_frame_stats().stage_calls, 4);
        assert_eq!(s.stats().frame, 2);
    }

    #[test]
    fn flush_coalesces_adjacent_writes() {
        let mut s = stager_for(2, 16, 1);
        s.begin_frame();
        s.stage(&[7; 32], ShaderStage::Vertex, 0).unwrap();
        s.stage(&[8; 16], ShaderStage::Pixel, 0).unwrap();
        assert_eq!(s.pending_ranges(), &[0..48]);

        let mut writes = Vec::new();
        let bytes = s.flush(|offset, data| writes.push((offset, data.to_vec())));
        assert_eq!(bytes, 48);
        assert_eq!(writes.len(), 1);
        assert_eq!(&writes[0].1[..32], &[7; 32]);
        assert_eq!(&writes[0].1[32..], &[8; 16]);
        assert!(s.pending_ranges().is_empty());
    }

    #[test]
    fn wrap_splits_dirty_ranges() {
        // two frames of one 256 + 384 draw at 16-byte alignment
        let mut s = stager_for(1, 16, 2);
        s.begin_frame();
        draw(&mut s, 1).unwrap();
        s.flush(|_, _| {});

        s.begin_frame();
        s.stage(&[2; 256], ShaderStage::Vertex, 0).unwrap();
        // 1280 - 896 = 384 left in the tail, then the ring wraps
        s.stage(&[3; 384], ShaderStage::Pixel, 0).unwrap();
        let b = s.stage(&[4; 256], ShaderStage::Vertex, 1).unwrap();
        assert_eq!(b.offset, 0);
        assert_eq!(s.stats().wraps, 1);
        assert_eq!(s.pending_ranges(), &[640..1280, 0..256]);
    }

    #[test]
    fn capacity_is_checked_at_construction() {
        let mut config = StagingConfig::sized_for(21, &[256, 384], 256, 1);
        config.capacity -= 256;
        assert!(matches!(
            ConstantStager::new(config),
            Err(StagingError::InsufficientCapacity { draws: 21, per_draw: 768, .. })
        ));

        let small = StagingConfig::sized_for(3, &[64], 4, 2);
        assert_eq!(small.ring_alignment(), 16);
        assert!(small.validate().is_ok());
    }
}
