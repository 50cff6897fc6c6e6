//! Frame-aware ring sub-allocator.
//!
//! Pure bookkeeping over a `capacity`-byte address range: no GPU objects
//! live here.  Regions are handed out front to back, every one aligned to
//! the ring's alignment; when a request does not fit in the tail the ring
//! wraps to offset `0`.
//!
//! Reuse of bytes written in *earlier* frames is safe because the staging
//! writes of a frame are queued before its submission.  Reuse of bytes
//! written in the *current* frame is not, so a wrap that would run into the
//! start of the current frame is reported as [`StagingError::FrameOverflow`]
//! instead of silently overwriting data the GPU has not read yet.

use super::StagingError;

/// Round `value` up to the next multiple of `alignment` (a power of two).
#[inline]
pub fn align_up(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// One sub-allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RingRegion {
    pub offset: u64,
    /// Aligned size reserved for the region (`>=` the requested size).
    pub size: u64,
    /// `true` if producing this region wrapped the ring to offset `0`.
    pub wrapped: bool,
}

impl RingRegion {
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

#[derive(Debug, Clone)]
pub struct RingAllocator {
    capacity: u64,
    alignment: u64,
    head: u64,
    frame_start: u64,
    wrapped_this_frame: bool,
    wrap_count: u64,
}

impl RingAllocator {
    /// `capacity` is rounded up to a whole number of alignment units.
    pub fn new(capacity: u64, alignment: u64) -> Result<Self, StagingError> {
        if !alignment.is_power_of_two() {
            return Err(StagingError::InvalidAlignment(alignment));
        }
        if capacity == 0 {
            return Err(StagingError::InsufficientCapacity {
                capacity,
                draws: 0,
                per_draw: 0,
            });
        }
        Ok(Self {
            capacity: align_up(capacity, alignment),
            alignment,
            head: 0,
            frame_start: 0,
            wrapped_this_frame: false,
            wrap_count: 0,
        })
    }

    /// Marks the current head as the first byte of a new frame.  Everything
    /// written before it becomes reusable once the ring wraps around to it.
    pub fn begin_frame(&mut self) {
        if self.head >= self.capacity {
            self.head = 0;
        }
        self.frame_start = self.head;
        self.wrapped_this_frame = false;
    }

    /// Reserves `size` bytes, rounded up to the alignment.
    pub fn allocate(&mut self, size: u64) -> Result<RingRegion, StagingError> {
        let aligned = align_up(size.max(1), self.alignment);
        if aligned > self.capacity {
            return Err(StagingError::PayloadTooLarge {
                size,
                limit: self.capacity,
            });
        }

        // Once wrapped, the current frame's own regions start at `frame_start`.
        let limit = if self.wrapped_this_frame {
            self.frame_start
        } else {
            self.capacity
        };

        let (offset, wrapped) = if self.head + aligned <= limit {
            (self.head, false)
        } else if !self.wrapped_this_frame && aligned <= self.frame_start {
            self.wrapped_this_frame = true;
            self.wrap_count += 1;
            (0, true)
        } else {
            return Err(StagingError::FrameOverflow {
                requested: aligned,
                frame_bytes: self.frame_used(),
                capacity: self.capacity,
            });
        };

        self.head = offset + aligned;
        Ok(RingRegion {
            offset,
            size: aligned,
            wrapped,
        })
    }

    /// Bytes handed out since the last [`RingAllocator::begin_frame`].
    pub fn frame_used(&self) -> u64 {
        if self.wrapped_this_frame {
            (self.capacity - self.frame_start) + self.head
        } else {
            self.head - self.frame_start
        }
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    #[inline]
    pub fn head(&self) -> u64 {
        self.head
    }

    /// Total wraps since construction.
    #[inline]
    pub fn wrap_count(&self) -> u64 {
        self.wrap_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_power_of_two() {
        assert_eq!(align_up(0, 16), 0);
        assert_eq!(align_up(1, 16), 16);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(384, 256), 512);
    }

    #[test]
    fn sequential_regions_are_aligned_and_disjoint() {
        let mut ring = RingAllocator::new(4096, 16).unwrap();
        let sizes = [16u64, 48, 256, 384, 32, 64, 112];
        let regions: Vec<_> = sizes.iter().map(|&s| ring.allocate(s).unwrap()).collect();

        for (r, &s) in regions.iter().zip(&sizes) {
            assert_eq!(r.offset % 16, 0);
            assert!(r.size >= s);
            assert!(!r.wrapped);
        }
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                assert!(a.end() <= b.offset || b.end() <= a.offset, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn odd_sizes_keep_device_alignment() {
        let mut ring = RingAllocator::new(8192, 256).unwrap();
        let a = ring.allocate(384).unwrap();
        let b = ring.allocate(16).unwrap();
        assert_eq!((a.offset, a.size), (0, 512));
        assert_eq!((b.offset, b.size), (512, 256));
    }

    #[test]
    fn wraps_to_zero_when_tail_is_too_small() {
        let mut ring = RingAllocator::new(1024, 16).unwrap();
        ring.begin_frame();
        for _ in 0..3 {
            ring.allocate(256).unwrap();
        }
        // 256 bytes left in the tail; the next frame asks for more
        ring.begin_frame();
        let r = ring.allocate(320).unwrap();
        assert_eq!(r.offset, 0);
        assert!(r.wrapped);
        assert_eq!(ring.wrap_count(), 1);
        assert_eq!(ring.frame_used(), 256 + 320);
    }

    #[test]
    fn wrap_into_current_frame_is_an_overflow() {
        let mut ring = RingAllocator::new(1024, 16).unwrap();
        ring.begin_frame();
        for _ in 0..4 {
            ring.allocate(256).unwrap();
        }
        let err = ring.allocate(16).unwrap_err();
        assert!(matches!(err, StagingError::FrameOverflow { frame_bytes: 1024, .. }));
    }

    #[test]
    fn wrapped_frame_stops_at_its_own_start() {
        let mut ring = RingAllocator::new(1024, 16).unwrap();
        ring.begin_frame();
        ring.allocate(512).unwrap();
        ring.begin_frame(); // frame starts at 512
        ring.allocate(512).unwrap(); // fills the tail exactly
        ring.allocate(256).unwrap(); // wraps to 0
        ring.allocate(256).unwrap(); // 256..512, touches the frame start
        assert!(matches!(
            ring.allocate(16),
            Err(StagingError::FrameOverflow { .. })
        ));
    }

    #[test]
    fn full_ring_restarts_at_zero_on_next_frame() {
        let mut ring = RingAllocator::new(512, 16).unwrap();
        ring.begin_frame();
        ring.allocate(512).unwrap();
        ring.begin_frame();
        let r = ring.allocate(64).unwrap();
        assert_eq!(r.offset, 0);
        assert!(!r.wrapped);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            RingAllocator::new(1024, 24),
            Err(StagingError::InvalidAlignment(24))
        ));
        assert!(RingAllocator::new(0, 16).is_err());
        let mut ring = RingAllocator::new(256, 16).unwrap();
        assert!(matches!(
            ring.allocate(257),
            Err(StagingError::PayloadTooLarge { .. })
        ));
    }
}
