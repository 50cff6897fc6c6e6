//! Frame timing.
//!
//! The runner owns a [`TimeClock`] and ticks it once per frame; everything
//! else receives the resulting [`Time`] snapshot.  `elapsed` feeds the pixel
//! payload's time field.

use std::time::Instant;

/// Longest frame step handed to game code, in seconds.
pub const MAX_DELTA: f32 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Seconds since the previous tick, clamped to [`MAX_DELTA`].
    pub delta: f32,
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Zero on the first frame.
    pub frame_count: u64,
    pub fps: f32,
}

impl Time {
    /// Snapshot for a fixed step, used by tests and headless drivers.
    pub fn fixed(frame_count: u64, delta: f32) -> Self {
        Self {
            delta,
            elapsed: frame_count as f64 * delta as f64,
            frame_count,
            fps: if delta > 0.0 { 1.0 / delta } else { 0.0 },
        }
    }
}

pub struct TimeClock {
    start: Instant,
    last_tick: Instant,
    frame_count: u64,
}

impl Default for TimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            frame_count: 0,
        }
    }

    /// Current snapshot without advancing the frame counter.
    pub fn peek(&self) -> Time {
        self.snapshot(Instant::now())
    }

    /// Advances one frame.
    pub fn tick(&mut self) -> Time {
        let now = Instant::now();
        let time = self.snapshot(now);
        self.last_tick = now;
        self.frame_count += 1;
        time
    }

    fn snapshot(&self, now: Instant) -> Time {
        let delta = (now - self.last_tick).as_secs_f32().min(MAX_DELTA);
        Time {
            delta,
            elapsed: (now - self.start).as_secs_f64(),
            frame_count: self.frame_count,
            fps: if delta > 0.0 { 1.0 / delta } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counts_frames() {
        let mut clock = TimeClock::new();
        assert_eq!(clock.tick().frame_count, 0);
        assert_eq!(clock.tick().frame_count, 1);
        assert_eq!(clock.peek().frame_count, 2);
        assert!(clock.peek().delta <= MAX_DELTA);
    }

    #[test]
    fn fixed_step() {
        let t = Time::fixed(10, 0.5);
        assert_eq!(t.elapsed, 5.0);
        assert_eq!(t.fps, 2.0);
    }
}
