/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Accumulated time across all ticks, in seconds.
    pub total: f32,

    /// Timestamp handed to the tick, in milliseconds.
    pub timestamp_ms: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots from scheduler timestamps.
///
/// The clock never reads a wall clock itself: the caller supplies the
/// millisecond timestamp of each frame. Time therefore only advances on an
/// actual tick, and a long gap between two ticks (a stopped lifecycle, a hidden
/// window) flows straight into the next `dt`.
///
/// Delta time is not clamped.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_timestamp: Option<f64>,
    total: f64,
    frame_index: u64,
}

impl FrameClock {
    /// Creates a clock with no prior timestamp and zero accumulated time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock to `timestamp_ms` and returns a new `FrameTime`.
    ///
    /// The first tick reports `dt = 0`. A timestamp older than the previous one
    /// reports `dt = 0` as well and leaves the latest timestamp in place, so
    /// `total` never decreases and never counts an interval twice.
    pub fn tick(&mut self, timestamp_ms: f64) -> FrameTime {
        let (dt, latest) = match self.last_timestamp {
            Some(last) => (((timestamp_ms - last) / 1000.0).max(0.0), last.max(timestamp_ms)),
            None => (0.0, timestamp_ms),
        };

        self.last_timestamp = Some(latest);
        self.total += dt;

        let ft = FrameTime {
            dt: dt as f32,
            total: self.total as f32,
            timestamp_ms,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }

    /// Accumulated time in seconds.
    pub fn total(&self) -> f32 {
        self.total as f32
    }

    /// Latest timestamp seen so far, if any.
    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// Number of ticks taken so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }
}
