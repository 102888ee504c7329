//! Frame timing for host loops.
//!
//! The simulation advances one fixed step per call and never reads the
//! clock. Hosts use [`FrameClock`] to count frames and report throughput.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! loop {
//!     simulation.tick(&mut canvas);
//!     clock.tick();
//!     if clock.frame() % 60 == 0 {
//!         log::info!("{:.1} fps", clock.fps());
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

/// Frame counter with a periodically refreshed FPS estimate.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    /// Time since last frame in seconds.
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Record a finished frame. Returns the seconds since the previous one.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Total frames recorded.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Seconds between the last two frames.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Seconds since the clock was created.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Most recent FPS estimate. Zero until the first update interval passes.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Average frames per second over the clock's whole lifetime.
    pub fn average_fps(&self) -> f32 {
        let elapsed = self.elapsed();
        if elapsed > 0.0 {
            self.frame_count as f32 / elapsed
        } else {
            0.0
        }
    }

    /// How often [`fps`](Self::fps) is recomputed.
    pub fn set_fps_update_interval(&mut self, interval: Duration) {
        self.fps_update_interval = interval;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
