use std::time::{Duration, Instant};

use crate::shared::constants::FPS_WINDOW;

/// Windowed frames-per-second measurement.
///
/// Time is passed in by the caller so a synthetic clock can drive it.
#[derive(Clone, Debug)]
pub struct FpsCounter {
    frame_count: u32,
    window_start: Instant,
    window: Duration,
    current_fps: f64,
}

impl FpsCounter {
    pub fn new(start: Instant, window: Duration) -> Self {
        Self {
            frame_count: 0,
            window_start: start,
            window,
            current_fps: 0.0,
        }
    }

    /// Counts one processed frame at `now` and returns the current FPS.
    ///
    /// The value only changes when a full window has elapsed.
    pub fn tick(&mut self, now: Instant) -> f64 {
        self.frame_count += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= self.window && !elapsed.is_zero() {
            self.current_fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.window_start = now;
        }
        self.current_fps
    }

    /// Starts a fresh window without forgetting the last reading.
    pub fn restart(&mut self, now: Instant) {
        self.frame_count = 0;
        self.window_start = now;
    }

    pub fn current_fps(&self) -> f64 {
        self.current_fps
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Instant::now(), FPS_WINDOW)
    }
}
