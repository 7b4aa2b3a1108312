//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta: Duration,
    total: Duration,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            total: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance the timer by one frame and return the frame delta
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_frame);
        self.total += self.delta;
        self.last_frame = now;
        self.frame_count += 1;
        self.delta
    }

    /// Get the time since the last frame
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get the total elapsed time accumulated over all frames
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        let total = self.total.as_secs_f32();
        if total > 0.0 {
            self.frame_count as f32 / total
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_accumulates_time_and_frames() {
        let mut timer = Timer::new();
        assert_eq!(timer.frame_count(), 0);

        std::thread::sleep(Duration::from_millis(2));
        let delta = timer.tick();

        assert!(delta > Duration::ZERO);
        assert_eq!(timer.frame_count(), 1);
        assert_eq!(timer.total(), delta);
    }

    #[test]
    fn test_total_is_monotonic() {
        let mut timer = Timer::new();
        timer.tick();
        let first = timer.total();
        timer.tick();
        assert!(timer.total() >= first);
    }
}
