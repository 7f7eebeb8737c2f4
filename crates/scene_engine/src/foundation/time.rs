//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_ms: f32,
    total_ms: f64,
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
            delta_ms: 0.0,
            total_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_ms = elapsed.as_secs_f32() * 1000.0;
        self.total_ms += f64::from(self.delta_ms);
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in milliseconds
    pub const fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    /// Get the total elapsed time since timer creation in milliseconds
    pub const fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// Get the current frame count
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average frame time in milliseconds
    pub fn average_frame_ms(&self) -> f64 {
        if self.frame_count > 0 {
            self.total_ms / self.frame_count as f64
        } else {
            0.0
        }
    }
}
