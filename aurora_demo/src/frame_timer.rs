/// Frame time tracking for the window title
///
/// Frame times are smoothed with an exponential moving average that is only
/// advanced every `UPDATE_INTERVAL`, so the title stays readable.

use std::time::{Duration, Instant};

const UPDATE_INTERVAL: Duration = Duration::from_millis(250);
/// Weight kept from the previous average
const SMOOTHING: f32 = 0.7;

pub struct FrameTimer {
    last_frame: Instant,
    last_update: Instant,
    /// Smoothed frame time in milliseconds (starts at 60 FPS)
    average_frame_time_ms: f32,
}

impl FrameTimer {
    pub fn new(now: Instant) -> Self {
        Self {
            last_frame: now,
            last_update: now,
            average_frame_time_ms: 16.67,
        }
    }

    /// Record a frame ending at `now`
    ///
    /// Returns the new smoothed frame time when the display is due for an update.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        let frame_time_ms = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;

        if now.duration_since(self.last_update) < UPDATE_INTERVAL {
            return None;
        }

        self.average_frame_time_ms =
            self.average_frame_time_ms * SMOOTHING + frame_time_ms * (1.0 - SMOOTHING);
        self.last_update = now;
        Some(self.average_frame_time_ms)
    }

    pub fn title(&self, app_name: &str) -> String {
        let fps = 1000.0 / self.average_frame_time_ms;
        format!("{} - FPS: {:.1} | Frametime: {:.2} ms", app_name, fps, self.average_frame_time_ms)
    }
}

#[cfg(test)]
#[path = "frame_timer_tests.rs"]
mod tests;
