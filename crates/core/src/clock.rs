//! Fixed-rate frame pacing.
//!
//! [`FrameClock::tick`] sleeps away whatever is left of the current frame's
//! budget. It throttles, it does not schedule: a slow frame is simply late
//! and the next budget starts from when `tick` returned.

use std::time::{Duration, Instant};

/// Default cadence of the loop.
pub const DEFAULT_FPS: u32 = 60;

#[derive(Debug)]
pub struct FrameClock {
    budget: Duration,
    last: Instant,
    frames: u64,
}

impl FrameClock {
    /// A clock targeting `fps` frames per second. `fps == 0` disables
    /// throttling.
    pub fn new(fps: u32) -> Self {
        let budget = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / fps as f64)
        };
        Self {
            budget,
            last: Instant::now(),
            frames: 0,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Time left in the current frame budget.
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.last.elapsed())
    }

    /// Sleeps out the rest of the budget and starts the next frame.
    /// Returns how long it slept.
    pub fn tick(&mut self) -> Duration {
        let wait = self.remaining();
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
        self.last = Instant::now();
        self.frames += 1;
        wait
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}
