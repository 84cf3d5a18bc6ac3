//! Frame pacing for hosts without a display-driven callback.
//!
//! In the browser, `requestAnimationFrame` drives [`crate::Stage::tick`]
//! directly. Native and headless hosts use a [`FrameScheduler`] instead.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Decides when the next frame starts.
pub trait FrameScheduler {
    /// Wait for the next frame. Returns false when no more frames should run.
    fn next_frame(&mut self) -> bool;
}

/// Runs a fixed number of frames back to back.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    remaining: u64,
}

impl ManualScheduler {
    pub fn new(frames: u64) -> Self {
        Self { remaining: frames }
    }

    /// Frames left to run.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl FrameScheduler for ManualScheduler {
    fn next_frame(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Paces frames at a fixed interval by sleeping the current thread.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: Duration,
    next_deadline: Option<Instant>,
    frame_limit: Option<u64>,
    frames: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl IntervalScheduler {
    /// Create a scheduler ticking every `interval`, without a frame limit.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
            frame_limit: None,
            frames: 0,
        }
    }

    /// Stop after `limit` frames.
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    /// Frames started so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameScheduler for IntervalScheduler {
    fn next_frame(&mut self) -> bool {
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
            return false;
        }

        let now = Instant::now();
        let deadline = match self.next_deadline {
            Some(deadline) if deadline > now => {
                std::thread::sleep(deadline - now);
                deadline
            }
            // First frame, or we fell behind: start from now.
            _ => now,
        };

        self.next_deadline = Some(deadline + self.interval);
        self.frames += 1;
        true
    }
}
