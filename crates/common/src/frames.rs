//! Frame-rate utilities.
//!
//! Lyric timings are authored in wall-clock seconds while the render server
//! composes discrete video frames. This module owns the conversion between
//! the two so every crate rounds the same way.

use serde::{Deserialize, Serialize};

/// Default composition frame rate.
pub const DEFAULT_FPS: u32 = 30;

/// Fixed conversion factor between seconds and frame indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRate(u32);

impl FrameRate {
    /// Create a frame rate. Zero is bumped to one frame per second so the
    /// conversions below never divide by zero.
    pub fn new(fps: u32) -> Self {
        Self(fps.max(1))
    }

    /// Frames per second.
    pub fn fps(&self) -> u32 {
        self.0
    }

    /// Nearest frame index for a timestamp. Negative and non-finite inputs
    /// map to frame 0.
    pub fn secs_to_frame(&self, secs: f64) -> u64 {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        (secs * self.0 as f64).round() as u64
    }

    /// Number of frames needed to cover `secs` completely (rounded up).
    pub fn secs_to_frames_ceil(&self, secs: f64) -> u64 {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        (secs * self.0 as f64).ceil() as u64
    }

    /// Timestamp of the first instant of a frame.
    pub fn frame_to_secs(&self, frame: u64) -> f64 {
        frame as f64 / self.0 as f64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self(DEFAULT_FPS)
    }
}
