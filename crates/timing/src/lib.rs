//! Lyrivid Timing
//!
//! Maps edited lyric lines onto video frames:
//! - **Deriver:** per-line frame ranges and the total video length
//! - **Memoization:** reuse of the last result while inputs are unchanged
//! - **Subtitles:** SRT/VTT output from derived timings

pub mod deriver;
pub mod subtitles;

pub use deriver::*;
pub use subtitles::*;
