//! Lyrivid Project Model
//!
//! Defines the core data contracts for Lyrivid:
//! - **Lyrics:** Ordered lyric lines with start times, and their frame-derived form
//! - **Project:** The on-disk lyric project (audio reference, lines, render settings)
//! - **Render:** Render jobs submitted to the server and the progress events it pushes back
//! - **LRC:** Import of timestamped `.lrc` lyric files
//!
//! Lyric timings are stored in seconds. Frame indices only appear in derived
//! data, which is recomputed and never persisted.

pub mod lrc;
pub mod lyrics;
pub mod project;
pub mod render;

pub use lrc::*;
pub use lyrics::*;
pub use project::*;
pub use render::*;
