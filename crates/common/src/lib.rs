//! Lyrivid Common Utilities
//!
//! Shared infrastructure for all Lyrivid crates:
//! - Error types and result aliases
//! - Frame-rate conversions between seconds and video frames
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod frames;
pub mod logging;

pub use config::*;
pub use error::*;
pub use frames::*;
