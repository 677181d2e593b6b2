//! Lyrivid Render Client
//!
//! Talks to the render server and tracks one render at a time.
//!
//! # Session Flow
//!
//! ```text
//!            trigger (lyrics + audio present, slot free)
//!   idle ───────────────────────────────────────────────▶ requested
//!    ▲                                                        │
//!    │                          ┌── POST /render ◀────────────┤ (concurrently)
//!    │                          │                             │
//!    │                          ▼                             ▼
//!    │               submission error           GET /render-progress (SSE)
//!    │                          │                 bundling → rendering(p)
//!    │                          │                             │
//!    └──────── close channel, notify ◀──── complete | error | transport loss
//! ```

pub mod api;
pub mod channel;
pub mod controller;
pub mod error;
pub mod job;
pub mod notify;
pub mod session;
pub mod sse;

pub use api::*;
pub use channel::*;
pub use controller::*;
pub use error::*;
pub use job::*;
pub use notify::*;
pub use session::*;
