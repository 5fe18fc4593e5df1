//! Platform layer
//!
//! - `driver`: the frame loop, independent of any browser API
//! - `web`: browser host (requestAnimationFrame, DOM input, auto-pause)

pub mod driver;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use driver::{FrameHandle, FrameScheduler, LoopDriver, ManualScheduler};
