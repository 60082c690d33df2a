//! Time subsystem.
//!
//! - `FrameClock` produces clamped per-frame deltas for the render loop.
//! - `TimeSource` is the monotonic seconds clock consumed by the GPU profiler;
//!   `MonotonicClock` is the `Instant`-backed implementation.

mod frame_clock;
mod monotonic;

pub use frame_clock::{FrameClock, FrameTime};
pub use monotonic::{MonotonicClock, TimeSource};
