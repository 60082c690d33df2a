//! GPU timing.
//!
//! `GpuProfiler` measures the GPU execution time of one bracketed region per
//! frame. Two queries are used in a ring so the result read on a given frame
//! always belongs to the previous frame; the CPU never waits on work it just
//! submitted.
//!
//! The device API is reached through `QueryBackend` and wall-clock time
//! through `crate::time::TimeSource`, so the same state machine runs against
//! wgpu or a scripted test backend.

mod backend;
mod error;
mod gpu_profiler;
mod map_slot;
mod wgpu_timer;

pub use backend::QueryBackend;
pub use error::ProfilerError;
pub use gpu_profiler::{GpuProfiler, PUBLISH_INTERVAL_SECS};
pub use wgpu_timer::{WgpuQuery, WgpuTimerBackend};
