//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single application window, and binds
//! the GPU layer to it.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
