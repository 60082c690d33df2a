//! Tessellation demo engine crate.
//!
//! Owns the platform + GPU runtime, mesh loading and refinement, the orbit
//! camera, the mesh renderer and the double-buffered GPU timer profiler.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod camera;
pub mod mesh;
pub mod render;
pub mod profiler;
