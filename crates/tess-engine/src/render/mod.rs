//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers) and record passes
//! into the frame encoder handed over by `core::FrameCtx::render`.
//!
//! Convention:
//! - world space is right-handed, +Y up
//! - depth uses wgpu's `[0, 1]` range with `Less` comparison

mod ctx;
pub mod mesh;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::{GpuMesh, MeshDraw, MeshRenderer};
