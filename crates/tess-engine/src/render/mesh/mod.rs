//! Shaded triangle-mesh rendering.

mod gpu_mesh;
mod renderer;
mod types;

pub use gpu_mesh::GpuMesh;
pub use renderer::{polygon_mode, MeshRenderer};
pub use types::MeshDraw;
