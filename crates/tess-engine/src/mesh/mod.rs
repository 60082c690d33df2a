//! Triangle mesh data, OBJ loading and CPU tessellation.
//!
//! Meshes are indexed triangle lists with one normal per vertex. The
//! tessellated pipeline is evaluated here rather than in shader stages:
//! `tessellate` refines every triangle on a barycentric grid and places the new
//! vertices on a Phong-tessellated surface.

mod data;
mod error;
mod obj_loader;
mod tessellate;

pub use data::MeshData;
pub use error::MeshError;
pub use obj_loader::{load_obj, parse_obj};
pub use tessellate::{tessellate, TessCache, MAX_TESS_LEVEL, PHONG_SHAPE_FACTOR};
