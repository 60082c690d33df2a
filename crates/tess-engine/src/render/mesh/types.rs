//! CPU-side GPU layouts shared by the mesh renderer.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── draw parameters ───────────────────────────────────────────────────────

/// Per-draw parameters for [`super::MeshRenderer::render`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshDraw {
    pub mvp: Mat4,
    pub view: Mat4,
    pub wireframe: bool,
    /// Blinn-Phong specular when set, procedural stripes otherwise.
    pub specular: bool,
    /// Lights per vertex instead of per fragment; ignored when `tessellated`.
    pub vertex_lighting: bool,
    pub tessellated: bool,
}

impl Default for MeshDraw {
    fn default() -> Self {
        Self {
            mvp: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            wireframe: false,
            specular: false,
            vertex_lighting: false,
            tessellated: false,
        }
    }
}

// ── uniform ───────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct MeshUniform {
    pub mvp: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// `[wireframe, specular, vertex_lighting, tessellated]` as 0/1.
    pub flags: [u32; 4],
}

impl From<&MeshDraw> for MeshUniform {
    fn from(d: &MeshDraw) -> Self {
        Self {
            mvp: d.mvp.to_cols_array_2d(),
            view: d.view.to_cols_array_2d(),
            flags: [
                d.wireframe as u32,
                d.specular as u32,
                d.vertex_lighting as u32,
                d.tessellated as u32,
            ],
        }
    }
}
