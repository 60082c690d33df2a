use std::num::NonZeroU64;

use crate::render::{RenderCtx, RenderTarget};

use super::gpu_mesh::GpuMesh;
use super::types::{MeshDraw, MeshUniform, MeshVertex};

const UNIFORM_SIZE: u64 = std::mem::size_of::<MeshUniform>() as u64;

/// Shaded mesh renderer.
///
/// Pipelines are built lazily for the current surface format: one filled, and
/// one line pipeline when the device has `POLYGON_MODE_LINE`. Depth testing
/// and back-face culling are always on.
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    fill_pipeline: Option<wgpu::RenderPipeline>,
    line_pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    uniform_buffer: Option<wgpu::Buffer>,

    warned_no_wireframe: bool,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `mesh` into `target` in its own render pass, loading the existing
    /// color and depth contents.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mesh: &GpuMesh,
        draw: &MeshDraw,
    ) {
        self.ensure_pipelines(ctx);
        self.ensure_bindings(ctx);

        if mesh.index_count() == 0 {
            return;
        }

        let mode = polygon_mode(draw.wireframe, ctx.device.features());
        if draw.wireframe && mode == wgpu::PolygonMode::Fill && !self.warned_no_wireframe {
            log::warn!("POLYGON_MODE_LINE unavailable; wireframe draws filled");
            self.warned_no_wireframe = true;
        }

        let Some(uniform_buffer) = self.uniform_buffer.as_ref() else { return };
        ctx.queue
            .write_buffer(uniform_buffer, 0, bytemuck::bytes_of(&MeshUniform::from(draw)));

        let pipeline = match mode {
            wgpu::PolygonMode::Line => self.line_pipeline.as_ref(),
            _ => self.fill_pipeline.as_ref(),
        };
        let Some(pipeline) = pipeline else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tess mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
        rpass.set_index_buffer(mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count(), 0, 0..1);
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.fill_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tess mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("tess mesh bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: NonZeroU64::new(UNIFORM_SIZE),
                        },
                        count: None,
                    }],
                });

        let layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("tess mesh pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let build = |mode: wgpu::PolygonMode, label: &str| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),

                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[MeshVertex::layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: mode,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: Some(wgpu::DepthStencilState {
                    format: ctx.depth_format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),

                multiview_mask: None,
                cache: None,
            })
        };

        let fill = build(wgpu::PolygonMode::Fill, "tess mesh fill pipeline");
        let line = ctx
            .device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
            .then(|| build(wgpu::PolygonMode::Line, "tess mesh line pipeline"));

        log::debug!(
            "mesh pipelines built for {:?} (wireframe: {})",
            ctx.surface_format,
            line.is_some()
        );

        self.pipeline_format = Some(ctx.surface_format);
        self.fill_pipeline = Some(fill);
        self.line_pipeline = line;
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.uniform_buffer = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.uniform_buffer.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let uniform_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tess mesh ubo"),
            size: UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tess mesh bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        self.uniform_buffer = Some(uniform_buffer);
        self.bind_group = Some(bind_group);
    }
}

/// Polygon mode for a draw: lines for wireframe when the device allows it.
pub fn polygon_mode(wireframe: bool, features: wgpu::Features) -> wgpu::PolygonMode {
    if wireframe && features.contains(wgpu::Features::POLYGON_MODE_LINE) {
        wgpu::PolygonMode::Line
    } else {
        wgpu::PolygonMode::Fill
    }
}
