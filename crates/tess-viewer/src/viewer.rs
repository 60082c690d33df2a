use tess_engine::camera::OrbitCamera;
use tess_engine::core::{App, AppControl, FrameCtx};
use tess_engine::input::{InputFrame, InputState, Key, MouseButton};
use tess_engine::mesh::{MeshData, TessCache, MAX_TESS_LEVEL};
use tess_engine::profiler::{GpuProfiler, WgpuTimerBackend};
use tess_engine::render::{GpuMesh, MeshRenderer};
use tess_engine::time::MonotonicClock;

use crate::settings::{window_title, RenderSettings};

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.0, g: 0.0, b: 0.3, a: 1.0 };

type Profiler = GpuProfiler<WgpuTimerBackend, MonotonicClock>;

/// GPU-side state, created on the first frame.
struct Scene {
    renderer: MeshRenderer,
    /// Uploaded meshes indexed by `level - 1`.
    meshes: Vec<Option<GpuMesh>>,
    profiler: Option<Profiler>,
}

impl Scene {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            renderer: MeshRenderer::new(),
            meshes: (0..MAX_TESS_LEVEL).map(|_| None).collect(),
            profiler: create_profiler(device, queue),
        }
    }
}

fn create_profiler(device: &wgpu::Device, queue: &wgpu::Queue) -> Option<Profiler> {
    let backend = match WgpuTimerBackend::new(device, queue) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("gpu timing disabled: {e}");
            return None;
        }
    };

    match GpuProfiler::new(backend, MonotonicClock::new()) {
        Ok(p) => Some(p),
        Err(e) => {
            log::warn!("gpu timing disabled: {e}");
            None
        }
    }
}

/// Interactive mesh viewer.
pub struct Viewer {
    camera: OrbitCamera,
    settings: RenderSettings,
    base_mesh: MeshData,
    tess_cache: TessCache,
    scene: Option<Scene>,
    title: String,
}

impl Viewer {
    pub fn new(base_mesh: MeshData, settings: RenderSettings) -> Self {
        Self {
            camera: OrbitCamera::default(),
            settings,
            base_mesh,
            tess_cache: TessCache::new(),
            scene: None,
            title: String::new(),
        }
    }

    fn update_camera(&mut self, input: &InputState, frame: &InputFrame) {
        if input.button_down(MouseButton::Left) {
            let (dx, dy) = frame.pointer_delta;
            self.camera.orbit(dx, dy);
        }
        if frame.wheel_lines != 0.0 {
            self.camera.zoom_by(frame.wheel_lines);
        }
    }
}

impl App for Viewer {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        if self.settings.apply_keys(ctx.input_frame) {
            log::info!("render settings: {}", self.settings.summary());
        }
        self.update_camera(ctx.input, ctx.input_frame);

        let level = self.settings.effective_level();
        let scene = self
            .scene
            .get_or_insert_with(|| Scene::new(ctx.gpu.device(), ctx.gpu.queue()));

        let slot = (level - 1) as usize;
        if scene.meshes[slot].is_none() {
            let data = self.tess_cache.get(&self.base_mesh, level);
            log::info!(
                "uploading level {level}: {} vertices, {} triangles",
                data.vertex_count(),
                data.triangle_count()
            );
            let label = format!("tess level {level}");
            scene.meshes[slot] = Some(GpuMesh::upload(ctx.gpu.device(), data, &label));
        }

        let size = ctx.gpu.size();
        let aspect = size.width as f32 / size.height.max(1) as f32;
        let draw = self.settings.mesh_draw(
            self.camera.view_projection(aspect),
            self.camera.view_matrix(),
        );

        let Scene { renderer, meshes, profiler } = scene;
        let Some(mesh) = meshes[slot].as_ref() else {
            return AppControl::Continue;
        };

        let mut drawn = false;
        let control = ctx.render(CLEAR_COLOR, |rctx, target| {
            if let Some(p) = profiler.as_mut() {
                p.begin(target.encoder);
            }
            renderer.render(rctx, target, mesh, &draw);
            if let Some(p) = profiler.as_mut() {
                p.end(target.encoder);
            }
            drawn = true;
        });

        if control == AppControl::Exit {
            return control;
        }

        // Skipped frames recorded no query.
        if drawn && let Some(p) = profiler.as_mut() {
            p.end_frame();
        }

        let average = profiler.as_ref().map(|p| p.average_time());
        let title = window_title(average, &self.settings);
        if title != self.title {
            ctx.runtime.set_title(title.as_str());
            self.title = title;
        }

        AppControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tess_engine::input::{InputEvent, MouseButtonState};

    fn viewer() -> Viewer {
        Viewer::new(MeshData::default(), RenderSettings::default())
    }

    #[test]
    fn drag_orbits_only_with_left_button() {
        let mut v = viewer();
        let start = v.camera;
        let (mut state, mut frame) = (InputState::default(), InputFrame::default());

        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 0.0, y: 0.0 });
        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 10.0, y: 4.0 });
        v.update_camera(&state, &frame);
        assert_eq!(v.camera, start);

        state.apply_event(
            &mut frame,
            InputEvent::PointerButton { button: MouseButton::Left, state: MouseButtonState::Pressed },
        );
        v.update_camera(&state, &frame);
        assert!(v.camera.yaw > start.yaw);
        assert!(v.camera.pitch > start.pitch);
    }

    #[test]
    fn clears_to_dark_blue() {
        assert_eq!(CLEAR_COLOR, wgpu::Color { r: 0.0, g: 0.0, b: 0.3, a: 1.0 });
    }

    #[test]
    fn wheel_zooms() {
        let mut v = viewer();
        let start = v.camera.zoom;
        let frame = InputFrame { wheel_lines: 1.0, ..Default::default() };
        v.update_camera(&InputState::default(), &frame);
        assert!((v.camera.zoom - (start + 1.0)).abs() < 1e-6);
    }
}
