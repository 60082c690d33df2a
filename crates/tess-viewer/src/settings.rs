use tess_engine::input::{InputFrame, Key};
use tess_engine::mesh::MAX_TESS_LEVEL;
use tess_engine::render::MeshDraw;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RenderMode {
    Specular,
    ProceduralTexture,
}

/// User-toggled render state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderSettings {
    pub render_mode: RenderMode,
    pub use_tessellation: bool,
    /// `1..=MAX_TESS_LEVEL`; kept while tessellation is off.
    pub tess_level: u32,
    pub wireframe: bool,
    pub vertex_lighting: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::ProceduralTexture,
            use_tessellation: false,
            tess_level: 1,
            wireframe: false,
            vertex_lighting: false,
        }
    }
}

impl RenderSettings {
    /// Settings with tessellation already on at `level`.
    pub fn tessellated(level: u32) -> Self {
        Self {
            use_tessellation: true,
            tess_level: level.clamp(1, MAX_TESS_LEVEL),
            ..Self::default()
        }
    }

    /// Applies this frame's key presses. Returns true if anything changed.
    pub fn apply_keys(&mut self, frame: &InputFrame) -> bool {
        let before = *self;

        if frame.key_pressed(Key::W) {
            self.wireframe = !self.wireframe;
        }
        if frame.key_pressed(Key::T) {
            self.use_tessellation = !self.use_tessellation;
        }
        if frame.key_pressed(Key::ArrowUp) {
            self.tess_level = (self.tess_level + 1).min(MAX_TESS_LEVEL);
        }
        if frame.key_pressed(Key::ArrowDown) {
            self.tess_level = self.tess_level.saturating_sub(1).max(1);
        }
        if frame.key_pressed(Key::Digit1) {
            self.render_mode = RenderMode::Specular;
        }
        if frame.key_pressed(Key::Digit2) {
            self.render_mode = RenderMode::ProceduralTexture;
        }
        if frame.key_pressed(Key::V) {
            self.vertex_lighting = !self.vertex_lighting;
        }

        *self != before
    }

    /// Tessellation level of the mesh to draw; 1 when tessellation is off.
    pub fn effective_level(&self) -> u32 {
        if self.use_tessellation { self.tess_level } else { 1 }
    }

    pub fn mesh_draw(&self, mvp: glam::Mat4, view: glam::Mat4) -> MeshDraw {
        MeshDraw {
            mvp,
            view,
            wireframe: self.wireframe,
            specular: self.render_mode == RenderMode::Specular,
            vertex_lighting: self.vertex_lighting,
            tessellated: self.use_tessellation,
        }
    }

    /// Short description used in the window title.
    pub fn summary(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        parts.push(if self.use_tessellation {
            format!("tess {}", self.tess_level)
        } else {
            "no tess".to_string()
        });
        parts.push(
            match self.render_mode {
                RenderMode::Specular => "specular",
                RenderMode::ProceduralTexture => "procedural",
            }
            .to_string(),
        );
        if self.vertex_lighting && !self.use_tessellation {
            parts.push("per-vertex".to_string());
        }
        if self.wireframe {
            parts.push("wireframe".to_string());
        }
        parts.join(", ")
    }
}

/// Window title for an average GPU time in seconds, or `None` when unmeasured.
pub fn window_title(average_secs: Option<f64>, settings: &RenderSettings) -> String {
    let time = match average_secs {
        Some(secs) => format!("{:.3} ms", secs * 1e3),
        None => "n/a".to_string(),
    };
    format!("Teapot render time: {time} | {}", settings.summary())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(keys: &[Key]) -> InputFrame {
        let mut frame = InputFrame::default();
        frame.keys_pressed.extend(keys.iter().copied());
        frame
    }

    // ── key bindings ──────────────────────────────────────────────────────

    #[test]
    fn defaults_follow_the_demo() {
        let s = RenderSettings::default();
        assert_eq!(s.render_mode, RenderMode::ProceduralTexture);
        assert!(!s.use_tessellation && !s.wireframe && !s.vertex_lighting);
        assert_eq!(s.effective_level(), 1);
    }

    #[test]
    fn toggles_flip_state() {
        let mut s = RenderSettings::default();
        assert!(s.apply_keys(&press(&[Key::W, Key::T, Key::V])));
        assert!(s.wireframe && s.use_tessellation && s.vertex_lighting);
        assert!(s.apply_keys(&press(&[Key::W])));
        assert!(!s.wireframe);
    }

    #[test]
    fn no_keys_is_no_change() {
        let mut s = RenderSettings::default();
        assert!(!s.apply_keys(&InputFrame::default()));
        assert!(!s.apply_keys(&press(&[Key::Digit2])), "already procedural");
    }

    #[test]
    fn level_is_clamped() {
        let mut s = RenderSettings::tessellated(MAX_TESS_LEVEL);
        assert!(!s.apply_keys(&press(&[Key::ArrowUp])));
        assert_eq!(s.tess_level, MAX_TESS_LEVEL);

        for _ in 0..10 {
            s.apply_keys(&press(&[Key::ArrowDown]));
        }
        assert_eq!(s.tess_level, 1);
        assert_eq!(RenderSettings::tessellated(0).tess_level, 1);
    }

    #[test]
    fn level_only_applies_when_tessellating() {
        let mut s = RenderSettings::tessellated(3);
        assert_eq!(s.effective_level(), 3);
        s.apply_keys(&press(&[Key::T]));
        assert_eq!(s.effective_level(), 1);
        assert_eq!(s.tess_level, 3);
    }

    #[test]
    fn render_mode_keys() {
        let mut s = RenderSettings::default();
        s.apply_keys(&press(&[Key::Digit1]));
        assert_eq!(s.render_mode, RenderMode::Specular);
        assert!(s.mesh_draw(glam::Mat4::IDENTITY, glam::Mat4::IDENTITY).specular);
    }

    // ── title ─────────────────────────────────────────────────────────────

    #[test]
    fn title_reports_milliseconds() {
        let s = RenderSettings::default();
        assert_eq!(
            window_title(Some(0.0015), &s),
            "Teapot render time: 1.500 ms | no tess, procedural"
        );
    }

    #[test]
    fn title_without_profiler() {
        let mut s = RenderSettings::tessellated(2);
        s.wireframe = true;
        s.vertex_lighting = true;
        assert_eq!(
            window_title(None, &s),
            "Teapot render time: n/a | tess 2, procedural, wireframe"
        );
    }
}
