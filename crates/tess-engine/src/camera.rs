//! Orbit camera around the origin.

use glam::{Mat4, Vec3, Vec4};

/// Radians of rotation per logical pixel of pointer drag.
pub const ORBIT_SENSITIVITY: f32 = 0.005;

/// Closest the eye may get to the target.
pub const MIN_ZOOM: f32 = 0.2;

/// Pitch limit; at ±π/2 the view direction is parallel to +Y up.
pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Camera orbiting the origin, parameterized by yaw, pitch and distance.
///
/// The eye is `(zoom, 0, 0)` rotated by `pitch` about +Z, then by `yaw` about +Y.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,

    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: 5.21,
            pitch: 0.28,
            zoom: 2.8,
            fov_y: 0.9,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }
}

impl OrbitCamera {
    /// Eye position in world space.
    pub fn eye(&self) -> Vec3 {
        let transform = Mat4::from_rotation_y(self.yaw) * Mat4::from_rotation_z(self.pitch);
        (transform * Vec4::new(self.zoom, 0.0, 0.0, 1.0)).truncate()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    /// Perspective projection with wgpu's `[0, 1]` depth range.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(self.fov_y, aspect, self.z_near, self.z_far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }

    /// Applies a pointer drag of `(dx, dy)` logical pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch + dy * ORBIT_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Moves the eye along its ray; positive `delta` moves it away.
    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta).max(MIN_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_distance_equals_zoom() {
        let cam = OrbitCamera::default();
        assert!((cam.eye().length() - cam.zoom).abs() < 1e-5);
    }

    #[test]
    fn zero_angles_put_eye_on_x_axis() {
        let cam = OrbitCamera { yaw: 0.0, pitch: 0.0, zoom: 3.0, ..Default::default() };
        assert!((cam.eye() - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn positive_pitch_raises_the_eye() {
        let cam = OrbitCamera { yaw: 0.0, pitch: 0.5, zoom: 1.0, ..Default::default() };
        assert!(cam.eye().y > 0.0);
    }

    #[test]
    fn view_maps_origin_in_front_of_camera() {
        let cam = OrbitCamera::default();
        let p = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!((p.z + cam.zoom).abs() < 1e-4, "{p:?}");
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
    }

    #[test]
    fn orbit_applies_sensitivity() {
        let mut cam = OrbitCamera { yaw: 0.0, pitch: 0.0, ..Default::default() };
        cam.orbit(100.0, -40.0);
        assert!((cam.yaw - 0.5).abs() < 1e-6);
        assert!((cam.pitch + 0.2).abs() < 1e-6);
    }

    #[test]
    fn pitch_stops_short_of_the_poles() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 10_000.0);
        assert_eq!(cam.pitch, MAX_PITCH);
        assert!(cam.view_matrix().is_finite());
        cam.orbit(0.0, -20_000.0);
        assert_eq!(cam.pitch, -MAX_PITCH);
        assert!(cam.view_matrix().is_finite());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.zoom_by(-100.0);
        assert_eq!(cam.zoom, MIN_ZOOM);
        cam.zoom_by(1.0);
        assert!((cam.zoom - (MIN_ZOOM + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn projection_tolerates_degenerate_aspect() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.projection(0.0), cam.projection(1.0));
        assert!(cam.projection(f32::NAN).is_finite());
    }
}
