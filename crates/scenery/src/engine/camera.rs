use glam::{Mat4, Vec3};

use super::Size2D;

pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.0);
pub const DEFAULT_FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_4;

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Stops just short of straight up/down so yaw stays meaningful.
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// First-person style camera that orbits in place: dragging changes where it looks, never where
/// it stands.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    field_of_view: f32,
    aspect_ratio: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_CAMERA_POSITION)
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            aspect_ratio: 1.0,
        }
    }

    pub fn with_field_of_view(mut self, field_of_view: f32) -> Self {
        self.field_of_view = field_of_view;
        self
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Keeps the projection in sync with the viewport. Degenerate sizes (a minimized window)
    /// leave the previous aspect ratio in place.
    pub fn set_viewport_size(&mut self, size: Size2D) {
        if size[0] > 0 && size[1] > 0 {
            self.aspect_ratio = size[0] as f32 / size[1] as f32;
        }
    }

    /// Accumulates already-scaled orientation deltas in radians.
    pub fn rotate(&mut self, delta_pitch: f32, delta_yaw: f32) {
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw += delta_yaw;
    }

    /// Camera-from-world matrix, recomputed on every call.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.pitch)
            * Mat4::from_rotation_y(self.yaw)
            * Mat4::from_translation(-self.position)
    }

    /// Right-handed perspective with a [0, 1] depth range, as wgpu expects.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.field_of_view, self.aspect_ratio, Z_NEAR, Z_FAR)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    #[test]
    fn default_camera_sees_origin_in_front() {
        let camera = Camera::default();
        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-6));

        let clip = camera.projection_matrix() * Vec4::new(origin.x, origin.y, origin.z, 1.0);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn viewport_resize_updates_aspect_ratio() {
        let mut camera = Camera::default();
        camera.set_viewport_size([1600, 800]);
        assert_eq!(camera.aspect_ratio(), 2.0);
        let projection = camera.projection_matrix();
        assert!((projection.y_axis.y / projection.x_axis.x - 2.0).abs() < 1e-5);

        camera.set_viewport_size([0, 800]);
        assert_eq!(camera.aspect_ratio(), 2.0);
    }

    #[test]
    fn rotate_accumulates_and_clamps_pitch() {
        let mut camera = Camera::default();
        camera.rotate(0.1, 0.2);
        camera.rotate(0.1, -0.05);
        assert!((camera.pitch() - 0.2).abs() < 1e-6);
        assert!((camera.yaw() - 0.15).abs() < 1e-6);

        camera.rotate(10.0, 0.0);
        assert_eq!(camera.pitch(), MAX_PITCH);
        camera.rotate(-20.0, 0.0);
        assert_eq!(camera.pitch(), -MAX_PITCH);
    }

    #[test]
    fn view_matrix_follows_orientation() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.rotate(0.0, std::f32::consts::FRAC_PI_2);
        // A quarter yaw turn brings the +X axis in front of the camera.
        let p = camera.view_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }
}
