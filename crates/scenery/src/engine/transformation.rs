use glam::{Mat4, Vec3};

/// Placement of one mesh instance in world space.
///
/// Written in place by the animation evaluator every frame, so it's a plain value owned by the
/// mesh rather than a shared handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transformation {
    pub translation: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    /// Uniform scale factor. Never animated.
    pub scale: f32,
}

impl Default for Transformation {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Transformation {
    /// World-from-model matrix: `translate * rotate_x * rotate_y * rotate_z * scale`.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn translation_moves_origin() {
        let transformation = Transformation {
            translation: Vec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        let p = transformation.model_matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn uniform_scale_doubles_unit_cube_extents() {
        let transformation = Transformation {
            scale: 2.0,
            ..Default::default()
        };
        let matrix = transformation.model_matrix();
        let corners = [Vec3::splat(-0.5), Vec3::splat(0.5)];
        let min = matrix.transform_point3(corners[0]);
        let max = matrix.transform_point3(corners[1]);
        assert!((max - min).abs_diff_eq(Vec3::splat(2.0), 1e-6));
    }

    #[test]
    fn rotation_is_applied_before_translation() {
        let transformation = Transformation {
            translation: Vec3::new(0.0, 0.0, 3.0),
            rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
            scale: 1.0,
        };
        // +X rotated a quarter turn around Y lands on -Z, then gets translated.
        let p = transformation.model_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-5));
    }

    #[test]
    fn rotation_order_is_x_then_y_then_z() {
        let transformation = Transformation {
            rotation: Vec3::new(FRAC_PI_2, FRAC_PI_2, 0.0),
            ..Default::default()
        };
        let expected = Mat4::from_rotation_x(FRAC_PI_2) * Mat4::from_rotation_y(FRAC_PI_2);
        assert!(transformation.model_matrix().abs_diff_eq(expected, 1e-6));
    }
}
