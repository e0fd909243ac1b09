use glam::{Mat4, Vec3};

use crate::engine::{Camera, Material};

// Uniform blocks shared with `phong.wgsl`. Layouts follow WGSL uniform alignment rules, hence the
// vec4 padding on vec3 members.

/// Bind group 0, binding 0. Rewritten every frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub eye_position: [f32; 4],
}

impl CameraUniforms {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix().to_cols_array_2d(),
            eye_position: camera.position.extend(1.0).to_array(),
        }
    }
}

/// Bind group 0, binding 1. Written once per scene load.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl LightUniforms {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            color: color.extend(1.0).to_array(),
        }
    }
}

/// Bind group 1. One per mesh, rewritten every frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
}

impl ObjectUniforms {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

/// Bind group 2, binding 0. One per batch.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    pub q: f32,
}

impl From<&Material> for MaterialUniforms {
    fn from(material: &Material) -> Self {
        Self {
            ka: material.ka,
            kd: material.kd,
            ks: material.ks,
            q: material.q,
        }
    }
}
