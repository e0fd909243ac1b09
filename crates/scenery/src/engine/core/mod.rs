pub mod context;
pub mod draw_call;
pub mod globals;
pub mod render_target;
pub mod shader;
pub mod texture;

pub use context::GpuContext;
pub use draw_call::DrawCall;
pub use render_target::Canvas;
pub use shader::ShaderProgram;
pub use texture::GpuTexture;

/// Interleaved vertex: position, normal, texture coordinate. 8 floats, no padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3 {
    pub a_position: [f32; 3],
    pub a_normal: [f32; 3],
    pub a_uv: [f32; 2],
}

const VERTEX_FORMAT: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
];

pub type MeshIndex = u32;

pub type Size2D = [u32; 2];

pub const CANVAS_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const CANVAS_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_attribute_offsets() {
        assert_eq!(size_of::<Vertex3>(), 8 * size_of::<f32>());
        assert_eq!(VERTEX_FORMAT[0].offset, 0);
        assert_eq!(VERTEX_FORMAT[1].offset, 3 * size_of::<f32>() as u64);
        assert_eq!(VERTEX_FORMAT[2].offset, 6 * size_of::<f32>() as u64);
    }
}
