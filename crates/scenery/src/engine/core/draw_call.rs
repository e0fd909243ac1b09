use wgpu::util::DeviceExt;

use super::globals::MaterialUniforms;
use super::{GpuContext, GpuTexture, ShaderProgram};
use crate::engine::{BatchTexture, MaterialBatch};

/// GPU side of one material batch: geometry, material uniforms and texture, ready to be drawn
/// with a single indexed draw.
pub struct DrawCall {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_buffer: wgpu::Buffer,
    /// None when the batch samples the renderer's shared white texture.
    texture: Option<GpuTexture>,
    bind_group: wgpu::BindGroup,
}

impl DrawCall {
    pub fn new(
        context: &GpuContext,
        program: &ShaderProgram,
        batch: &MaterialBatch,
        white_texture: &GpuTexture,
        sampler: &wgpu::Sampler,
    ) -> DrawCall {
        let material_name = batch.material.name.clone();
        let vertex_buffer = context.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&material_name),
            contents: bytemuck::cast_slice(&batch.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = context.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&material_name),
            contents: bytemuck::cast_slice(&batch.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let material_uniforms = MaterialUniforms::from(batch.material.as_ref());
        let material_buffer = context.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&material_name),
            contents: bytemuck::bytes_of(&material_uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let texture = match batch.texture() {
            BatchTexture::Image(image) => Some(GpuTexture::from_image(context, &material_name, &image)),
            BatchTexture::White => None,
        };
        let texture_view = &texture.as_ref().unwrap_or(white_texture).view;

        let bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&material_name),
            layout: &program.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        DrawCall {
            vertex_buffer,
            index_buffer,
            index_count: batch.index_count(),
            material_buffer,
            texture,
            bind_group,
        }
    }

    /// Binds material group 2 and the batch geometry, then draws. Groups 0 and 1 must already be
    /// bound.
    pub fn render(&self, pass: &mut wgpu::RenderPass) {
        pass.set_bind_group(2, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Number of GPU allocations this draw call owns.
    pub fn resource_count(&self) -> usize {
        3 + usize::from(self.texture.is_some())
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.material_buffer.destroy();
        if let Some(texture) = &self.texture {
            texture.destroy();
        }
    }
}
