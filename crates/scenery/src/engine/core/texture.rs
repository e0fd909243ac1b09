use anyhow::{ensure, Result};
use wgpu::util::DeviceExt;

use super::GpuContext;
use crate::engine::TextureImage;

/// A sampled RGBA texture uploaded from a decoded image.
pub struct GpuTexture {
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn from_image(context: &GpuContext, label: &str, image: &TextureImage) -> Self {
        let texture_descriptor = wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        };
        let texture = context.device.create_texture_with_data(
            &context.queue,
            &texture_descriptor,
            wgpu::util::TextureDataOrder::default(),
            &image.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Rejects images the device cannot hold before any upload is attempted.
pub fn check_texture_size(label: &str, image: &TextureImage, max_dimension: u32) -> Result<()> {
    ensure!(
        image.width <= max_dimension && image.height <= max_dimension,
        "Texture '{label}' is {}x{}, this device supports at most {max_dimension}x{max_dimension}",
        image.width,
        image.height
    );
    Ok(())
}

pub fn create_sampler(context: &GpuContext) -> wgpu::Sampler {
    context.device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("material"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_textures_are_rejected() {
        let wide = TextureImage::try_new(10000, 1, vec![0; 10000 * 4]).unwrap();
        let error = check_texture_size("wide", &wide, 8192).unwrap_err();
        assert!(error.to_string().contains("10000x1"));

        let tall = TextureImage::try_new(1, 8193, vec![0; 8193 * 4]).unwrap();
        assert!(check_texture_size("tall", &tall, 8192).is_err());
    }

    #[test]
    fn textures_at_the_limit_are_accepted() {
        let square = TextureImage::try_new(4, 4, vec![0; 4 * 4 * 4]).unwrap();
        assert!(check_texture_size("square", &square, 4).is_ok());
        assert!(check_texture_size("white", &TextureImage::white(), 1).is_ok());
    }
}
