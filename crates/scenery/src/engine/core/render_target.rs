use tracing::debug;

use super::{GpuContext, Size2D, CANVAS_COLOR_FORMAT, CANVAS_DEPTH_FORMAT};

struct Attachment {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl Attachment {
    fn new(context: &GpuContext, label: &str, size: Size2D, format: wgpu::TextureFormat) -> Self {
        let texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size[0],
                height: size[1],
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Off-screen color and depth targets the scene is drawn into. The host displays the color
/// target; it is re-created whenever the surface size changes.
pub struct Canvas {
    size: Size2D,
    color: Attachment,
    depth: Attachment,
    /// Bumped on every re-creation so the host knows to re-register the color view.
    generation: u64,
}

impl Canvas {
    pub fn new(context: &GpuContext, size: Size2D) -> Self {
        let size = [size[0].max(1), size[1].max(1)];
        Self {
            size,
            color: Attachment::new(context, "canvas color", size, CANVAS_COLOR_FORMAT),
            depth: Attachment::new(context, "canvas depth", size, CANVAS_DEPTH_FORMAT),
            generation: 0,
        }
    }

    /// Matches the targets to `size`. Returns true when they had to be re-created.
    pub fn resize(&mut self, context: &GpuContext, size: Size2D) -> bool {
        let size = [size[0].max(1), size[1].max(1)];
        if size == self.size {
            return false;
        }
        debug!("Resizing canvas to {}x{}", size[0], size[1]);
        self.destroy();
        let generation = self.generation + 1;
        *self = Self::new(context, size);
        self.generation = generation;
        true
    }

    pub fn size(&self) -> Size2D {
        self.size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color.view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }

    pub fn destroy(&self) {
        self.color.texture.destroy();
        self.depth.texture.destroy();
    }
}
