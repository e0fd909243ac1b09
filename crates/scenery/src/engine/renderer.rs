use std::sync::Arc;

use anyhow::{ensure, Result};
use glam::Vec3;
use tracing::{debug, info, instrument};
use wgpu::util::DeviceExt;

use super::core::globals::{CameraUniforms, LightUniforms, ObjectUniforms};
use super::core::texture::{check_texture_size, create_sampler};
use super::core::{Canvas, DrawCall, GpuContext, GpuTexture, ShaderProgram, Size2D};
use super::{AnimationPlayback, BatchTexture, SceneBatches, Scene, TextureImage};

const LIGHT_COLOR: Vec3 = Vec3::ONE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererState {
    Ready,
    Disposed,
}

/// What a frame submitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub meshes: usize,
    pub draw_calls: usize,
}

struct MeshResources {
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    draw_calls: Vec<DrawCall>,
}

impl MeshResources {
    fn destroy(&self) {
        self.object_buffer.destroy();
        for draw_call in &self.draw_calls {
            draw_call.destroy();
        }
    }
}

/// Owns every GPU object used to draw a scene.
///
/// Created once the graphics context is available, filled by `load_scene`, drawn by
/// `render_frame` and released by `dispose`.
pub struct Renderer {
    context: Arc<GpuContext>,
    program: ShaderProgram,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    white_texture: GpuTexture,
    sampler: wgpu::Sampler,
    canvas: Canvas,
    meshes: Vec<MeshResources>,
    clear_color: wgpu::Color,
    state: RendererState,
}

impl Renderer {
    pub fn new(context: &Arc<GpuContext>, clear_color: [f32; 4]) -> Result<Self> {
        let program = ShaderProgram::new(context, super::core::CANVAS_COLOR_FORMAT)?;

        let camera_buffer = context.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera"),
            contents: bytemuck::bytes_of(&CameraUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = context.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light"),
            contents: bytemuck::bytes_of(&LightUniforms::new(Vec3::ZERO, LIGHT_COLOR)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame"),
            layout: &program.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let white_texture = GpuTexture::from_image(context, "white", &TextureImage::white());
        let sampler = create_sampler(context);
        let canvas = Canvas::new(context, [1, 1]);

        let [r, g, b, a] = clear_color.map(f64::from);
        Ok(Self {
            context: context.clone(),
            program,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            white_texture,
            sampler,
            canvas,
            meshes: Vec::new(),
            clear_color: wgpu::Color { r, g, b, a },
            state: RendererState::Ready,
        })
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    /// Uploads the scene's geometry, batched per mesh and material, and its light. Resources of
    /// a previously loaded scene are released first. On failure nothing of the scene stays
    /// uploaded.
    #[instrument(skip_all, fields(scene = %scene.name))]
    pub fn load_scene(&mut self, scene: &Scene) -> Result<()> {
        ensure!(self.state == RendererState::Ready, "Renderer is disposed");
        self.release_scene();

        let plan = SceneBatches::build(scene);
        let max_dimension = self.context.max_texture_dimension();
        for batch in plan.meshes.iter().flatten() {
            if let BatchTexture::Image(image) = batch.texture() {
                check_texture_size(&batch.material.name, &image, max_dimension)?;
            }
        }

        let context = self.context.clone();
        let uploaded = context.scoped("upload scene", || {
            self.upload(scene, &plan);
            Ok(())
        });
        if let Err(err) = uploaded {
            self.release_scene();
            return Err(err);
        }

        info!(
            "Uploaded {} meshes as {} draw calls ({} vertices, {} GPU allocations)",
            self.meshes.len(),
            plan.draw_call_count(),
            plan.vertex_count(),
            self.scene_resource_count()
        );
        Ok(())
    }

    fn upload(&mut self, scene: &Scene, plan: &SceneBatches) {
        let context = &self.context;
        for (mesh, batches) in scene.meshes.iter().zip(&plan.meshes) {
            let object_buffer = context.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&mesh.name),
                contents: bytemuck::bytes_of(&ObjectUniforms::new(mesh.transformation.model_matrix())),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let object_bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&mesh.name),
                layout: &self.program.object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_buffer.as_entire_binding(),
                }],
            });
            let draw_calls = batches
                .iter()
                .map(|batch| {
                    debug!("Mesh '{}': {} indices of '{}'", mesh.name, batch.index_count(), batch.material.name);
                    DrawCall::new(context, &self.program, batch, &self.white_texture, &self.sampler)
                })
                .collect();
            self.meshes.push(MeshResources {
                object_buffer,
                object_bind_group,
                draw_calls,
            });
        }

        let light = LightUniforms::new(scene.light_position, LIGHT_COLOR);
        context.queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&light));
    }

    /// Draws one frame of `scene` into the canvas, advancing its animations to `now`
    /// (milliseconds).
    pub fn render_frame(
        &mut self,
        scene: &mut Scene,
        now: f64,
        playback: AnimationPlayback,
        surface_size: Size2D,
    ) -> Result<FrameStats> {
        ensure!(self.state == RendererState::Ready, "Frame requested after dispose");
        ensure!(
            scene.meshes.len() == self.meshes.len(),
            "Scene '{}' has {} meshes but {} are uploaded",
            scene.name,
            scene.meshes.len(),
            self.meshes.len()
        );
        scene.update_animations(now, playback);

        let context = self.context.clone();
        context.scoped("render frame", || Ok(self.encode_frame(scene, surface_size)))
    }

    fn encode_frame(&mut self, scene: &mut Scene, surface_size: Size2D) -> FrameStats {
        let queue = &self.context.queue;

        // Viewport and projection follow the surface
        let resized = self.canvas.resize(&self.context, surface_size);
        scene.camera.set_viewport_size(self.canvas.size());
        if resized {
            debug!("Camera aspect ratio is now {:.3}", scene.camera.aspect_ratio());
        }

        let camera_uniforms = CameraUniforms::from_camera(&scene.camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniforms));

        let mut stats = FrameStats::default();
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("frame") });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.canvas.color_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.canvas.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.program.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for (mesh, resources) in scene.meshes.iter().zip(&self.meshes) {
                let object = ObjectUniforms::new(mesh.transformation.model_matrix());
                queue.write_buffer(&resources.object_buffer, 0, bytemuck::bytes_of(&object));

                pass.set_bind_group(1, &resources.object_bind_group, &[]);
                for draw_call in &resources.draw_calls {
                    draw_call.render(&mut pass);
                }
                stats.meshes += 1;
                stats.draw_calls += resources.draw_calls.len();
            }
        }
        queue.submit(Some(encoder.finish()));
        stats
    }

    pub fn canvas_view(&self) -> &wgpu::TextureView {
        self.canvas.color_view()
    }

    pub fn canvas_generation(&self) -> u64 {
        self.canvas.generation()
    }

    /// Releases everything: scene resources, the canvas and the program's own buffers and
    /// textures. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.state == RendererState::Disposed {
            return;
        }
        let released = self.scene_resource_count();
        self.release_scene();
        self.camera_buffer.destroy();
        self.light_buffer.destroy();
        self.white_texture.destroy();
        self.canvas.destroy();
        self.state = RendererState::Disposed;
        info!("Renderer disposed, released {released} scene allocations");
    }

    fn scene_resource_count(&self) -> usize {
        self.meshes
            .iter()
            .map(|mesh| 1 + mesh.draw_calls.iter().map(DrawCall::resource_count).sum::<usize>())
            .sum()
    }

    fn release_scene(&mut self) {
        if self.meshes.is_empty() {
            return;
        }
        debug!("Releasing {} uploaded meshes", self.meshes.len());
        for mesh in self.meshes.drain(..) {
            mesh.destroy();
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::engine::{Animation, Camera, Easing, Face, Keyframe, Material, Mesh};

    /// None when the machine has no usable adapter; GPU tests then pass without running.
    fn test_context() -> Option<Arc<GpuContext>> {
        let instance = wgpu::Instance::default();
        let adapter = futures::executor::block_on(
            instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
        )?;
        let descriptor = wgpu::DeviceDescriptor {
            label: Some("test"),
            required_limits: adapter.limits(),
            ..Default::default()
        };
        let (device, queue) = futures::executor::block_on(adapter.request_device(&descriptor, None)).ok()?;
        Some(Arc::new(GpuContext {
            adapter,
            queue,
            device,
        }))
    }

    fn triangle(material: &Rc<Material>) -> Face {
        Face::try_new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
            vec![Vec2::ZERO; 3],
            material.clone(),
        )
        .unwrap()
    }

    fn textured(name: &str, width: u32, height: u32) -> Rc<Material> {
        let mut material = Material::new(name);
        let rgba = vec![128; width as usize * height as usize * 4];
        material.texture = Some(Rc::new(TextureImage::try_new(width, height, rgba).unwrap()));
        Rc::new(material)
    }

    /// Two meshes: "Crate" with a plain and a textured material, "Pillar" with the plain one and
    /// an animation.
    fn two_mesh_scene() -> Scene {
        let plain = Rc::new(Material::new("Plain"));
        let wood = textured("Wood", 2, 2);
        let crate_mesh = Mesh::new("Crate", vec![triangle(&plain), triangle(&wood), triangle(&plain)]);
        let mut pillar = Mesh::new("Pillar", vec![triangle(&plain)]);
        pillar.animation = Some(Animation {
            easing: Easing::EaseIn,
            duration: 1000.0,
            start: Keyframe {
                translation: Some(Vec3::ZERO),
                rotation: None,
            },
            end: Keyframe {
                translation: Some(Vec3::new(0.0, 4.0, 0.0)),
                rotation: None,
            },
        });
        Scene {
            name: "two meshes".to_string(),
            light_position: Vec3::ONE,
            camera: Camera::default(),
            meshes: vec![crate_mesh, pillar],
        }
    }

    fn one_mesh_scene() -> Scene {
        let plain = Rc::new(Material::new("Plain"));
        Scene {
            name: "one mesh".to_string(),
            light_position: Vec3::ONE,
            camera: Camera::default(),
            meshes: vec![Mesh::new("Single", vec![triangle(&plain)])],
        }
    }

    #[test]
    fn frame_draws_one_call_per_batch() {
        let Some(context) = test_context() else {
            return;
        };
        let mut renderer = Renderer::new(&context, [0.0, 0.0, 0.0, 1.0]).unwrap();
        let mut scene = two_mesh_scene();
        renderer.load_scene(&scene).unwrap();

        let stats = renderer
            .render_frame(&mut scene, 2500.0, AnimationPlayback::Loop, [64, 32])
            .unwrap();
        assert_eq!(stats.meshes, 2);
        assert_eq!(stats.draw_calls, SceneBatches::build(&scene).draw_call_count());
        assert_eq!(stats.draw_calls, 3);

        assert!(scene.meshes[1].transformation.translation.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
        assert_eq!(scene.meshes[0].transformation.translation, Vec3::ZERO);
        assert_eq!(scene.camera.aspect_ratio(), 2.0);
    }

    #[test]
    fn loading_again_releases_the_previous_scene() {
        let Some(context) = test_context() else {
            return;
        };
        let mut renderer = Renderer::new(&context, [0.0; 4]).unwrap();
        renderer.load_scene(&two_mesh_scene()).unwrap();
        // Per mesh one object buffer, per draw call three buffers plus an owned texture.
        assert_eq!(renderer.scene_resource_count(), (1 + 3 + 4) + (1 + 3));

        let mut scene = one_mesh_scene();
        renderer.load_scene(&scene).unwrap();
        assert_eq!(renderer.meshes.len(), 1);
        assert_eq!(renderer.scene_resource_count(), 1 + 3);

        let stats = renderer
            .render_frame(&mut scene, 0.0, AnimationPlayback::Once, [8, 8])
            .unwrap();
        assert_eq!(stats.draw_calls, 1);
    }

    #[test]
    fn frame_for_a_different_scene_is_refused() {
        let Some(context) = test_context() else {
            return;
        };
        let mut renderer = Renderer::new(&context, [0.0; 4]).unwrap();
        renderer.load_scene(&one_mesh_scene()).unwrap();

        let mut other = two_mesh_scene();
        let error = renderer
            .render_frame(&mut other, 0.0, AnimationPlayback::Loop, [8, 8])
            .unwrap_err();
        assert!(error.to_string().contains("2 meshes but 1 are uploaded"));
    }

    #[test]
    fn dispose_is_final_and_repeatable() {
        let Some(context) = test_context() else {
            return;
        };
        let mut renderer = Renderer::new(&context, [0.0; 4]).unwrap();
        let mut scene = two_mesh_scene();
        renderer.load_scene(&scene).unwrap();

        renderer.dispose();
        renderer.dispose();
        assert_eq!(renderer.state(), RendererState::Disposed);
        assert_eq!(renderer.scene_resource_count(), 0);

        let error = renderer
            .render_frame(&mut scene, 0.0, AnimationPlayback::Loop, [8, 8])
            .unwrap_err();
        assert!(error.to_string().contains("after dispose"));
        assert!(renderer.load_scene(&scene).is_err());
    }

    #[test]
    fn oversized_texture_fails_the_load() {
        let Some(context) = test_context() else {
            return;
        };
        let mut renderer = Renderer::new(&context, [0.0; 4]).unwrap();
        let too_wide = context.max_texture_dimension() + 1;
        let huge = textured("Huge", too_wide, 1);
        let scene = Scene {
            name: "huge".to_string(),
            light_position: Vec3::ONE,
            camera: Camera::default(),
            meshes: vec![Mesh::new("Banner", vec![triangle(&huge)])],
        };

        let error = renderer.load_scene(&scene).unwrap_err();
        assert!(error.to_string().contains("Huge"));
        assert_eq!(renderer.scene_resource_count(), 0);
        assert_eq!(renderer.state(), RendererState::Ready);
    }
}
