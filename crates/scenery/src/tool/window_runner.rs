use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;
use egui::ViewportBuilder;
use tracing::{error, info, warn};

use crate::engine::{GpuContext, Renderer, Scene};
use crate::loader::{load_scene, DirectorySource};
use crate::tool::app_config::AppConfig;
use crate::tool::scene_picker::ScenePicker;
use crate::tool::scene_view::{SceneView, ViewAction};

enum Screen {
    Picker(ScenePicker),
    View(SceneView),
}

pub struct WindowRunner {
    gpu_context: Arc<GpuContext>,
    render_state: egui_wgpu::RenderState,
    config: AppConfig,
    /// Built at startup so a broken shader fails before any scene is picked.
    spare_renderer: Option<Renderer>,
    screen: Screen,
}

impl WindowRunner {
    pub fn run(config: AppConfig) -> Result<()> {
        let wgpu_configuration = egui_wgpu::WgpuConfiguration {
            desired_maximum_frame_latency: Some(2),
            ..Default::default()
        };
        let (width, height) = config.window_size;
        let native_options = eframe::NativeOptions {
            wgpu_options: wgpu_configuration,
            viewport: ViewportBuilder::default()
                .with_title("Scenery")
                .with_inner_size(egui::vec2(width, height)),
            ..eframe::NativeOptions::default()
        };

        eframe::run_native(
            "Scenery",
            native_options,
            Box::new(|cc| Ok(Box::new(Self::new(cc, config)?))),
        )
        .map_err(|e| anyhow::anyhow!("Failed to run app: {e:?}"))
    }

    fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Result<Self> {
        let render_state = cc.wgpu_render_state.clone().context("No WGPU render state")?;

        let gpu_context = Arc::new(GpuContext {
            adapter: render_state.adapter.clone(),
            queue: render_state.queue.clone(),
            device: render_state.device.clone(),
        });
        let adapter_info = gpu_context.adapter.get_info();
        info!(
            "WGPU adapter: {:?} on {}, textures up to {}px",
            adapter_info.backend,
            adapter_info.name,
            gpu_context.max_texture_dimension()
        );
        let spare_renderer = Renderer::new(&gpu_context, config.clear_color)
            .context("Failed to initialize the renderer")?;
        let screen = Screen::Picker(ScenePicker::new(config.scene_directory.clone()));

        Ok(Self {
            gpu_context,
            render_state,
            config,
            spare_renderer: Some(spare_renderer),
            screen,
        })
    }

    fn open_scene(&mut self, directory: &str) -> Result<SceneView> {
        let source = DirectorySource::open(directory)?;
        let scene: Scene = load_scene(&source, self.config.field_of_view())?;
        let renderer = match self.spare_renderer.take() {
            Some(renderer) => renderer,
            None => Renderer::new(&self.gpu_context, self.config.clear_color)?,
        };
        let view = SceneView::new(renderer, scene, &self.config)?;

        self.config.scene_directory = Some(directory.to_string());
        if let Err(err) = self.config.save() {
            warn!("Failed to save config: {err:#}");
        }
        Ok(view)
    }

    fn render_ui(&mut self, ctx: &egui::Context) {
        let size = ctx.input(|i: &egui::InputState| i.screen_rect()).size();

        // Don't render anything if the window is minimized
        if size[0] <= 0.0 || size[1] <= 0.0 {
            return;
        }

        let frame = match self.screen {
            Screen::Picker(_) => egui::Frame::central_panel(&ctx.style()),
            Screen::View(_) => egui::Frame::NONE,
        };
        let mut next_screen = None;
        egui::CentralPanel::default()
            .frame(frame)
            .show(ctx, |ui| match &mut self.screen {
                Screen::Picker(picker) => {
                    let Some(directory) = picker.draw(ui) else {
                        return;
                    };
                    info!("Opening scene directory '{directory}'");
                    match self.open_scene(&directory) {
                        Ok(view) => next_screen = Some(Screen::View(view)),
                        Err(err) => {
                            error!("Failed to open scene: {err:#}");
                            if let Screen::Picker(picker) = &mut self.screen {
                                picker.set_error(&err);
                            }
                        }
                    }
                }
                Screen::View(view) => {
                    if let ViewAction::Reset = view.draw(ui, &self.render_state) {
                        next_screen = Some(Screen::Picker(ScenePicker::new(
                            self.config.scene_directory.clone(),
                        )));
                    }
                }
            });

        if let Some(screen) = next_screen {
            if let Screen::View(view) = std::mem::replace(&mut self.screen, screen) {
                view.dispose(&self.render_state);
            }
        }
    }
}

impl eframe::App for WindowRunner {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_ui(ctx);
        // Continuous redraw only while a healthy scene is mounted.
        if let Screen::View(view) = &self.screen {
            if view.is_healthy() {
                ctx.request_repaint();
            }
        }
    }
}
