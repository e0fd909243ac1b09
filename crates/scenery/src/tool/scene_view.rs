use std::time::Instant;

use anyhow::Result;
use eframe::egui;
use glam::Vec2;
use tracing::{error, info, trace};

use crate::control::{InputEvent, InteractionController};
use crate::engine::{AnimationPlayback, Renderer, RendererState, Scene, Size2D};
use crate::tool::app_config::AppConfig;

const RESET_BUTTON_SIZE: f32 = 32.0;
const OVERLAY_MARGIN: f32 = 12.0;

pub enum ViewAction {
    None,
    Reset,
}

/// Second screen: the rendered scene with a label overlay and a reset button.
pub struct SceneView {
    scene: Scene,
    renderer: Renderer,
    controller: InteractionController,
    playback: AnimationPlayback,
    start_time: Instant,
    texture: Option<(egui::TextureId, u64)>,
    /// Set when a frame fails; no further frames are rendered.
    failure: Option<String>,
}

impl SceneView {
    pub fn new(renderer: Renderer, scene: Scene, config: &AppConfig) -> Result<Self> {
        let mut renderer = renderer;
        renderer.load_scene(&scene)?;
        Ok(Self {
            scene,
            renderer,
            controller: InteractionController::new(config.mouse_sensitivity),
            playback: config.animation_playback,
            start_time: Instant::now(),
            texture: None,
            failure: None,
        })
    }

    /// False once the frame loop has stopped.
    pub fn is_healthy(&self) -> bool {
        self.failure.is_none() && self.renderer.state() == RendererState::Ready
    }

    pub fn draw(&mut self, ui: &mut egui::Ui, render_state: &egui_wgpu::RenderState) -> ViewAction {
        let pixels_per_point = ui.ctx().pixels_per_point();
        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let reset_rect = egui::Rect::from_min_size(
            rect.right_top() + egui::vec2(-RESET_BUTTON_SIZE - OVERLAY_MARGIN, OVERLAY_MARGIN),
            egui::vec2(RESET_BUTTON_SIZE, RESET_BUTTON_SIZE),
        );

        if self.is_healthy() {
            let events = ui.input(|i| i.events.clone());
            for event in &events {
                let over_canvas = event_position(event)
                    .is_some_and(|pos| rect.contains(pos) && !reset_rect.contains(pos));
                if let Some(input) = translate_event(event, over_canvas) {
                    self.controller.handle(input, &mut self.scene.camera, self.scene.meshes.len());
                }
            }
            self.render(rect, pixels_per_point, render_state);
        }

        if let Some((texture_id, _)) = self.texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            ui.painter().image(texture_id, rect, uv, egui::Color32::WHITE);
        }

        ui.painter().text(
            rect.left_top() + egui::vec2(OVERLAY_MARGIN, OVERLAY_MARGIN),
            egui::Align2::LEFT_TOP,
            self.overlay_text(),
            egui::FontId::proportional(18.0),
            egui::Color32::WHITE,
        );
        if let Some(failure) = &self.failure {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("Rendering stopped: {failure}"),
                egui::FontId::proportional(16.0),
                egui::Color32::LIGHT_RED,
            );
        }

        if ui.put(reset_rect, egui::Button::new("X")).clicked() {
            return ViewAction::Reset;
        }
        ViewAction::None
    }

    fn overlay_text(&self) -> String {
        match self.controller.selected_index() {
            Some(index) => format!("Selected: {}", self.scene.meshes[index].name),
            None => format!("{}: press 1-9 to select an object", self.scene.name),
        }
    }

    fn render(&mut self, rect: egui::Rect, pixels_per_point: f32, render_state: &egui_wgpu::RenderState) {
        let size: Size2D = [
            ((rect.width() * pixels_per_point).round() as u32).max(1),
            ((rect.height() * pixels_per_point).round() as u32).max(1),
        ];
        let now = self.start_time.elapsed().as_secs_f64() * 1000.0;
        match self.renderer.render_frame(&mut self.scene, now, self.playback, size) {
            Ok(stats) => trace!("Drew {} meshes in {} draw calls", stats.meshes, stats.draw_calls),
            Err(err) => {
                error!("Frame failed, stopping the render loop: {err:#}");
                self.failure = Some(format!("{err:#}"));
                return;
            }
        }

        // The canvas texture is re-created on resize, egui has to be pointed at the new one.
        let generation = self.renderer.canvas_generation();
        let mut egui_renderer = render_state.renderer.write();
        match self.texture {
            None => {
                let id = egui_renderer.register_native_texture(
                    &render_state.device,
                    self.renderer.canvas_view(),
                    wgpu::FilterMode::Linear,
                );
                self.texture = Some((id, generation));
            }
            Some((id, registered)) if registered != generation => {
                egui_renderer.update_egui_texture_from_wgpu_texture(
                    &render_state.device,
                    self.renderer.canvas_view(),
                    wgpu::FilterMode::Linear,
                    id,
                );
                self.texture = Some((id, generation));
            }
            Some(_) => {}
        }
    }

    /// Releases the egui texture and every GPU resource of the scene.
    pub fn dispose(mut self, render_state: &egui_wgpu::RenderState) {
        if let Some((id, _)) = self.texture.take() {
            render_state.renderer.write().free_texture(&id);
        }
        self.renderer.dispose();
        info!("Scene '{}' closed", self.scene.name);
    }
}

fn event_position(event: &egui::Event) -> Option<egui::Pos2> {
    match event {
        egui::Event::PointerButton { pos, .. } | egui::Event::PointerMoved(pos) => Some(*pos),
        _ => None,
    }
}

/// Maps window events to controller input. Presses only count over the canvas; pointer
/// positions stay in logical points so drag speed does not depend on display scaling.
fn translate_event(event: &egui::Event, over_canvas: bool) -> Option<InputEvent> {
    let to_vec = |pos: &egui::Pos2| Vec2::new(pos.x, pos.y);
    match event {
        egui::Event::Key {
            key,
            pressed: true,
            repeat: false,
            ..
        } => digit(*key).map(InputEvent::Digit),
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            ..
        } => match *pressed {
            true if over_canvas => Some(InputEvent::PointerPressed(to_vec(pos))),
            true => None,
            false => Some(InputEvent::PointerReleased),
        },
        egui::Event::PointerMoved(pos) => Some(InputEvent::PointerMoved(to_vec(pos))),
        egui::Event::PointerGone => Some(InputEvent::PointerReleased),
        _ => None,
    }
}

fn digit(key: egui::Key) -> Option<u8> {
    use egui::Key::*;
    let digit = match key {
        Num0 => 0,
        Num1 => 1,
        Num2 => 2,
        Num3 => 3,
        Num4 => 4,
        Num5 => 5,
        Num6 => 6,
        Num7 => 7,
        Num8 => 8,
        Num9 => 9,
        _ => return None,
    };
    Some(digit)
}
