use glam::Vec2;
use tracing::debug;

use crate::engine::Camera;

/// Radians of camera rotation per point of pointer motion.
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 0.001;

/// Host-independent input, translated from window events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A number key, `0..=9`.
    Digit(u8),
    PointerPressed(Vec2),
    PointerMoved(Vec2),
    PointerReleased,
}

/// Object selection by number key and camera orbit by pointer drag.
///
/// Only mutates the camera and its own state; the renderer picks both up on the next frame.
pub struct InteractionController {
    selected_index: Option<usize>,
    /// Last pointer position while a drag is in progress.
    drag_origin: Option<Vec2>,
    sensitivity: f32,
}

impl InteractionController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            selected_index: None,
            drag_origin: None,
            sensitivity,
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn handle(&mut self, event: InputEvent, camera: &mut Camera, mesh_count: usize) {
        match event {
            InputEvent::Digit(digit) => self.select(digit, mesh_count),
            InputEvent::PointerPressed(position) => self.drag_origin = Some(position),
            InputEvent::PointerMoved(position) => {
                let Some(last) = self.drag_origin else {
                    return;
                };
                let delta = position - last;
                camera.rotate(delta.y * self.sensitivity, delta.x * self.sensitivity);
                self.drag_origin = Some(position);
            }
            InputEvent::PointerReleased => {
                if self.is_dragging() {
                    debug!("Drag ended at yaw {:.3}, pitch {:.3}", camera.yaw(), camera.pitch());
                }
                self.drag_origin = None;
            }
        }
    }

    /// Keys 1 to 9 pick the mesh at index key - 1. Keys without a mesh, and 0, change nothing.
    fn select(&mut self, digit: u8, mesh_count: usize) {
        if !(1..=9).contains(&digit) {
            return;
        }
        let index = usize::from(digit - 1);
        if index < mesh_count {
            debug!("Selected mesh {index}");
            self.selected_index = Some(index);
        }
    }
}
