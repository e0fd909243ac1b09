use glam::Vec3;

use super::{AnimationPlayback, Camera, Mesh};

pub const DEFAULT_LIGHT_POSITION: Vec3 = Vec3::new(5.0, 5.0, 5.0);

/// Everything needed to render one loaded scene.
///
/// Built once per load; afterwards only mesh transformations (animation) and the camera
/// (interaction) change.
#[derive(Debug)]
pub struct Scene {
    pub name: String,
    pub light_position: Vec3,
    pub camera: Camera,
    pub meshes: Vec<Mesh>,
}

impl Scene {
    /// Evaluates every mesh animation for wall-clock time `now` in milliseconds.
    pub fn update_animations(&mut self, now: f64, playback: AnimationPlayback) {
        for mesh in &mut self.meshes {
            if let Some(animation) = &mesh.animation {
                animation.evaluate(now, playback, &mut mesh.transformation);
            }
        }
    }

    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.faces.len()).sum()
    }
}
