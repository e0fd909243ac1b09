use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::control::DEFAULT_MOUSE_SENSITIVITY;
use crate::engine::AnimationPlayback;

const APP_CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefills the scene picker.
    pub scene_directory: Option<String>,
    pub window_size: (f32, f32),
    pub mouse_sensitivity: f32,
    pub clear_color: [f32; 4],
    pub animation_playback: AnimationPlayback,
    pub field_of_view_degrees: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scene_directory: None,
            window_size: (1280.0, 800.0),
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            animation_playback: AnimationPlayback::Loop,
            field_of_view_degrees: 45.0,
        }
    }
}

impl AppConfig {
    /// Reads `config.ron` from the working directory, or returns defaults if there is none.
    pub fn load() -> Result<Self> {
        match std::fs::read_to_string(APP_CONFIG_FILE) {
            Ok(config_str) => {
                Self::from_ron(&config_str).with_context(|| format!("Invalid {APP_CONFIG_FILE}"))
            }
            Err(_) => {
                debug!("No {APP_CONFIG_FILE}, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_str = ron::ser::to_string_pretty(&self, Default::default())?;
        std::fs::write(APP_CONFIG_FILE, config_str)?;
        Ok(())
    }

    fn from_ron(config_str: &str) -> Result<Self> {
        let options = ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME);
        Ok(options.from_str(config_str)?)
    }

    pub fn field_of_view(&self) -> f32 {
        self.field_of_view_degrees.to_radians()
    }
}
