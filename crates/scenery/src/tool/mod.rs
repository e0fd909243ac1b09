mod app_config;
mod scene_picker;
mod scene_view;
mod window_runner;

pub use app_config::AppConfig;
pub use window_runner::WindowRunner;
