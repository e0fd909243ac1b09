pub mod descriptor;
pub mod mtl_parser;
pub mod obj_parser;
pub mod scene_loader;
pub mod scene_source;
pub mod texture_loader;

pub use scene_loader::load_scene;
pub use scene_source::{DirectorySource, SceneSource};
