pub mod animation;
pub mod batch;
pub mod camera;
pub mod core;
pub mod material;
pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod transformation;

pub use animation::{Animation, AnimationPlayback, Easing, Keyframe};
pub use batch::{BatchTexture, MaterialBatch, SceneBatches};
pub use camera::Camera;
pub use self::core::{GpuContext, Size2D};
pub use material::{Material, TextureImage};
pub use mesh::{Face, Mesh};
pub use renderer::{Renderer, RendererState};
pub use scene::Scene;
pub use transformation::Transformation;
