pub mod interaction;

pub use interaction::{InputEvent, InteractionController, DEFAULT_MOUSE_SENSITIVITY};
