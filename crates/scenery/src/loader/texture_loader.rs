use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::engine::TextureImage;

/// Decodes a PNG or JPEG file into RGBA8.
#[instrument(skip(content))]
pub fn decode_texture(file_name: &str, content: &[u8]) -> Result<TextureImage> {
    let now = Instant::now();
    let image = image::load_from_memory(content)
        .with_context(|| format!("Failed to decode texture '{file_name}'"))?
        .into_rgba8();
    let (width, height) = image.dimensions();
    debug!("Decoded {width}x{height} in {:?}", now.elapsed());
    TextureImage::try_new(width, height, image.into_raw())
}
