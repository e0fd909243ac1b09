use std::rc::Rc;

use anyhow::{ensure, Result};

pub const DEFAULT_AMBIENT: f32 = 0.2;
pub const DEFAULT_DIFFUSE: f32 = 0.8;
pub const DEFAULT_SPECULAR: f32 = 1.0;
pub const DEFAULT_SHININESS: f32 = 10.0;

/// A decoded RGBA8 image, ready to be copied into a sampled texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn try_new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        ensure!(width > 0 && height > 0, "Texture has zero size: {width}x{height}");
        ensure!(
            rgba.len() == width as usize * height as usize * 4,
            "Texture data is {} bytes, expected {} for {width}x{height} RGBA",
            rgba.len(),
            width as usize * height as usize * 4
        );
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Opaque white 1x1 image, sampled when a material has no texture.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255, 255, 255, 255],
        }
    }
}

/// Phong shading coefficients plus an optional texture.
///
/// Batching treats two materials with the same `name` as the same material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    /// Shininess exponent.
    pub q: f32,
    pub texture: Option<Rc<TextureImage>>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ka: DEFAULT_AMBIENT,
            kd: DEFAULT_DIFFUSE,
            ks: DEFAULT_SPECULAR,
            q: DEFAULT_SHININESS,
            texture: None,
        }
    }
}
