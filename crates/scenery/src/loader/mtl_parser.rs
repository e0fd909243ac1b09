use anyhow::{bail, Context, Result};
use glam::Vec3;

use crate::engine::Material;

/// One `newmtl` block of a material library. Unset statements keep the material defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MtlMaterial {
    pub name: String,
    pub ambient: Option<Vec3>,
    pub diffuse: Option<Vec3>,
    pub specular: Option<Vec3>,
    pub shininess: Option<f32>,
    pub diffuse_map: Option<String>,
}

impl MtlMaterial {
    /// Colors become scalar coefficients by averaging their channels.
    pub fn apply_to(&self, material: &mut Material) {
        let mean = |color: Vec3| (color.x + color.y + color.z) / 3.0;
        if let Some(ambient) = self.ambient {
            material.ka = mean(ambient);
        }
        if let Some(diffuse) = self.diffuse {
            material.kd = mean(diffuse);
        }
        if let Some(specular) = self.specular {
            material.ks = mean(specular);
        }
        if let Some(shininess) = self.shininess {
            material.q = shininess;
        }
    }
}

/// Parses a `.mtl` file. Statements outside a `newmtl` block are ignored.
pub fn parse_mtl(text: &str) -> Result<Vec<MtlMaterial>> {
    let mut materials: Vec<MtlMaterial> = vec![];

    for (line_index, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let argument = tokens.collect::<Vec<_>>().join(" ");

        if keyword == "newmtl" {
            materials.push(MtlMaterial {
                name: argument,
                ..Default::default()
            });
            continue;
        }
        let Some(material) = materials.last_mut() else {
            continue;
        };
        let result = (|| -> Result<()> {
            match keyword {
                "Ka" => material.ambient = Some(parse_color(&argument)?),
                "Kd" => material.diffuse = Some(parse_color(&argument)?),
                "Ks" => material.specular = Some(parse_color(&argument)?),
                "Ns" => {
                    material.shininess = Some(
                        argument
                            .parse()
                            .with_context(|| format!("Invalid shininess '{argument}'"))?,
                    )
                }
                // Options such as `-s 1 1 1` precede the file name.
                "map_Kd" => {
                    let file = argument.split_whitespace().last().context("map_Kd without a file name")?;
                    material.diffuse_map = Some(file.to_string());
                }
                _ => {}
            }
            Ok(())
        })();
        result.with_context(|| format!("Line {}: '{line}'", line_index + 1))?;
    }
    Ok(materials)
}

/// `r g b`, or a single value used for all three channels.
fn parse_color(argument: &str) -> Result<Vec3> {
    let values = argument
        .split_whitespace()
        .map(|token| token.parse::<f32>().with_context(|| format!("Invalid number '{token}'")))
        .collect::<Result<Vec<_>>>()?;
    match values[..] {
        [value] => Ok(Vec3::splat(value)),
        [r, g, b, ..] => Ok(Vec3::new(r, g, b)),
        _ => bail!("Expected an RGB color, found {} components", values.len()),
    }
}
