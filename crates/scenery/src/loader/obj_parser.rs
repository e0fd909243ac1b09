use anyhow::{anyhow, bail, ensure, Context, Result};
use glam::{Vec2, Vec3};
use smallvec::SmallVec;

/// Material assigned to faces that precede any `usemtl`.
pub const DEFAULT_MATERIAL_NAME: &str = "default";

/// One polygon corner. Indices are zero-based and already checked against the file's pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjFaceVertex {
    pub vertex_index: usize,
    pub texture_index: Option<usize>,
    pub normal_index: Option<usize>,
}

/// Corners of one polygon; triangles and quads stay inline.
pub type FaceVertices = SmallVec<[ObjFaceVertex; 4]>;

#[derive(Clone, Debug, PartialEq)]
pub struct ObjFace {
    pub vertices: FaceVertices,
    pub material: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjModel {
    pub name: String,
    pub faces: Vec<ObjFace>,
}

/// A parsed `.obj` file. Attribute pools are shared by all models of the file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjFile {
    pub material_libraries: Vec<String>,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texture_coords: Vec<Vec2>,
    pub models: Vec<ObjModel>,
}

impl ObjFile {
    /// Models without faces are dropped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut file = ObjFile::default();
        let mut model = ObjModel {
            name: String::new(),
            faces: vec![],
        };
        let mut material = DEFAULT_MATERIAL_NAME.to_string();

        for (line_index, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let mut tokens = line.split_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };
            let rest = || tokens.clone().collect::<Vec<_>>().join(" ");

            let result = match keyword {
                "v" => parse_vec3(tokens.clone()).map(|v| file.positions.push(v)),
                "vn" => parse_vec3(tokens.clone()).map(|v| file.normals.push(v)),
                "vt" => parse_vec2(tokens.clone()).map(|v| file.texture_coords.push(v)),
                "f" => file.parse_face(tokens.clone()).map(|vertices| {
                    model.faces.push(ObjFace {
                        vertices,
                        material: material.clone(),
                    })
                }),
                "o" | "g" => {
                    let previous = std::mem::replace(
                        &mut model,
                        ObjModel {
                            name: rest(),
                            faces: vec![],
                        },
                    );
                    file.push_model(previous);
                    Ok(())
                }
                "usemtl" => {
                    material = rest();
                    Ok(())
                }
                "mtllib" => {
                    file.material_libraries.extend(tokens.clone().map(str::to_string));
                    Ok(())
                }
                _ => Ok(()),
            };
            result.with_context(|| format!("Line {}: '{line}'", line_index + 1))?;
        }
        file.push_model(model);
        Ok(file)
    }

    fn push_model(&mut self, model: ObjModel) {
        if !model.faces.is_empty() {
            self.models.push(model);
        }
    }

    fn parse_face<'a>(&self, tokens: impl Iterator<Item = &'a str>) -> Result<FaceVertices> {
        let vertices = tokens
            .map(|token| self.parse_face_vertex(token))
            .collect::<Result<FaceVertices>>()?;
        ensure!(vertices.len() >= 3, "Face has only {} vertices", vertices.len());
        Ok(vertices)
    }

    /// Accepts `v`, `v/vt`, `v//vn` and `v/vt/vn`.
    fn parse_face_vertex(&self, token: &str) -> Result<ObjFaceVertex> {
        let mut parts = token.split('/');
        let vertex = parts.next().filter(|s| !s.is_empty()).ok_or_else(|| anyhow!("Empty face vertex"))?;
        let texture = parts.next().filter(|s| !s.is_empty());
        let normal = parts.next().filter(|s| !s.is_empty());
        ensure!(parts.next().is_none(), "Malformed face vertex '{token}'");

        Ok(ObjFaceVertex {
            vertex_index: resolve_index(vertex, self.positions.len())?,
            texture_index: texture.map(|s| resolve_index(s, self.texture_coords.len())).transpose()?,
            normal_index: normal.map(|s| resolve_index(s, self.normals.len())).transpose()?,
        })
    }
}

/// Converts a 1-based or negative (relative to the end) index into a zero-based one.
fn resolve_index(token: &str, pool_size: usize) -> Result<usize> {
    let index: i64 = token.parse().with_context(|| format!("Invalid index '{token}'"))?;
    let resolved = match index {
        0 => bail!("Index 0 is not valid"),
        i if i > 0 => i - 1,
        i => pool_size as i64 + i,
    };
    ensure!(
        (0..pool_size as i64).contains(&resolved),
        "Index {index} out of range, only {pool_size} defined"
    );
    Ok(resolved as usize)
}

fn parse_floats<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Vec<f32>> {
    tokens
        .map(|token| token.parse::<f32>().with_context(|| format!("Invalid number '{token}'")))
        .collect()
}

fn parse_vec3<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Vec3> {
    let values = parse_floats(tokens)?;
    ensure!(values.len() >= 3, "Expected 3 components, found {}", values.len());
    Ok(Vec3::new(values[0], values[1], values[2]))
}

/// `vt u [v [w]]`; a missing v is 0 and w is ignored.
fn parse_vec2<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Vec2> {
    let values = parse_floats(tokens)?;
    ensure!(!values.is_empty(), "Texture coordinate has no components");
    Ok(Vec2::new(values[0], values.get(1).copied().unwrap_or(0.0)))
}
