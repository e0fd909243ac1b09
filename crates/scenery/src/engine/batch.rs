use std::rc::Rc;

use ahash::AHashMap;

use super::core::{MeshIndex, Vertex3};
use super::{Material, Mesh, Scene, TextureImage};

/// Which image a batch samples from.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchTexture {
    Image(Rc<TextureImage>),
    /// The material has no texture; the shared 1x1 white texture stands in.
    White,
}

/// All faces of one mesh that share a material, flattened into one interleaved vertex stream and
/// one triangle-list index stream. Drawn with a single draw call.
pub struct MaterialBatch {
    pub material: Rc<Material>,
    pub vertices: Vec<Vertex3>,
    pub indices: Vec<MeshIndex>,
    /// Positions of the batched faces in the mesh face list, in batch order.
    pub face_indices: Vec<usize>,
}

impl MaterialBatch {
    fn new(material: Rc<Material>) -> Self {
        Self {
            material,
            vertices: Vec::new(),
            indices: Vec::new(),
            face_indices: Vec::new(),
        }
    }

    pub fn texture(&self) -> BatchTexture {
        match &self.material.texture {
            Some(image) => BatchTexture::Image(image.clone()),
            None => BatchTexture::White,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn push_face(&mut self, face_index: usize, mesh: &Mesh) {
        let face = &mesh.faces[face_index];
        let base = self.vertices.len() as MeshIndex;
        for ((position, normal), uv) in
            face.positions().iter().zip(face.normals()).zip(face.texture_coords())
        {
            self.vertices.push(Vertex3 {
                a_position: position.to_array(),
                a_normal: normal.to_array(),
                a_uv: uv.to_array(),
            });
        }
        // Triangle fan around the first corner.
        for i in 1..face.vertex_count() as MeshIndex - 1 {
            self.indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
        self.face_indices.push(face_index);
    }
}

/// Groups a mesh's faces by material name, keeping the order in which names first appear.
pub fn build_material_batches(mesh: &Mesh) -> Vec<MaterialBatch> {
    let mut batches: Vec<MaterialBatch> = Vec::new();
    let mut batch_by_name = AHashMap::<&str, usize>::new();
    for (face_index, face) in mesh.faces.iter().enumerate() {
        let batch_index = *batch_by_name.entry(face.material.name.as_str()).or_insert_with(|| {
            batches.push(MaterialBatch::new(face.material.clone()));
            batches.len() - 1
        });
        batches[batch_index].push_face(face_index, mesh);
    }
    batches
}

/// Draw plan of a whole scene: one entry per mesh, in scene order.
pub struct SceneBatches {
    pub meshes: Vec<Vec<MaterialBatch>>,
}

impl SceneBatches {
    pub fn build(scene: &Scene) -> Self {
        Self {
            meshes: scene.meshes.iter().map(build_material_batches).collect(),
        }
    }

    pub fn draw_call_count(&self) -> usize {
        self.meshes.iter().map(Vec::len).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().flatten().map(|batch| batch.vertices.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use itertools::Itertools;

    use super::*;
    use crate::engine::{Camera, Face};

    fn face(corners: usize, material: &Rc<Material>) -> Face {
        let positions = (0..corners)
            .map(|i| {
                let angle = i as f32 / corners as f32 * std::f32::consts::TAU;
                Vec3::new(angle.cos(), angle.sin(), 0.0)
            })
            .collect_vec();
        Face::try_new(positions, vec![Vec3::Z; corners], vec![Vec2::ZERO; corners], material.clone())
            .unwrap()
    }

    fn material(name: &str) -> Rc<Material> {
        Rc::new(Material::new(name))
    }

    #[test]
    fn batches_cover_every_face_exactly_once() {
        let red = material("red");
        let blue = material("blue");
        let green = material("green");
        let mesh = Mesh::new(
            "mixed",
            vec![
                face(3, &red),
                face(4, &blue),
                face(3, &red),
                face(5, &green),
                face(3, &blue),
                face(3, &red),
            ],
        );
        let batches = build_material_batches(&mesh);

        assert_eq!(batches.len(), 3);
        let names = batches.iter().map(|b| b.material.name.as_str()).collect_vec();
        assert_eq!(names, ["red", "blue", "green"]);

        let covered = batches.iter().flat_map(|b| b.face_indices.iter().copied()).sorted().collect_vec();
        assert_eq!(covered, (0..mesh.faces.len()).collect_vec());
        assert_eq!(batches[0].face_indices, [0, 2, 5]);
        assert_eq!(batches[1].face_indices, [1, 4]);
    }

    #[test]
    fn polygons_are_fanned_into_local_triangles() {
        let red = material("red");
        let mesh = Mesh::new("quads", vec![face(4, &red), face(3, &red)]);
        let batches = build_material_batches(&mesh);
        let batch = &batches[0];

        assert_eq!(batch.vertices.len(), 7);
        assert_eq!(batch.indices, [0, 1, 2, 0, 2, 3, 4, 5, 6]);
        assert_eq!(batch.index_count(), 9);
        assert!(batch.indices.iter().all(|&i| (i as usize) < batch.vertices.len()));
    }

    #[test]
    fn interleaved_vertex_carries_face_attributes() {
        let red = material("red");
        let face = Face::try_new(
            vec![Vec3::new(1.0, 2.0, 3.0), Vec3::X, Vec3::Y],
            vec![Vec3::Y, Vec3::ZERO, Vec3::ZERO],
            vec![Vec2::new(0.25, 0.75), Vec2::ZERO, Vec2::ZERO],
            red,
        )
        .unwrap();
        let batches = build_material_batches(&Mesh::new("one", vec![face]));
        let first = batches[0].vertices[0];
        assert_eq!(first.a_position, [1.0, 2.0, 3.0]);
        assert_eq!(first.a_normal, [0.0, 1.0, 0.0]);
        assert_eq!(first.a_uv, [0.25, 0.75]);
    }

    #[test]
    fn same_name_materials_share_a_batch() {
        // Distinct instances, same identity.
        let a = material("shared");
        let b = material("shared");
        let mesh = Mesh::new("twins", vec![face(3, &a), face(3, &b)]);
        assert_eq!(build_material_batches(&mesh).len(), 1);
    }

    #[test]
    fn missing_texture_samples_white() {
        let mut textured = Material::new("textured");
        let image = Rc::new(TextureImage::try_new(1, 1, vec![10, 20, 30, 255]).unwrap());
        textured.texture = Some(image.clone());
        let mesh = Mesh::new(
            "textures",
            vec![face(3, &material("plain")), face(3, &Rc::new(textured))],
        );
        let batches = build_material_batches(&mesh);
        assert_eq!(batches[0].texture(), BatchTexture::White);
        assert_eq!(batches[1].texture(), BatchTexture::Image(image));
    }

    #[test]
    fn batching_is_scoped_per_mesh() {
        let shared = material("shared");
        let scene = Scene {
            name: "two objects".to_string(),
            light_position: Vec3::ONE,
            camera: Camera::default(),
            meshes: vec![
                Mesh::new("first", vec![face(3, &shared), face(4, &shared)]),
                Mesh::new("second", vec![face(3, &shared)]),
            ],
        };
        let plan = SceneBatches::build(&scene);
        assert_eq!(plan.draw_call_count(), 2);
        assert_eq!(plan.meshes[0].len(), 1);
        assert_eq!(plan.meshes[1].len(), 1);
        assert_eq!(plan.vertex_count(), 10);
    }
}
