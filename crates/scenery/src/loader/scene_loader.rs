use std::rc::Rc;
use std::time::Instant;

use ahash::AHashMap;
use anyhow::{ensure, Context, Result};
use glam::{Vec2, Vec3};
use tracing::{debug, info, instrument, warn};

use super::descriptor::{MaterialDescriptor, ObjectDescriptor, SceneDescriptor, DESCRIPTOR_FILE_NAME};
use super::mtl_parser::{parse_mtl, MtlMaterial};
use super::obj_parser::{ObjFile, ObjModel};
use super::texture_loader::decode_texture;
use super::SceneSource;
use crate::engine::scene::DEFAULT_LIGHT_POSITION;
use crate::engine::{Camera, Face, Material, Mesh, Scene, TextureImage, Transformation};

/// Builds a scene from the `index.json` of `source` and the files it references.
#[instrument(skip(source), fields(source = source.name()))]
pub fn load_scene(source: &dyn SceneSource, field_of_view: f32) -> Result<Scene> {
    info!("Loading scene");
    let now = Instant::now();

    ensure!(
        source.contains(DESCRIPTOR_FILE_NAME),
        "Directory '{}' has no {DESCRIPTOR_FILE_NAME}, please select another directory",
        source.name()
    );
    let descriptor = SceneDescriptor::parse(&source.read_to_string(DESCRIPTOR_FILE_NAME)?)?;

    let mut meshes = vec![];
    for object in &descriptor.objects {
        let object_meshes = load_object(source, object)
            .with_context(|| format!("Failed to load object '{}'", object.name))?;
        meshes.extend(object_meshes);
    }

    let light_position = descriptor
        .light
        .as_ref()
        .map_or(DEFAULT_LIGHT_POSITION, |light| Vec3::from_array(light.position));
    let camera = Camera::new(Vec3::from_array(descriptor.camera.position))
        .with_field_of_view(field_of_view);

    let scene = Scene {
        name: source.name().to_string(),
        light_position,
        camera,
        meshes,
    };
    info!(
        "Loaded {} meshes with {} faces in {:?}",
        scene.meshes.len(),
        scene.face_count(),
        now.elapsed()
    );
    Ok(scene)
}

fn load_object(source: &dyn SceneSource, object: &ObjectDescriptor) -> Result<Vec<Mesh>> {
    debug!("Loading object '{}' from '{}'", object.name, object.file);
    let obj = ObjFile::parse(&source.read_to_string(&object.file)?)
        .with_context(|| format!("Failed to parse '{}'", object.file))?;
    let library = load_material_library(source, &obj)?;

    let texture_file = object
        .material
        .as_ref()
        .and_then(|material| material.texture.clone())
        .or_else(|| first_diffuse_map(&obj, &library));
    let texture = match texture_file {
        Some(file) => Some(Rc::new(decode_texture(&file, &source.read_bytes(&file)?)?)),
        None => None,
    };

    let transformation = object
        .transformation
        .as_ref()
        .map(Transformation::from)
        .unwrap_or_default();
    let animation = object
        .animation
        .as_ref()
        .map(|animation| animation.to_animation())
        .transpose()?;

    let mut materials = MaterialSet {
        library: &library,
        overrides: object.material.as_ref(),
        texture,
        by_name: AHashMap::new(),
    };
    let mut meshes = vec![];
    for (index, model) in obj.models.iter().enumerate() {
        let name = match index {
            0 => object.name.clone(),
            _ => format!("{}.{index}", object.name),
        };
        let mut mesh = build_mesh(&name, model, &obj, &mut materials)?;
        mesh.transformation = transformation;
        mesh.animation = animation.clone();
        meshes.push(mesh);
    }
    debug!("Object '{}' uses {} materials", object.name, materials.by_name.len());
    Ok(meshes)
}

/// Libraries named by the file but absent from the source only leave coefficients at defaults.
fn load_material_library(
    source: &dyn SceneSource,
    obj: &ObjFile,
) -> Result<AHashMap<String, MtlMaterial>> {
    let mut library = AHashMap::new();
    for file in &obj.material_libraries {
        if !source.contains(file) {
            warn!("Material library '{file}' not found, using default coefficients.");
            continue;
        }
        let materials = parse_mtl(&source.read_to_string(file)?)
            .with_context(|| format!("Failed to parse '{file}'"))?;
        library.extend(materials.into_iter().map(|material| (material.name.clone(), material)));
    }
    Ok(library)
}

/// The `map_Kd` of the first face material that has one.
fn first_diffuse_map(obj: &ObjFile, library: &AHashMap<String, MtlMaterial>) -> Option<String> {
    obj.models
        .iter()
        .flat_map(|model| &model.faces)
        .filter_map(|face| library.get(&face.material))
        .find_map(|material| material.diffuse_map.clone())
}

/// Materials of one object, shared between its faces by name.
struct MaterialSet<'a> {
    library: &'a AHashMap<String, MtlMaterial>,
    overrides: Option<&'a MaterialDescriptor>,
    texture: Option<Rc<TextureImage>>,
    by_name: AHashMap<String, Rc<Material>>,
}

impl MaterialSet<'_> {
    fn get(&mut self, name: &str) -> Rc<Material> {
        if let Some(material) = self.by_name.get(name) {
            return Rc::clone(material);
        }
        let mut material = Material::new(name);
        if let Some(library_material) = self.library.get(name) {
            library_material.apply_to(&mut material);
        }
        if let Some(overrides) = self.overrides {
            apply_overrides(overrides, &mut material);
        }
        material.texture = self.texture.clone();

        let material = Rc::new(material);
        self.by_name.insert(name.to_string(), Rc::clone(&material));
        material
    }
}

fn apply_overrides(overrides: &MaterialDescriptor, material: &mut Material) {
    if let Some(ka) = overrides.ka {
        material.ka = ka;
    }
    if let Some(kd) = overrides.kd {
        material.kd = kd;
    }
    if let Some(ks) = overrides.ks {
        material.ks = ks;
    }
    if let Some(q) = overrides.q {
        material.q = q;
    }
}

fn build_mesh(
    name: &str,
    model: &ObjModel,
    obj: &ObjFile,
    materials: &mut MaterialSet,
) -> Result<Mesh> {
    let mut missing_normals = false;
    let mut missing_texture_coords = false;
    let mut faces = Vec::with_capacity(model.faces.len());

    for face in &model.faces {
        let mut positions = Vec::with_capacity(face.vertices.len());
        let mut normals = Vec::with_capacity(face.vertices.len());
        let mut texture_coords = Vec::with_capacity(face.vertices.len());
        for vertex in &face.vertices {
            positions.push(obj.positions[vertex.vertex_index]);
            normals.push(match vertex.normal_index {
                Some(index) => obj.normals[index],
                None => {
                    missing_normals = true;
                    Vec3::ZERO
                }
            });
            texture_coords.push(match vertex.texture_index {
                Some(index) => obj.texture_coords[index],
                None => {
                    missing_texture_coords = true;
                    Vec2::ZERO
                }
            });
        }
        faces.push(Face::try_new(positions, normals, texture_coords, materials.get(&face.material))?);
    }

    if missing_normals {
        warn!("Mesh '{name}' has no vertex normals.");
    }
    if missing_texture_coords {
        warn!("Mesh '{name}' has no texture coordinates.");
    }
    Ok(Mesh::new(name, faces))
}
