use std::rc::Rc;

use anyhow::{ensure, Result};
use glam::{Vec2, Vec3};

use super::{Animation, Material, Transformation};

/// A planar polygon. Each corner owns its own copy of position, normal and texture coordinate;
/// corners are never shared between faces.
#[derive(Clone, Debug)]
pub struct Face {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    texture_coords: Vec<Vec2>,
    pub material: Rc<Material>,
}

impl Face {
    pub fn try_new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        texture_coords: Vec<Vec2>,
        material: Rc<Material>,
    ) -> Result<Self> {
        ensure!(positions.len() >= 3, "Face has only {} vertices", positions.len());
        ensure!(
            positions.len() == normals.len() && positions.len() == texture_coords.len(),
            "Face attribute counts differ: {} positions, {} normals, {} texture coordinates",
            positions.len(),
            normals.len(),
            texture_coords.len()
        );
        Ok(Self {
            positions,
            normals,
            texture_coords,
            material,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn texture_coords(&self) -> &[Vec2] {
        &self.texture_coords
    }
}

/// One drawable object instance.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub faces: Vec<Face>,
    pub transformation: Transformation,
    pub animation: Option<Animation>,
}

impl Mesh {
    pub fn new(name: &str, faces: Vec<Face>) -> Self {
        Self {
            name: name.to_string(),
            faces,
            transformation: Transformation::default(),
            animation: None,
        }
    }
}
