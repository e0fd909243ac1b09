use anyhow::{ensure, Context, Result};
use glam::Vec3;
use serde::Deserialize;

use crate::engine::{Animation, Easing, Keyframe, Transformation};

pub const DESCRIPTOR_FILE_NAME: &str = "index.json";

/// Contents of `index.json`.
#[derive(Debug, Deserialize)]
pub struct SceneDescriptor {
    pub objects: Vec<ObjectDescriptor>,
    pub camera: CameraDescriptor,
    #[serde(default)]
    pub light: Option<LightDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct ObjectDescriptor {
    pub name: String,
    pub file: String,
    #[serde(default)]
    pub transformation: Option<TransformationDescriptor>,
    #[serde(default)]
    pub material: Option<MaterialDescriptor>,
    #[serde(default)]
    pub animation: Option<AnimationDescriptor>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Point3> for Vec3 {
    fn from(p: Point3) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct TransformationDescriptor {
    #[serde(default)]
    pub rotation: Point3,
    #[serde(default)]
    pub translation: Point3,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

impl From<&TransformationDescriptor> for Transformation {
    fn from(descriptor: &TransformationDescriptor) -> Self {
        Transformation {
            translation: descriptor.translation.into(),
            rotation: descriptor.rotation.into(),
            scale: descriptor.scale,
        }
    }
}

/// Overrides for the coefficients of every material of one object.
#[derive(Debug, Default, Deserialize)]
pub struct MaterialDescriptor {
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub ka: Option<f32>,
    #[serde(default)]
    pub kd: Option<f32>,
    #[serde(default)]
    pub ks: Option<f32>,
    #[serde(default)]
    pub q: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyframeDescriptor {
    #[serde(default)]
    pub translation: Option<Point3>,
    #[serde(default)]
    pub rotation: Option<Point3>,
}

impl From<&KeyframeDescriptor> for Keyframe {
    fn from(descriptor: &KeyframeDescriptor) -> Self {
        Keyframe {
            translation: descriptor.translation.map(Vec3::from),
            rotation: descriptor.rotation.map(Vec3::from),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnimationDescriptor {
    #[serde(rename = "type")]
    pub easing: Easing,
    /// Milliseconds.
    pub duration: f64,
    pub start: KeyframeDescriptor,
    pub end: KeyframeDescriptor,
}

impl AnimationDescriptor {
    pub fn to_animation(&self) -> Result<Animation> {
        ensure!(
            self.duration.is_finite() && self.duration > 0.0,
            "Animation duration must be positive, got {}",
            self.duration
        );
        ensure!(
            self.start.translation.is_none() || self.end.translation.is_some(),
            "Animation start has a translation but end does not"
        );
        ensure!(
            self.start.rotation.is_none() || self.end.rotation.is_some(),
            "Animation start has a rotation but end does not"
        );
        Ok(Animation {
            easing: self.easing,
            duration: self.duration,
            start: (&self.start).into(),
            end: (&self.end).into(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CameraDescriptor {
    pub position: [f32; 3],
}

#[derive(Debug, Deserialize)]
pub struct LightDescriptor {
    pub position: [f32; 3],
}

impl SceneDescriptor {
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid scene descriptor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "objects": [
            {
                "name": "cube",
                "file": "cube.obj",
                "transformation": {
                    "rotation": { "x": 0.5, "y": 0, "z": 0 },
                    "translation": { "x": 1, "y": 2, "z": 3 },
                    "scale": 2
                },
                "material": { "texture": "cube.png", "ka": 0.1, "ks": 0.5, "kd": 0.9 },
                "animation": {
                    "type": "easeIn",
                    "duration": 2000,
                    "start": { "translation": { "x": 0, "y": 0, "z": 0 } },
                    "end": { "translation": { "x": 0, "y": 5, "z": 0 } }
                }
            },
            { "name": "floor", "file": "floor.obj" }
        ],
        "camera": { "position": [0, 1, 8] },
        "light": { "position": [2, 10, 2] }
    }"#;

    #[test]
    fn parses_full_descriptor() {
        let descriptor = SceneDescriptor::parse(FULL).unwrap();
        assert_eq!(descriptor.objects.len(), 2);
        assert_eq!(descriptor.camera.position, [0.0, 1.0, 8.0]);
        assert_eq!(descriptor.light.as_ref().unwrap().position, [2.0, 10.0, 2.0]);

        let cube = &descriptor.objects[0];
        let transformation = Transformation::from(cube.transformation.as_ref().unwrap());
        assert_eq!(transformation.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transformation.scale, 2.0);

        let material = cube.material.as_ref().unwrap();
        assert_eq!(material.texture.as_deref(), Some("cube.png"));
        assert_eq!(material.q, None);

        let animation = cube.animation.as_ref().unwrap().to_animation().unwrap();
        assert_eq!(animation.easing, Easing::EaseIn);
        assert_eq!(animation.end.translation, Some(Vec3::new(0.0, 5.0, 0.0)));
        assert_eq!(animation.start.rotation, None);

        let floor = &descriptor.objects[1];
        assert!(floor.transformation.is_none() && floor.material.is_none() && floor.animation.is_none());
    }

    #[test]
    fn light_is_optional() {
        let descriptor =
            SceneDescriptor::parse(r#"{ "objects": [], "camera": { "position": [0, 0, 5] } }"#)
                .unwrap();
        assert!(descriptor.light.is_none());
    }

    #[test]
    fn rejects_unknown_animation_type() {
        let text = FULL.replace("easeIn", "bounce");
        assert!(SceneDescriptor::parse(&text).is_err());
    }

    #[test]
    fn rejects_missing_camera() {
        assert!(SceneDescriptor::parse(r#"{ "objects": [] }"#).is_err());
    }

    #[test]
    fn rejects_keyframe_field_missing_from_end() {
        let animation = AnimationDescriptor {
            easing: Easing::Linear,
            duration: 100.0,
            start: KeyframeDescriptor {
                translation: None,
                rotation: Some(Point3::default()),
            },
            end: KeyframeDescriptor::default(),
        };
        assert!(animation.to_animation().is_err());
    }

    #[test]
    fn rejects_non_positive_duration() {
        let animation = AnimationDescriptor {
            easing: Easing::Bezier,
            duration: 0.0,
            start: KeyframeDescriptor::default(),
            end: KeyframeDescriptor::default(),
        };
        assert!(animation.to_animation().is_err());
    }
}
