use glam::Vec3;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::Transformation;

/// Remaps normalized animation time before interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Easing {
    Linear,
    EaseIn,
    /// Smoothstep, eases in and out.
    Bezier,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::Bezier => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// What happens once the wall clock passes the end of the first cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum AnimationPlayback {
    /// Wrap around and play again, forever.
    #[default]
    Loop,
    /// Hold the end keyframe.
    Once,
}

/// A partial transformation snapshot. Scale is never animated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Keyframe {
    pub translation: Option<Vec3>,
    pub rotation: Option<Vec3>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub easing: Easing,
    /// Cycle length in milliseconds, always positive.
    pub duration: f64,
    pub start: Keyframe,
    pub end: Keyframe,
}

impl Animation {
    /// Normalized time in `[0, 1]` for a wall-clock time in milliseconds.
    ///
    /// Looping uses the remainder of the elapsed time so precision does not degrade as `now`
    /// grows over long sessions.
    pub fn progress(&self, now: f64, playback: AnimationPlayback) -> f32 {
        match playback {
            AnimationPlayback::Loop => (now.rem_euclid(self.duration) / self.duration) as f32,
            AnimationPlayback::Once => (now / self.duration).clamp(0.0, 1.0) as f32,
        }
    }

    /// Writes the interpolated keyframe fields into `transformation`.
    ///
    /// Fields not present in both keyframes are left untouched.
    pub fn evaluate(&self, now: f64, playback: AnimationPlayback, transformation: &mut Transformation) {
        let t = self.easing.apply(self.progress(now, playback));
        if let (Some(start), Some(end)) = (self.start.translation, self.end.translation) {
            transformation.translation = start.lerp(end, t);
        }
        if let (Some(start), Some(end)) = (self.start.rotation, self.end.rotation) {
            transformation.rotation = start.lerp(end, t);
        }
    }
}
