use rustc_hash::FxHashMap;

use crate::animation::binding::{CurveBinding, TransformProperty};
use crate::animation::curve::Curve;
use crate::errors::{Result, TransmuteError};

/// An animation clip: named scalar curves keyed by (bone path, property),
/// plus the timing metadata needed to sample it frame by frame.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Length in seconds.
    pub duration: f32,
    /// Samples per second.
    pub frame_rate: f32,
    curves: FxHashMap<CurveBinding, Curve>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: &str, duration: f32, frame_rate: f32) -> Self {
        Self {
            name: name.to_string(),
            duration,
            frame_rate,
            curves: FxHashMap::default(),
        }
    }

    /// Number of frames sampled over the clip: `floor(duration · frame_rate) + 1`.
    pub fn frame_count(&self) -> Result<usize> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(TransmuteError::InvalidFrameRate {
                clip: self.name.clone(),
                frame_rate: self.frame_rate,
            });
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(TransmuteError::InvalidDuration {
                clip: self.name.clone(),
                duration: self.duration,
            });
        }
        Ok((self.duration * self.frame_rate).floor() as usize + 1)
    }

    /// Time in seconds of frame `index`.
    #[inline]
    #[must_use]
    pub fn frame_time(&self, index: usize) -> f32 {
        index as f32 / self.frame_rate
    }

    #[must_use]
    pub fn curve(&self, binding: &CurveBinding) -> Option<&Curve> {
        self.curves.get(binding)
    }

    /// Looks up a curve by path and property without building a binding.
    #[must_use]
    pub fn curve_at(&self, path: &str, property: TransformProperty) -> Option<&Curve> {
        self.curves.get(&CurveBinding::new(path, property))
    }

    /// Sets the curve for a binding, replacing any previous one.
    pub fn set_curve(&mut self, binding: CurveBinding, curve: Curve) {
        self.curves.insert(binding, curve);
    }

    /// Removes the curve for a binding. Returns whether one was present.
    pub fn clear_curve(&mut self, binding: &CurveBinding) -> bool {
        self.curves.remove(binding).is_some()
    }

    /// All (binding, curve) pairs, in no particular order.
    pub fn curves(&self) -> impl Iterator<Item = (&CurveBinding, &Curve)> {
        self.curves.iter()
    }

    #[inline]
    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }
}
