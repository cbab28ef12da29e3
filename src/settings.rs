//! Retargeting Settings
//!
//! The two tolerances that trade keyframe count against fidelity.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rig_transmute::RetargetSettings;
//!
//! // Lossless: every recorded key is kept
//! let settings = RetargetSettings::default();
//!
//! // Fewer keys, slightly more jitter
//! let settings = RetargetSettings::default()
//!     .with_position_accuracy(0.01)
//!     .with_rotation_accuracy(0.5);
//! ```

use crate::errors::{Result, TransmuteError};

/// Tolerances used by the recorder and the reducer.
///
/// An accuracy of exactly zero disables reduction for that kind of curve.
/// Position accuracy also bounds how far the first frame may sit from the
/// rest pose before it is keyed; later frames are keyed on any movement
/// above [`CHANGE_EPSILON`](crate::math::CHANGE_EPSILON).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RetargetSettings {
    /// Position tolerance in world units.
    pub position_accuracy: f32,
    /// Rotation tolerance in degrees (compared on Euler angles).
    pub rotation_accuracy: f32,
}

impl RetargetSettings {
    #[must_use]
    pub fn new(position_accuracy: f32, rotation_accuracy: f32) -> Self {
        Self {
            position_accuracy,
            rotation_accuracy,
        }
    }

    #[must_use]
    pub fn with_position_accuracy(mut self, accuracy: f32) -> Self {
        self.position_accuracy = accuracy;
        self
    }

    #[must_use]
    pub fn with_rotation_accuracy(mut self, accuracy: f32) -> Self {
        self.rotation_accuracy = accuracy;
        self
    }

    /// Clamps negative tolerances to zero and rejects non-finite ones.
    pub fn sanitized(self) -> Result<Self> {
        Ok(Self {
            position_accuracy: sanitize("position", self.position_accuracy)?,
            rotation_accuracy: sanitize("rotation", self.rotation_accuracy)?,
        })
    }
}

fn sanitize(name: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value.max(0.0))
    } else {
        Err(TransmuteError::InvalidAccuracy { name, value })
    }
}
