//! Clip Writer
//!
//! Applies recorded curves back onto a clip in two phases:
//!
//! 1. Every transform curve bound to a mapped donor bone's path is cleared,
//!    so stale donor data cannot leak into the output.
//! 2. Each target bone's position and rotation groups are written at its
//!    path, or cleared when the group never received a key. Scale is
//!    always cleared.
//!
//! All clears run before any write, so a donor path that coincides with a
//! target path ends up holding the target's curves.

use slotmap::SecondaryMap;

use crate::animation::binding::{CurveBinding, TransformProperty};
use crate::animation::clip::AnimationClip;
use crate::animation::curve::Curve;
use crate::retarget::context::RetargetContext;
use crate::scene::BoneId;

/// Bone paths of both skeletons, each relative to its own root.
#[derive(Debug, Clone)]
pub struct BonePaths {
    pub donor: SecondaryMap<BoneId, String>,
    pub target: SecondaryMap<BoneId, String>,
}

fn set_group<const N: usize>(
    clip: &mut AnimationClip,
    path: &str,
    properties: [TransformProperty; N],
    curves: Option<[Curve; N]>,
) {
    match curves {
        Some(curves) => {
            for (property, curve) in properties.into_iter().zip(curves) {
                clip.set_curve(CurveBinding::new(path, property), curve);
            }
        }
        None => {
            for property in properties {
                clip.clear_curve(&CurveBinding::new(path, property));
            }
        }
    }
}

/// Writes a recorded (and possibly reduced) context into `clip`.
///
/// Returns the number of curves written.
pub fn write_clip(clip: &mut AnimationClip, context: RetargetContext, paths: &BonePaths) -> usize {
    // Phase 1: clear legacy donor curves
    for track in context.tracks() {
        let Some(path) = paths.donor.get(track.donor) else {
            continue;
        };
        for property in TransformProperty::ALL {
            clip.clear_curve(&CurveBinding::new(path.as_str(), property));
        }
    }

    // Phase 2: write target curves
    let mut written = 0;
    for track in context.into_tracks() {
        let Some(path) = paths.target.get(track.target) else {
            log::warn!("Target bone of a mapped pair has no path, skipping");
            continue;
        };

        let position = track.position.was_written().then_some(track.curves.position);
        let rotation = track.rotation.was_written().then_some(track.curves.rotation);
        written += position.as_ref().map_or(0, |c| c.len()) + rotation.as_ref().map_or(0, |c| c.len());

        set_group(clip, path, TransformProperty::POSITION, position);
        set_group(clip, path, TransformProperty::ROTATION, rotation);
        set_group(clip, path, TransformProperty::SCALE, None);
    }
    written
}
