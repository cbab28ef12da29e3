//! Curve Recorder
//!
//! Replays a clip on the donor skeleton frame by frame and derives the local
//! transform of every mapped target bone:
//!
//! - **Rotation**: the donor bone's world-space rotation delta from its rest
//!   pose is applied on top of the target bone's rest world rotation.
//! - **Position**: the donor bone's world position is copied, shifted by the
//!   constant offset between the two skeleton roots.
//!
//! Keys are appended only when a value changes. When a change follows a run
//! of unchanged frames, the held value is pinned one frame earlier so the
//! curve stays flat across the gap instead of ramping through it.

use glam::{Quat, Vec3};
use slotmap::SecondaryMap;

use crate::animation::clip::AnimationClip;
use crate::animation::sampler::{Pose, PoseSampler, SamplingSession};
use crate::errors::{Result, TransmuteError};
use crate::math::{GlobalTransform, exceeds_tolerance, position_changed, rotation_delta};
use crate::retarget::context::{BoneTrack, RetargetContext};
use crate::retarget::resolver::BoneMap;
use crate::scene::{BoneId, Skeleton, transform_system};
use crate::settings::RetargetSettings;

/// Rest-pose data shared by every clip of a batch.
#[derive(Debug, Clone)]
pub struct RestPoses {
    pub donor: SecondaryMap<BoneId, GlobalTransform>,
    pub target: SecondaryMap<BoneId, GlobalTransform>,
    /// `target_root − donor_root` in world space.
    pub root_offset: Vec3,
}

impl RestPoses {
    #[must_use]
    pub fn new(donor: &Skeleton, target: &Skeleton) -> Self {
        Self {
            donor: donor.rest_pose(),
            target: target.rest_pose(),
            root_offset: target.root_world().translation - donor.root_world().translation,
        }
    }

    fn target_world(&self, bone: BoneId) -> GlobalTransform {
        self.target.get(bone).copied().unwrap_or_default()
    }
}

/// Local transform of `bone` given a world pose of its skeleton.
fn local_in(skeleton: &Skeleton, worlds: &SecondaryMap<BoneId, GlobalTransform>, bone: BoneId) -> (Vec3, Quat) {
    let world = worlds.get(bone).copied().unwrap_or_default();
    let parent = skeleton
        .bone(bone)
        .and_then(|b| b.parent())
        .and_then(|p| worlds.get(p).copied())
        .unwrap_or_default();
    parent.local_of(world.translation, world.rotation)
}

/// Fresh per-clip context whose baselines are the target bones' rest locals.
fn begin_context(clip: &AnimationClip, frames: usize, map: &BoneMap, target: &Skeleton, rest: &RestPoses) -> RetargetContext {
    let tracks = map
        .iter()
        .map(|pair| {
            let (position, rotation) = local_in(target, &rest.target, pair.target);
            BoneTrack::new(pair.donor, pair.target, position, rotation)
        })
        .collect();
    RetargetContext::new(&clip.name, clip.frame_rate, frames, tracks)
}

/// World pose of the target skeleton with every mapped bone driven by its
/// donor bone. A target bone mapped twice takes the later entry's transform.
fn retargeted_pose(
    clip: &AnimationClip,
    map: &BoneMap,
    donor: &Skeleton,
    target: &Skeleton,
    rest: &RestPoses,
    pose: &Pose,
) -> Result<SecondaryMap<BoneId, GlobalTransform>> {
    let mut overrides: SecondaryMap<BoneId, (Vec3, Quat)> = SecondaryMap::with_capacity(map.len());

    for pair in map.iter() {
        let donor_world = pose.world(pair.donor).ok_or_else(|| TransmuteError::MissingPoseBone {
            clip: clip.name.clone(),
            bone: donor.name_of(pair.donor).to_string(),
        })?;
        let donor_rest = rest.donor.get(pair.donor).copied().unwrap_or_default();
        let target_rest = rest.target_world(pair.target);

        let delta = rotation_delta(donor_world.rotation, donor_rest.rotation);
        let rotation = target_rest.rotation * delta;
        let position = donor_world.translation + rest.root_offset;
        overrides.insert(pair.target, (position, rotation));
    }

    Ok(transform_system::propagate(
        target.bones(),
        target.root(),
        GlobalTransform::IDENTITY,
        |id, bone, parent| match overrides.get(id) {
            Some(&(position, rotation)) => GlobalTransform::new(position, rotation, parent.scale * bone.transform.scale),
            None => {
                let t = &bone.transform;
                parent.child(t.position, t.rotation, t.scale)
            }
        },
    ))
}

/// Records raw position/rotation curves for every map entry over one clip.
///
/// Samples `floor(duration · frame_rate) + 1` frames through `session`.
/// Frame 0 is compared against the rest pose with `position_accuracy` (plus
/// noise slack). Later frames key any position that moved by more than
/// float round-off, so slow drift is never lost; thinning is left to the
/// reducer. Rotation changes use exact component inequality.
pub fn record<S: PoseSampler + ?Sized>(
    session: &mut SamplingSession<'_, S>,
    clip: &AnimationClip,
    map: &BoneMap,
    donor: &Skeleton,
    target: &Skeleton,
    rest: &RestPoses,
    settings: &RetargetSettings,
) -> Result<RetargetContext> {
    let frames = clip.frame_count()?;
    log::debug!("Recording {}: {frames} frames at {} fps", clip.name, clip.frame_rate);

    let mut context = begin_context(clip, frames, map, target, rest);

    for i in 0..frames {
        let pose = session.sample(donor, clip, clip.frame_time(i))?;
        let worlds = retargeted_pose(clip, map, donor, target, rest, &pose)?;

        for track in context.tracks_mut() {
            let (position, rotation) = local_in(target, &worlds, track.target);

            let moved = if i == 0 {
                exceeds_tolerance(track.position.previous, position, settings.position_accuracy)
            } else {
                position_changed(track.position.previous, position)
            };
            track.record_position(i, clip.frame_rate, position, moved);

            let turned = track.rotation.previous != rotation;
            track.record_rotation(i, clip.frame_rate, rotation, turned);
        }
    }

    Ok(context)
}
