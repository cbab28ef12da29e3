use slotmap::SecondaryMap;

use crate::animation::clip::AnimationClip;
use crate::animation::sampler::{PoseSampler, SamplingSession};
use crate::errors::{Result, TransmuteError};
use crate::retarget::context::RetargetContext;
use crate::retarget::recorder::{self, RestPoses};
use crate::retarget::reducer::{reduce_position_curve, reduce_rotation_curves};
use crate::retarget::resolver::{BoneMap, resolve_skeletons};
use crate::retarget::writer::{BonePaths, write_clip};
use crate::scene::{BoneId, Skeleton};
use crate::settings::RetargetSettings;

/// Outcome of retargeting one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipReport {
    pub clip: String,
    /// Frames sampled.
    pub frames: usize,
    /// Map entries that received position keys.
    pub position_bones: usize,
    /// Map entries that received rotation keys.
    pub rotation_bones: usize,
    pub keys_before_reduction: usize,
    pub keys_after_reduction: usize,
}

impl ClipReport {
    /// Channel groups written (position bones + rotation bones).
    #[must_use]
    pub fn curve_groups(&self) -> usize {
        self.position_bones + self.rotation_bones
    }
}

/// Reports of every clip in a completed batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub clips: Vec<ClipReport>,
}

impl BatchReport {
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Reduces every written channel group of a recorded context.
pub fn reduce_context(context: &mut RetargetContext, settings: &RetargetSettings) {
    for track in context.tracks_mut() {
        if track.position.was_written() {
            for curve in &mut track.curves.position {
                reduce_position_curve(curve, settings.position_accuracy);
            }
        }
        if track.rotation.was_written() {
            reduce_rotation_curves(&mut track.curves.rotation, settings.rotation_accuracy);
        }
    }
}

/// Retargets clips from a donor skeleton onto a target skeleton through a
/// fixed [`BoneMap`].
///
/// Built once per skeleton pair and reused for any number of clips. Rest
/// poses and bone paths are captured at construction; neither skeleton is
/// modified.
///
/// # Example
///
/// ```rust,ignore
/// let retargeter = Retargeter::from_anchors(&donor, donor_hips, &target, target_hips, settings)?;
/// for m in retargeter.map().mismatches(&donor, &target) {
///     println!("{m}");
/// }
/// let report = retargeter.retarget_clips(&mut clips, &mut ClipSampler::new())?;
/// ```
#[derive(Debug, Clone)]
pub struct Retargeter<'a> {
    donor: &'a Skeleton,
    target: &'a Skeleton,
    map: BoneMap,
    settings: RetargetSettings,
    rest: RestPoses,
    paths: BonePaths,
}

impl<'a> Retargeter<'a> {
    /// Checks the map against both skeletons and captures their rest state.
    pub fn new(donor: &'a Skeleton, target: &'a Skeleton, map: BoneMap, settings: RetargetSettings) -> Result<Self> {
        let settings = settings.sanitized()?;
        let (donor_anchor, target_anchor) = map.anchors().ok_or(TransmuteError::EmptyBoneMap)?;
        donor.validate_anchor(donor_anchor)?;
        target.validate_anchor(target_anchor)?;

        // Every entry must point into its own skeleton
        for pair in map.iter() {
            donor.get(pair.donor)?;
            target.get(pair.target)?;
        }

        Ok(Self {
            donor,
            target,
            rest: RestPoses::new(donor, target),
            paths: BonePaths {
                donor: donor.paths(),
                target: target.paths(),
            },
            map,
            settings,
        })
    }

    /// Resolves the bone map from an anchor pair, then behaves like [`new`](Self::new).
    pub fn from_anchors(
        donor: &'a Skeleton,
        donor_anchor: BoneId,
        target: &'a Skeleton,
        target_anchor: BoneId,
        settings: RetargetSettings,
    ) -> Result<Self> {
        let map = resolve_skeletons(donor, donor_anchor, target, target_anchor)?;
        Self::new(donor, target, map, settings)
    }

    #[inline]
    #[must_use]
    pub fn map(&self) -> &BoneMap {
        &self.map
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RetargetSettings {
        &self.settings
    }

    /// Donor bone paths keyed by id, relative to the donor root.
    #[must_use]
    pub fn donor_paths(&self) -> &SecondaryMap<BoneId, String> {
        &self.paths.donor
    }

    /// Target bone paths keyed by id, relative to the target root.
    #[must_use]
    pub fn target_paths(&self) -> &SecondaryMap<BoneId, String> {
        &self.paths.target
    }

    /// Records and reduces one clip without touching it.
    pub fn record<S: PoseSampler + ?Sized>(
        &self,
        session: &mut SamplingSession<'_, S>,
        clip: &AnimationClip,
    ) -> Result<RetargetContext> {
        let mut context = recorder::record(session, clip, &self.map, self.donor, self.target, &self.rest, &self.settings)?;
        reduce_context(&mut context, &self.settings);
        Ok(context)
    }

    /// Retargets one clip inside an open sampling session.
    ///
    /// The clip is only modified once recording succeeded.
    pub fn retarget_clip<S: PoseSampler + ?Sized>(
        &self,
        session: &mut SamplingSession<'_, S>,
        clip: &mut AnimationClip,
    ) -> Result<ClipReport> {
        let mut context = recorder::record(session, clip, &self.map, self.donor, self.target, &self.rest, &self.settings)?;
        let keys_before_reduction = context.key_count();
        reduce_context(&mut context, &self.settings);

        let report = ClipReport {
            clip: clip.name.clone(),
            frames: context.frames,
            position_bones: context.position_bones(),
            rotation_bones: context.rotation_bones(),
            keys_before_reduction,
            keys_after_reduction: context.key_count(),
        };

        write_clip(clip, context, &self.paths);
        Ok(report)
    }

    /// Retargets every clip in order, in place.
    ///
    /// The sampler's session is opened once for the whole batch and closed
    /// on every exit path. On failure the batch stops: earlier clips keep
    /// their new curves, the failing clip and later ones are untouched.
    pub fn retarget_clips<S: PoseSampler + ?Sized>(
        &self,
        clips: &mut [AnimationClip],
        sampler: &mut S,
    ) -> Result<BatchReport> {
        let mut session = SamplingSession::begin(sampler)?;
        let mut report = BatchReport::default();

        for (index, clip) in clips.iter_mut().enumerate() {
            log::info!("Processing clip: {}", clip.name);
            let clip_report = self
                .retarget_clip(&mut session, clip)
                .map_err(|source| TransmuteError::ClipFailed {
                    clip: clip.name.clone(),
                    index,
                    source: Box::new(source),
                })?;
            log::info!("Processed {} with {} curves", clip.name, clip_report.curve_groups());
            report.clips.push(clip_report);
        }

        session.finish()?;
        log::info!("Processed {} clips", report.len());
        Ok(report)
    }
}

/// One-shot batch entry point: validates inputs, then retargets `clips` in
/// place through `map`.
pub fn retarget_clips<S: PoseSampler + ?Sized>(
    clips: &mut [AnimationClip],
    map: &BoneMap,
    donor: &Skeleton,
    target: &Skeleton,
    sampler: &mut S,
    settings: RetargetSettings,
) -> Result<BatchReport> {
    Retargeter::new(donor, target, map.clone(), settings)?.retarget_clips(clips, sampler)
}
