//! Pose Sampling
//!
//! The retargeting pipeline never evaluates clips on its own. It asks a
//! [`PoseSampler`] for the donor skeleton's world pose at each frame time.
//! A host with its own animation runtime implements the trait around that
//! runtime; [`ClipSampler`] is the built-in implementation that evaluates an
//! [`AnimationClip`]'s local-transform curves directly.
//!
//! # Sampling sessions
//!
//! Some hosts must enter a dedicated mode before sampling and leave it
//! afterwards. [`PoseSampler::begin`] and [`PoseSampler::end`] model that
//! mode, and [`SamplingSession`] guarantees `end` runs on every exit path,
//! including early returns through `?`.

use glam::Quat;
use rustc_hash::FxHashMap;
use slotmap::SecondaryMap;

use crate::animation::binding::{CurveBinding, TransformProperty};
use crate::animation::clip::AnimationClip;
use crate::animation::curve::KeyframeCursor;
use crate::errors::Result;
use crate::math::GlobalTransform;
use crate::scene::transform::Transform;
use crate::scene::{BoneId, Skeleton, transform_system};

/// World transforms of a skeleton's bones at one instant.
#[derive(Debug, Clone, Default)]
pub struct Pose {
    worlds: SecondaryMap<BoneId, GlobalTransform>,
}

impl Pose {
    #[inline]
    #[must_use]
    pub fn world(&self, bone: BoneId) -> Option<&GlobalTransform> {
        self.worlds.get(bone)
    }

    pub fn insert(&mut self, bone: BoneId, world: GlobalTransform) {
        self.worlds.insert(bone, world);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }
}

impl From<SecondaryMap<BoneId, GlobalTransform>> for Pose {
    fn from(worlds: SecondaryMap<BoneId, GlobalTransform>) -> Self {
        Self { worlds }
    }
}

/// Capability that evaluates a clip on a skeleton.
///
/// `sample` must not depend on previous calls for correctness: the recorder
/// treats every call as an independent snapshot of the clip at `time`.
pub trait PoseSampler {
    /// Enters sampling mode. Called once before the first sample of a batch.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    /// World transform of every bone of `skeleton` with `clip` applied at `time` seconds.
    fn sample(&mut self, skeleton: &Skeleton, clip: &AnimationClip, time: f32) -> Result<Pose>;

    /// Leaves sampling mode. Called exactly once per successful `begin`.
    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// RAII scope for a sampler's sampling mode.
pub struct SamplingSession<'a, S: PoseSampler + ?Sized> {
    sampler: &'a mut S,
    active: bool,
}

impl<'a, S: PoseSampler + ?Sized> SamplingSession<'a, S> {
    /// Calls `begin` on the sampler; `end` follows when the session is
    /// finished or dropped.
    pub fn begin(sampler: &'a mut S) -> Result<Self> {
        sampler.begin()?;
        Ok(Self {
            sampler,
            active: true,
        })
    }

    #[inline]
    pub fn sample(&mut self, skeleton: &Skeleton, clip: &AnimationClip, time: f32) -> Result<Pose> {
        self.sampler.sample(skeleton, clip, time)
    }

    /// Ends the session, reporting a failure to leave sampling mode.
    pub fn finish(mut self) -> Result<()> {
        self.active = false;
        self.sampler.end()
    }
}

impl<S: PoseSampler + ?Sized> Drop for SamplingSession<'_, S> {
    fn drop(&mut self) {
        if self.active
            && let Err(e) = self.sampler.end()
        {
            log::warn!("Failed to leave sampling mode: {e}");
        }
    }
}

/// Bone paths of the last sampled skeleton.
#[derive(Debug)]
struct PathCache {
    skeleton: String,
    root: BoneId,
    bones: usize,
    paths: SecondaryMap<BoneId, String>,
}

impl PathCache {
    fn build(skeleton: &Skeleton) -> Self {
        Self {
            skeleton: skeleton.name.clone(),
            root: skeleton.root(),
            bones: skeleton.len(),
            paths: skeleton.paths(),
        }
    }

    fn matches(&self, skeleton: &Skeleton) -> bool {
        self.root == skeleton.root() && self.bones == skeleton.len() && self.skeleton == skeleton.name
    }
}

/// Evaluates a clip's local position/rotation/scale curves on a skeleton.
///
/// Bones are looked up by path; properties without a curve keep the bone's
/// rest value. The skeleton is never mutated. Paths are built once and reused
/// until the next [`begin`](PoseSampler::begin) or until a different skeleton
/// is sampled.
#[derive(Debug, Default)]
pub struct ClipSampler {
    cursors: FxHashMap<CurveBinding, KeyframeCursor>,
    paths: Option<PathCache>,
}

impl ClipSampler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&mut self, clip: &AnimationClip, path: &str, property: TransformProperty, time: f32) -> Option<f32> {
        let binding = CurveBinding::new(path, property);
        let curve = clip.curve(&binding)?;
        let cursor = self.cursors.entry(binding).or_default();
        curve.evaluate_with_cursor(time, cursor)
    }

    fn sample_local(&mut self, clip: &AnimationClip, path: &str, rest: &Transform, time: f32) -> Transform {
        let mut position = rest.position;
        for (axis, property) in TransformProperty::POSITION.into_iter().enumerate() {
            if let Some(v) = self.channel(clip, path, property, time) {
                position[axis] = v;
            }
        }

        let mut rotation = rest.rotation;
        let mut rotation_animated = false;
        let mut components = rest.rotation.to_array();
        for (i, property) in TransformProperty::ROTATION.into_iter().enumerate() {
            if let Some(v) = self.channel(clip, path, property, time) {
                components[i] = v;
                rotation_animated = true;
            }
        }
        if rotation_animated {
            let q = Quat::from_array(components);
            if q.length_squared() > 0.0 {
                rotation = q.normalize();
            }
        }

        let mut scale = rest.scale;
        for (axis, property) in TransformProperty::SCALE.into_iter().enumerate() {
            if let Some(v) = self.channel(clip, path, property, time) {
                scale[axis] = v;
            }
        }

        Transform {
            position,
            rotation,
            scale,
        }
    }
}

impl PoseSampler for ClipSampler {
    fn begin(&mut self) -> Result<()> {
        self.cursors.clear();
        self.paths = None;
        Ok(())
    }

    fn sample(&mut self, skeleton: &Skeleton, clip: &AnimationClip, time: f32) -> Result<Pose> {
        let cache = match self.paths.take() {
            Some(cache) if cache.matches(skeleton) => cache,
            _ => PathCache::build(skeleton),
        };
        let mut locals: SecondaryMap<BoneId, Transform> = SecondaryMap::with_capacity(skeleton.len());
        for (id, path) in &cache.paths {
            let rest = &skeleton.bones()[id].transform;
            locals.insert(id, self.sample_local(clip, path, rest, time));
        }
        self.paths = Some(cache);

        let worlds = transform_system::propagate(
            skeleton.bones(),
            skeleton.root(),
            GlobalTransform::IDENTITY,
            |id, bone, parent| {
                let t = locals.get(id).unwrap_or(&bone.transform);
                parent.child(t.position, t.rotation, t.scale)
            },
        );
        Ok(Pose::from(worlds))
    }
}
