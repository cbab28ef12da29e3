//! Per-clip recording state.
//!
//! A [`RetargetContext`] is created when a clip starts processing and dropped
//! once its curves are written back. It holds one [`BoneTrack`] per bone-map
//! entry, in map order.

use glam::{Quat, Vec3};

use crate::animation::curve::{Curve, Keyframe};
use crate::scene::BoneId;

/// Change-tracking for one channel group (position or rotation) of a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelState<T> {
    /// Value the group held at the last processed frame.
    pub previous: T,
    /// Frame index of the last key appended to the group.
    pub last_written_frame: Option<usize>,
}

impl<T: Copy> ChannelState<T> {
    /// Starts tracking from a baseline (the bone's rest local value).
    #[must_use]
    pub fn new(baseline: T) -> Self {
        Self {
            previous: baseline,
            last_written_frame: None,
        }
    }

    /// Whether frame `index` needs a boundary key at `index - 1` before it.
    ///
    /// True when the group was not written on the immediately preceding
    /// frame, so the held value must be pinned before the change.
    #[inline]
    #[must_use]
    pub fn needs_boundary(&self, index: usize) -> bool {
        index > 0 && self.last_written_frame != Some(index - 1)
    }

    #[inline]
    #[must_use]
    pub fn was_written(&self) -> bool {
        self.last_written_frame.is_some()
    }
}

/// Raw curves of one target bone: three position and four rotation channels.
#[derive(Debug, Clone, Default)]
pub struct BoneCurves {
    pub position: [Curve; 3],
    pub rotation: [Curve; 4],
}

impl BoneCurves {
    pub fn push_position(&mut self, time: f32, value: Vec3) {
        for (curve, v) in self.position.iter_mut().zip(value.to_array()) {
            curve.add_key(Keyframe::new(time, v));
        }
    }

    pub fn push_rotation(&mut self, time: f32, value: Quat) {
        for (curve, v) in self.rotation.iter_mut().zip(value.to_array()) {
            curve.add_key(Keyframe::new(time, v));
        }
    }

    /// Total keys across all seven channels.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.position.iter().chain(&self.rotation).map(Curve::len).sum()
    }
}

/// Recording state of one bone-map entry.
#[derive(Debug, Clone)]
pub struct BoneTrack {
    pub donor: BoneId,
    pub target: BoneId,
    pub position: ChannelState<Vec3>,
    pub rotation: ChannelState<Quat>,
    pub curves: BoneCurves,
}

impl BoneTrack {
    #[must_use]
    pub fn new(donor: BoneId, target: BoneId, rest_position: Vec3, rest_rotation: Quat) -> Self {
        Self {
            donor,
            target,
            position: ChannelState::new(rest_position),
            rotation: ChannelState::new(rest_rotation),
            curves: BoneCurves::default(),
        }
    }

    /// Records a position sample for frame `index`, appending keys only when
    /// `changed` is set.
    pub fn record_position(&mut self, index: usize, frame_rate: f32, value: Vec3, changed: bool) {
        if changed {
            if self.position.needs_boundary(index) {
                let time = (index - 1) as f32 / frame_rate;
                self.curves.push_position(time, self.position.previous);
            }
            self.curves.push_position(index as f32 / frame_rate, value);
            self.position.last_written_frame = Some(index);
        }
        self.position.previous = value;
    }

    /// Rotation counterpart of [`record_position`](Self::record_position).
    pub fn record_rotation(&mut self, index: usize, frame_rate: f32, value: Quat, changed: bool) {
        if changed {
            if self.rotation.needs_boundary(index) {
                let time = (index - 1) as f32 / frame_rate;
                self.curves.push_rotation(time, self.rotation.previous);
            }
            self.curves.push_rotation(index as f32 / frame_rate, value);
            self.rotation.last_written_frame = Some(index);
        }
        self.rotation.previous = value;
    }
}

/// Transient state for retargeting one clip.
#[derive(Debug, Clone)]
pub struct RetargetContext {
    pub clip: String,
    pub frame_rate: f32,
    pub frames: usize,
    tracks: Vec<BoneTrack>,
}

impl RetargetContext {
    #[must_use]
    pub fn new(clip: &str, frame_rate: f32, frames: usize, tracks: Vec<BoneTrack>) -> Self {
        Self {
            clip: clip.to_string(),
            frame_rate,
            frames,
            tracks,
        }
    }

    /// Number of tracks; matches the bone map it was built from.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut [BoneTrack] {
        &mut self.tracks
    }

    #[must_use]
    pub fn into_tracks(self) -> Vec<BoneTrack> {
        self.tracks
    }

    /// Track of a donor bone.
    #[must_use]
    pub fn track(&self, donor: BoneId) -> Option<&BoneTrack> {
        self.tracks.iter().find(|t| t.donor == donor)
    }

    /// Number of tracks with at least one position key.
    #[must_use]
    pub fn position_bones(&self) -> usize {
        self.tracks.iter().filter(|t| t.position.was_written()).count()
    }

    /// Number of tracks with at least one rotation key.
    #[must_use]
    pub fn rotation_bones(&self) -> usize {
        self.tracks.iter().filter(|t| t.rotation.was_written()).count()
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.tracks.iter().map(|t| t.curves.key_count()).sum()
    }
}
