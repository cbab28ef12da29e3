//! Retargeting pipeline
//!
//! Moves animation from a donor skeleton onto a target skeleton:
//! - resolver: donor → target bone correspondence ([`BoneMap`])
//! - recorder: frame-by-frame sampling into raw curves
//! - reducer: keyframe reduction with linear tangents
//! - writer: applies curves to the clip and clears stale ones
//! - batch: [`Retargeter`] tying the stages together over a clip list

pub mod batch;
pub mod context;
pub mod recorder;
pub mod reducer;
pub mod resolver;
pub mod writer;

pub use batch::{BatchReport, ClipReport, Retargeter, reduce_context, retarget_clips};
pub use context::{BoneCurves, BoneTrack, ChannelState, RetargetContext};
pub use recorder::{RestPoses, record};
pub use reducer::{reduce_position_curve, reduce_rotation_curves};
pub use resolver::{BoneMap, BonePair, MatchKind, MismatchedBone, resolve, resolve_skeletons};
pub use writer::{BonePaths, write_clip};
