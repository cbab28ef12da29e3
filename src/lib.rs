#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Skeletal animation retargeting.
//!
//! Converts animation clips authored for one bone hierarchy (the donor) so
//! they drive a structurally different hierarchy (the target). Bones are
//! paired by name first and by rest position second, every clip is
//! re-sampled into new local curves for the target, and redundant keys are
//! reduced away.

pub mod animation;
pub mod errors;
pub mod math;
pub mod retarget;
pub mod scene;
pub mod settings;

pub use animation::{AnimationClip, ClipSampler, Curve, CurveBinding, Keyframe, Pose, PoseSampler, TransformProperty};
pub use errors::{Result, TransmuteError};
pub use math::GlobalTransform;
pub use retarget::{BatchReport, BoneMap, ClipReport, MatchKind, MismatchedBone, Retargeter, resolve, resolve_skeletons, retarget_clips};
pub use scene::{Bone, BoneId, Skeleton, Transform};
pub use settings::RetargetSettings;
