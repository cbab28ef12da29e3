pub mod binding;
pub mod clip;
pub mod curve;
pub mod sampler;

pub use binding::{CurveBinding, TransformProperty};
pub use clip::AnimationClip;
pub use curve::{Curve, Keyframe, KeyframeCursor};
pub use sampler::{ClipSampler, Pose, PoseSampler, SamplingSession};
