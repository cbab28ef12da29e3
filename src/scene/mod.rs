//! Skeleton hierarchy module
//!
//! Bone hierarchies stored as arenas with stable integer-like ids:
//! - Bone: joint with a name, local transform and ordered children
//! - Transform: local TRS component
//! - Skeleton: arena owner, paths and descendant queries
//! - transform_system: world-transform derivation

pub mod bone;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use bone::Bone;
pub use skeleton::Skeleton;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle of a bone inside its [`Skeleton`].
    pub struct BoneId;
}
