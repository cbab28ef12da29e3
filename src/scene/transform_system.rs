//! Transform System
//!
//! Derives world transforms from local bone transforms. Decoupled from
//! [`Skeleton`](crate::scene::Skeleton) so that callers only borrow the bone
//! arena they need.
//!
//! Two flavours are provided:
//! - [`update_hierarchy`] writes the rest-pose world transform into every bone.
//! - [`propagate`] computes a world pose into a side table without touching
//!   the bones, letting the caller substitute any bone's world transform.
//!   This is how sampled and retargeted poses are evaluated: the skeleton
//!   itself is never mutated, so nothing has to be reverted between frames.

use slotmap::{SecondaryMap, SlotMap};

use crate::math::GlobalTransform;
use crate::scene::BoneId;
use crate::scene::bone::Bone;

/// Walks the hierarchy below `root` parent-first and asks `resolve` for each
/// bone's world transform given its parent's world transform.
///
/// Uses an explicit stack so deep rigs cannot overflow the call stack.
/// Children are visited in enumeration order.
pub fn propagate<F>(
    bones: &SlotMap<BoneId, Bone>,
    root: BoneId,
    parent_world: GlobalTransform,
    mut resolve: F,
) -> SecondaryMap<BoneId, GlobalTransform>
where
    F: FnMut(BoneId, &Bone, &GlobalTransform) -> GlobalTransform,
{
    let mut out = SecondaryMap::with_capacity(bones.len());
    let mut stack: Vec<(BoneId, GlobalTransform)> = Vec::with_capacity(64);
    stack.push((root, parent_world));

    while let Some((bone_id, parent)) = stack.pop() {
        let Some(bone) = bones.get(bone_id) else {
            continue;
        };

        let world = resolve(bone_id, bone, &parent);
        out.insert(bone_id, world);

        // Reverse push keeps enumeration order on pop
        for &child in bone.children.iter().rev() {
            stack.push((child, world));
        }
    }

    out
}

/// Rest-pose world transform of every bone below `root`, from local transforms.
#[must_use]
pub fn rest_pose(bones: &SlotMap<BoneId, Bone>, root: BoneId) -> SecondaryMap<BoneId, GlobalTransform> {
    propagate(bones, root, GlobalTransform::IDENTITY, |_, bone, parent| {
        let t = &bone.transform;
        parent.child(t.position, t.rotation, t.scale)
    })
}

/// Refreshes the cached world transform of every bone below `root`.
pub fn update_hierarchy(bones: &mut SlotMap<BoneId, Bone>, root: BoneId) {
    let worlds = rest_pose(bones, root);
    for (bone_id, world) in worlds {
        if let Some(bone) = bones.get_mut(bone_id) {
            bone.world = world;
        }
    }
}
