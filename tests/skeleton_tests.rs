//! Skeleton & Transform Tests
//!
//! Tests for:
//! - Bone arena construction and cached world transforms
//! - Bone paths and path lookup
//! - Descendant checks and anchor validation
//! - Local-from-world conversion round trips
//! - Default clip sampling on a hierarchy

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use rig_transmute::animation::{Curve, CurveBinding, PoseSampler, TransformProperty};
use rig_transmute::{AnimationClip, BoneId, ClipSampler, GlobalTransform, Skeleton, Transform, TransmuteError};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Hierarchy Helpers
// ============================================================================

/// Builds Root → Arm → Forearm → Hand, each offset by one unit along X,
/// with the arm turned a quarter turn about Y.
fn arm() -> (Skeleton, [BoneId; 3]) {
    let mut skeleton = Skeleton::new("rig", "Root", Transform::from_position(Vec3::new(0.0, 0.0, 2.0)));
    let arm = skeleton
        .add_bone(
            skeleton.root(),
            "Arm",
            Transform::from_position_rotation(Vec3::X, Quat::from_rotation_y(FRAC_PI_2)),
        )
        .unwrap();
    let forearm = skeleton.add_bone(arm, "Forearm", Transform::from_position(Vec3::X)).unwrap();
    let hand = skeleton.add_bone(forearm, "Hand", Transform::from_position(Vec3::X)).unwrap();
    (skeleton, [arm, forearm, hand])
}

// ============================================================================
// World Transforms
// ============================================================================

#[test]
fn cached_world_follows_hierarchy() {
    let (skeleton, [arm, forearm, hand]) = arm();

    assert!(vec3_approx(skeleton.bones()[arm].world().translation, Vec3::new(1.0, 0.0, 2.0)));
    // Quarter turn about Y maps +X to -Z
    assert!(vec3_approx(skeleton.bones()[forearm].world().translation, Vec3::new(1.0, 0.0, 1.0)));
    assert!(vec3_approx(skeleton.bones()[hand].world().translation, Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn rest_pose_matches_cache_after_edit() {
    let (mut skeleton, [arm, _, hand]) = arm();
    skeleton.bone_mut(arm).unwrap().transform.position = Vec3::new(3.0, 0.0, 0.0);

    let rest = skeleton.rest_pose();
    assert!(vec3_approx(rest[hand].translation, Vec3::new(3.0, 0.0, 0.0)));

    skeleton.update_world_transforms();
    assert!(vec3_approx(skeleton.bones()[hand].world().translation, rest[hand].translation));
}

#[test]
fn local_of_inverts_child() {
    let (skeleton, [arm, forearm, _]) = arm();
    let parent = *skeleton.bones()[arm].world();
    let child = skeleton.bones()[forearm].world();

    let (position, rotation) = parent.local_of(child.translation, child.rotation);
    assert!(vec3_approx(position, Vec3::X));
    assert!(rotation.abs_diff_eq(Quat::IDENTITY, EPSILON));

    let root = GlobalTransform::IDENTITY;
    let (position, _) = root.local_of(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
    assert_eq!(position, Vec3::new(1.0, 2.0, 3.0));
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn paths_are_relative_to_root() {
    let (skeleton, [arm, _, hand]) = arm();

    assert_eq!(skeleton.path_of(skeleton.root()).as_deref(), Some(""));
    assert_eq!(skeleton.path_of(arm).as_deref(), Some("Arm"));
    assert_eq!(skeleton.path_of(hand).as_deref(), Some("Arm/Forearm/Hand"));

    let paths = skeleton.paths();
    assert_eq!(paths[hand], "Arm/Forearm/Hand");
    assert_eq!(skeleton.find_by_path("Arm/Forearm/Hand"), Some(hand));
    assert_eq!(skeleton.find_by_path("Arm/Hand"), None);
    assert_eq!(skeleton.find_by_path(""), Some(skeleton.root()));
}

#[test]
fn find_by_name_searches_depth_first() {
    let (skeleton, [_, forearm, _]) = arm();
    assert_eq!(skeleton.find_by_name("Forearm"), Some(forearm));
    assert_eq!(skeleton.find_by_name("Tail"), None);
}

// ============================================================================
// Descendants and Anchors
// ============================================================================

#[test]
fn descendant_checks() {
    let (skeleton, [arm, forearm, hand]) = arm();

    assert!(skeleton.contains_descendant(arm, hand));
    assert!(skeleton.contains_descendant(arm, arm));
    assert!(!skeleton.contains_descendant(hand, forearm));
    assert_eq!(skeleton.depth_first(arm), vec![arm, forearm, hand]);
}

#[test]
fn anchor_from_other_skeleton_is_rejected() {
    let (mut skeleton, _) = arm();
    let err = skeleton.validate_anchor(BoneId::default()).unwrap_err();
    assert!(matches!(err, TransmuteError::AnchorOutsideSkeleton { .. }));
    assert!(skeleton.add_bone(BoneId::default(), "Orphan", Transform::new()).is_err());
}

// ============================================================================
// Clip Sampling
// ============================================================================

#[test]
fn sampler_animates_by_path_without_mutating() {
    let (skeleton, [arm, _, hand]) = arm();

    let mut clip = AnimationClip::new("wave", 1.0, 30.0);
    // Undo the arm's quarter turn over the clip
    let turned = Quat::from_rotation_y(FRAC_PI_2);
    for (channel, property) in TransformProperty::ROTATION.into_iter().enumerate() {
        clip.set_curve(
            CurveBinding::new("Arm", property),
            Curve::from_points(&[(0.0, turned.to_array()[channel]), (1.0, Quat::IDENTITY.to_array()[channel])]),
        );
    }

    let mut sampler = ClipSampler::new();
    let start = sampler.sample(&skeleton, &clip, 0.0).unwrap();
    let end = sampler.sample(&skeleton, &clip, 1.0).unwrap();

    assert!(vec3_approx(start.world(hand).unwrap().translation, Vec3::new(1.0, 0.0, 0.0)));
    assert!(vec3_approx(end.world(hand).unwrap().translation, Vec3::new(3.0, 0.0, 2.0)));
    assert!(vec3_approx(end.world(arm).unwrap().translation, Vec3::new(1.0, 0.0, 2.0)));

    // Rest state is untouched
    assert!(vec3_approx(skeleton.bones()[hand].world().translation, Vec3::new(1.0, 0.0, 0.0)));
}
