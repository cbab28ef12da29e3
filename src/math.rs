//! Vector and quaternion helpers shared by the resolver, recorder and reducer.

use glam::{EulerRot, Quat, Vec3};

/// Slack added to every squared-distance comparison to absorb float noise.
pub const NOISE_EPSILON: f32 = 0.0001;

/// Squared distance under which two consecutive samples hold the same value.
pub const CHANGE_EPSILON: f32 = 1e-10;

/// World-space transform of a bone (translation, rotation, lossy scale).
///
/// Composition follows the usual scene-graph rule: a child's world transform
/// is its parent's world transform applied to the child's local TRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl GlobalTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// World transform of a child whose local TRS is given relative to `self`.
    #[inline]
    #[must_use]
    pub fn child(&self, position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation: self.translation + self.rotation * (self.scale * position),
            rotation: self.rotation * rotation,
            scale: self.scale * scale,
        }
    }

    /// Inverse of [`child`](Self::child) for position and rotation: the local
    /// values a child needs to land on the given world position/rotation.
    #[inline]
    #[must_use]
    pub fn local_of(&self, world_position: Vec3, world_rotation: Quat) -> (Vec3, Quat) {
        let inv_rotation = self.rotation.inverse();
        let unscaled = inv_rotation * (world_position - self.translation);
        (unscaled * safe_recip(self.scale), inv_rotation * world_rotation)
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Component-wise reciprocal that maps zero scale to zero instead of infinity.
#[inline]
fn safe_recip(v: Vec3) -> Vec3 {
    let recip = |c: f32| if c == 0.0 { 0.0 } else { c.recip() };
    Vec3::new(recip(v.x), recip(v.y), recip(v.z))
}

/// `true` when `a` and `b` are further apart than `tolerance` (plus noise slack).
#[inline]
#[must_use]
pub fn exceeds_tolerance(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    a.distance_squared(b) > tolerance * tolerance + NOISE_EPSILON
}

/// `true` when `b` moved away from `a` by more than float round-off.
#[inline]
#[must_use]
pub fn position_changed(a: Vec3, b: Vec3) -> bool {
    a.distance_squared(b) > CHANGE_EPSILON
}

/// Euler angles in degrees, composed in Y-X-Z order, returned as (x, y, z).
#[must_use]
pub fn euler_degrees(q: Quat) -> Vec3 {
    let (y, x, z) = q.to_euler(EulerRot::YXZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

/// Squared difference between the Euler-degree representations of two rotations.
#[inline]
#[must_use]
pub fn angular_deviation_sq(a: Quat, b: Quat) -> f32 {
    (euler_degrees(a) - euler_degrees(b)).length_squared()
}

/// Rotation that takes `rest` onto `current` in world space
/// (`current * rest⁻¹`). Exactly identity when the two are equal.
#[inline]
#[must_use]
pub fn rotation_delta(current: Quat, rest: Quat) -> Quat {
    if current == rest {
        Quat::IDENTITY
    } else {
        current * rest.inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn vec3_approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn child_then_local_of_round_trips() {
        let parent = GlobalTransform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(FRAC_PI_2),
            Vec3::splat(2.0),
        );
        let local_pos = Vec3::new(0.5, -1.0, 0.25);
        let local_rot = Quat::from_rotation_x(0.3);

        let world = parent.child(local_pos, local_rot, Vec3::ONE);
        let (pos, rot) = parent.local_of(world.translation, world.rotation);

        assert!(vec3_approx(pos, local_pos));
        assert!(rot.abs_diff_eq(local_rot, 1e-5));
    }

    #[test]
    fn local_of_tolerates_zero_scale() {
        let parent = GlobalTransform::new(Vec3::ZERO, Quat::IDENTITY, Vec3::new(0.0, 1.0, 1.0));
        let (pos, _) = parent.local_of(Vec3::new(4.0, 2.0, 1.0), Quat::IDENTITY);
        assert!(pos.is_finite());
        assert_eq!(pos.x, 0.0);
    }

    #[test]
    fn tolerance_includes_noise_slack() {
        assert!(!exceeds_tolerance(Vec3::ZERO, Vec3::new(0.005, 0.0, 0.0), 0.0));
        assert!(exceeds_tolerance(Vec3::ZERO, Vec3::new(0.02, 0.0, 0.0), 0.0));
        assert!(!exceeds_tolerance(Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), 1.0));
    }

    #[test]
    fn small_steps_count_as_changes() {
        assert!(position_changed(Vec3::ZERO, Vec3::new(0.0, 0.005, 0.0)));
        assert!(position_changed(Vec3::ZERO, Vec3::new(0.0, 0.0, 1e-4)));
        assert!(!position_changed(Vec3::ONE, Vec3::ONE + Vec3::splat(1e-7)));
    }

    #[test]
    fn rotation_delta_is_exact_identity_for_rest() {
        let q = Quat::from_rotation_z(0.7);
        assert_eq!(rotation_delta(q, q), Quat::IDENTITY);

        let turned = Quat::from_rotation_z(0.9);
        let delta = rotation_delta(turned, q);
        assert!((delta * q).abs_diff_eq(turned, 1e-5));
    }

    #[test]
    fn euler_degrees_of_quarter_turn() {
        let e = euler_degrees(Quat::from_rotation_y(FRAC_PI_2));
        assert!(vec3_approx(e, Vec3::new(0.0, 90.0, 0.0)));
    }

    #[test]
    fn identical_rotations_have_no_deviation() {
        let q = Quat::from_rotation_x(0.4);
        assert!(angular_deviation_sq(q, q.slerp(q, 0.5)) < 1e-6);
    }
}
