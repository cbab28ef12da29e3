//! Curve Reducer
//!
//! Removes keys that interpolation between their neighbours already
//! reproduces within tolerance, and straightens the surviving segment with
//! linear tangents.
//!
//! Both reducers slide a three-key window `(a, b, c)` over the curve and ask
//! whether `b` lies on the interpolation from `a` to `c` at `b`'s time. For
//! evenly spaced keys this is the second difference `(c − b) − (b − a)` for
//! positions and the slerp midpoint of `a` and `c` for rotations. When `b` is
//! redundant it is removed and the window steps back one key, because
//! removing `b` changes the right neighbour of `a`. On return every remaining
//! triple has been tested against its final neighbours, so running a reducer
//! again removes nothing.
//!
//! Rotation channels are reduced as a group: a key is removed from all four
//! quaternion channels at once so they keep identical key times.

use glam::Quat;

use crate::animation::curve::{Curve, Keyframe};
use crate::math::{NOISE_EPSILON, angular_deviation_sq};

/// Sets `left.out_tangent` and `right.in_tangent` to the straight-line slope
/// between keys `left` and `left + 1`.
fn set_linear(curve: &mut Curve, left: usize) {
    let (Some(l), Some(r)) = (curve.key(left).copied(), curve.key(left + 1).copied()) else {
        return;
    };
    let dt = r.time - l.time;
    let slope = if dt > 0.0 { (r.value - l.value) / dt } else { 0.0 };

    if let Some(k) = curve.key_mut(left) {
        k.out_tangent = slope;
    }
    if let Some(k) = curve.key_mut(left + 1) {
        k.in_tangent = slope;
    }
}

/// Where `b` sits between `a` and `c` in time, in `[0, 1]`.
fn blend_factor(a: &Keyframe, b: &Keyframe, c: &Keyframe) -> f32 {
    let span = c.time - a.time;
    if span > 0.0 { (b.time - a.time) / span } else { 0.5 }
}

/// Reduces one position channel in place. Returns the number of removed keys.
///
/// The middle key of a triple is redundant when its second difference
/// (scaled to the key spacing) is below `tolerance² + ε`. A tolerance of
/// zero (or less) keeps every key.
pub fn reduce_position_curve(curve: &mut Curve, tolerance: f32) -> usize {
    if tolerance <= 0.0 {
        return 0;
    }
    let threshold = tolerance * tolerance + NOISE_EPSILON;

    let mut removed = 0;
    let mut i = 2;
    while i < curve.len() {
        let keys = curve.keys();
        let (a, b, c) = (&keys[i - 2], &keys[i - 1], &keys[i]);
        let predicted = a.value + (c.value - a.value) * blend_factor(a, b, c);

        if (2.0 * (b.value - predicted)).abs() < threshold {
            curve.remove_key(i - 1);
            set_linear(curve, i - 2);
            removed += 1;
            i = (i - 1).max(2);
        } else {
            i += 1;
        }
    }
    removed
}

fn quat_at(channels: &[Curve; 4], index: usize) -> Quat {
    Quat::from_xyzw(
        channels[0].keys()[index].value,
        channels[1].keys()[index].value,
        channels[2].keys()[index].value,
        channels[3].keys()[index].value,
    )
}

/// Reduces the four quaternion channels of one bone together. Returns the
/// number of keys removed per channel.
///
/// The middle key is redundant when its Euler angles (degrees) lie within
/// `tolerance` of the slerp between its neighbours at its own time. This
/// tests the middle key rather than the end key against the halfway slerp,
/// so single-frame spikes survive and uneven spacing after removals is
/// accounted for.
/// Channels with mismatched key counts are left untouched.
pub fn reduce_rotation_curves(channels: &mut [Curve; 4], tolerance: f32) -> usize {
    if tolerance <= 0.0 {
        return 0;
    }
    let len = channels[0].len();
    if channels.iter().any(|c| c.len() != len) {
        log::warn!("Rotation channels out of sync, skipping reduction");
        return 0;
    }
    let threshold = tolerance * tolerance;

    let mut removed = 0;
    let mut i = 2;
    while i < channels[0].len() {
        let q1 = quat_at(channels, i - 2);
        let q2 = quat_at(channels, i - 1);
        let q3 = quat_at(channels, i);
        let keys = channels[0].keys();
        let q13 = q1.slerp(q3, blend_factor(&keys[i - 2], &keys[i - 1], &keys[i]));

        if angular_deviation_sq(q2, q13) < threshold {
            for curve in channels.iter_mut() {
                curve.remove_key(i - 1);
                set_linear(curve, i - 2);
            }
            removed += 1;
            i = (i - 1).max(2);
        } else {
            i += 1;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, step: f32) -> Curve {
        let points: Vec<(f32, f32)> = (0..n).map(|i| (i as f32 / 10.0, i as f32 * step)).collect();
        Curve::from_points(&points)
    }

    #[test]
    fn zero_tolerance_keeps_every_key() {
        let mut curve = ramp(8, 0.5);
        assert_eq!(reduce_position_curve(&mut curve, 0.0), 0);
        assert_eq!(curve.len(), 8);
    }

    #[test]
    fn ramp_collapses_to_endpoints() {
        let mut curve = ramp(8, 0.5);
        assert_eq!(reduce_position_curve(&mut curve, 0.01), 6);
        assert_eq!(curve.len(), 2);

        let keys = curve.keys();
        assert_eq!(keys[0].value, 0.0);
        assert_eq!(keys[1].value, 3.5);
        assert!((keys[0].out_tangent - 5.0).abs() < 1e-4);
        assert!((keys[1].in_tangent - 5.0).abs() < 1e-4);
    }

    #[test]
    fn corner_survives() {
        let mut curve = Curve::from_points(&[(0.0, 0.0), (0.1, 1.0), (0.2, 2.0), (0.3, 2.0), (0.4, 2.0)]);
        reduce_position_curve(&mut curve, 0.01);
        let times: Vec<f32> = curve.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.2, 0.4]);
    }

    #[test]
    fn short_curves_are_untouched() {
        let mut curve = Curve::from_keys(vec![Keyframe::new(0.0, 1.0), Keyframe::new(1.0, 1.0)]);
        assert_eq!(reduce_position_curve(&mut curve, 1.0), 0);
        assert_eq!(curve.len(), 2);
    }

    fn rotation_channels(angles: &[f32]) -> [Curve; 4] {
        let mut channels: [Curve; 4] = Default::default();
        for (i, &a) in angles.iter().enumerate() {
            let q = Quat::from_rotation_y(a.to_radians());
            let t = i as f32 / 10.0;
            for (curve, v) in channels.iter_mut().zip(q.to_array()) {
                curve.add_key(Keyframe::new(t, v));
            }
        }
        channels
    }

    #[test]
    fn steady_rotation_collapses() {
        let mut channels = rotation_channels(&[0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(reduce_rotation_curves(&mut channels, 0.5), 3);
        for curve in &channels {
            assert_eq!(curve.len(), 2);
        }
    }

    #[test]
    fn rotation_spike_survives() {
        let mut channels = rotation_channels(&[0.0, 45.0, 0.0]);
        assert_eq!(reduce_rotation_curves(&mut channels, 0.5), 0);
        assert_eq!(channels[0].len(), 3);
    }
}
