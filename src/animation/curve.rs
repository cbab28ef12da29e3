/// One key of a scalar curve: a value at a time with Hermite tangents.
///
/// Tangents are slopes (value units per second). A freshly recorded key has
/// flat tangents; the reducer rewrites them to linear slopes around removed keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
}

impl Keyframe {
    #[must_use]
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    #[must_use]
    pub fn with_tangents(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last segment used so sequential sampling is O(1).
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Ordered keyframes of one scalar property (a curve channel).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a curve from keys in any order; keys are sorted by time.
    #[must_use]
    pub fn from_keys(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Convenience for flat-tangent keys given as `(time, value)` pairs.
    #[must_use]
    pub fn from_points(points: &[(f32, f32)]) -> Self {
        Self::from_keys(points.iter().map(|&(t, v)| Keyframe::new(t, v)).collect())
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn key(&self, index: usize) -> Option<&Keyframe> {
        self.keys.get(index)
    }

    /// Inserts a key keeping time order and returns its index.
    /// A key already present at exactly the same time is replaced.
    pub fn add_key(&mut self, key: Keyframe) -> usize {
        let index = self.keys.partition_point(|k| k.time < key.time);
        if self.keys.get(index).is_some_and(|k| k.time == key.time) {
            self.keys[index] = key;
        } else {
            self.keys.insert(index, key);
        }
        index
    }

    /// Removes and returns the key at `index`.
    pub fn remove_key(&mut self, index: usize) -> Keyframe {
        self.keys.remove(index)
    }

    /// Mutable access to a key's value and tangents.
    ///
    /// Callers must not reorder keys through this (time edits must keep
    /// the sequence sorted).
    pub fn key_mut(&mut self, index: usize) -> Option<&mut Keyframe> {
        self.keys.get_mut(index)
    }

    /// `true` when key times are strictly increasing.
    #[must_use]
    pub fn is_strictly_increasing(&self) -> bool {
        self.keys.windows(2).all(|w| w[0].time < w[1].time)
    }

    /// Samples the curve at `time`, clamping outside the key range.
    /// Returns `None` for an empty curve.
    #[must_use]
    pub fn evaluate(&self, time: f32) -> Option<f32> {
        if self.keys.is_empty() {
            return None;
        }
        // partition_point finds the first index where t > time, i.e. next_index
        let next_idx = self.keys.partition_point(|k| k.time <= time);
        Some(self.sample_at_segment(next_idx.saturating_sub(1), time))
    }

    /// Samples with a cursor; near-monotonic access (frame-by-frame sampling)
    /// avoids the binary search.
    #[must_use]
    pub fn evaluate_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<f32> {
        let len = self.keys.len();
        match len {
            0 => return None,
            1 => return Some(self.keys[0].value),
            _ => {}
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.keys[i].time;

        let found_index = if time >= t_curr {
            // Forward scan
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= self.keys[len - 1].time {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < self.keys[idx + 1].time {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward scan
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= self.keys[idx].time {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let index = found_index.unwrap_or_else(|| {
            // Large jump: fall back to binary search
            self.keys.partition_point(|k| k.time <= time).saturating_sub(1)
        });
        cursor.last_index = index;

        Some(self.sample_at_segment(index, time))
    }

    fn sample_at_segment(&self, index: usize, time: f32) -> f32 {
        let len = self.keys.len();
        if index >= len - 1 {
            return self.keys[len - 1].value;
        }
        let k0 = &self.keys[index];
        let k1 = &self.keys[index + 1];
        if time <= k0.time {
            return k0.value;
        }

        let dt = k1.time - k0.time;
        let t = if dt > 1e-6 { (time - k0.time) / dt } else { 0.0 };
        hermite(k0.value, k0.out_tangent, k1.in_tangent, k1.value, t.clamp(0.0, 1.0), dt)
    }
}

/// Cubic Hermite interpolation with slope tangents scaled by the segment length.
#[inline]
fn hermite(v0: f32, out_tangent0: f32, in_tangent1: f32, v1: f32, t: f32, dt: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    let s0 = 1.0 - s2;
    let s1 = s3 - t2 + t;

    let m0 = out_tangent0 * dt;
    let m1 = in_tangent1 * dt;

    s0 * v0 + s1 * m0 + s2 * v1 + s3 * m1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn add_key_keeps_order_and_replaces_same_time() {
        let mut curve = Curve::new();
        curve.add_key(Keyframe::new(1.0, 10.0));
        curve.add_key(Keyframe::new(0.0, 0.0));
        curve.add_key(Keyframe::new(0.5, 5.0));
        assert_eq!(curve.len(), 3);
        assert!(curve.is_strictly_increasing());

        let idx = curve.add_key(Keyframe::new(0.5, 7.0));
        assert_eq!(idx, 1);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve.keys()[1].value, 7.0);
    }

    #[test]
    fn linear_tangents_evaluate_linearly() {
        let curve = Curve::from_keys(vec![
            Keyframe::with_tangents(0.0, 0.0, 10.0, 10.0),
            Keyframe::with_tangents(1.0, 10.0, 10.0, 10.0),
        ]);
        assert!(approx(curve.evaluate(0.25).unwrap(), 2.5));
        assert!(approx(curve.evaluate(0.5).unwrap(), 5.0));
    }

    #[test]
    fn evaluate_clamps_outside_range() {
        let curve = Curve::from_points(&[(1.0, 10.0), (2.0, 20.0)]);
        assert!(approx(curve.evaluate(0.0).unwrap(), 10.0));
        assert!(approx(curve.evaluate(5.0).unwrap(), 20.0));
        assert_eq!(Curve::new().evaluate(0.0), None);
    }

    #[test]
    fn cursor_matches_binary_search() {
        let curve = Curve::from_points(&[(0.0, 0.0), (0.1, 1.0), (0.2, 4.0), (0.3, 9.0), (0.9, 2.0)]);
        let mut cursor = KeyframeCursor::default();
        for step in 0..=40 {
            let t = step as f32 * 0.025;
            let a = curve.evaluate(t).unwrap();
            let b = curve.evaluate_with_cursor(t, &mut cursor).unwrap();
            assert!(approx(a, b), "mismatch at {t}: {a} vs {b}");
        }
        // Scrub backwards
        let a = curve.evaluate(0.05).unwrap();
        let b = curve.evaluate_with_cursor(0.05, &mut cursor).unwrap();
        assert!(approx(a, b));
    }
}
