//! Bone Correspondence Resolver
//!
//! Builds a [`BoneMap`] from every donor bone below the donor anchor to its
//! best-matching target bone below the target anchor.
//!
//! The walk is donor-driven and depth-first. For each child of the current
//! donor bone, the children of the current target bone are searched:
//!
//! 1. **Exact name**: the first target child with the same name wins,
//!    regardless of distance.
//! 2. **Nearest**: otherwise the target child whose rest world position is
//!    closest to the donor child's, after compensating for the offset
//!    between the two skeleton roots. The first minimal candidate in
//!    enumeration order wins.
//!
//! A donor child is dropped together with its whole subtree when the
//! current target bone has no children. Dropped bones are recorded as
//! unmatched diagnostics, not errors.
//!
//! Target bones are not reserved once matched: two donor bones may resolve
//! to the same target bone. The map keeps both entries; when clips are
//! written, the later entry's curves overwrite the earlier one's.

use glam::Vec3;
use rustc_hash::FxHashMap;
use slotmap::SecondaryMap;

use crate::errors::Result;
use crate::math::GlobalTransform;
use crate::scene::{BoneId, Skeleton};

/// How a donor bone was paired with its target bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// The user-supplied anchor pair that seeds the map.
    Anchor,
    /// Same bone name under corresponding parents.
    Name,
    /// Closest rest position under corresponding parents.
    Nearest,
    /// Supplied by the caller through [`BoneMap::from_pairs`].
    Manual,
}

/// One donor → target entry of a [`BoneMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonePair {
    pub donor: BoneId,
    pub target: BoneId,
    pub kind: MatchKind,
}

/// Diagnostic entry for a donor bone that is either unmatched or matched to
/// a bone with a different name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchedBone {
    pub donor_name: String,
    /// `None` when the donor bone has no counterpart at all.
    pub target_name: Option<String>,
}

impl std::fmt::Display for MismatchedBone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.target_name {
            Some(target) => write!(f, "{} -> {}", self.donor_name, target),
            None => write!(f, "{} -> null", self.donor_name),
        }
    }
}

/// Immutable donor → target bone correspondence.
///
/// Entries are kept in resolution order (depth-first pre-order over the
/// donor hierarchy), starting with the anchor pair.
#[derive(Debug, Clone, Default)]
pub struct BoneMap {
    pairs: Vec<BonePair>,
    index: FxHashMap<BoneId, usize>,
    unmatched: Vec<BoneId>,
}

impl BoneMap {
    fn seeded(donor_anchor: BoneId, target_anchor: BoneId) -> Self {
        let mut map = Self::default();
        map.insert(donor_anchor, target_anchor, MatchKind::Anchor);
        map
    }

    /// Builds a map from explicit `(donor, target)` pairs. The first pair is
    /// treated as the anchor pair; a repeated donor keeps its first position
    /// and takes the later target.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (BoneId, BoneId)>) -> Self {
        let mut map = Self::default();
        for (i, (donor, target)) in pairs.into_iter().enumerate() {
            let kind = if i == 0 { MatchKind::Anchor } else { MatchKind::Manual };
            map.insert(donor, target, kind);
        }
        map
    }

    fn insert(&mut self, donor: BoneId, target: BoneId, kind: MatchKind) {
        let entry = BonePair { donor, target, kind };
        if let Some(&i) = self.index.get(&donor) {
            self.pairs[i] = entry;
        } else {
            self.index.insert(donor, self.pairs.len());
            self.pairs.push(entry);
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All entries in resolution order; the first one is the anchor pair.
    #[inline]
    #[must_use]
    pub fn pairs(&self) -> &[BonePair] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &BonePair> {
        self.pairs.iter()
    }

    /// The anchor pair `(donor, target)`.
    #[must_use]
    pub fn anchors(&self) -> Option<(BoneId, BoneId)> {
        self.pairs.first().map(|p| (p.donor, p.target))
    }

    /// Target bone for a donor bone, if it was matched.
    #[must_use]
    pub fn target_of(&self, donor: BoneId) -> Option<BoneId> {
        self.pair(donor).map(|p| p.target)
    }

    #[must_use]
    pub fn pair(&self, donor: BoneId) -> Option<&BonePair> {
        self.index.get(&donor).map(|&i| &self.pairs[i])
    }

    #[must_use]
    pub fn contains_donor(&self, donor: BoneId) -> bool {
        self.index.contains_key(&donor)
    }

    /// Every donor bone that maps onto `target`. More than one entry means
    /// several donor bones collapsed onto the same target bone.
    #[must_use]
    pub fn donors_of(&self, target: BoneId) -> Vec<BoneId> {
        self.pairs
            .iter()
            .filter(|p| p.target == target)
            .map(|p| p.donor)
            .collect()
    }

    /// Donor bones below the anchor that received no target bone.
    #[inline]
    #[must_use]
    pub fn unmatched(&self) -> &[BoneId] {
        &self.unmatched
    }

    /// Unmatched donor bones (`name -> null`) followed by entries whose
    /// target bone has a different name (`name -> other`), in resolution order.
    #[must_use]
    pub fn mismatches(&self, donor: &Skeleton, target: &Skeleton) -> Vec<MismatchedBone> {
        let unmatched = self.unmatched.iter().map(|&id| MismatchedBone {
            donor_name: donor.name_of(id).to_string(),
            target_name: None,
        });
        let renamed = self.pairs.iter().filter_map(|p| {
            let donor_name = donor.name_of(p.donor);
            let target_name = target.name_of(p.target);
            (donor_name != target_name).then(|| MismatchedBone {
                donor_name: donor_name.to_string(),
                target_name: Some(target_name.to_string()),
            })
        });
        unmatched.chain(renamed).collect()
    }
}

/// Resolves the bone correspondence below an anchor pair.
///
/// `root_offset` is the world translation from the target root to the donor
/// root (`donor_root − target_root`); it is applied uniformly at every
/// depth when comparing rest positions.
#[must_use]
pub fn resolve(
    donor: &Skeleton,
    donor_anchor: BoneId,
    target: &Skeleton,
    target_anchor: BoneId,
    root_offset: Vec3,
) -> BoneMap {
    let donor_pose = donor.rest_pose();
    let target_pose = target.rest_pose();
    let position = |pose: &SecondaryMap<BoneId, GlobalTransform>, id: BoneId| {
        pose.get(id).map_or(Vec3::ZERO, |w| w.translation)
    };

    let mut map = BoneMap::seeded(donor_anchor, target_anchor);

    // Pairs are inserted when popped, so entry order matches a recursive
    // depth-first walk over the donor hierarchy.
    let mut stack: Vec<(BoneId, BoneId, MatchKind)> = vec![(donor_anchor, target_anchor, MatchKind::Anchor)];

    while let Some((donor_bone, target_bone, kind)) = stack.pop() {
        if kind != MatchKind::Anchor {
            log::debug!(
                "Bone pair: {} -> {} ({kind:?})",
                donor.name_of(donor_bone),
                target.name_of(target_bone)
            );
            map.insert(donor_bone, target_bone, kind);
        }

        let (Some(d), Some(t)) = (donor.bone(donor_bone), target.bone(target_bone)) else {
            continue;
        };

        let mut matched: Vec<(BoneId, BoneId, MatchKind)> = Vec::with_capacity(d.child_count());
        for &p in d.children() {
            let p_name = donor.name_of(p);

            // Exact-name pass
            if let Some(&n) = t.children().iter().find(|&&n| target.name_of(n) == p_name) {
                matched.push((p, n, MatchKind::Name));
                continue;
            }

            // Nearest-neighbour fallback
            let p_pos = position(&donor_pose, p);
            let mut closest = None;
            let mut min_dist = f32::MAX;
            for &x in t.children() {
                let dist = (position(&target_pose, x) - p_pos + root_offset).length_squared();
                if closest.is_none() || dist < min_dist {
                    closest = Some(x);
                    min_dist = dist;
                }
            }

            match closest {
                Some(x) => matched.push((p, x, MatchKind::Nearest)),
                None => map.unmatched.extend(donor.depth_first(p)),
            }
        }

        stack.extend(matched.into_iter().rev());
    }

    for &id in &map.unmatched {
        log::warn!("Bone {} has no counterpart in {}", donor.name_of(id), target.name);
    }

    map
}

/// Validates both anchors, derives the root offset from the skeletons' root
/// placements and resolves the correspondence.
pub fn resolve_skeletons(
    donor: &Skeleton,
    donor_anchor: BoneId,
    target: &Skeleton,
    target_anchor: BoneId,
) -> Result<BoneMap> {
    donor.validate_anchor(donor_anchor)?;
    target.validate_anchor(target_anchor)?;

    let root_offset = donor.root_world().translation - target.root_world().translation;
    let map = resolve(donor, donor_anchor, target, target_anchor, root_offset);

    log::info!(
        "Resolved {} bone pairs from {} to {} ({} unmatched)",
        map.len(),
        donor.name,
        target.name,
        map.unmatched().len()
    );
    Ok(map)
}
