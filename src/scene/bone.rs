use smallvec::SmallVec;

use crate::math::GlobalTransform;
use crate::scene::BoneId;
use crate::scene::transform::Transform;

/// A single joint in a skeleton hierarchy.
///
/// # Hierarchy
///
/// Bones form a tree through parent-child relationships:
/// - `parent`: Optional id of the parent bone (None for the skeleton root)
/// - `children`: Ordered child ids; the order is the enumeration order used
///   by bone matching
///
/// # Transform
///
/// `transform` is the authored local pose. `world` caches the derived
/// world transform and is refreshed by
/// [`Skeleton::update_world_transforms`](crate::scene::Skeleton::update_world_transforms).
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub(crate) parent: Option<BoneId>,
    pub(crate) children: SmallVec<[BoneId; 4]>,
    pub transform: Transform,
    pub(crate) world: GlobalTransform,
}

impl Bone {
    #[must_use]
    pub fn new(name: &str, transform: Transform) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: SmallVec::new(),
            transform,
            world: GlobalTransform::IDENTITY,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<BoneId> {
        self.parent
    }

    /// Child ids in enumeration order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[BoneId] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Cached world transform (valid after the skeleton was updated).
    #[inline]
    #[must_use]
    pub fn world(&self) -> &GlobalTransform {
        &self.world
    }
}
