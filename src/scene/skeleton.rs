use slotmap::{SecondaryMap, SlotMap};

use crate::errors::{Result, TransmuteError};
use crate::math::GlobalTransform;
use crate::scene::BoneId;
use crate::scene::bone::Bone;
use crate::scene::transform::Transform;
use crate::scene::transform_system;

/// Separator between bone names in a bone path.
pub const PATH_SEPARATOR: char = '/';

/// A rigid bone hierarchy stored as an arena of bones addressed by [`BoneId`].
///
/// The root bone stands for the animated object itself (the character's
/// placement in the world); its path is the empty string and every other
/// bone's path is the `/`-joined chain of names below it.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,

    // === Core Data ===
    bones: SlotMap<BoneId, Bone>,
    root: BoneId,
}

impl Skeleton {
    /// Creates a skeleton containing only its root bone.
    #[must_use]
    pub fn new(name: &str, root_name: &str, root_transform: Transform) -> Self {
        let mut bones = SlotMap::with_key();
        let mut root_bone = Bone::new(root_name, root_transform);
        let t = root_transform;
        root_bone.world = GlobalTransform::IDENTITY.child(t.position, t.rotation, t.scale);
        let root = bones.insert(root_bone);

        Self {
            name: name.to_string(),
            bones,
            root,
        }
    }

    /// Root bone id (the animated object).
    #[inline]
    #[must_use]
    pub fn root(&self) -> BoneId {
        self.root
    }

    /// Read-only access to the bone arena.
    #[inline]
    #[must_use]
    pub fn bones(&self) -> &SlotMap<BoneId, Bone> {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Appends a bone as the last child of `parent`.
    ///
    /// The new bone's cached world transform is derived from the parent's,
    /// so skeletons built top-down are immediately consistent.
    pub fn add_bone(&mut self, parent: BoneId, name: &str, transform: Transform) -> Result<BoneId> {
        let parent_world = self
            .bones
            .get(parent)
            .map(|p| p.world)
            .ok_or(TransmuteError::BoneNotFound(parent))?;

        let mut bone = Bone::new(name, transform);
        bone.parent = Some(parent);
        bone.world = parent_world.child(transform.position, transform.rotation, transform.scale);

        let id = self.bones.insert(bone);
        self.bones[parent].children.push(id);
        Ok(id)
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id)
    }

    /// Mutable access for editing a bone's local transform. Call
    /// [`update_world_transforms`](Self::update_world_transforms) afterwards.
    #[inline]
    pub fn bone_mut(&mut self, id: BoneId) -> Option<&mut Bone> {
        self.bones.get_mut(id)
    }

    /// Like [`bone`](Self::bone) but reports a missing id as an error.
    pub fn get(&self, id: BoneId) -> Result<&Bone> {
        self.bones.get(id).ok_or(TransmuteError::BoneNotFound(id))
    }

    /// Name of a bone, or `"<missing>"` for an unknown id.
    #[must_use]
    pub fn name_of(&self, id: BoneId) -> &str {
        self.bones.get(id).map_or("<missing>", |b| b.name.as_str())
    }

    /// Depth-first search from the root for the first bone with this name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<BoneId> {
        self.depth_first(self.root)
            .into_iter()
            .find(|&id| self.bones[id].name == name)
    }

    /// Resolves a bone path (as produced by [`path_of`](Self::path_of)).
    #[must_use]
    pub fn find_by_path(&self, path: &str) -> Option<BoneId> {
        let mut current = self.root;
        if path.is_empty() {
            return Some(current);
        }
        for segment in path.split(PATH_SEPARATOR) {
            current = self.bones[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.bones[child].name == segment)?;
        }
        Some(current)
    }

    /// Stable path from the root down to `id`, e.g. `"Hips/Spine/Head"`.
    /// The root itself has the empty path.
    #[must_use]
    pub fn path_of(&self, id: BoneId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = id;
        loop {
            let bone = self.bones.get(current)?;
            match bone.parent {
                Some(parent) => {
                    names.push(bone.name.as_str());
                    current = parent;
                }
                None => break,
            }
        }
        if current != self.root {
            return None;
        }
        names.reverse();
        Some(names.join(&PATH_SEPARATOR.to_string()))
    }

    /// Paths of every bone, built top-down in a single pass.
    #[must_use]
    pub fn paths(&self) -> SecondaryMap<BoneId, String> {
        let mut paths = SecondaryMap::with_capacity(self.bones.len());
        paths.insert(self.root, String::new());
        for id in self.depth_first(self.root) {
            let Some(parent) = self.bones[id].parent else {
                continue;
            };
            let path = match paths.get(parent) {
                Some(p) if !p.is_empty() => format!("{p}{PATH_SEPARATOR}{}", self.bones[id].name),
                _ => self.bones[id].name.clone(),
            };
            paths.insert(id, path);
        }
        paths
    }

    /// `true` when `bone` is `ancestor` itself or lies in its subtree.
    #[must_use]
    pub fn contains_descendant(&self, ancestor: BoneId, bone: BoneId) -> bool {
        let mut current = Some(bone);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.bones.get(id).and_then(Bone::parent);
        }
        false
    }

    /// Checks that an anchor bone belongs to this skeleton's hierarchy.
    pub fn validate_anchor(&self, anchor: BoneId) -> Result<()> {
        if self.contains_descendant(self.root, anchor) {
            Ok(())
        } else {
            Err(TransmuteError::AnchorOutsideSkeleton {
                bone: self.name_of(anchor).to_string(),
                skeleton: self.name.clone(),
            })
        }
    }

    /// Bone ids below `from` (inclusive) in depth-first pre-order.
    #[must_use]
    pub fn depth_first(&self, from: BoneId) -> Vec<BoneId> {
        let mut order = Vec::with_capacity(self.bones.len());
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Some(bone) = self.bones.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(bone.children.iter().rev().copied());
        }
        order
    }

    /// Refreshes every bone's cached world transform from local transforms.
    pub fn update_world_transforms(&mut self) {
        transform_system::update_hierarchy(&mut self.bones, self.root);
    }

    /// Rest-pose world transforms, computed without touching the cache.
    #[must_use]
    pub fn rest_pose(&self) -> SecondaryMap<BoneId, GlobalTransform> {
        transform_system::rest_pose(&self.bones, self.root)
    }

    /// Rest world transform of the root (the animated object's placement).
    #[must_use]
    pub fn root_world(&self) -> GlobalTransform {
        let t = self.bones[self.root].transform;
        GlobalTransform::IDENTITY.child(t.position, t.rotation, t.scale)
    }
}
