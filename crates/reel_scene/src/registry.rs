use reel_core::{IdAllocator, ObjectGuid, ObjectId, ReelError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{SlotMap, new_key_type};

use crate::object::{ObjectKind, SceneObject};

new_key_type! {
    pub struct ObjectKey;
}

/// Arena of scene objects.
///
/// Objects live in a [`SlotMap`] and reference each other by [`ObjectId`];
/// nothing owns its children directly. Ids come from a monotonic counter and
/// are never reused, GUIDs are random and survive saving.
///
/// Writes (spawn, duplicate, delete, reparent) belong to the editing path.
/// The tick path only reads.
#[derive(Debug, Default)]
pub struct SceneRegistry {
    objects: SlotMap<ObjectKey, SceneObject>,
    by_id: FxHashMap<ObjectId, ObjectKey>,
    by_guid: FxHashMap<ObjectGuid, ObjectKey>,
    roots: Vec<ObjectId>,
    ids: IdAllocator,
}

impl SceneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Creation & removal
    // ========================================================================

    /// Creates a root-level object.
    pub fn spawn(&mut self, kind: ObjectKind, name: &str) -> ObjectId {
        let id = self.ids.allocate();
        self.insert_object(SceneObject::new(id, kind, name));
        self.roots.push(id);
        log::debug!("Spawned {kind:?} '{name}' as {id}");
        id
    }

    /// Creates an object directly under `parent`.
    pub fn spawn_child(&mut self, kind: ObjectKind, name: &str, parent: ObjectId) -> Result<ObjectId> {
        if !self.contains(parent) {
            return Err(ReelError::StaleReference(parent));
        }
        let id = self.spawn(kind, name);
        self.attach(id, parent)?;
        Ok(id)
    }

    /// Inserts a fully built object keeping its id and GUID. The object is
    /// not linked into the hierarchy. Used when restoring saved scenes.
    pub fn insert_object(&mut self, object: SceneObject) {
        let id = object.id;
        let guid = object.guid;
        self.ids.reserve_past(id);
        let key = self.objects.insert(object);
        if let Some(old) = self.by_id.insert(id, key) {
            log::warn!("Object id {id} inserted twice; replacing the previous object");
            if let Some(previous) = self.objects.remove(old) {
                self.by_guid.remove(&previous.guid);
            }
        }
        self.by_guid.insert(guid, key);
    }

    /// Removes an object and its whole subtree. Returns the removed ids,
    /// children before parents.
    pub fn remove(&mut self, id: ObjectId) -> Result<Vec<ObjectId>> {
        if !self.contains(id) {
            return Err(ReelError::StaleReference(id));
        }

        self.unlink(id);

        let mut removed = Vec::new();
        let mut stack = vec![id];
        let mut seen = FxHashSet::default();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(obj) = self.get(current) {
                stack.extend(obj.children.iter().copied());
            }
            removed.push(current);
        }

        for &gone in removed.iter().rev() {
            if let Some(key) = self.by_id.remove(&gone)
                && let Some(obj) = self.objects.remove(key)
            {
                self.by_guid.remove(&obj.guid);
            }
        }
        self.roots.retain(|r| !seen.contains(r));

        removed.reverse();
        log::debug!("Removed {} object(s) rooted at {id}", removed.len());
        Ok(removed)
    }

    /// Deep-copies `id` and its subtree with fresh ids and GUIDs. The copy is
    /// placed under the same parent as the original.
    pub fn duplicate(&mut self, id: ObjectId) -> Result<ObjectId> {
        let parent = self.object(id)?.parent;
        let copy = self.duplicate_subtree(id, 0)?;

        match parent {
            Some(p) => self.attach(copy, p)?,
            None => self.roots.push(copy),
        }
        Ok(copy)
    }

    fn duplicate_subtree(&mut self, id: ObjectId, depth: usize) -> Result<ObjectId> {
        if depth > Self::MAX_DEPTH {
            return Err(ReelError::StructuralError {
                object: id,
                reason: "hierarchy too deep to duplicate".to_owned(),
            });
        }
        let mut copy = self.object(id)?.clone();
        let children = std::mem::take(&mut copy.children);

        let new_id = self.ids.allocate();
        copy.id = new_id;
        copy.guid = ObjectGuid::new();
        copy.parent = None;
        self.insert_object(copy);

        for child in children {
            let child_copy = self.duplicate_subtree(child, depth + 1)?;
            self.link_raw(child_copy, new_id);
        }
        Ok(new_id)
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Depth limit for hierarchy walks.
    pub const MAX_DEPTH: usize = 1024;

    /// Makes `child` the last child of `parent`, detaching it from its old
    /// parent first. Rejects self-parenting and cycles.
    pub fn attach(&mut self, child: ObjectId, parent: ObjectId) -> Result<()> {
        if !self.contains(child) {
            return Err(ReelError::StaleReference(child));
        }
        if !self.contains(parent) {
            return Err(ReelError::StaleReference(parent));
        }
        if child == parent {
            return Err(ReelError::StructuralError {
                object: child,
                reason: "cannot parent an object to itself".to_owned(),
            });
        }
        if self.is_descendant_of(parent, child) {
            return Err(ReelError::StructuralError {
                object: child,
                reason: format!("{parent} is a descendant of {child}"),
            });
        }

        self.unlink(child);
        self.link_raw(child, parent);
        Ok(())
    }

    /// Moves `child` to the root level.
    pub fn detach(&mut self, child: ObjectId) -> Result<()> {
        if !self.contains(child) {
            return Err(ReelError::StaleReference(child));
        }
        self.unlink(child);
        self.roots.push(child);
        Ok(())
    }

    /// Records `child` under `parent` without detaching it from anywhere and
    /// without cycle checks. Prefer [`attach`](Self::attach), which keeps the
    /// hierarchy consistent; this is exposed for low-level construction.
    pub fn link_raw(&mut self, child: ObjectId, parent: ObjectId) {
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Removes `id` from its parent's child list (or from the roots).
    fn unlink(&mut self, id: ObjectId) {
        let old_parent = self.get(id).and_then(|o| o.parent);
        match old_parent {
            Some(p) => {
                if let Some(parent) = self.get_mut(p)
                    && let Some(i) = parent.children.iter().position(|&c| c == id)
                {
                    parent.children.remove(i);
                }
            }
            None => {
                if let Some(i) = self.roots.iter().position(|&r| r == id) {
                    self.roots.remove(i);
                }
            }
        }
        if let Some(obj) = self.get_mut(id) {
            obj.parent = None;
        }
    }

    /// True if `ancestor` appears on the parent chain of `id`.
    #[must_use]
    pub fn is_descendant_of(&self, id: ObjectId, ancestor: ObjectId) -> bool {
        let mut current = self.get(id).and_then(|o| o.parent);
        let mut steps = 0;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            steps += 1;
            if steps > Self::MAX_DEPTH {
                log::error!("Parent chain of {id} exceeds {} levels", Self::MAX_DEPTH);
                return false;
            }
            current = self.get(p).and_then(|o| o.parent);
        }
        false
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.by_id.get(&id).and_then(|&k| self.objects.get(k))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        let key = *self.by_id.get(&id)?;
        self.objects.get_mut(key)
    }

    /// Like [`get`](Self::get) but reports a deleted object as
    /// [`ReelError::StaleReference`].
    pub fn object(&self, id: ObjectId) -> Result<&SceneObject> {
        self.get(id).ok_or(ReelError::StaleReference(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut SceneObject> {
        self.get_mut(id).ok_or(ReelError::StaleReference(id))
    }

    #[must_use]
    pub fn by_guid(&self, guid: ObjectGuid) -> Option<&SceneObject> {
        self.by_guid.get(&guid).and_then(|&k| self.objects.get(k))
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.by_id.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Root-level objects in creation order.
    #[must_use]
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Every object reachable from the roots, parents before children,
    /// siblings in order.
    #[must_use]
    pub fn all_objects(&self) -> Vec<ObjectId> {
        let mut out = Vec::with_capacity(self.len());
        let mut seen = FxHashSet::default();
        let mut stack: Vec<ObjectId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(obj) = self.get(id) {
                out.push(id);
                stack.extend(obj.children.iter().rev().copied());
            }
        }
        out
    }

    /// Objects in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.values_mut()
    }

    /// Lists `id` as root-level unless it already is.
    pub(crate) fn push_root(&mut self, id: ObjectId) {
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }
}
