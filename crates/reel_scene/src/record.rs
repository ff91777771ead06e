use glam::Vec3;
use reel_animation::ChannelSet;
use reel_core::{ObjectGuid, ObjectId};
use serde::{Deserialize, Serialize};

use crate::object::{ObjectKind, SceneObject};
use crate::registry::SceneRegistry;

fn default_true() -> bool {
    true
}

/// Persisted form of a [`SceneObject`]. Hierarchy is stored as a parent id
/// on each record; child order follows record order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub guid: ObjectGuid,
    pub name: String,
    pub kind: ObjectKind,
    #[serde(default)]
    pub parent: Option<ObjectId>,
    pub target_position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub alpha: f32,
    pub origin_offset: Vec3,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub channels: ChannelSet,
}

impl From<&SceneObject> for ObjectRecord {
    fn from(obj: &SceneObject) -> Self {
        Self {
            id: obj.id,
            guid: obj.guid,
            name: obj.name.clone(),
            kind: obj.kind,
            parent: obj.parent,
            target_position: obj.target_position,
            rotation: obj.rotation,
            scale: obj.scale,
            alpha: obj.alpha,
            origin_offset: obj.origin_offset,
            visible: obj.visible,
            channels: obj.channels.clone(),
        }
    }
}

impl ObjectRecord {
    fn into_object(self) -> (SceneObject, Option<ObjectId>) {
        let mut obj = SceneObject::new(self.id, self.kind, self.name);
        obj.guid = self.guid;
        obj.target_position = self.target_position;
        obj.rotation = self.rotation;
        obj.scale = self.scale;
        obj.alpha = self.alpha;
        obj.origin_offset = self.origin_offset;
        obj.visible = self.visible;
        obj.channels = self.channels;
        (obj, self.parent)
    }
}

impl SceneRegistry {
    /// Snapshot of every object, parents before children. Objects that are
    /// not reachable from the roots come last.
    #[must_use]
    pub fn to_records(&self) -> Vec<ObjectRecord> {
        let ordered = self.all_objects();
        let mut records: Vec<ObjectRecord> = ordered
            .iter()
            .filter_map(|&id| self.get(id))
            .map(ObjectRecord::from)
            .collect();

        if records.len() < self.len() {
            let reachable: rustc_hash::FxHashSet<ObjectId> = ordered.into_iter().collect();
            records.extend(
                self.iter()
                    .filter(|o| !reachable.contains(&o.id()))
                    .map(ObjectRecord::from),
            );
        }
        records
    }

    /// Rebuilds a registry from records. Links that would point at a missing
    /// parent or close a cycle are dropped and the object becomes a root.
    #[must_use]
    pub fn from_records(records: Vec<ObjectRecord>) -> Self {
        let mut registry = Self::new();
        let mut links = Vec::with_capacity(records.len());
        for record in records {
            let (obj, parent) = record.into_object();
            links.push((obj.id(), parent));
            registry.insert_object(obj);
        }

        for (id, parent) in links {
            match parent {
                Some(p) => {
                    if let Err(err) = registry.attach(id, p) {
                        log::error!("Dropping parent link of {id}: {err}");
                        registry.push_root(id);
                    }
                }
                None => registry.push_root(id),
            }
        }
        registry
    }
}
