use reel_core::Frame;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerColor {
    #[default]
    Red,
    Orange,
    Yellow,
    Green,
    ForestGreen,
    Teal,
    Blue,
    Purple,
    Pink,
}

/// A labelled position on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: Uuid,
    pub frame: Frame,
    pub label: String,
    pub color: MarkerColor,
}

/// Timeline markers, kept sorted by frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerList {
    markers: Vec<Marker>,
}

impl MarkerList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a marker with the default label and color. Returns its id.
    pub fn add(&mut self, frame: Frame) -> Uuid {
        self.insert(Marker {
            id: Uuid::new_v4(),
            frame,
            label: "New marker".to_owned(),
            color: MarkerColor::default(),
        })
    }

    pub fn insert(&mut self, marker: Marker) -> Uuid {
        let id = marker.id;
        let at = self.markers.partition_point(|m| m.frame <= marker.frame);
        self.markers.insert(at, marker);
        id
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Marker> {
        let i = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(i))
    }

    /// Moves a marker to another frame. Returns `false` for an unknown id.
    pub fn move_to(&mut self, id: Uuid, frame: Frame) -> bool {
        match self.remove(id) {
            Some(mut marker) => {
                marker.frame = frame;
                self.insert(marker);
                true
            }
            None => false,
        }
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| m.id == id)
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
