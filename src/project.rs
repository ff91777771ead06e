//! Project Persistence
//!
//! A saved project is one JSON document:
//!
//! ```json
//! {
//!   "settings": { "frame_rate": 30.0, "total_frames": 5000, ... },
//!   "objects": [
//!     { "id": 1, "guid": "...", "name": "Cube", "kind": "Cube", "parent": null,
//!       "target_position": [0.0, 0.0, 0.0], ...,
//!       "channels": { "position.x": [[0, 0.0, "Linear"], [30, 4.0, "EaseInQuadratic"]],
//!                     "position.y": [], ... } }
//!   ],
//!   "markers": [ { "id": "...", "frame": 12, "label": "Hit", "color": "Red" } ]
//! }
//! ```
//!
//! Objects are written parents first. An empty track list means the channel
//! is not animated. Duplicate frames in a loaded track are repaired keeping
//! the last value seen.

use std::fs;
use std::path::Path;

use reel_animation::MarkerList;
use reel_core::{Result, TimelineSettings};
use reel_scene::{ObjectRecord, SceneRegistry};
use serde::{Deserialize, Serialize};

use crate::engine::AnimationEngine;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    #[serde(default)]
    pub settings: TimelineSettings,
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
    #[serde(default)]
    pub markers: MarkerList,
}

impl ProjectState {
    /// Captures the engine's persistent state. The current timeline length
    /// is stored in place of the configured initial one.
    #[must_use]
    pub fn capture(engine: &AnimationEngine) -> Self {
        let mut settings = engine.clock.settings().clone();
        settings.total_frames = engine.total_frames();
        Self {
            settings,
            objects: engine.scene.to_records(),
            markers: engine.markers.clone(),
        }
    }

    /// Builds an engine from this state. The playhead starts at frame 0.
    #[must_use]
    pub fn into_engine(self) -> AnimationEngine {
        let scene = SceneRegistry::from_records(self.objects);
        AnimationEngine::from_parts(self.settings, scene, self.markers)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Saved {} object(s) to {}", self.objects.len(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let state = Self::from_json(&json)?;
        log::info!("Loaded {} object(s) from {}", state.objects.len(), path.display());
        Ok(state)
    }
}

impl AnimationEngine {
    /// Serializes the whole project to a JSON string.
    pub fn save_json(&self) -> Result<String> {
        ProjectState::capture(self).to_json()
    }

    /// Replaces this engine with the project in `json`. On error the engine
    /// is left untouched.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        *self = ProjectState::from_json(json)?.into_engine();
        Ok(())
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        ProjectState::capture(self).save(path)
    }

    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        *self = ProjectState::load(path)?.into_engine();
        Ok(())
    }
}
