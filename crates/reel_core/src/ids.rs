//! Identifiers
//!
//! Scene objects carry two identities:
//! - [`ObjectId`]: a dense, scene-local integer handed out by a monotonic
//!   counter. Renderers and pickers key their per-object data on it.
//! - [`ObjectGuid`]: a random UUID that survives duplication and sessions.
//!
//! Frames are plain `u32` indices. Public editing calls accept `i64` so that
//! negative input can be rejected with [`ReelError::InvalidFrame`] instead of
//! wrapping.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ReelError, Result};

/// A frame index on the timeline.
pub type Frame = u32;

/// Converts a caller-supplied frame index into a [`Frame`].
pub fn validate_frame(frame: i64) -> Result<Frame> {
    Frame::try_from(frame).map_err(|_| ReelError::InvalidFrame { frame })
}

/// Scene-local object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl ObjectId {
    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable object identity across duplication and saved sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectGuid(pub Uuid);

impl ObjectGuid {
    /// Generates a fresh random GUID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectGuid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Hands out [`ObjectId`]s in increasing order. Ids are never reused within
/// one allocator, so a deleted object's id cannot alias a new one.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Makes sure future ids are greater than `id`, used after loading objects
    /// with ids assigned by a previous session.
    pub fn reserve_past(&mut self, id: ObjectId) {
        if id.0 >= self.next {
            self.next = id.0.saturating_add(1);
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
