use reel_core::Frame;
use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// A value anchored at a frame, plus the easing toward the next keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: Frame,
    pub value: f32,
    pub easing: Easing,
}

impl Keyframe {
    #[must_use]
    pub fn new(frame: Frame, value: f32, easing: Easing) -> Self {
        Self {
            frame,
            value,
            easing,
        }
    }

    #[must_use]
    pub fn linear(frame: Frame, value: f32) -> Self {
        Self::new(frame, value, Easing::Linear)
    }
}

/// Persisted form of a keyframe: a `[frame, value, easing]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyframeRecord(pub Frame, pub f32, pub Easing);

impl From<Keyframe> for KeyframeRecord {
    fn from(key: Keyframe) -> Self {
        Self(key.frame, key.value, key.easing)
    }
}

impl From<KeyframeRecord> for Keyframe {
    fn from(KeyframeRecord(frame, value, easing): KeyframeRecord) -> Self {
        Self::new(frame, value, easing)
    }
}
