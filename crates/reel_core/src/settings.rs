//! Timeline Settings
//!
//! Configuration for playback speed, timeline length, end-of-timeline
//! behavior and the evaluation gate.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use reel_core::settings::{TimelineSettings, PlaybackEnd};
//!
//! // Defaults: 30 fps, 5000 frames, hold at the last frame
//! let settings = TimelineSettings::default();
//!
//! // 24 fps, short looping timeline
//! let settings = TimelineSettings {
//!     frame_rate: 24.0,
//!     total_frames: 240,
//!     end_behavior: PlaybackEnd::Loop,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

/// What playback does when the playhead reaches `total_frames`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackEnd {
    /// Clamp at the last frame and stop playing.
    #[default]
    Hold,
    /// Wrap back to frame 0 and keep playing.
    Loop,
}

/// Which transport states cause the engine to re-evaluate keyframes on tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvaluationGate {
    /// Evaluate while playing or scrubbing.
    PlaybackOrScrub,
    /// Evaluate while playing, scrubbing or dragging a keyframe.
    #[default]
    PlaybackScrubOrDrag,
}

/// Timeline configuration shared by the clock and the engine facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Frames advanced per second of playback.
    pub frame_rate: f32,
    /// Initial timeline length in frames.
    pub total_frames: u32,
    pub end_behavior: PlaybackEnd,
    pub evaluation_gate: EvaluationGate,
    /// Grow `total_frames` when a keyframe is placed past the end.
    pub auto_extend_total_frames: bool,
    /// Frames kept after the last keyframe when auto-extending.
    pub total_frames_padding: u32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Number of frames visible at zoom 1.0.
    pub frames_per_view_at_unit_zoom: f32,
}

impl TimelineSettings {
    pub const MIN_FRAME_RATE: f32 = 1.0;
    pub const MAX_FRAME_RATE: f32 = 120.0;
    pub const DEFAULT_TOTAL_FRAMES: u32 = 5000;

    /// Sets the frame rate, clamped to the supported range.
    pub fn set_frame_rate(&mut self, frame_rate: f32) {
        if !frame_rate.is_finite() {
            log::warn!("Ignoring non-finite frame rate {frame_rate}");
            return;
        }
        self.frame_rate = frame_rate.clamp(Self::MIN_FRAME_RATE, Self::MAX_FRAME_RATE);
    }

    /// Repairs values no timeline can run with: a frame rate outside the
    /// supported range, a non-positive or inverted zoom range and a
    /// non-positive view width. Applied to settings read from disk.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !self.frame_rate.is_finite() {
            log::warn!("Frame rate {} is not finite; using {}", self.frame_rate, defaults.frame_rate);
            self.frame_rate = defaults.frame_rate;
        } else if !(Self::MIN_FRAME_RATE..=Self::MAX_FRAME_RATE).contains(&self.frame_rate) {
            log::warn!("Frame rate {} out of range; clamping", self.frame_rate);
            self.frame_rate = self.frame_rate.clamp(Self::MIN_FRAME_RATE, Self::MAX_FRAME_RATE);
        }

        let zoom_ok = |z: f32| z.is_finite() && z > 0.0;
        if !zoom_ok(self.min_zoom) || !zoom_ok(self.max_zoom) {
            log::warn!(
                "Zoom range [{}, {}] is invalid; using defaults",
                self.min_zoom,
                self.max_zoom
            );
            self.min_zoom = defaults.min_zoom;
            self.max_zoom = defaults.max_zoom;
        } else if self.min_zoom > self.max_zoom {
            log::warn!("Zoom range [{}, {}] is inverted; swapping", self.min_zoom, self.max_zoom);
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }

        if !self.frames_per_view_at_unit_zoom.is_finite() || self.frames_per_view_at_unit_zoom <= 0.0 {
            log::warn!(
                "Frames per view {} is invalid; using {}",
                self.frames_per_view_at_unit_zoom,
                defaults.frames_per_view_at_unit_zoom
            );
            self.frames_per_view_at_unit_zoom = defaults.frames_per_view_at_unit_zoom;
        }
        self
    }

    /// Clamps a zoom factor into `[min_zoom, max_zoom]`.
    #[inline]
    #[must_use]
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            total_frames: Self::DEFAULT_TOTAL_FRAMES,
            end_behavior: PlaybackEnd::Hold,
            evaluation_gate: EvaluationGate::PlaybackScrubOrDrag,
            auto_extend_total_frames: true,
            total_frames_padding: 100,
            min_zoom: 95.0 / 5000.0,
            max_zoom: 95.0 / 40.0,
            frames_per_view_at_unit_zoom: 95.0,
        }
    }
}
