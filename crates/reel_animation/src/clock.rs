//! Timeline Clock
//!
//! The process-wide transport state machine. Exactly one of
//! [`PlaybackState::Stopped`], [`PlaybackState::Playing`] and
//! [`PlaybackState::Scrubbing`] is active; dragging a keyframe is an overlay
//! flag independent of the transport state.
//!
//! # Transitions
//!
//! ```text
//!            play()                 begin_scrub()
//!  Stopped ─────────► Playing ─────────────────────► Scrubbing
//!     ▲  ◄─────────────  │                              │
//!     │  stop() / end     │                              │
//!     └───────────────────┴──────── end_scrub() ◄────────┘
//! ```
//!
//! While playing, the playhead advances by `dt * frame_rate` every tick. The
//! playhead is kept as a float so the fractional remainder carries across
//! ticks and playback speed does not depend on the render tick rate.
//!
//! Reaching `total_frames` either holds at the last frame and stops
//! ([`PlaybackEnd::Hold`]) or wraps to frame 0 ([`PlaybackEnd::Loop`]).

use reel_core::{
    EvaluationGate, Frame, PlaybackEnd, ReelError, Result, TimelineSettings, validate_frame,
};
use serde::{Deserialize, Serialize};

/// Mutually exclusive transport states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Scrubbing,
}

/// A frame range playback can be confined to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopRegion {
    pub start: Frame,
    pub end: Frame,
    /// When false the region is only a selection aid and playback ignores it.
    pub looping: bool,
}

impl LoopRegion {
    #[inline]
    #[must_use]
    pub fn contains(&self, frame: f32) -> bool {
        frame >= self.start as f32 && frame <= self.end as f32
    }
}

/// Frames kept between the playhead and the edge of the visible range when
/// the view follows playback.
const FOLLOW_MARGIN: Frame = 10;

#[derive(Debug, Clone)]
pub struct TimelineClock {
    settings: TimelineSettings,

    state: PlaybackState,
    playhead: f32,
    total_frames: Frame,
    dragging_keyframe: bool,

    zoom: f32,
    timeline_start: Frame,
    region: Option<LoopRegion>,

    evaluation_requested: bool,
}

impl TimelineClock {
    #[must_use]
    pub fn new(settings: TimelineSettings) -> Self {
        let settings = settings.sanitized();
        let total_frames = settings.total_frames;
        Self {
            settings,
            state: PlaybackState::Stopped,
            playhead: 0.0,
            total_frames,
            dragging_keyframe: false,
            zoom: 1.0,
            timeline_start: 0,
            region: None,
            evaluation_requested: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn set_frame_rate(&mut self, frame_rate: f32) {
        self.settings.set_frame_rate(frame_rate);
    }

    pub fn set_end_behavior(&mut self, end: PlaybackEnd) {
        self.settings.end_behavior = end;
    }

    // ========================================================================
    // State accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    #[inline]
    #[must_use]
    pub fn is_scrubbing(&self) -> bool {
        self.state == PlaybackState::Scrubbing
    }

    #[inline]
    #[must_use]
    pub fn is_dragging_keyframe(&self) -> bool {
        self.dragging_keyframe
    }

    /// Integer frame under the playhead.
    #[inline]
    #[must_use]
    pub fn current_frame(&self) -> Frame {
        self.playhead.floor() as Frame
    }

    /// Playhead including the fractional part accumulated during playback.
    #[inline]
    #[must_use]
    pub fn playhead(&self) -> f32 {
        self.playhead
    }

    /// Frame keyframes are sampled at: the fractional playhead while playing,
    /// the integer frame otherwise.
    #[inline]
    #[must_use]
    pub fn evaluation_frame(&self) -> f32 {
        if self.is_playing() {
            self.playhead
        } else {
            self.current_frame() as f32
        }
    }

    #[inline]
    #[must_use]
    pub fn total_frames(&self) -> Frame {
        self.total_frames
    }

    // ========================================================================
    // Evaluation gating
    // ========================================================================

    /// Playing or scrubbing.
    #[inline]
    #[must_use]
    pub fn should_evaluate(&self) -> bool {
        self.is_playing() || self.is_scrubbing()
    }

    /// Playing, scrubbing or dragging a keyframe.
    #[inline]
    #[must_use]
    pub fn should_evaluate_with_drag(&self) -> bool {
        self.should_evaluate() || self.dragging_keyframe
    }

    /// Applies the configured [`EvaluationGate`].
    #[must_use]
    pub fn should_evaluate_gated(&self) -> bool {
        match self.settings.evaluation_gate {
            EvaluationGate::PlaybackOrScrub => self.should_evaluate(),
            EvaluationGate::PlaybackScrubOrDrag => self.should_evaluate_with_drag(),
        }
    }

    /// Returns and clears the one-shot request raised by seeking while stopped.
    pub fn take_evaluation_request(&mut self) -> bool {
        std::mem::take(&mut self.evaluation_requested)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// `Stopped`/`Scrubbing` → `Playing`. Starting at the end of a holding
    /// timeline rewinds to frame 0 first.
    pub fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        if self.settings.end_behavior == PlaybackEnd::Hold
            && self.playhead >= self.total_frames as f32
        {
            self.playhead = 0.0;
        }
        self.state = PlaybackState::Playing;
        log::debug!("Playback started at frame {}", self.current_frame());
    }

    /// Pauses playback, keeping the playhead where it is.
    pub fn stop(&mut self) {
        if self.is_playing() {
            log::debug!("Playback stopped at frame {}", self.current_frame());
        }
        self.state = PlaybackState::Stopped;
    }

    pub fn toggle_playback(&mut self) {
        if self.is_playing() {
            self.stop();
        } else {
            self.play();
        }
    }

    /// Any state → `Scrubbing`.
    pub fn begin_scrub(&mut self) {
        self.state = PlaybackState::Scrubbing;
    }

    /// Moves the playhead to `frame`, clamped to the timeline.
    pub fn scrub(&mut self, frame: i64) -> Result<()> {
        self.seek(frame)
    }

    /// `Scrubbing` → `Stopped`. No-op in other states.
    pub fn end_scrub(&mut self) {
        if self.is_scrubbing() {
            self.state = PlaybackState::Stopped;
        }
    }

    /// Jumps to `frame` (clamped to `[0, total_frames]`) without changing
    /// state, and requests a one-shot evaluation.
    pub fn seek(&mut self, frame: i64) -> Result<()> {
        let frame = validate_frame(frame)?;
        self.playhead = frame.min(self.total_frames) as f32;
        self.evaluation_requested = true;
        self.follow_playhead();
        Ok(())
    }

    /// Moves the playhead by `delta` frames, clamping at both ends.
    pub fn step(&mut self, delta: i64) {
        let target = (i64::from(self.current_frame()) + delta).clamp(0, i64::from(self.total_frames));
        self.playhead = target as f32;
        self.evaluation_requested = true;
        self.follow_playhead();
    }

    /// Back to frame 0 and `Stopped`. Used when the editing context changes.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Stopped;
        self.playhead = 0.0;
        self.dragging_keyframe = false;
        self.timeline_start = 0;
        self.evaluation_requested = true;
    }

    pub fn set_dragging_keyframe(&mut self, dragging: bool) {
        self.dragging_keyframe = dragging;
    }

    /// Sets the timeline length. The playhead is pulled back inside if needed.
    pub fn set_total_frames(&mut self, total: i64) -> Result<()> {
        let total = validate_frame(total)?;
        self.total_frames = total;
        if self.playhead > total as f32 {
            self.playhead = total as f32;
        }
        if let Some(region) = &mut self.region {
            region.end = region.end.min(total);
            region.start = region.start.min(region.end);
        }
        Ok(())
    }

    /// Grows the timeline when `last_keyframe` lies past the end, if
    /// auto-extension is enabled. Returns `true` if the length changed.
    pub fn fit_to_keyframe(&mut self, last_keyframe: Frame) -> bool {
        if !self.settings.auto_extend_total_frames || last_keyframe <= self.total_frames {
            return false;
        }
        self.total_frames = last_keyframe.saturating_add(self.settings.total_frames_padding);
        log::debug!("Timeline extended to {} frames", self.total_frames);
        true
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Advances the playhead by `dt` seconds while playing.
    pub fn advance(&mut self, dt: f32) {
        if !self.is_playing() {
            return;
        }
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Ignoring invalid tick delta {dt}");
            return;
        }

        self.playhead = (self.playhead + dt * self.settings.frame_rate).max(0.0);

        let total = self.total_frames as f32;
        match self.region {
            Some(region) if region.looping => {
                if !region.contains(self.playhead) {
                    self.playhead = region.start as f32;
                }
            }
            _ => match self.settings.end_behavior {
                PlaybackEnd::Hold => {
                    if self.playhead >= total {
                        self.playhead = total;
                        self.state = PlaybackState::Stopped;
                        // last tick sees Stopped; the final frame still needs a pass
                        self.evaluation_requested = true;
                        log::debug!("Playback reached the end at frame {}", self.total_frames);
                    }
                }
                PlaybackEnd::Loop => {
                    if self.playhead > total {
                        self.playhead = if total > 0.0 { self.playhead % total } else { 0.0 };
                    }
                }
            },
        }

        self.follow_playhead();
    }

    // ========================================================================
    // Loop region
    // ========================================================================

    pub fn set_loop_region(&mut self, start: i64, end: i64, looping: bool) -> Result<()> {
        let a = validate_frame(start)?;
        let b = validate_frame(end)?;
        let (start, end) = (a.min(b), a.max(b));
        if end > self.total_frames {
            return Err(ReelError::InvalidFrame {
                frame: i64::from(end),
            });
        }
        self.region = Some(LoopRegion {
            start,
            end,
            looping,
        });
        Ok(())
    }

    pub fn clear_loop_region(&mut self) {
        self.region = None;
    }

    #[inline]
    #[must_use]
    pub fn loop_region(&self) -> Option<LoopRegion> {
        self.region
    }

    // ========================================================================
    // View
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Sets the zoom factor, clamped to the configured range. Non-positive or
    /// non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if !zoom.is_finite() || zoom <= 0.0 {
            log::warn!("Ignoring invalid zoom {zoom}");
            return;
        }
        self.zoom = self.settings.clamp_zoom(zoom);
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.set_zoom(self.zoom * factor);
    }

    /// Number of frames visible at the current zoom.
    #[must_use]
    pub fn visible_frames(&self) -> Frame {
        ((self.settings.frames_per_view_at_unit_zoom / self.zoom).floor() as Frame).max(1)
    }

    /// First frame of the visible range.
    #[inline]
    #[must_use]
    pub fn timeline_start(&self) -> Frame {
        self.timeline_start
    }

    pub fn set_timeline_start(&mut self, start: Frame) {
        self.timeline_start = start.min(self.total_frames);
    }

    /// Scrolls the visible range so the playhead stays a few frames away
    /// from either edge.
    fn follow_playhead(&mut self) {
        let frame = self.current_frame();
        let visible = self.visible_frames();
        if frame + FOLLOW_MARGIN > self.timeline_start + visible {
            let start = (frame + FOLLOW_MARGIN).saturating_sub(visible);
            self.timeline_start = start.min(self.total_frames.saturating_sub(visible));
        } else if frame < self.timeline_start + FOLLOW_MARGIN {
            self.timeline_start = frame.saturating_sub(FOLLOW_MARGIN);
        }
    }
}

impl Default for TimelineClock {
    fn default() -> Self {
        Self::new(TimelineSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_follows_playhead() {
        let mut clock = TimelineClock::default();
        assert_eq!(clock.visible_frames(), 95);

        clock.seek(200).unwrap();
        // 200 + 10 - 95
        assert_eq!(clock.timeline_start(), 115);

        clock.seek(50).unwrap();
        assert_eq!(clock.timeline_start(), 40);
    }

    #[test]
    fn test_visible_frames_never_zero() {
        let mut clock = TimelineClock::new(TimelineSettings {
            max_zoom: 1000.0,
            ..Default::default()
        });
        clock.set_zoom(500.0);
        assert_eq!(clock.visible_frames(), 1);
    }

    #[test]
    fn test_hold_stop_requests_final_evaluation() {
        let mut clock = TimelineClock::new(TimelineSettings {
            total_frames: 100,
            ..Default::default()
        });
        clock.play();
        clock.advance(3.0);
        assert!(clock.is_playing());
        assert!(!clock.take_evaluation_request());

        clock.advance(1.0);
        assert!(!clock.is_playing());
        assert_eq!(clock.current_frame(), 100);
        assert!(clock.take_evaluation_request());
        assert!(!clock.take_evaluation_request());
    }

    #[test]
    fn test_playhead_never_negative() {
        let mut clock = TimelineClock::default();
        clock.settings.frame_rate = -30.0;
        clock.play();
        for _ in 0..10 {
            clock.advance(1.0);
            assert!(clock.playhead() >= 0.0);
        }
        assert_eq!(clock.current_frame(), 0);
    }
}
