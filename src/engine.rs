//! Engine Core Module
//!
//! This module contains [`AnimationEngine`], the facade hosts drive once per
//! rendered frame. It owns the timeline clock, the object registry, timeline
//! markers and the last resolved poses, and exposes the keyframe editing
//! surface by object id and channel name.
//!
//! # Architecture
//!
//! - **Clock**: transport state, playhead and timeline view
//! - **Scene**: arena of objects with their channel tracks
//! - **Resolver**: composes per-object poses down the hierarchy
//!
//! # Example
//!
//! ```rust,ignore
//! use reel::{AnimationEngine, ObjectKind, TimelineSettings};
//!
//! let mut engine = AnimationEngine::new(TimelineSettings::default());
//! let cube = engine.scene.spawn(ObjectKind::Cube, "Cube");
//! engine.add_keyframe(cube, "position.x", 0, 0.0)?;
//! engine.add_keyframe(cube, "position.x", 30, 4.0)?;
//!
//! engine.play();
//! loop {
//!     engine.tick(dt);
//!     for (id, pose) in &engine.poses().poses {
//!         // ... hand pose to the renderer ...
//!     }
//! }
//! ```

use glam::Vec3;
use reel_animation::{Channel, Easing, Keyframe, MarkerList, TimelineClock};
use reel_core::{Frame, ObjectId, ReelError, Result, TimelineSettings, validate_frame};
use reel_scene::{PoseResolver, PoseSource, Resolution, ResolvedPose, SceneObject, SceneRegistry};

/// The animation core: clock, objects and resolved poses.
///
/// # Lifecycle
///
/// 1. Create with [`AnimationEngine::new`] or [`AnimationEngine::default`]
/// 2. Spawn objects through [`scene`](Self::scene) and add keyframes
/// 3. Call [`tick`](Self::tick) once per rendered frame
/// 4. Read the result with [`poses`](Self::poses)
#[derive(Debug)]
pub struct AnimationEngine {
    pub clock: TimelineClock,
    pub scene: SceneRegistry,
    pub markers: MarkerList,

    resolver: PoseResolver,
    poses: Resolution,
    tick_count: u64,
}

impl AnimationEngine {
    #[must_use]
    pub fn new(settings: TimelineSettings) -> Self {
        Self {
            clock: TimelineClock::new(settings),
            scene: SceneRegistry::new(),
            markers: MarkerList::new(),
            resolver: PoseResolver::new(),
            poses: Resolution::default(),
            tick_count: 0,
        }
    }

    /// Rebuilds an engine around existing state. The timeline is grown to fit
    /// the loaded keyframes when auto-extension is enabled.
    #[must_use]
    pub fn from_parts(settings: TimelineSettings, scene: SceneRegistry, markers: MarkerList) -> Self {
        let mut engine = Self::new(settings);
        engine.scene = scene;
        engine.markers = markers;
        engine.fit_total_frames();
        engine
    }

    /// Number of ticks processed since creation.
    #[inline]
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ========================================================================
    // Keyframe editing
    // ========================================================================

    /// Adds (or overwrites) a Linear keyframe on `channel` of `object`.
    ///
    /// Unknown channel names, channels the object cannot animate and negative
    /// frames are rejected without touching any track. A deleted object is a
    /// logged no-op.
    pub fn add_keyframe(&mut self, object: ObjectId, channel: &str, frame: i64, value: f32) -> Result<()> {
        self.add_keyframe_with_easing(object, channel, frame, value, Easing::Linear)
    }

    pub fn add_keyframe_with_easing(
        &mut self,
        object: ObjectId,
        channel: &str,
        frame: i64,
        value: f32,
        easing: Easing,
    ) -> Result<()> {
        let (channel, frame) = parse_edit(channel, frame)?;
        let Some(obj) = self.scene.get_mut(object) else {
            log::debug!("Ignoring keyframe for deleted object {object}");
            return Ok(());
        };
        check_supported(obj, channel)?;

        obj.channels
            .track_mut(channel)
            .upsert(Keyframe::new(frame, value, easing));
        self.clock.fit_to_keyframe(frame);
        Ok(())
    }

    /// Removes the keyframe at `frame`. Returns `true` if one was removed.
    pub fn remove_keyframe(&mut self, object: ObjectId, channel: &str, frame: i64) -> Result<bool> {
        let (channel, frame) = parse_edit(channel, frame)?;
        let Some(obj) = self.scene.get_mut(object) else {
            log::debug!("Ignoring keyframe removal on deleted object {object}");
            return Ok(false);
        };
        Ok(obj.channels.track_mut(channel).remove(frame).is_some())
    }

    /// True if any channel of `object` is animated. False for deleted objects.
    #[must_use]
    pub fn has_keyframes(&self, object: ObjectId) -> bool {
        self.scene.get(object).is_some_and(SceneObject::has_keyframes)
    }

    /// True if `channel` of `object` is animated.
    pub fn has_channel_keyframes(&self, object: ObjectId, channel: &str) -> Result<bool> {
        let channel = channel.parse::<Channel>()?;
        Ok(self
            .scene
            .get(object)
            .is_some_and(|o| o.channels.track(channel).has_any()))
    }

    /// Grows the timeline so it covers every keyframe in the scene.
    /// Returns `true` if the length changed.
    pub fn fit_total_frames(&mut self) -> bool {
        let last = self.scene.iter().filter_map(|o| o.channels.max_frame()).max();
        last.is_some_and(|frame| self.clock.fit_to_keyframe(frame))
    }

    // ========================================================================
    // Evaluated values
    // ========================================================================

    /// Position of `object` at the current frame. `None` for deleted objects.
    #[must_use]
    pub fn animated_position(&self, object: ObjectId) -> Option<Vec3> {
        let frame = self.clock.evaluation_frame();
        self.scene.get(object).map(|o| o.animated_position(frame))
    }

    #[must_use]
    pub fn animated_rotation(&self, object: ObjectId) -> Option<Vec3> {
        let frame = self.clock.evaluation_frame();
        self.scene.get(object).map(|o| o.animated_rotation(frame))
    }

    #[must_use]
    pub fn animated_scale(&self, object: ObjectId) -> Option<Vec3> {
        let frame = self.clock.evaluation_frame();
        self.scene.get(object).map(|o| o.animated_scale(frame))
    }

    #[must_use]
    pub fn animated_alpha(&self, object: ObjectId) -> Option<f32> {
        let frame = self.clock.evaluation_frame();
        self.scene.get(object).map(|o| o.animated_alpha(frame))
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub fn play(&mut self) {
        self.clock.play();
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn begin_scrub(&mut self) {
        self.clock.begin_scrub();
    }

    pub fn scrub(&mut self, frame: i64) -> Result<()> {
        self.clock.scrub(frame)
    }

    pub fn end_scrub(&mut self) {
        self.clock.end_scrub();
    }

    pub fn set_total_frames(&mut self, total: i64) -> Result<()> {
        self.clock.set_total_frames(total)
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.clock.set_zoom(zoom);
    }

    #[inline]
    #[must_use]
    pub fn current_frame(&self) -> Frame {
        self.clock.current_frame()
    }

    #[inline]
    #[must_use]
    pub fn total_frames(&self) -> Frame {
        self.clock.total_frames()
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    #[inline]
    #[must_use]
    pub fn is_scrubbing(&self) -> bool {
        self.clock.is_scrubbing()
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Advances the clock by `dt` seconds and resolves every object.
    ///
    /// Keyframes are evaluated when the configured evaluation gate is open or
    /// a seek requested it; animated values are then written back into the
    /// objects' base values. Otherwise poses come from base values alone.
    ///
    /// Returns `true` if keyframes were evaluated. Never fails: hierarchy
    /// problems are logged and reported in [`Resolution::errors`].
    pub fn tick(&mut self, dt: f32) -> bool {
        self.tick_gated(dt, TimelineClock::should_evaluate_gated)
    }

    /// Like [`tick`](Self::tick), evaluating while playing, scrubbing or
    /// dragging a keyframe.
    pub fn tick_with_drag(&mut self, dt: f32) -> bool {
        self.tick_gated(dt, TimelineClock::should_evaluate_with_drag)
    }

    /// Like [`tick`](Self::tick), evaluating only while playing or scrubbing.
    pub fn tick_without_drag(&mut self, dt: f32) -> bool {
        self.tick_gated(dt, TimelineClock::should_evaluate)
    }

    fn tick_gated(&mut self, dt: f32, gate: fn(&TimelineClock) -> bool) -> bool {
        self.tick_count += 1;
        self.clock.advance(dt);

        let requested = self.clock.take_evaluation_request();
        let evaluate = gate(&self.clock) || requested;

        self.poses = if evaluate {
            let frame = self.clock.evaluation_frame();
            for obj in self.scene.iter_mut() {
                obj.apply_animation(frame);
            }
            self.resolver
                .resolve(&self.scene, PoseSource::Animated(frame))
        } else {
            self.resolver.resolve(&self.scene, PoseSource::Static)
        };
        debug_assert!(self.poses.errors.iter().all(ReelError::is_tick_recoverable));
        evaluate
    }

    /// Result of the last [`tick`](Self::tick).
    #[inline]
    #[must_use]
    pub fn poses(&self) -> &Resolution {
        &self.poses
    }

    #[must_use]
    pub fn pose(&self, object: ObjectId) -> Option<&ResolvedPose> {
        self.poses.get(object)
    }

    /// Resolves `root` and its subtree at the current frame without
    /// advancing the clock or writing anything back.
    pub fn resolve_subtree(&mut self, root: ObjectId) -> Resolution {
        let frame = self.clock.evaluation_frame();
        self.resolver
            .resolve_subtree(&self.scene, root, PoseSource::Animated(frame))
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Deletes `object` and its subtree. A stale id is a logged no-op.
    pub fn delete_object(&mut self, object: ObjectId) -> Vec<ObjectId> {
        match self.scene.remove(object) {
            Ok(removed) => {
                for id in &removed {
                    self.poses.poses.remove(id);
                }
                removed
            }
            Err(err) => {
                log::debug!("Ignoring delete: {err}");
                Vec::new()
            }
        }
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new(TimelineSettings::default())
    }
}

/// Validates a channel name and frame index for an edit.
pub(crate) fn parse_edit(channel: &str, frame: i64) -> Result<(Channel, Frame)> {
    let channel = channel
        .parse::<Channel>()
        .inspect_err(|err| log::warn!("Rejected keyframe edit: {err}"))?;
    let frame = validate_frame(frame).inspect_err(|err| log::warn!("Rejected keyframe edit: {err}"))?;
    Ok((channel, frame))
}

pub(crate) fn check_supported(obj: &SceneObject, channel: Channel) -> Result<()> {
    if obj.supports(channel) {
        return Ok(());
    }
    log::warn!("{:?} object {} cannot animate {channel}", obj.kind(), obj.id());
    Err(ReelError::InvalidChannel(format!(
        "{channel} is not animatable on {:?}",
        obj.kind()
    )))
}
