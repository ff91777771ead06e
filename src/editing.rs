//! Editing Context
//!
//! Selection, clipboard and keyframe-drag state of the editor, passed
//! explicitly to every editing call instead of living in a global.
//!
//! All operations act on an [`AnimationEngine`] and follow the same rules as
//! the engine's own editing surface: deleted objects are skipped with a
//! debug log, channels an object cannot animate are skipped, and frames
//! outside `[0, total_frames]` are never written.

use std::collections::BTreeSet;

use reel_animation::{Channel, Easing, Keyframe, KeyframeTrack};
use reel_core::{Frame, ObjectId, ReelError, Result, validate_frame};

use crate::engine::AnimationEngine;

/// Identifies one keyframe in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyframeRef {
    pub object: ObjectId,
    pub channel: Channel,
    pub frame: Frame,
}

impl KeyframeRef {
    #[must_use]
    pub fn new(object: ObjectId, channel: Channel, frame: Frame) -> Self {
        Self {
            object,
            channel,
            frame,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClipboardEntry {
    channel: Channel,
    frame: Frame,
    value: f32,
}

#[derive(Debug, Clone)]
struct Clipboard {
    entries: Vec<ClipboardEntry>,
    /// Earliest copied frame; pasting places it on the target frame.
    base_frame: Frame,
    /// A cut clipboard is emptied by the first paste.
    cut: bool,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    anchor: KeyframeRef,
    offset: i64,
}

#[derive(Debug, Default)]
pub struct EditingContext {
    selected_object: Option<ObjectId>,
    selection: BTreeSet<KeyframeRef>,
    clipboard: Option<Clipboard>,
    drag: Option<DragState>,
}

impl EditingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Changes the selected object. Switching to a different object drops
    /// the keyframe selection and any drag in progress.
    pub fn select_object(&mut self, engine: &mut AnimationEngine, object: Option<ObjectId>) {
        if self.selected_object == object {
            return;
        }
        self.selected_object = object;
        self.selection.clear();
        self.cancel_drag(engine);
    }

    #[inline]
    #[must_use]
    pub fn selected_object(&self) -> Option<ObjectId> {
        self.selected_object
    }

    /// Selected keyframes in object, channel, frame order.
    pub fn selected_keyframes(&self) -> impl Iterator<Item = &KeyframeRef> {
        self.selection.iter()
    }

    #[must_use]
    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    #[must_use]
    pub fn is_selected(&self, key: &KeyframeRef) -> bool {
        self.selection.contains(key)
    }

    /// Selects `key`. Without `additive` the previous selection is replaced.
    pub fn select_keyframe(&mut self, key: KeyframeRef, additive: bool) {
        if !additive {
            self.selection.clear();
        }
        self.selection.insert(key);
    }

    pub fn deselect_keyframe(&mut self, key: &KeyframeRef) -> bool {
        self.selection.remove(key)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selects every keyframe of the selected object in `[start, end]`
    /// (either order). Stops playback.
    pub fn select_in_range(&mut self, engine: &mut AnimationEngine, start: i64, end: i64) -> Result<usize> {
        let a = validate_frame(start)?;
        let b = validate_frame(end)?;
        let (lo, hi) = (a.min(b), a.max(b));
        Ok(self.select_where(engine, |frame| frame >= lo && frame <= hi))
    }

    /// Selects every keyframe of the selected object before the playhead.
    pub fn select_before_marker(&mut self, engine: &mut AnimationEngine) -> usize {
        let current = engine.current_frame();
        self.select_where(engine, |frame| frame < current)
    }

    /// Selects every keyframe of the selected object after the playhead.
    pub fn select_after_marker(&mut self, engine: &mut AnimationEngine) -> usize {
        let current = engine.current_frame();
        self.select_where(engine, |frame| frame > current)
    }

    /// Selects keyframes inside the active loop region. Does nothing when no
    /// region is set.
    pub fn select_in_loop_region(&mut self, engine: &mut AnimationEngine) -> usize {
        let Some(region) = engine.clock.loop_region() else {
            return 0;
        };
        self.select_where(engine, |frame| frame >= region.start && frame <= region.end)
    }

    /// Selects the first keyframe of every animated channel.
    pub fn select_first_keyframes(&mut self, engine: &mut AnimationEngine) -> usize {
        self.select_per_channel(engine, |track| track.first().map(|k| k.frame))
    }

    /// Selects the last keyframe of every animated channel.
    pub fn select_last_keyframes(&mut self, engine: &mut AnimationEngine) -> usize {
        self.select_per_channel(engine, |track| track.last().map(|k| k.frame))
    }

    fn select_where(&mut self, engine: &mut AnimationEngine, keep: impl Fn(Frame) -> bool) -> usize {
        engine.stop();
        self.selection.clear();
        let Some(obj) = self.selected_object.and_then(|id| engine.scene.get(id)) else {
            return 0;
        };
        for (channel, track) in obj.channels.iter() {
            for key in track.iter().filter(|k| keep(k.frame)) {
                self.selection.insert(KeyframeRef::new(obj.id(), channel, key.frame));
            }
        }
        self.selection.len()
    }

    fn select_per_channel(
        &mut self,
        engine: &mut AnimationEngine,
        pick: impl Fn(&KeyframeTrack) -> Option<Frame>,
    ) -> usize {
        engine.stop();
        self.selection.clear();
        let Some(obj) = self.selected_object.and_then(|id| engine.scene.get(id)) else {
            return 0;
        };
        for (channel, track) in obj.channels.iter() {
            if let Some(frame) = pick(track) {
                self.selection.insert(KeyframeRef::new(obj.id(), channel, frame));
            }
        }
        self.selection.len()
    }

    // ========================================================================
    // Keying
    // ========================================================================

    /// Keys the selected object's current values at the playhead.
    ///
    /// An object without any keyframes gets a key on every channel it can
    /// animate; otherwise only channels that are already animated are keyed.
    /// New keys inherit the easing of their predecessor. The new keys become
    /// the selection. Returns the number of keys written.
    pub fn key_current_pose(&mut self, engine: &mut AnimationEngine) -> usize {
        let Some(id) = self.selected_object else {
            return 0;
        };
        let frame = engine.current_frame();
        let Some(obj) = engine.scene.get_mut(id) else {
            log::debug!("Ignoring key on deleted object {id}");
            return 0;
        };

        let channels: Vec<Channel> = if obj.has_keyframes() {
            obj.channels.animated_channels().collect()
        } else {
            Channel::ALL.to_vec()
        };

        self.selection.clear();
        for channel in channels {
            if !obj.supports(channel) {
                continue;
            }
            let value = obj.base_value(channel);
            let easing = obj.channels.track(channel).easing_before(frame);
            obj.channels
                .track_mut(channel)
                .upsert(Keyframe::new(frame, value, easing));
            self.selection.insert(KeyframeRef::new(id, channel, frame));
        }
        engine.clock.fit_to_keyframe(frame);
        self.selection.len()
    }

    // ========================================================================
    // Bulk edits
    // ========================================================================

    /// Deletes every selected keyframe. Returns how many were removed.
    pub fn delete_selected(&mut self, engine: &mut AnimationEngine) -> usize {
        let mut removed = 0;
        for key in std::mem::take(&mut self.selection) {
            if let Some(obj) = engine.scene.get_mut(key.object)
                && obj.channels.track_mut(key.channel).remove(key.frame).is_some()
            {
                removed += 1;
            }
        }
        removed
    }

    /// Changes the easing of every selected keyframe.
    pub fn set_easing_for_selected(&mut self, engine: &mut AnimationEngine, easing: Easing) -> usize {
        self.selection
            .iter()
            .filter(|key| {
                engine
                    .scene
                    .get_mut(key.object)
                    .is_some_and(|o| o.channels.track_mut(key.channel).set_easing(key.frame, easing))
            })
            .count()
    }

    /// Moves the selection by `offset` frames as a group. The offset is
    /// clamped so no keyframe leaves `[0, total_frames]`; a keyframe landing
    /// on an occupied frame takes the nearest free one instead. Moved
    /// keyframes inherit the easing of their new predecessor. Returns the
    /// number of keyframes moved.
    pub fn move_selected(&mut self, engine: &mut AnimationEngine, offset: i64) -> usize {
        let offset = self.clamp_offset(engine, offset);
        if offset == 0 || self.selection.is_empty() {
            return 0;
        }
        let total = engine.total_frames();

        let mut moved = BTreeSet::new();
        let mut pending: Vec<(KeyframeRef, f32)> = Vec::with_capacity(self.selection.len());
        for key in &self.selection {
            let Some(obj) = engine.scene.get_mut(key.object) else {
                continue;
            };
            if let Some(removed) = obj.channels.track_mut(key.channel).remove(key.frame) {
                pending.push((*key, removed.value));
            }
        }

        for (key, value) in pending {
            let Some(obj) = engine.scene.get_mut(key.object) else {
                continue;
            };
            let track = obj.channels.track_mut(key.channel);
            let wanted = (i64::from(key.frame) + offset).clamp(0, i64::from(total)) as Frame;
            let target = if track.get(wanted).is_some() {
                track.nearest_free_frame(wanted, total)
            } else {
                wanted
            };
            let easing = track.easing_before(target);
            track.upsert(Keyframe::new(target, value, easing));
            moved.insert(KeyframeRef::new(key.object, key.channel, target));
        }

        let count = moved.len();
        self.selection = moved;
        count
    }

    fn clamp_offset(&self, engine: &AnimationEngine, offset: i64) -> i64 {
        let (Some(first), Some(last)) = (
            self.selection.iter().map(|k| k.frame).min(),
            self.selection.iter().map(|k| k.frame).max(),
        ) else {
            return 0;
        };
        let lowest = -i64::from(first);
        let highest = i64::from(engine.total_frames()) - i64::from(last);
        offset.clamp(lowest, highest.max(lowest))
    }

    // ========================================================================
    // Clipboard
    // ========================================================================

    /// Copies the selected keyframes. Returns how many were copied.
    pub fn copy_selected(&mut self, engine: &AnimationEngine) -> usize {
        self.fill_clipboard(engine, false)
    }

    /// Copies the selected keyframes and deletes them. The next paste
    /// consumes the clipboard.
    pub fn cut_selected(&mut self, engine: &mut AnimationEngine) -> usize {
        let copied = self.fill_clipboard(engine, true);
        if copied > 0 {
            self.delete_selected(engine);
        }
        copied
    }

    #[must_use]
    pub fn has_clipboard(&self) -> bool {
        self.clipboard.as_ref().is_some_and(|c| !c.entries.is_empty())
    }

    fn fill_clipboard(&mut self, engine: &AnimationEngine, cut: bool) -> usize {
        let Some(base_frame) = self.selection.iter().map(|k| k.frame).min() else {
            return 0;
        };
        let entries: Vec<ClipboardEntry> = self
            .selection
            .iter()
            .filter_map(|key| {
                let obj = engine.scene.get(key.object)?;
                let keyframe = obj.channels.track(key.channel).get(key.frame)?;
                Some(ClipboardEntry {
                    channel: key.channel,
                    frame: key.frame,
                    value: keyframe.value,
                })
            })
            .collect();
        let count = entries.len();
        self.clipboard = Some(Clipboard {
            entries,
            base_frame,
            cut,
        });
        count
    }

    /// Pastes the clipboard onto the selected object so the earliest copied
    /// keyframe lands on `frame`. Keyframes that would fall outside
    /// `[0, total_frames]` or on a channel the object cannot animate are
    /// skipped. The pasted keyframes become the selection.
    pub fn paste_at(&mut self, engine: &mut AnimationEngine, frame: i64) -> Result<usize> {
        let target = validate_frame(frame)?;
        let Some(clipboard) = self.clipboard.as_ref() else {
            return Ok(0);
        };
        let Some(id) = self.selected_object else {
            return Ok(0);
        };
        let total = engine.total_frames();
        let obj = match engine.scene.object_mut(id) {
            Ok(obj) => obj,
            Err(err) => {
                log::debug!("Ignoring paste: {err}");
                return Ok(0);
            }
        };

        let offset = i64::from(target) - i64::from(clipboard.base_frame);
        self.selection.clear();
        for entry in &clipboard.entries {
            let Ok(new_frame) = Frame::try_from(i64::from(entry.frame) + offset) else {
                continue;
            };
            if new_frame > total || !obj.supports(entry.channel) {
                continue;
            }
            let track = obj.channels.track_mut(entry.channel);
            let easing = track.easing_before(new_frame);
            track.upsert(Keyframe::new(new_frame, entry.value, easing));
            self.selection.insert(KeyframeRef::new(id, entry.channel, new_frame));
        }

        if clipboard.cut {
            self.clipboard = None;
        }
        Ok(self.selection.len())
    }

    // ========================================================================
    // Keyframe drag
    // ========================================================================

    /// Starts dragging the selection, anchored at `anchor`. An unselected
    /// anchor replaces the selection. Sets the clock's drag overlay.
    pub fn begin_drag(&mut self, engine: &mut AnimationEngine, anchor: KeyframeRef) -> Result<()> {
        let exists = engine
            .scene
            .object(anchor.object)?
            .channels
            .track(anchor.channel)
            .get(anchor.frame)
            .is_some();
        if !exists {
            return Err(ReelError::InvalidFrame {
                frame: i64::from(anchor.frame),
            });
        }
        if !self.selection.contains(&anchor) {
            self.select_keyframe(anchor, false);
        }
        self.drag = Some(DragState { anchor, offset: 0 });
        engine.clock.set_dragging_keyframe(true);
        Ok(())
    }

    /// Updates the pending drag offset and moves the playhead onto the
    /// anchor's preview frame. Returns the clamped offset.
    pub fn drag_to(&mut self, engine: &mut AnimationEngine, offset: i64) -> Result<i64> {
        let clamped = self.clamp_offset(engine, offset);
        let Some(drag) = self.drag.as_mut() else {
            return Ok(0);
        };
        drag.offset = clamped;
        engine.clock.seek(i64::from(drag.anchor.frame) + clamped)?;
        Ok(clamped)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Frame `key` would land on if the drag ended now, ignoring collisions.
    #[must_use]
    pub fn preview_frame(&self, key: &KeyframeRef) -> Option<Frame> {
        let drag = self.drag?;
        if !self.selection.contains(key) {
            return None;
        }
        Frame::try_from(i64::from(key.frame) + drag.offset).ok()
    }

    /// Applies the drag and clears the overlay. Returns the number of
    /// keyframes moved.
    pub fn end_drag(&mut self, engine: &mut AnimationEngine) -> usize {
        let Some(drag) = self.drag.take() else {
            return 0;
        };
        engine.clock.set_dragging_keyframe(false);
        self.move_selected(engine, drag.offset)
    }

    /// Drops the drag without moving anything.
    pub fn cancel_drag(&mut self, engine: &mut AnimationEngine) {
        if self.drag.take().is_some() {
            engine.clock.set_dragging_keyframe(false);
        }
    }
}
