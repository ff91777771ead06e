use reel_core::{Frame, Result, validate_frame};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::easing::{Easing, lerp};
use crate::keyframe::{Keyframe, KeyframeRecord};

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the segment used by the previous sample so that playback,
/// which moves forward a little every tick, skips the binary search.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Sparse keyframes for one scalar channel, kept sorted by frame with at
/// most one keyframe per frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<KeyframeRecord>", into = "Vec<KeyframeRecord>")]
pub struct KeyframeTrack {
    keys: SmallVec<[Keyframe; 4]>,
}

impl KeyframeTrack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a track from keyframes in any order. When two keyframes share a
    /// frame the later one in the input wins.
    pub fn from_keyframes(keys: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut track = Self::new();
        let mut repaired = 0usize;
        for key in keys {
            if track.upsert(key).is_some() {
                repaired += 1;
            }
        }
        if repaired > 0 {
            log::warn!("Repaired track: dropped {repaired} duplicate keyframe(s)");
        }
        track
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Inserts a keyframe, overwriting value and easing if one already exists
    /// at `frame`.
    pub fn insert(&mut self, frame: i64, value: f32, easing: Easing) -> Result<()> {
        let frame = validate_frame(frame)?;
        self.upsert(Keyframe::new(frame, value, easing));
        Ok(())
    }

    /// Inserts a keyframe whose easing is copied from the nearest earlier
    /// keyframe (Linear when there is none). Returns the easing used.
    pub fn insert_inheriting(&mut self, frame: i64, value: f32) -> Result<Easing> {
        let frame = validate_frame(frame)?;
        let easing = self.easing_before(frame);
        self.upsert(Keyframe::new(frame, value, easing));
        Ok(easing)
    }

    /// Places `key` in frame order. Returns the keyframe it replaced, if any.
    pub fn upsert(&mut self, key: Keyframe) -> Option<Keyframe> {
        match self.keys.binary_search_by_key(&key.frame, |k| k.frame) {
            Ok(i) => Some(std::mem::replace(&mut self.keys[i], key)),
            Err(i) => {
                self.keys.insert(i, key);
                None
            }
        }
    }

    /// Removes the keyframe at `frame`. No-op if there is none.
    pub fn remove(&mut self, frame: Frame) -> Option<Keyframe> {
        let i = self.index_of(frame)?;
        Some(self.keys.remove(i))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Changes the easing of an existing keyframe. Returns `false` if there
    /// is no keyframe at `frame`.
    pub fn set_easing(&mut self, frame: Frame, easing: Easing) -> bool {
        match self.index_of(frame) {
            Some(i) => {
                self.keys[i].easing = easing;
                true
            }
            None => false,
        }
    }

    /// Moves the keyframe at `from` to `to`. If `to` is taken by another
    /// keyframe the nearest free frame in `[0, max_frame]` is used instead,
    /// searching right before left at each distance. The moved keyframe takes
    /// the easing of its new predecessor.
    ///
    /// Returns the frame the keyframe landed on.
    pub fn move_keyframe(&mut self, from: Frame, to: Frame, max_frame: Frame) -> Option<Frame> {
        let key = self.remove(from)?;
        let target = if self.index_of(to).is_some() {
            self.nearest_free_frame(to, max_frame)
        } else {
            to
        };
        let easing = self.easing_before(target);
        self.upsert(Keyframe::new(target, key.value, easing));
        Some(target)
    }

    /// Nearest frame to `start` without a keyframe, looking right then left
    /// at increasing distances and staying inside `[0, max_frame]`. Falls back
    /// to `start` when the whole range is occupied.
    #[must_use]
    pub fn nearest_free_frame(&self, start: Frame, max_frame: Frame) -> Frame {
        for offset in 1..=max_frame {
            if let Some(right) = start.checked_add(offset)
                && right <= max_frame
                && self.index_of(right).is_none()
            {
                return right;
            }
            if let Some(left) = start.checked_sub(offset)
                && self.index_of(left).is_none()
            {
                return left;
            }
        }
        start
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// True iff the track holds at least one keyframe. An empty track is
    /// unanimated and its owner's base value is used instead.
    #[inline]
    #[must_use]
    pub fn has_any(&self) -> bool {
        !self.keys.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Keyframes in ascending frame order.
    #[inline]
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyframe> {
        self.keys.iter()
    }

    #[must_use]
    pub fn get(&self, frame: Frame) -> Option<&Keyframe> {
        self.index_of(frame).map(|i| &self.keys[i])
    }

    #[must_use]
    pub fn first(&self) -> Option<&Keyframe> {
        self.keys.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Keyframe> {
        self.keys.last()
    }

    #[must_use]
    pub fn max_frame(&self) -> Option<Frame> {
        self.keys.last().map(|k| k.frame)
    }

    /// Keyframes with `start <= frame <= end`.
    pub fn range(&self, start: Frame, end: Frame) -> impl Iterator<Item = &Keyframe> {
        let lo = self.keys.partition_point(|k| k.frame < start);
        let hi = self.keys.partition_point(|k| k.frame <= end);
        self.keys[lo..hi.max(lo)].iter()
    }

    fn index_of(&self, frame: Frame) -> Option<usize> {
        self.keys.binary_search_by_key(&frame, |k| k.frame).ok()
    }

    /// Easing of the nearest keyframe strictly before `frame`, or Linear.
    #[must_use]
    pub fn easing_before(&self, frame: Frame) -> Easing {
        let i = self.keys.partition_point(|k| k.frame < frame);
        if i == 0 {
            Easing::Linear
        } else {
            self.keys[i - 1].easing
        }
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Eased value at `frame`, or `None` for an empty track.
    ///
    /// Frames before the first keyframe or after the last one clamp to that
    /// keyframe's value. Between keyframes the outgoing easing of the earlier
    /// keyframe shapes the blend toward the later one.
    #[must_use]
    pub fn sample(&self, frame: f32) -> Option<f32> {
        let (first, last) = (self.keys.first()?, self.keys.last()?);
        if frame <= first.frame as f32 {
            return Some(first.value);
        }
        if frame >= last.frame as f32 {
            return Some(last.value);
        }

        // partition_point finds the first keyframe after `frame`, i.e. kB
        let next = self.keys.partition_point(|k| k.frame as f32 <= frame);
        Some(self.sample_segment(next - 1, frame))
    }

    /// Like [`sample`](Self::sample) but falls back to `default` when the
    /// track is empty.
    #[inline]
    #[must_use]
    pub fn sample_or(&self, frame: f32, default: f32) -> f32 {
        self.sample(frame).unwrap_or(default)
    }

    /// Sampling with cursor: checks the previously used segment and a few
    /// following ones before falling back to a binary search.
    pub fn sample_with_cursor(&self, frame: f32, cursor: &mut KeyframeCursor) -> Option<f32> {
        let (first, last) = (self.keys.first()?, self.keys.last()?);
        if frame <= first.frame as f32 {
            cursor.last_index = 0;
            return Some(first.value);
        }
        if frame >= last.frame as f32 {
            cursor.last_index = self.keys.len() - 1;
            return Some(last.value);
        }

        // Here `frame` lies strictly inside the track, so a segment exists.
        let len = self.keys.len();
        let start = cursor.last_index.min(len - 1);
        let mut found = None;
        if self.keys[start].frame as f32 <= frame {
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = start + offset;
                if idx + 1 >= len {
                    break;
                }
                if frame < self.keys[idx + 1].frame as f32 {
                    found = Some(idx);
                    break;
                }
            }
        }

        let index = found.unwrap_or_else(|| {
            // Large jump (scrubbing, loop reset): global binary search
            self.keys.partition_point(|k| k.frame as f32 <= frame) - 1
        });
        cursor.last_index = index;
        Some(self.sample_segment(index, frame))
    }

    fn sample_segment(&self, index: usize, frame: f32) -> f32 {
        let a = &self.keys[index];
        let b = &self.keys[index + 1];
        let span = (b.frame - a.frame) as f32;
        let t = ((frame - a.frame as f32) / span).clamp(0.0, 1.0);
        lerp(a.value, b.value, a.easing.apply(t))
    }
}

impl From<Vec<KeyframeRecord>> for KeyframeTrack {
    fn from(records: Vec<KeyframeRecord>) -> Self {
        Self::from_keyframes(records.into_iter().map(Keyframe::from))
    }
}

impl From<KeyframeTrack> for Vec<KeyframeRecord> {
    fn from(track: KeyframeTrack) -> Self {
        track.keys.into_iter().map(KeyframeRecord::from).collect()
    }
}
