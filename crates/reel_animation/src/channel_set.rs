use glam::Vec3;
use reel_core::Frame;
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::track::KeyframeTrack;

/// The ten channel tracks of one scene object.
///
/// Every track starts empty and only grows through explicit insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ChannelSetRecord", into = "ChannelSetRecord")]
pub struct ChannelSet {
    tracks: [KeyframeTrack; Channel::COUNT],
}

impl ChannelSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn track(&self, channel: Channel) -> &KeyframeTrack {
        &self.tracks[channel.index()]
    }

    #[inline]
    pub fn track_mut(&mut self, channel: Channel) -> &mut KeyframeTrack {
        &mut self.tracks[channel.index()]
    }

    /// `(channel, track)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &KeyframeTrack)> {
        Channel::ALL.into_iter().zip(self.tracks.iter())
    }

    /// True if any channel holds a keyframe.
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.tracks.iter().any(KeyframeTrack::has_any)
    }

    /// True if any of the given channels holds a keyframe.
    #[must_use]
    pub fn any_of(&self, channels: &[Channel]) -> bool {
        channels.iter().any(|&c| self.track(c).has_any())
    }

    /// Channels that currently hold keyframes.
    pub fn animated_channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.iter().filter(|(_, t)| t.has_any()).map(|(c, _)| c)
    }

    /// Latest keyframe frame across all channels.
    #[must_use]
    pub fn max_frame(&self) -> Option<Frame> {
        self.tracks.iter().filter_map(KeyframeTrack::max_frame).max()
    }

    /// Total keyframe count across all channels.
    #[must_use]
    pub fn keyframe_count(&self) -> usize {
        self.tracks.iter().map(KeyframeTrack::len).sum()
    }

    /// Evaluates one channel, or returns `base` when the channel is unanimated.
    #[inline]
    #[must_use]
    pub fn sample(&self, channel: Channel, frame: f32, base: f32) -> f32 {
        self.track(channel).sample_or(frame, base)
    }

    /// Evaluates three channels as a vector, each falling back to the
    /// matching component of `base`.
    #[must_use]
    pub fn sample_vec3(&self, channels: [Channel; 3], frame: f32, base: Vec3) -> Vec3 {
        Vec3::new(
            self.sample(channels[0], frame, base.x),
            self.sample(channels[1], frame, base.y),
            self.sample(channels[2], frame, base.z),
        )
    }

    pub fn clear(&mut self) {
        for track in &mut self.tracks {
            track.clear();
        }
    }
}

/// Persisted layout: one named list per channel. Unanimated channels are
/// written as empty lists, and missing ones load as empty.
#[derive(Serialize, Deserialize)]
#[serde(default)]
struct ChannelSetRecord {
    #[serde(rename = "position.x")]
    position_x: KeyframeTrack,
    #[serde(rename = "position.y")]
    position_y: KeyframeTrack,
    #[serde(rename = "position.z")]
    position_z: KeyframeTrack,
    #[serde(rename = "rotation.x")]
    rotation_x: KeyframeTrack,
    #[serde(rename = "rotation.y")]
    rotation_y: KeyframeTrack,
    #[serde(rename = "rotation.z")]
    rotation_z: KeyframeTrack,
    #[serde(rename = "scale.x")]
    scale_x: KeyframeTrack,
    #[serde(rename = "scale.y")]
    scale_y: KeyframeTrack,
    #[serde(rename = "scale.z")]
    scale_z: KeyframeTrack,
    alpha: KeyframeTrack,
}

impl Default for ChannelSetRecord {
    fn default() -> Self {
        ChannelSet::default().into()
    }
}

impl From<ChannelSet> for ChannelSetRecord {
    fn from(set: ChannelSet) -> Self {
        let [
            position_x,
            position_y,
            position_z,
            rotation_x,
            rotation_y,
            rotation_z,
            scale_x,
            scale_y,
            scale_z,
            alpha,
        ] = set.tracks;
        Self {
            position_x,
            position_y,
            position_z,
            rotation_x,
            rotation_y,
            rotation_z,
            scale_x,
            scale_y,
            scale_z,
            alpha,
        }
    }
}

impl From<ChannelSetRecord> for ChannelSet {
    fn from(r: ChannelSetRecord) -> Self {
        Self {
            tracks: [
                r.position_x,
                r.position_y,
                r.position_z,
                r.rotation_x,
                r.rotation_y,
                r.rotation_z,
                r.scale_x,
                r.scale_y,
                r.scale_z,
                r.alpha,
            ],
        }
    }
}
