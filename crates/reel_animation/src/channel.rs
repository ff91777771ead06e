use std::fmt;
use std::str::FromStr;

use reel_core::ReelError;
use serde::{Deserialize, Serialize};

/// Which transform property a channel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelGroup {
    Position,
    Rotation,
    Scale,
    Alpha,
}

/// One independently animatable scalar attribute of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Channel {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    ScaleX,
    ScaleY,
    ScaleZ,
    Alpha,
}

impl Channel {
    pub const COUNT: usize = 10;

    /// All channels in storage order.
    pub const ALL: [Channel; Self::COUNT] = [
        Channel::PositionX,
        Channel::PositionY,
        Channel::PositionZ,
        Channel::RotationX,
        Channel::RotationY,
        Channel::RotationZ,
        Channel::ScaleX,
        Channel::ScaleY,
        Channel::ScaleZ,
        Channel::Alpha,
    ];

    pub const POSITION: [Channel; 3] = [Channel::PositionX, Channel::PositionY, Channel::PositionZ];
    pub const ROTATION: [Channel; 3] = [Channel::RotationX, Channel::RotationY, Channel::RotationZ];
    pub const SCALE: [Channel; 3] = [Channel::ScaleX, Channel::ScaleY, Channel::ScaleZ];

    /// Position of this channel in [`Channel::ALL`].
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Channel::PositionX => "position.x",
            Channel::PositionY => "position.y",
            Channel::PositionZ => "position.z",
            Channel::RotationX => "rotation.x",
            Channel::RotationY => "rotation.y",
            Channel::RotationZ => "rotation.z",
            Channel::ScaleX => "scale.x",
            Channel::ScaleY => "scale.y",
            Channel::ScaleZ => "scale.z",
            Channel::Alpha => "alpha",
        }
    }

    #[must_use]
    pub fn group(self) -> ChannelGroup {
        match self {
            Channel::PositionX | Channel::PositionY | Channel::PositionZ => ChannelGroup::Position,
            Channel::RotationX | Channel::RotationY | Channel::RotationZ => ChannelGroup::Rotation,
            Channel::ScaleX | Channel::ScaleY | Channel::ScaleZ => ChannelGroup::Scale,
            Channel::Alpha => ChannelGroup::Alpha,
        }
    }

    /// Value of an untouched object: 1 for scale and alpha, 0 otherwise.
    #[must_use]
    pub fn default_value(self) -> f32 {
        match self.group() {
            ChannelGroup::Scale | ChannelGroup::Alpha => 1.0,
            ChannelGroup::Position | ChannelGroup::Rotation => 0.0,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = ReelError;

    /// Parses a channel name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReelError::InvalidChannel(s.to_owned()))
    }
}

impl TryFrom<String> for Channel {
    type Error = ReelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.name().to_owned()
    }
}
