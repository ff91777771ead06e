use bitflags::bitflags;
use glam::Vec3;
use reel_animation::{Channel, ChannelGroup, ChannelSet, KeyframeCursor};
use reel_core::{ObjectGuid, ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectKind {
    #[default]
    Empty,
    Cube,
    Block,
    Item,
    ModelPart,
    Camera,
    PointLight,
}

bitflags! {
    /// Which channel groups an object can animate besides position.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Capabilities: u8 {
        const ROTATABLE     = 1 << 0;
        const SCALABLE      = 1 << 1;
        const ALPHA_CONTROL = 1 << 2;
    }
}

impl ObjectKind {
    #[must_use]
    pub fn capabilities(self) -> Capabilities {
        match self {
            ObjectKind::Empty
            | ObjectKind::Cube
            | ObjectKind::Block
            | ObjectKind::Item
            | ObjectKind::ModelPart => Capabilities::all(),
            ObjectKind::Camera => Capabilities::ROTATABLE,
            ObjectKind::PointLight => Capabilities::empty(),
        }
    }

    /// Whether objects of this kind may carry keyframes on `channel`.
    #[must_use]
    pub fn supports(self, channel: Channel) -> bool {
        let caps = self.capabilities();
        match channel.group() {
            ChannelGroup::Position => true,
            ChannelGroup::Rotation => caps.contains(Capabilities::ROTATABLE),
            ChannelGroup::Scale => caps.contains(Capabilities::SCALABLE),
            ChannelGroup::Alpha => caps.contains(Capabilities::ALPHA_CONTROL),
        }
    }
}

/// Evaluated local values of one object, before hierarchy composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPose {
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub alpha: f32,
}

/// One node of the scene hierarchy together with its animation data.
///
/// Base values (`target_position`, `rotation`, `scale`, `alpha`) are used
/// verbatim for channels whose track is empty.
#[derive(Debug, Clone)]
pub struct SceneObject {
    // === Identity ===
    pub(crate) id: ObjectId,
    pub(crate) guid: ObjectGuid,
    pub name: String,
    pub(crate) kind: ObjectKind,

    // === Hierarchy ===
    pub(crate) parent: Option<ObjectId>,
    pub(crate) children: Vec<ObjectId>,

    // === Animation ===
    pub channels: ChannelSet,

    // === Base pose ===
    /// Authoritative local position.
    pub target_position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub alpha: f32,
    /// Anchor adjustment handed down to children.
    pub origin_offset: Vec3,

    pub visible: bool,

    /// Last segment sampled per channel by [`apply_animation`](Self::apply_animation).
    cursors: [KeyframeCursor; Channel::COUNT],
}

impl SceneObject {
    #[must_use]
    pub fn new(id: ObjectId, kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            id,
            guid: ObjectGuid::new(),
            name: name.into(),
            kind,
            parent: None,
            children: Vec::new(),
            channels: ChannelSet::new(),
            target_position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            alpha: 1.0,
            origin_offset: Vec3::ZERO,
            visible: true,
            cursors: Default::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn guid(&self) -> ObjectGuid {
        self.guid
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn supports(&self, channel: Channel) -> bool {
        self.kind.supports(channel)
    }

    /// True if any channel holds a keyframe.
    #[inline]
    #[must_use]
    pub fn has_keyframes(&self) -> bool {
        self.channels.has_any()
    }

    /// Static value of `channel`.
    #[must_use]
    pub fn base_value(&self, channel: Channel) -> f32 {
        match channel {
            Channel::PositionX => self.target_position.x,
            Channel::PositionY => self.target_position.y,
            Channel::PositionZ => self.target_position.z,
            Channel::RotationX => self.rotation.x,
            Channel::RotationY => self.rotation.y,
            Channel::RotationZ => self.rotation.z,
            Channel::ScaleX => self.scale.x,
            Channel::ScaleY => self.scale.y,
            Channel::ScaleZ => self.scale.z,
            Channel::Alpha => self.alpha,
        }
    }

    pub fn set_base_value(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::PositionX => self.target_position.x = value,
            Channel::PositionY => self.target_position.y = value,
            Channel::PositionZ => self.target_position.z = value,
            Channel::RotationX => self.rotation.x = value,
            Channel::RotationY => self.rotation.y = value,
            Channel::RotationZ => self.rotation.z = value,
            Channel::ScaleX => self.scale.x = value,
            Channel::ScaleY => self.scale.y = value,
            Channel::ScaleZ => self.scale.z = value,
            Channel::Alpha => self.alpha = value,
        }
    }

    /// Channel value at `frame`: the track's eased value, or the base value
    /// when the track is empty or the object cannot animate the channel.
    #[must_use]
    pub fn sample(&self, channel: Channel, frame: f32) -> f32 {
        let base = self.base_value(channel);
        if self.supports(channel) {
            self.channels.sample(channel, frame, base)
        } else {
            base
        }
    }

    fn sample_vec3(&self, channels: [Channel; 3], frame: f32) -> Vec3 {
        Vec3::new(
            self.sample(channels[0], frame),
            self.sample(channels[1], frame),
            self.sample(channels[2], frame),
        )
    }

    #[must_use]
    pub fn animated_position(&self, frame: f32) -> Vec3 {
        self.sample_vec3(Channel::POSITION, frame)
    }

    #[must_use]
    pub fn animated_rotation(&self, frame: f32) -> Vec3 {
        self.sample_vec3(Channel::ROTATION, frame)
    }

    #[must_use]
    pub fn animated_scale(&self, frame: f32) -> Vec3 {
        self.sample_vec3(Channel::SCALE, frame)
    }

    #[must_use]
    pub fn animated_alpha(&self, frame: f32) -> f32 {
        self.sample(Channel::Alpha, frame)
    }

    /// All local values evaluated at `frame`.
    #[must_use]
    pub fn sample_local(&self, frame: f32) -> LocalPose {
        LocalPose {
            position: self.animated_position(frame),
            rotation: self.animated_rotation(frame),
            scale: self.animated_scale(frame),
            alpha: self.animated_alpha(frame),
        }
    }

    /// Base values only, ignoring every track.
    #[must_use]
    pub fn base_pose(&self) -> LocalPose {
        LocalPose {
            position: self.target_position,
            rotation: self.rotation,
            scale: self.scale,
            alpha: self.alpha,
        }
    }

    /// Writes the value of every animated, supported channel at `frame`
    /// into the base values, so the pose persists once evaluation stops.
    /// Returns `true` if anything was written.
    pub fn apply_animation(&mut self, frame: f32) -> bool {
        let mut applied = false;
        for channel in Channel::ALL {
            if !self.supports(channel) {
                continue;
            }
            let cursor = &mut self.cursors[channel.index()];
            if let Some(value) = self.channels.track(channel).sample_with_cursor(frame, cursor) {
                self.set_base_value(channel, value);
                applied = true;
            }
        }
        applied
    }
}
