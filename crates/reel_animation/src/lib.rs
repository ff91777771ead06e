//! Reel Animation
//!
//! Time-varying channel data and the clock that drives it:
//!
//! - [`Easing`]: the fixed set of shaping functions between keyframes
//! - [`Keyframe`] / [`KeyframeTrack`]: sparse, frame-ordered scalar tracks
//!   with clamped, eased evaluation
//! - [`Channel`] / [`ChannelSet`]: the ten animatable channels of an object
//! - [`TimelineClock`]: the Stopped / Playing / Scrubbing state machine
//! - [`MarkerList`]: labelled timeline positions

pub mod channel;
pub mod channel_set;
pub mod clock;
pub mod easing;
pub mod keyframe;
pub mod marker;
pub mod track;

pub use channel::{Channel, ChannelGroup};
pub use channel_set::ChannelSet;
pub use clock::{LoopRegion, PlaybackState, TimelineClock};
pub use easing::{Easing, lerp};
pub use keyframe::{Keyframe, KeyframeRecord};
pub use marker::{Marker, MarkerColor, MarkerList};
pub use track::{KeyframeCursor, KeyframeTrack};
