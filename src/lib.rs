//! Reel
//!
//! A keyframe animation core for 3D scene editors: sparse per-channel
//! keyframe tracks with easing, a timeline clock, and hierarchical pose
//! resolution with inherited anchor offsets and multiplicative alpha.
//!
//! The member crates are re-exported here:
//!
//! - `reel_core`: errors, identifiers, timeline settings
//! - [`animation`]: easing, tracks, channels, clock, markers
//! - [`scene`]: objects, registry, pose resolver
//!
//! [`AnimationEngine`] ties them together for a host render loop;
//! [`EditingContext`] holds editor selection and clipboard state.

pub mod editing;
pub mod engine;
pub mod project;

pub use reel_animation as animation;
pub use reel_scene as scene;

pub use editing::{EditingContext, KeyframeRef};
pub use engine::AnimationEngine;
pub use project::ProjectState;

pub use reel_animation::{
    Channel, ChannelSet, Easing, Keyframe, KeyframeTrack, LoopRegion, Marker, MarkerColor,
    MarkerList, PlaybackState, TimelineClock,
};
pub use reel_core::{
    EvaluationGate, Frame, ObjectGuid, ObjectId, PlaybackEnd, ReelError, Result, TimelineSettings,
};
pub use reel_scene::{
    Capabilities, ObjectKind, ObjectRecord, PoseResolver, PoseSource, Resolution, ResolvedPose,
    SceneObject, SceneRegistry,
};
