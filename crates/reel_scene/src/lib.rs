//! Reel Scene
//!
//! The object hierarchy and the pass that turns it into renderable poses:
//!
//! - [`SceneObject`]: identity, capabilities, channel tracks and base values
//! - [`SceneRegistry`]: arena of objects keyed by id and GUID, with
//!   hierarchy edits and duplication
//! - [`PoseResolver`]: depth-first composition of anchor position and
//!   effective alpha
//! - [`ObjectRecord`]: persisted object layout

pub mod object;
pub mod record;
pub mod registry;
pub mod resolve;

pub use object::{Capabilities, LocalPose, ObjectKind, SceneObject};
pub use record::ObjectRecord;
pub use registry::{ObjectKey, SceneRegistry};
pub use resolve::{PARENT_ANCHOR, PoseResolver, PoseSource, Resolution, ResolvedPose};
