//! Reel Core
//!
//! Foundational types shared by every Reel crate:
//!
//! - [`errors`]: the [`ReelError`] taxonomy and the crate-wide [`Result`] alias
//! - [`ids`]: [`ObjectId`], [`ObjectGuid`], [`Frame`] and frame validation
//! - [`settings`]: [`TimelineSettings`] configuration

pub mod errors;
pub mod ids;
pub mod settings;

pub use errors::{ReelError, Result};
pub use ids::{Frame, IdAllocator, ObjectGuid, ObjectId, validate_frame};
pub use settings::{EvaluationGate, PlaybackEnd, TimelineSettings};
