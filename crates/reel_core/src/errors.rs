//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`ReelError`] covers every failure mode of the
//! animation core:
//! - Rejected edits (negative frames, unknown channel names)
//! - Broken hierarchies found while resolving poses
//! - References to objects that were deleted in the meantime
//! - Project persistence failures
//!
//! # Propagation
//!
//! Editing calls return [`Result<T>`] so the caller can decide how to
//! present a rejected edit. The per-frame tick path never returns an error:
//! structural problems and stale references are logged and skipped so a
//! broken animation cannot stop playback.
//!
//! ```rust,ignore
//! use reel_core::errors::{ReelError, Result};
//!
//! fn edit() -> Result<()> {
//!     let frame = reel_core::validate_frame(-1)?; // ReelError::InvalidFrame
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::ids::ObjectId;

/// The main error type for the Reel engine.
#[derive(Error, Debug)]
pub enum ReelError {
    // ========================================================================
    // Editing Errors
    // ========================================================================
    /// A frame index outside `0..=u32::MAX` was passed to a track or the clock.
    #[error("Invalid frame index: {frame}")]
    InvalidFrame {
        /// The rejected frame index
        frame: i64,
    },

    /// The channel name is not one of the nine transform channels or `alpha`,
    /// or the object cannot animate it.
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),

    // ========================================================================
    // Hierarchy Errors
    // ========================================================================
    /// A cycle, a self-parent or a dangling parent/child link.
    #[error("Structural error at object {object}: {reason}")]
    StructuralError {
        /// The object where traversal stopped
        object: ObjectId,
        /// Description of the inconsistency
        reason: String,
    },

    /// The object was deleted between frames.
    #[error("Stale object reference: {0}")]
    StaleReference(ObjectId),

    // ========================================================================
    // Persistence Errors
    // ========================================================================
    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReelError {
    /// Returns `true` for errors the tick path absorbs instead of reporting.
    #[must_use]
    pub fn is_tick_recoverable(&self) -> bool {
        matches!(self, Self::StructuralError { .. } | Self::StaleReference(_))
    }
}

/// Alias for `Result<T, ReelError>`.
pub type Result<T> = std::result::Result<T, ReelError>;
