//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`TransmuteError`] covers all failure modes including:
//! - Skeleton lookups and anchor validation
//! - Clip metadata that cannot be sampled
//! - Tolerance settings that are not finite
//! - Pose sampling failures raised by the host
//!
//! Bones that have no counterpart in the target skeleton are *not* errors.
//! They are reported as diagnostic data on [`BoneMap`](crate::retarget::BoneMap).
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, TransmuteError>`.
//!
//! ```rust,ignore
//! use rig_transmute::errors::{TransmuteError, Result};
//!
//! fn retarget_all() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::scene::BoneId;

/// The main error type for the retargeting pipeline.
#[derive(Error, Debug)]
pub enum TransmuteError {
    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// The bone id does not belong to the skeleton it was used with.
    #[error("Bone not found: {0:?}")]
    BoneNotFound(BoneId),

    /// An anchor bone is not the skeleton root or one of its descendants.
    #[error("Anchor bone '{bone}' is not part of skeleton '{skeleton}'")]
    AnchorOutsideSkeleton {
        /// Name of the offending anchor
        bone: String,
        /// Name of the skeleton it was checked against
        skeleton: String,
    },

    /// The bone map has no entries, so there is nothing to retarget.
    #[error("Bone map is empty")]
    EmptyBoneMap,

    // ========================================================================
    // Clip Errors
    // ========================================================================
    /// The clip frame rate is zero, negative or not finite.
    #[error("Invalid frame rate {frame_rate} for clip '{clip}'")]
    InvalidFrameRate {
        /// Clip name
        clip: String,
        /// The rejected frame rate
        frame_rate: f32,
    },

    /// The clip duration is negative or not finite.
    #[error("Invalid duration {duration}s for clip '{clip}'")]
    InvalidDuration {
        /// Clip name
        clip: String,
        /// The rejected duration in seconds
        duration: f32,
    },

    // ========================================================================
    // Settings Errors
    // ========================================================================
    /// A tolerance is NaN or infinite.
    #[error("Invalid {name} accuracy: {value}")]
    InvalidAccuracy {
        /// Which tolerance ("position" or "rotation")
        name: &'static str,
        /// The rejected value
        value: f32,
    },

    // ========================================================================
    // Sampling Errors
    // ========================================================================
    /// The pose sampler could not evaluate the clip.
    #[error("Pose sampling failed for clip '{clip}' at {time}s: {reason}")]
    SamplingFailed {
        /// Clip name
        clip: String,
        /// Sample time in seconds
        time: f32,
        /// Host-provided description
        reason: String,
    },

    /// The sampled pose lacks a donor bone that the bone map refers to.
    #[error("Sampled pose for clip '{clip}' has no transform for bone '{bone}'")]
    MissingPoseBone {
        /// Clip name
        clip: String,
        /// Donor bone name
        bone: String,
    },

    // ========================================================================
    // Batch Errors
    // ========================================================================
    /// A clip failed mid-batch. Clips before `index` keep their changes,
    /// clips from `index` onward are untouched.
    #[error("Retargeting clip '{clip}' (#{index}) failed: {source}")]
    ClipFailed {
        /// Name of the failing clip
        clip: String,
        /// Position of the failing clip in the batch
        index: usize,
        /// Underlying failure
        #[source]
        source: Box<TransmuteError>,
    },
}

/// Alias for `Result<T, TransmuteError>`.
pub type Result<T> = std::result::Result<T, TransmuteError>;
