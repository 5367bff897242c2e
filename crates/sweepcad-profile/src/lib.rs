#![warn(missing_docs)]

//! Cross-section profiles for the sweepcad kernel.
//!
//! A [`CrossSection`] is the editable form: a closed ring of 2D segments with
//! an authored angle, scale and sweep position. Generation never works on it
//! directly; it works on point snapshots obtained through
//! [`CrossSectionSpec::sample`], usually a [`CrossSectionSample`].
//!
//! # Example
//!
//! ```
//! use sweepcad_profile::{CrossSection, CrossSectionSample};
//!
//! let small = CrossSection::circle(1.0, 8);
//! let large = CrossSection::circle(1.0, 8)
//!     .with_position(1.0)
//!     .unwrap()
//!     .with_scale(2.0)
//!     .unwrap();
//!
//! let a = CrossSectionSample::from_section(&small, 16);
//! let b = CrossSectionSample::from_section(&large, 16);
//! let mid = CrossSectionSample::interpolate(&a, &b, 0.5).unwrap();
//! assert_eq!(mid.scale, 1.5);
//! ```

mod cache;
mod sample;
mod section;

pub use sample::{CrossSectionSample, CrossSectionSpec};
pub use section::CrossSection;

use sweepcad_curve::EditError;
use thiserror::Error;

/// Errors from cross-section construction and interpolation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// A closed profile needs at least two segments.
    #[error("cross-section needs at least 2 segments, got {0}")]
    TooFewSegments(usize),

    /// Scale must be finite and non-negative.
    #[error("invalid cross-section scale: {0}")]
    InvalidScale(f64),

    /// Sweep position must lie in `[0, 1]`.
    #[error("cross-section position {0} is outside [0, 1]")]
    PositionOutOfRange(f64),

    /// Interpolated samples must have the same number of points.
    #[error("cannot interpolate profiles of {left} and {right} points")]
    PointCountMismatch {
        /// Point count of the first sample.
        left: usize,
        /// Point count of the second sample.
        right: usize,
    },

    /// A structural edit on the segment ring failed.
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Result alias for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
