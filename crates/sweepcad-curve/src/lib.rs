#![warn(missing_docs)]

//! Parametric segments for the sweepcad kernel.
//!
//! A [`Segment`] is a straight line, a cubic Bézier, or a circular arc through
//! three points, generic over dimension so the same code serves 2D profile
//! outlines and 3D sweep paths. Segments are chained through a
//! [`SegmentArena`] whose explicit previous/next links keep shared vertices
//! in sync while editing.

mod arc;
mod bezier;
mod chain;
mod segment;

pub use bezier::LUT_SAMPLES;
pub use chain::{Chain, SegmentArena, SegmentId};
pub use segment::{Handle, HandleId, Projection, Segment, SegmentKind, SpacingParams};

use thiserror::Error;

/// Errors from structural edits on linked segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The segment id is not (or no longer) part of the chain.
    #[error("unknown segment")]
    UnknownSegment,
    /// The edit would leave fewer segments than the chain requires.
    #[error("chain has {len} segments, at least {min} must remain")]
    TooFewSegments {
        /// Current segment count.
        len: usize,
        /// Minimum allowed count.
        min: usize,
    },
    /// The segment has no linked predecessor to merge with.
    #[error("segment has no predecessor")]
    NoPredecessor,
}
