#![warn(missing_docs)]

//! Profile sweeping for the sweepcad kernel.
//!
//! Samples a [`SweepLine`] into nodes, picks or interpolates the profile for
//! each node, carries it along with a rotation-minimizing [`FrameState`], and
//! hands the resulting rings to the mesh assembler.
//!
//! # Example
//!
//! ```
//! use sweepcad_math::Point3;
//! use sweepcad_profile::CrossSection;
//! use sweepcad_sweep::{perform_object_sweep, SampleCount, SweepLine, SweepSpec};
//!
//! let path = SweepLine::straight(Point3::origin(), Point3::new(0.0, 0.0, 10.0));
//! let profile = CrossSection::circle(1.0, 8);
//! let spec = SweepSpec {
//!     sweep_line: &path,
//!     cross_sections: vec![&profile],
//!     sample_count: SampleCount { sweep_line: 10, cross_section: 8 },
//!     range: None,
//! };
//! let mesh = perform_object_sweep(&spec).unwrap();
//! assert_eq!(mesh.num_vertices(), 10 * 8 + 2 * 8);
//! ```

mod frame;
mod path;
mod sweep;

pub use frame::FrameState;
pub use path::{SweepLine, SweepNode, SweepPath};
pub use sweep::{perform_object_sweep, sweep_rings, SampleCount, SweepRange, SweepSpec};

use sweepcad_profile::ProfileError;
use sweepcad_tessellate::TessellateError;
use thiserror::Error;

/// Errors from sweep generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    /// A sweep line needs at least one segment.
    #[error("sweep line has no segments")]
    EmptySweepLine,

    /// Fewer than two samples along the path.
    #[error("sweep line sample count must be at least 2, got {0}")]
    TooFewPathSamples(usize),

    /// Fewer than three points per profile.
    #[error("cross-section sample count must be at least 3, got {0}")]
    TooFewProfileSamples(usize),

    /// No profile keyframes were given.
    #[error("at least one cross-section is required")]
    NoCrossSections,

    /// The range is not `0 <= start <= end <= 1`.
    #[error("invalid sweep range [{start}, {end}]")]
    InvalidRange {
        /// Requested start fraction.
        start: f64,
        /// Requested end fraction.
        end: f64,
    },

    /// A profile could not be sampled or interpolated.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Mesh assembly rejected the rings.
    #[error(transparent)]
    Tessellate(#[from] TessellateError),
}
