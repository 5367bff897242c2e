#![warn(missing_docs)]

//! High-level sweep modeling facade for sweepcad.
//!
//! Provides the [`SweepObject`] type: an editable sweep line plus profile
//! keyframes that generates a closed triangle mesh on demand.
//!
//! # Example
//!
//! ```
//! use sweepcad_kernel::SweepObject;
//! use sweepcad_profile::CrossSection;
//!
//! let rod = SweepObject::extrude(CrossSection::circle(2.0, 16), 10.0);
//! let mesh = rod.generate().unwrap();
//! assert!(mesh.signed_volume() > 0.0);
//! ```

pub use sweepcad_curve;
pub use sweepcad_math;
pub use sweepcad_profile;
pub use sweepcad_sweep;
pub use sweepcad_tessellate;

use sweepcad_math::Point3;
use sweepcad_profile::{CrossSection, CrossSectionSample, CrossSectionSpec};
use sweepcad_sweep::{
    perform_object_sweep, sweep_rings, SampleCount, SweepError, SweepLine, SweepRange, SweepSpec,
};
use sweepcad_tessellate::Mesh;

/// A swept solid under construction.
///
/// Owns the path and the profiles; every call to [`generate`](Self::generate)
/// snapshots them and runs the sweep from scratch. Profile polygons are
/// memoized inside each [`CrossSection`], so regenerating after editing one
/// profile only re-samples that profile.
#[derive(Debug, Clone)]
pub struct SweepObject {
    sweep_line: SweepLine,
    cross_sections: Vec<CrossSection>,
    sample_count: SampleCount,
    range: Option<SweepRange>,
}

impl SweepObject {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// A sweep along `sweep_line` with no profiles yet.
    pub fn new(sweep_line: SweepLine) -> Self {
        Self {
            sweep_line,
            cross_sections: Vec::new(),
            sample_count: SampleCount::default(),
            range: None,
        }
    }

    /// Straight extrusion of `profile` along `+Z` by `height`.
    pub fn extrude(profile: CrossSection, height: f64) -> Self {
        Self::new(SweepLine::straight(Point3::origin(), Point3::new(0.0, 0.0, height)))
            .with_cross_section(profile)
    }

    /// Add a profile keyframe.
    pub fn with_cross_section(mut self, profile: CrossSection) -> Self {
        self.cross_sections.push(profile);
        self
    }

    /// Use a different sampling density.
    pub fn with_sample_count(mut self, sample_count: SampleCount) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Restrict generation to a sub-interval of the path.
    pub fn with_range(mut self, range: SweepRange) -> Self {
        self.range = Some(range);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The path.
    pub fn sweep_line(&self) -> &SweepLine {
        &self.sweep_line
    }

    /// The path, for editing.
    pub fn sweep_line_mut(&mut self) -> &mut SweepLine {
        &mut self.sweep_line
    }

    /// Profile keyframes in insertion order.
    pub fn cross_sections(&self) -> &[CrossSection] {
        &self.cross_sections
    }

    /// A profile keyframe, for editing.
    pub fn cross_section_mut(&mut self, index: usize) -> Option<&mut CrossSection> {
        self.cross_sections.get_mut(index)
    }

    /// Add a profile keyframe and return its index.
    pub fn add_cross_section(&mut self, profile: CrossSection) -> usize {
        self.cross_sections.push(profile);
        self.cross_sections.len() - 1
    }

    /// Remove and return a profile keyframe.
    pub fn remove_cross_section(&mut self, index: usize) -> Option<CrossSection> {
        (index < self.cross_sections.len()).then(|| self.cross_sections.remove(index))
    }

    /// Sampling density.
    pub fn sample_count(&self) -> SampleCount {
        self.sample_count
    }

    /// Set the sampling density.
    pub fn set_sample_count(&mut self, sample_count: SampleCount) {
        self.sample_count = sample_count;
    }

    /// Generated sub-interval, if any.
    pub fn range(&self) -> Option<SweepRange> {
        self.range
    }

    /// Set or clear the generated sub-interval.
    pub fn set_range(&mut self, range: Option<SweepRange>) {
        self.range = range;
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// The sweep description borrowing this object's path and profiles.
    pub fn spec(&self) -> SweepSpec<'_> {
        SweepSpec {
            sweep_line: &self.sweep_line,
            cross_sections: self
                .cross_sections
                .iter()
                .map(|c| c as &dyn CrossSectionSpec)
                .collect(),
            sample_count: self.sample_count,
            range: self.range,
        }
    }

    /// Immutable snapshots of every profile at the configured point count.
    pub fn samples(&self) -> Vec<CrossSectionSample> {
        self.cross_sections
            .iter()
            .map(|c| CrossSectionSample::from_section(c, self.sample_count.cross_section))
            .collect()
    }

    /// The transported profile rings, in path order.
    pub fn rings(&self) -> Result<Vec<Vec<Point3>>, SweepError> {
        sweep_rings(&self.spec())
    }

    /// Generate the closed triangle mesh.
    pub fn generate(&self) -> Result<Mesh, SweepError> {
        log::debug!(
            "generating sweep: {} segments, {} profiles, {}x{} samples",
            self.sweep_line.len(),
            self.cross_sections.len(),
            self.sample_count.sweep_line,
            self.sample_count.cross_section
        );
        perform_object_sweep(&self.spec())
    }
}
