//! TOML description of a sweep.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use sweepcad_curve::Segment;
use sweepcad_kernel::SweepObject;
use sweepcad_math::{Point2, Point3};
use sweepcad_profile::CrossSection;
use sweepcad_sweep::{SampleCount, SweepLine, SweepRange};

/// Top-level sweep document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Sampling density; 32 x 32 when omitted.
    #[serde(default)]
    pub samples: SampleCount,
    /// Optional sub-interval of the path to generate.
    #[serde(default)]
    pub range: Option<SweepRange>,
    /// The path.
    pub sweep_line: PathConfig,
    /// Profile keyframes.
    #[serde(rename = "cross_section", default)]
    pub cross_sections: Vec<ProfileConfig>,
}

/// How the path is described.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathConfig {
    /// A straight line.
    Straight { start: Point3, end: Point3 },
    /// Straight pieces through a list of points.
    Polyline { points: Vec<Point3> },
    /// Explicit segments; non-Bézier kinds are converted.
    Segments { segments: Vec<Segment<3>> },
}

/// One profile keyframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Sweep position in `[0, 1]`.
    #[serde(default)]
    pub position: f64,
    /// Uniform scale.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Rotation about the profile origin, in radians.
    #[serde(default)]
    pub angle: f64,
    /// The outline.
    pub shape: ShapeConfig,
}

fn default_scale() -> f64 {
    1.0
}

/// Profile outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeConfig {
    /// Centered rectangle.
    Rectangle { width: f64, height: f64 },
    /// Centered circle made of arcs.
    Circle {
        radius: f64,
        #[serde(default = "default_arcs")]
        arcs: usize,
    },
    /// Closed polygon.
    Polygon { points: Vec<Point2> },
    /// Explicit closed ring of segments.
    Segments { segments: Vec<Segment<2>> },
}

fn default_arcs() -> usize {
    8
}

impl SweepConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid sweep configuration")
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Build the sweep model this document describes.
    pub fn build(&self) -> Result<SweepObject> {
        let sweep_line = match &self.sweep_line {
            PathConfig::Straight { start, end } => SweepLine::straight(*start, *end),
            PathConfig::Polyline { points } => {
                if points.len() < 2 {
                    bail!("polyline sweep line needs at least 2 points");
                }
                SweepLine::through(points)?
            }
            PathConfig::Segments { segments } => SweepLine::new(segments.clone())?,
        };

        let mut object = SweepObject::new(sweep_line).with_sample_count(self.samples);
        if let Some(range) = self.range {
            object = object.with_range(range);
        }
        for (i, profile) in self.cross_sections.iter().enumerate() {
            let section = profile
                .build()
                .with_context(|| format!("cross-section {i}"))?;
            object.add_cross_section(section);
        }
        if self.cross_sections.is_empty() {
            log::warn!("configuration has no cross-sections");
        }
        Ok(object)
    }
}

impl ProfileConfig {
    fn build(&self) -> Result<CrossSection> {
        let section = match &self.shape {
            ShapeConfig::Rectangle { width, height } => CrossSection::rectangle(*width, *height),
            ShapeConfig::Circle { radius, arcs } => CrossSection::circle(*radius, *arcs),
            ShapeConfig::Polygon { points } => CrossSection::polygon(points)?,
            ShapeConfig::Segments { segments } => CrossSection::new(segments.clone())?,
        };
        Ok(section
            .with_angle(self.angle)
            .with_scale(self.scale)?
            .with_position(self.position)?)
    }
}
