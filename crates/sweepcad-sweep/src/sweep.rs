//! Orchestration: sample the path, pick profiles, transport, assemble.

use serde::{Deserialize, Serialize};
use sweepcad_math::Point3;
use sweepcad_profile::{CrossSectionSample, CrossSectionSpec, ProfileError};
use sweepcad_tessellate::{assemble, Mesh};

use crate::{FrameState, SweepError, SweepNode, SweepPath};

/// Sampling density of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCount {
    /// Number of rings along the path; at least 2.
    pub sweep_line: usize,
    /// Number of points per ring; at least 3.
    pub cross_section: usize,
}

impl Default for SampleCount {
    fn default() -> Self {
        Self {
            sweep_line: 32,
            cross_section: 32,
        }
    }
}

/// Sub-interval of the path to generate, as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    /// Start fraction in `[0, 1]`.
    pub start: f64,
    /// End fraction in `[start, 1]`.
    pub end: f64,
}

impl SweepRange {
    /// The whole path.
    pub const FULL: SweepRange = SweepRange {
        start: 0.0,
        end: 1.0,
    };

    fn is_valid(&self) -> bool {
        0.0 <= self.start && self.start <= self.end && self.end <= 1.0
    }
}

/// Everything needed to generate one swept solid.
pub struct SweepSpec<'a> {
    /// The path to sweep along.
    pub sweep_line: &'a dyn SweepPath,
    /// Profile keyframes; any order, sorted by position internally.
    pub cross_sections: Vec<&'a dyn CrossSectionSpec>,
    /// Sampling density.
    pub sample_count: SampleCount,
    /// Optional sub-interval; the whole path when `None`.
    pub range: Option<SweepRange>,
}

/// Walks the position-sorted keyframes in increasing path order.
struct KeyframeCursor<'a> {
    keyframes: &'a [CrossSectionSample],
    index: usize,
}

impl<'a> KeyframeCursor<'a> {
    fn new(keyframes: &'a [CrossSectionSample]) -> Self {
        Self {
            keyframes,
            index: 0,
        }
    }

    /// Profile at `per`. Must be called with non-decreasing `per`.
    fn profile_at(&mut self, per: f64) -> Result<CrossSectionSample, ProfileError> {
        while self.index + 1 < self.keyframes.len() && self.keyframes[self.index + 1].position <= per {
            self.index += 1;
        }
        let last = &self.keyframes[self.index];
        match self.keyframes.get(self.index + 1) {
            None => Ok(last.clone()),
            Some(next) => {
                let span = next.position - last.position;
                let t = if span == 0.0 {
                    0.0
                } else {
                    ((per - last.position) / span).clamp(0.0, 1.0)
                };
                CrossSectionSample::interpolate(last, next, t)
            }
        }
    }
}

/// Compute the transported 3D rings of a sweep, in path order.
///
/// Grid samples sit at fractions `i / (n - 1)`. With a range, only grid
/// samples inside `[start, end]` are kept, and a boundary that falls strictly
/// between two grid samples gets an extra ring evaluated exactly there. An
/// empty range (`start == end`) yields a single ring. Boundary rings never
/// advance the frame transport, which is committed at every grid sample, kept
/// or not.
///
/// The transport starts facing `+Z`. A path that starts out heading along
/// `-Z` has no unique rotation from there, so its first frames stay at the
/// identity and the rings wind clockwise about the path: the mesh comes out
/// inside-out with a negative signed volume.
pub fn sweep_rings(spec: &SweepSpec<'_>) -> Result<Vec<Vec<Point3>>, SweepError> {
    let SampleCount {
        sweep_line: n,
        cross_section: k,
    } = spec.sample_count;
    if n < 2 {
        return Err(SweepError::TooFewPathSamples(n));
    }
    if k < 3 {
        return Err(SweepError::TooFewProfileSamples(k));
    }
    if spec.cross_sections.is_empty() {
        return Err(SweepError::NoCrossSections);
    }
    let range = spec.range.unwrap_or(SweepRange::FULL);
    if !range.is_valid() {
        return Err(SweepError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }

    let mut keyframes: Vec<CrossSectionSample> = spec
        .cross_sections
        .iter()
        .map(|&section| CrossSectionSample::from_section(section, k))
        .collect();
    if let Some(bad) = keyframes.iter().find(|s| s.points.len() != k) {
        return Err(ProfileError::PointCountMismatch {
            left: k,
            right: bad.points.len(),
        }
        .into());
    }
    keyframes.sort_by(|a, b| a.position.total_cmp(&b.position));
    let mut cursor = KeyframeCursor::new(&keyframes);

    let nodes = spec.sweep_line.sample(n);
    let mut frame = FrameState::default();
    let mut rings = Vec::with_capacity(n + 2);
    let mut previous_per = None;
    let boundaries = [
        Some(range.start),
        (range.end != range.start).then_some(range.end),
    ];

    for (i, node) in nodes.iter().enumerate() {
        let per = i as f64 / (n - 1) as f64;

        if let Some(prev) = previous_per {
            for boundary in boundaries.into_iter().flatten() {
                if prev < boundary && boundary < per {
                    let boundary_node = spec.sweep_line.sample_point(boundary);
                    let profile = cursor.profile_at(boundary)?;
                    rings.push(transport(&frame, &boundary_node, &profile).0);
                }
            }
        }

        let profile = cursor.profile_at(per)?;
        let (ring, next) = transport(&frame, node, &profile);
        frame = next;
        if range.start <= per && per <= range.end {
            rings.push(ring);
        }
        previous_per = Some(per);
    }

    Ok(rings)
}

fn transport(
    frame: &FrameState,
    node: &SweepNode,
    profile: &CrossSectionSample,
) -> (Vec<Point3>, FrameState) {
    let (transform, next) = frame.step(&node.position, &node.direction, profile.angle, profile.scale);
    let ring = profile
        .points
        .iter()
        .map(|p| transform.apply_point2(p))
        .collect();
    (ring, next)
}

/// Generate the closed mesh of a swept solid.
///
/// Either returns a complete mesh or fails on a malformed sweep description;
/// there is no partial output.
pub fn perform_object_sweep(spec: &SweepSpec<'_>) -> Result<Mesh, SweepError> {
    let rings = sweep_rings(spec)?;
    let mesh = assemble(&rings)?;
    log::debug!(
        "swept {} keyframes into {} rings: {} triangles",
        spec.cross_sections.len(),
        rings.len(),
        mesh.num_triangles()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SweepLine;
    use approx::assert_relative_eq;
    use sweepcad_profile::CrossSection;

    fn column() -> SweepLine {
        SweepLine::straight(Point3::origin(), Point3::new(0.0, 0.0, 10.0))
    }

    fn spec<'a>(
        line: &'a SweepLine,
        sections: Vec<&'a dyn CrossSectionSpec>,
        sweep_line: usize,
        cross_section: usize,
    ) -> SweepSpec<'a> {
        SweepSpec {
            sweep_line: line,
            cross_sections: sections,
            sample_count: SampleCount {
                sweep_line,
                cross_section,
            },
            range: None,
        }
    }

    #[test]
    fn test_cylinder() {
        let line = column();
        let circle = CrossSection::circle(1.0, 8);
        let spec = spec(&line, vec![&circle], 10, 8);

        let rings = sweep_rings(&spec).unwrap();
        assert_eq!(rings.len(), 10);
        for ring in &rings {
            let z = ring[0].z;
            for p in ring {
                assert_relative_eq!(p.z, z, epsilon = 1e-12);
                assert_relative_eq!(p.x.hypot(p.y), 1.0, epsilon = 1e-9);
            }
        }
        assert_relative_eq!(rings[9][0].z, 10.0, epsilon = 1e-12);

        let mesh = perform_object_sweep(&spec).unwrap();
        assert_eq!(mesh.num_vertices(), 10 * 8 + 2 * 8);
        assert_eq!(mesh.num_triangles(), 2 * 8 * 9 + 2 * 6);
        // Regular octagon of circumradius 1: area 2 * sqrt(2).
        assert_relative_eq!(mesh.signed_volume(), 20.0 * 2.0f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_scale_keyframes_interpolate() {
        let line = column();
        let small = CrossSection::rectangle(2.0, 1.0);
        let large = CrossSection::rectangle(2.0, 1.0)
            .with_position(1.0)
            .unwrap()
            .with_scale(2.0)
            .unwrap();
        // Deliberately out of order.
        let spec = spec(&line, vec![&large, &small], 3, 12);

        let rings = sweep_rings(&spec).unwrap();
        assert_eq!(rings.len(), 3);
        for (base, mid) in rings[0].iter().zip(&rings[1]) {
            assert_relative_eq!(
                mid.x.hypot(mid.y),
                1.5 * base.x.hypot(base.y),
                epsilon = 1e-12
            );
        }
        for (base, end) in rings[0].iter().zip(&rings[2]) {
            assert_relative_eq!(end.x, 2.0 * base.x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_range_on_grid() {
        let line = column();
        let square = CrossSection::rectangle(1.0, 1.0);
        let mut spec = spec(&line, vec![&square], 5, 4);
        spec.range = Some(SweepRange {
            start: 0.25,
            end: 0.75,
        });
        let rings = sweep_rings(&spec).unwrap();
        let heights: Vec<f64> = rings.iter().map(|r| r[0].z).collect();
        assert_eq!(heights.len(), 3);
        assert_relative_eq!(heights[0], 2.5, epsilon = 1e-12);
        assert_relative_eq!(heights[1], 5.0, epsilon = 1e-12);
        assert_relative_eq!(heights[2], 7.5, epsilon = 1e-12);
    }

    #[test]
    fn test_range_between_grid_samples() {
        let line = column();
        let square = CrossSection::rectangle(1.0, 1.0);
        let mut spec = spec(&line, vec![&square], 5, 4);
        spec.range = Some(SweepRange {
            start: 0.3,
            end: 0.7,
        });
        let mesh = perform_object_sweep(&spec).unwrap();
        // Boundary rings at 0.3 and 0.7 around the grid ring at 0.5.
        assert_eq!(mesh.num_vertices(), 3 * 4 + 2 * 4);
        assert_relative_eq!(mesh.points[0].z, 3.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.points[mesh.points.len() - 1].z, 7.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.signed_volume(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_range_between_grid_samples() {
        let line = column();
        let square = CrossSection::rectangle(1.0, 1.0);
        let mut spec = spec(&line, vec![&square], 5, 4);
        spec.range = Some(SweepRange {
            start: 0.3,
            end: 0.3,
        });
        let rings = sweep_rings(&spec).unwrap();
        assert_eq!(rings.len(), 1);
        assert_relative_eq!(rings[0][0].z, 3.0, epsilon = 1e-12);

        let mesh = perform_object_sweep(&spec).unwrap();
        assert_eq!(mesh.num_triangles(), 2 * (4 - 2));
        assert_relative_eq!(mesh.signed_volume(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_downward_path_is_inside_out() {
        let line = SweepLine::straight(Point3::new(0.0, 0.0, 10.0), Point3::origin());
        let square = CrossSection::rectangle(1.0, 1.0);
        let spec = spec(&line, vec![&square], 5, 4);

        let rings = sweep_rings(&spec).unwrap();
        let profile = square.normalize(4);
        // Anti-parallel to the initial +Z: the frame never rotates.
        for ring in &rings {
            for (p, q) in ring.iter().zip(&profile) {
                assert_relative_eq!(p.x, q.x, epsilon = 1e-12);
                assert_relative_eq!(p.y, q.y, epsilon = 1e-12);
            }
        }
        let mesh = perform_object_sweep(&spec).unwrap();
        assert_relative_eq!(mesh.signed_volume(), -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_range_boundary_keeps_frames() {
        let line = SweepLine::through(&[
            Point3::origin(),
            Point3::new(0.0, 0.0, 4.0),
            Point3::new(0.0, 4.0, 8.0),
        ])
        .unwrap();
        let square = CrossSection::rectangle(1.0, 1.0);
        let full = spec(&line, vec![&square], 9, 4);
        let mut ranged = spec(&line, vec![&square], 9, 4);
        ranged.range = Some(SweepRange {
            start: 0.3,
            end: 1.0,
        });
        let all = sweep_rings(&full).unwrap();
        let part = sweep_rings(&ranged).unwrap();
        // One boundary ring, then grid samples 3..=8 unchanged.
        assert_eq!(part.len(), 1 + 6);
        assert_eq!(&part[1..], &all[3..]);
    }

    #[test]
    fn test_validation() {
        let line = column();
        let square = CrossSection::rectangle(1.0, 1.0);
        assert!(matches!(
            sweep_rings(&spec(&line, vec![&square], 1, 4)),
            Err(SweepError::TooFewPathSamples(1))
        ));
        assert!(matches!(
            sweep_rings(&spec(&line, vec![&square], 4, 2)),
            Err(SweepError::TooFewProfileSamples(2))
        ));
        assert!(matches!(
            sweep_rings(&spec(&line, Vec::new(), 4, 4)),
            Err(SweepError::NoCrossSections)
        ));
        let mut bad = spec(&line, vec![&square], 4, 4);
        bad.range = Some(SweepRange {
            start: 0.8,
            end: 0.2,
        });
        assert!(matches!(
            perform_object_sweep(&bad),
            Err(SweepError::InvalidRange { .. })
        ));
    }
}
