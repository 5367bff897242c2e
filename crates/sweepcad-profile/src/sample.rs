//! Immutable profile snapshots and keyframe interpolation.

use serde::{Deserialize, Serialize};
use sweepcad_math::{lerp, lerp_point, Point2};

use crate::{CrossSection, ProfileError, Result};

/// Anything the sweep can read a profile from.
pub trait CrossSectionSpec {
    /// The outline as exactly `point_count` counter-clockwise points.
    fn sample(&self, point_count: usize) -> Vec<Point2>;

    /// Fraction along the sweep line where this profile applies, in `[0, 1]`.
    fn position(&self) -> f64;

    /// Uniform scale factor, non-negative.
    fn scale(&self) -> f64;

    /// Rotation about the local origin, in radians.
    fn angle(&self) -> f64;
}

impl CrossSectionSpec for CrossSection {
    fn sample(&self, point_count: usize) -> Vec<Point2> {
        self.normalize(point_count)
    }

    fn position(&self) -> f64 {
        CrossSection::position(self)
    }

    fn scale(&self) -> f64 {
        CrossSection::scale(self)
    }

    fn angle(&self) -> f64 {
        CrossSection::angle(self)
    }
}

/// A sampled profile, detached from the editable ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionSample {
    /// Outline points, counter-clockwise.
    pub points: Vec<Point2>,
    /// Rotation about the local origin, in radians.
    pub angle: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Sweep position in `[0, 1]`.
    pub position: f64,
}

impl CrossSectionSample {
    /// Snapshot any profile source at `point_count` points.
    pub fn from_section(section: &dyn CrossSectionSpec, point_count: usize) -> Self {
        Self {
            points: section.sample(point_count),
            angle: section.angle(),
            scale: section.scale(),
            position: section.position(),
        }
    }

    /// Blend `a` and `b` as `a * (1 - t) + b * t`, field by field.
    ///
    /// `t = 0` reproduces `a` and `t = 1` reproduces `b` exactly. Both
    /// samples must have the same point count.
    pub fn interpolate(a: &Self, b: &Self, t: f64) -> Result<Self> {
        if a.points.len() != b.points.len() {
            return Err(ProfileError::PointCountMismatch {
                left: a.points.len(),
                right: b.points.len(),
            });
        }
        Ok(Self {
            points: a
                .points
                .iter()
                .zip(&b.points)
                .map(|(p, q)| lerp_point(p, q, t))
                .collect(),
            angle: lerp(a.angle, b.angle, t),
            scale: lerp(a.scale, b.scale, t),
            position: lerp(a.position, b.position, t),
        })
    }
}

impl CrossSectionSpec for CrossSectionSample {
    /// The stored points, or the closed outline resampled at equal
    /// perimeter spacing when a different count is requested.
    fn sample(&self, point_count: usize) -> Vec<Point2> {
        if point_count == self.points.len() {
            self.points.clone()
        } else {
            resample_closed(&self.points, point_count)
        }
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn angle(&self) -> f64 {
        self.angle
    }
}

/// `n` points at equal arc length around the closed polyline, starting at
/// its first point.
fn resample_closed(points: &[Point2], n: usize) -> Vec<Point2> {
    let m = points.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }
    let edges: Vec<f64> = (0..m)
        .map(|i| (points[(i + 1) % m] - points[i]).norm())
        .collect();
    let perimeter: f64 = edges.iter().sum();
    if perimeter == 0.0 {
        return vec![points[0]; n];
    }

    let step = perimeter / n as f64;
    let mut out = Vec::with_capacity(n);
    let mut edge = 0;
    let mut walked = 0.0;
    for i in 0..n {
        let target = i as f64 * step;
        while edge + 1 < m && walked + edges[edge] <= target {
            walked += edges[edge];
            edge += 1;
        }
        let t = if edges[edge] > 0.0 {
            ((target - walked) / edges[edge]).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(lerp_point(&points[edge], &points[(edge + 1) % m], t));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(points: Vec<Point2>, angle: f64, scale: f64, position: f64) -> CrossSectionSample {
        CrossSectionSample {
            points,
            angle,
            scale,
            position,
        }
    }

    fn tri(offset: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.1 + offset, -0.3),
            Point2::new(1.7, 0.2 + offset),
            Point2::new(-0.9, 1.3 * offset),
        ]
    }

    #[test]
    fn test_interpolate_endpoints_exact() {
        let a = sample(tri(0.0), 0.3, 1.0, 0.0);
        let b = sample(tri(0.77), -1.1, 2.9, 0.6);
        assert_eq!(CrossSectionSample::interpolate(&a, &b, 0.0).unwrap(), a);
        assert_eq!(CrossSectionSample::interpolate(&a, &b, 1.0).unwrap(), b);
    }

    #[test]
    fn test_interpolate_midpoint() {
        let a = sample(vec![Point2::new(0.0, 0.0); 3], 0.0, 1.0, 0.0);
        let b = sample(vec![Point2::new(2.0, 4.0); 3], 1.0, 2.0, 1.0);
        let mid = CrossSectionSample::interpolate(&a, &b, 0.5).unwrap();
        assert_eq!(mid.points[1], Point2::new(1.0, 2.0));
        assert_eq!((mid.angle, mid.scale, mid.position), (0.5, 1.5, 0.5));
    }

    #[test]
    fn test_interpolate_point_count_mismatch() {
        let a = sample(tri(0.0), 0.0, 1.0, 0.0);
        let b = sample(tri(0.0)[..2].to_vec(), 0.0, 1.0, 1.0);
        assert_eq!(
            CrossSectionSample::interpolate(&a, &b, 0.5),
            Err(ProfileError::PointCountMismatch { left: 3, right: 2 })
        );
    }

    #[test]
    fn test_from_section_copies_attributes() {
        let section = CrossSection::rectangle(2.0, 2.0)
            .with_angle(0.25)
            .with_scale(3.0)
            .unwrap()
            .with_position(0.4)
            .unwrap();
        let s = CrossSectionSample::from_section(&section, 12);
        assert_eq!(s.points.len(), 12);
        assert_eq!((s.angle, s.scale, s.position), (0.25, 3.0, 0.4));
        assert_eq!(s.sample(12), s.points);
    }

    #[test]
    fn test_resample_by_perimeter() {
        let square = sample(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 2.0),
                Point2::new(0.0, 2.0),
            ],
            0.0,
            1.0,
            0.0,
        );
        let eight = square.sample(8);
        assert_eq!(eight.len(), 8);
        assert_relative_eq!(eight[1], Point2::new(1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(eight[2], Point2::new(2.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(eight[7], Point2::new(0.0, 1.0), epsilon = 1e-12);
        assert!(square.sample(0).is_empty());
    }
}
