//! The sweep line: an open chain of 3D Bézier segments.

use serde::{Deserialize, Serialize};
use sweepcad_curve::{Chain, EditError, Segment, SegmentId, SegmentKind, SpacingParams};
use sweepcad_math::{Point3, Vec3};

use crate::SweepError;

/// One sample along the sweep line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepNode {
    /// Point on the path.
    pub position: Point3,
    /// Raw (unnormalized) tangent at that point.
    pub direction: Vec3,
}

/// Anything a profile can be swept along.
pub trait SweepPath {
    /// Exactly `count` nodes at evenly spaced path fractions `i / (count - 1)`.
    fn sample(&self, count: usize) -> Vec<SweepNode>;

    /// The node at path fraction `per` in `[0, 1]`, using the same
    /// parameterization as [`sample`](Self::sample).
    fn sample_point(&self, per: f64) -> SweepNode;
}

/// An open chain of cubic Béziers.
///
/// The global fraction `per` maps to segment `floor(per * m)` of `m`, so each
/// segment spans an equal share of the parameter range regardless of its
/// length.
#[derive(Debug, Clone)]
pub struct SweepLine {
    chain: Chain<3>,
}

impl SweepLine {
    /// Chain `segments` into a sweep line.
    ///
    /// Segments that are not Béziers are converted to an equivalent Bézier
    /// with the same endpoints and end tangents.
    pub fn new(segments: Vec<Segment<3>>) -> Result<Self, SweepError> {
        if segments.is_empty() {
            return Err(SweepError::EmptySweepLine);
        }
        let segments = segments
            .into_iter()
            .map(|s| s.to_kind(SegmentKind::Bezier));
        Ok(Self {
            chain: Chain::new(segments, false),
        })
    }

    /// A single straight Bézier from `start` to `end`.
    pub fn straight(start: Point3, end: Point3) -> Self {
        Self {
            chain: Chain::new([Segment::straight_bezier(start, end)], false),
        }
    }

    /// A polyline of straight Béziers through `points`.
    pub fn through(points: &[Point3]) -> Result<Self, SweepError> {
        Self::new(
            points
                .windows(2)
                .map(|w| Segment::straight_bezier(w[0], w[1]))
                .collect(),
        )
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false; a sweep line has at least one segment.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Segment ids in path order.
    pub fn ids(&self) -> &[SegmentId] {
        self.chain.ids()
    }

    /// Segments in path order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment<3>> + '_ {
        self.chain.segments()
    }

    /// The underlying chain, for link queries.
    pub fn chain(&self) -> &Chain<3> {
        &self.chain
    }

    /// Approximate path length.
    pub fn length(&self) -> f64 {
        self.segments().map(Segment::length).sum()
    }

    /// Insert a vertex at `point` by splitting the nearest segment.
    ///
    /// Returns the id of the new segment ending at `point`.
    pub fn add_point(&mut self, point: Point3) -> Result<SegmentId, EditError> {
        let (nearest, _) = self
            .chain
            .closest(&point)
            .ok_or(EditError::UnknownSegment)?;
        Ok(self.chain.split(nearest, point)?.0)
    }

    /// Remove the vertex at the start of `id` by merging it into its
    /// predecessor. The first segment has none and cannot be deleted.
    pub fn delete_segment(&mut self, id: SegmentId) -> Result<(), EditError> {
        self.chain.merge_with_previous(id, 1)?;
        Ok(())
    }

    /// Points roughly `spacing` apart along the whole path.
    pub fn sample_spaced(&self, spacing: f64, params: SpacingParams) -> Vec<Point3> {
        let last = self.chain.len().saturating_sub(1);
        self.segments()
            .enumerate()
            .flat_map(|(i, s)| s.approximate_spaced(spacing, params, i != last))
            .collect()
    }

    /// Segment and local parameter for the global fraction `per`.
    fn locate(&self, per: f64) -> Option<(&Segment<3>, f64)> {
        let m = self.chain.len();
        let last = m.checked_sub(1)?;
        let scaled = per.clamp(0.0, 1.0) * m as f64;
        let index = (scaled.floor() as usize).min(last);
        let segment = self.chain.get(*self.chain.ids().get(index)?)?;
        Some((segment, scaled - index as f64))
    }
}

impl SweepPath for SweepLine {
    fn sample(&self, count: usize) -> Vec<SweepNode> {
        match count {
            0 => Vec::new(),
            1 => vec![self.sample_point(0.0)],
            _ => (0..count)
                .map(|i| self.sample_point(i as f64 / (count - 1) as f64))
                .collect(),
        }
    }

    fn sample_point(&self, per: f64) -> SweepNode {
        match self.locate(per) {
            Some((segment, t)) => SweepNode {
                position: segment.point_at(t),
                direction: segment.tangent_at(t),
            },
            None => SweepNode {
                position: Point3::origin(),
                direction: Vec3::z(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bent() -> SweepLine {
        SweepLine::through(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 4.0),
            Point3::new(4.0, 0.0, 4.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_is_rejected() {
        assert!(matches!(
            SweepLine::new(Vec::new()),
            Err(SweepError::EmptySweepLine)
        ));
    }

    #[test]
    fn test_non_bezier_input_is_converted() {
        let line = SweepLine::new(vec![Segment::straight(Point3::origin(), Point3::new(0.0, 3.0, 0.0))])
            .unwrap();
        assert!(line.segments().all(|s| s.kind() == SegmentKind::Bezier));
        assert_relative_eq!(line.length(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sample_count_and_shared_boundary() {
        let line = bent();
        let nodes = line.sample(5);
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0].position, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(nodes[2].position, Point3::new(0.0, 0.0, 4.0));
        assert_eq!(nodes[4].position, Point3::new(4.0, 0.0, 4.0));
        assert!(nodes[2].direction.x > 0.0);
        assert!(nodes[1].direction.z > 0.0 && nodes[1].direction.x == 0.0);
    }

    #[test]
    fn test_sample_point_matches_grid() {
        let line = bent();
        let nodes = line.sample(9);
        for (i, node) in nodes.iter().enumerate() {
            assert_eq!(*node, line.sample_point(i as f64 / 8.0));
        }
        assert_eq!(line.sample(1).len(), 1);
        assert!(line.sample(0).is_empty());
    }

    #[test]
    fn test_add_and_delete_point() {
        let mut line = SweepLine::straight(Point3::origin(), Point3::new(0.0, 0.0, 9.0));
        let id = line.add_point(Point3::new(0.0, 0.0, 3.0)).unwrap();
        assert_eq!(line.len(), 2);
        assert_relative_eq!(
            line.chain().get(id).unwrap().end(),
            Point3::new(0.0, 0.0, 3.0)
        );
        assert!(line.chain().is_consistent());

        let first = line.ids()[0];
        assert_eq!(line.delete_segment(first), Err(EditError::NoPredecessor));
        let second = line.ids()[1];
        line.delete_segment(second).unwrap();
        assert_eq!(line.len(), 1);
        assert_eq!(line.sample_point(1.0).position, Point3::new(0.0, 0.0, 9.0));
    }

    #[test]
    fn test_sample_spaced() {
        let line = bent();
        let points = line.sample_spaced(1.0, SpacingParams::default());
        assert_eq!(points.first(), Some(&Point3::origin()));
        assert_eq!(points.last(), Some(&Point3::new(4.0, 0.0, 4.0)));
        for pair in points.windows(2) {
            assert!((pair[1] - pair[0]).norm() <= 1.0 + 1e-2);
        }
    }
}
