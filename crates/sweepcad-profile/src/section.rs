//! The editable cross-section: a closed ring of 2D segments.

use std::f64::consts::TAU;

use sweepcad_curve::{Chain, EditError, Segment, SegmentId};
use sweepcad_math::{cross_2d, signed_area, Point2};

use crate::cache::NormalizeCache;
use crate::{ProfileError, Result};

/// Minimum number of segments in a closed ring.
const MIN_SEGMENTS: usize = 2;

/// A closed 2D profile with its authored sweep attributes.
///
/// The ring always closes (`last.next == first`) and shared vertices agree.
/// Every structural edit bumps [`version`](Self::version), which invalidates
/// the memoized [`normalize`](Self::normalize) results.
#[derive(Debug, Clone)]
pub struct CrossSection {
    ring: Chain<2>,
    angle: f64,
    scale: f64,
    position: f64,
    version: u64,
    cache: NormalizeCache,
}

impl CrossSection {
    /// Build a closed ring from segments in order.
    ///
    /// Each segment's start is snapped onto the previous segment's end, and
    /// the first start onto the last end.
    pub fn new(segments: Vec<Segment<2>>) -> Result<Self> {
        if segments.len() < MIN_SEGMENTS {
            return Err(ProfileError::TooFewSegments(segments.len()));
        }
        Ok(Self {
            ring: Chain::new(segments, true),
            angle: 0.0,
            scale: 1.0,
            position: 0.0,
            version: 0,
            cache: NormalizeCache::default(),
        })
    }

    /// Axis-aligned rectangle centered on the origin, counter-clockwise.
    pub fn rectangle(width: f64, height: f64) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let corners = [
            Point2::new(-hw, -hh),
            Point2::new(hw, -hh),
            Point2::new(hw, hh),
            Point2::new(-hw, hh),
        ];
        Self::from_ring(
            (0..4)
                .map(|i| Segment::straight(corners[i], corners[(i + 1) % 4]))
                .collect(),
        )
    }

    /// Circle of `radius` centered on the origin, made of `n_arcs` arcs.
    ///
    /// At least two arcs are used.
    pub fn circle(radius: f64, n_arcs: usize) -> Self {
        let n = n_arcs.max(MIN_SEGMENTS);
        let at = |theta: f64| Point2::new(radius * theta.cos(), radius * theta.sin());
        let segments = (0..n)
            .map(|i| {
                let start = TAU * i as f64 / n as f64;
                let mid = TAU * (i as f64 + 0.5) / n as f64;
                let end = TAU * ((i + 1) % n) as f64 / n as f64;
                Segment::arc(at(start), at(mid), at(end))
            })
            .collect();
        Self::from_ring(segments)
    }

    /// Closed polygon through `points`.
    pub fn polygon(points: &[Point2]) -> Result<Self> {
        let n = points.len();
        Self::new(
            (0..n)
                .map(|i| Segment::straight(points[i], points[(i + 1) % n]))
                .collect(),
        )
    }

    fn from_ring(segments: Vec<Segment<2>>) -> Self {
        Self {
            ring: Chain::new(segments, true),
            angle: 0.0,
            scale: 1.0,
            position: 0.0,
            version: 0,
            cache: NormalizeCache::default(),
        }
    }

    /// This profile rotated by `angle` radians about its local origin.
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// This profile with a different scale.
    pub fn with_scale(mut self, scale: f64) -> Result<Self> {
        self.set_scale(scale)?;
        Ok(self)
    }

    /// This profile placed at a different sweep position.
    pub fn with_position(mut self, position: f64) -> Result<Self> {
        self.set_position(position)?;
        Ok(self)
    }

    /// Rotation about the local origin, in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Set the rotation about the local origin.
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
    }

    /// Uniform scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale factor. Must be finite and non-negative.
    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        if !scale.is_finite() || scale < 0.0 {
            return Err(ProfileError::InvalidScale(scale));
        }
        self.scale = scale;
        Ok(())
    }

    /// Fraction along the sweep line where this profile applies.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Set the sweep position. Must lie in `[0, 1]`.
    pub fn set_position(&mut self, position: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&position) {
            return Err(ProfileError::PositionOutOfRange(position));
        }
        self.position = position;
        Ok(())
    }

    /// Edit counter; changes whenever the ring geometry changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of segments in the ring.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Always false; a ring keeps at least two segments.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Segment ids in ring order.
    pub fn ids(&self) -> &[SegmentId] {
        self.ring.ids()
    }

    /// Segments in ring order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment<2>> + '_ {
        self.ring.segments()
    }

    /// The segment stored under `id`.
    pub fn segment(&self, id: SegmentId) -> Option<&Segment<2>> {
        self.ring.get(id)
    }

    /// The underlying ring, for link queries.
    pub fn ring(&self) -> &Chain<2> {
        &self.ring
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Insert a vertex at `point` by splitting the nearest segment.
    ///
    /// Returns the id of the new segment that ends at `point`.
    pub fn add_point(&mut self, point: Point2) -> std::result::Result<SegmentId, EditError> {
        let (nearest, _) = self
            .ring
            .closest(&point)
            .ok_or(EditError::UnknownSegment)?;
        let (first, _) = self.ring.split(nearest, point)?;
        self.touch();
        Ok(first)
    }

    /// Remove the vertex at the start of `id` by merging `id` into its
    /// predecessor. Refuses when only two segments remain.
    pub fn delete_segment(&mut self, id: SegmentId) -> std::result::Result<(), EditError> {
        self.ring.merge_with_previous(id, MIN_SEGMENTS)?;
        self.touch();
        Ok(())
    }

    /// Swap `old` for `segment`, keeping the ring closed.
    ///
    /// The new segment's endpoints are snapped onto the old ones. Returns the
    /// id of the inserted segment.
    pub fn replace_segment(
        &mut self,
        old: SegmentId,
        segment: Segment<2>,
    ) -> std::result::Result<SegmentId, EditError> {
        let id = self.ring.replace(old, segment)?;
        self.touch();
        Ok(id)
    }

    /// Move the vertex at the start of `id`.
    pub fn move_vertex(&mut self, id: SegmentId, p: Point2) -> std::result::Result<(), EditError> {
        self.ring.move_vertex(id, p)?;
        self.touch();
        Ok(())
    }

    /// Approximate the ring by exactly `point_count` points in
    /// counter-clockwise order.
    ///
    /// Segment `i` of `m` is given the points up to the cumulative target
    /// `round((i + 1) / m * point_count)`, sampled uniformly in its parameter
    /// without its end point. Results are memoized per version.
    pub fn normalize(&self, point_count: usize) -> Vec<Point2> {
        self.cache
            .get_or_insert_with(self.version, point_count, || self.polygon_points(point_count))
    }

    fn polygon_points(&self, point_count: usize) -> Vec<Point2> {
        let m = self.ring.len();
        let mut points = Vec::with_capacity(point_count);
        let mut allotted = 0;
        for (i, segment) in self.ring.segments().enumerate() {
            let target = ((i + 1) as f64 / m as f64 * point_count as f64).round() as usize;
            let count = target.saturating_sub(allotted);
            points.extend(segment.approximate(count, true));
            allotted = allotted.max(target);
        }
        make_counter_clockwise(&mut points);
        points
    }
}

/// Reverse `points` in place, keeping the first point first, if the ring
/// winds clockwise.
///
/// The winding is read from the turn at the leftmost (then topmost) vertex,
/// which always lies on the convex hull. A degenerate turn there falls back
/// to the sign of the shoelace area.
fn make_counter_clockwise(points: &mut [Point2]) {
    let n = points.len();
    if n < 3 {
        return;
    }
    let corner = (0..n)
        .min_by(|&a, &b| {
            points[a]
                .x
                .total_cmp(&points[b].x)
                .then(points[b].y.total_cmp(&points[a].y))
        })
        .unwrap_or(0);
    let prev = points[(corner + n - 1) % n];
    let next = points[(corner + 1) % n];
    let turn = cross_2d(&(points[corner] - prev), &(next - points[corner]));
    let clockwise = if turn != 0.0 {
        turn < 0.0
    } else {
        log::trace!("flat turn at extreme vertex, using signed area for winding");
        signed_area(points) < 0.0
    };
    if clockwise {
        points[1..].reverse();
    }
}
