//! The segment primitive shared by cross-sections and sweep lines.

use serde::{Deserialize, Serialize};
use sweepcad_math::{lerp_point, PointN, VecN};

use crate::arc::ArcGeometry;
use crate::bezier;

/// Number of chords used to estimate the length of a Bézier segment.
const LENGTH_SAMPLES: usize = 64;

/// Upper bound on the number of points produced by a spaced approximation.
const MAX_SPACED_POINTS: usize = 100_000;

/// The kind of a [`Segment`], without its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Straight line.
    Straight,
    /// Cubic Bézier.
    Bezier,
    /// Circular arc through a control point.
    Arc,
}

/// An editable control point of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleId {
    /// The start point.
    Start,
    /// The Bézier control attached to the start point.
    StartControl,
    /// The Bézier control attached to the end point.
    EndControl,
    /// The on-curve control point of an arc.
    Control,
    /// The end point.
    End,
}

/// The handle nearest to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle<const D: usize> {
    /// Distance from the query point to the handle.
    pub distance: f64,
    /// Position of the handle.
    pub point: PointN<D>,
    /// Which handle this is.
    pub id: HandleId,
}

/// The closest point on a segment to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection<const D: usize> {
    /// Curve parameter of the closest point.
    pub t: f64,
    /// Distance from the query point to the curve.
    pub distance: f64,
    /// The closest point itself.
    pub point: PointN<D>,
}

/// Controls for [`Segment::approximate_spaced`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingParams {
    /// Accepted deviation from the target spacing, as a fraction of it.
    pub tolerance: f64,
    /// Maximum bracketing/bisection attempts per emitted point.
    pub max_attempts: usize,
}

impl Default for SpacingParams {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_attempts: 16,
        }
    }
}

/// A curve segment in `D` dimensions.
///
/// Cross-sections use `Segment<2>`, sweep lines use `Segment<3>`. Each
/// variant owns its endpoints; linking into chains is handled by
/// [`crate::SegmentArena`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment<const D: usize> {
    /// A straight line from start to end.
    Straight {
        /// Start point.
        start: PointN<D>,
        /// End point.
        end: PointN<D>,
    },
    /// A cubic Bézier curve.
    Bezier {
        /// Start point.
        start: PointN<D>,
        /// Control point attached to the start.
        start_control: PointN<D>,
        /// Control point attached to the end.
        end_control: PointN<D>,
        /// End point.
        end: PointN<D>,
    },
    /// A circular arc from start through control to end.
    ///
    /// Collinear points have no circle; such an arc behaves like a
    /// straight line from start to end.
    Arc {
        /// Start point.
        start: PointN<D>,
        /// A point on the arc between start and end.
        control: PointN<D>,
        /// End point.
        end: PointN<D>,
    },
}

impl<const D: usize> Segment<D> {
    /// A straight line.
    pub fn straight(start: PointN<D>, end: PointN<D>) -> Self {
        Segment::Straight { start, end }
    }

    /// A cubic Bézier.
    pub fn bezier(
        start: PointN<D>,
        start_control: PointN<D>,
        end_control: PointN<D>,
        end: PointN<D>,
    ) -> Self {
        Segment::Bezier {
            start,
            start_control,
            end_control,
            end,
        }
    }

    /// A Bézier that traces a straight line at constant speed.
    pub fn straight_bezier(start: PointN<D>, end: PointN<D>) -> Self {
        Segment::Bezier {
            start,
            start_control: lerp_point(&start, &end, 1.0 / 3.0),
            end_control: lerp_point(&start, &end, 2.0 / 3.0),
            end,
        }
    }

    /// A circular arc through `control`.
    pub fn arc(start: PointN<D>, control: PointN<D>, end: PointN<D>) -> Self {
        Segment::Arc {
            start,
            control,
            end,
        }
    }

    /// The kind of this segment.
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Straight { .. } => SegmentKind::Straight,
            Segment::Bezier { .. } => SegmentKind::Bezier,
            Segment::Arc { .. } => SegmentKind::Arc,
        }
    }

    /// Start point.
    pub fn start(&self) -> PointN<D> {
        match self {
            Segment::Straight { start, .. }
            | Segment::Bezier { start, .. }
            | Segment::Arc { start, .. } => *start,
        }
    }

    /// End point.
    pub fn end(&self) -> PointN<D> {
        match self {
            Segment::Straight { end, .. } | Segment::Bezier { end, .. } | Segment::Arc { end, .. } => {
                *end
            }
        }
    }

    /// This segment with its start point moved to `p`.
    ///
    /// A Bézier's start control moves along with the start point.
    pub fn with_start(&self, p: PointN<D>) -> Self {
        let mut out = *self;
        match &mut out {
            Segment::Straight { start, .. } | Segment::Arc { start, .. } => *start = p,
            Segment::Bezier {
                start,
                start_control,
                ..
            } => {
                *start_control += p - *start;
                *start = p;
            }
        }
        out
    }

    /// This segment with its end point moved to `p`.
    ///
    /// A Bézier's end control moves along with the end point.
    pub fn with_end(&self, p: PointN<D>) -> Self {
        let mut out = *self;
        match &mut out {
            Segment::Straight { end, .. } | Segment::Arc { end, .. } => *end = p,
            Segment::Bezier {
                end, end_control, ..
            } => {
                *end_control += p - *end;
                *end = p;
            }
        }
        out
    }

    /// The same curve traversed from end to start.
    pub fn reversed(&self) -> Self {
        match *self {
            Segment::Straight { start, end } => Segment::Straight {
                start: end,
                end: start,
            },
            Segment::Bezier {
                start,
                start_control,
                end_control,
                end,
            } => Segment::Bezier {
                start: end,
                start_control: end_control,
                end_control: start_control,
                end: start,
            },
            Segment::Arc {
                start,
                control,
                end,
            } => Segment::Arc {
                start: end,
                control,
                end: start,
            },
        }
    }

    fn circle(&self) -> Option<ArcGeometry<D>> {
        match self {
            Segment::Arc {
                start,
                control,
                end,
            } => {
                let circle = ArcGeometry::through(start, control, end);
                if circle.is_none() {
                    log::trace!("degenerate arc, using straight line");
                }
                circle
            }
            _ => None,
        }
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> PointN<D> {
        match self {
            Segment::Straight { start, end } => lerp_point(start, end, t),
            Segment::Bezier {
                start,
                start_control,
                end_control,
                end,
            } => bezier::point(&[*start, *start_control, *end_control, *end], t),
            Segment::Arc { start, end, .. } => {
                if t <= 0.0 {
                    return *start;
                }
                if t >= 1.0 {
                    return *end;
                }
                match self.circle() {
                    Some(circle) => circle.point(t),
                    None => lerp_point(start, end, t),
                }
            }
        }
    }

    /// Derivative with respect to `t` at parameter `t`.
    ///
    /// Not normalized. For a Bézier whose derivative vanishes exactly, the
    /// derivative is resampled at `t ± 1e-5`.
    pub fn tangent_at(&self, t: f64) -> VecN<D> {
        match self {
            Segment::Straight { start, end } => end - start,
            Segment::Bezier {
                start,
                start_control,
                end_control,
                end,
            } => bezier::tangent(&[*start, *start_control, *end_control, *end], t),
            Segment::Arc { start, end, .. } => match self.circle() {
                Some(circle) => circle.derivative(t),
                None => end - start,
            },
        }
    }

    /// Tangent at the start point.
    pub fn start_tangent(&self) -> VecN<D> {
        self.tangent_at(0.0)
    }

    /// Tangent at the end point.
    pub fn end_tangent(&self) -> VecN<D> {
        self.tangent_at(1.0)
    }

    /// Curve length (exact for lines and arcs, chord sum for Béziers).
    pub fn length(&self) -> f64 {
        match self {
            Segment::Straight { start, end } => (end - start).norm(),
            Segment::Arc { start, end, .. } => match self.circle() {
                Some(circle) => circle.length(),
                None => (end - start).norm(),
            },
            Segment::Bezier { .. } => {
                let mut length = 0.0;
                let mut prev = self.start();
                for i in 1..=LENGTH_SAMPLES {
                    let p = self.point_at(i as f64 / LENGTH_SAMPLES as f64);
                    length += (p - prev).norm();
                    prev = p;
                }
                length
            }
        }
    }

    /// `n` points at evenly spaced parameters.
    ///
    /// With `skip_last` the end point is omitted and the parameters are
    /// `i / n`, so consecutive segments can be concatenated without
    /// duplicating shared vertices. Otherwise they are `i / (n - 1)`.
    pub fn approximate(&self, n: usize, skip_last: bool) -> Vec<PointN<D>> {
        match n {
            0 => Vec::new(),
            1 => vec![self.start()],
            _ => {
                let denom = (if skip_last { n } else { n - 1 }) as f64;
                (0..n).map(|i| self.point_at(i as f64 / denom)).collect()
            }
        }
    }

    /// Points spaced `spacing` apart along the curve (chord distance).
    ///
    /// Each next parameter is first estimated from the local speed
    /// `|tangent|`, then bracketed between an under- and an over-estimate and
    /// bisected for at most `params.max_attempts` rounds. If no attempt lands
    /// within tolerance the bracket is interpolated linearly. The last gap
    /// before the end point is shorter than `spacing`.
    pub fn approximate_spaced(
        &self,
        spacing: f64,
        params: SpacingParams,
        skip_last: bool,
    ) -> Vec<PointN<D>> {
        if spacing <= 0.0 || !spacing.is_finite() {
            return self.approximate(2, skip_last);
        }

        let end = self.end();
        let tol = params.tolerance * spacing;
        let mut points = vec![self.start()];
        let mut t = 0.0;
        let mut current = self.start();

        while (end - current).norm() > spacing && points.len() < MAX_SPACED_POINTS {
            let speed = self.tangent_at(t).norm();
            let step = if speed > 0.0 {
                spacing / speed
            } else {
                1.0 / bezier::LUT_SAMPLES as f64
            };

            let mut under = (t, 0.0);
            let mut over: Option<(f64, f64)> = None;
            let mut candidate = (t + step).min(1.0);
            let mut found = None;

            for _ in 0..params.max_attempts.max(1) {
                let d = (self.point_at(candidate) - current).norm();
                if (d - spacing).abs() <= tol {
                    found = Some(candidate);
                    break;
                }
                if d < spacing {
                    under = (candidate, d);
                    if candidate >= 1.0 {
                        break;
                    }
                    candidate = match over {
                        Some((over_t, _)) => 0.5 * (candidate + over_t),
                        None => (candidate + step).min(1.0),
                    };
                } else {
                    over = Some((candidate, d));
                    candidate = 0.5 * (under.0 + candidate);
                }
            }

            let next = match (found, over) {
                (Some(found), _) => found,
                (None, Some((over_t, over_d))) if over_d > under.1 => {
                    let f = (spacing - under.1) / (over_d - under.1);
                    under.0 + f * (over_t - under.0)
                }
                _ => break,
            };
            if next <= t {
                break;
            }
            t = next;
            current = self.point_at(t);
            points.push(current);
        }

        if !skip_last {
            points.push(end);
        }
        points
    }

    /// The closest point on the segment to `target`.
    ///
    /// Closed form for lines and arcs; Béziers use a lookup-table scan with
    /// local refinement.
    pub fn project(&self, target: &PointN<D>) -> Projection<D> {
        let (t, distance) = match self {
            Segment::Bezier {
                start,
                start_control,
                end_control,
                end,
            } => bezier::project(&[*start, *start_control, *end_control, *end], target),
            Segment::Arc { start, end, .. } => match self.circle() {
                Some(circle) => circle.project(target),
                None => project_on_line(start, end, target),
            },
            Segment::Straight { start, end } => project_on_line(start, end, target),
        };
        Projection {
            t,
            distance,
            point: self.point_at(t),
        }
    }

    /// Approximate distance from `target` to the curve.
    pub fn distance(&self, target: &PointN<D>) -> f64 {
        self.project(target).distance
    }

    /// Split into two segments meeting at `point`.
    ///
    /// `point` becomes the shared vertex even when it lies off the curve.
    /// Lines split exactly. Arcs recompute the circle through start, `point`
    /// and end, and place each half's control on it. Béziers keep the outer
    /// controls (shortened to the split parameter) and synthesize the two
    /// inner controls along the tangent at the projected parameter, at a
    /// third of the distance from `point` to each original endpoint.
    pub fn split(&self, point: PointN<D>) -> (Self, Self) {
        match *self {
            Segment::Straight { start, end } => (
                Segment::Straight { start, end: point },
                Segment::Straight { start: point, end },
            ),
            Segment::Arc { start, end, .. } => {
                let (first_control, second_control) =
                    match ArcGeometry::through(&start, &point, &end) {
                        Some(circle) => {
                            let split_t = circle.project(&point).0;
                            (circle.point(0.5 * split_t), circle.point(0.5 * (1.0 + split_t)))
                        }
                        None => (
                            lerp_point(&start, &point, 0.5),
                            lerp_point(&point, &end, 0.5),
                        ),
                    };
                (
                    Segment::Arc {
                        start,
                        control: first_control,
                        end: point,
                    },
                    Segment::Arc {
                        start: point,
                        control: second_control,
                        end,
                    },
                )
            }
            Segment::Bezier {
                start,
                start_control,
                end_control,
                end,
            } => {
                let t = self.project(&point).t;
                let tangent = self.tangent_at(t);
                let length = tangent.norm();
                let direction = if length > 0.0 {
                    tangent / length
                } else {
                    VecN::<D>::zeros()
                };
                let before = (point - start).norm() / 3.0;
                let after = (end - point).norm() / 3.0;
                (
                    Segment::Bezier {
                        start,
                        start_control: start + (start_control - start) * t,
                        end_control: point - direction * before,
                        end: point,
                    },
                    Segment::Bezier {
                        start: point,
                        start_control: point + direction * after,
                        end_control: end + (end_control - end) * (1.0 - t),
                        end,
                    },
                )
            }
        }
    }

    /// Merge `previous` (ending where `self` starts) and `self` into one
    /// segment spanning `previous.start() → self.end()`.
    ///
    /// The result has the kind of `self`. A Bézier takes its controls from
    /// the outer tangents, an arc passes through the removed shared vertex.
    pub fn combine_previous(&self, previous: &Self) -> Self {
        let start = previous.start();
        let end = self.end();
        match self.kind() {
            SegmentKind::Straight => Segment::Straight { start, end },
            SegmentKind::Arc => Segment::Arc {
                start,
                control: previous.end(),
                end,
            },
            SegmentKind::Bezier => Segment::Bezier {
                start,
                start_control: start + previous.start_tangent() / 3.0,
                end_control: end - self.end_tangent() / 3.0,
                end,
            },
        }
    }

    /// A segment of `kind` with the same endpoints, following this curve's
    /// shape where the target kind can express it.
    pub fn to_kind(&self, kind: SegmentKind) -> Self {
        let (start, end) = (self.start(), self.end());
        match kind {
            SegmentKind::Straight => Segment::Straight { start, end },
            SegmentKind::Arc => Segment::Arc {
                start,
                control: self.point_at(0.5),
                end,
            },
            SegmentKind::Bezier => match self {
                Segment::Bezier { .. } => *self,
                _ => Segment::Bezier {
                    start,
                    start_control: start + self.start_tangent() / 3.0,
                    end_control: end - self.end_tangent() / 3.0,
                    end,
                },
            },
        }
    }

    /// All editable control points, in curve order.
    pub fn handles(&self) -> Vec<(HandleId, PointN<D>)> {
        match *self {
            Segment::Straight { start, end } => vec![(HandleId::Start, start), (HandleId::End, end)],
            Segment::Bezier {
                start,
                start_control,
                end_control,
                end,
            } => vec![
                (HandleId::Start, start),
                (HandleId::StartControl, start_control),
                (HandleId::EndControl, end_control),
                (HandleId::End, end),
            ],
            Segment::Arc {
                start,
                control,
                end,
            } => vec![
                (HandleId::Start, start),
                (HandleId::Control, control),
                (HandleId::End, end),
            ],
        }
    }

    /// The control point nearest to `target`.
    ///
    /// The end point is only considered with `include_last`, since in a
    /// chain it is the next segment's start.
    pub fn handle(&self, target: &PointN<D>, include_last: bool) -> Handle<D> {
        self.handles()
            .into_iter()
            .filter(|(id, _)| include_last || *id != HandleId::End)
            .map(|(id, point)| Handle {
                distance: (point - target).norm(),
                point,
                id,
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .unwrap_or(Handle {
                distance: (self.start() - target).norm(),
                point: self.start(),
                id: HandleId::Start,
            })
    }

    /// This segment with the handle `id` moved to `p`.
    ///
    /// Returns an unchanged copy if the segment has no such handle.
    pub fn with_handle(&self, id: HandleId, p: PointN<D>) -> Self {
        let mut out = *self;
        match (id, &mut out) {
            (HandleId::Start, _) => return self.with_start(p),
            (HandleId::End, _) => return self.with_end(p),
            (HandleId::StartControl, Segment::Bezier { start_control, .. }) => *start_control = p,
            (HandleId::EndControl, Segment::Bezier { end_control, .. }) => *end_control = p,
            (HandleId::Control, Segment::Arc { control, .. }) => *control = p,
            _ => {}
        }
        out
    }
}

fn project_on_line<const D: usize>(
    start: &PointN<D>,
    end: &PointN<D>,
    target: &PointN<D>,
) -> (f64, f64) {
    let dir = end - start;
    let len_sq = dir.norm_squared();
    if len_sq == 0.0 {
        return (0.0, (target - start).norm());
    }
    let t = ((target - start).dot(&dir) / len_sq).clamp(0.0, 1.0);
    let closest = lerp_point(start, end, t);
    (t, (target - closest).norm())
}
