//! Circular arcs through three points.

use std::f64::consts::TAU;

use sweepcad_math::{PointN, VecN};

/// Relative threshold below which three points are treated as collinear.
const COLLINEAR_EPS: f64 = 1e-12;

/// The circle carrying an arc, with an orthonormal in-plane basis.
///
/// Points on the arc are `center + radius * (u cos(sweep t) + v sin(sweep t))`
/// for `t` in `[0, 1]`, with `u` pointing at the start point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArcGeometry<const D: usize> {
    pub center: PointN<D>,
    pub radius: f64,
    pub u: VecN<D>,
    pub v: VecN<D>,
    /// Signed angle from start to end; its sign makes the arc pass the control point.
    pub sweep: f64,
}

impl<const D: usize> ArcGeometry<D> {
    /// Circle through `start`, `control` and `end`.
    ///
    /// Returns `None` when the points are collinear or coincident and no
    /// circumscribed circle exists.
    pub fn through(start: &PointN<D>, control: &PointN<D>, end: &PointN<D>) -> Option<Self> {
        let a = control - start;
        let b = end - start;
        let (aa, bb, ab) = (a.dot(&a), b.dot(&b), a.dot(&b));
        let det = aa * bb - ab * ab;
        if aa == 0.0 || det.abs() <= COLLINEAR_EPS * aa * bb.max(aa) {
            return None;
        }

        let offset = (a * (bb * (aa - ab)) + b * (aa * (bb - ab))) / (2.0 * det);
        let center = start + offset;
        let radius = offset.norm();
        if radius == 0.0 || !radius.is_finite() {
            return None;
        }

        let u = -offset / radius;
        let v = in_plane_normal(&u, &(control - center))
            .or_else(|| in_plane_normal(&u, &(end - center)))
            .unwrap_or_else(|| any_perpendicular(&u));

        let angle_of = |p: &PointN<D>| {
            let w = p - center;
            let angle = w.dot(&v).atan2(w.dot(&u));
            if angle < 0.0 {
                angle + TAU
            } else {
                angle
            }
        };
        let control_angle = angle_of(control);
        let end_angle = angle_of(end);
        let sweep = if end_angle == 0.0 {
            TAU
        } else if control_angle <= end_angle {
            end_angle
        } else {
            end_angle - TAU
        };

        Some(Self {
            center,
            radius,
            u,
            v,
            sweep,
        })
    }

    /// Point at the angle `sweep * t` from the start.
    pub fn point(&self, t: f64) -> PointN<D> {
        let (s, c) = (self.sweep * t).sin_cos();
        self.center + (self.u * c + self.v * s) * self.radius
    }

    /// Derivative with respect to `t`.
    pub fn derivative(&self, t: f64) -> VecN<D> {
        let (s, c) = (self.sweep * t).sin_cos();
        (self.v * c - self.u * s) * (self.radius * self.sweep)
    }

    /// Arc length.
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    /// Closest parameter and distance from `target` to the arc.
    ///
    /// Targets whose in-plane angle falls outside the swept range snap to the
    /// nearer endpoint.
    pub fn project(&self, target: &PointN<D>) -> (f64, f64) {
        let w = target - self.center;
        let (wu, wv) = (w.dot(&self.u), w.dot(&self.v));
        let off_plane = (w - self.u * wu - self.v * wv).norm();

        let mut angle = wv.atan2(wu);
        if self.sweep >= 0.0 && angle < 0.0 {
            angle += TAU;
        } else if self.sweep < 0.0 && angle > 0.0 {
            angle -= TAU;
        }
        let t = angle / self.sweep;
        if (0.0..=1.0).contains(&t) {
            let radial = wu.hypot(wv) - self.radius;
            return (t, radial.hypot(off_plane));
        }

        let to_start = (self.point(0.0) - target).norm();
        let to_end = (self.point(1.0) - target).norm();
        if to_start <= to_end {
            (0.0, to_start)
        } else {
            (1.0, to_end)
        }
    }
}

/// Component of `w` orthogonal to `u`, normalized; `None` if it vanishes.
fn in_plane_normal<const D: usize>(u: &VecN<D>, w: &VecN<D>) -> Option<VecN<D>> {
    let r = w - u * w.dot(u);
    let len = r.norm();
    if len <= COLLINEAR_EPS * w.norm() || len == 0.0 {
        None
    } else {
        Some(r / len)
    }
}

/// Some unit vector orthogonal to `u`.
fn any_perpendicular<const D: usize>(u: &VecN<D>) -> VecN<D> {
    let axis = u.iamin();
    let mut e = VecN::<D>::zeros();
    e[axis] = 1.0;
    let r = e - u * u[axis];
    r.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;
    use sweepcad_math::{Point2, Point3};

    #[test]
    fn test_quarter_circle_ccw() {
        let arc = ArcGeometry::through(
            &Point2::new(1.0, 0.0),
            &Point2::new(0.5f64.sqrt(), 0.5f64.sqrt()),
            &Point2::new(0.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(arc.center, Point2::origin(), epsilon = 1e-12);
        assert_relative_eq!(arc.radius, 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.sweep, PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(arc.point(1.0), Point2::new(0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_major_arc_passes_control() {
        // Start at +x, control at -x, end at +y: three quarters of the circle.
        let control = Point2::new(-1.0, 0.0);
        let arc =
            ArcGeometry::through(&Point2::new(1.0, 0.0), &control, &Point2::new(0.0, 1.0)).unwrap();
        assert_relative_eq!(arc.sweep.abs(), 1.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(arc.length(), 1.5 * PI, epsilon = 1e-12);
        let (t, d) = arc.project(&control);
        assert!(d < 1e-12);
        assert!(t > 0.0 && t < 1.0);
    }

    #[test]
    fn test_collinear_has_no_circle() {
        assert!(ArcGeometry::through(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 1.0),
            &Point2::new(2.0, 2.0)
        )
        .is_none());
        assert!(ArcGeometry::through(
            &Point2::new(0.0, 0.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0)
        )
        .is_none());
    }

    #[test]
    fn test_arc_in_3d() {
        let arc = ArcGeometry::through(
            &Point3::new(0.0, 0.0, 2.0),
            &Point3::new(0.0, 2.0, 0.0),
            &Point3::new(0.0, 0.0, -2.0),
        )
        .unwrap();
        assert_relative_eq!(arc.center, Point3::origin(), epsilon = 1e-12);
        assert_relative_eq!(arc.point(0.5), Point3::new(0.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_project_outside_sweep_snaps_to_endpoint() {
        let arc = ArcGeometry::through(
            &Point2::new(1.0, 0.0),
            &Point2::new(0.5f64.sqrt(), 0.5f64.sqrt()),
            &Point2::new(0.0, 1.0),
        )
        .unwrap();
        let (t, d) = arc.project(&Point2::new(2.0, -0.5));
        assert_eq!(t, 0.0);
        assert_relative_eq!(d, (1.0f64 + 0.25).sqrt(), epsilon = 1e-12);
        let (t, d) = arc.project(&Point2::new(2.0, 2.0));
        assert!(t > 0.4 && t < 0.6);
        assert_relative_eq!(d, 8.0f64.sqrt() - 1.0, epsilon = 1e-12);
    }
}
