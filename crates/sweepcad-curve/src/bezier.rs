//! Cubic Bézier evaluation and projection.

use sweepcad_math::{PointN, VecN};

/// Number of uniform samples in the coarse projection lookup table.
pub const LUT_SAMPLES: usize = 100;

/// Parameter offset used to step off a zero-derivative point.
pub(crate) const SINGULAR_STEP: f64 = 1e-5;

/// Evaluate a cubic Bézier in Bernstein form.
///
/// `t = 0` and `t = 1` return the first and last control point exactly.
pub(crate) fn point<const D: usize>(p: &[PointN<D>; 4], t: f64) -> PointN<D> {
    let mt = 1.0 - t;
    let coords = p[0].coords * (mt * mt * mt)
        + p[1].coords * (3.0 * mt * mt * t)
        + p[2].coords * (3.0 * mt * t * t)
        + p[3].coords * (t * t * t);
    PointN::from(coords)
}

/// First derivative `B'(t)`.
pub(crate) fn derivative<const D: usize>(p: &[PointN<D>; 4], t: f64) -> VecN<D> {
    let mt = 1.0 - t;
    (p[1] - p[0]) * (3.0 * mt * mt) + (p[2] - p[1]) * (6.0 * mt * t) + (p[3] - p[2]) * (3.0 * t * t)
}

/// Derivative with the singularity-avoidance rule.
///
/// Coincident control points make `B'` vanish at the ends; in that case the
/// derivative is resampled a small step inside the curve.
pub(crate) fn tangent<const D: usize>(p: &[PointN<D>; 4], t: f64) -> VecN<D> {
    let d = derivative(p, t);
    if d.norm() != 0.0 {
        return d;
    }
    let shifted = if t + SINGULAR_STEP <= 1.0 {
        t + SINGULAR_STEP
    } else {
        t - SINGULAR_STEP
    };
    log::trace!("zero bezier derivative at t={t}, resampling at t={shifted}");
    derivative(p, shifted)
}

/// Project `target` onto the curve.
///
/// Scans a [`LUT_SAMPLES`]-entry lookup table for the nearest sample, then
/// refines within one table step on either side at a tenth of the table
/// resolution. Returns `(t, distance)`.
pub(crate) fn project<const D: usize>(p: &[PointN<D>; 4], target: &PointN<D>) -> (f64, f64) {
    let coarse = 1.0 / LUT_SAMPLES as f64;
    let mut best_t = 0.0;
    let mut best_d = f64::INFINITY;
    for i in 0..=LUT_SAMPLES {
        let t = i as f64 * coarse;
        let d = (point(p, t) - target).norm();
        if d < best_d {
            best_d = d;
            best_t = t;
        }
    }

    let fine = coarse / 10.0;
    let lo = (best_t - coarse).max(0.0);
    let hi = (best_t + coarse).min(1.0);
    let steps = ((hi - lo) / fine).round() as usize;
    for i in 0..=steps {
        let t = (lo + i as f64 * fine).min(1.0);
        let d = (point(p, t) - target).norm();
        if d < best_d {
            best_d = d;
            best_t = t;
        }
    }
    (best_t, best_d)
}
