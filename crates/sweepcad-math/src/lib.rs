#![warn(missing_docs)]

//! Math types for the sweepcad kernel.
//!
//! Thin wrappers around nalgebra providing the value types used by the
//! sweep pipeline: points and vectors in 2D, 3D and arbitrary fixed
//! dimension, a homogeneous transform, quaternion rotations, and tolerance
//! constants.

use nalgebra::{Matrix3, Matrix4, SVector, Unit, UnitQuaternion, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in the 2D profile plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A point in `D`-dimensional space.
pub type PointN<const D: usize> = nalgebra::Point<f64, D>;

/// A vector in `D`-dimensional space.
pub type VecN<const D: usize> = SVector<f64, D>;

/// The 3x3 linear part of a [`Transform`].
pub type Mat3 = Matrix3<f64>;

/// A unit quaternion rotation.
pub type Quat = UnitQuaternion<f64>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Translation moving the origin to `p`.
    pub fn translation_to(p: &Point3) -> Self {
        Self::translation(p.x, p.y, p.z)
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Uniform scale by `s`.
    pub fn scale_uniform(s: f64) -> Self {
        Self::scale(s, s, s)
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Rotation described by a unit quaternion.
    pub fn rotation(q: &Quat) -> Self {
        Self {
            matrix: q.to_homogeneous(),
        }
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// The resulting transform applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// The upper-left 3x3 (rotation and scale) part.
    pub fn linear_part(&self) -> Mat3 {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a point of the profile plane (`z = 0`).
    pub fn apply_point2(&self, p: &Point2) -> Point3 {
        self.apply_point(&Point3::new(p.x, p.y, 0.0))
    }

    /// Transform a direction vector (ignores translation, applies rotation/scale).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// The smallest rotation taking direction `from` onto direction `to`.
///
/// The axis is the normalized cross product and the angle is `acos` of the
/// normalized dot product. Returns `None` when the cross product vanishes
/// (parallel or anti-parallel directions) or either input has zero length;
/// there is no unique axis to rotate about in that case.
pub fn minimal_rotation(from: &Vec3, to: &Vec3) -> Option<Quat> {
    let (from_len, to_len) = (from.norm(), to.norm());
    if from_len == 0.0 || to_len == 0.0 {
        return None;
    }
    let axis = from.cross(to);
    let axis_len = axis.norm();
    if axis_len == 0.0 {
        return None;
    }
    let cos = (from.dot(to) / (from_len * to_len)).clamp(-1.0, 1.0);
    let axis = Dir3::new_unchecked(axis / axis_len);
    Some(Quat::from_axis_angle(&axis, cos.acos()))
}

/// Linear blend `a * (1 - t) + b * t`.
///
/// Written in this form so that `t = 0` yields exactly `a` and `t = 1`
/// yields exactly `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Point-wise [`lerp`] between two points of any dimension.
pub fn lerp_point<const D: usize>(a: &PointN<D>, b: &PointN<D>, t: f64) -> PointN<D> {
    PointN::from(a.coords * (1.0 - t) + b.coords * t)
}

/// Z component of the cross product of two 2D vectors.
pub fn cross_2d(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise winding.
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal<const D: usize>(&self, a: &PointN<D>, b: &PointN<D>) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation_to(&Point3::new(10.0, 20.0, 30.0));
        let result = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(result.x, 11.0);
        assert_relative_eq!(result.y, 22.0);
        assert_relative_eq!(result.z, 33.0);
    }

    #[test]
    fn test_rotation_z_90() {
        let t = Transform::rotation_z(PI / 2.0);
        let result = t.apply_point2(&Point2::new(1.0, 0.0));
        assert!(result.x.abs() < 1e-12);
        assert!((result.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale() {
        let t = Transform::scale(2.0, 3.0, 4.0);
        let result = t.apply_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(result.x, 2.0);
        assert_relative_eq!(result.y, 3.0);
        assert_relative_eq!(result.z, 4.0);
    }

    #[test]
    fn test_compose_applies_right_operand_first() {
        let translate = Transform::translation(1.0, 0.0, 0.0);
        let scale = Transform::scale_uniform(2.0);
        // (scale * translate) * p = scale(translate(p))
        let result = scale.then(&translate).apply_point(&Point3::origin());
        assert_relative_eq!(result.x, 2.0);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::translation(1.0, 2.0, 3.0);
        let inv = t.inverse().unwrap();
        let p = Point3::new(5.0, 6.0, 7.0);
        let result = t.then(&inv).apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_apply_vec_ignores_translation() {
        let t = Transform::translation(5.0, 5.0, 5.0).then(&Transform::scale_uniform(3.0));
        let v = t.apply_vec(&Vec3::x());
        assert_relative_eq!(v, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_minimal_rotation_maps_from_onto_to() {
        let from = Vec3::z();
        let to = Vec3::new(1.0, 1.0, 0.0);
        let q = minimal_rotation(&from, &to).unwrap();
        let rotated = q * from;
        assert_relative_eq!(rotated, to.normalize(), epsilon = 1e-12);
        assert_relative_eq!(q.angle(), PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_minimal_rotation_parallel_is_none() {
        assert!(minimal_rotation(&Vec3::z(), &(Vec3::z() * 4.0)).is_none());
        assert!(minimal_rotation(&Vec3::z(), &-Vec3::z()).is_none());
        assert!(minimal_rotation(&Vec3::z(), &Vec3::zeros()).is_none());
    }

    #[test]
    fn test_rotation_transform_matches_quaternion() {
        let q = minimal_rotation(&Vec3::z(), &Vec3::x()).unwrap();
        let t = Transform::rotation(&q);
        let p = t.apply_point(&Point3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(p, Point3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(t.linear_part(), q.to_rotation_matrix().into_inner());
    }

    #[test]
    fn test_lerp_is_exact_at_ends() {
        let (a, b) = (0.1, 0.7);
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
        let pa = Point2::new(0.3, -1.7);
        let pb = Point2::new(2.9, 0.1);
        assert_eq!(lerp_point(&pa, &pb, 0.0), pa);
        assert_eq!(lerp_point(&pa, &pb, 1.0), pb);
    }

    #[test]
    fn test_signed_area_winding() {
        let ccw = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert_relative_eq!(signed_area(&ccw), 2.0);
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert_relative_eq!(signed_area(&cw), -2.0);
        assert_relative_eq!(cross_2d(&Vec2::x(), &Vec2::y()), 1.0);
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0 + 1e-7, 2.0, 3.0);
        assert!(tol.points_equal(&a, &b));
        let c = Point3::new(1.001, 2.0, 3.0);
        assert!(!tol.points_equal(&a, &c));
    }
}
