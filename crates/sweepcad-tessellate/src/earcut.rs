//! Ear-clipping triangulation of simple polygons.

use sweepcad_math::{cross_2d, signed_area, Point2};

/// Barycentric margin that counts points on a triangle's edges as inside.
const INSIDE_EPS: f64 = 1e-10;

/// Triangulate a simple polygon into `points.len() - 2` triangles.
///
/// Triangles index into `points` and follow the polygon's own winding. If
/// clipping stalls on a degenerate outline, the remainder is closed with a
/// fan so the triangle count is always `n - 2`.
pub(crate) fn triangulate(points: &[Point2]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let ccw = signed_area(points) >= 0.0;
    let mut remaining: Vec<usize> = if ccw {
        (0..n).collect()
    } else {
        (0..n).rev().collect()
    };
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let corner = |i: usize| {
            (
                points[remaining[(i + m - 1) % m]],
                points[remaining[i]],
                points[remaining[(i + 1) % m]],
            )
        };
        // Reflex and flat vertices are the only ones that can poke into an ear.
        let concave: Vec<usize> = (0..m)
            .filter(|&j| {
                let (a, b, c) = corner(j);
                cross_2d(&(b - a), &(c - a)) <= 0.0
            })
            .collect();

        let ear = (0..m).find(|&i| {
            let (a, b, c) = corner(i);
            if cross_2d(&(b - a), &(c - a)) <= 0.0 {
                return false;
            }
            concave
                .iter()
                .filter(|&&j| j != i && j != (i + m - 1) % m && j != (i + 1) % m)
                .map(|&j| points[remaining[j]])
                .filter(|p| *p != a && *p != b && *p != c)
                .all(|p| !point_in_triangle(&p, &a, &b, &c))
        });

        match ear {
            Some(i) => {
                triangles.push([remaining[(i + m - 1) % m], remaining[i], remaining[(i + 1) % m]]);
                remaining.remove(i);
            }
            None => {
                log::trace!("ear clipping stalled with {m} vertices left, closing with a fan");
                for i in 1..m - 1 {
                    triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
                }
                remaining.clear();
            }
        }
    }
    if remaining.len() == 3 {
        triangles.push([remaining[0], remaining[1], remaining[2]]);
    }

    if !ccw {
        for tri in &mut triangles {
            tri.swap(1, 2);
        }
    }
    triangles
}

/// Point-in-triangle test using barycentric coordinates, boundary included.
fn point_in_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom == 0.0 {
        return false;
    }
    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;
    u >= -INSIDE_EPS && v >= -INSIDE_EPS && (u + v) <= 1.0 + INSIDE_EPS
}
