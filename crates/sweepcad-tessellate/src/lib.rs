#![warn(missing_docs)]

//! Mesh assembly for the sweepcad kernel.
//!
//! Turns a sequence of equally sized 3D point rings into a closed indexed
//! triangle mesh:
//! 1. Ear-clip the first ring as the start cap (winding reversed)
//! 2. Stitch consecutive rings into a quad-faceted tube
//! 3. Ear-clip the last ring as the end cap
//!
//! Rings that wind counter-clockwise about the sweep direction make every
//! face normal point out of the solid. Clockwise rings give an inside-out
//! mesh with a negative [`Mesh::signed_volume`]; nothing here flips them.

mod earcut;

use serde::{Deserialize, Serialize};
use sweepcad_math::{Point2, Point3, Vec3};
use thiserror::Error;

/// Errors from mesh assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TessellateError {
    /// No rings were given.
    #[error("mesh assembly needs at least one ring")]
    NoRings,

    /// A ring has fewer than three points.
    #[error("ring needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    /// A ring's point count differs from the first ring's.
    #[error("inconsistent profile size: ring {ring} has {found} points, expected {expected}")]
    InconsistentProfileSize {
        /// Index of the offending ring.
        ring: usize,
        /// Point count of the first ring.
        expected: usize,
        /// Point count of the offending ring.
        found: usize,
    },
}

/// Indexed triangle mesh.
///
/// Points are never shared between the caps and the tube, so each part can
/// be shaded flat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub points: Vec<Point3>,
    /// Triangles as indices into `points`. Counter-clockwise seen from
    /// outside when the rings were counter-clockwise about the sweep direction.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.faces.len()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.points.len()
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.points.len() as u32;
        self.points.extend_from_slice(&other.points);
        self.faces
            .extend(other.faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
    }

    /// Flat `[x0, y0, z0, x1, ...]` positions for GPU upload.
    pub fn vertex_buffer(&self) -> Vec<f32> {
        self.points
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Flat `[i0, i1, i2, ...]` triangle indices.
    pub fn index_buffer(&self) -> Vec<u32> {
        self.faces.iter().flatten().copied().collect()
    }

    /// Flat per-vertex normals, area-weighted over adjacent faces.
    pub fn normal_buffer(&self) -> Vec<f32> {
        let mut normals = vec![Vec3::zeros(); self.points.len()];
        for (face, n) in self.face_normals_unnormalized() {
            for i in face {
                normals[i as usize] += n;
            }
        }
        normals
            .iter()
            .flat_map(|n| {
                let len = n.norm();
                let n = if len > 0.0 { n / len } else { *n };
                [n.x as f32, n.y as f32, n.z as f32]
            })
            .collect()
    }

    /// Unit normal of each face; degenerate faces give a zero vector.
    pub fn face_normals(&self) -> Vec<Vec3> {
        self.face_normals_unnormalized()
            .map(|(_, n)| {
                let len = n.norm();
                if len > 0.0 {
                    n / len
                } else {
                    n
                }
            })
            .collect()
    }

    fn face_normals_unnormalized(&self) -> impl Iterator<Item = ([u32; 3], Vec3)> + '_ {
        self.faces.iter().map(|&f| {
            let [a, b, c] = f.map(|i| self.points[i as usize]);
            (f, (b - a).cross(&(c - a)))
        })
    }

    /// Signed enclosed volume; positive for a closed, outward-facing mesh.
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|f| {
                let [a, b, c] = f.map(|i| self.points[i as usize].coords);
                a.dot(&b.cross(&c))
            })
            .sum::<f64>()
            / 6.0
    }

    fn push_ring(&mut self, ring: &[Point3]) -> u32 {
        let offset = self.points.len() as u32;
        self.points.extend_from_slice(ring);
        offset
    }

    fn push_cap(&mut self, ring: &[Point3], reversed: bool) {
        let offset = self.push_ring(ring);
        for [a, b, c] in earcut::triangulate(&project_to_plane(ring)) {
            let (a, b, c) = (a as u32 + offset, b as u32 + offset, c as u32 + offset);
            self.faces.push(if reversed { [a, c, b] } else { [a, b, c] });
        }
    }
}

/// Assemble a closed mesh from profile rings ordered along the sweep.
///
/// For `n` rings of `k` points the mesh has `n * k + 2 * k` points and
/// `2 * k * (n - 1) + 2 * (k - 2)` triangles.
pub fn assemble(rings: &[Vec<Point3>]) -> Result<Mesh, TessellateError> {
    let (first, last) = match (rings.first(), rings.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(TessellateError::NoRings),
    };
    let k = first.len();
    if k < 3 {
        return Err(TessellateError::TooFewPoints(k));
    }
    if let Some((ring, r)) = rings.iter().enumerate().find(|(_, r)| r.len() != k) {
        return Err(TessellateError::InconsistentProfileSize {
            ring,
            expected: k,
            found: r.len(),
        });
    }

    let n = rings.len();
    let mut mesh = Mesh {
        points: Vec::with_capacity(n * k + 2 * k),
        faces: Vec::with_capacity(2 * k * (n - 1) + 2 * (k - 2)),
    };

    mesh.push_cap(first, true);

    let mut previous = mesh.push_ring(first);
    for ring in &rings[1..] {
        let current = mesh.push_ring(ring);
        for j in 0..k {
            let next = (j + 1) % k;
            let (r0j, r0n) = (previous + j as u32, previous + next as u32);
            let (r1j, r1n) = (current + j as u32, current + next as u32);
            mesh.faces.push([r1j, r0j, r0n]);
            mesh.faces.push([r0n, r1n, r1j]);
        }
        previous = current;
    }

    mesh.push_cap(last, false);

    log::debug!(
        "assembled {} rings of {} points: {} vertices, {} triangles",
        n,
        k,
        mesh.num_vertices(),
        mesh.num_triangles()
    );
    Ok(mesh)
}

/// Project a planar ring into 2D coordinates of its own plane, oriented so
/// the ring's winding about its Newell normal is counter-clockwise.
fn project_to_plane(ring: &[Point3]) -> Vec<Point2> {
    let normal = polygon_normal(ring);
    let reference = if normal.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let u = reference.cross(&normal).normalize();
    let v = normal.cross(&u);
    ring.iter()
        .map(|p| Point2::new(p.coords.dot(&u), p.coords.dot(&v)))
        .collect()
}

/// Newell normal of a polygon; `+Z` when it degenerates.
fn polygon_normal(verts: &[Point3]) -> Vec3 {
    let mut n = Vec3::zeros();
    for (i, current) in verts.iter().enumerate() {
        let next = verts[(i + 1) % verts.len()];
        n.x += (current.y - next.y) * (current.z + next.z);
        n.y += (current.z - next.z) * (current.x + next.x);
        n.z += (current.x - next.x) * (current.y + next.y);
    }
    if n.norm() < 1e-12 {
        log::trace!("degenerate ring normal, projecting caps onto XY");
        Vec3::z()
    } else {
        n.normalize()
    }
}
