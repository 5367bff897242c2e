//! Mesh file writers.

use std::fmt::Write as _;
use sweepcad_tessellate::Mesh;

/// Binary STL with per-face normals.
pub fn stl_bytes(mesh: &Mesh) -> Vec<u8> {
    let mut data = Vec::with_capacity(84 + mesh.num_triangles() * 50);

    let mut header = [b' '; 80];
    let label = b"sweepcad STL export";
    header[..label.len()].copy_from_slice(label);
    data.extend_from_slice(&header);
    data.extend_from_slice(&(mesh.num_triangles() as u32).to_le_bytes());

    for (face, normal) in mesh.faces.iter().zip(mesh.face_normals()) {
        let normal = if normal.norm() > 0.0 {
            normal
        } else {
            sweepcad_math::Vec3::z()
        };
        for c in [normal.x, normal.y, normal.z] {
            data.extend_from_slice(&(c as f32).to_le_bytes());
        }
        for &i in face {
            let p = mesh.points[i as usize];
            for c in [p.x, p.y, p.z] {
                data.extend_from_slice(&(c as f32).to_le_bytes());
            }
        }
        // Attribute byte count
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    data
}

/// Wavefront OBJ text (1-based indices, no normals).
pub fn obj_string(mesh: &Mesh) -> String {
    let mut out = String::with_capacity(32 * (mesh.num_vertices() + mesh.num_triangles()));
    out.push_str("# sweepcad OBJ export\n");
    for p in &mesh.points {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    for f in &mesh.faces {
        let _ = writeln!(out, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweepcad_math::Point3;

    fn tetra() -> Mesh {
        Mesh {
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            faces: vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
        }
    }

    #[test]
    fn test_stl_layout() {
        let bytes = stl_bytes(&tetra());
        assert_eq!(bytes.len(), 84 + 4 * 50);
        assert!(bytes.starts_with(b"sweepcad STL export"));
        assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 4);
        // First face normal points down.
        let nz = f32::from_le_bytes([bytes[92], bytes[93], bytes[94], bytes[95]]);
        assert_eq!(nz, -1.0);
    }

    #[test]
    fn test_obj_lines() {
        let text = obj_string(&tetra());
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 4);
        assert!(text.contains("\nf 1 3 2\n"));
        assert!(text.contains("\nv 0 0 1\n"));
    }
}
