/// Control vertices and face indices of the procedural heart
use nalgebra::Point3;

use crate::error::MeshError;
use crate::geometry::Mesh;

/// Number of control vertices in [`HEART_VERTICES`]
pub const HEART_VERTEX_COUNT: usize = 18;

/// Control points of the heart silhouette, mirrored across the YZ plane.
///
/// The tip sits at the origin and the two lobes peak at y = 13.
pub const HEART_VERTICES: [[f32; 3]; HEART_VERTEX_COUNT] = [
    [0.0, 0.0, 0.0],
    [0.0, 5.0, -3.0],
    [5.0, 5.0, 0.0],
    [9.0, 9.0, 0.0],
    [5.0, 9.0, 3.0],
    [7.0, 13.0, 0.0],
    [3.0, 13.0, 0.0],
    [0.0, 11.0, 0.0],
    [5.0, 9.0, -3.0],
    [0.0, 8.0, -3.0],
    [0.0, 8.0, 3.0],
    [0.0, 5.0, 3.0],
    [-9.0, 9.0, 0.0],
    [-5.0, 5.0, 0.0],
    [-5.0, 9.0, -3.0],
    [-5.0, 9.0, 3.0],
    [-7.0, 13.0, 0.0],
    [-3.0, 13.0, 0.0],
];

/// Triangle index triples into [`HEART_VERTICES`], front faces first, then back.
#[rustfmt::skip]
pub const HEART_TRIANGLES: [i32; 96] = [
    // front
    2, 11, 0,
    2, 3, 4,
    5, 4, 3,
    4, 5, 6,
    4, 6, 7,
    4, 7, 10,
    4, 10, 11,
    4, 11, 2,
    0, 11, 13,
    12, 13, 15,
    12, 15, 16,
    16, 15, 17,
    17, 15, 7,
    7, 15, 10,
    13, 11, 15,
    15, 11, 10,
    // back
    0, 1, 2,
    1, 8, 2,
    9, 8, 1,
    5, 3, 8,
    8, 3, 2,
    6, 5, 8,
    7, 6, 8,
    9, 7, 8,
    14, 17, 7,
    14, 7, 9,
    14, 9, 1,
    14, 1, 13,
    1, 0, 13,
    16, 14, 12,
    16, 17, 14,
    12, 14, 13,
];

/// The control vertices as points
pub fn heart_vertices() -> Vec<Point3<f32>> {
    HEART_VERTICES
        .iter()
        .map(|&[x, y, z]| Point3::new(x, y, z))
        .collect()
}

/// Triangulate the heart from its control vertices
pub fn heart_mesh() -> Result<Mesh, MeshError> {
    Mesh::triangulate(&heart_vertices(), &HEART_TRIANGLES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heart_mesh_face_count() {
        let mesh = heart_mesh().unwrap();
        assert_eq!(mesh.face_count(), HEART_TRIANGLES.len() / 3);
        assert_eq!(mesh.face_count(), 32);
    }

    #[test]
    fn test_every_control_vertex_is_used() {
        let mesh = heart_mesh().unwrap();
        let mut used = [false; HEART_VERTEX_COUNT];
        for triangle in &mesh.triangles {
            for &index in &triangle.indices {
                used[index] = true;
            }
        }
        assert!(used.iter().all(|&u| u));
    }

    #[test]
    fn test_heart_normals_are_unit_length() {
        let mesh = heart_mesh().unwrap();
        for vertex in mesh.vertices() {
            assert!((vertex.normal.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_silhouette_is_mirrored() {
        let vertices = heart_vertices();
        for v in &vertices {
            assert!(vertices
                .iter()
                .any(|m| m.x == -v.x && m.y == v.y && m.z == v.z));
        }
    }
}
