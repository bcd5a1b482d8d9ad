/// Edge-only overlay derived from a mesh
use std::collections::BTreeSet;

use log::debug;
use nalgebra::Point3;

use crate::geometry::Mesh;
use crate::material::StrokeStyle;

/// A line segment between two control vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
    /// Control vertex indices, smaller first
    pub indices: (usize, usize),
}

/// Unique edges of a mesh with the stroke they are drawn with
#[derive(Debug, Clone, PartialEq)]
pub struct Wireframe {
    pub edges: Vec<Edge>,
    pub style: StrokeStyle,
}

impl Wireframe {
    /// Collect the edges of every face, keeping one copy of each edge shared
    /// between faces. Edges come out ordered by their control vertex indices.
    pub fn from_mesh(mesh: &Mesh, style: StrokeStyle) -> Self {
        let mut seen = BTreeSet::new();
        let mut endpoints = Vec::new();

        for triangle in &mesh.triangles {
            for corner in 0..3 {
                let next = (corner + 1) % 3;
                let (a, b) = (triangle.indices[corner], triangle.indices[next]);
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    let (start, end) = if a <= b {
                        (triangle.vertices[corner], triangle.vertices[next])
                    } else {
                        (triangle.vertices[next], triangle.vertices[corner])
                    };
                    endpoints.push(Edge {
                        start: start.position,
                        end: end.position,
                        indices: key,
                    });
                }
            }
        }

        endpoints.sort_by_key(|edge| edge.indices);
        debug!(
            "wireframe has {} unique edges from {} faces",
            endpoints.len(),
            mesh.face_count()
        );

        Self {
            edges: endpoints,
            style,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heart::heart_mesh;

    fn quad() -> Mesh {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        Mesh::triangulate(&vertices, &[0, 1, 2, 0, 2, 3]).unwrap()
    }

    #[test]
    fn test_shared_edges_are_deduplicated() {
        let wireframe = Wireframe::from_mesh(&quad(), StrokeStyle::default());
        // 6 face edges, the diagonal 0-2 is shared
        assert_eq!(wireframe.edge_count(), 5);
        let keys: Vec<_> = wireframe.edges.iter().map(|e| e.indices).collect();
        assert_eq!(keys, vec![(0, 1), (0, 2), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_edge_endpoints_follow_indices() {
        let wireframe = Wireframe::from_mesh(&quad(), StrokeStyle::default());
        let diagonal = wireframe.edges[1];
        assert_eq!(diagonal.start, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(diagonal.end, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_heart_wireframe_shares_edges() {
        let mesh = heart_mesh().unwrap();
        let wireframe = Wireframe::from_mesh(&mesh, StrokeStyle::default());
        assert!(wireframe.edge_count() < mesh.face_count() * 3);
        assert!(wireframe
            .edges
            .windows(2)
            .all(|pair| pair[0].indices < pair[1].indices));
    }

    #[test]
    fn test_mesh_is_untouched() {
        let mesh = quad();
        let before = mesh.clone();
        let _ = Wireframe::from_mesh(&mesh, StrokeStyle::default());
        assert_eq!(mesh, before);
    }
}
