/// Geometry primitives and the triangulator that builds meshes from index triples
use log::{debug, warn};
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

use crate::error::MeshError;

/// A 3D vertex with position and shading normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    /// A vertex at `position` whose normal has not been computed yet
    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
        }
    }
}

/// A triangle face owning its own copy of each corner vertex.
///
/// `indices` records which control vertices the corners were copied from, in
/// winding order.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    pub indices: [usize; 3],
    pub normal: Vector3<f32>,
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex, indices: [usize; 3]) -> Self {
        let mut triangle = Self {
            vertices: [v0, v1, v2],
            indices,
            normal: Vector3::zeros(),
        };
        triangle.normal = triangle.calculate_normal();
        triangle
    }

    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Degenerate faces have no direction and yield the zero vector.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn face_count(&self) -> usize {
        self.triangles.len()
    }

    /// Iterate over every corner vertex, three per face
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.triangles.iter().flat_map(|t| t.vertices.iter())
    }

    /// Build a mesh from control vertices and a flat sequence of index triples.
    ///
    /// Every triple becomes one face with its own vertex copies. Each corner's
    /// normal is the normalized average of the normals of all faces touching the
    /// same position, so duplicated control vertices shade as one. Corners whose
    /// faces are all degenerate fall back to +Z.
    pub fn triangulate(vertices: &[Point3<f32>], indices: &[i32]) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::MalformedIndexSequence { len: indices.len() });
        }

        let resolved = indices
            .iter()
            .enumerate()
            .map(|(position, &index)| {
                usize::try_from(index)
                    .ok()
                    .filter(|&i| i < vertices.len())
                    .ok_or(MeshError::IndexOutOfRange {
                        index,
                        position,
                        len: vertices.len(),
                    })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let mut mesh = Self::with_capacity(resolved.len() / 3);
        let mut normal_sums: HashMap<[u32; 3], Vector3<f32>> = HashMap::new();

        for (face, triple) in resolved.chunks_exact(3).enumerate() {
            let [a, b, c] = [triple[0], triple[1], triple[2]];
            let triangle = Triangle::new(
                Vertex::at(vertices[a]),
                Vertex::at(vertices[b]),
                Vertex::at(vertices[c]),
                [a, b, c],
            );
            if triangle.normal == Vector3::zeros() {
                warn!("face {face} ({a}, {b}, {c}) is degenerate");
            }
            for vertex in &triangle.vertices {
                *normal_sums
                    .entry(position_key(&vertex.position))
                    .or_insert_with(Vector3::zeros) += triangle.normal;
            }
            mesh.add_triangle(triangle);
        }

        for triangle in &mut mesh.triangles {
            let face_normal = triangle.normal;
            for vertex in &mut triangle.vertices {
                vertex.normal = normal_sums
                    .get(&position_key(&vertex.position))
                    .and_then(|sum| sum.try_normalize(f32::EPSILON))
                    .or_else(|| face_normal.try_normalize(f32::EPSILON))
                    .unwrap_or_else(Vector3::z);
            }
        }

        debug!(
            "triangulated {} faces from {} control vertices",
            mesh.face_count(),
            vertices.len()
        );
        Ok(mesh)
    }
}

/// Hashable key for a vertex position; `-0.0` and `0.0` share a key
fn position_key(position: &Point3<f32>) -> [u32; 3] {
    [
        (position.x + 0.0).to_bits(),
        (position.y + 0.0).to_bits(),
        (position.z + 0.0).to_bits(),
    ]
}
