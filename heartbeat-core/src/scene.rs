/// Scene graph: drawable nodes with explicit ids, lights and ray queries
use std::fmt;

use nalgebra::{Matrix4, Point3};

use crate::error::{HeartError, HeartResult};
use crate::geometry::Mesh;
use crate::material::{Material, Rgb};
use crate::ray::Ray;
use crate::transform::Transform;
use crate::wireframe::Wireframe;

/// Stable identifier of a scene node, compared by value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

impl EntityId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node draws
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Mesh { mesh: Mesh, material: Material },
    Lines(Wireframe),
}

impl Drawable {
    pub fn lines(wireframe: Wireframe) -> Self {
        Self::Lines(wireframe)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: EntityId,
    pub drawable: Drawable,
    pub transform: Transform,
    pub children: Vec<Node>,
}

impl Node {
    fn find(&self, id: EntityId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn find_mut(&mut self, id: EntityId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// World matrix of `id` if it is this node or one of its descendants
    fn world_matrix(&self, id: EntityId, parent: &Matrix4<f32>) -> Option<Matrix4<f32>> {
        let world = parent * self.transform.matrix();
        if self.id == id {
            return Some(world);
        }
        self.children
            .iter()
            .find_map(|child| child.world_matrix(id, &world))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub color: Rgb,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub point: PointLight,
    pub ambient: AmbientLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            point: PointLight {
                position: Point3::new(0.0, 0.0, 10.0),
                color: Rgb::WHITE,
                intensity: 1.0,
            },
            ambient: AmbientLight {
                color: Rgb::from_hex(0x404040),
                intensity: 0.5,
            },
        }
    }
}

/// A ray hit against a pickable node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub entity: EntityId,
    pub distance: f32,
    pub point: Point3<f32>,
    /// Index of the triangle that was hit
    pub face: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Rgb,
    pub lighting: Lighting,
    nodes: Vec<Node>,
    next_id: u32,
}

impl Scene {
    pub fn new(background: Rgb, lighting: Lighting) -> Self {
        Self {
            background,
            lighting,
            nodes: Vec::new(),
            next_id: 0,
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a mesh with its material as a top-level drawable node
    pub fn add_mesh(&mut self, mesh: Mesh, material: Material) -> EntityId {
        let id = self.allocate_id();
        self.nodes.push(Node {
            id,
            drawable: Drawable::Mesh { mesh, material },
            transform: Transform::identity(),
            children: Vec::new(),
        });
        id
    }

    /// Attach a drawable under `parent`; it inherits the parent's transform
    pub fn attach_child(&mut self, parent: EntityId, drawable: Drawable) -> HeartResult<EntityId> {
        if self.node(parent).is_none() {
            return Err(HeartError::UnknownEntity(parent));
        }
        let id = self.allocate_id();
        let node = self
            .node_mut(parent)
            .ok_or(HeartError::UnknownEntity(parent))?;
        node.children.push(Node {
            id,
            drawable,
            transform: Transform::identity(),
            children: Vec::new(),
        });
        Ok(id)
    }

    /// Top-level nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: EntityId) -> Option<&Node> {
        self.nodes.iter().find_map(|node| node.find(id))
    }

    pub fn node_mut(&mut self, id: EntityId) -> Option<&mut Node> {
        self.nodes.iter_mut().find_map(|node| node.find_mut(id))
    }

    pub fn world_matrix(&self, id: EntityId) -> Option<Matrix4<f32>> {
        let root = Matrix4::identity();
        self.nodes
            .iter()
            .find_map(|node| node.world_matrix(id, &root))
    }

    /// Intersect `ray` with the top-level mesh nodes, nearest hit first.
    ///
    /// Child overlays are not pickable.
    pub fn intersect(&self, ray: &Ray) -> Vec<Hit> {
        let mut hits = Vec::new();

        for node in &self.nodes {
            let Drawable::Mesh { mesh, .. } = &node.drawable else {
                continue;
            };
            let world = node.transform.matrix();
            let nearest = mesh
                .triangles
                .iter()
                .enumerate()
                .filter_map(|(face, triangle)| {
                    let [a, b, c] = triangle
                        .vertices
                        .map(|vertex| world.transform_point(&vertex.position));
                    ray.intersect_triangle(&a, &b, &c)
                        .map(|distance| (face, distance))
                })
                .min_by(|x, y| x.1.total_cmp(&y.1));

            if let Some((face, distance)) = nearest {
                hits.push(Hit {
                    entity: node.id,
                    distance,
                    point: ray.at(distance),
                    face,
                });
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Rgb::from_hex(0x000000), Lighting::default())
    }
}
