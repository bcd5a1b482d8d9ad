/// Camera, viewport and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::ray::Ray;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Size of the drawing surface in pixels (or terminal cells)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Map a point in viewport space (origin top-left, y down) to normalized
    /// device coordinates (origin centre, y up, both axes in `-1..=1`).
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some((x / self.width * 2.0 - 1.0, -(y / self.height) * 2.0 + 1.0))
    }

    /// Inverse of [`Viewport::to_ndc`]
    pub fn from_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        ((x + 1.0) * 0.5 * self.width, (1.0 - y) * 0.5 * self.height)
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height as f32,
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a point in model space to normalized device coordinates.
    ///
    /// Returns `None` for points behind the camera or outside the depth range.
    pub fn project_to_ndc(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
    ) -> Option<Point3<f32>> {
        let clip = self.view_projection() * model_matrix * point.to_homogeneous();

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = Point3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w);
        if ndc.z < -1.0 || ndc.z > 1.0 {
            return None;
        }
        Some(ndc)
    }

    /// Project a 3D point to 2D screen space, returning `(x, y, depth)`
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        viewport: &Viewport,
    ) -> Option<(f32, f32, f32)> {
        let ndc = self.project_to_ndc(point, model_matrix)?;
        let (x, y) = viewport.from_ndc(ndc.x, ndc.y);
        Some((x, y, ndc.z))
    }

    /// Cast a ray from the camera through a point given in normalized device
    /// coordinates.
    pub fn ray_through(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        match self.mode {
            ProjectionMode::Perspective => {
                let half_height = (self.fov / 2.0).tan();
                let eye_direction =
                    Vector3::new(ndc_x * half_height * self.aspect, ndc_y * half_height, -1.0);
                let camera_to_world = self.view_matrix().try_inverse()?;
                Ray::new(self.position, camera_to_world.transform_vector(&eye_direction))
            }
            ProjectionMode::Orthographic => {
                let inverse = self.view_projection().try_inverse()?;
                let near = inverse.transform_point(&Point3::new(ndc_x, ndc_y, -1.0));
                let far = inverse.transform_point(&Point3::new(ndc_x, ndc_y, 1.0));
                Ray::new(near, far - near)
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.mode, ProjectionMode::Perspective);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::new(800, 600);
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_viewport_to_ndc() {
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(viewport.to_ndc(400.0, 300.0), Some((0.0, 0.0)));
        assert_eq!(viewport.to_ndc(0.0, 0.0), Some((-1.0, 1.0)));
        assert_eq!(viewport.to_ndc(800.0, 600.0), Some((1.0, -1.0)));
        assert_eq!(Viewport::new(0.0, 600.0).to_ndc(1.0, 1.0), None);
    }

    #[test]
    fn test_viewport_round_trip() {
        let viewport = Viewport::new(120.0, 40.0);
        let (x, y) = viewport.to_ndc(30.0, 10.0).unwrap();
        let (sx, sy) = viewport.from_ndc(x, y);
        assert!((sx - 30.0).abs() < 1e-4);
        assert!((sy - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_target_projects_to_centre() {
        let camera = Camera::new(800, 600);
        let ndc = camera
            .project_to_ndc(&camera.target, &Matrix4::identity())
            .unwrap();
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
    }

    #[test]
    fn test_points_behind_camera_are_rejected() {
        let camera = Camera::new(800, 600);
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(camera.project_to_ndc(&behind, &Matrix4::identity()).is_none());
    }

    #[test]
    fn test_centre_ray_points_at_target() {
        let camera = Camera::new(800, 600);
        let ray = camera.ray_through(0.0, 0.0).unwrap();
        assert!((ray.origin - camera.position).norm() < 1e-5);
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_ray_passes_through_projected_point() {
        let camera = Camera::new(800, 600);
        let point = Point3::new(0.7, -0.4, 0.5);
        let ndc = camera.project_to_ndc(&point, &Matrix4::identity()).unwrap();
        let ray = camera.ray_through(ndc.x, ndc.y).unwrap();

        let to_point = point - ray.origin;
        let along = to_point.dot(&ray.direction);
        assert!((ray.at(along) - point).norm() < 1e-4);
    }

    #[test]
    fn test_orthographic_ray_is_parallel() {
        let mut camera = Camera::new(800, 600);
        camera.mode = ProjectionMode::Orthographic;
        let left = camera.ray_through(-0.5, 0.0).unwrap();
        let right = camera.ray_through(0.5, 0.0).unwrap();
        assert!((left.direction - right.direction).norm() < 1e-5);
        assert!((left.origin - right.origin).norm() > 0.1);
    }
}
