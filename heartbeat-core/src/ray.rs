/// Rays and ray/triangle intersection
use nalgebra::{Point3, Vector3};

/// A half-line with a unit-length direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Returns `None` when `direction` has no length.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Option<Self> {
        let direction = direction.try_normalize(f32::EPSILON)?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction * distance
    }

    /// Distance along the ray to triangle `abc`, hitting either side.
    ///
    /// Möller–Trumbore; hits behind the origin are ignored.
    pub fn intersect_triangle(
        &self,
        a: &Point3<f32>,
        b: &Point3<f32>,
        c: &Point3<f32>,
    ) -> Option<f32> {
        const EPSILON: f32 = 1e-7;

        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(&edge2);
        let det = edge1.dot(&p);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = self.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(&q) * inv_det;
        (t > EPSILON).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> [Point3<f32>; 3] {
        [
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_zero_direction_rejected() {
        assert!(Ray::new(Point3::origin(), Vector3::zeros()).is_none());
    }

    #[test]
    fn test_hits_front_and_back() {
        let [a, b, c] = triangle();
        let front = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vector3::z()).unwrap();
        let back = Ray::new(Point3::new(0.0, 0.0, -2.0), Vector3::z()).unwrap();

        let t = front.intersect_triangle(&a, &b, &c).unwrap();
        assert!((t - 5.0).abs() < 1e-5);
        assert!((front.at(t) - Point3::origin()).norm() < 1e-5);

        let t = back.intersect_triangle(&a, &b, &c).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_misses_outside_and_behind() {
        let [a, b, c] = triangle();
        let beside = Ray::new(Point3::new(3.0, 0.0, 5.0), -Vector3::z()).unwrap();
        let away = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::z()).unwrap();
        let parallel = Ray::new(Point3::new(0.0, 0.0, 1.0), Vector3::x()).unwrap();

        assert!(beside.intersect_triangle(&a, &b, &c).is_none());
        assert!(away.intersect_triangle(&a, &b, &c).is_none());
        assert!(parallel.intersect_triangle(&a, &b, &c).is_none());
    }
}
