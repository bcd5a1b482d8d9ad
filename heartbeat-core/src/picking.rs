/// Pointer picking: turns clicks and taps into pulse requests
use log::debug;

use crate::projection::{Camera, Viewport};
use crate::scene::{EntityId, Scene};

/// One contact point of a touch event, in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub client_x: f32,
    pub client_y: f32,
}

/// A click or tap as delivered by the host's input system
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// Mouse events carry their coordinates directly
    Mouse { client_x: f32, client_y: f32 },
    /// Touch events carry them in the list of changed touches
    Touch { changed_touches: Vec<TouchPoint> },
}

impl PointerEvent {
    pub fn mouse(client_x: f32, client_y: f32) -> Self {
        Self::Mouse { client_x, client_y }
    }

    pub fn touch(client_x: f32, client_y: f32) -> Self {
        Self::Touch {
            changed_touches: vec![TouchPoint { client_x, client_y }],
        }
    }

    /// Screen position of the event; for touches, the first changed touch
    pub fn client_position(&self) -> Option<(f32, f32)> {
        match self {
            Self::Mouse { client_x, client_y } => Some((*client_x, *client_y)),
            Self::Touch { changed_touches } => changed_touches
                .first()
                .map(|touch| (touch.client_x, touch.client_y)),
        }
    }
}

/// Request for one beat, emitted when the target entity is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseRequest {
    pub source: EntityId,
}

/// Casts pointer events into the scene and reports clicks on one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulsePicker {
    target: EntityId,
}

impl PulsePicker {
    pub fn new(target: EntityId) -> Self {
        Self { target }
    }

    /// Returns a pulse request if the nearest object under the pointer is the
    /// target. Misses and hits on other objects yield `None`.
    pub fn pick(
        &self,
        event: &PointerEvent,
        viewport: &Viewport,
        camera: &Camera,
        scene: &Scene,
    ) -> Option<PulseRequest> {
        let (x, y) = event.client_position()?;
        let (ndc_x, ndc_y) = viewport.to_ndc(x, y)?;
        let ray = camera.ray_through(ndc_x, ndc_y)?;

        let nearest = scene.intersect(&ray).into_iter().next()?;
        if nearest.entity != self.target {
            debug!("pointer hit {} in front of {}", nearest.entity, self.target);
            return None;
        }

        debug!(
            "pointer hit {} on face {} at ({:.2}, {:.2}, {:.2}), distance {:.2}",
            nearest.entity,
            nearest.face,
            nearest.point.x,
            nearest.point.y,
            nearest.point.z,
            nearest.distance
        );
        Some(PulseRequest {
            source: nearest.entity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::material::{Material, Rgb};
    use nalgebra::Point3;

    fn square(z: f32, half: f32) -> Mesh {
        let vertices = [
            Point3::new(-half, -half, z),
            Point3::new(half, -half, z),
            Point3::new(half, half, z),
            Point3::new(-half, half, z),
        ];
        Mesh::triangulate(&vertices, &[0, 1, 2, 0, 2, 3]).unwrap()
    }

    fn setup() -> (Scene, EntityId, Camera, Viewport) {
        let mut scene = Scene::default();
        let target = scene.add_mesh(square(0.0, 1.0), Material::phong(Rgb::WHITE));
        (scene, target, Camera::new(800, 600), Viewport::new(800.0, 600.0))
    }

    #[test]
    fn test_touch_uses_first_changed_touch() {
        let event = PointerEvent::Touch {
            changed_touches: vec![
                TouchPoint {
                    client_x: 10.0,
                    client_y: 20.0,
                },
                TouchPoint {
                    client_x: 30.0,
                    client_y: 40.0,
                },
            ],
        };
        assert_eq!(event.client_position(), Some((10.0, 20.0)));
        assert_eq!(
            PointerEvent::Touch {
                changed_touches: vec![]
            }
            .client_position(),
            None
        );
        assert_eq!(PointerEvent::mouse(1.0, 2.0).client_position(), Some((1.0, 2.0)));
    }

    #[test]
    fn test_click_on_target_requests_pulse() {
        let (scene, target, camera, viewport) = setup();
        let picker = PulsePicker::new(target);

        let request = picker.pick(&PointerEvent::mouse(405.0, 297.0), &viewport, &camera, &scene);
        assert_eq!(request, Some(PulseRequest { source: target }));
    }

    #[test]
    fn test_tap_on_target_requests_pulse() {
        let (scene, target, camera, viewport) = setup();
        let picker = PulsePicker::new(target);

        let request = picker.pick(&PointerEvent::touch(390.0, 305.0), &viewport, &camera, &scene);
        assert!(request.is_some());
    }

    #[test]
    fn test_miss_is_ignored() {
        let (scene, target, camera, viewport) = setup();
        let picker = PulsePicker::new(target);

        assert!(picker
            .pick(&PointerEvent::mouse(10.0, 10.0), &viewport, &camera, &scene)
            .is_none());
        assert!(picker
            .pick(
                &PointerEvent::Touch {
                    changed_touches: vec![]
                },
                &viewport,
                &camera,
                &scene
            )
            .is_none());
    }

    #[test]
    fn test_occluded_target_is_ignored() {
        let (mut scene, target, camera, viewport) = setup();
        let blocker = scene.add_mesh(square(2.0, 0.5), Material::phong(Rgb::WHITE));
        let picker = PulsePicker::new(target);

        // Centre is covered by the blocker
        assert!(picker
            .pick(&PointerEvent::mouse(402.0, 299.0), &viewport, &camera, &scene)
            .is_none());

        // The blocker itself is pickable
        let blocker_picker = PulsePicker::new(blocker);
        assert!(blocker_picker
            .pick(&PointerEvent::mouse(402.0, 299.0), &viewport, &camera, &scene)
            .is_some());
    }

    #[test]
    fn test_zero_sized_viewport_is_ignored() {
        let (scene, target, camera, _) = setup();
        let picker = PulsePicker::new(target);
        let viewport = Viewport::new(0.0, 0.0);
        assert!(picker
            .pick(&PointerEvent::mouse(0.0, 0.0), &viewport, &camera, &scene)
            .is_none());
    }
}
