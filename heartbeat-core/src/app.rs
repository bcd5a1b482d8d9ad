/// The rotating, beating heart: wires the mesh, picker and animator to a host
use log::{debug, info};
use nalgebra::{Point3, Vector3};

use crate::beat::BeatAnimator;
use crate::error::{HeartError, HeartResult};
use crate::frame::{FrameHandler, SceneRenderer};
use crate::heart::heart_mesh;
use crate::material::{Material, Rgb, StrokeStyle};
use crate::picking::{PointerEvent, PulsePicker, PulseRequest};
use crate::projection::{Camera, ProjectionMode, Viewport};
use crate::scene::{AmbientLight, Drawable, EntityId, Lighting, PointLight, Scene};
use crate::wireframe::Wireframe;

/// Tunables for the heart scene
#[derive(Debug, Clone, PartialEq)]
pub struct HeartConfig {
    /// Peak scale of a beat, greater than 1.0
    pub target_scale: f32,
    /// Radians the heart turns about Y each frame (clockwise seen from above)
    pub rotation_step: f32,
    pub heart_color: Rgb,
    pub wireframe: bool,
    pub wireframe_style: StrokeStyle,
    pub background: Rgb,
    pub camera_position: Point3<f32>,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub light_intensity: f32,
    pub ambient: AmbientLight,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            target_scale: 1.05,
            rotation_step: 0.005,
            heart_color: Rgb::from_hex(0xC00000),
            wireframe: true,
            wireframe_style: StrokeStyle {
                color: Rgb::from_hex(0xFFFFFF),
                line_width: 2.0,
            },
            background: Rgb::from_hex(0xFAEECD),
            camera_position: Point3::new(0.0, 8.0, 100.0),
            fov_degrees: 60.0,
            near: 1.0,
            far: 100.0,
            aspect: 16.0 / 9.0,
            light_intensity: 1.0,
            ambient: AmbientLight {
                color: Rgb::from_hex(0x404040),
                intensity: 0.5,
            },
        }
    }
}

impl HeartConfig {
    pub fn validate(&self) -> HeartResult<()> {
        if !self.target_scale.is_finite() || self.target_scale <= 1.0 {
            return Err(HeartError::InvalidTargetScale(self.target_scale));
        }
        if !self.rotation_step.is_finite() {
            return Err(HeartError::InvalidRotationStep(self.rotation_step));
        }
        Ok(())
    }

    /// Camera looking down -Z from `camera_position`
    pub fn camera(&self) -> Camera {
        let position = self.camera_position;
        Camera {
            position,
            target: Point3::new(position.x, position.y, 0.0),
            up: Vector3::y(),
            fov: self.fov_degrees.to_radians(),
            aspect: self.aspect,
            near: self.near,
            far: self.far,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Point light at the camera plus a soft ambient fill
    pub fn lighting(&self) -> Lighting {
        Lighting {
            point: PointLight {
                position: self.camera_position,
                color: Rgb::WHITE,
                intensity: self.light_intensity,
            },
            ambient: self.ambient,
        }
    }
}

/// Scene state for the heart plus the per-frame and pointer callbacks
#[derive(Debug)]
pub struct HeartApp {
    scene: Scene,
    camera: Camera,
    heart: EntityId,
    picker: PulsePicker,
    animator: BeatAnimator,
    pending: Option<PulseRequest>,
    rotation_step: f32,
    frames: u64,
}

impl HeartApp {
    pub fn new(config: HeartConfig) -> HeartResult<Self> {
        config.validate()?;

        let mesh = heart_mesh()?;
        let wireframe = config
            .wireframe
            .then(|| Wireframe::from_mesh(&mesh, config.wireframe_style));

        let mut scene = Scene::new(config.background, config.lighting());
        let heart = scene.add_mesh(mesh, Material::phong(config.heart_color));
        if let Some(wireframe) = wireframe {
            scene.attach_child(heart, Drawable::lines(wireframe))?;
        }
        info!("heart scene ready, heart entity {heart}");

        Ok(Self {
            scene,
            camera: config.camera(),
            heart,
            picker: PulsePicker::new(heart),
            animator: BeatAnimator::new(config.target_scale),
            pending: None,
            rotation_step: config.rotation_step,
            frames: 0,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn heart_id(&self) -> EntityId {
        self.heart
    }

    pub fn animator(&self) -> &BeatAnimator {
        &self.animator
    }

    pub fn has_pending_pulse(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames advanced so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Rotate the heart and step the beat, without drawing
    pub fn advance(&mut self) -> HeartResult<()> {
        let scale = self.animator.step(self.pending.take());
        let node = self
            .scene
            .node_mut(self.heart)
            .ok_or(HeartError::UnknownEntity(self.heart))?;
        node.transform.rotation.rotate(0.0, -self.rotation_step, 0.0);
        node.transform.scale = scale;
        self.frames += 1;
        Ok(())
    }
}

impl FrameHandler for HeartApp {
    fn on_frame(&mut self, renderer: &mut dyn SceneRenderer) -> HeartResult<()> {
        renderer.draw(&self.scene, &self.camera)?;
        self.advance()
    }

    fn on_pointer(&mut self, event: &PointerEvent, viewport: &Viewport) {
        if let Some(request) = self.picker.pick(event, viewport, &self.camera, &self.scene) {
            if self.pending.replace(request).is_some() {
                debug!("pulse already pending, coalesced");
            }
        }
    }

    fn on_resize(&mut self, viewport: &Viewport) {
        self.camera.set_aspect(viewport.aspect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beat::{AnimationState, BASE_SCALE};

    /// Records the heart's scale and rotation at each draw
    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<(f32, f32)>,
    }

    impl SceneRenderer for RecordingRenderer {
        fn draw(&mut self, scene: &Scene, _camera: &Camera) -> HeartResult<()> {
            let node = &scene.nodes()[0];
            self.frames
                .push((node.transform.scale, node.transform.rotation.y));
            Ok(())
        }
    }

    struct FailingRenderer;

    impl SceneRenderer for FailingRenderer {
        fn draw(&mut self, _scene: &Scene, _camera: &Camera) -> HeartResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into())
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(1600.0, 900.0)
    }

    /// Screen position of a point inside the heart's right lobe
    fn heart_centre(app: &HeartApp) -> PointerEvent {
        let ndc = app
            .camera()
            .project_to_ndc(&Point3::new(2.0, 7.0, 0.0), &nalgebra::Matrix4::identity())
            .unwrap();
        let (x, y) = viewport().from_ndc(ndc.x, ndc.y);
        PointerEvent::mouse(x, y)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = HeartConfig {
            target_scale: 1.0,
            ..HeartConfig::default()
        };
        assert!(matches!(
            HeartApp::new(config),
            Err(HeartError::InvalidTargetScale(_))
        ));

        let config = HeartConfig {
            rotation_step: f32::NAN,
            ..HeartConfig::default()
        };
        assert!(matches!(
            HeartApp::new(config),
            Err(HeartError::InvalidRotationStep(_))
        ));
    }

    #[test]
    fn test_scene_has_heart_with_wireframe_child() {
        let app = HeartApp::new(HeartConfig::default()).unwrap();
        let node = app.scene().node(app.heart_id()).unwrap();
        assert!(matches!(node.drawable, Drawable::Mesh { .. }));
        assert_eq!(node.children.len(), 1);
        assert!(matches!(node.children[0].drawable, Drawable::Lines(_)));

        let bare = HeartApp::new(HeartConfig {
            wireframe: false,
            ..HeartConfig::default()
        })
        .unwrap();
        assert!(bare.scene().node(bare.heart_id()).unwrap().children.is_empty());
    }

    #[test]
    fn test_frame_draws_then_rotates() {
        let mut app = HeartApp::new(HeartConfig::default()).unwrap();
        let mut renderer = RecordingRenderer::default();

        app.on_frame(&mut renderer).unwrap();
        app.on_frame(&mut renderer).unwrap();

        assert_eq!(renderer.frames[0], (BASE_SCALE, 0.0));
        assert!((renderer.frames[1].1 + 0.005).abs() < 1e-6);
        assert_eq!(app.frames(), 2);
    }

    #[test]
    fn test_render_error_is_surfaced() {
        let mut app = HeartApp::new(HeartConfig::default()).unwrap();
        assert!(matches!(
            app.on_frame(&mut FailingRenderer),
            Err(HeartError::Render(_))
        ));
        assert_eq!(app.frames(), 0);
    }

    #[test]
    fn test_click_on_heart_starts_beat_next_frame() {
        let mut app = HeartApp::new(HeartConfig::default()).unwrap();
        let mut renderer = RecordingRenderer::default();

        app.on_pointer(&heart_centre(&app), &viewport());
        assert!(app.has_pending_pulse());
        assert_eq!(app.animator().state(), AnimationState::Idle);

        app.on_frame(&mut renderer).unwrap();
        assert!(!app.has_pending_pulse());
        assert_eq!(app.animator().state(), AnimationState::Growing);

        while app.animator().is_beating() {
            app.on_frame(&mut renderer).unwrap();
        }
        let node = app.scene().node(app.heart_id()).unwrap();
        assert_eq!(node.transform.scale, BASE_SCALE);
        assert!(renderer
            .frames
            .iter()
            .any(|&(scale, _)| (scale - 1.05).abs() < 1e-6));
    }

    #[test]
    fn test_click_on_background_does_nothing() {
        let mut app = HeartApp::new(HeartConfig::default()).unwrap();
        app.on_pointer(&PointerEvent::mouse(5.0, 5.0), &viewport());
        assert!(!app.has_pending_pulse());
    }

    #[test]
    fn test_repeated_clicks_coalesce() {
        let mut app = HeartApp::new(HeartConfig::default()).unwrap();
        let mut renderer = RecordingRenderer::default();
        let click = heart_centre(&app);

        app.on_pointer(&click, &viewport());
        app.on_pointer(&click, &viewport());
        app.on_frame(&mut renderer).unwrap();
        assert!(!app.has_pending_pulse());

        // Clicks during the beat are consumed without restarting it
        let mut frames = 1;
        while app.animator().is_beating() {
            app.on_pointer(&click, &viewport());
            app.on_frame(&mut renderer).unwrap();
            frames += 1;
        }
        assert_eq!(frames, 23);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut app = HeartApp::new(HeartConfig::default()).unwrap();
        app.on_resize(&Viewport::new(400.0, 400.0));
        assert!((app.camera().aspect - 1.0).abs() < 1e-6);
    }
}
