/// Heartbeat Web - WASM bindings for a browser-hosted heart
///
/// JavaScript owns the WebGL context and the `requestAnimationFrame` loop. Each
/// refresh it calls `frame()`, uploads the buffers exposed here and forwards
/// click/touch events to `pointer()`.
use heartbeat_core::{
    AnimationState, Camera, Drawable, FrameHandler, HeartApp, HeartConfig, HeartResult, Node,
    PointerEvent, Scene, SceneRenderer, TouchPoint, Viewport,
};
use log::debug;
use nalgebra::Matrix4;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Flattens the scene into vertex buffers for a WebGL host
#[derive(Debug, Default)]
pub struct BufferRenderer {
    /// xyz per triangle corner, in model space
    pub positions: Vec<f32>,
    /// Smooth normal per triangle corner
    pub normals: Vec<f32>,
    /// xyz pairs per wireframe edge, in model space
    pub edges: Vec<f32>,
    /// Column-major model matrix of the heart
    pub model: Vec<f32>,
    /// Column-major projection * view
    pub view_projection: Vec<f32>,
    /// Set once the static geometry has been flattened
    geometry_ready: bool,
}

impl BufferRenderer {
    fn flatten_geometry(&mut self, node: &Node) {
        match &node.drawable {
            Drawable::Mesh { mesh, .. } => {
                for vertex in mesh.vertices() {
                    self.positions.extend(vertex.position.iter());
                    self.normals.extend(vertex.normal.iter());
                }
            }
            Drawable::Lines(wireframe) => {
                for edge in &wireframe.edges {
                    self.edges.extend(edge.start.iter());
                    self.edges.extend(edge.end.iter());
                }
            }
        }
        for child in &node.children {
            self.flatten_geometry(child);
        }
    }
}

impl SceneRenderer for BufferRenderer {
    fn draw(&mut self, scene: &Scene, camera: &Camera) -> HeartResult<()> {
        // Geometry never changes after construction, only the transform does
        if !self.geometry_ready {
            for node in scene.nodes() {
                self.flatten_geometry(node);
            }
            self.geometry_ready = true;
        }

        let model = scene
            .nodes()
            .first()
            .map(|node| node.transform.matrix())
            .unwrap_or_else(Matrix4::identity);
        self.model = model.as_slice().to_vec();
        self.view_projection = camera.view_projection().as_slice().to_vec();
        Ok(())
    }
}

/// Normalize a DOM mouse or touch event into a pointer event
fn pointer_from_dom(event: &web_sys::Event) -> Option<PointerEvent> {
    // Touch events carry their coordinates in the changed touches list
    if event.type_().starts_with("touch") {
        let touch_event = event.unchecked_ref::<web_sys::TouchEvent>();
        let touches = touch_event.changed_touches();
        let changed_touches = (0..touches.length())
            .filter_map(|i| touches.get(i))
            .map(|touch| TouchPoint {
                client_x: touch.client_x() as f32,
                client_y: touch.client_y() as f32,
            })
            .collect();
        return Some(PointerEvent::Touch { changed_touches });
    }

    event
        .dyn_ref::<web_sys::MouseEvent>()
        .map(|mouse| PointerEvent::mouse(mouse.client_x() as f32, mouse.client_y() as f32))
}

#[wasm_bindgen]
pub struct WebHeart {
    app: HeartApp,
    renderer: BufferRenderer,
    viewport: Viewport,
}

#[wasm_bindgen]
impl WebHeart {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Result<WebHeart, JsValue> {
        let viewport = Viewport::new(width, height);
        let config = HeartConfig {
            aspect: viewport.aspect(),
            ..HeartConfig::default()
        };
        let app = HeartApp::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(WebHeart {
            app,
            renderer: BufferRenderer::default(),
            viewport,
        })
    }

    /// Size the heart to the browser window
    #[wasm_bindgen(js_name = fromWindow)]
    pub fn from_window() -> Result<WebHeart, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let width = window.inner_width()?.as_f64().unwrap_or(800.0);
        let height = window.inner_height()?.as_f64().unwrap_or(600.0);
        Self::new(width as f32, height as f32)
    }

    /// Render a frame: refresh the buffers, then rotate and step the beat
    pub fn frame(&mut self) -> Result<(), JsValue> {
        self.app
            .on_frame(&mut self.renderer)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Forward a DOM `click` or `touchend` event
    pub fn pointer(&mut self, event: &web_sys::Event) {
        match pointer_from_dom(event) {
            Some(pointer) => self.app.on_pointer(&pointer, &self.viewport),
            None => debug!("ignoring event {}", event.type_()),
        }
    }

    /// Forward a click at viewport coordinates
    pub fn click(&mut self, client_x: f32, client_y: f32) {
        self.app
            .on_pointer(&PointerEvent::mouse(client_x, client_y), &self.viewport);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.app.on_resize(&self.viewport);
    }

    pub fn positions(&self) -> Vec<f32> {
        self.renderer.positions.clone()
    }

    pub fn normals(&self) -> Vec<f32> {
        self.renderer.normals.clone()
    }

    pub fn edges(&self) -> Vec<f32> {
        self.renderer.edges.clone()
    }

    #[wasm_bindgen(js_name = modelMatrix)]
    pub fn model_matrix(&self) -> Vec<f32> {
        self.renderer.model.clone()
    }

    #[wasm_bindgen(js_name = viewProjection)]
    pub fn view_projection(&self) -> Vec<f32> {
        self.renderer.view_projection.clone()
    }

    /// Current uniform scale of the heart
    pub fn scale(&self) -> f32 {
        self.app.animator().scale()
    }

    /// Beat phase: `"idle"`, `"growing"` or `"shrinking"`
    pub fn state(&self) -> String {
        match self.app.animator().state() {
            AnimationState::Idle => "idle",
            AnimationState::Growing => "growing",
            AnimationState::Shrinking => "shrinking",
        }
        .to_string()
    }
}
