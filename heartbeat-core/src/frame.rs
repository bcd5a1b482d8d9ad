/// Seams between the core and the host that owns the render loop
use crate::error::HeartResult;
use crate::picking::PointerEvent;
use crate::projection::{Camera, Viewport};
use crate::scene::Scene;

/// Draws a scene as seen from a camera
pub trait SceneRenderer {
    fn draw(&mut self, scene: &Scene, camera: &Camera) -> HeartResult<()>;
}

/// Callbacks a host invokes from its loop.
///
/// Hosts call these from a single thread and never reentrantly: a pointer
/// event is handled completely before or after a frame, never during one.
pub trait FrameHandler {
    /// Called once per displayed frame
    fn on_frame(&mut self, renderer: &mut dyn SceneRenderer) -> HeartResult<()>;

    /// Called for every click or tap
    fn on_pointer(&mut self, event: &PointerEvent, viewport: &Viewport);

    /// Called when the drawing surface changes size
    fn on_resize(&mut self, _viewport: &Viewport) {}
}

/// A host that repeatedly invokes a registered frame callback.
///
/// The callback is registered once at setup; the host owns the loop.
pub trait FrameScheduler {
    fn register_frame_callback(&mut self, handler: Box<dyn FrameHandler>);
}
