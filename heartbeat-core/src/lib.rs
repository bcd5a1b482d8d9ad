/// Heartbeat Core Library - procedural heart mesh, beat animation and picking
///
/// This library builds the heart mesh from its control vertices, derives the
/// wireframe overlay, turns pointer events into pulse requests and steps the
/// beat animation once per frame. Rendering and the frame loop belong to the
/// host, which plugs in through the traits in [`frame`].

pub mod app;
pub mod beat;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod heart;
pub mod material;
pub mod picking;
pub mod projection;
pub mod ray;
pub mod scene;
pub mod transform;
pub mod wireframe;

// Re-export commonly used types
pub use app::{HeartApp, HeartConfig};
pub use beat::{AnimationState, BeatAnimator};
pub use error::{HeartError, HeartResult, MeshError};
pub use frame::{FrameHandler, FrameScheduler, SceneRenderer};
pub use geometry::{Mesh, Triangle, Vertex};
pub use material::{Material, Rgb, StrokeStyle};
pub use picking::{PointerEvent, PulsePicker, PulseRequest, TouchPoint};
pub use projection::{Camera, ProjectionMode, Viewport};
pub use ray::Ray;
pub use scene::{Drawable, EntityId, Hit, Lighting, Node, Scene};
pub use transform::{RotationState, Transform};
pub use wireframe::{Edge, Wireframe};
