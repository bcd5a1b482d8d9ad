/// Error types shared by the core and its rendering hosts
use thiserror::Error;

use crate::scene::EntityId;

/// Failures while turning a vertex table and an index sequence into a mesh.
///
/// Both are construction-time errors; there is no valid partial mesh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("index {index} at position {position} is outside the vertex table (len {len})")]
    IndexOutOfRange {
        index: i32,
        position: usize,
        len: usize,
    },

    #[error("index sequence length {len} is not a multiple of 3")]
    MalformedIndexSequence { len: usize },
}

/// Errors surfaced by the heart application and its collaborators
#[derive(Error, Debug)]
pub enum HeartError {
    #[error("mesh construction failed: {0}")]
    Mesh(#[from] MeshError),

    #[error("target scale must be finite and greater than 1.0, got {0}")]
    InvalidTargetScale(f32),

    #[error("rotation step must be finite, got {0}")]
    InvalidRotationStep(f32),

    #[error("no scene node with id {0}")]
    UnknownEntity(EntityId),

    #[error("render failed: {0}")]
    Render(#[from] std::io::Error),
}

/// Result type for heart operations
pub type HeartResult<T> = Result<T, HeartError>;
