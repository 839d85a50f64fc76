use thiserror::Error;

use crate::scene::ObjectId;

/// Errors raised by a [`Scene`](crate::scene::Scene) implementation
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Object {0} is not part of the scene")]
    ObjectNotFound(ObjectId),

    #[error("Failed to (de)serialize scene: {0}")]
    Serialization(#[from] serde_json::Error),
}
