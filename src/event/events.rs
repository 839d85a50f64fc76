use crate::scene::{ObjectId, SceneObject};

/// Changes to a scene's object list, in the order they happened
#[derive(Debug, Clone)]
pub enum SceneEvent {
    /// An object was added or re-inserted
    ObjectAdded(SceneObject),
    ObjectRemoved(ObjectId),
    /// Every object was dropped at once
    Cleared,
}
