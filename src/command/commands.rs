use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::{CommandError, CommandResult, Undoable};
use crate::error::SceneError;
use crate::scene::{ObjectId, Scene, SceneObject};

type Action = Box<dyn Fn() -> CommandResult>;

/// A command built from a pair of closures
pub struct Command {
    label: String,
    undo: Action,
    redo: Action,
}

impl Command {
    pub fn new<U, R>(label: impl Into<String>, undo: U, redo: R) -> Self
    where
        U: Fn() -> CommandResult + 'static,
        R: Fn() -> CommandResult + 'static,
    {
        Self {
            label: label.into(),
            undo: Box::new(undo),
            redo: Box::new(redo),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("label", &self.label).finish()
    }
}

impl Undoable for Command {
    fn undo(&self) -> CommandResult {
        (self.undo)()
    }

    fn redo(&self) -> CommandResult {
        (self.redo)()
    }

    fn label(&self) -> &str {
        &self.label
    }
}

fn upgrade<S>(scene: &Weak<RefCell<S>>) -> Result<Rc<RefCell<S>>, CommandError> {
    scene.upgrade().ok_or(CommandError::SceneDropped)
}

/// Objects that were added to a scene together, e.g. an arrow and its head.
///
/// Undo takes them out again, redo puts them back on top.
pub struct AddObjects<S> {
    scene: Weak<RefCell<S>>,
    objects: RefCell<Vec<SceneObject>>,
}

impl<S: Scene> AddObjects<S> {
    pub fn new(scene: Weak<RefCell<S>>, objects: Vec<SceneObject>) -> Self {
        Self {
            scene,
            objects: RefCell::new(objects),
        }
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.borrow().iter().map(|object| object.id).collect()
    }
}

impl<S: Scene> Undoable for AddObjects<S> {
    fn undo(&self) -> CommandResult {
        let scene = upgrade(&self.scene)?;
        let mut scene = scene.borrow_mut();
        for object in self.objects.borrow_mut().iter_mut().rev() {
            // Keep edits made since the add (e.g. a new stroke color) for redo
            match scene.remove(object.id) {
                Some(current) => *object = current,
                None => log::trace!("Object {} already gone from scene", object.id),
            }
        }
        Ok(())
    }

    fn redo(&self) -> CommandResult {
        let scene = upgrade(&self.scene)?;
        let mut scene = scene.borrow_mut();
        for object in self.objects.borrow().iter() {
            if !scene.contains(object.id) {
                scene.add(object.clone());
            }
        }
        Ok(())
    }

    fn label(&self) -> &str {
        "add objects"
    }
}

/// Objects deleted from a scene, remembered with their z-positions so undo
/// can put them back exactly where they were.
pub struct RemoveObjects<S> {
    scene: Weak<RefCell<S>>,
    removed: RefCell<Vec<(usize, SceneObject)>>,
}

impl<S: Scene> RemoveObjects<S> {
    /// Remove `ids` from the scene and return the command that reverses it.
    ///
    /// Fails without touching the scene if the first id is not present.
    /// Later ids (linked objects) are skipped when missing.
    pub fn apply(scene: &Rc<RefCell<S>>, ids: &[ObjectId]) -> Result<Self, SceneError> {
        if let Some(&first) = ids.first() {
            if !scene.borrow().contains(first) {
                return Err(SceneError::ObjectNotFound(first));
            }
        }

        let removed = take_objects(&mut *scene.borrow_mut(), ids);
        Ok(Self {
            scene: Rc::downgrade(scene),
            removed: RefCell::new(removed),
        })
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.removed.borrow().iter().map(|(_, object)| object.id).collect()
    }
}

/// Removes every present id, returning `(original index, object)` pairs in
/// ascending index order.
fn take_objects<S: Scene>(scene: &mut S, ids: &[ObjectId]) -> Vec<(usize, SceneObject)> {
    let mut positions: Vec<(usize, ObjectId)> = ids
        .iter()
        .filter_map(|&id| scene.index_of(id).map(|index| (index, id)))
        .collect();
    positions.sort_unstable_by_key(|(index, _)| *index);

    // Remove from the top down so the lower indices stay valid
    let mut removed: Vec<(usize, SceneObject)> = positions
        .iter()
        .rev()
        .filter_map(|&(index, id)| scene.remove(id).map(|object| (index, object)))
        .collect();
    removed.reverse();
    removed
}

impl<S: Scene> Undoable for RemoveObjects<S> {
    fn undo(&self) -> CommandResult {
        let scene = upgrade(&self.scene)?;
        let mut scene = scene.borrow_mut();
        for (index, object) in self.removed.borrow().iter() {
            scene.insert_at(*index, object.clone());
        }
        Ok(())
    }

    fn redo(&self) -> CommandResult {
        let scene = upgrade(&self.scene)?;
        let ids = self.ids();
        let mut scene = scene.borrow_mut();
        if let Some(&first) = ids.first() {
            if !scene.contains(first) {
                return Err(SceneError::ObjectNotFound(first).into());
            }
        }
        let removed = take_objects(&mut *scene, &ids);
        *self.removed.borrow_mut() = removed;
        Ok(())
    }

    fn label(&self) -> &str {
        "remove objects"
    }
}
