use super::{ObjectId, Scene, SceneObject};
use crate::error::SceneError;
use crate::event::{EventBus, SceneEvent};

/// `Vec`-backed scene for headless use and tests
#[derive(Debug, Default)]
pub struct MemoryScene {
    objects: Vec<SceneObject>,
    events: EventBus,
    renders: usize,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times [`Scene::render`] was called
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Snapshot of all objects as JSON, back to front
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(&self.objects)?)
    }

    /// Replace the scene contents with a snapshot from [`to_json`](Self::to_json).
    ///
    /// Handlers only see a [`SceneEvent::Cleared`], not one add per object.
    pub fn load_json(&mut self, json: &str) -> Result<(), SceneError> {
        let objects: Vec<SceneObject> = serde_json::from_str(json)?;
        log::debug!("Loaded {} objects into scene", objects.len());
        self.objects = objects;
        self.events.emit(SceneEvent::Cleared);
        Ok(())
    }

    fn position(&self, id: ObjectId) -> Result<usize, SceneError> {
        self.index_of(id).ok_or(SceneError::ObjectNotFound(id))
    }
}

impl Scene for MemoryScene {
    fn add(&mut self, object: SceneObject) {
        self.objects.push(object.clone());
        self.events.emit(SceneEvent::ObjectAdded(object));
    }

    fn insert_at(&mut self, index: usize, object: SceneObject) {
        let index = index.min(self.objects.len());
        self.objects.insert(index, object.clone());
        self.events.emit(SceneEvent::ObjectAdded(object));
    }

    fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        let object = self.objects.remove(index);
        self.events.emit(SceneEvent::ObjectRemoved(id));
        Some(object)
    }

    fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id == id)
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn bring_to_front(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let index = self.position(id)?;
        let object = self.objects.remove(index);
        self.objects.push(object);
        Ok(())
    }

    fn send_to_back(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let index = self.position(id)?;
        let object = self.objects.remove(index);
        self.objects.insert(0, object);
        Ok(())
    }

    fn bring_forward(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let index = self.position(id)?;
        if index + 1 < self.objects.len() {
            self.objects.swap(index, index + 1);
        }
        Ok(())
    }

    fn send_backwards(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let index = self.position(id)?;
        if index > 0 {
            self.objects.swap(index, index - 1);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.events.emit(SceneEvent::Cleared);
    }

    fn render(&mut self) {
        self.renders += 1;
        log::trace!("Rendering {} objects", self.objects.len());
    }

    fn events(&self) -> &EventBus {
        &self.events
    }
}
