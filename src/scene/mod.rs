//! The scene an external renderer draws: addressable objects kept in
//! z-order, back to front.

mod memory;

use std::fmt;

use egui::{Color32, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SceneError;
use crate::event::EventBus;

pub use memory::MemoryScene;

/// Stable identity of an object in a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    /// Free-hand brush stroke
    Path,
    /// Several paths drawn as one
    Group,
    Line,
    Arrow,
    /// Arrowhead linked to an arrow
    Triangle,
    Rectangle,
    Circle,
    Polygon,
    Text,
}

impl ObjectKind {
    /// Kinds produced by the free-drawing brush rather than a shape tool
    pub fn is_freehand(self) -> bool {
        matches!(self, ObjectKind::Path | ObjectKind::Group)
    }
}

/// Dash pattern of an object's outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// A drawable object as far as the editing core is concerned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub bounds: Rect,
    pub stroke: Color32,
    pub fill: Option<Color32>,
    pub stroke_width: f32,
    #[serde(default)]
    pub line_type: LineType,
    /// Linked arrowhead that follows this object through removal and z-moves
    pub head: Option<ObjectId>,
}

impl SceneObject {
    pub fn new(kind: ObjectKind, bounds: Rect) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            bounds,
            stroke: Color32::BLACK,
            fill: None,
            stroke_width: 2.0,
            line_type: LineType::Solid,
            head: None,
        }
    }

    pub fn with_stroke(mut self, stroke: Color32, width: f32) -> Self {
        self.stroke = stroke;
        self.stroke_width = width;
        self
    }

    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    pub fn with_fill(mut self, fill: Color32) -> Self {
        self.fill = Some(fill);
        self
    }
}

/// The rendering collaborator: a mutable, z-ordered collection of objects.
pub trait Scene {
    /// Put an object on top of everything else
    fn add(&mut self, object: SceneObject);

    /// Put an object at a z-position, clamped to the top
    fn insert_at(&mut self, index: usize, object: SceneObject);

    fn remove(&mut self, id: ObjectId) -> Option<SceneObject>;

    fn get(&self, id: ObjectId) -> Option<&SceneObject>;

    fn index_of(&self, id: ObjectId) -> Option<usize>;

    /// All objects, back to front
    fn objects(&self) -> &[SceneObject];

    fn bring_to_front(&mut self, id: ObjectId) -> Result<(), SceneError>;

    fn send_to_back(&mut self, id: ObjectId) -> Result<(), SceneError>;

    /// Move one step towards the viewer
    fn bring_forward(&mut self, id: ObjectId) -> Result<(), SceneError>;

    /// Move one step away from the viewer
    fn send_backwards(&mut self, id: ObjectId) -> Result<(), SceneError>;

    fn clear(&mut self);

    fn render(&mut self);

    /// Bus notified of every add, remove and clear
    fn events(&self) -> &EventBus;

    fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    fn len(&self) -> usize {
        self.objects().len()
    }

    fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}
