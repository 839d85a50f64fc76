use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use egui::{Color32, Rect};

use crate::command::{AddObjects, CommandResult, RemoveObjects, UndoManager};
use crate::config::{CanvasSettings, SettingsError};
use crate::error::SceneError;
use crate::event::{EventHandler, SceneEvent};
use crate::scene::{ObjectId, ObjectKind, Scene, SceneObject};

const ZOOM_STEP: f32 = 1.1;

type ChangeHook = Rc<RefCell<Option<Rc<dyn Fn()>>>>;

/// Enabled state of the history buttons, refreshed on every history change
#[derive(Debug, Default)]
pub struct ToolbarState {
    undo_enabled: Cell<bool>,
    redo_enabled: Cell<bool>,
}

impl ToolbarState {
    fn sync(&self, history: &UndoManager) {
        self.undo_enabled.set(history.has_undo());
        self.redo_enabled.set(history.has_redo());
    }

    pub fn undo_enabled(&self) -> bool {
        self.undo_enabled.get()
    }

    pub fn redo_enabled(&self) -> bool {
        self.redo_enabled.get()
    }
}

/// Records brush strokes that land in the scene without going through
/// [`LumenCanvas::add_shape`].
struct FreehandRecorder<S> {
    scene: Weak<RefCell<S>>,
    history: Weak<UndoManager>,
}

impl<S: Scene + 'static> EventHandler for FreehandRecorder<S> {
    fn handle_event(&mut self, event: &SceneEvent) {
        let SceneEvent::ObjectAdded(object) = event else {
            return;
        };
        if !object.kind.is_freehand() {
            return;
        }
        if let Some(history) = self.history.upgrade() {
            // Re-adds from redo arrive here too; the history drops them.
            history.add(AddObjects::new(self.scene.clone(), vec![object.clone()]));
        }
    }
}

/// Editing core of the drawing widget: a scene plus the undo history that
/// tracks edits to it.
pub struct LumenCanvas<S: Scene> {
    settings: CanvasSettings,
    scene: Rc<RefCell<S>>,
    history: Rc<UndoManager>,
    toolbar: Rc<ToolbarState>,
    on_change: ChangeHook,
    zoom: f32,
}

impl<S: Scene + 'static> LumenCanvas<S> {
    pub fn new(settings: CanvasSettings, scene: S) -> Self {
        let scene = Rc::new(RefCell::new(scene));
        let history = Rc::new(UndoManager::with_limit(settings.history_limit));
        let toolbar = Rc::new(ToolbarState::default());
        let on_change: ChangeHook = Rc::default();

        let weak_history = Rc::downgrade(&history);
        let callback_toolbar = Rc::clone(&toolbar);
        let callback_hook = Rc::clone(&on_change);
        history.set_callback(move || {
            if let Some(history) = weak_history.upgrade() {
                callback_toolbar.sync(&history);
            }
            let hook = callback_hook.borrow().clone();
            if let Some(hook) = hook {
                hook();
            }
        });

        scene.borrow().events().subscribe(Box::new(FreehandRecorder {
            scene: Rc::downgrade(&scene),
            history: Rc::downgrade(&history),
        }));

        log::debug!(
            "Created {}x{} canvas, history limit {}",
            settings.width,
            settings.height,
            settings.history_limit
        );

        Self {
            settings,
            scene,
            history,
            toolbar,
            on_change,
            zoom: 1.0,
        }
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn scene(&self) -> Ref<'_, S> {
        self.scene.borrow()
    }

    /// Shared handle for code that draws into the scene directly, such as
    /// a free-drawing brush
    pub fn scene_handle(&self) -> Rc<RefCell<S>> {
        Rc::clone(&self.scene)
    }

    /// The undo history behind this canvas.
    ///
    /// Calling [`UndoManager::set_callback`] on it replaces the toolbar
    /// refresh; use [`set_history_callback`](Self::set_history_callback)
    /// to be told about history changes instead.
    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    /// Run `callback` after every history change, once the toolbar state
    /// has been refreshed. Replaces any earlier callback.
    pub fn set_history_callback<F: Fn() + 'static>(&self, callback: F) {
        *self.on_change.borrow_mut() = Some(Rc::new(callback));
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    /// Whether the "clear" button has anything to clear
    pub fn can_clear(&self) -> bool {
        !self.scene.borrow().is_empty()
    }

    /// A new object styled with the canvas stroke settings
    pub fn new_shape(&self, kind: ObjectKind, bounds: Rect) -> SceneObject {
        let mut shape = SceneObject::new(kind, bounds).with_line_type(self.settings.line_type);
        shape.stroke_width = self.settings.thickness;
        shape
    }

    /// Add a finished shape as one undoable step
    pub fn add_shape(&self, shape: SceneObject) {
        let freehand = shape.kind.is_freehand();
        log::debug!("Adding {:?} {}", shape.kind, shape.id);
        self.scene.borrow_mut().add(shape.clone());

        // Freehand kinds were already recorded from the scene event
        if !freehand {
            self.history.add(AddObjects::new(Rc::downgrade(&self.scene), vec![shape]));
        }
        self.scene.borrow_mut().render();
    }

    /// Add an arrow together with its head; both come and go as one step
    pub fn add_arrow(&self, mut line: SceneObject, head: SceneObject) {
        line.head = Some(head.id);
        log::debug!("Adding arrow {} with head {}", line.id, head.id);
        {
            let mut scene = self.scene.borrow_mut();
            scene.add(line.clone());
            scene.add(head.clone());
        }
        self.history
            .add(AddObjects::new(Rc::downgrade(&self.scene), vec![line, head]));
        self.scene.borrow_mut().render();
    }

    /// Delete an object and its linked head as one undoable step
    pub fn delete_object(&self, id: ObjectId) -> Result<(), SceneError> {
        let ids = self.with_head(id)?;
        let command = RemoveObjects::apply(&self.scene, &ids)?;
        log::debug!("Deleted {:?}", command.ids());
        self.history.add(command);
        self.scene.borrow_mut().render();
        Ok(())
    }

    pub fn bring_to_front(&self, id: ObjectId) -> Result<(), SceneError> {
        self.reorder(id, S::bring_to_front)
    }

    pub fn send_to_back(&self, id: ObjectId) -> Result<(), SceneError> {
        self.reorder(id, S::send_to_back)
    }

    pub fn bring_forward(&self, id: ObjectId) -> Result<(), SceneError> {
        self.reorder(id, S::bring_forward)
    }

    pub fn send_backwards(&self, id: ObjectId) -> Result<(), SceneError> {
        self.reorder(id, S::send_backwards)
    }

    pub fn undo(&self) -> CommandResult {
        self.history.undo()?;
        self.scene.borrow_mut().render();
        Ok(())
    }

    pub fn redo(&self) -> CommandResult {
        self.history.redo()?;
        self.scene.borrow_mut().render();
        Ok(())
    }

    /// Empty the drawing area and forget the history that referred to it
    pub fn clear_all(&self) {
        {
            let mut scene = self.scene.borrow_mut();
            scene.clear();
            scene.render();
        }
        self.history.clear();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom *= ZOOM_STEP;
        self.scene.borrow_mut().render();
    }

    pub fn zoom_out(&mut self) {
        self.zoom /= ZOOM_STEP;
        self.scene.borrow_mut().render();
    }

    /// Set an absolute zoom level, 1.0 being unscaled
    pub fn set_zoom(&mut self, zoom: f32) -> Result<(), SettingsError> {
        if zoom.is_nan() || zoom <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "zoom must be positive, got {zoom}"
            )));
        }
        self.zoom = zoom;
        self.scene.borrow_mut().render();
        Ok(())
    }

    pub fn set_background(&mut self, color: Color32) {
        self.settings.background = color;
        self.scene.borrow_mut().render();
    }

    fn with_head(&self, id: ObjectId) -> Result<Vec<ObjectId>, SceneError> {
        let scene = self.scene.borrow();
        let object = scene.get(id).ok_or(SceneError::ObjectNotFound(id))?;
        let mut ids = vec![id];
        ids.extend(object.head.filter(|head| scene.contains(*head)));
        Ok(ids)
    }

    fn reorder(
        &self,
        id: ObjectId,
        op: fn(&mut S, ObjectId) -> Result<(), SceneError>,
    ) -> Result<(), SceneError> {
        let ids = self.with_head(id)?;
        let mut scene = self.scene.borrow_mut();
        for id in ids {
            op(&mut *scene, id)?;
        }
        scene.render();
        Ok(())
    }
}
