use std::cell::{Cell, RefCell};

use super::{EventHandler, SceneEvent};

/// Broadcasts scene events to registered handlers.
///
/// Handlers run while the bus holds its handler list. An event emitted from
/// inside a handler is dropped with a warning; a handler subscribed from
/// inside one is parked and starts receiving from the next event on.
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
    parked: RefCell<Vec<Box<dyn EventHandler>>>,
    count: Cell<usize>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handler_count()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            parked: RefCell::new(Vec::new()),
            count: Cell::new(0),
        }
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.count.set(self.count.get() + 1);
        match self.handlers.try_borrow_mut() {
            Ok(mut handlers) => handlers.push(handler),
            Err(_) => {
                log::warn!("Handler subscribed during dispatch; it will see the next event");
                self.parked.borrow_mut().push(handler);
            }
        }
    }

    pub fn emit(&self, event: SceneEvent) {
        let Ok(mut handlers) = self.handlers.try_borrow_mut() else {
            log::warn!("Dropped {:?} emitted from inside a scene event handler", event);
            return;
        };
        log::trace!("Scene event: {:?}", event);
        for handler in handlers.iter_mut() {
            handler.handle_event(&event);
        }
        handlers.append(&mut self.parked.borrow_mut());
    }

    /// Subscribed handlers, including ones parked during dispatch
    pub fn handler_count(&self) -> usize {
        self.count.get()
    }
}
