mod bus;
mod events;

pub use bus::EventBus;
pub use events::SceneEvent;

/// Receives every event emitted on an [`EventBus`]
pub trait EventHandler {
    fn handle_event(&mut self, event: &SceneEvent);
}

impl<F: FnMut(&SceneEvent)> EventHandler for F {
    fn handle_event(&mut self, event: &SceneEvent) {
        self(event)
    }
}
