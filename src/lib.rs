#![warn(clippy::all, rust_2018_idioms)]

pub mod canvas;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod scene;

pub use canvas::{LumenCanvas, ToolbarState};
pub use command::{Command, CommandError, CommandResult, UndoManager, Undoable};
pub use config::CanvasSettings;
pub use error::SceneError;
pub use scene::{LineType, MemoryScene, ObjectId, ObjectKind, Scene, SceneObject};
