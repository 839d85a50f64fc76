mod commands;
pub mod history;

use thiserror::Error;

use crate::error::SceneError;

pub use commands::{AddObjects, Command, RemoveObjects};
pub use history::UndoManager;

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur while undoing or redoing a command
#[derive(Debug, Error)]
pub enum CommandError {
    /// The scene rejected the edit
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// The scene the command was recorded against no longer exists
    #[error("The scene was dropped before the command ran")]
    SceneDropped,

    /// The command failed during execution
    #[error("Command failed: {0}")]
    ExecutionFailed(String),
}

/// A reversible edit that can be stored in an [`UndoManager`].
///
/// `redo` must reproduce exactly the effect that was performed when the
/// command was created. The manager never looks inside a command, it only
/// calls these two methods.
pub trait Undoable {
    fn undo(&self) -> CommandResult;

    fn redo(&self) -> CommandResult;

    /// Short name used in log output
    fn label(&self) -> &str {
        "command"
    }
}
