use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::{CommandResult, Undoable};

type Callback = Rc<dyn Fn()>;

/// Linear undo/redo history with an optional size bound.
///
/// All methods take `&self` so a command running inside [`undo`](Self::undo)
/// or [`redo`](Self::redo) can reach the same manager through a shared
/// handle. Any [`add`](Self::add) made while a command runs is dropped.
pub struct UndoManager {
    /// Applied and undone commands, oldest first
    commands: RefCell<VecDeque<Rc<dyn Undoable>>>,
    /// Most recently applied command, `None` when nothing is applied
    index: Cell<Option<usize>>,
    /// Maximum history length, 0 means unbounded
    limit: Cell<usize>,
    /// Set only while a command's undo/redo runs
    executing: Cell<bool>,
    callback: RefCell<Option<Callback>>,
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Undo,
    Redo,
}

/// Raises the executing flag and restores the previous value when dropped,
/// so the flag is reset on error returns and unwinding alike.
struct ExecutingGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> ExecutingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for ExecutingGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoManager")
            .field("len", &self.len())
            .field("index", &self.index.get())
            .field("limit", &self.limit.get())
            .field("executing", &self.executing.get())
            .field("callback", &self.callback.borrow().is_some())
            .finish()
    }
}

impl UndoManager {
    /// Creates an empty, unbounded history
    pub fn new() -> Self {
        Self {
            commands: RefCell::new(VecDeque::new()),
            index: Cell::new(None),
            limit: Cell::new(0),
            executing: Cell::new(false),
            callback: RefCell::new(None),
        }
    }

    /// Creates an empty history that keeps at most `limit` commands
    pub fn with_limit(limit: usize) -> Self {
        let manager = Self::new();
        manager.set_limit(limit);
        manager
    }

    /// Record a command that has already been applied.
    ///
    /// Everything after the cursor is discarded first. Ignored while a
    /// command is executing.
    pub fn add<C: Undoable + 'static>(&self, command: C) -> &Self {
        if self.executing.get() {
            log::trace!("Dropping re-entrant add of '{}'", command.label());
            return self;
        }

        {
            let mut commands = self.commands.borrow_mut();
            let keep = self.index.get().map_or(0, |index| index + 1);
            commands.truncate(keep);
            log::debug!("Recording '{}' at position {}", command.label(), commands.len());
            commands.push_back(Rc::new(command));

            let limit = self.limit.get();
            while limit > 0 && commands.len() > limit {
                commands.pop_front();
            }
            self.index.set(commands.len().checked_sub(1));
        }

        self.notify();
        self
    }

    /// Undo the command at the cursor and move the cursor back by one
    pub fn undo(&self) -> CommandResult {
        let Some(index) = self.index.get() else {
            return Ok(());
        };
        let Some(command) = self.command_at(index) else {
            return Ok(());
        };

        self.execute(command.as_ref(), Action::Undo)?;
        self.set_index(index.checked_sub(1));
        self.notify();
        Ok(())
    }

    /// Redo the command after the cursor and move the cursor forward by one
    pub fn redo(&self) -> CommandResult {
        let next = self.index.get().map_or(0, |index| index + 1);
        let Some(command) = self.command_at(next) else {
            return Ok(());
        };

        self.execute(command.as_ref(), Action::Redo)?;
        self.set_index(Some(next));
        self.notify();
        Ok(())
    }

    /// Forget every recorded command
    pub fn clear(&self) {
        let previous_len = {
            let mut commands = self.commands.borrow_mut();
            let len = commands.len();
            commands.clear();
            len
        };
        self.index.set(None);

        if previous_len > 0 {
            log::debug!("Cleared {} commands", previous_len);
            self.notify();
        }
    }

    pub fn has_undo(&self) -> bool {
        self.index.get().is_some()
    }

    pub fn has_redo(&self) -> bool {
        let next = self.index.get().map_or(0, |index| index + 1);
        next < self.len()
    }

    /// Register the function called after every state change, replacing
    /// any earlier one
    pub fn set_callback<F: Fn() + 'static>(&self, callback: F) {
        *self.callback.borrow_mut() = Some(Rc::new(callback));
    }

    /// Bound the history length from the next [`add`](Self::add) on.
    /// Zero means unbounded.
    pub fn set_limit(&self, limit: usize) {
        self.limit.set(limit);
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    /// Position of the most recently applied command
    pub fn index(&self) -> Option<usize> {
        self.index.get()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    /// True while a command's undo or redo is running
    pub fn is_executing(&self) -> bool {
        self.executing.get()
    }

    /// Snapshot of the recorded commands, oldest first
    pub fn commands(&self) -> Vec<Rc<dyn Undoable>> {
        self.commands.borrow().iter().cloned().collect()
    }

    fn command_at(&self, index: usize) -> Option<Rc<dyn Undoable>> {
        self.commands.borrow().get(index).cloned()
    }

    fn execute(&self, command: &dyn Undoable, action: Action) -> CommandResult {
        let _guard = ExecutingGuard::enter(&self.executing);
        log::debug!("{:?} '{}'", action, command.label());

        let result = match action {
            Action::Undo => command.undo(),
            Action::Redo => command.redo(),
        };
        if let Err(err) = &result {
            log::warn!("{:?} of '{}' failed: {}", action, command.label(), err);
        }
        result
    }

    // A command may clear the history while it runs; keep the cursor in range.
    fn set_index(&self, index: Option<usize>) {
        let last = self.len().checked_sub(1);
        self.index.set(match (index, last) {
            (Some(index), Some(last)) => Some(index.min(last)),
            _ => None,
        });
    }

    fn notify(&self) {
        // Clone out first: the callback may replace itself.
        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}
