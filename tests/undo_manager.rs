use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lumen_canvas::command::{Command, UndoManager, Undoable};

type Journal = Rc<RefCell<Vec<String>>>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Command that writes "undo <name>" / "redo <name>" to the journal
fn journaled(name: &str, journal: &Journal) -> Command {
    let (undo_name, undo_journal) = (name.to_owned(), journal.clone());
    let (redo_name, redo_journal) = (name.to_owned(), journal.clone());
    Command::new(
        name,
        move || {
            undo_journal.borrow_mut().push(format!("undo {undo_name}"));
            Ok(())
        },
        move || {
            redo_journal.borrow_mut().push(format!("redo {redo_name}"));
            Ok(())
        },
    )
}

fn labels(history: &UndoManager) -> Vec<String> {
    history
        .commands()
        .iter()
        .map(|command| command.label().to_owned())
        .collect()
}

fn counting_callback(history: &UndoManager) -> Rc<Cell<usize>> {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    history.set_callback(move || counter.set(counter.get() + 1));
    calls
}

#[test]
fn test_add_undo_add_discards_redo_branch() {
    init_logging();
    let journal = Journal::default();
    let history = UndoManager::new();

    history
        .add(journaled("c1", &journal))
        .add(journaled("c2", &journal))
        .add(journaled("c3", &journal));
    assert!(history.has_undo());
    assert!(!history.has_redo());
    assert_eq!(history.index(), Some(2));

    history.undo().unwrap();
    assert_eq!(history.index(), Some(1));
    history.undo().unwrap();
    assert_eq!(history.index(), Some(0));
    assert_eq!(*journal.borrow(), vec!["undo c3", "undo c2"]);

    history.add(journaled("c4", &journal));
    assert_eq!(labels(&history), vec!["c1", "c4"]);
    assert_eq!(history.index(), Some(1));
    assert!(!history.has_redo());

    // Nothing left to redo, c2 and c3 are gone for good
    history.redo().unwrap();
    assert_eq!(journal.borrow().len(), 2);
}

#[test]
fn test_undo_then_add_matches_linear_history() {
    let journal = Journal::default();
    let history = UndoManager::new();

    history
        .add(journaled("c1", &journal))
        .add(journaled("c2", &journal))
        .add(journaled("c3", &journal));
    history.undo().unwrap();
    history.add(journaled("c4", &journal));

    assert_eq!(labels(&history), vec!["c1", "c2", "c4"]);
    assert_eq!(history.index(), Some(2));
    assert!(!history.has_redo());
}

#[test]
fn test_redo_replays_in_order() {
    let journal = Journal::default();
    let history = UndoManager::new();
    history.add(journaled("a", &journal)).add(journaled("b", &journal));

    history.undo().unwrap();
    history.undo().unwrap();
    assert!(!history.has_undo());
    assert!(history.has_redo());
    assert_eq!(history.index(), None);

    history.redo().unwrap();
    history.redo().unwrap();
    assert_eq!(
        *journal.borrow(),
        vec!["undo b", "undo a", "redo a", "redo b"]
    );
    assert_eq!(history.index(), Some(1));
}

#[test]
fn test_boundary_calls_change_nothing() {
    let journal = Journal::default();
    let history = UndoManager::new();
    let calls = counting_callback(&history);

    history.undo().unwrap();
    history.redo().unwrap();
    assert_eq!(history.index(), None);
    assert_eq!(calls.get(), 0);

    history.add(journaled("a", &journal));
    history.redo().unwrap();
    assert_eq!(history.index(), Some(0));

    history.undo().unwrap();
    history.undo().unwrap();
    assert_eq!(history.index(), None);
    assert_eq!(history.len(), 1);
    assert_eq!(*journal.borrow(), vec!["undo a"]);
    // one add, one real undo
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_limit_evicts_oldest() {
    let journal = Journal::default();
    let history = UndoManager::new();
    history.set_limit(2);

    history
        .add(journaled("c1", &journal))
        .add(journaled("c2", &journal))
        .add(journaled("c3", &journal));

    assert_eq!(labels(&history), vec!["c2", "c3"]);
    assert_eq!(history.index(), Some(1));
}

#[test]
fn test_limit_keeps_latest_n() {
    let journal = Journal::default();
    let history = UndoManager::with_limit(3);

    for i in 0..8 {
        history.add(journaled(&format!("c{i}"), &journal));
    }
    assert_eq!(history.len(), 3);
    assert_eq!(labels(&history), vec!["c5", "c6", "c7"]);

    for _ in 0..5 {
        history.undo().unwrap();
    }
    assert_eq!(*journal.borrow(), vec!["undo c7", "undo c6", "undo c5"]);
}

#[test]
fn test_clear_notifies_only_when_non_empty() {
    let journal = Journal::default();
    let history = UndoManager::new();
    let calls = counting_callback(&history);

    history.clear();
    assert_eq!(calls.get(), 0);

    history.add(journaled("a", &journal)).add(journaled("b", &journal));
    assert_eq!(calls.get(), 2);

    history.clear();
    assert_eq!(calls.get(), 3);
    assert!(history.is_empty());
    assert_eq!(history.index(), None);
    assert!(!history.has_undo());
    assert!(!history.has_redo());
}

#[test]
fn test_callback_replaced_not_added() {
    let journal = Journal::default();
    let history = UndoManager::new();
    let first = counting_callback(&history);
    let second = counting_callback(&history);

    history.add(journaled("a", &journal));
    history.undo().unwrap();
    history.redo().unwrap();

    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 3);
}

#[test]
fn test_nested_add_during_undo_is_dropped() {
    let journal = Journal::default();
    let history = Rc::new(UndoManager::new());

    let weak = Rc::downgrade(&history);
    let nested_journal = journal.clone();
    history.add(Command::new(
        "adds while undoing",
        move || {
            if let Some(history) = weak.upgrade() {
                assert!(history.is_executing());
                history.add(journaled("nested", &nested_journal));
            }
            Ok(())
        },
        || Ok(()),
    ));
    history.add(journaled("plain", &journal));

    history.undo().unwrap();
    history.undo().unwrap();

    assert_eq!(labels(&history), vec!["adds while undoing", "plain"]);
    assert_eq!(history.index(), None);
    assert!(!history.is_executing());

    // Redo branch is still intact
    history.redo().unwrap();
    history.redo().unwrap();
    assert_eq!(history.index(), Some(1));
}

#[test]
fn test_nested_add_during_redo_is_dropped() {
    let journal = Journal::default();
    let history = Rc::new(UndoManager::new());

    let weak = Rc::downgrade(&history);
    let nested_journal = journal.clone();
    history.add(Command::new(
        "adds while redoing",
        || Ok(()),
        move || {
            if let Some(history) = weak.upgrade() {
                history.add(journaled("nested", &nested_journal));
            }
            Ok(())
        },
    ));

    history.undo().unwrap();
    history.redo().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.index(), Some(0));
}

#[test]
fn test_callback_sees_updated_state() {
    let journal = Journal::default();
    let history = Rc::new(UndoManager::new());
    let seen = Rc::new(RefCell::new(Vec::new()));

    let weak = Rc::downgrade(&history);
    let sink = seen.clone();
    history.set_callback(move || {
        if let Some(history) = weak.upgrade() {
            sink.borrow_mut().push((history.has_undo(), history.has_redo()));
        }
    });

    history.add(journaled("a", &journal));
    history.undo().unwrap();
    history.redo().unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![(true, false), (false, true), (true, false)]
    );
}
