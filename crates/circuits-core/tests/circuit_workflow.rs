//! End-to-end: edit a circuit, persist it on disk, reopen, and run it.

use std::sync::{Arc, Mutex};

use circuits_core::{
    CircuitEditor, CircuitLibrary, CircuitStore, CountdownDriver, Duration, EditCommand,
    TimerObserver, TimerState,
};

#[derive(Clone, Default)]
struct Display {
    lines: Arc<Mutex<Vec<String>>>,
}

impl TimerObserver for Display {
    fn on_interval(&mut self, label: Option<&str>, is_rest: bool) {
        let kind = if is_rest { "REST" } else { "EXERCISE" };
        self.lines
            .lock()
            .unwrap()
            .push(format!("{kind} {}", label.unwrap_or("")));
    }

    fn on_complete(&mut self) {
        self.lines.lock().unwrap().push("DONE".into());
    }
}

fn fill(editor: &mut CircuitEditor, index: usize, name: &str, work: u64, rest: u64) {
    let mut exercise = editor.circuit().exercises[index].clone();
    exercise.name = Some(name.into());
    exercise.work = Duration::from_secs(work);
    exercise.rest = Duration::from_secs(rest);
    editor
        .apply(EditCommand::UpdateExercise { exercise })
        .unwrap();
}

#[test]
fn edit_save_reopen_and_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("circuits.db");

    let id = {
        let mut library = CircuitLibrary::new(CircuitStore::open_at(&path).unwrap());
        let mut editor = library.load_for_edit(None).unwrap();
        editor
            .apply(EditCommand::Rename {
                name: Some("Ladder".into()),
            })
            .unwrap();
        editor.apply(EditCommand::SetRounds { rounds: 2 }).unwrap();
        fill(&mut editor, 0, "Squat", 3, 2);
        editor.apply(EditCommand::AppendExercise).unwrap();
        fill(&mut editor, 1, "Press", 2, 0);
        assert!(editor.can_save());
        library.save_editor(&editor).unwrap().id
    };

    let library = CircuitLibrary::new(CircuitStore::open_at(&path).unwrap());
    let circuit = library.get(id).unwrap();
    assert_eq!(circuit.display_name(), "Ladder");

    let display = Display::default();
    let mut driver = CountdownDriver::new();
    driver.subscribe(display.clone());
    driver.start(Some(&circuit));
    while driver.state() != TimerState::Completed {
        driver.tick();
    }

    assert_eq!(
        *display.lines.lock().unwrap(),
        vec![
            "EXERCISE Squat",
            "REST Squat",
            "EXERCISE Press",
            "EXERCISE Squat",
            "REST Squat",
            "EXERCISE Press",
            "DONE",
        ]
    );
}

#[test]
fn missing_circuit_completes_immediately() {
    let library = CircuitLibrary::new(CircuitStore::open_memory().unwrap());
    let display = Display::default();
    let mut driver = CountdownDriver::new();
    driver.subscribe(display.clone());

    let circuit = library.list_circuits().unwrap().into_iter().next();
    driver.start(circuit.as_ref());

    assert_eq!(driver.state(), TimerState::Completed);
    assert_eq!(*display.lines.lock().unwrap(), vec!["DONE"]);
}
