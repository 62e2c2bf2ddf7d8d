//! Draft editing of a single circuit.
//!
//! Every change goes through [`EditCommand`]. The editor never touches the
//! store; saving is done by [`crate::library::CircuitLibrary::save`] once
//! [`CircuitEditor::can_save`] holds.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::circuit::{check_rounds, Circuit, Duration, Exercise};
use crate::error::ValidationError;

/// The closed set of edits a draft accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    Rename { name: Option<String> },
    SetRounds { rounds: u32 },
    /// Replace the exercise with the same id.
    UpdateExercise { exercise: Exercise },
    DeleteExercise { id: Uuid },
    /// Append a blank exercise (durations taken from the editor's template).
    AppendExercise,
}

/// Durations given to exercises created by the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExerciseTemplate {
    pub work: Duration,
    pub rest: Duration,
}

impl ExerciseTemplate {
    fn instantiate(&self) -> Exercise {
        Exercise {
            work: self.work,
            rest: self.rest,
            ..Exercise::blank()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitEditor {
    draft: Circuit,
    template: ExerciseTemplate,
    is_new: bool,
    dirty: bool,
}

impl CircuitEditor {
    /// Edit an existing circuit. An empty exercise list gets one blank
    /// exercise so there is always a row to fill in.
    pub fn open(circuit: Circuit) -> Self {
        Self::build(circuit, ExerciseTemplate::default(), false)
    }

    /// Start a fresh, unnamed circuit with one blank exercise.
    pub fn create() -> Self {
        Self::build(Circuit::new(), ExerciseTemplate::default(), true)
    }

    /// Edit `circuit` if present, otherwise start a fresh one.
    pub fn open_or_create(circuit: Option<Circuit>) -> Self {
        match circuit {
            Some(circuit) => Self::open(circuit),
            None => Self::create(),
        }
    }

    /// Use `template` for exercises appended from now on.
    pub fn with_template(mut self, template: ExerciseTemplate) -> Self {
        self.template = template;
        self
    }

    fn build(mut draft: Circuit, template: ExerciseTemplate, is_new: bool) -> Self {
        if draft.exercises.is_empty() {
            draft.exercises.push(Exercise::blank());
        }
        Self {
            draft,
            template,
            is_new,
            dirty: false,
        }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.draft
    }

    pub fn into_circuit(self) -> Circuit {
        self.draft
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Apply one edit to the draft.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownExercise`] when an update or delete
    /// names an exercise that is not in the draft, and
    /// [`ValidationError::InvalidValue`] for rounds out of range.
    pub fn apply(&mut self, command: EditCommand) -> Result<(), ValidationError> {
        debug!(?command, circuit = %self.draft.id, "applying edit");
        match command {
            EditCommand::Rename { name } => {
                self.draft.name = name;
            }
            EditCommand::SetRounds { rounds } => {
                check_rounds(rounds)?;
                self.draft.rounds = rounds;
            }
            EditCommand::UpdateExercise { exercise } => {
                let slot = self
                    .draft
                    .exercises
                    .iter_mut()
                    .find(|e| e.id == exercise.id)
                    .ok_or(ValidationError::UnknownExercise(exercise.id))?;
                *slot = exercise;
            }
            EditCommand::DeleteExercise { id } => {
                let index = self
                    .draft
                    .exercises
                    .iter()
                    .position(|e| e.id == id)
                    .ok_or(ValidationError::UnknownExercise(id))?;
                self.draft.exercises.remove(index);
            }
            EditCommand::AppendExercise => {
                self.draft.exercises.push(self.template.instantiate());
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Id of the most recently appended (last) exercise.
    pub fn last_exercise_id(&self) -> Option<Uuid> {
        self.draft.exercises.last().map(|e| e.id)
    }

    /// Save is allowed once the name is non-blank and every exercise is
    /// well formed.
    pub fn can_save(&self) -> bool {
        self.draft.is_valid()
    }

    /// # Errors
    /// Returns the first reason the draft cannot be saved.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.draft.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn new_draft_has_one_blank_exercise() {
        let editor = CircuitEditor::create();
        assert!(editor.is_new());
        assert_eq!(editor.circuit().exercises.len(), 1);
        assert_eq!(editor.circuit().exercises[0].display_name(), "");
        assert!(!editor.can_save());
    }

    #[test]
    fn opened_empty_circuit_gets_a_blank_row() {
        let editor = CircuitEditor::open(Circuit::named("Stored"));
        assert!(!editor.is_new());
        assert_eq!(editor.circuit().exercises.len(), 1);
    }

    #[test]
    fn filling_in_the_draft_enables_save() {
        let mut editor = CircuitEditor::create();
        editor
            .apply(EditCommand::Rename {
                name: Some("Tabata".into()),
            })
            .unwrap();
        assert!(!editor.can_save());

        let mut exercise = editor.circuit().exercises[0].clone();
        exercise.name = Some("Sprint".into());
        exercise.work = secs(20);
        exercise.rest = secs(10);
        editor
            .apply(EditCommand::UpdateExercise { exercise })
            .unwrap();
        assert!(editor.can_save());
        assert!(editor.is_dirty());

        editor
            .apply(EditCommand::Rename {
                name: Some("  ".into()),
            })
            .unwrap();
        assert_eq!(editor.validate(), Err(ValidationError::BlankName));
    }

    #[test]
    fn append_uses_template_and_blocks_save_until_named() {
        let mut editor = CircuitEditor::open(
            Circuit::named("Core").with_exercise(Exercise::new("Plank", secs(45), secs(15))),
        )
        .with_template(ExerciseTemplate {
            work: secs(30),
            rest: secs(5),
        });
        assert!(editor.can_save());

        editor.apply(EditCommand::AppendExercise).unwrap();
        assert_eq!(editor.circuit().exercises.len(), 2);
        let added = editor.circuit().exercises.last().unwrap();
        assert_eq!(added.work, secs(30));
        assert_eq!(added.rest, secs(5));
        assert!(!editor.can_save());

        let id = editor.last_exercise_id().unwrap();
        editor.apply(EditCommand::DeleteExercise { id }).unwrap();
        assert!(editor.can_save());
    }

    #[test]
    fn unknown_exercise_is_rejected() {
        let mut editor = CircuitEditor::create();
        let stray = Uuid::new_v4();
        assert_eq!(
            editor.apply(EditCommand::DeleteExercise { id: stray }),
            Err(ValidationError::UnknownExercise(stray))
        );
        let exercise = Exercise::new("Ghost", secs(5), secs(0));
        let id = exercise.id;
        assert_eq!(
            editor.apply(EditCommand::UpdateExercise { exercise }),
            Err(ValidationError::UnknownExercise(id))
        );
        assert!(!editor.is_dirty());
    }

    #[test]
    fn deleting_every_exercise_blocks_save() {
        let mut editor = CircuitEditor::open(
            Circuit::named("Solo").with_exercise(Exercise::new("Row", secs(60), secs(0))),
        );
        let id = editor.circuit().exercises[0].id;
        editor.apply(EditCommand::DeleteExercise { id }).unwrap();
        assert_eq!(editor.validate(), Err(ValidationError::NoExercises));
    }

    #[test]
    fn out_of_range_rounds_rejected() {
        let mut editor = CircuitEditor::create();
        assert!(editor.apply(EditCommand::SetRounds { rounds: 0 }).is_err());
        assert!(editor
            .apply(EditCommand::SetRounds {
                rounds: crate::circuit::MAX_ROUNDS + 1
            })
            .is_err());
        assert_eq!(editor.circuit().rounds, 1);
        editor.apply(EditCommand::SetRounds { rounds: 4 }).unwrap();
        assert_eq!(editor.circuit().rounds, 4);
    }
}
