//! Exercise edit commands. Each one loads the circuit into an editor,
//! applies a single edit, and saves.

use clap::Subcommand;
use circuits_core::{Config, Duration, EditCommand};

use super::{open_library, resolve_circuit, resolve_exercise, template_from, CliResult};

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// Append an exercise to a circuit
    Add {
        /// Circuit ID (or unique prefix)
        circuit: String,
        /// Exercise name
        name: String,
        /// Work duration as M:SS or seconds (default from config)
        #[arg(long)]
        work: Option<Duration>,
        /// Rest duration as M:SS or seconds (default from config)
        #[arg(long)]
        rest: Option<Duration>,
    },
    /// Change an exercise
    Update {
        /// Circuit ID (or unique prefix)
        circuit: String,
        /// Exercise ID (or unique prefix)
        exercise: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New work duration
        #[arg(long)]
        work: Option<Duration>,
        /// New rest duration
        #[arg(long)]
        rest: Option<Duration>,
    },
    /// Remove an exercise from a circuit
    Remove {
        /// Circuit ID (or unique prefix)
        circuit: String,
        /// Exercise ID (or unique prefix)
        exercise: String,
    },
}

pub fn run(action: ExerciseAction) -> CliResult {
    let mut library = open_library()?;

    match action {
        ExerciseAction::Add {
            circuit,
            name,
            work,
            rest,
        } => {
            let circuit = resolve_circuit(&library, &circuit)?;
            let template = template_from(&Config::load_or_default());
            let mut editor = library
                .load_for_edit(Some(circuit.id))?
                .with_template(template);
            editor.apply(EditCommand::AppendExercise)?;

            let id = editor
                .last_exercise_id()
                .ok_or("append produced no exercise")?;
            let mut exercise = editor
                .circuit()
                .exercise(id)
                .cloned()
                .ok_or("append produced no exercise")?;
            exercise.name = Some(name);
            exercise.work = work.unwrap_or(template.work);
            exercise.rest = rest.unwrap_or(template.rest);
            editor.apply(EditCommand::UpdateExercise { exercise })?;

            library.save_editor(&editor)?;
            println!("Exercise added: {id}");
        }
        ExerciseAction::Update {
            circuit,
            exercise,
            name,
            work,
            rest,
        } => {
            let circuit = resolve_circuit(&library, &circuit)?;
            let id = resolve_exercise(&circuit, &exercise)?;
            let mut editor = library.load_for_edit(Some(circuit.id))?;
            let mut updated = editor
                .circuit()
                .exercise(id)
                .cloned()
                .ok_or_else(|| format!("exercise {id} vanished"))?;
            if let Some(name) = name {
                updated.name = Some(name);
            }
            if let Some(work) = work {
                updated.work = work;
            }
            if let Some(rest) = rest {
                updated.rest = rest;
            }
            editor.apply(EditCommand::UpdateExercise { exercise: updated })?;
            library.save_editor(&editor)?;
            println!("Exercise updated: {id}");
        }
        ExerciseAction::Remove { circuit, exercise } => {
            let circuit = resolve_circuit(&library, &circuit)?;
            let id = resolve_exercise(&circuit, &exercise)?;
            let mut editor = library.load_for_edit(Some(circuit.id))?;
            editor.apply(EditCommand::DeleteExercise { id })?;
            library.save_editor(&editor)?;
            println!("Exercise removed: {id}");
        }
    }
    Ok(())
}
