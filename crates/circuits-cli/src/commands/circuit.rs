//! Circuit list and edit commands.

use clap::Subcommand;
use circuits_core::{Circuit, Config, Duration, EditCommand};

use super::{open_library, parse_exercise_spec, resolve_circuit, template_from, CliResult};

#[derive(Subcommand)]
pub enum CircuitAction {
    /// List all circuits
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one circuit with its exercises
    Show {
        /// Circuit ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create and save a new circuit
    Create {
        /// Circuit name
        name: String,
        /// Number of rounds (default from config)
        #[arg(long)]
        rounds: Option<u32>,
        /// Exercise as NAME,WORK[,REST] (e.g. "Squat,0:30,0:10"); repeatable
        #[arg(long = "exercise", short = 'e', required = true)]
        exercises: Vec<String>,
    },
    /// Rename a circuit
    Rename {
        /// Circuit ID (or unique prefix)
        id: String,
        /// New name
        name: String,
    },
    /// Change the number of rounds
    Rounds {
        /// Circuit ID (or unique prefix)
        id: String,
        /// New round count (1 to 999)
        rounds: u32,
    },
    /// Delete a circuit and its exercises
    Delete {
        /// Circuit ID (or unique prefix)
        id: String,
    },
}

pub fn run(action: CircuitAction) -> CliResult {
    let mut library = open_library()?;

    match action {
        CircuitAction::List { json } => {
            let circuits = library.list_circuits()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&circuits)?);
            } else if circuits.is_empty() {
                println!("No circuits yet. Create one with `circuits-cli circuit create`.");
            } else {
                for circuit in &circuits {
                    print_summary(circuit);
                }
            }
        }
        CircuitAction::Show { id, json } => {
            let circuit = resolve_circuit(&library, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&circuit)?);
            } else {
                print_detail(&circuit);
            }
        }
        CircuitAction::Create {
            name,
            rounds,
            exercises,
        } => {
            let config = Config::load_or_default();
            let template = template_from(&config);

            let mut editor = library.load_for_edit(None)?.with_template(template);
            editor.apply(EditCommand::Rename { name: Some(name) })?;
            editor.apply(EditCommand::SetRounds {
                rounds: rounds.unwrap_or(config.defaults.rounds),
            })?;

            // The fresh draft starts with one blank row; fill it first.
            let blank = editor.last_exercise_id();
            for (i, spec) in exercises.iter().enumerate() {
                let mut exercise = parse_exercise_spec(spec, &template)?;
                match (i, blank) {
                    (0, Some(id)) => {
                        exercise.id = id;
                        editor.apply(EditCommand::UpdateExercise { exercise })?;
                    }
                    _ => {
                        editor.apply(EditCommand::AppendExercise)?;
                        if let Some(id) = editor.last_exercise_id() {
                            exercise.id = id;
                        }
                        editor.apply(EditCommand::UpdateExercise { exercise })?;
                    }
                }
            }

            let saved = library.save_editor(&editor)?;
            println!("Circuit created: {}", saved.id);
        }
        CircuitAction::Rename { id, name } => {
            let circuit = resolve_circuit(&library, &id)?;
            let mut editor = library.load_for_edit(Some(circuit.id))?;
            editor.apply(EditCommand::Rename { name: Some(name) })?;
            let saved = library.save_editor(&editor)?;
            println!("Circuit renamed: {}", saved.display_name());
        }
        CircuitAction::Rounds { id, rounds } => {
            let circuit = resolve_circuit(&library, &id)?;
            let mut editor = library.load_for_edit(Some(circuit.id))?;
            editor.apply(EditCommand::SetRounds { rounds })?;
            library.save_editor(&editor)?;
            println!("Rounds set to {rounds}");
        }
        CircuitAction::Delete { id } => {
            let circuit = resolve_circuit(&library, &id)?;
            library.delete(circuit.id)?;
            println!("Circuit deleted: {}", circuit.id);
        }
    }
    Ok(())
}

fn print_summary(circuit: &Circuit) {
    println!(
        "{}  {:<24} {} x {} exercises  {}",
        circuit.id,
        circuit.display_name(),
        circuit.rounds,
        circuit.exercises.len(),
        Duration::from_secs(circuit.total_seconds()),
    );
}

fn print_detail(circuit: &Circuit) {
    println!("{} ({})", circuit.display_name(), circuit.id);
    println!("Rounds: {}", circuit.rounds);
    println!("Total:  {}", Duration::from_secs(circuit.total_seconds()));
    for (i, exercise) in circuit.exercises.iter().enumerate() {
        println!(
            "  {:>2}. {:<20} work {}  rest {}  [{}]",
            i + 1,
            exercise.display_name(),
            exercise.work,
            exercise.rest,
            exercise.id,
        );
    }
}
