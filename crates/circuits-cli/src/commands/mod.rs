pub mod circuit;
pub mod completions;
pub mod config;
pub mod exercise;
pub mod stats;
pub mod timer;

use circuits_core::{Circuit, CircuitLibrary, CircuitStore, Config, Duration, Exercise, ExerciseTemplate};
use uuid::Uuid;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_library() -> Result<CircuitLibrary, Box<dyn std::error::Error>> {
    Ok(CircuitLibrary::new(CircuitStore::open()?))
}

pub fn template_from(config: &Config) -> ExerciseTemplate {
    ExerciseTemplate {
        work: config.defaults.work(),
        rest: config.defaults.rest(),
    }
}

/// Find a circuit by full id or unique id prefix.
pub fn resolve_circuit(
    library: &CircuitLibrary,
    query: &str,
) -> Result<Circuit, Box<dyn std::error::Error>> {
    if let Ok(id) = Uuid::parse_str(query) {
        return Ok(library.get(id)?);
    }
    let query = query.to_lowercase();
    let mut matches: Vec<Circuit> = library
        .list_circuits()?
        .into_iter()
        .filter(|c| c.id.to_string().starts_with(&query))
        .collect();
    match matches.len() {
        0 => Err(format!("no circuit matches '{query}'").into()),
        1 => Ok(matches.remove(0)),
        n => Err(format!("'{query}' is ambiguous ({n} circuits match)").into()),
    }
}

/// Find an exercise in `circuit` by full id or unique id prefix.
pub fn resolve_exercise(circuit: &Circuit, query: &str) -> Result<Uuid, Box<dyn std::error::Error>> {
    let query = query.to_lowercase();
    let matches: Vec<Uuid> = circuit
        .exercises
        .iter()
        .map(|e| e.id)
        .filter(|id| id.to_string().starts_with(&query))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("no exercise matches '{query}' in this circuit").into()),
        _ => Err(format!("'{query}' is ambiguous ({} exercises match)", matches.len()).into()),
    }
}

/// Parse `NAME,WORK[,REST]`, e.g. `Squat,0:30,0:10` or `Plank,60`.
pub fn parse_exercise_spec(spec: &str, template: &ExerciseTemplate) -> Result<Exercise, String> {
    let mut parts = spec.split(',').map(str::trim);
    let name = parts
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("exercise '{spec}' has no name"))?;
    let work = match parts.next() {
        Some(w) => w.parse::<Duration>().map_err(|e| e.to_string())?,
        None => template.work,
    };
    let rest = match parts.next() {
        Some(r) => r.parse::<Duration>().map_err(|e| e.to_string())?,
        None => template.rest,
    };
    if parts.next().is_some() {
        return Err(format!("exercise '{spec}' has too many fields"));
    }
    Ok(Exercise::new(name, work, rest))
}
