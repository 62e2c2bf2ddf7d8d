//! Circuit and exercise types.
//!
//! A [`Circuit`] exclusively owns its ordered list of [`Exercise`]s. Names are
//! optional everywhere; blank or absent names are shown as an empty string and
//! only matter when deciding whether a draft may be saved.

mod duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub use duration::Duration;

/// One timed work unit plus an optional rest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub work: Duration,
    #[serde(default)]
    pub rest: Duration,
}

impl Exercise {
    /// A blank exercise with a fresh id and zero durations.
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            work: Duration::default(),
            rest: Duration::default(),
        }
    }

    pub fn new(name: impl Into<String>, work: Duration, rest: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: Some(name.into()),
            work,
            rest,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Well formed means a non-blank name and a positive work duration.
    pub fn check(&self) -> Result<(), String> {
        if self.display_name().trim().is_empty() {
            return Err("name is blank".into());
        }
        if self.work.is_zero() {
            return Err("work duration is zero".into());
        }
        Ok(())
    }
}

impl Default for Exercise {
    fn default() -> Self {
        Self::blank()
    }
}

/// A named, ordered group of exercises repeated for a number of rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upper bound on rounds accepted for a saved circuit.
pub const MAX_ROUNDS: u32 = 999;

fn default_rounds() -> u32 {
    1
}

/// Rejects rounds outside `1..=MAX_ROUNDS`.
///
/// # Errors
/// Returns [`ValidationError::InvalidValue`] for an out-of-range count.
pub fn check_rounds(rounds: u32) -> Result<(), ValidationError> {
    if rounds == 0 || rounds > MAX_ROUNDS {
        return Err(ValidationError::InvalidValue {
            field: "rounds".into(),
            message: format!("must be between 1 and {MAX_ROUNDS}"),
        });
    }
    Ok(())
}

impl Circuit {
    /// An unnamed, single-round circuit with no exercises.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: None,
            rounds: default_rounds(),
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_exercise(mut self, exercise: Exercise) -> Self {
        self.exercises.push(exercise);
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn exercise(&self, id: Uuid) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Work seconds across all rounds, without flattening the schedule.
    pub fn work_seconds(&self) -> u64 {
        self.exercises
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.work.total_secs()))
            .saturating_mul(u64::from(self.rounds))
    }

    pub fn rest_seconds(&self) -> u64 {
        self.exercises
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.rest.total_secs()))
            .saturating_mul(u64::from(self.rounds))
    }

    pub fn total_seconds(&self) -> u64 {
        self.work_seconds().saturating_add(self.rest_seconds())
    }

    /// Checks the conditions under which a circuit may be saved.
    ///
    /// # Errors
    /// Returns the first problem found: blank name, empty exercise list,
    /// rounds out of range, or a malformed exercise.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.display_name().trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        check_rounds(self.rounds)?;
        if self.exercises.is_empty() {
            return Err(ValidationError::NoExercises);
        }
        for (index, exercise) in self.exercises.iter().enumerate() {
            exercise
                .check()
                .map_err(|message| ValidationError::MalformedExercise { index, message })?;
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}
