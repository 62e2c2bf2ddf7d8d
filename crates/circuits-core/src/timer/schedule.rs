use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;

/// One atomic timed segment (work or rest) in a flattened schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Name of the exercise this interval belongs to.
    pub label: Option<String>,
    pub is_rest: bool,
    pub total_seconds: u64,
    /// 1-based round number.
    pub round: u32,
    /// Position of the source exercise in the circuit.
    pub exercise_index: usize,
}

impl Interval {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub intervals: Vec<Interval>,
}

impl Schedule {
    /// Flatten a circuit into its ordered intervals.
    ///
    /// Round-major, exercise-order-minor. A rest interval follows a work
    /// interval only when the rest resolves to more than zero seconds.
    /// Zero-length work intervals are kept. A missing circuit, an empty
    /// exercise list or zero rounds all produce an empty schedule.
    pub fn build(circuit: Option<&Circuit>) -> Self {
        let Some(circuit) = circuit else {
            return Self::default();
        };

        let mut intervals = Vec::new();
        for round in 1..=circuit.rounds {
            for (exercise_index, exercise) in circuit.exercises.iter().enumerate() {
                intervals.push(Interval {
                    label: exercise.name.clone(),
                    is_rest: false,
                    total_seconds: exercise.work.total_secs(),
                    round,
                    exercise_index,
                });
                let rest = exercise.rest.total_secs();
                if rest > 0 {
                    intervals.push(Interval {
                        label: exercise.name.clone(),
                        is_rest: true,
                        total_seconds: rest,
                        round,
                        exercise_index,
                    });
                }
            }
        }
        Self { intervals }
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    pub fn total_seconds(&self) -> u64 {
        self.intervals
            .iter()
            .fold(0u64, |acc, i| acc.saturating_add(i.total_seconds))
    }

    pub fn work_seconds(&self) -> u64 {
        self.intervals
            .iter()
            .filter(|i| !i.is_rest)
            .fold(0u64, |acc, i| acc.saturating_add(i.total_seconds))
    }

    pub fn rest_seconds(&self) -> u64 {
        self.intervals
            .iter()
            .filter(|i| i.is_rest)
            .fold(0u64, |acc, i| acc.saturating_add(i.total_seconds))
    }

    /// Seconds in all intervals before `index`.
    pub fn elapsed_before(&self, index: usize) -> u64 {
        self.intervals
            .iter()
            .take(index)
            .fold(0u64, |acc, i| acc.saturating_add(i.total_seconds))
    }
}

/// Shorthand for [`Schedule::build`] on an existing circuit.
pub fn build_schedule(circuit: &Circuit) -> Schedule {
    Schedule::build(Some(circuit))
}
