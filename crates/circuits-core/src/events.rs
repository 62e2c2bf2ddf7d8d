use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every state change of the countdown driver produces an Event.
/// Observers receive them as they happen; callers also get them back
/// from each driver command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Entered a new interval. Sent before the first tick of that interval.
    IntervalStarted {
        interval_index: usize,
        label: Option<String>,
        is_rest: bool,
        total_seconds: u64,
        round: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        interval_index: usize,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        interval_index: usize,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    CircuitCompleted {
        intervals: usize,
        total_seconds: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        interval_index: Option<usize>,
        label: Option<String>,
        is_rest: bool,
        round: Option<u32>,
        seconds_remaining: u64,
        total_seconds: u64,
        schedule_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The `(label, is_rest)` pair a display needs, for interval entries.
    pub fn as_transition(&self) -> Option<(Option<&str>, bool)> {
        match self {
            Event::IntervalStarted { label, is_rest, .. } => Some((label.as_deref(), *is_rest)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::TimerStopped { at: Utc::now() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerStopped");
    }

    #[test]
    fn transition_only_for_interval_entries() {
        let started = Event::IntervalStarted {
            interval_index: 0,
            label: Some("Squat".into()),
            is_rest: true,
            total_seconds: 10,
            round: 1,
            at: Utc::now(),
        };
        assert_eq!(started.as_transition(), Some((Some("Squat"), true)));
        assert_eq!(Event::TimerStopped { at: Utc::now() }.as_transition(), None);
    }
}
