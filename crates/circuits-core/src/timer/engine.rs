//! Countdown driver.
//!
//! The driver is a tick-based state machine. It does not use internal
//! threads - the caller delivers one `tick()` per elapsed second, either
//! directly or through [`super::ticker`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed        (any state) -> Idle on stop()
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut driver = CountdownDriver::new();
//! driver.subscribe(|event: &Event| println!("{event:?}"));
//! driver.start(Some(&circuit));
//! // Once per second:
//! driver.tick();
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::schedule::{Interval, Schedule};
use crate::circuit::Circuit;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running {
        interval_index: usize,
        seconds_remaining: u64,
    },
    Paused {
        interval_index: usize,
        seconds_remaining: u64,
    },
    Completed,
}

impl TimerState {
    pub fn interval_index(&self) -> Option<usize> {
        match *self {
            TimerState::Running { interval_index, .. } | TimerState::Paused { interval_index, .. } => {
                Some(interval_index)
            }
            TimerState::Idle | TimerState::Completed => None,
        }
    }

    pub fn seconds_remaining(&self) -> u64 {
        match *self {
            TimerState::Running {
                seconds_remaining, ..
            }
            | TimerState::Paused {
                seconds_remaining, ..
            } => seconds_remaining,
            TimerState::Idle | TimerState::Completed => 0,
        }
    }
}

/// Receives driver events.
///
/// Implement `on_interval` / `on_complete` for a display, or `on_event`
/// to see everything. Closures taking `&Event` implement this trait.
pub trait TimerObserver: Send {
    /// Called on every interval entry, including the first.
    fn on_interval(&mut self, _label: Option<&str>, _is_rest: bool) {}

    fn on_complete(&mut self) {}

    fn on_event(&mut self, event: &Event) {
        match event {
            Event::IntervalStarted { label, is_rest, .. } => self.on_interval(label.as_deref(), *is_rest),
            Event::CircuitCompleted { .. } => self.on_complete(),
            _ => {}
        }
    }
}

impl<F> TimerObserver for F
where
    F: FnMut(&Event) + Send,
{
    fn on_event(&mut self, event: &Event) {
        self(event)
    }
}

/// Core countdown driver.
///
/// Walks a [`Schedule`] one second at a time and notifies observers on
/// every interval entry and on completion.
pub struct CountdownDriver {
    schedule: Schedule,
    state: TimerState,
    observers: Vec<Box<dyn TimerObserver>>,
}

impl std::fmt::Debug for CountdownDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownDriver")
            .field("schedule", &self.schedule)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for CountdownDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownDriver {
    pub fn new() -> Self {
        Self {
            schedule: Schedule::default(),
            state: TimerState::Idle,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl TimerObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_completed(&self) -> bool {
        self.state == TimerState::Completed
    }

    pub fn current_interval(&self) -> Option<&Interval> {
        self.state
            .interval_index()
            .and_then(|i| self.schedule.get(i))
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.state.seconds_remaining()
    }

    /// 0.0 .. 100.0 progress across the entire schedule.
    pub fn schedule_progress_pct(&self) -> f64 {
        let total = self.schedule.total_seconds();
        match self.state {
            TimerState::Completed => 100.0,
            TimerState::Idle => 0.0,
            TimerState::Running {
                interval_index,
                seconds_remaining,
            }
            | TimerState::Paused {
                interval_index,
                seconds_remaining,
            } => {
                if total == 0 {
                    return 0.0;
                }
                let current = self
                    .schedule
                    .get(interval_index)
                    .map(|i| i.total_seconds)
                    .unwrap_or(0);
                let done = self.schedule.elapsed_before(interval_index)
                    + current.saturating_sub(seconds_remaining);
                (done as f64 / total as f64 * 100.0).min(100.0)
            }
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let interval = self.current_interval();
        Event::StateSnapshot {
            state: self.state,
            interval_index: self.state.interval_index(),
            label: interval.and_then(|i| i.label.clone()),
            is_rest: interval.map(|i| i.is_rest).unwrap_or(false),
            round: interval.map(|i| i.round),
            seconds_remaining: self.seconds_remaining(),
            total_seconds: interval.map(|i| i.total_seconds).unwrap_or(0),
            schedule_progress_pct: self.schedule_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a circuit from its first interval.
    ///
    /// A missing circuit, or one that flattens to no intervals, completes
    /// immediately. Restarting while running discards the old run.
    pub fn start(&mut self, circuit: Option<&Circuit>) -> Vec<Event> {
        self.start_schedule(Schedule::build(circuit))
    }

    pub fn start_schedule(&mut self, schedule: Schedule) -> Vec<Event> {
        debug!(intervals = schedule.len(), "starting countdown");
        self.schedule = schedule;
        self.state = TimerState::Idle;
        let events = self.enter(0);
        self.publish(&events);
        events
    }

    /// Advance by one second. Ignored unless running.
    pub fn tick(&mut self) -> Vec<Event> {
        let TimerState::Running {
            interval_index,
            seconds_remaining,
        } = self.state
        else {
            return Vec::new();
        };

        if seconds_remaining > 1 {
            self.state = TimerState::Running {
                interval_index,
                seconds_remaining: seconds_remaining - 1,
            };
            return Vec::new();
        }

        let events = self.enter(interval_index + 1);
        self.publish(&events);
        events
    }

    pub fn pause(&mut self) -> Option<Event> {
        let TimerState::Running {
            interval_index,
            seconds_remaining,
        } = self.state
        else {
            return None;
        };
        self.state = TimerState::Paused {
            interval_index,
            seconds_remaining,
        };
        let event = Event::TimerPaused {
            interval_index,
            seconds_remaining,
            at: Utc::now(),
        };
        self.publish(std::slice::from_ref(&event));
        Some(event)
    }

    pub fn resume(&mut self) -> Option<Event> {
        let TimerState::Paused {
            interval_index,
            seconds_remaining,
        } = self.state
        else {
            return None;
        };
        self.state = TimerState::Running {
            interval_index,
            seconds_remaining,
        };
        let event = Event::TimerResumed {
            interval_index,
            seconds_remaining,
            at: Utc::now(),
        };
        self.publish(std::slice::from_ref(&event));
        Some(event)
    }

    /// Return to Idle from any state. Later ticks are ignored until the
    /// next `start`.
    pub fn stop(&mut self) -> Option<Event> {
        if self.state == TimerState::Idle {
            return None;
        }
        debug!(state = ?self.state, "stopping countdown");
        self.state = TimerState::Idle;
        let event = Event::TimerStopped { at: Utc::now() };
        self.publish(std::slice::from_ref(&event));
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Enter the interval at `index`, passing straight through zero-length
    /// intervals, or complete if the schedule is exhausted.
    fn enter(&mut self, mut index: usize) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            let Some(interval) = self.schedule.get(index) else {
                self.state = TimerState::Completed;
                debug!("countdown completed");
                events.push(Event::CircuitCompleted {
                    intervals: self.schedule.len(),
                    total_seconds: self.schedule.total_seconds(),
                    at: Utc::now(),
                });
                return events;
            };

            debug!(
                index,
                label = interval.display_label(),
                is_rest = interval.is_rest,
                seconds = interval.total_seconds,
                "entering interval"
            );
            self.state = TimerState::Running {
                interval_index: index,
                seconds_remaining: interval.total_seconds,
            };
            events.push(Event::IntervalStarted {
                interval_index: index,
                label: interval.label.clone(),
                is_rest: interval.is_rest,
                total_seconds: interval.total_seconds,
                round: interval.round,
                at: Utc::now(),
            });
            if interval.total_seconds > 0 {
                return events;
            }
            index += 1;
        }
    }

    fn publish(&mut self, events: &[Event]) {
        for event in events {
            for observer in &mut self.observers {
                observer.on_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Duration, Exercise};
    use std::sync::{Arc, Mutex};

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[derive(Default, Clone)]
    struct Recorder {
        transitions: Arc<Mutex<Vec<(Option<String>, bool)>>>,
        completions: Arc<Mutex<usize>>,
    }

    impl TimerObserver for Recorder {
        fn on_interval(&mut self, label: Option<&str>, is_rest: bool) {
            self.transitions
                .lock()
                .unwrap()
                .push((label.map(str::to_string), is_rest));
        }

        fn on_complete(&mut self) {
            *self.completions.lock().unwrap() += 1;
        }
    }

    fn one_exercise() -> Circuit {
        Circuit::named("Quick").with_exercise(Exercise::new("Burpee", secs(5), secs(3)))
    }

    #[test]
    fn work_then_rest_then_complete() {
        let mut driver = CountdownDriver::new();
        let recorder = Recorder::default();
        driver.subscribe(recorder.clone());

        driver.start(Some(&one_exercise()));
        assert_eq!(
            driver.state(),
            TimerState::Running {
                interval_index: 0,
                seconds_remaining: 5
            }
        );
        assert_eq!(recorder.transitions.lock().unwrap().len(), 1);

        for _ in 0..4 {
            assert!(driver.tick().is_empty());
        }
        let events = driver.tick();
        assert_eq!(events[0].as_transition(), Some((Some("Burpee"), true)));
        assert_eq!(
            driver.state(),
            TimerState::Running {
                interval_index: 1,
                seconds_remaining: 3
            }
        );

        driver.tick();
        driver.tick();
        assert!(driver.is_running());
        driver.tick();
        assert!(driver.is_completed());

        assert_eq!(
            *recorder.transitions.lock().unwrap(),
            vec![(Some("Burpee".to_string()), false), (Some("Burpee".to_string()), true)]
        );
        assert_eq!(*recorder.completions.lock().unwrap(), 1);
    }

    #[test]
    fn empty_schedule_completes_without_transitions() {
        let mut driver = CountdownDriver::new();
        let recorder = Recorder::default();
        driver.subscribe(recorder.clone());

        let events = driver.start(None);
        assert!(driver.is_completed());
        assert_eq!(events.len(), 1);
        assert!(recorder.transitions.lock().unwrap().is_empty());
        assert_eq!(*recorder.completions.lock().unwrap(), 1);

        driver.start(Some(&Circuit::named("Empty")));
        assert!(driver.is_completed());
        assert!(recorder.transitions.lock().unwrap().is_empty());
    }

    #[test]
    fn stop_suppresses_later_ticks() {
        let mut driver = CountdownDriver::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        driver.subscribe(move |event: &Event| sink.lock().unwrap().push(event.clone()));

        driver.start(Some(&one_exercise()));
        driver.tick();
        assert!(driver.stop().is_some());
        assert_eq!(driver.state(), TimerState::Idle);

        let before = seen.lock().unwrap().len();
        for _ in 0..20 {
            assert!(driver.tick().is_empty());
        }
        assert_eq!(seen.lock().unwrap().len(), before);
        assert!(driver.stop().is_none());
    }

    #[test]
    fn pause_holds_remaining_time() {
        let mut driver = CountdownDriver::new();
        driver.start(Some(&one_exercise()));
        driver.tick();
        assert!(driver.pause().is_some());
        driver.tick();
        driver.tick();
        assert_eq!(
            driver.state(),
            TimerState::Paused {
                interval_index: 0,
                seconds_remaining: 4
            }
        );
        assert!(driver.pause().is_none());
        assert!(driver.resume().is_some());
        assert_eq!(driver.seconds_remaining(), 4);
        assert!(driver.resume().is_none());
    }

    #[test]
    fn zero_length_work_is_entered_then_passed() {
        let circuit = Circuit::named("Mixed")
            .with_exercise(Exercise::new("Instant", secs(0), secs(0)))
            .with_exercise(Exercise::new("Hold", secs(2), secs(0)));
        let mut driver = CountdownDriver::new();
        let events = driver.start(Some(&circuit));

        let labels: Vec<_> = events.iter().filter_map(Event::as_transition).collect();
        assert_eq!(labels, vec![(Some("Instant"), false), (Some("Hold"), false)]);
        assert_eq!(
            driver.state(),
            TimerState::Running {
                interval_index: 1,
                seconds_remaining: 2
            }
        );
    }

    #[test]
    fn progress_tracks_whole_schedule() {
        let mut driver = CountdownDriver::new();
        assert_eq!(driver.schedule_progress_pct(), 0.0);
        driver.start(Some(&Circuit::named("Even").with_exercise(Exercise::new("A", secs(4), secs(4)))));
        for _ in 0..4 {
            driver.tick();
        }
        assert!((driver.schedule_progress_pct() - 50.0).abs() < f64::EPSILON);
        match driver.snapshot() {
            Event::StateSnapshot {
                is_rest,
                seconds_remaining,
                round,
                ..
            } => {
                assert!(is_rest);
                assert_eq!(seconds_remaining, 4);
                assert_eq!(round, Some(1));
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
