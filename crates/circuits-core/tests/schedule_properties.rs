//! Property tests for schedule flattening and the countdown driver.

use circuits_core::{build_schedule, Circuit, CountdownDriver, Duration, Event, Exercise};
use proptest::prelude::*;

fn circuit_strategy() -> impl Strategy<Value = Circuit> {
    let exercise = (0u64..90, 0u64..30).prop_map(|(work, rest)| {
        Exercise::new("Move", Duration::from_secs(work), Duration::from_secs(rest))
    });
    (0u32..5, prop::collection::vec(exercise, 0..6)).prop_map(|(rounds, exercises)| {
        let mut circuit = Circuit::named("Generated").with_rounds(rounds);
        circuit.exercises = exercises;
        circuit
    })
}

proptest! {
    #[test]
    fn work_intervals_are_rounds_times_exercises(circuit in circuit_strategy()) {
        let schedule = build_schedule(&circuit);
        let work: Vec<_> = schedule.intervals.iter().filter(|i| !i.is_rest).collect();
        prop_assert_eq!(work.len(), circuit.rounds as usize * circuit.exercises.len());

        // Round-major, list-order-minor.
        let n = circuit.exercises.len();
        for (k, interval) in work.iter().enumerate() {
            prop_assert_eq!(interval.round as usize, k / n + 1);
            prop_assert_eq!(interval.exercise_index, k % n);
        }
    }

    #[test]
    fn rest_follows_only_positive_rest(circuit in circuit_strategy()) {
        let schedule = build_schedule(&circuit);
        for (idx, interval) in schedule.intervals.iter().enumerate() {
            let exercise = &circuit.exercises[interval.exercise_index];
            if interval.is_rest {
                prop_assert!(exercise.rest.total_secs() > 0);
                let prev = &schedule.intervals[idx - 1];
                prop_assert!(!prev.is_rest);
                prop_assert_eq!(prev.exercise_index, interval.exercise_index);
            } else {
                let has_rest = schedule
                    .intervals
                    .get(idx + 1)
                    .map(|next| next.is_rest)
                    .unwrap_or(false);
                prop_assert_eq!(has_rest, exercise.rest.total_secs() > 0);
            }
        }
    }

    #[test]
    fn driver_visits_every_interval_in_order(circuit in circuit_strategy()) {
        let schedule = build_schedule(&circuit);
        let mut driver = CountdownDriver::new();
        let mut entered = Vec::new();
        let mut completed = 0;

        let mut record = |events: Vec<Event>| {
            for event in events {
                match event {
                    Event::IntervalStarted { interval_index, .. } => entered.push(interval_index),
                    Event::CircuitCompleted { .. } => completed += 1,
                    _ => {}
                }
            }
        };

        record(driver.start(Some(&circuit)));
        let mut guard = 0u64;
        while !driver.is_completed() {
            record(driver.tick());
            guard += 1;
            prop_assert!(guard <= schedule.total_seconds() + 1);
        }

        prop_assert_eq!(entered, (0..schedule.len()).collect::<Vec<_>>());
        prop_assert_eq!(completed, 1);
        prop_assert_eq!(guard, schedule.total_seconds());
    }
}
