//! Timer commands: preview a circuit's schedule or run it live.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::Utc;
use clap::Subcommand;
use circuits_core::{
    build_schedule, spawn_ticker, Circuit, CircuitStore, Config, CountdownDriver, Duration, Event,
    Schedule,
};
use tracing::{info, warn};

use super::{open_library, resolve_circuit, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print the flattened interval schedule of a circuit
    Schedule {
        /// Circuit ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a circuit's countdown in the terminal (Ctrl-C to stop)
    Run {
        /// Circuit ID (or unique prefix)
        id: String,
        /// Print each event as a JSON line
        #[arg(long)]
        json: bool,
        /// Override the tick period in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,
    },
}

pub fn run(action: TimerAction) -> CliResult {
    let library = open_library()?;

    match action {
        TimerAction::Schedule { id, json } => {
            let circuit = resolve_circuit(&library, &id)?;
            let schedule = build_schedule(&circuit);
            if json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
            } else {
                print_schedule(&schedule);
            }
        }
        TimerAction::Run { id, json, tick_ms } => {
            let circuit = resolve_circuit(&library, &id)?;
            let config = Config::load_or_default();
            let period = match tick_ms {
                Some(0) => return Err("--tick-ms must be greater than zero".into()),
                Some(ms) => StdDuration::from_millis(ms),
                None => config.tick_period(),
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()?;
            let started_at = Utc::now();
            let completed = runtime.block_on(run_live(
                &circuit,
                period,
                json,
                config.timer.announce_rest,
            ))?;
            if completed {
                record_run(library.store(), &circuit, started_at);
            }
        }
    }
    Ok(())
}

/// Runs until the circuit completes or Ctrl-C. Returns whether it completed.
async fn run_live(
    circuit: &Circuit,
    period: StdDuration,
    json: bool,
    announce_rest: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let total = build_schedule(circuit).len();
    let mut driver = CountdownDriver::new();
    driver.subscribe(move |event: &Event| print_event(event, total, json, announce_rest));

    if !json {
        println!("{}  ({} rounds)", circuit.display_name(), circuit.rounds);
    }
    driver.start(Some(circuit));
    if driver.is_completed() {
        return Ok(true);
    }

    let shared = Arc::new(Mutex::new(driver));
    let mut handle = spawn_ticker(Arc::clone(&shared), period);

    let interrupted = tokio::select! {
        _ = handle.finished() => false,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!("failed to listen for Ctrl-C: {e}");
            }
            true
        }
    };

    if interrupted {
        info!("interrupted, stopping timer");
        handle.stop().await;
    } else {
        handle.join().await;
    }

    let completed = shared
        .lock()
        .map(|driver| driver.is_completed())
        .unwrap_or(false);
    Ok(completed)
}

/// History is best effort; a failed write never fails the run.
fn record_run(store: &CircuitStore, circuit: &Circuit, started_at: chrono::DateTime<Utc>) {
    let schedule = build_schedule(circuit);
    if let Err(e) = store.record_run(
        circuit,
        schedule.work_seconds(),
        schedule.rest_seconds(),
        started_at,
        Utc::now(),
    ) {
        warn!("failed to record run: {e}");
    }
}

fn print_event(event: &Event, total: usize, json: bool, announce_rest: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("failed to encode event: {e}"),
        }
        return;
    }

    match event {
        Event::IntervalStarted {
            interval_index,
            label,
            is_rest,
            total_seconds,
            round,
            ..
        } => {
            if *is_rest && !announce_rest {
                return;
            }
            let kind = if *is_rest { "REST" } else { "EXERCISE" };
            println!(
                "[{:>2}/{}] round {}  {:<8} {:<20} {}",
                interval_index + 1,
                total,
                round,
                kind,
                label.as_deref().unwrap_or(""),
                Duration::from_secs(*total_seconds),
            );
        }
        Event::CircuitCompleted { total_seconds, .. } => {
            println!("Done! {} total", Duration::from_secs(*total_seconds));
        }
        Event::TimerStopped { .. } => println!("Stopped."),
        _ => {}
    }
}

fn print_schedule(schedule: &Schedule) {
    if schedule.is_empty() {
        println!("(empty schedule)");
        return;
    }
    for (i, interval) in schedule.intervals.iter().enumerate() {
        println!(
            "{:>3}. round {}  {:<8} {:<20} {}",
            i + 1,
            interval.round,
            if interval.is_rest { "REST" } else { "EXERCISE" },
            interval.display_label(),
            Duration::from_secs(interval.total_seconds),
        );
    }
    println!(
        "Total {} (work {}, rest {})",
        Duration::from_secs(schedule.total_seconds()),
        Duration::from_secs(schedule.work_seconds()),
        Duration::from_secs(schedule.rest_seconds()),
    );
}
