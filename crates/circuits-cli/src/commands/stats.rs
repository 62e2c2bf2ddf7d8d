use clap::Subcommand;
use circuits_core::{CircuitStore, Duration};

use super::CliResult;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals across all completed runs
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Most recent completed runs
    History {
        /// Number of runs to show
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let store = CircuitStore::open()?;

    match action {
        StatsAction::Summary { json } => {
            let stats = store.stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Runs:      {} ({} today)", stats.total_runs, stats.today_runs);
                println!("Work time: {}", Duration::from_secs(stats.total_work_secs));
                println!("Rest time: {}", Duration::from_secs(stats.total_rest_secs));
                println!("Today:     {}", Duration::from_secs(stats.today_work_secs));
            }
        }
        StatsAction::History { limit, json } => {
            let runs = store.list_runs(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else {
                for run in &runs {
                    println!(
                        "{}  {:<24} {} rounds  work {}  rest {}",
                        run.completed_at.format("%Y-%m-%d %H:%M"),
                        run.circuit_name,
                        run.rounds,
                        Duration::from_secs(run.work_secs),
                        Duration::from_secs(run.rest_secs),
                    );
                }
            }
        }
    }
    Ok(())
}
