use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "circuits-cli", version, about = "Circuits CLI")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Circuit management
    Circuit {
        #[command(subcommand)]
        action: commands::circuit::CircuitAction,
    },
    /// Edit the exercises of a circuit
    Exercise {
        #[command(subcommand)]
        action: commands::exercise::ExerciseAction,
    },
    /// Run or preview a circuit's timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Completed-run statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// `CIRCUITS_LOG` wins; otherwise the configured level. Logs go to stderr.
/// Only reads the config, so commands that never touch storage leave the
/// data directory alone.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("CIRCUITS_LOG").unwrap_or_else(|_| {
        let level = circuits_core::Config::read_or_default().log.level;
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Circuit { action } => commands::circuit::run(action),
        Commands::Exercise { action } => commands::exercise::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        tracing::debug!("command failed: {e:?}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
