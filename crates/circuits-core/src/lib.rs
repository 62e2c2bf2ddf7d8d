//! # Circuits Core Library
//!
//! Core logic for running circuits of timed exercises: a circuit is an
//! ordered list of exercises (work + rest) repeated for a number of rounds.
//! All operations are available through the `circuits-cli` binary, which is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Sequencer**: flattens a circuit into a [`Schedule`] of intervals
//! - **Countdown Driver**: a tick-based state machine that walks the
//!   schedule and notifies [`TimerObserver`]s on every interval entry
//! - **Ticker**: a tokio task delivering one tick per period, cancellable
//! - **Storage**: SQLite circuit store and TOML configuration
//! - **Library / Editor**: list subscriptions and command-based editing
//!
//! ## Key Components
//!
//! - [`CountdownDriver`]: Core timer state machine
//! - [`CircuitStore`]: Circuit and run-history persistence
//! - [`CircuitLibrary`]: Store access with change notifications
//! - [`CircuitEditor`]: Draft editing through [`EditCommand`]
//! - [`Config`]: Application configuration management

pub mod circuit;
pub mod editor;
pub mod error;
pub mod events;
pub mod library;
pub mod storage;
pub mod timer;

pub use circuit::{Circuit, Duration, Exercise, MAX_ROUNDS};
pub use editor::{CircuitEditor, EditCommand, ExerciseTemplate};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use library::{CircuitLibrary, SubscriptionId};
pub use storage::{CircuitStore, Config, RunRecord, Stats};
pub use timer::{
    build_schedule, spawn_ticker, CountdownDriver, Interval, Schedule, SharedDriver, TickerHandle,
    TimerObserver, TimerState,
};
