mod engine;
mod schedule;
pub mod ticker;

pub use engine::{CountdownDriver, TimerObserver, TimerState};
pub use schedule::{build_schedule, Interval, Schedule};
pub use ticker::{spawn_ticker, SharedDriver, TickerHandle};
