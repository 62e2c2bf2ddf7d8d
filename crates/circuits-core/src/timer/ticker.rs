//! Tick source for a shared [`CountdownDriver`].
//!
//! A tokio task ticks the driver once per period until the driver leaves
//! the running/paused states or the handle is stopped.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::engine::{CountdownDriver, TimerState};

pub type SharedDriver = Arc<Mutex<CountdownDriver>>;

/// Handle to a running tick task.
pub struct TickerHandle {
    driver: SharedDriver,
    cancel_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

/// Spawn a task that calls `tick()` on `driver` every `period`.
///
/// The first tick fires one full period after spawning, so an interval
/// entered by `start` is shown before it starts counting down.
pub fn spawn_ticker(driver: SharedDriver, period: Duration) -> TickerHandle {
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    let (done_tx, done_rx) = watch::channel(false);
    let task_driver = Arc::clone(&driver);

    let task = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

        loop {
            tokio::select! {
                biased;
                changed = cancel_rx.changed() => {
                    if changed.is_err() || *cancel_rx.borrow() {
                        debug!("ticker cancelled");
                        break;
                    }
                }
                _ = interval.tick() => {
                    if !tick_once(&task_driver) {
                        break;
                    }
                }
            }
        }
        let _ = done_tx.send(true);
    });

    TickerHandle {
        driver,
        cancel_tx,
        done_rx,
        task,
    }
}

/// Deliver one tick. Returns false once the ticker should exit.
fn tick_once(driver: &SharedDriver) -> bool {
    let mut guard = match driver.lock() {
        Ok(guard) => guard,
        Err(e) => {
            warn!("driver lock poisoned, stopping ticker: {e}");
            return false;
        }
    };
    guard.tick();
    if matches!(guard.state(), TimerState::Idle | TimerState::Completed) {
        debug!("driver finished, ticker exiting");
        return false;
    }
    true
}

/// Idle a driver that is still running or paused. A completed run is left
/// as it is.
fn stop_driver(driver: &SharedDriver) {
    match driver.lock() {
        Ok(mut driver) => {
            if matches!(
                driver.state(),
                TimerState::Running { .. } | TimerState::Paused { .. }
            ) {
                driver.stop();
            }
        }
        Err(e) => warn!("driver lock poisoned during stop: {e}"),
    }
}

impl TickerHandle {
    pub fn driver(&self) -> &SharedDriver {
        &self.driver
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Resolves once the tick task has exited, without consuming the handle.
    pub async fn finished(&mut self) {
        let _ = self.done_rx.wait_for(|done| *done).await;
    }

    /// Wait for the driver to complete on its own.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!("ticker task failed: {e}");
        }
    }

    /// Stop the driver and the tick task.
    ///
    /// The driver is moved to Idle under its lock before cancellation, so
    /// any tick that races with this call is ignored. Once this returns the
    /// task has exited and no observer will be called again. A driver that
    /// already completed stays Completed and no `TimerStopped` is sent.
    pub async fn stop(self) {
        stop_driver(&self.driver);
        let _ = self.cancel_tx.send(true);
        if let Err(e) = self.task.await {
            warn!("ticker task failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Circuit, Duration as Span, Exercise};
    use crate::events::Event;

    fn shared_driver(work: u64, rest: u64) -> (SharedDriver, Arc<Mutex<Vec<Event>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut driver = CountdownDriver::new();
        driver.subscribe(move |event: &Event| sink.lock().unwrap().push(event.clone()));
        driver.start(Some(
            &Circuit::named("Tick").with_exercise(Exercise::new(
                "Jump",
                Span::from_secs(work),
                Span::from_secs(rest),
            )),
        ));
        (Arc::new(Mutex::new(driver)), seen)
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_completion() {
        let (driver, seen) = shared_driver(3, 2);
        let handle = spawn_ticker(Arc::clone(&driver), Duration::from_secs(1));
        handle.join().await;

        assert!(driver.lock().unwrap().is_completed());
        let seen = seen.lock().unwrap();
        assert!(matches!(seen.last(), Some(Event::CircuitCompleted { .. })));
        assert_eq!(seen.iter().filter(|e| e.as_transition().is_some()).count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_final() {
        let (driver, seen) = shared_driver(30, 0);
        let handle = spawn_ticker(Arc::clone(&driver), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(driver.lock().unwrap().seconds_remaining(), 25);

        handle.stop().await;
        let count = seen.lock().unwrap().len();
        assert!(matches!(seen.lock().unwrap().last(), Some(Event::TimerStopped { .. })));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(seen.lock().unwrap().len(), count);
        assert_eq!(driver.lock().unwrap().state(), TimerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_after_completion_keeps_completed() {
        let (driver, seen) = shared_driver(2, 0);
        let mut handle = spawn_ticker(Arc::clone(&driver), Duration::from_secs(1));
        handle.finished().await;
        let count = seen.lock().unwrap().len();

        handle.stop().await;
        assert!(driver.lock().unwrap().is_completed());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), count);
        assert!(matches!(seen.last(), Some(Event::CircuitCompleted { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn finished_resolves_on_completion() {
        let (driver, _seen) = shared_driver(2, 0);
        let mut handle = spawn_ticker(Arc::clone(&driver), Duration::from_secs(1));
        handle.finished().await;
        assert!(driver.lock().unwrap().is_completed());
        handle.join().await;
    }
}
