//! One-second tick source for a running timer.
//!
//! At most one interval task exists per driver. Starting again aborts the
//! previous task and bumps the generation, so a tick that was already in the
//! channel when the driver restarted can be recognised and dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

#[derive(Debug)]
pub struct TickDriver {
    tx: mpsc::UnboundedSender<Tick>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl TickDriver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            tx,
            handle: None,
            generation: 0,
        };
        (driver, rx)
    }

    /// Start ticking every `period`, replacing any running interval.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, period: Duration) {
        self.stop();
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
        tracing::debug!(generation, "tick driver started");
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(generation = self.generation, "tick driver stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// `false` for ticks from an interval that has since been replaced.
    pub fn is_current(&self, tick: Tick) -> bool {
        self.is_active() && tick.generation == self.generation
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (mut driver, mut rx) = TickDriver::new();
        driver.start(TICK_PERIOD);
        let started = tokio::time::Instant::now();
        for _ in 0..3 {
            let tick = rx.recv().await.unwrap();
            assert!(driver.is_current(tick));
        }
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_interval() {
        let (mut driver, mut rx) = TickDriver::new();
        driver.start(TICK_PERIOD);
        let first = rx.recv().await.unwrap();
        driver.start(TICK_PERIOD);
        assert!(!driver.is_current(first));

        let next = rx.recv().await.unwrap();
        assert_eq!(next.generation, 2);
        assert!(driver.is_current(next));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_silences_ticks() {
        let (mut driver, mut rx) = TickDriver::new();
        driver.start(TICK_PERIOD);
        rx.recv().await.unwrap();
        driver.stop();
        assert!(!driver.is_active());

        let waited = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(waited.is_err(), "no tick after stop");
    }
}
