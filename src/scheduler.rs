//! Fixed-cadence tick loop
//!
//! Runs a tick, sleeps for the interval, repeats. A tick that fails is logged
//! and the loop carries on; the next tick is the retry. Shutdown is checked
//! between ticks only, never in the middle of one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// Time source for the loop
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    MaxTicks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub failed: u64,
    pub reason: StopReason,
}

pub struct Scheduler<C: Clock> {
    clock: C,
    interval: Duration,
    max_ticks: Option<u64>,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C, interval: Duration) -> Self {
        Self {
            clock,
            interval,
            max_ticks: None,
        }
    }

    /// Stop after this many ticks
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Drive `tick` until shutdown is signalled or the tick limit is reached.
    /// `tick` receives the 1-based tick number.
    pub async fn run<F, Fut>(&self, mut shutdown: mpsc::Receiver<()>, mut tick: F) -> LoopSummary
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let mut ticks = 0u64;
        let mut failed = 0u64;

        loop {
            if shutdown.try_recv().is_ok() {
                return LoopSummary {
                    ticks,
                    failed,
                    reason: StopReason::Shutdown,
                };
            }

            ticks += 1;
            let started = self.clock.now();
            tracing::info!(tick = ticks, at = %started.to_rfc3339(), "Tick starting");
            if let Err(e) = tick(ticks).await {
                failed += 1;
                tracing::error!(tick = ticks, error = %e, "Tick failed");
            }

            if self.max_ticks.is_some_and(|max| ticks >= max) {
                return LoopSummary {
                    ticks,
                    failed,
                    reason: StopReason::MaxTicks,
                };
            }

            tracing::debug!(secs = self.interval.as_secs(), "Sleeping until next tick");
            tokio::select! {
                _ = self.clock.sleep(self.interval) => {}
                Some(()) = shutdown.recv() => {
                    tracing::info!("Shutdown signal received");
                    return LoopSummary {
                        ticks,
                        failed,
                        reason: StopReason::Shutdown,
                    };
                }
            }
        }
    }
}

/// Channel that fires once on Ctrl+C
pub fn ctrl_c_shutdown() -> mpsc::Receiver<()> {
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl+C, stopping after the current tick...");
                let _ = shutdown_tx.send(()).await;
            }
            Err(e) => {
                tracing::error!("Error setting up signal handler: {}", e);
            }
        }
    });
    shutdown_rx
}
