//! The long-lived tick driver.
//!
//! A `Scheduler` owns its state explicitly — no process-wide singletons — so
//! independent instances can coexist and tests can drive them directly. The
//! stateless counterpart for external-cron platforms lives in the gateway
//! crate and triggers the same `Pipeline` once per request.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::Notify;

use crate::pipeline::{Pipeline, TickSummary};

/// Snapshot of the driver for the status endpoint.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub running: bool,
    pub ticks_completed: u64,
    pub last_summary: Option<TickSummary>,
}

struct Inner {
    running: AtomicBool,
    ticks: AtomicU64,
    last_summary: Mutex<Option<TickSummary>>,
    stop: Notify,
}

/// Minute-granularity driver: `start()` performs an immediate pass, then
/// repeats on a fixed interval until `stop()`.
pub struct Scheduler {
    pipeline: Arc<Pipeline>,
    tick_secs: u64,
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(pipeline: Arc<Pipeline>, tick_secs: u64) -> Self {
        Self {
            pipeline,
            tick_secs,
            inner: Arc::new(Inner {
                running: AtomicBool::new(false),
                ticks: AtomicU64::new(0),
                last_summary: Mutex::new(None),
                stop: Notify::new(),
            }),
        }
    }

    /// Move stopped → running and spawn the tick loop. A second `start` on a
    /// running scheduler is a no-op.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Scheduler already running, start ignored");
            return;
        }

        let pipeline = self.pipeline.clone();
        let inner = self.inner.clone();
        let tick_secs = self.tick_secs;

        tokio::spawn(async move {
            tracing::info!("⏰ Scheduler started (tick every {tick_secs}s)");
            // The first interval tick fires immediately, giving the
            // start-then-pass-then-arm behavior in one loop.
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(tick_secs));

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match pipeline.run_tick(Utc::now()).await {
                            Ok(summary) => {
                                inner.ticks.fetch_add(1, Ordering::SeqCst);
                                if let Ok(mut last) = inner.last_summary.lock() {
                                    *last = Some(summary);
                                }
                            }
                            // Tick aborted; the next tick retries from
                            // scratch, no persisted retry state.
                            Err(e) => tracing::error!("Tick failed: {e}"),
                        }
                    }
                    _ = inner.stop.notified() => break,
                }
            }
            tracing::info!("⏹ Scheduler stopped");
        });
    }

    /// Move running → stopped. Idempotent; also safe to call before `start`.
    pub fn stop(&self) {
        if self.inner.running.swap(false, Ordering::SeqCst) {
            self.inner.stop.notify_one();
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.is_running(),
            ticks_completed: self.inner.ticks.load(Ordering::SeqCst),
            last_summary: self
                .inner
                .last_summary
                .lock()
                .ok()
                .and_then(|s| *s),
        }
    }
}
