//! Periodic flush loop from buffer to store
//!
//! Sole consumer of the tick buffer and sole producer into the store.
//! Draining is an atomic swap, so feed appends are never blocked by
//! storage I/O happening here.

use crate::buffer::TickBuffer;
use crate::store::RateStore;
use crate::telemetry;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

/// Flush statistics
#[derive(Debug, Default, Clone)]
pub struct FlushStats {
    pub ticks_flushed: u64,
    pub batches_flushed: u64,
    pub batches_dropped: u64,
    pub last_flush: Option<DateTime<Utc>>,
}

/// Drains the tick buffer on a fixed cadence and persists non-empty drains
pub struct FlushLoop {
    buffer: Arc<TickBuffer>,
    store: RateStore,
    interval: Duration,
    high_water_mark: usize,
    stats: Arc<RwLock<FlushStats>>,
}

impl FlushLoop {
    /// Create a new flush loop over the given buffer and store
    pub fn new(
        buffer: Arc<TickBuffer>,
        store: RateStore,
        interval: Duration,
        high_water_mark: usize,
    ) -> Self {
        Self {
            buffer,
            store,
            interval,
            high_water_mark,
            stats: Arc::new(RwLock::new(FlushStats::default())),
        }
    }

    /// Handle for observing flush statistics from other tasks
    pub fn stats_handle(&self) -> Arc<RwLock<FlushStats>> {
        self.stats.clone()
    }

    /// Run until the shutdown signal fires, then drain once more and stop
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Flush loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_ok() && !*shutdown.borrow() {
                        continue;
                    }
                    tracing::info!("Shutdown requested, flushing remaining ticks");
                    self.flush_once().await;
                    break;
                }
            }
        }

        tracing::info!("Flush loop stopped");
    }

    /// Drain the buffer and persist the result if non-empty
    async fn flush_once(&mut self) {
        let batch = self.buffer.drain_all().await;
        if batch.is_empty() {
            return;
        }

        if batch.len() >= self.high_water_mark {
            tracing::warn!(
                buffered = batch.len(),
                high_water_mark = self.high_water_mark,
                "Buffer exceeded high-water mark; storage is falling behind"
            );
        }
        telemetry::set_flush_batch_size(batch.len());

        match self.store.insert_batch(&batch) {
            Ok(rows) => {
                let mut stats = self.stats.write().await;
                stats.ticks_flushed += rows as u64;
                stats.batches_flushed += 1;
                stats.last_flush = Some(Utc::now());
                telemetry::record_rows_inserted(rows);
                tracing::debug!(rows, "Flushed tick batch");
            }
            Err(e) => {
                // Drop the batch: the drained ticks are no longer buffered,
                // and re-queueing would reorder them behind newer appends.
                let mut stats = self.stats.write().await;
                stats.batches_dropped += 1;
                telemetry::record_batch_dropped();
                tracing::error!(error = %e, dropped = batch.len(), "Failed to insert tick batch");
            }
        }
    }
}
