//! Run command implementation
//!
//! Wires the collection pipeline together: schema setup, feed
//! subscription, hand-off buffer, and the flush loop.

use crate::buffer::TickBuffer;
use crate::config::Config;
use crate::feed::{GmoCoinFeed, TickFeed};
use crate::flush::FlushLoop;
use crate::store::{self, RateStore, StoreError};
use crate::telemetry;
use clap::Args;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Drop and recreate the rates table before collecting (asks for
    /// confirmation)
    #[arg(long)]
    pub reset_db: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let db_path = &config.store.db_path;

        match store::ensure_schema(db_path, self.reset_db, prompt_reset_confirmation) {
            Ok(()) => {}
            Err(StoreError::ConfirmationAborted) => {
                tracing::info!("Database reset declined, exiting");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let store = RateStore::open(db_path)?;
        tracing::info!(rows = store.row_count()?, "Resuming rates table");

        let buffer = Arc::new(TickBuffer::new());

        let feed = GmoCoinFeed::new(&config.feed.ws_endpoint, config.feed.symbol);
        let mut ticks = feed.subscribe().await?;

        // Forward decoded tick batches into the hand-off buffer; the feed
        // never touches the store directly.
        let producer = buffer.clone();
        tokio::spawn(async move {
            while let Some(batch) = ticks.recv().await {
                telemetry::record_ticks_buffered(batch.len());
                producer.append(batch).await;
            }
            tracing::warn!("Tick feed channel closed");
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let flush = FlushLoop::new(
            buffer,
            store,
            Duration::from_millis(config.pipeline.flush_interval_ms),
            config.pipeline.buffer_high_water_mark,
        );
        let flush_handle = tokio::spawn(flush.run(shutdown_rx));

        tokio::signal::ctrl_c().await?;
        tracing::info!("Ctrl-C received, shutting down");

        // Flush loop drains the buffer one final time before exiting
        let _ = shutdown_tx.send(true);
        flush_handle.await?;

        Ok(())
    }
}

/// Interactive confirmation for a destructive reset
///
/// Only the exact answer `Y` confirms; anything else aborts.
fn prompt_reset_confirmation() -> bool {
    println!("\n[ Final Confirmation ]\n");
    print!("Do you really want to initialize the database? (Y/n) : ");
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim_end_matches(['\r', '\n']) == "Y"
}
