//! Prometheus metrics

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Start the Prometheus scrape endpoint on the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(port, "Metrics exporter listening");
    Ok(())
}

/// Count ticks handed off to the buffer
pub fn record_ticks_buffered(count: usize) {
    counter!("gmoticks_ticks_buffered_total").increment(count as u64);
}

/// Count rows committed to the rates table
pub fn record_rows_inserted(count: usize) {
    counter!("gmoticks_rows_inserted_total").increment(count as u64);
}

/// Count batches dropped after a failed insert
pub fn record_batch_dropped() {
    counter!("gmoticks_batches_dropped_total").increment(1);
}

/// Size of the most recent drained batch
pub fn set_flush_batch_size(size: usize) {
    gauge!("gmoticks_flush_batch_size").set(size as f64);
}
