//! Tick feed module
//!
//! Provides real-time ticker data from the GMO Coin public WebSocket

mod gmocoin;
mod types;

pub use gmocoin::GmoCoinFeed;
pub use types::{Symbol, Tick};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Trait for tick feed implementations
#[async_trait]
pub trait TickFeed: Send + Sync {
    /// Subscribe to ticker updates, delivered as batches of decoded ticks
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<Vec<Tick>>>;
}

/// Feed-side errors
///
/// These drive the reconnection loop; they never propagate into the
/// persistence pipeline.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Connection failed or the stream ended unexpectedly
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// Sending a frame to the server failed
    #[error("send failed: {0}")]
    SendFailed(String),
}
