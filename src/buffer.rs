//! Concurrency-safe hand-off buffer between feed and storage
//!
//! The feed task appends decoded tick batches; the flush loop atomically
//! takes everything accumulated so far. The mutex is scoped to the two
//! method bodies, so appends are never blocked by storage I/O.

use crate::feed::Tick;
use tokio::sync::Mutex;

/// Unbounded accumulation point for incoming ticks
#[derive(Debug, Default)]
pub struct TickBuffer {
    inner: Mutex<Vec<Tick>>,
}

impl TickBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of ticks, preserving arrival order
    ///
    /// An empty batch has no observable effect.
    pub async fn append(&self, batch: Vec<Tick>) {
        if batch.is_empty() {
            return;
        }
        let mut inner = self.inner.lock().await;
        inner.extend(batch);
    }

    /// Atomically capture the current contents, leaving the buffer empty
    ///
    /// Every appended tick appears in exactly one drain result, and
    /// concatenating drains in call order reproduces the append order.
    pub async fn drain_all(&self) -> Vec<Tick> {
        let mut inner = self.inner.lock().await;
        std::mem::take(&mut *inner)
    }

    /// Number of ticks currently buffered
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether the buffer is currently empty
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
