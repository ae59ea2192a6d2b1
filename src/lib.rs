//! gmo-ticks: Durable tick collector for GMO Coin ticker streams
//!
//! This library provides the core components for:
//! - Real-time ticker subscription over the GMO Coin public WebSocket
//! - A concurrency-safe hand-off buffer between feed and storage
//! - Periodic batch flushing into a SQLite rates table
//! - Schema lifecycle management with guarded destructive resets
//! - Structured logging and Prometheus metrics

pub mod buffer;
pub mod cli;
pub mod config;
pub mod feed;
pub mod flush;
pub mod store;
pub mod telemetry;
