//! GMO Coin WebSocket ticker feed implementation

use super::{FeedError, Symbol, Tick, TickFeed};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// GMO Coin public WebSocket endpoint
pub const GMO_WS_URL: &str = "wss://api.coin.z.com/ws/public/v1";

const INITIAL_RECONNECT_DELAY: Duration = Duration::from_secs(1);
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Subscription command sent after connecting
#[derive(Debug, Serialize)]
struct SubscribeCommand {
    command: &'static str,
    channel: &'static str,
    symbol: Symbol,
}

/// GMO Coin ticker channel message
#[derive(Debug, Deserialize)]
struct GmoTickerMessage {
    channel: String,
    ask: String,
    bid: String,
    high: String,
    last: String,
    low: String,
    symbol: Symbol,
    timestamp: String,
    volume: String,
}

/// WebSocket feed for the GMO Coin ticker channel
pub struct GmoCoinFeed {
    endpoint: String,
    symbol: Symbol,
}

impl GmoCoinFeed {
    /// Create a new feed for the given endpoint and symbol
    pub fn new(endpoint: impl Into<String>, symbol: Symbol) -> Self {
        Self {
            endpoint: endpoint.into(),
            symbol,
        }
    }

    /// Create a feed against the public production endpoint
    pub fn for_symbol(symbol: Symbol) -> Self {
        Self::new(GMO_WS_URL, symbol)
    }

    /// Serialize the subscribe command for this feed's symbol
    fn subscribe_command(symbol: Symbol) -> String {
        let cmd = SubscribeCommand {
            command: "subscribe",
            channel: "ticker",
            symbol,
        };
        serde_json::to_string(&cmd).unwrap_or_default()
    }

    /// Parse a ticker channel message into a Tick
    fn parse_message(msg: &str) -> Option<Tick> {
        let ticker: GmoTickerMessage = serde_json::from_str(msg).ok()?;

        if ticker.channel != "ticker" {
            return None;
        }

        let timestamp = DateTime::parse_from_rfc3339(&ticker.timestamp)
            .ok()?
            .with_timezone(&Utc);

        Some(Tick {
            ask: Decimal::from_str(&ticker.ask).ok()?,
            bid: Decimal::from_str(&ticker.bid).ok()?,
            high: Decimal::from_str(&ticker.high).ok()?,
            last: Decimal::from_str(&ticker.last).ok()?,
            low: Decimal::from_str(&ticker.low).ok()?,
            symbol: ticker.symbol,
            timestamp,
            volume: Decimal::from_str(&ticker.volume).ok()?,
        })
    }

    /// Run the connection loop with automatic reconnection
    async fn run_connection_loop(endpoint: String, symbol: Symbol, tx: mpsc::Sender<Vec<Tick>>) {
        let mut reconnect_delay = INITIAL_RECONNECT_DELAY;

        loop {
            match Self::connect_and_stream(&endpoint, symbol, &tx).await {
                Ok(()) => {
                    tracing::info!("Tick receiver dropped, stopping feed");
                    break;
                }
                Err(e) => {
                    if tx.is_closed() {
                        tracing::info!("Tick receiver dropped, stopping reconnection");
                        break;
                    }
                    tracing::warn!(error = %e, "Feed connection lost, reconnecting...");
                    sleep(reconnect_delay).await;
                    reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
                }
            }
        }
    }

    /// Connect, subscribe, and stream ticker messages until the connection drops
    async fn connect_and_stream(
        endpoint: &str,
        symbol: Symbol,
        tx: &mpsc::Sender<Vec<Tick>>,
    ) -> Result<(), FeedError> {
        tracing::info!(url = %endpoint, "Connecting to GMO Coin WebSocket");

        let (ws_stream, _response) = connect_async(endpoint)
            .await
            .map_err(|e| FeedError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        write
            .send(Message::Text(Self::subscribe_command(symbol)))
            .await
            .map_err(|e| FeedError::SendFailed(e.to_string()))?;

        tracing::info!(symbol = %symbol, "Subscribed to ticker channel");

        let mut ping_interval = tokio::time::interval(PING_INTERVAL);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(tick) = Self::parse_message(&text) {
                                if tx.send(vec![tick]).await.is_err() {
                                    return Ok(());
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| FeedError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Close(_))) => {
                            return Err(FeedError::ConnectionFailed("server closed connection".into()));
                        }
                        Some(Err(e)) => {
                            return Err(FeedError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(FeedError::ConnectionFailed("stream ended unexpectedly".into()));
                        }
                        _ => {}
                    }
                }

                _ = ping_interval.tick() => {
                    write.send(Message::Ping(Vec::new())).await
                        .map_err(|e| FeedError::SendFailed(e.to_string()))?;
                }
            }
        }
    }
}

#[async_trait]
impl TickFeed for GmoCoinFeed {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<Vec<Tick>>> {
        let (tx, rx) = mpsc::channel(1024);
        let endpoint = self.endpoint.clone();
        let symbol = self.symbol;

        tracing::info!(symbol = %symbol, "Starting GMO Coin feed");

        tokio::spawn(async move {
            Self::run_connection_loop(endpoint, symbol, tx).await;
        });

        Ok(rx)
    }
}
