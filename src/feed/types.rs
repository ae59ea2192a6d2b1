//! Tick feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single ticker snapshot from the exchange
///
/// Prices and volume are exact decimals at this boundary; they are only
/// reduced to floating point when persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Best ask price
    pub ask: Decimal,
    /// Best bid price
    pub bid: Decimal,
    /// Session high
    pub high: Decimal,
    /// Last traded price
    pub last: Decimal,
    /// Session low
    pub low: Decimal,
    /// Instrument identifier
    pub symbol: Symbol,
    /// Feed-reported event time
    pub timestamp: DateTime<Utc>,
    /// Traded volume
    pub volume: Decimal,
}

/// GMO Coin instrument identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "BCH")]
    Bch,
    #[serde(rename = "LTC")]
    Ltc,
    #[serde(rename = "XRP")]
    Xrp,
    #[serde(rename = "BTC_JPY")]
    BtcJpy,
    #[serde(rename = "ETH_JPY")]
    EthJpy,
    #[serde(rename = "BCH_JPY")]
    BchJpy,
    #[serde(rename = "LTC_JPY")]
    LtcJpy,
    #[serde(rename = "XRP_JPY")]
    XrpJpy,
}

impl Symbol {
    /// Exchange-facing name, also used as the persisted text value
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Btc => "BTC",
            Symbol::Eth => "ETH",
            Symbol::Bch => "BCH",
            Symbol::Ltc => "LTC",
            Symbol::Xrp => "XRP",
            Symbol::BtcJpy => "BTC_JPY",
            Symbol::EthJpy => "ETH_JPY",
            Symbol::BchJpy => "BCH_JPY",
            Symbol::LtcJpy => "LTC_JPY",
            Symbol::XrpJpy => "XRP_JPY",
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
