//! SQLite-backed rate store

use super::{schema, StoreError};
use crate::feed::Tick;
use rusqlite::{params, Connection, OpenFlags};
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;

const INSERT_SQL: &str = "INSERT INTO rates(ask, bid, high, last, low, symbol, unixtime, volume)
    VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Durable store for the rates table
///
/// Owned exclusively by the flush loop; no concurrent writers exist.
pub struct RateStore {
    conn: Connection,
}

impl RateStore {
    /// Open an existing store file
    ///
    /// The schema must already exist (see [`super::ensure_schema`]).
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(db_path, flags).map_err(|source| {
            StoreError::Open {
                path: db_path.to_path_buf(),
                source,
            }
        })?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .map_err(|source| StoreError::Open {
                path: db_path.to_path_buf(),
                source,
            })?;

        tracing::info!(path = %db_path.display(), "Rate store opened");
        Ok(Self { conn })
    }

    /// Open an in-memory store with the schema applied (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".into(),
            source,
        })?;
        schema::create_rates_table(&conn).map_err(|source| StoreError::Schema {
            path: ":memory:".into(),
            source,
        })?;
        Ok(Self { conn })
    }

    /// Insert a batch of ticks as a single transaction
    ///
    /// Either all rows become durably visible or none do. An empty batch
    /// returns immediately without opening a transaction.
    pub fn insert_batch(&mut self, ticks: &[Tick]) -> Result<usize, StoreError> {
        if ticks.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction().map_err(StoreError::Insert)?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SQL).map_err(StoreError::Insert)?;
            for tick in ticks {
                stmt.execute(params![
                    decimal_to_f64(tick.ask),
                    decimal_to_f64(tick.bid),
                    decimal_to_f64(tick.high),
                    decimal_to_f64(tick.last),
                    decimal_to_f64(tick.low),
                    tick.symbol.as_str(),
                    epoch_seconds(&tick.timestamp),
                    decimal_to_f64(tick.volume),
                ])
                .map_err(StoreError::Insert)?;
            }
        }
        tx.commit().map_err(StoreError::Insert)?;

        Ok(ticks.len())
    }

    /// Total number of persisted rows
    pub fn row_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM rates", [], |row| row.get(0))
            .map_err(StoreError::Query)?;
        Ok(count as u64)
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Reduce a decimal to floating point for persistence
///
/// Acknowledged precision trade-off: the wire values stay exact decimals
/// until this boundary.
fn decimal_to_f64(value: rust_decimal::Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Feed-reported event time as epoch seconds
fn epoch_seconds(timestamp: &chrono::DateTime<chrono::Utc>) -> f64 {
    timestamp.timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Symbol;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn sample_tick(last: Decimal) -> Tick {
        Tick {
            ask: dec!(4019486),
            bid: dec!(4016913),
            high: dec!(4045596),
            last,
            low: dec!(3977002),
            symbol: Symbol::BtcJpy,
            timestamp: Utc.timestamp_micros(1_522_413_296_789_000).unwrap(),
            volume: dec!(1206.61),
        }
    }

    #[test]
    fn test_insert_batch_persists_matching_fields() {
        let mut store = RateStore::open_in_memory().unwrap();
        store.insert_batch(&[sample_tick(dec!(4019486))]).unwrap();

        let row = store
            .conn()
            .query_row(
                "SELECT ask, bid, high, last, low, symbol, unixtime, volume FROM rates",
                [],
                |r| {
                    Ok((
                        r.get::<_, f64>(0)?,
                        r.get::<_, f64>(1)?,
                        r.get::<_, f64>(2)?,
                        r.get::<_, f64>(3)?,
                        r.get::<_, f64>(4)?,
                        r.get::<_, String>(5)?,
                        r.get::<_, f64>(6)?,
                        r.get::<_, f64>(7)?,
                    ))
                },
            )
            .unwrap();

        assert_eq!(row.0, 4019486.0);
        assert_eq!(row.1, 4016913.0);
        assert_eq!(row.2, 4045596.0);
        assert_eq!(row.3, 4019486.0);
        assert_eq!(row.4, 3977002.0);
        assert_eq!(row.5, "BTC_JPY");
        assert!((row.6 - 1_522_413_296.789).abs() < 1e-6);
        assert_eq!(row.7, 1206.61);
    }

    #[test]
    fn test_insert_batch_row_count() {
        let mut store = RateStore::open_in_memory().unwrap();
        let ticks: Vec<_> = (0..5).map(|i| sample_tick(Decimal::from(i))).collect();

        let inserted = store.insert_batch(&ticks).unwrap();
        assert_eq!(inserted, 5);
        assert_eq!(store.row_count().unwrap(), 5);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut store = RateStore::open_in_memory().unwrap();
        let inserted = store.insert_batch(&[]).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.row_count().unwrap(), 0);
    }

    #[test]
    fn test_insert_preserves_insertion_order() {
        let mut store = RateStore::open_in_memory().unwrap();
        let ticks: Vec<_> = (0..4).map(|i| sample_tick(Decimal::from(i * 10))).collect();
        store.insert_batch(&ticks).unwrap();

        let mut stmt = store
            .conn()
            .prepare("SELECT last FROM rates ORDER BY id")
            .unwrap();
        let lasts: Vec<f64> = stmt
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(lasts, vec![0.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_failed_batch_applies_no_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.db");
        super::super::ensure_schema(&path, false, || false).unwrap();

        let mut store = RateStore::open(&path).unwrap();

        // Second connection holds an exclusive lock to simulate contention
        let blocker = Connection::open(&path).unwrap();
        blocker.execute_batch("BEGIN EXCLUSIVE").unwrap();

        let ticks: Vec<_> = (0..3).map(|i| sample_tick(Decimal::from(i))).collect();
        let result = store.insert_batch(&ticks);
        assert!(matches!(result, Err(StoreError::Insert(_))));

        blocker.execute_batch("ROLLBACK").unwrap();
        assert_eq!(store.row_count().unwrap(), 0);
    }

    #[test]
    fn test_empty_batch_succeeds_while_locked() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.db");
        super::super::ensure_schema(&path, false, || false).unwrap();

        let mut store = RateStore::open(&path).unwrap();
        let blocker = Connection::open(&path).unwrap();
        blocker.execute_batch("BEGIN EXCLUSIVE").unwrap();

        // No transaction is opened, so the lock is never contended
        assert_eq!(store.insert_batch(&[]).unwrap(), 0);
    }

    #[test]
    fn test_open_missing_store_fails() {
        let dir = TempDir::new().unwrap();
        let result = RateStore::open(&dir.path().join("missing.db"));
        assert!(matches!(result, Err(StoreError::Open { .. })));
    }
}
