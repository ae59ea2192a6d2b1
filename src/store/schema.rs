//! Rates table schema lifecycle

use super::StoreError;
use rusqlite::Connection;
use std::path::Path;

pub(crate) const RATES_TABLE_SQL: &str = "CREATE TABLE rates(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ask REAL,
    bid REAL,
    high REAL,
    last REAL,
    low REAL,
    symbol TEXT,
    unixtime REAL,
    volume REAL)";

/// Ensure the rates table exists at `db_path`
///
/// Without `reset`, the table is created only when the store file does not
/// exist yet; an existing store is left untouched. With `reset`, the
/// injected `confirm` closure gates a destructive drop-and-recreate: a
/// `false` answer aborts with [`StoreError::ConfirmationAborted`] and no
/// side effects.
pub fn ensure_schema(
    db_path: &Path,
    reset: bool,
    confirm: impl FnOnce() -> bool,
) -> Result<(), StoreError> {
    if reset {
        if !confirm() {
            return Err(StoreError::ConfirmationAborted);
        }
        remove_store_files(db_path)?;
        tracing::warn!(path = %db_path.display(), "Recreating database from scratch");
        return create_table(db_path);
    }

    if db_path.exists() {
        tracing::debug!(path = %db_path.display(), "Store file exists, keeping schema");
        return Ok(());
    }
    create_table(db_path)
}

/// Create the store file and the rates table
fn create_table(db_path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Filesystem {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let conn = Connection::open(db_path).map_err(|source| StoreError::Open {
        path: db_path.to_path_buf(),
        source,
    })?;
    create_rates_table(&conn).map_err(|source| StoreError::Schema {
        path: db_path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %db_path.display(), "Created rates table");
    Ok(())
}

/// Create the rates table on an open connection
pub(crate) fn create_rates_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(RATES_TABLE_SQL, [])?;
    Ok(())
}

/// Delete the store file and any WAL side files left by a previous run
fn remove_store_files(db_path: &Path) -> Result<(), StoreError> {
    let mut paths = vec![db_path.to_path_buf()];
    if let Some(name) = db_path.file_name().and_then(|n| n.to_str()) {
        paths.push(db_path.with_file_name(format!("{name}-wal")));
        paths.push(db_path.with_file_name(format!("{name}-shm")));
    }

    for path in paths {
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::Filesystem { path, source }),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    #[test]
    fn test_creates_store_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.db");

        ensure_schema(&path, false, || false).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_existing_store_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.db");
        ensure_schema(&path, false, || false).unwrap();
        let before = std::fs::read(&path).unwrap();

        ensure_schema(&path, false, || false).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_confirm_not_invoked_without_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.db");
        let asked = Cell::new(false);

        ensure_schema(&path, false, || {
            asked.set(true);
            true
        })
        .unwrap();
        assert!(!asked.get());
    }

    #[test]
    fn test_declined_reset_aborts_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.db");
        ensure_schema(&path, false, || false).unwrap();
        let before = std::fs::read(&path).unwrap();

        let result = ensure_schema(&path, true, || false);
        assert!(matches!(result, Err(StoreError::ConfirmationAborted)));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_confirmed_reset_recreates_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.db");
        // Seed a non-database file; the reset must replace it
        std::fs::write(&path, b"not a database").unwrap();

        ensure_schema(&path, true, || true).unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM rates", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("rates.db");

        ensure_schema(&path, false, || false).unwrap();
        assert!(path.is_file());
    }
}
