//! Schema migrations.
//!
//! Each step is an embedded SQL script. The applied version is kept in
//! SQLite's `user_version` header field, so no bookkeeping table is needed.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use thiserror::Error;

/// Migration error types
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration {version} ({name}) failed: {source}")]
    Step {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

/// Ordered schema steps. Step `n` moves the schema from version `n - 1` to `n`.
const STEPS: &[(&str, &str)] = &[("catalog", include_str!("001_catalog.sql"))];

/// Read the schema version recorded in the database header.
pub fn schema_version(conn: &Connection) -> Result<u32, MigrationError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Bring the schema up to date and return how many steps were applied.
///
/// Each step runs in its own `BEGIN IMMEDIATE` transaction that re-reads the
/// version first, so processes opening the same file concurrently apply every
/// step exactly once.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    let mut applied = 0;

    for (index, &(name, sql)) in STEPS.iter().enumerate() {
        let version = index as u32 + 1;

        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        if schema_version(&tx)? >= version {
            continue;
        }

        tx.execute_batch(sql)
            .and_then(|_| tx.pragma_update(None, "user_version", version))
            .map_err(|source| MigrationError::Step {
                version,
                name,
                source,
            })?;
        tx.commit()?;

        tracing::info!(version, name, "applied migration");
        applied += 1;
    }

    Ok(applied)
}
