//! Database connection pool management.
//!
//! This module provides connection pooling for SQLite using r2d2.
//! It handles pool initialization, connection customization, and running migrations.

use std::time::Duration;

use bazaar_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Tuning knobs for a file-backed pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Maximum number of pooled connections.
    pub max_size: u32,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: 4,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// Initialize a new database pool with the given file path and default options.
///
/// See [`init_pool_with`] for details.
///
/// # Example
///
/// ```no_run
/// use bazaar_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/bazaar/db.sqlite3").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    init_pool_with(db_path, &PoolOptions::default())
}

/// Initialize a new database pool with the given file path.
///
/// This function will:
/// - Create the SQLite database file if it doesn't exist
/// - Set up connection pooling with r2d2
/// - Enable foreign key constraints, a busy timeout and WAL journaling on
///   every connection
/// - Run pending database migrations
///
/// # Arguments
///
/// * `db_path` - Path to the SQLite database file
/// * `options` - Pool size and busy timeout
///
/// # Returns
///
/// * `Ok(DbPool)` - Initialized connection pool
/// * `Err(Error::Persistence)` - If the pool cannot be created
/// * `Err(Error::Schema)` - If migrations fail
pub fn init_pool_with(db_path: &str, options: &PoolOptions) -> Result<DbPool> {
    let busy_timeout = options.busy_timeout;
    let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(options.max_size)
        .build(manager)
        .map_err(|e| Error::persistence(format!("Failed to create connection pool: {}", e)))?;

    prepare_schema(&pool)?;
    tracing::debug!(path = db_path, max_size = options.max_size, "database pool ready");

    Ok(pool)
}

/// Initialize an in-memory database pool for testing.
///
/// Every SQLite in-memory connection is its own database, so the pool is
/// capped at a single connection to keep all callers on the same data.
/// The database will be lost when the pool is dropped.
///
/// # Example
///
/// ```
/// use bazaar_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory().with_init(|conn| {
        // Enable foreign key constraints on each new connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });

    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Error::persistence(format!("Failed to create in-memory pool: {}", e)))?;

    prepare_schema(&pool)?;

    Ok(pool)
}

/// Get a connection from the pool.
///
/// This is a convenience wrapper around `pool.get()` that converts the
/// r2d2 error into our common Error type.
///
/// # Example
///
/// ```
/// use bazaar_db::pool::{init_memory_pool, get_conn};
///
/// let pool = init_memory_pool().unwrap();
/// let conn = get_conn(&pool).unwrap();
/// ```
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::persistence(format!("Failed to get connection from pool: {}", e)))
}

/// Run migrations on a connection from the pool.
///
/// Failures here are `Error::Schema`; failures while building the pool
/// itself are `Error::Persistence`.
pub(crate) fn prepare_schema(pool: &DbPool) -> Result<()> {
    let conn = pool
        .get()
        .map_err(|e| Error::schema(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)
        .map_err(|e| Error::schema(format!("Failed to run migrations: {}", e)))?;

    Ok(())
}
