//! Ledger storage with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `transactions` - Ledger entries, category updates, totals
//! - `categories` - The persisted category vocabulary
//! - `snapshot` - Whole-ledger export and restore

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod categories;
mod snapshot;
mod transactions;

pub use snapshot::SNAPSHOT_VERSION;
pub use transactions::TransactionInsertResult;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Format a timestamp the way SQLite's CURRENT_TIMESTAMP does
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) a ledger database file
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self { pool };
        db.run_migrations()?;
        Ok(db)
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!("tally_test_{}_{}.db", std::process::id(), id));
        let path = path.to_string_lossy().into_owned();

        // Remove any existing file
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path, suffix));
        }

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the single writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Ledger entries. Only `category` is ever updated in place.
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                date DATE NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                type TEXT NOT NULL CHECK (type IN ('credit', 'debit')),
                description TEXT NOT NULL,
                bank TEXT NOT NULL DEFAULT 'N/A',
                category TEXT NOT NULL DEFAULT 'Other',
                fingerprint TEXT NOT NULL UNIQUE,
                source TEXT NOT NULL DEFAULT 'statement',  -- statement, ocr
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
            CREATE INDEX IF NOT EXISTS idx_transactions_type ON transactions(type);

            -- Category vocabulary, in user-defined order
            CREATE TABLE IF NOT EXISTS categories (
                name TEXT PRIMARY KEY,
                position INTEGER NOT NULL
            );
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
