//! SQLite plumbing shared by the resource repositories.
//!
//! Every repository opens its own connection. With a file database the
//! connections share the file (WAL mode); with `:memory:` each repository
//! gets a private database, which is fine because no table is shared.

use std::path::PathBuf;
use std::str::FromStr;

use rusqlite::Connection;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("invalid database url: {0}")]
    InvalidUrl(String),
}

/// Where the SQLite database lives, parsed from `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl FromStr for DatabaseLocation {
    type Err = StoreError;

    /// Accepts `sqlite://<path>`, `sqlite:///<path>` (relative, SQLAlchemy
    /// style; four slashes make it absolute), `sqlite::memory:`, `:memory:`
    /// and bare filesystem paths.
    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let url = url.trim();
        if url.is_empty() {
            return Err(StoreError::InvalidUrl("empty".to_string()));
        }
        if matches!(url, ":memory:" | "sqlite::memory:" | "sqlite://:memory:") {
            return Ok(DatabaseLocation::Memory);
        }

        let path = if let Some(rest) = url.strip_prefix("sqlite:///") {
            rest
        } else if let Some(rest) = url.strip_prefix("sqlite://") {
            rest
        } else if url.contains("://") {
            return Err(StoreError::InvalidUrl(format!("unsupported scheme in {url}")));
        } else {
            url
        };

        if path.is_empty() {
            return Err(StoreError::InvalidUrl(format!("missing path in {url}")));
        }
        Ok(DatabaseLocation::File(PathBuf::from(path)))
    }
}

/// Open a connection for one repository.
pub fn open(location: &DatabaseLocation) -> Result<Connection, StoreError> {
    match location {
        DatabaseLocation::Memory => {
            Connection::open_in_memory().map_err(|e| StoreError::Connection(e.to_string()))
        }
        DatabaseLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Connection(e.to_string()))?;
            }
            let conn = Connection::open(path).map_err(|e| StoreError::Connection(e.to_string()))?;
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            debug!(path = %path.display(), "Opened SQLite database");
            Ok(conn)
        }
    }
}

/// Next row id for an AUTOINCREMENT table.
///
/// Looks at both `sqlite_sequence` and the live rows so ids of deleted rows
/// are never handed out again. Only the owning actor writes to `table`, so
/// the value cannot be taken by a concurrent insert.
pub fn next_rowid(conn: &Connection, table: &'static str) -> Result<i64, StoreError> {
    let sql = format!(
        "SELECT MAX(
            COALESCE((SELECT seq FROM sqlite_sequence WHERE name = ?1), 0),
            COALESCE((SELECT MAX(id) FROM {table}), 0)
        ) + 1"
    );
    let id = conn.query_row(&sql, [table], |row| row.get(0))?;
    Ok(id)
}
