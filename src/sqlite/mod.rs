// ABOUTME: SQLite source side of the migration
// ABOUTME: Validates the database path, opens it read-only, and exposes it as a SourceCatalog

pub mod converter;
pub mod reader;

use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::PathBuf;

use crate::catalog::{ColumnMetadata, SourceCatalog, TableRows};

/// Validate a SQLite file path
///
/// Checks:
/// - Canonicalizes the path (resolves symlinks and relative segments)
/// - File exists and is a regular file, not a directory
/// - Extension is .db, .sqlite, or .sqlite3
///
/// Returns the canonical absolute path.
pub fn validate_sqlite_path(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        bail!("SQLite file path cannot be empty");
    }

    let canonical = PathBuf::from(path).canonicalize().with_context(|| {
        format!(
            "Failed to resolve SQLite file path '{}'. \
             File may not exist or may not be readable.",
            path
        )
    })?;

    if !canonical.is_file() {
        bail!("Path '{}' is not a regular file (may be a directory)", path);
    }

    match canonical.extension().and_then(|e| e.to_str()) {
        Some("db" | "sqlite" | "sqlite3") => {}
        Some(other) => bail!(
            "Invalid SQLite file extension '{}'. Must be .db, .sqlite, or .sqlite3",
            other
        ),
        None => bail!(
            "SQLite file '{}' has no extension. Must be .db, .sqlite, or .sqlite3",
            path
        ),
    }

    tracing::debug!("Validated SQLite path: {}", canonical.display());

    Ok(canonical)
}

/// Open a SQLite database in read-only mode
///
/// The migration never writes to the source, so the connection is opened
/// with `SQLITE_OPEN_READ_ONLY` and checked with a trivial query.
pub fn open_sqlite(path: &str) -> Result<Connection> {
    let canonical = validate_sqlite_path(path)?;

    tracing::info!("Opening SQLite database: {}", canonical.display());

    let conn = Connection::open_with_flags(&canonical, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open SQLite database: {}", canonical.display()))?;

    let version: String = conn
        .query_row("SELECT sqlite_version()", [], |row| row.get(0))
        .context("Failed to query SQLite version (database may be corrupted)")?;

    tracing::debug!("Opened SQLite {} database", version);

    Ok(conn)
}

/// A SQLite database acting as the migration source
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Validate and open a database file read-only.
    pub fn open(path: &str) -> Result<Self> {
        Ok(Self::new(open_sqlite(path)?))
    }

    /// Close the connection, surfacing any error SQLite reports
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close SQLite connection")?;
        tracing::info!("SQLite connection closed");
        Ok(())
    }
}

impl SourceCatalog for SqliteSource {
    fn list_tables(&self) -> Result<Vec<String>> {
        reader::list_tables(&self.conn)
    }

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        reader::table_columns(&self.conn, table)
    }

    fn read_rows(&self, table: &str) -> Result<TableRows> {
        reader::read_table_rows(&self.conn, table)
    }
}
