// ABOUTME: SQLite database introspection and data reading
// ABOUTME: Functions to list tables, describe columns, and read table rows

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::catalog::{ColumnMetadata, TableRows};
use crate::sqlite::converter::sqlite_row_to_mysql;
use crate::utils::quote_sqlite_identifier;

/// List all user tables in a SQLite database
///
/// Queries sqlite_master for tables, excluding the engine's own `sqlite_*`
/// tables (sqlite_sequence, sqlite_stat1, ...). Tables are returned in
/// catalog order, which is the order they were created in.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    tracing::debug!("Listing tables from SQLite database");

    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master \
             WHERE type='table' \
             AND name NOT LIKE 'sqlite_%'",
        )
        .context("Failed to prepare statement to list tables")?;

    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("Failed to query table list")?
        .collect::<Result<Vec<String>, _>>()
        .context("Failed to collect table names")?;

    tracing::info!("Found {} user tables in SQLite database", tables.len());

    Ok(tables)
}

/// Describe the columns of a table via `PRAGMA table_info`
///
/// Columns come back in declaration order. `pk` in the pragma output is the
/// 1-based position inside the primary key, or 0.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnMetadata>> {
    let query = format!("PRAGMA table_info({})", quote_sqlite_identifier(table));

    let mut stmt = conn
        .prepare(&query)
        .with_context(|| format!("Failed to get table info for '{}'", table))?;

    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnMetadata {
                name: row.get(1)?,
                declared_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                not_null: row.get::<_, i64>(3)? != 0,
                default_value: row.get(4)?,
                primary_key_ordinal: row.get::<_, i64>(5)?.max(0) as u32,
            })
        })
        .with_context(|| format!("Failed to query columns of table '{}'", table))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to collect columns of table '{}'", table))?;

    tracing::debug!("Table '{}' has {} columns", table, columns.len());

    Ok(columns)
}

/// Read all rows of a table together with its column names
///
/// Loads the whole table into memory and converts every value for the
/// MySQL driver.
pub fn read_table_rows(conn: &Connection, table: &str) -> Result<TableRows> {
    tracing::info!("Reading all data from table '{}'", table);

    let query = format!("SELECT * FROM {}", quote_sqlite_identifier(table));

    let mut stmt = conn
        .prepare(&query)
        .with_context(|| format!("Failed to prepare statement for table '{}'", table))?;

    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let column_count = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..column_count)
                .map(|idx| row.get::<_, rusqlite::types::Value>(idx))
                .collect::<Result<Vec<_>, _>>()
                .map(sqlite_row_to_mysql)
        })
        .with_context(|| format!("Failed to query rows from table '{}'", table))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to collect rows from table '{}'", table))?;

    tracing::info!("Read {} rows from table '{}'", rows.len(), table);

    Ok(TableRows { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysql_async::Value;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();

        conn.execute_batch(
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL DEFAULT 'anon',
                email varchar(64),
                quota INTEGER DEFAULT 0
            );
            CREATE TABLE abilities (
                model TEXT,
                \"group\" TEXT,
                channel_id INTEGER,
                PRIMARY KEY (\"group\", model, channel_id)
            );
            CREATE TABLE seq_test (id INTEGER PRIMARY KEY AUTOINCREMENT, untyped);
            INSERT INTO users (id, name, email) VALUES (1, 'Alice', 'alice@example.com');
            INSERT INTO users (id, name, email, quota) VALUES (2, 'Bob', NULL, 5);
            INSERT INTO seq_test (untyped) VALUES (X'0102');",
        )
        .unwrap();

        conn
    }

    #[test]
    fn test_list_tables_in_catalog_order() {
        let conn = create_test_db();
        let tables = list_tables(&conn).unwrap();
        assert_eq!(tables, vec!["users", "abilities", "seq_test"]);
    }

    #[test]
    fn test_list_tables_excludes_system_tables() {
        let conn = create_test_db();
        let tables = list_tables(&conn).unwrap();
        assert!(!tables.iter().any(|t| t.starts_with("sqlite_")));
    }

    #[test]
    fn test_table_columns() {
        let conn = create_test_db();
        let columns = table_columns(&conn, "users").unwrap();

        assert_eq!(columns.len(), 4);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].declared_type, "INTEGER");
        assert_eq!(columns[0].primary_key_ordinal, 1);

        assert_eq!(columns[1].name, "name");
        assert!(columns[1].not_null);
        assert_eq!(columns[1].default_value.as_deref(), Some("'anon'"));

        assert_eq!(columns[2].declared_type, "varchar(64)");
        assert_eq!(columns[2].default_value, None);
        assert_eq!(columns[3].default_value.as_deref(), Some("0"));
    }

    #[test]
    fn test_table_columns_composite_key_ordinals() {
        let conn = create_test_db();
        let columns = table_columns(&conn, "abilities").unwrap();

        let ordinals: Vec<(&str, u32)> = columns
            .iter()
            .map(|c| (c.name.as_str(), c.primary_key_ordinal))
            .collect();
        assert_eq!(
            ordinals,
            vec![("model", 2), ("group", 1), ("channel_id", 3)]
        );
    }

    #[test]
    fn test_table_columns_untyped_column() {
        let conn = create_test_db();
        let columns = table_columns(&conn, "seq_test").unwrap();
        assert_eq!(columns[1].name, "untyped");
        assert_eq!(columns[1].declared_type, "");
    }

    #[test]
    fn test_read_table_rows() {
        let conn = create_test_db();
        let data = read_table_rows(&conn, "users").unwrap();

        assert_eq!(data.columns, vec!["id", "name", "email", "quota"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(
            data.rows[0],
            vec![
                Value::Int(1),
                Value::Bytes(b"Alice".to_vec()),
                Value::Bytes(b"alice@example.com".to_vec()),
                Value::Int(0),
            ]
        );
        assert_eq!(data.rows[1][2], Value::NULL);
    }

    #[test]
    fn test_read_table_rows_blob() {
        let conn = create_test_db();
        let data = read_table_rows(&conn, "seq_test").unwrap();
        assert_eq!(data.rows[0][1], Value::Bytes(vec![0x01, 0x02]));
    }

    #[test]
    fn test_reserved_word_table_name() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE \"order\" (\"key\" TEXT); INSERT INTO \"order\" VALUES ('k');")
            .unwrap();

        let columns = table_columns(&conn, "order").unwrap();
        assert_eq!(columns[0].name, "key");
        let data = read_table_rows(&conn, "order").unwrap();
        assert_eq!(data.rows.len(), 1);
    }

    #[test]
    fn test_read_missing_table_fails() {
        let conn = create_test_db();
        assert!(read_table_rows(&conn, "missing").is_err());
    }
}
