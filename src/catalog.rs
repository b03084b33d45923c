// ABOUTME: Collaborator interfaces between the migration core and the two databases
// ABOUTME: Defines column metadata, insert statements, and source/destination catalog traits

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::utils::quote_mysql_identifier;

/// One column of a source table as reported by the source engine's introspection
///
/// `primary_key_ordinal` is 0 for columns outside the primary key, otherwise
/// the 1-based position of the column inside the (possibly composite) key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key_ordinal: u32,
}

/// Rows of one table plus the column names in `SELECT *` order
#[derive(Debug, Clone, Default)]
pub struct TableRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<mysql_async::Value>>,
}

/// Read side of a migration
pub trait SourceCatalog {
    /// User tables only; engine-internal tables are never returned.
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Ordered column metadata for one table.
    fn table_columns(&self, table: &str) -> Result<Vec<ColumnMetadata>>;

    /// Every row of a table, already converted to destination driver values.
    fn read_rows(&self, table: &str) -> Result<TableRows>;
}

/// Write side of a migration
///
/// Inserts run inside an open transaction; nothing is visible until `commit`,
/// and `rollback` discards everything since the last commit.
#[async_trait]
pub trait DestinationCatalog: Send {
    /// Cheap round-trip used as the pre-flight connectivity check.
    async fn ping(&mut self) -> Result<()>;

    async fn execute_ddl(&mut self, sql: &str) -> Result<()>;

    /// Insert one or more rows with a single statement.
    async fn insert_rows(
        &mut self,
        statement: &InsertStatement,
        rows: &[Vec<mysql_async::Value>],
    ) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    Insert,
    /// Delete any row sharing the key, then insert.
    Replace,
}

impl InsertMode {
    pub fn keyword(self) -> &'static str {
        match self {
            InsertMode::Insert => "INSERT",
            InsertMode::Replace => "REPLACE",
        }
    }
}

/// Parameterized insert for one destination table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub mode: InsertMode,
}

impl InsertStatement {
    pub fn new(table: &str, columns: &[String], mode: InsertMode) -> Self {
        Self {
            table: table.to_string(),
            columns: columns.to_vec(),
            mode,
        }
    }

    /// Render the statement text with one placeholder group per row.
    pub fn to_sql(&self, row_count: usize) -> String {
        let column_list = self
            .columns
            .iter()
            .map(|c| quote_mysql_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let row_placeholders = format!("({})", vec!["?"; self.columns.len()].join(", "));
        let values = vec![row_placeholders; row_count.max(1)].join(", ");

        format!(
            "{} INTO {} ({}) VALUES {}",
            self.mode.keyword(),
            quote_mysql_identifier(&self.table),
            column_list,
            values
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_row_insert_sql() {
        let stmt = InsertStatement::new("users", &columns(&["id", "group"]), InsertMode::Insert);
        assert_eq!(
            stmt.to_sql(1),
            "INSERT INTO `users` (`id`, `group`) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_multi_row_replace_sql() {
        let stmt = InsertStatement::new(
            "abilities",
            &columns(&["group", "model", "channel_id"]),
            InsertMode::Replace,
        );
        assert_eq!(
            stmt.to_sql(2),
            "REPLACE INTO `abilities` (`group`, `model`, `channel_id`) VALUES (?, ?, ?), (?, ?, ?)"
        );
    }

    #[test]
    fn test_zero_rows_still_renders_one_group() {
        let stmt = InsertStatement::new("t", &columns(&["a"]), InsertMode::Insert);
        assert_eq!(stmt.to_sql(0), "INSERT INTO `t` (`a`) VALUES (?)");
    }
}
