// ABOUTME: MySQL implementation of the destination catalog
// ABOUTME: Executes DDL, parameterized multi-row inserts, and explicit commit/rollback

use anyhow::{Context, Result};
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Value};

use crate::catalog::{DestinationCatalog, InsertStatement};
use crate::config::DestinationConfig;

/// A MySQL database receiving the migrated schema and rows
///
/// Holds a single connection with autocommit disabled; see
/// [`super::connection_opts`].
pub struct MysqlDestination {
    conn: Conn,
}

impl MysqlDestination {
    pub fn new(conn: Conn) -> Self {
        Self { conn }
    }

    pub async fn connect(config: &DestinationConfig) -> Result<Self> {
        Ok(Self::new(super::connect_mysql(config).await?))
    }

    pub async fn close(self) -> Result<()> {
        self.conn
            .disconnect()
            .await
            .context("Failed to close MySQL connection")?;
        tracing::info!("MySQL connection closed");
        Ok(())
    }
}

#[async_trait]
impl DestinationCatalog for MysqlDestination {
    async fn ping(&mut self) -> Result<()> {
        self.conn
            .ping()
            .await
            .context("MySQL connectivity check failed")?;
        let version: Option<String> = self
            .conn
            .query_first("SELECT VERSION()")
            .await
            .context("Failed to query MySQL version")?;
        tracing::info!(
            "MySQL connectivity check passed (server {})",
            version.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }

    async fn execute_ddl(&mut self, sql: &str) -> Result<()> {
        tracing::debug!("Executing DDL:\n{}", sql);
        self.conn
            .query_drop(sql)
            .await
            .with_context(|| format!("MySQL rejected statement: {}", first_line(sql)))
    }

    async fn insert_rows(&mut self, statement: &InsertStatement, rows: &[Vec<Value>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let sql = statement.to_sql(rows.len());
        let params: Vec<Value> = rows.iter().flat_map(|row| row.iter().cloned()).collect();

        self.conn.exec_drop(sql, params).await.with_context(|| {
            format!(
                "Failed to insert {} row(s) into '{}'",
                rows.len(),
                statement.table
            )
        })
    }

    async fn commit(&mut self) -> Result<()> {
        self.conn
            .query_drop("COMMIT")
            .await
            .context("Failed to commit MySQL transaction")
    }

    async fn rollback(&mut self) -> Result<()> {
        self.conn
            .query_drop("ROLLBACK")
            .await
            .context("Failed to roll back MySQL transaction")
    }
}

fn first_line(sql: &str) -> &str {
    sql.lines().next().unwrap_or(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("CREATE TABLE `t` (\n    `a` BIGINT\n)"), "CREATE TABLE `t` (");
        assert_eq!(first_line("DROP TABLE IF EXISTS `t`"), "DROP TABLE IF EXISTS `t`");
    }
}
