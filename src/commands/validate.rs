// ABOUTME: Pre-flight check command: configuration, source, and destination connectivity
// ABOUTME: Prints the planned MySQL schema without changing either database

use anyhow::{Context, Result};

use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::config::MigrationConfig;
use crate::mysql::MysqlDestination;
use crate::schema::{self, overrides::SchemaOverrides};
use crate::sqlite::SqliteSource;

/// Check that a migration could run and show what it would create
///
/// Opens the SQLite file read-only, translates every table, and verifies
/// the MySQL server answers. Nothing is written.
pub async fn validate(config: &MigrationConfig) -> Result<()> {
    tracing::info!("Validating migration from {}", config.source_path);

    let source = SqliteSource::open(&config.source_path)?;
    let overrides = SchemaOverrides::builtin();

    let tables = source.list_tables()?;
    for table in &tables {
        let columns = source
            .table_columns(table)
            .with_context(|| format!("Failed to read columns of `{}`", table))?;
        let plan = schema::build_plan(&overrides, table, &columns);
        tracing::info!("Planned schema for `{}`:\n{}", table, plan.create_table_sql());
    }

    let mut destination = MysqlDestination::connect(&config.destination).await?;
    destination.ping().await?;

    destination.close().await?;
    source.close()?;

    tracing::info!(
        "✓ Validation passed: {} tables ready to migrate to MySQL database '{}'",
        tables.len(),
        config.destination.database
    );

    Ok(())
}
