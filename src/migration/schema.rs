// ABOUTME: Schema phase of the migration: drop and recreate each source table in MySQL
// ABOUTME: Best-effort per table; a failed table is logged and the run moves on

use anyhow::{Context, Result};

use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::migration::report::{SchemaOutcome, SchemaReport, SchemaTableReport};
use crate::schema::{self, overrides::SchemaOverrides};

/// Recreate every source table in the destination
///
/// For each table: `DROP TABLE IF EXISTS`, translate, `CREATE TABLE`.
/// Already-created tables are never rolled back. Only a failure to list the
/// source tables aborts the phase.
pub async fn migrate_schema<S, D>(
    source: &S,
    destination: &mut D,
    overrides: &SchemaOverrides,
) -> Result<SchemaReport>
where
    S: SourceCatalog + ?Sized,
    D: DestinationCatalog + ?Sized,
{
    let tables = source
        .list_tables()
        .context("Failed to list source tables for schema migration")?;

    let mut report = SchemaReport::default();

    for table in tables {
        tracing::info!("Migrating table structure: `{}`", table);

        let outcome = match recreate_table(source, destination, overrides, &table).await {
            Ok(()) => {
                tracing::info!("✓ Table `{}` created", table);
                SchemaOutcome::Created
            }
            Err(e) => {
                tracing::error!("✗ Failed to create table `{}`: {:#}", table, e);
                SchemaOutcome::Failed {
                    error: format!("{:#}", e),
                }
            }
        };

        report.tables.push(SchemaTableReport { table, outcome });
    }

    Ok(report)
}

async fn recreate_table<S, D>(
    source: &S,
    destination: &mut D,
    overrides: &SchemaOverrides,
    table: &str,
) -> Result<()>
where
    S: SourceCatalog + ?Sized,
    D: DestinationCatalog + ?Sized,
{
    destination
        .execute_ddl(&schema::drop_table_sql(table))
        .await
        .with_context(|| format!("Failed to drop existing table `{}`", table))?;

    let columns = source
        .table_columns(table)
        .with_context(|| format!("Failed to read columns of `{}`", table))?;

    let plan = schema::build_plan(overrides, table, &columns);

    destination
        .execute_ddl(&plan.create_table_sql())
        .await
        .with_context(|| format!("Failed to create table `{}`", table))
}
