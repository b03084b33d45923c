// ABOUTME: Data phase of the migration: copy every row from SQLite into MySQL
// ABOUTME: Batched inserts with per-row retry so one bad row never blocks the rest

use anyhow::{Context, Result};

use crate::catalog::{DestinationCatalog, InsertMode, InsertStatement, SourceCatalog};
use crate::migration::report::{DataOutcome, DataReport, DataTableReport};
use crate::schema::overrides::SchemaOverrides;

pub const DEFAULT_BATCH_SIZE: usize = 50;

/// MySQL caps a prepared statement at 65535 placeholders
const MYSQL_MAX_PLACEHOLDERS: usize = 65535;

/// Copy the rows of every source table
///
/// Tables are processed one at a time in source catalog order. A failure
/// inside one table is recorded in its report and the next table proceeds;
/// only a failure to list the source tables aborts the phase.
pub async fn migrate_data<S, D>(
    source: &S,
    destination: &mut D,
    overrides: &SchemaOverrides,
    batch_size: usize,
) -> Result<DataReport>
where
    S: SourceCatalog + ?Sized,
    D: DestinationCatalog + ?Sized,
{
    let tables = source
        .list_tables()
        .context("Failed to list source tables for data migration")?;

    let mut report = DataReport::default();
    for table in tables {
        report
            .tables
            .push(copy_table(source, destination, overrides, &table, batch_size).await);
    }

    Ok(report)
}

/// Copy one table, converting any table-level error into a failed report
pub async fn copy_table<S, D>(
    source: &S,
    destination: &mut D,
    overrides: &SchemaOverrides,
    table: &str,
    batch_size: usize,
) -> DataTableReport
where
    S: SourceCatalog + ?Sized,
    D: DestinationCatalog + ?Sized,
{
    let mode = if overrides.uses_replace(table) {
        InsertMode::Replace
    } else {
        InsertMode::Insert
    };
    let mut report = DataTableReport::new(table, mode);

    tracing::info!("Migrating data for table `{}`", table);

    if let Err(e) = copy_rows(source, destination, table, batch_size, &mut report).await {
        tracing::error!("✗ Failed to migrate data for table `{}`: {:#}", table, e);
        if let Err(rollback_err) = destination.rollback().await {
            tracing::warn!(
                "Rollback after failure in `{}` also failed: {:#}",
                table,
                rollback_err
            );
        }
        report.outcome = DataOutcome::Failed {
            error: format!("{:#}", e),
        };
    }

    report
}

async fn copy_rows<S, D>(
    source: &S,
    destination: &mut D,
    table: &str,
    batch_size: usize,
    report: &mut DataTableReport,
) -> Result<()>
where
    S: SourceCatalog + ?Sized,
    D: DestinationCatalog + ?Sized,
{
    let data = source
        .read_rows(table)
        .with_context(|| format!("Failed to read rows from `{}`", table))?;

    report.total_rows = data.rows.len();
    if data.rows.is_empty() {
        tracing::info!("Table `{}` is empty, skipping", table);
        report.outcome = DataOutcome::Empty;
        return Ok(());
    }

    if report.mode == InsertMode::Replace {
        tracing::info!("Using REPLACE INTO for `{}` to avoid primary key conflicts", table);
    }

    let statement = InsertStatement::new(table, &data.columns, report.mode);
    let batch_size = effective_batch_size(batch_size, data.columns.len());
    let total = data.rows.len();

    for (index, batch) in data.rows.chunks(batch_size).enumerate() {
        let offset = index * batch_size;

        match insert_and_commit(destination, &statement, batch).await? {
            Attempt::Committed => {
                report.migrated_rows += batch.len();
                tracing::info!(
                    "Migrated {} rows into `{}` (progress: {}/{})",
                    batch.len(),
                    table,
                    offset + batch.len(),
                    total
                );
            }
            Attempt::Rejected(e) => {
                tracing::info!(
                    "Batch insert into `{}` failed at row offset {}: {:#}. Retrying row by row",
                    table,
                    offset,
                    e
                );
                report.retried_batches += 1;

                let succeeded =
                    insert_rows_individually(destination, &statement, batch, offset, report)
                        .await?;

                tracing::info!(
                    "Row-by-row insert into `{}` finished: {}/{} succeeded (progress: {}/{})",
                    table,
                    succeeded,
                    batch.len(),
                    offset + batch.len(),
                    total
                );
                if succeeded == 0 {
                    tracing::warn!(
                        "Every row of the batch at offset {} in `{}` failed",
                        offset,
                        table
                    );
                }
            }
        }
    }

    Ok(())
}

/// Retry a rejected batch one row per transaction
///
/// Returns how many rows were committed. Rejected rows are rolled back,
/// logged, and skipped. `report` is updated after every row, so its counts
/// stay accurate even when a failed rollback ends the retry early.
async fn insert_rows_individually<D>(
    destination: &mut D,
    statement: &InsertStatement,
    batch: &[Vec<mysql_async::Value>],
    offset: usize,
    report: &mut DataTableReport,
) -> Result<usize>
where
    D: DestinationCatalog + ?Sized,
{
    let mut succeeded = 0;

    for (i, row) in batch.iter().enumerate() {
        match insert_and_commit(destination, statement, std::slice::from_ref(row)).await? {
            Attempt::Committed => {
                succeeded += 1;
                report.migrated_rows += 1;
            }
            Attempt::Rejected(e) => {
                report.skipped_rows += 1;
                tracing::warn!(
                    "Skipped row {} of `{}` (batch offset {}): {:#}",
                    offset + i + 1,
                    statement.table,
                    offset,
                    e
                );
            }
        }
    }

    Ok(succeeded)
}

enum Attempt {
    Committed,
    Rejected(anyhow::Error),
}

/// Insert rows and commit, or roll back if either step fails
///
/// Rejection by the destination is reported as `Attempt::Rejected`; an
/// error is returned only when the rollback itself fails, which means the
/// connection can no longer be trusted for this table.
async fn insert_and_commit<D>(
    destination: &mut D,
    statement: &InsertStatement,
    rows: &[Vec<mysql_async::Value>],
) -> Result<Attempt>
where
    D: DestinationCatalog + ?Sized,
{
    let result = match destination.insert_rows(statement, rows).await {
        Ok(()) => destination.commit().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(Attempt::Committed),
        Err(e) => {
            destination
                .rollback()
                .await
                .with_context(|| format!("Failed to roll back rejected insert: {:#}", e))?;
            Ok(Attempt::Rejected(e))
        }
    }
}

/// Clamp the batch so one statement stays under the placeholder limit
fn effective_batch_size(requested: usize, column_count: usize) -> usize {
    let max_rows = MYSQL_MAX_PLACEHOLDERS / column_count.max(1);
    requested.clamp(1, max_rows.max(1))
}
