// ABOUTME: Orchestrates a full SQLite-to-MySQL migration run
// ABOUTME: Runs the schema phase to completion before the data phase begins

pub mod data;
pub mod report;
pub mod schema;

use anyhow::Result;

use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::schema::overrides::SchemaOverrides;
use report::MigrationReport;

/// Which phases to run and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    pub schema: bool,
    pub data: bool,
    pub batch_size: usize,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            schema: true,
            data: true,
            batch_size: data::DEFAULT_BATCH_SIZE,
        }
    }
}

/// Run the selected phases against an already-verified destination
///
/// A table whose schema step failed still gets a data copy attempt; its
/// inserts then fail against the missing or stale table and are reported.
pub async fn run_migration<S, D>(
    source: &S,
    destination: &mut D,
    overrides: &SchemaOverrides,
    options: MigrationOptions,
) -> Result<MigrationReport>
where
    S: SourceCatalog + ?Sized,
    D: DestinationCatalog + ?Sized,
{
    let mut report = MigrationReport::default();

    if options.schema {
        tracing::info!("Starting schema migration");
        report.schema = Some(schema::migrate_schema(source, destination, overrides).await?);
    }

    if options.data {
        if let Some(schema_report) = &report.schema {
            for (table, _) in schema_report.failures() {
                tracing::warn!(
                    "Schema step failed for `{}`; its data copy will still be attempted",
                    table
                );
            }
        }

        tracing::info!("Starting data migration");
        report.data = Some(
            data::migrate_data(source, destination, overrides, options.batch_size).await?,
        );
    }

    Ok(report)
}
