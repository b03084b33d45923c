// ABOUTME: Outcome records for the schema and data phases
// ABOUTME: Per-table results, run totals, and the final summary printed to operators

use serde::Serialize;

use crate::catalog::InsertMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SchemaOutcome {
    Created,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaTableReport {
    pub table: String,
    #[serde(flatten)]
    pub outcome: SchemaOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub tables: Vec<SchemaTableReport>,
}

impl SchemaReport {
    pub fn created_count(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| t.outcome == SchemaOutcome::Created)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tables.iter().filter_map(|t| match &t.outcome {
            SchemaOutcome::Failed { error } => Some((t.table.as_str(), error.as_str())),
            SchemaOutcome::Created => None,
        })
    }

    pub fn is_failed(&self, table: &str) -> bool {
        self.failures().any(|(name, _)| name == table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataOutcome {
    /// Every batch was attempted; individual rows may still have been skipped.
    Copied,
    Empty,
    /// The copy stopped early; rows committed before the failure stay in place.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataTableReport {
    pub table: String,
    pub mode: InsertMode,
    pub total_rows: usize,
    pub migrated_rows: usize,
    pub skipped_rows: usize,
    /// Batches that failed as a whole and were retried row by row
    pub retried_batches: usize,
    #[serde(flatten)]
    pub outcome: DataOutcome,
}

impl DataTableReport {
    pub fn new(table: &str, mode: InsertMode) -> Self {
        Self {
            table: table.to_string(),
            mode,
            total_rows: 0,
            migrated_rows: 0,
            skipped_rows: 0,
            retried_batches: 0,
            outcome: DataOutcome::Copied,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataReport {
    pub tables: Vec<DataTableReport>,
}

impl DataReport {
    pub fn table(&self, name: &str) -> Option<&DataTableReport> {
        self.tables.iter().find(|t| t.table == name)
    }

    pub fn migrated_rows(&self) -> usize {
        self.tables.iter().map(|t| t.migrated_rows).sum()
    }

    pub fn skipped_rows(&self) -> usize {
        self.tables.iter().map(|t| t.skipped_rows).sum()
    }

    pub fn failed_tables(&self) -> impl Iterator<Item = &DataTableReport> {
        self.tables
            .iter()
            .filter(|t| matches!(t.outcome, DataOutcome::Failed { .. }))
    }
}

/// Result of a whole run; either phase may have been skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub schema: Option<SchemaReport>,
    pub data: Option<DataReport>,
}

impl MigrationReport {
    /// True when any table failed in either phase or any row was skipped
    pub fn has_problems(&self) -> bool {
        let schema_failed = self
            .schema
            .as_ref()
            .is_some_and(|s| s.failures().next().is_some());
        let data_failed = self
            .data
            .as_ref()
            .is_some_and(|d| d.failed_tables().next().is_some() || d.skipped_rows() > 0);
        schema_failed || data_failed
    }

    /// Log the end-of-run summary
    pub fn log_summary(&self) {
        tracing::info!("========================================");
        tracing::info!("Migration summary");
        tracing::info!("========================================");

        if let Some(schema) = &self.schema {
            tracing::info!(
                "Schema: {}/{} tables created",
                schema.created_count(),
                schema.tables.len()
            );
            for (table, error) in schema.failures() {
                tracing::warn!(
                    "  ✗ `{}`: table was not created ({}); destination may be missing or stale",
                    table,
                    error
                );
            }
        }

        if let Some(data) = &self.data {
            tracing::info!(
                "Data: {} rows migrated, {} rows skipped",
                data.migrated_rows(),
                data.skipped_rows()
            );
            for table in &data.tables {
                match &table.outcome {
                    DataOutcome::Empty => tracing::info!("  - `{}`: empty", table.table),
                    DataOutcome::Copied if table.skipped_rows == 0 => tracing::info!(
                        "  ✓ `{}`: {}/{} rows",
                        table.table,
                        table.migrated_rows,
                        table.total_rows
                    ),
                    DataOutcome::Copied => tracing::warn!(
                        "  ⚠ `{}`: {}/{} rows, {} skipped",
                        table.table,
                        table.migrated_rows,
                        table.total_rows,
                        table.skipped_rows
                    ),
                    DataOutcome::Failed { error } => tracing::error!(
                        "  ✗ `{}`: failed after {}/{} rows: {}",
                        table.table,
                        table.migrated_rows,
                        table.total_rows,
                        error
                    ),
                }
            }
        }

        if self.has_problems() {
            tracing::warn!("Migration finished with problems; review the log above");
        } else {
            tracing::info!("Migration completed successfully");
        }
    }
}
