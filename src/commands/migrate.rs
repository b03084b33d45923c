// ABOUTME: Migrate command: connects both databases and runs the schema and data phases
// ABOUTME: Confirms destructive drops, logs the final summary, and optionally writes a JSON report

use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::config::MigrationConfig;
use crate::migration::{report::MigrationReport, run_migration, MigrationOptions};
use crate::mysql::MysqlDestination;
use crate::schema::overrides::SchemaOverrides;
use crate::sqlite::SqliteSource;

#[derive(Debug, Clone, Default)]
pub struct MigrateArgs {
    pub options: MigrationOptions,
    /// Skip the confirmation before destination tables are dropped
    pub yes: bool,
    pub report_path: Option<PathBuf>,
}

/// Run a migration end to end
///
/// Errors returned from here are the fatal kind: bad configuration, an
/// unreadable source, an unreachable destination, or a cancelled prompt.
/// Per-table failures are reported but do not make this return `Err`.
pub async fn migrate(config: &MigrationConfig, args: &MigrateArgs) -> Result<MigrationReport> {
    tracing::info!("SQLite database: {}", config.source_path);

    let source = SqliteSource::open(&config.source_path)?;
    tracing::info!("SQLite connection established");

    let mut destination = MysqlDestination::connect(&config.destination).await?;
    destination
        .ping()
        .await
        .context("MySQL connectivity check failed; nothing was migrated")?;
    tracing::info!("MySQL connection established");

    if args.options.schema && !args.yes {
        let table_count = source.list_tables()?.len();
        confirm_drop(table_count, &config.destination.database)?;
    }

    let overrides = SchemaOverrides::builtin();
    let result = run_migration(&source, &mut destination, &overrides, args.options).await;

    if let Err(e) = destination.close().await {
        tracing::warn!("{:#}", e);
    }
    if let Err(e) = source.close() {
        tracing::warn!("{:#}", e);
    }

    let report = result?;
    report.log_summary();

    if let Some(path) = &args.report_path {
        write_report(path, &report)?;
    }

    Ok(report)
}

fn confirm_drop(table_count: usize, database: &str) -> Result<()> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "This will DROP and recreate {} table(s) in MySQL database '{}'. Continue?",
            table_count, database
        ))
        .default(false)
        .interact()
        .context("Failed to get confirmation (use --yes to skip the prompt)")?;

    if !confirmed {
        tracing::warn!("⚠ User cancelled migration");
        bail!("Migration cancelled by user");
    }

    Ok(())
}

/// Write the run report as pretty-printed JSON
pub fn write_report(path: &Path, report: &MigrationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}
