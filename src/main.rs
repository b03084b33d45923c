// ABOUTME: CLI entry point for sqlite-mysql-migrator
// ABOUTME: Parses commands, loads configuration, and routes to handlers

use clap::{Parser, Subcommand};
use sqlite_mysql_migrator::commands::{self, MigrateArgs};
use sqlite_mysql_migrator::config::load_config;
use sqlite_mysql_migrator::migration::{data::DEFAULT_BATCH_SIZE, MigrationOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sqlite-mysql-migrator")]
#[command(about = "One-shot migration of a SQLite database into MySQL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration and connectivity, and print the planned schema
    Validate {
        /// TOML config file used when the environment does not configure both databases
        #[arg(long)]
        config: Option<String>,
    },
    /// Drop and recreate every table in MySQL, then copy all rows
    Migrate {
        /// TOML config file used when the environment does not configure both databases
        #[arg(long)]
        config: Option<String>,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
        /// Rows per INSERT statement
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
        batch_size: usize,
        /// Only recreate tables, copy no rows
        #[arg(long, conflicts_with = "data_only")]
        schema_only: bool,
        /// Only copy rows into existing tables
        #[arg(long)]
        data_only: bool,
        /// Write a JSON report of the run to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn parse_batch_size(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("batch size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => {
            let config = load_config(config.as_deref())?;
            commands::validate(&config).await
        }
        Commands::Migrate {
            config,
            yes,
            batch_size,
            schema_only,
            data_only,
            report,
        } => {
            let config = load_config(config.as_deref())?;
            let args = MigrateArgs {
                options: MigrationOptions {
                    schema: !data_only,
                    data: !schema_only,
                    batch_size,
                },
                yes,
                report_path: report,
            };
            commands::migrate(&config, &args).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_size_of(args: &[&str]) -> Result<usize, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Commands::Migrate { batch_size, .. } => Ok(batch_size),
            Commands::Validate { .. } => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_batch_size_defaults_to_fifty() {
        assert_eq!(batch_size_of(&["sqlite-mysql-migrator", "migrate"]).unwrap(), 50);
    }

    #[test]
    fn test_batch_size_accepts_positive_values() {
        let size = batch_size_of(&["sqlite-mysql-migrator", "migrate", "--batch-size", "200"]);
        assert_eq!(size.unwrap(), 200);
    }

    #[test]
    fn test_batch_size_rejects_zero() {
        let err = batch_size_of(&["sqlite-mysql-migrator", "migrate", "--batch-size", "0"])
            .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_schema_only_conflicts_with_data_only() {
        let result = Cli::try_parse_from([
            "sqlite-mysql-migrator",
            "migrate",
            "--schema-only",
            "--data-only",
        ]);
        assert!(result.is_err());
    }
}
