// ABOUTME: MySQL destination side of the migration
// ABOUTME: Builds connection options from config and connects with retry and a ping check

pub mod writer;

use anyhow::{bail, Context, Result};
use mysql_async::{Conn, Opts, OptsBuilder};
use std::time::Duration;

use crate::config::DestinationConfig;
use crate::utils::retry_with_backoff;

pub use writer::MysqlDestination;

const CONNECT_RETRIES: u32 = 3;
const CONNECT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Session setup run on every new connection
///
/// utf8mb4 for full Unicode, and autocommit off so every insert is only
/// made durable by an explicit COMMIT.
const SESSION_INIT: &[&str] = &["SET NAMES utf8mb4", "SET autocommit = 0"];

/// Validate the destination settings before any connection attempt
pub fn validate_destination_config(config: &DestinationConfig) -> Result<()> {
    if config.host.trim().is_empty() {
        bail!("MySQL host cannot be empty");
    }
    if config.port == 0 {
        bail!("MySQL port cannot be 0");
    }
    if config.user.trim().is_empty() {
        bail!("MySQL user cannot be empty");
    }
    if config.database.trim().is_empty() {
        bail!("MySQL database name cannot be empty");
    }
    Ok(())
}

/// Build mysql_async connection options from the destination settings
pub fn connection_opts(config: &DestinationConfig) -> Opts {
    OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(Some(config.database.clone()))
        .init(SESSION_INIT.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        .into()
}

/// Connect to MySQL, retrying transient failures
///
/// Failure here is fatal for the run: nothing has been touched yet.
pub async fn connect_mysql(config: &DestinationConfig) -> Result<Conn> {
    validate_destination_config(config)?;

    tracing::info!(
        "Connecting to MySQL at {}:{} as {} (database '{}')",
        config.host,
        config.port,
        config.user,
        config.database
    );

    let opts = connection_opts(config);
    let conn = retry_with_backoff(
        "MySQL connection",
        || {
            let opts = opts.clone();
            async move {
                Conn::new(opts)
                    .await
                    .context("Failed to create MySQL connection")
            }
        },
        CONNECT_RETRIES,
        CONNECT_INITIAL_DELAY,
    )
    .await
    .with_context(|| {
        format!(
            "Unable to reach MySQL at {}:{}. Check host, port, and credentials.",
            config.host, config.port
        )
    })?;

    tracing::debug!("Successfully connected to MySQL");

    Ok(conn)
}
