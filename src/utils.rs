// ABOUTME: Utility functions shared by the source and destination sides
// ABOUTME: Provides identifier/literal quoting and retry logic for connections

use anyhow::Result;
use std::time::Duration;

/// Quote a MySQL identifier with backticks
///
/// Embedded backticks are doubled, so any table or column name (including
/// reserved words like `group` or `key`) can be used safely in DDL and DML.
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::utils::quote_mysql_identifier;
/// assert_eq!(quote_mysql_identifier("group"), "`group`");
/// assert_eq!(quote_mysql_identifier("we`ird"), "`we``ird`");
/// ```
pub fn quote_mysql_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a SQLite identifier with double quotes
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::utils::quote_sqlite_identifier;
/// assert_eq!(quote_sqlite_identifier("order"), "\"order\"");
/// assert_eq!(quote_sqlite_identifier("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_sqlite_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render a string as a single-quoted SQL literal, doubling embedded quotes
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::utils::quote_literal;
/// assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Retry an async operation with exponential backoff
///
/// Runs `operation` up to `max_retries + 1` times, doubling the delay after
/// each failure. The last error is returned if every attempt fails.
///
/// # Examples
///
/// ```no_run
/// # use anyhow::Result;
/// # use std::time::Duration;
/// # use sqlite_mysql_migrator::utils::retry_with_backoff;
/// # async fn example() -> Result<()> {
/// let value = retry_with_backoff("probe", || async { Ok(42) }, 3, Duration::from_secs(1)).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T>(
    what: &str,
    mut operation: F,
    max_retries: u32,
    initial_delay: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = initial_delay;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries => {
                attempt += 1;
                tracing::warn!(
                    "{} failed (attempt {}/{}): {:#}. Retrying in {:?}...",
                    what,
                    attempt,
                    max_retries + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
