// ABOUTME: Loads migration settings from environment variables or a TOML file
// ABOUTME: Environment wins when complete; otherwise falls back to config.toml

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

const ENV_SQLITE_PATH: &str = "SQLITE_PATH";
const ENV_MYSQL_HOST: &str = "MYSQL_HOST";
const ENV_MYSQL_PORT: &str = "MYSQL_PORT";
const ENV_MYSQL_USER: &str = "MYSQL_USER";
const ENV_MYSQL_PASSWORD: &str = "MYSQL_PASSWORD";
const ENV_MYSQL_DATABASE: &str = "MYSQL_DATABASE";

const REQUIRED_ENV_VARS: &[&str] = &[
    ENV_MYSQL_HOST,
    ENV_MYSQL_PORT,
    ENV_MYSQL_USER,
    ENV_MYSQL_PASSWORD,
    ENV_MYSQL_DATABASE,
    ENV_SQLITE_PATH,
];

/// Where to read from and where to write to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    pub source_path: String,
    pub destination: DestinationConfig,
}

#[derive(Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

// Keep the password out of logs and error chains
impl std::fmt::Debug for DestinationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    database: Option<SourceSection>,
    mysql: Option<MysqlSection>,
}

#[derive(Debug, Deserialize)]
struct SourceSection {
    sqlite_file: String,
}

#[derive(Debug, Deserialize)]
struct MysqlSection {
    host: String,
    port: PortSetting,
    user: String,
    password: String,
    database: String,
}

/// TOML files in the wild carry the port as either `3306` or `"3306"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortSetting {
    Number(i64),
    Text(String),
}

impl PortSetting {
    fn to_port(&self) -> Result<u16> {
        match self {
            PortSetting::Number(n) => u16::try_from(*n)
                .with_context(|| format!("MySQL port {} is out of range", n)),
            PortSetting::Text(s) => parse_port(s),
        }
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.trim()
        .parse::<u16>()
        .with_context(|| format!("Invalid MySQL port '{}'", raw))
}

/// Load configuration for this process
///
/// Environment variables are used when all six are set and non-empty.
/// Otherwise the TOML file at `config_path`, then `$CONFIG_PATH`, then
/// `config.toml` is read.
pub fn load_config(config_path: Option<&str>) -> Result<MigrationConfig> {
    tracing::info!("Trying to load configuration from environment variables...");

    let env: HashMap<String, String> = std::env::vars().collect();
    if let Some(config) = from_env_map(&env)? {
        tracing::info!("Found all required environment variables");
        return Ok(config);
    }

    let path = config_path
        .map(str::to_string)
        .or_else(|| env.get(CONFIG_PATH_ENV).cloned())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    tracing::info!(
        "Environment incomplete, loading configuration from {}",
        path
    );
    load_config_file(Path::new(&path))
}

/// Build configuration from environment-style key/value pairs
///
/// Returns `Ok(None)` when any required variable is absent or empty, so the
/// caller can fall back to the file. A present but unparseable port is an error.
pub fn from_env_map(env: &HashMap<String, String>) -> Result<Option<MigrationConfig>> {
    let present = |key: &str| env.get(key).filter(|v| !v.is_empty());

    if !REQUIRED_ENV_VARS.iter().all(|&key| present(key).is_some()) {
        return Ok(None);
    }

    let get = |key: &str| present(key).cloned().unwrap_or_default();

    Ok(Some(MigrationConfig {
        source_path: get(ENV_SQLITE_PATH),
        destination: DestinationConfig {
            host: get(ENV_MYSQL_HOST),
            port: parse_port(&get(ENV_MYSQL_PORT)).context("MYSQL_PORT is not a valid port")?,
            user: get(ENV_MYSQL_USER),
            password: get(ENV_MYSQL_PASSWORD),
            database: get(ENV_MYSQL_DATABASE),
        },
    }))
}

pub fn load_config_file(path: &Path) -> Result<MigrationConfig> {
    if !path.exists() {
        bail!(
            "Config file not found at {} and environment variables are not set",
            path.display()
        );
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    from_toml_str(&raw).with_context(|| format!("Invalid config file at {}", path.display()))
}

pub fn from_toml_str(raw: &str) -> Result<MigrationConfig> {
    let parsed: FileConfig = toml::from_str(raw).context("Failed to parse TOML config")?;

    let (Some(source), Some(mysql)) = (parsed.database, parsed.mysql) else {
        bail!("Config file is missing the [database] or [mysql] section");
    };

    Ok(MigrationConfig {
        source_path: source.sqlite_file,
        destination: DestinationConfig {
            port: mysql.port.to_port()?,
            host: mysql.host,
            user: mysql.user,
            password: mysql.password,
            database: mysql.database,
        },
    })
}
