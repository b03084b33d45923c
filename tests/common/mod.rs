// ABOUTME: Shared helpers for integration tests
// ABOUTME: In-memory MySQL stand-in with transactions and key checks, plus SQLite fixtures

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use mysql_async::Value;
use rusqlite::Connection;
use sqlite_mysql_migrator::catalog::{DestinationCatalog, InsertMode, InsertStatement};
use sqlite_mysql_migrator::sqlite::SqliteSource;
use std::collections::{BTreeMap, HashMap, HashSet};

pub type Row = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    pub create_sql: String,
    pub primary_key: Vec<String>,
    pub rows: Vec<Row>,
}

/// Destination that behaves like a single MySQL session with autocommit off
///
/// Tables appear on `CREATE TABLE` and vanish on `DROP TABLE`. Inserts are
/// staged until `commit`; a statement that breaks a key is rejected whole.
#[derive(Debug, Default)]
pub struct FakeDestination {
    committed: BTreeMap<String, FakeTable>,
    staged: Option<BTreeMap<String, FakeTable>>,
    extra_unique_keys: HashMap<String, Vec<Vec<String>>>,
    failing_creates: HashSet<String>,
    lose_connection_after_inserts: Option<usize>,
    connection_lost: bool,
    pub ddl_log: Vec<String>,
    /// Row count of every insert statement, accepted or not
    pub insert_sizes: Vec<usize>,
    pub commits: usize,
    pub rollbacks: usize,
}

impl FakeDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce a unique key the source never declared
    pub fn with_unique_key(mut self, table: &str, columns: &[&str]) -> Self {
        self.extra_unique_keys
            .entry(table.to_string())
            .or_default()
            .push(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_failing_create(mut self, table: &str) -> Self {
        self.failing_creates.insert(table.to_string());
        self
    }

    /// Every call after this many insert statements fails, rollback included
    pub fn with_connection_lost_after(mut self, inserts: usize) -> Self {
        self.lose_connection_after_inserts = Some(inserts);
        self
    }

    pub fn table(&self, name: &str) -> Option<&FakeTable> {
        self.committed.get(name)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.committed.keys().cloned().collect()
    }

    pub fn row_count(&self, name: &str) -> usize {
        self.committed.get(name).map_or(0, |t| t.rows.len())
    }

    /// Committed values of one column, in insertion order
    pub fn column_values(&self, table: &str, column: &str) -> Vec<Value> {
        self.committed
            .get(table)
            .map(|t| {
                t.rows
                    .iter()
                    .map(|r| r.get(column).cloned().unwrap_or(Value::NULL))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn check_connection(&self) -> Result<()> {
        if self.connection_lost {
            bail!("Lost connection to MySQL server during query");
        }
        Ok(())
    }

    fn keys_for(&self, table: &str, fake: &FakeTable) -> Vec<Vec<String>> {
        let mut keys = Vec::new();
        if !fake.primary_key.is_empty() {
            keys.push(fake.primary_key.clone());
        }
        if let Some(extra) = self.extra_unique_keys.get(table) {
            keys.extend(extra.iter().cloned());
        }
        keys
    }
}

fn key_of(row: &Row, key: &[String]) -> Option<Vec<Value>> {
    let values: Vec<Value> = key
        .iter()
        .map(|c| row.get(c).cloned().unwrap_or(Value::NULL))
        .collect();
    // NULLs never collide in a MySQL unique index
    if values.iter().any(|v| *v == Value::NULL) {
        None
    } else {
        Some(values)
    }
}

fn collides(a: &Row, b: &Row, keys: &[Vec<String>]) -> bool {
    keys.iter().any(|key| match (key_of(a, key), key_of(b, key)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    })
}

/// Text between the first pair of backticks after `prefix`
fn backticked_after<'a>(sql: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = &sql[sql.find(prefix)? + prefix.len()..];
    let start = rest.find('`')? + 1;
    let end = start + rest[start..].find('`')?;
    Some(&rest[start..end])
}

fn parse_primary_key(sql: &str) -> Vec<String> {
    let Some(start) = sql.find("PRIMARY KEY (") else {
        return Vec::new();
    };
    let rest = &sql[start + "PRIMARY KEY (".len()..];
    let end = rest.find(')').unwrap_or(rest.len());
    rest[..end]
        .split(", ")
        .map(|c| c.trim_matches('`').to_string())
        .collect()
}

#[async_trait]
impl DestinationCatalog for FakeDestination {
    async fn ping(&mut self) -> Result<()> {
        self.check_connection()
    }

    async fn execute_ddl(&mut self, sql: &str) -> Result<()> {
        self.check_connection()?;
        self.ddl_log.push(sql.to_string());

        // DDL commits implicitly
        if let Some(staged) = self.staged.take() {
            self.committed = staged;
        }

        if sql.starts_with("DROP TABLE IF EXISTS") {
            let name = backticked_after(sql, "DROP TABLE IF EXISTS")
                .ok_or_else(|| anyhow!("Unparseable DROP: {}", sql))?;
            self.committed.remove(name);
        } else if sql.starts_with("CREATE TABLE") {
            let name = backticked_after(sql, "CREATE TABLE")
                .ok_or_else(|| anyhow!("Unparseable CREATE: {}", sql))?
                .to_string();
            if self.failing_creates.contains(&name) {
                bail!("You have an error in your SQL syntax near `{}`", name);
            }
            if self.committed.contains_key(&name) {
                bail!("Table '{}' already exists", name);
            }
            self.committed.insert(
                name,
                FakeTable {
                    create_sql: sql.to_string(),
                    primary_key: parse_primary_key(sql),
                    rows: Vec::new(),
                },
            );
        } else {
            bail!("Unsupported DDL: {}", sql);
        }
        Ok(())
    }

    async fn insert_rows(
        &mut self,
        statement: &InsertStatement,
        rows: &[Vec<Value>],
    ) -> Result<()> {
        self.check_connection()?;
        self.insert_sizes.push(rows.len());
        if let Some(limit) = self.lose_connection_after_inserts {
            if self.insert_sizes.len() > limit {
                self.connection_lost = true;
                bail!("Lost connection to MySQL server during query");
            }
        }

        let mut working = self
            .staged
            .clone()
            .unwrap_or_else(|| self.committed.clone());
        let Some(target) = working.get(&statement.table) else {
            bail!("Table '{}' doesn't exist", statement.table);
        };
        let keys = self.keys_for(&statement.table, target);
        let mut table_rows = target.rows.clone();

        for values in rows {
            if values.len() != statement.columns.len() {
                bail!("Column count doesn't match value count");
            }
            let row: Row = statement
                .columns
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect();

            match statement.mode {
                InsertMode::Insert => {
                    if table_rows.iter().any(|existing| collides(existing, &row, &keys)) {
                        bail!("Duplicate entry for key in table '{}'", statement.table);
                    }
                }
                InsertMode::Replace => {
                    table_rows.retain(|existing| !collides(existing, &row, &keys));
                }
            }
            table_rows.push(row);
        }

        if let Some(target) = working.get_mut(&statement.table) {
            target.rows = table_rows;
        }
        self.staged = Some(working);
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.check_connection()?;
        if let Some(staged) = self.staged.take() {
            self.committed = staged;
        }
        self.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.check_connection()?;
        self.staged = None;
        self.rollbacks += 1;
        Ok(())
    }
}

/// Wrap an in-memory SQLite database built from `sql` as a migration source
pub fn sqlite_source(sql: &str) -> SqliteSource {
    let conn = Connection::open_in_memory().expect("in-memory SQLite");
    conn.execute_batch(sql).expect("fixture SQL");
    SqliteSource::new(conn)
}

/// `users` table with `count` rows; every email is unique except where
/// `duplicate_email_at` reuses the email of row 1
pub fn users_fixture(count: usize, duplicate_email_at: Option<usize>) -> String {
    let mut sql = String::from(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT,
            quota INTEGER DEFAULT 0
        );\n",
    );
    for i in 1..=count {
        let email = if Some(i) == duplicate_email_at {
            "user1@example.com".to_string()
        } else {
            format!("user{}@example.com", i)
        };
        sql.push_str(&format!(
            "INSERT INTO users (id, username, email, quota) VALUES ({}, 'user{}', '{}', {});\n",
            i,
            i,
            email,
            i * 10
        ));
    }
    sql
}

pub fn int_values(values: &[Value]) -> Vec<i64> {
    values
        .iter()
        .filter_map(|v| match v {
            Value::Int(i) => Some(*i),
            _ => None,
        })
        .collect()
}
