// ABOUTME: Translation of SQLite table metadata into MySQL CREATE TABLE plans
// ABOUTME: Resolves column types, defaults, primary keys, and AUTO_INCREMENT

pub mod overrides;
pub mod primary_key;
pub mod types;

use crate::catalog::ColumnMetadata;
use crate::utils::{quote_literal, quote_mysql_identifier};
use overrides::SchemaOverrides;

const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

/// One column of the destination table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationColumnDef {
    pub name: String,
    pub destination_type: String,
    pub not_null: bool,
    /// Rendered literal, without the `DEFAULT` keyword
    pub default_clause: Option<String>,
    pub auto_increment: bool,
}

impl DestinationColumnDef {
    fn to_sql(&self) -> String {
        let mut sql = format!(
            "{} {}",
            quote_mysql_identifier(&self.name),
            self.destination_type
        );
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default_clause {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        if self.auto_increment {
            sql.push_str(" AUTO_INCREMENT");
        }
        sql
    }
}

/// Everything needed to create one destination table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCreatePlan {
    pub table_name: String,
    pub columns: Vec<DestinationColumnDef>,
    pub primary_key: Vec<String>,
}

impl TableCreatePlan {
    /// Render the `CREATE TABLE` statement
    ///
    /// No `IF NOT EXISTS`: the caller drops the table first.
    pub fn create_table_sql(&self) -> String {
        let mut definitions: Vec<String> = self.columns.iter().map(|c| c.to_sql()).collect();

        if !self.primary_key.is_empty() {
            let key_columns = self
                .primary_key
                .iter()
                .map(|c| quote_mysql_identifier(c))
                .collect::<Vec<_>>()
                .join(", ");
            definitions.push(format!("PRIMARY KEY ({})", key_columns));
        }

        format!(
            "CREATE TABLE {} (\n    {}\n) {}",
            quote_mysql_identifier(&self.table_name),
            definitions.join(",\n    "),
            TABLE_OPTIONS
        )
    }
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_mysql_identifier(table))
}

/// Build the destination table plan for one source table
///
/// Only the first primary key column can be AUTO_INCREMENT, and only when it
/// resolves to BIGINT. Defaults are dropped for TEXT/BLOB columns unless the
/// column is explicitly allowed to keep one.
pub fn build_plan(
    overrides: &SchemaOverrides,
    table: &str,
    columns: &[ColumnMetadata],
) -> TableCreatePlan {
    let primary_key = primary_key::primary_key_columns(columns);
    let first_key_column = primary_key.first().cloned();
    let mut auto_increment_assigned = false;

    let defs = columns
        .iter()
        .map(|column| {
            let destination_type =
                types::resolve_type(overrides, &column.declared_type, table, &column.name);

            let auto_increment = !auto_increment_assigned
                && column.primary_key_ordinal > 0
                && first_key_column.as_deref() == Some(column.name.as_str())
                && types::is_bigint(&destination_type);
            auto_increment_assigned |= auto_increment;

            // MySQL rejects a DEFAULT on AUTO_INCREMENT columns
            let default_clause = if auto_increment {
                None
            } else {
                default_clause(overrides, table, column, &destination_type)
            };

            DestinationColumnDef {
                name: column.name.clone(),
                destination_type,
                not_null: column.not_null,
                default_clause,
                auto_increment,
            }
        })
        .collect();

    TableCreatePlan {
        table_name: table.to_string(),
        columns: defs,
        primary_key,
    }
}

fn default_clause(
    overrides: &SchemaOverrides,
    table: &str,
    column: &ColumnMetadata,
    destination_type: &str,
) -> Option<String> {
    let raw = column.default_value.as_deref()?;
    let literal = SourceDefault::parse(raw)?;

    if types::is_long_type(destination_type) && !overrides.allows_text_default(table, &column.name)
    {
        tracing::debug!(
            "Dropping default {} on {}.{} ({} cannot carry a default)",
            raw,
            table,
            column.name,
            destination_type
        );
        return None;
    }

    if types::is_numeric_type(destination_type) {
        return Some(literal.value);
    }

    if !literal.quoted
        && types::is_temporal_type(destination_type)
        && literal.value.eq_ignore_ascii_case("CURRENT_TIMESTAMP")
    {
        return Some(literal.value.to_uppercase());
    }

    Some(quote_literal(&literal.value))
}

/// A default as SQLite reports it, with any surrounding quotes removed
struct SourceDefault {
    value: String,
    quoted: bool,
}

impl SourceDefault {
    /// `None` for a NULL default, which is the same as no default.
    fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("NULL") {
            return None;
        }

        let is_quoted = trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'');
        if is_quoted {
            let inner = &trimmed[1..trimmed.len() - 1];
            Some(Self {
                value: inner.replace("''", "'"),
                quoted: true,
            })
        } else {
            Some(Self {
                value: trimmed.to_string(),
                quoted: false,
            })
        }
    }
}
