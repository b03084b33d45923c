// ABOUTME: SQLite declared type to MySQL column type resolution
// ABOUTME: Override lookup first, then substring heuristics over the declared type

use super::overrides::SchemaOverrides;

pub const BIGINT: &str = "BIGINT";
pub const VARCHAR_255: &str = "VARCHAR(255)";
pub const TEXT: &str = "TEXT";
pub const BLOB: &str = "BLOB";
pub const DOUBLE: &str = "DOUBLE";
pub const DECIMAL_10_2: &str = "DECIMAL(10, 2)";
pub const BOOLEAN: &str = "BOOLEAN";
pub const DATE: &str = "DATE";
pub const DATETIME: &str = "DATETIME";

/// Text-like columns with these names get `TEXT` instead of `VARCHAR(255)`
const LONG_TEXT_COLUMN_NAMES: &[&str] = &[
    "description",
    "content",
    "data",
    "properties",
    "config",
    "prompt",
    "image_url",
    "value",
];

/// Resolve the MySQL type for one source column
///
/// An exact (table, column) override always wins. Otherwise the SQLite
/// declared type is matched case-insensitively by substring, in this order:
///
/// | contains | MySQL type |
/// |---|---|
/// | `int` | `BIGINT` |
/// | `char`, `clob`, `text` | `TEXT` for long-text column names, else `VARCHAR(255)` |
/// | `blob` | `BLOB` |
/// | `real`, `double`, `float` | `DOUBLE` |
/// | `numeric`, `decimal` | `DECIMAL(10, 2)` |
/// | `bool` | `BOOLEAN` |
/// | `date` without `time` | `DATE` |
/// | `time` | `DATETIME` |
///
/// Anything else, including an empty declared type, becomes `VARCHAR(255)`.
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::schema::{overrides::SchemaOverrides, types::resolve_type};
/// let overrides = SchemaOverrides::builtin();
/// assert_eq!(resolve_type(&overrides, "INTEGER", "users", "quota"), "BIGINT");
/// assert_eq!(resolve_type(&overrides, "TEXT", "users", "group"), "VARCHAR(100)");
/// assert_eq!(resolve_type(&overrides, "text", "notes", "content"), "TEXT");
/// ```
pub fn resolve_type(
    overrides: &SchemaOverrides,
    source_type: &str,
    table: &str,
    column: &str,
) -> String {
    if let Some(forced) = overrides.type_override(table, column) {
        return forced.to_string();
    }

    classify(source_type, column).to_string()
}

fn classify(source_type: &str, column: &str) -> &'static str {
    let ty = source_type.trim().to_lowercase();
    let has = |needle: &str| ty.contains(needle);

    if has("int") {
        BIGINT
    } else if has("char") || has("clob") || has("text") {
        if LONG_TEXT_COLUMN_NAMES.contains(&column) {
            TEXT
        } else {
            VARCHAR_255
        }
    } else if has("blob") {
        BLOB
    } else if has("real") || has("double") || has("float") {
        DOUBLE
    } else if has("numeric") || has("decimal") {
        DECIMAL_10_2
    } else if has("bool") {
        BOOLEAN
    } else if has("date") && !has("time") {
        DATE
    } else if has("time") {
        DATETIME
    } else {
        VARCHAR_255
    }
}

/// Base type name without length/precision, upper-cased (`decimal(10,2)` → `DECIMAL`)
fn base_name(destination_type: &str) -> String {
    destination_type
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

/// The 64-bit integer type, the only type eligible for AUTO_INCREMENT
pub fn is_bigint(destination_type: &str) -> bool {
    base_name(destination_type) == BIGINT
}

/// Large binary/text types, which MySQL does not allow a literal DEFAULT on
pub fn is_long_type(destination_type: &str) -> bool {
    let name = base_name(destination_type);
    name.ends_with("TEXT") || name.ends_with("BLOB")
}

/// Numeric and boolean types, whose defaults are rendered unquoted
pub fn is_numeric_type(destination_type: &str) -> bool {
    matches!(
        base_name(destination_type).as_str(),
        "TINYINT"
            | "SMALLINT"
            | "MEDIUMINT"
            | "INT"
            | "INTEGER"
            | "BIGINT"
            | "FLOAT"
            | "DOUBLE"
            | "REAL"
            | "DECIMAL"
            | "NUMERIC"
            | "BOOL"
            | "BOOLEAN"
    )
}

pub fn is_temporal_type(destination_type: &str) -> bool {
    matches!(
        base_name(destination_type).as_str(),
        "DATETIME" | "TIMESTAMP"
    )
}
