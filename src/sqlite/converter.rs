// ABOUTME: SQLite to MySQL value conversion for parameterized inserts
// ABOUTME: Maps each SQLite storage class onto the matching mysql_async value

use mysql_async::Value as MysqlValue;
use rusqlite::types::Value as SqliteValue;

/// Convert a single SQLite value into a MySQL driver value
///
/// - NULL → NULL
/// - INTEGER → Int (i64)
/// - REAL → Double (f64)
/// - TEXT → Bytes (UTF-8)
/// - BLOB → Bytes (raw)
///
/// Further coercion to the destination column type is left to the server.
pub fn sqlite_to_mysql_value(value: SqliteValue) -> MysqlValue {
    match value {
        SqliteValue::Null => MysqlValue::NULL,
        SqliteValue::Integer(i) => MysqlValue::Int(i),
        SqliteValue::Real(f) => MysqlValue::Double(f),
        SqliteValue::Text(s) => MysqlValue::Bytes(s.into_bytes()),
        SqliteValue::Blob(b) => MysqlValue::Bytes(b),
    }
}

/// Convert a whole row, preserving column order
pub fn sqlite_row_to_mysql(row: Vec<SqliteValue>) -> Vec<MysqlValue> {
    row.into_iter().map(sqlite_to_mysql_value).collect()
}
