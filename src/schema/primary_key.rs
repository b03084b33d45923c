// ABOUTME: Primary key extraction from source column metadata
// ABOUTME: Orders composite key columns by their declared key position

use crate::catalog::ColumnMetadata;

/// Primary key column names in key order
///
/// Columns with ordinal 0 are not part of the key. An empty result means
/// the table has no primary key.
pub fn primary_key_columns(columns: &[ColumnMetadata]) -> Vec<String> {
    let mut keyed: Vec<&ColumnMetadata> = columns
        .iter()
        .filter(|c| c.primary_key_ordinal > 0)
        .collect();
    keyed.sort_by_key(|c| c.primary_key_ordinal);
    keyed.into_iter().map(|c| c.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, ordinal: u32) -> ColumnMetadata {
        ColumnMetadata {
            name: name.to_string(),
            declared_type: "INTEGER".to_string(),
            not_null: false,
            default_value: None,
            primary_key_ordinal: ordinal,
        }
    }

    #[test]
    fn test_no_primary_key() {
        assert!(primary_key_columns(&[]).is_empty());
        assert!(primary_key_columns(&[column("a", 0), column("b", 0)]).is_empty());
    }

    #[test]
    fn test_single_primary_key() {
        let columns = vec![column("id", 1), column("name", 0)];
        assert_eq!(primary_key_columns(&columns), vec!["id"]);
    }

    #[test]
    fn test_composite_key_follows_ordinals_not_column_order() {
        let columns = vec![
            column("model", 2),
            column("quota", 0),
            column("group", 1),
            column("channel_id", 3),
        ];
        assert_eq!(
            primary_key_columns(&columns),
            vec!["group", "model", "channel_id"]
        );
    }
}
