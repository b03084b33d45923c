// ABOUTME: Operator-curated exceptions to automatic schema translation
// ABOUTME: Per-column type overrides, text columns allowed to keep defaults, replace-on-conflict tables

use std::collections::{HashMap, HashSet};

/// Explicit destination types for (table, column) pairs the heuristics get wrong
pub(crate) const TYPE_OVERRIDES: &[(&str, &str, &str)] = &[
    ("channels", "status", "BIGINT"),
    ("channels", "type", "BIGINT"),
    ("channels", "base_url", "VARCHAR(255)"),
    ("channels", "tag", "VARCHAR(255)"),
    ("channels", "proxy", "VARCHAR(255)"),
    ("channels", "test_model", "VARCHAR(255)"),
    ("channels", "model_headers", "VARCHAR(255)"),
    ("channels", "custom_parameter", "VARCHAR(255)"),
    ("channels", "group", "VARCHAR(100)"),
    ("channels", "models", "TEXT"),
    ("channels", "model_mapping", "TEXT"),
    ("channels", "other", "TEXT"),
    ("channels", "plugin", "TEXT"),
    ("channels", "disabled_stream", "TEXT"),
    ("payments", "fixed_fee", "DECIMAL(10,2)"),
    ("payments", "percent_fee", "DECIMAL(10,2)"),
    ("payments", "config", "TEXT"),
    ("users", "access_token", "VARCHAR(255)"),
    ("users", "group", "VARCHAR(100)"),
    ("users", "avatar_url", "VARCHAR(255)"),
    ("users", "password", "VARCHAR(255)"),
    ("users", "email", "VARCHAR(255)"),
    ("users", "github_id", "VARCHAR(255)"),
    ("users", "wechat_id", "VARCHAR(255)"),
    ("users", "lark_id", "VARCHAR(255)"),
    ("users", "aff_code", "VARCHAR(255)"),
    ("users", "oidc_id", "VARCHAR(255)"),
    ("tokens", "group", "VARCHAR(100)"),
    ("tokens", "key", "VARCHAR(255)"),
    ("tokens", "name", "VARCHAR(255)"),
    ("tokens", "setting", "TEXT"),
    ("logs", "username", "VARCHAR(100)"),
    ("logs", "token_name", "VARCHAR(100)"),
    ("logs", "model_name", "VARCHAR(100)"),
    ("logs", "source_ip", "VARCHAR(100)"),
    ("logs", "content", "TEXT"),
    ("logs", "metadata", "TEXT"),
    ("telegram_menus", "description", "VARCHAR(255)"),
    ("telegram_menus", "parse_mode", "VARCHAR(50)"),
    ("telegram_menus", "command", "VARCHAR(255)"),
    ("telegram_menus", "reply_message", "TEXT"),
    ("prices", "type", "VARCHAR(50)"),
    ("prices", "model", "VARCHAR(255)"),
    ("prices", "extra_ratios", "TEXT"),
    ("statistics", "user_id", "BIGINT"),
    ("statistics", "channel_id", "BIGINT"),
    ("statistics", "model_name", "VARCHAR(255)"),
    ("statistics_months", "user_id", "BIGINT"),
    ("statistics_months", "model_name", "VARCHAR(255)"),
    ("abilities", "channel_id", "BIGINT"),
    ("abilities", "group", "VARCHAR(100)"),
    ("abilities", "model", "VARCHAR(255)"),
    ("midjourneys", "action", "VARCHAR(255)"),
    ("midjourneys", "mj_id", "VARCHAR(255)"),
    ("midjourneys", "prompt", "TEXT"),
    ("midjourneys", "prompt_en", "TEXT"),
    ("midjourneys", "description", "TEXT"),
    ("midjourneys", "state", "VARCHAR(100)"),
    ("midjourneys", "status", "VARCHAR(100)"),
    ("midjourneys", "progress", "VARCHAR(100)"),
    ("midjourneys", "fail_reason", "TEXT"),
    ("midjourneys", "image_url", "TEXT"),
    ("midjourneys", "buttons", "TEXT"),
    ("midjourneys", "properties", "TEXT"),
    ("midjourneys", "mode", "VARCHAR(100)"),
    ("tasks", "task_id", "VARCHAR(255)"),
    ("tasks", "platform", "VARCHAR(100)"),
    ("tasks", "action", "VARCHAR(255)"),
    ("tasks", "status", "VARCHAR(100)"),
    ("tasks", "fail_reason", "TEXT"),
    ("tasks", "properties", "TEXT"),
    ("tasks", "data", "TEXT"),
    ("tasks", "notify_hook", "TEXT"),
    ("chat_caches", "hash", "VARCHAR(255)"),
    ("chat_caches", "data", "TEXT"),
    ("redemptions", "key", "VARCHAR(255)"),
    ("redemptions", "name", "VARCHAR(255)"),
    ("options", "key", "VARCHAR(255)"),
    ("options", "value", "TEXT"),
    ("migrations", "id", "VARCHAR(255)"),
    ("user_groups", "symbol", "VARCHAR(100)"),
    ("user_groups", "name", "VARCHAR(255)"),
    ("model_owned_by", "name", "VARCHAR(255)"),
    ("model_owned_by", "icon", "VARCHAR(255)"),
    ("orders", "trade_no", "VARCHAR(255)"),
    ("orders", "gateway_no", "VARCHAR(255)"),
    ("orders", "order_currency", "VARCHAR(50)"),
    ("orders", "status", "VARCHAR(100)"),
];

/// Columns that keep their source default even when resolved to a long-text type
const DEFAULTABLE_TEXT_COLUMNS: &[(&str, &str)] = &[
    ("users", "group"),
    ("users", "avatar_url"),
    ("tokens", "group"),
    ("logs", "username"),
    ("logs", "token_name"),
    ("logs", "model_name"),
    ("logs", "source_ip"),
    ("telegram_menus", "description"),
    ("telegram_menus", "parse_mode"),
    ("prices", "type"),
    ("channels", "base_url"),
    ("channels", "tag"),
    ("channels", "group"),
    ("channels", "proxy"),
    ("channels", "test_model"),
    ("channels", "model_headers"),
    ("channels", "custom_parameter"),
];

/// Composite-key tables that collide on re-migration and are copied with REPLACE
const REPLACE_ON_CONFLICT_TABLES: &[&str] = &["abilities", "statistics", "statistics_months"];

/// Lookup tables consulted by schema translation and data copy
///
/// `builtin()` carries the curated defaults; tests and embedders can build
/// their own with the `with_*` methods.
#[derive(Debug, Clone, Default)]
pub struct SchemaOverrides {
    types: HashMap<(String, String), String>,
    defaultable_text: HashSet<(String, String)>,
    replace_tables: HashSet<String>,
}

impl SchemaOverrides {
    pub fn builtin() -> Self {
        let mut overrides = Self::default();
        for (table, column, ty) in TYPE_OVERRIDES {
            overrides = overrides.with_type(table, column, ty);
        }
        for (table, column) in DEFAULTABLE_TEXT_COLUMNS {
            overrides = overrides.with_defaultable_text(table, column);
        }
        for table in REPLACE_ON_CONFLICT_TABLES {
            overrides = overrides.with_replace_table(table);
        }
        overrides
    }

    pub fn with_type(mut self, table: &str, column: &str, destination_type: &str) -> Self {
        self.types.insert(
            (table.to_string(), column.to_string()),
            destination_type.to_string(),
        );
        self
    }

    pub fn with_defaultable_text(mut self, table: &str, column: &str) -> Self {
        self.defaultable_text
            .insert((table.to_string(), column.to_string()));
        self
    }

    pub fn with_replace_table(mut self, table: &str) -> Self {
        self.replace_tables.insert(table.to_string());
        self
    }

    /// Exact-match override for a column, if any.
    pub fn type_override(&self, table: &str, column: &str) -> Option<&str> {
        self.types
            .get(&(table.to_string(), column.to_string()))
            .map(String::as_str)
    }

    pub fn allows_text_default(&self, table: &str, column: &str) -> bool {
        self.defaultable_text
            .contains(&(table.to_string(), column.to_string()))
    }

    pub fn uses_replace(&self, table: &str) -> bool {
        self.replace_tables.contains(table)
    }
}
