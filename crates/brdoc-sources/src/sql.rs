//! SQL data source executing named-placeholder templates over Postgres.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column, Row};
use tracing::error;

use crate::descriptor::{
    extract_variables, DataSourceDescriptor, DataSourceKind, DataSourceResult, Payload,
};
use crate::source::{DataSource, FetchParams};

/// SQL-backed data source.
///
/// Query templates use a `:name` placeholder dialect; placeholders are
/// rewritten to positional bindings in order of first appearance, so a
/// name may repeat.
pub struct SqlDataSource {
    name: String,
    description: String,
    query_template: String,
    params_schema: BTreeMap<String, String>,
    pool: Option<PgPool>,
}

impl SqlDataSource {
    pub fn new(
        name: impl Into<String>,
        query_template: impl Into<String>,
        description: impl Into<String>,
        params_schema: BTreeMap<String, String>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            query_template: query_template.into(),
            params_schema,
            pool,
        }
    }

    /// Rewrite `:name` placeholders to `$n` and return the bind order.
    fn rewrite_placeholders(&self) -> (String, Vec<String>) {
        let mut sql = String::with_capacity(self.query_template.len());
        let mut order: Vec<String> = Vec::new();
        let mut chars = self.query_template.char_indices().peekable();

        while let Some((_, ch)) = chars.next() {
            // `::` is a Postgres cast, not a placeholder.
            if ch == ':' && !matches!(chars.peek(), Some((_, ':'))) {
                let mut name = String::new();
                while let Some((_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || *c == '_' {
                        name.push(*c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    sql.push(ch);
                    continue;
                }
                let index = match order.iter().position(|n| n == &name) {
                    Some(i) => i + 1,
                    None => {
                        order.push(name);
                        order.len()
                    }
                };
                sql.push_str(&format!("${index}"));
            } else if ch == ':' {
                // Emit both colons of the cast and skip the peeked one.
                sql.push(':');
                sql.push(':');
                chars.next();
            } else {
                sql.push(ch);
            }
        }
        (sql, order)
    }
}

fn decode_column(row: &PgRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Decimal>, _>(idx) {
        return v
            .and_then(|d| d.to_f64())
            .map(Value::from)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
        return v
            .map(|d| Value::from(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx) {
        return v.map(|t| Value::from(t.to_rfc3339())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(idx) {
        return v.map(|u| Value::from(u.to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    Value::Null
}

fn row_to_map(row: &PgRow) -> serde_json::Map<String, Value> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| (col.name().to_string(), decode_column(row, idx)))
        .collect()
}

#[async_trait]
impl DataSource for SqlDataSource {
    fn descriptor(&self) -> DataSourceDescriptor {
        let preview = if self.query_template.len() > 200 {
            format!("{}...", &self.query_template[..200])
        } else {
            self.query_template.clone()
        };
        DataSourceDescriptor {
            name: self.name.clone(),
            kind: DataSourceKind::Sql,
            description: self.description.clone(),
            params: self.params_schema.clone(),
            query_preview: Some(preview),
        }
    }

    async fn fetch(&self, params: &FetchParams) -> DataSourceResult {
        let Some(pool) = &self.pool else {
            return DataSourceResult::failure(
                &self.name,
                DataSourceKind::Sql,
                &self.name,
                "Database pool not configured",
            );
        };

        let (sql, order) = self.rewrite_placeholders();
        let mut query = sqlx::query(&sql);
        for name in &order {
            let value = params.get(name).cloned().unwrap_or(Value::Null);
            query = match value {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(b),
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        query.bind(i)
                    } else {
                        query.bind(n.as_f64().unwrap_or(0.0))
                    }
                }
                Value::String(s) => query.bind(s),
                other => query.bind(other.to_string()),
            };
        }

        match query.fetch_all(pool).await {
            Ok(rows) => {
                let data: Vec<serde_json::Map<String, Value>> =
                    rows.iter().map(row_to_map).collect();
                let variables = extract_variables(&data);
                let mut result = DataSourceResult::success(
                    &self.name,
                    DataSourceKind::Sql,
                    format!("{}: {} rows", self.name, data.len()),
                    Payload::Rows(data),
                );
                result.variables = variables;
                result
            }
            Err(e) => {
                error!(source = %self.name, error = %e, "sql source fetch failed");
                DataSourceResult::failure(&self.name, DataSourceKind::Sql, &self.name, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(template: &str) -> SqlDataSource {
        SqlDataSource::new("t", template, "", BTreeMap::new(), None)
    }

    #[test]
    fn placeholders_rewrite_in_order_of_first_appearance() {
        let (sql, order) =
            source("SELECT * FROM e WHERE p = :project_id AND y = :year AND p2 = :project_id")
                .rewrite_placeholders();
        assert_eq!(sql, "SELECT * FROM e WHERE p = $1 AND y = $2 AND p2 = $1");
        assert_eq!(order, vec!["project_id".to_string(), "year".to_string()]);
    }

    #[test]
    fn casts_are_left_alone() {
        let (sql, order) = source("SELECT x::text FROM t WHERE id = :id").rewrite_placeholders();
        assert_eq!(sql, "SELECT x::text FROM t WHERE id = $1");
        assert_eq!(order.len(), 1);
    }

    #[tokio::test]
    async fn missing_pool_is_a_contained_failure() {
        let result = source("SELECT 1").fetch(&FetchParams::new()).await;
        assert!(!result.is_success());
        assert!(result.payload.is_empty());
    }
}
