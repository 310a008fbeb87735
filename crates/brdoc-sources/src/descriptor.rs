//! Data-source descriptors and result envelopes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    Sql,
    Rest,
    Curl,
}

/// Static description of a registered data source.
///
/// `params` maps parameter names to their human description, as shown by
/// the variables-listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceDescriptor {
    pub name: String,
    pub kind: DataSourceKind,
    pub description: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Short preview of the underlying query or URL template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_preview: Option<String>,
}

/// Payload of a fetch: a scalar, a map, or an ordered list of row maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Rows(Vec<serde_json::Map<String, Value>>),
    Map(serde_json::Map<String, Value>),
    Scalar(Value),
}

impl Payload {
    /// Empty row list, the payload of every failed fetch.
    pub fn empty() -> Self {
        Payload::Rows(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Rows(rows) => rows.is_empty(),
            Payload::Map(map) => map.is_empty(),
            Payload::Scalar(v) => v.is_null(),
        }
    }

    /// Rows of the payload; a map is treated as a single row.
    pub fn rows(&self) -> Vec<&serde_json::Map<String, Value>> {
        match self {
            Payload::Rows(rows) => rows.iter().collect(),
            Payload::Map(map) => vec![map],
            Payload::Scalar(_) => Vec::new(),
        }
    }

    /// Navigate a `/`-separated field path. On a row list the first row
    /// is addressed.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        let first = parts.next()?;
        let root = match self {
            Payload::Rows(rows) => rows.first()?,
            Payload::Map(map) => map,
            Payload::Scalar(_) => return None,
        };
        let mut current = root.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }
}

/// Result envelope of a single fetch.
///
/// `error == None` iff the result is usable; a failed fetch carries an
/// empty payload and no variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceResult {
    pub payload: Payload,
    pub source_name: String,
    pub source_kind: DataSourceKind,
    /// Human-readable description of what was executed.
    pub query_info: String,
    pub fetched_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Derived scalar variables eligible for tracking.
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
}

impl DataSourceResult {
    pub fn success(
        source_name: impl Into<String>,
        source_kind: DataSourceKind,
        query_info: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            payload,
            source_name: source_name.into(),
            source_kind,
            query_info: query_info.into(),
            fetched_at: Utc::now(),
            error: None,
            variables: BTreeMap::new(),
        }
    }

    /// Build a failure envelope: empty payload, no variables.
    pub fn failure(
        source_name: impl Into<String>,
        source_kind: DataSourceKind,
        query_info: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            payload: Payload::empty(),
            source_name: source_name.into(),
            source_kind,
            query_info: query_info.into(),
            fetched_at: Utc::now(),
            error: Some(error.into()),
            variables: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Scalar keys copied into the variable map when a query yields one row.
const SINGLE_ROW_KEYS: [&str; 4] = ["total_gross", "total_net", "nexus", "total_hours"];

/// Numeric fields aggregated into `sum_*`/`count_*` for multi-row results.
const MULTI_ROW_FIELDS: [&str; 4] = ["gross_amount", "net_amount", "hours", "total_hours"];

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// Extract the trackable scalar map from a row payload.
///
/// One row: copy the well-known scalar keys when present. Several rows:
/// `sum_<field>` and `count_<field>` over the known numeric fields.
pub fn extract_variables(rows: &[serde_json::Map<String, Value>]) -> BTreeMap<String, Value> {
    let mut variables = BTreeMap::new();

    if rows.len() == 1 {
        let row = &rows[0];
        for key in SINGLE_ROW_KEYS {
            if let Some(value) = row.get(key) {
                if !value.is_null() {
                    variables.insert(key.to_string(), value.clone());
                }
            }
        }
    } else if rows.len() > 1 {
        for field in MULTI_ROW_FIELDS {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|row| row.get(field).and_then(as_number))
                .collect();
            if !values.is_empty() {
                let sum: f64 = values.iter().sum();
                variables.insert(format!("sum_{field}"), Value::from(sum));
                variables.insert(format!("count_{field}"), Value::from(values.len()));
            }
        }
    }

    variables
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> serde_json::Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn single_row_copies_known_scalars() {
        let rows = vec![row(&[
            ("total_gross", json!(50000.0)),
            ("nexus", json!(0.95)),
            ("irrelevant", json!("x")),
        ])];
        let vars = extract_variables(&rows);
        assert_eq!(vars.get("total_gross"), Some(&json!(50000.0)));
        assert_eq!(vars.get("nexus"), Some(&json!(0.95)));
        assert!(!vars.contains_key("irrelevant"));
    }

    #[test]
    fn multi_row_sums_numeric_fields() {
        let rows = vec![
            row(&[("gross_amount", json!(100.0)), ("hours", json!(4))]),
            row(&[("gross_amount", json!(200.0)), ("hours", json!(6))]),
            row(&[("gross_amount", Value::Null)]),
        ];
        let vars = extract_variables(&rows);
        assert_eq!(vars.get("sum_gross_amount"), Some(&json!(300.0)));
        assert_eq!(vars.get("count_gross_amount"), Some(&json!(2)));
        assert_eq!(vars.get("sum_hours"), Some(&json!(10.0)));
    }

    #[test]
    fn failure_has_empty_payload_and_no_variables() {
        let r = DataSourceResult::failure("x", DataSourceKind::Sql, "x", "boom");
        assert!(!r.is_success());
        assert!(r.payload.is_empty());
        assert!(r.variables.is_empty());
    }

    #[test]
    fn path_navigation_addresses_first_row() {
        let payload = Payload::Rows(vec![row(&[("nexus", json!(1.0))])]);
        assert_eq!(payload.get_path("nexus"), Some(&json!(1.0)));
        assert_eq!(payload.get_path("missing"), None);
    }
}
