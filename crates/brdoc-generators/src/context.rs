//! Substitution-context assembly.
//!
//! Merges fetched source payloads, computed aggregates, and literal
//! parameters into the map templates are expanded against. Payloads map
//! onto well-known context keys; literal parameters win on conflict.

use chrono::{Datelike, Utc};
use serde_json::{Map, Value};

use brdoc_core::enums::BrCategory;
use brdoc_core::format::month_name_pl;
use brdoc_sources::{DataSourceResult, Payload};

fn rows_value(rows: Vec<&Map<String, Value>>) -> Value {
    Value::Array(rows.into_iter().map(|m| Value::Object(m.clone())).collect())
}

fn sum_field(rows: &[&Map<String, Value>], field: &str) -> f64 {
    rows.iter()
        .filter_map(|row| row.get(field))
        .filter_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .sum()
}

/// Fold one fetched result into the context under its well-known keys.
///
/// Failed fetches contribute nothing; templates tolerate the gaps and
/// the validator reports what is missing.
fn merge_source(context: &mut Map<String, Value>, name: &str, result: &DataSourceResult) {
    if !result.is_success() {
        return;
    }
    let rows = result.payload.rows();

    match name {
        "project_info" => {
            if let Some(first) = rows.first() {
                context.insert("project".to_string(), Value::Object((*first).clone()));
            }
        }
        "expenses_summary" => {
            context.insert("expenses".to_string(), rows_value(rows.clone()));
            context.insert("expense_count".to_string(), Value::from(rows.len()));
            context
                .entry("total_gross".to_string())
                .or_insert_with(|| Value::from(sum_field(&rows, "gross_amount")));
            context
                .entry("total_net".to_string())
                .or_insert_with(|| Value::from(sum_field(&rows, "net_amount")));
        }
        "expenses_by_category" => {
            // Augment each row with the Polish category name.
            let augmented: Vec<Value> = rows
                .iter()
                .map(|row| {
                    let mut row = (*row).clone();
                    if let Some(tag) = row.get("category").and_then(|v| v.as_str()) {
                        let name = BrCategory::from_tag(tag).display_name_pl();
                        row.insert("category_name".to_string(), Value::from(name));
                    }
                    Value::Object(row)
                })
                .collect();
            context.insert("expenses_by_category".to_string(), Value::Array(augmented));
            context
                .entry("total_gross".to_string())
                .or_insert_with(|| Value::from(sum_field(&rows, "total_gross")));
            context
                .entry("total_qualified".to_string())
                .or_insert_with(|| Value::from(sum_field(&rows, "qualified_amount")));
        }
        "timesheet_summary" => {
            context.insert("timesheet".to_string(), rows_value(rows.clone()));
            let total_hours = sum_field(&rows, "total_hours");
            let workers: std::collections::BTreeSet<&str> = rows
                .iter()
                .filter_map(|r| r.get("worker_name").and_then(|v| v.as_str()))
                .collect();
            let worker_count = workers.len();
            context.insert("total_hours".to_string(), Value::from(total_hours));
            context.insert("worker_count".to_string(), Value::from(worker_count));
            context.insert(
                "avg_hours".to_string(),
                Value::from(if worker_count > 0 {
                    total_hours / worker_count as f64
                } else {
                    0.0
                }),
            );
        }
        "nexus_calculation" => {
            if let Some(first) = rows.first() {
                context.insert("nexus".to_string(), Value::Object((*first).clone()));
            }
        }
        "revenues" => {
            context.insert("revenues".to_string(), rows_value(rows.clone()));
            context.insert(
                "total_revenue".to_string(),
                Value::from(sum_field(&rows, "gross_amount")),
            );
        }
        other => {
            // Unrecognised sources land under their own name.
            let value = match &result.payload {
                Payload::Rows(rows) => {
                    Value::Array(rows.iter().cloned().map(Value::Object).collect())
                }
                Payload::Map(map) => Value::Object(map.clone()),
                Payload::Scalar(v) => v.clone(),
            };
            context.insert(other.to_string(), value);
        }
    }
}

/// Build the full substitution context.
pub fn build_context(
    fetched: &[(String, DataSourceResult)],
    params: &Map<String, Value>,
    extra: &Map<String, Value>,
) -> Map<String, Value> {
    let mut context = Map::new();

    for (name, result) in fetched {
        merge_source(&mut context, name, result);
    }

    // Derived keys.
    let now = Utc::now();
    context.insert(
        "generated_date".to_string(),
        Value::from(now.format("%Y-%m-%d").to_string()),
    );

    let year = params
        .get("year")
        .and_then(|v| v.as_i64())
        .or_else(|| {
            context
                .get("project")
                .and_then(|p| p.get("fiscal_year"))
                .and_then(|v| v.as_i64())
        })
        .unwrap_or(now.year() as i64);
    context.insert("year".to_string(), Value::from(year));

    if let Some(month) = params.get("month").and_then(|v| v.as_u64()) {
        context.insert("month".to_string(), Value::from(month));
        context.insert(
            "month_name".to_string(),
            Value::from(month_name_pl(month as u32)),
        );
    }

    // IP Box derivations when both sides are known.
    let total_revenue = context
        .get("total_revenue")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let total_costs = extra
        .get("total_costs")
        .or_else(|| context.get("total_gross"))
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let nexus_ratio = context
        .get("nexus")
        .and_then(|n| n.get("nexus"))
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);
    let ip_income = (total_revenue - total_costs).max(0.0);
    let qualified_income = ip_income * nexus_ratio;
    context.insert("total_costs".to_string(), Value::from(total_costs));
    context.insert("ip_income".to_string(), Value::from(ip_income));
    context.insert("qualified_income".to_string(), Value::from(qualified_income));
    context.insert("ip_tax".to_string(), Value::from(qualified_income * 0.05));
    // Savings vs the standard 19% CIT rate.
    context.insert(
        "ip_box_savings".to_string(),
        Value::from(qualified_income * (0.19 - 0.05)),
    );

    // Aggregates and the caller's literal parameters override.
    for (key, value) in extra {
        context.insert(key.clone(), value.clone());
    }
    for (key, value) in params {
        context.insert(key.clone(), value.clone());
    }

    context
}
