//! Evaluator for the substitution dialect.
//!
//! Undefined references render to empty strings. Missing content is a
//! validator concern, not an expansion failure.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use brdoc_core::format::format_pln;

use crate::ast::{CompareOp, Condition, Expr, Filter, Literal, Node};

/// Scope stack: loop variables shadow outer bindings and the root context.
struct Scope<'a> {
    root: &'a Map<String, Value>,
    frames: Vec<Map<String, Value>>,
}

impl<'a> Scope<'a> {
    fn lookup(&self, path: &[String]) -> Option<Value> {
        let head = path.first()?;
        let mut current: &Value = self
            .frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(head))
            .or_else(|| self.root.get(head))?;
        for part in &path[1..] {
            current = current.as_object()?.get(part)?;
        }
        Some(current.clone())
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn apply_filter(value: Value, filter: &Filter) -> Value {
    match filter {
        Filter::FormatDate => {
            // Dates arrive as ISO strings from the read model; pass them
            // through and stringify anything else.
            Value::String(stringify(&value))
        }
        Filter::FormatCurrency => match as_number(&value) {
            Some(n) => {
                let decimal = Decimal::from_f64(n).unwrap_or(Decimal::ZERO);
                Value::String(format_pln(decimal))
            }
            None => Value::String(stringify(&value)),
        },
        Filter::Round(digits) => match as_number(&value) {
            Some(n) => Value::String(format!("{n:.prec$}", prec = *digits as usize)),
            None => Value::String(stringify(&value)),
        },
    }
}

fn eval_expr(expr: &Expr, scope: &Scope<'_>) -> String {
    let mut value = match scope.lookup(&expr.path) {
        Some(v) => v,
        None => return String::new(),
    };
    for filter in &expr.filters {
        value = apply_filter(value, filter);
    }
    stringify(&value)
}

fn eval_condition(condition: &Condition, scope: &Scope<'_>) -> bool {
    match condition {
        Condition::Truthy(path) => scope.lookup(path).map(|v| truthy(&v)).unwrap_or(false),
        Condition::Falsy(path) => !scope.lookup(path).map(|v| truthy(&v)).unwrap_or(false),
        Condition::Compare(path, op, literal) => {
            let Some(value) = scope.lookup(path) else {
                return false;
            };
            match literal {
                Literal::Number(rhs) => {
                    let Some(lhs) = as_number(&value) else {
                        return false;
                    };
                    match op {
                        CompareOp::Eq => lhs == *rhs,
                        CompareOp::Ne => lhs != *rhs,
                        CompareOp::Lt => lhs < *rhs,
                        CompareOp::Le => lhs <= *rhs,
                        CompareOp::Gt => lhs > *rhs,
                        CompareOp::Ge => lhs >= *rhs,
                    }
                }
                Literal::String(rhs) => {
                    let lhs = stringify(&value);
                    match op {
                        CompareOp::Eq => &lhs == rhs,
                        CompareOp::Ne => &lhs != rhs,
                        _ => false,
                    }
                }
            }
        }
    }
}

fn render_nodes(nodes: &[Node], scope: &mut Scope<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Output(expr) => out.push_str(&eval_expr(expr, scope)),
            Node::If {
                condition,
                then_body,
                else_body,
            } => {
                if eval_condition(condition, scope) {
                    render_nodes(then_body, scope, out);
                } else {
                    render_nodes(else_body, scope, out);
                }
            }
            Node::For { var, path, body } => {
                let items = match scope.lookup(path) {
                    Some(Value::Array(items)) => items,
                    // Iterating anything else (or nothing) yields no output.
                    _ => Vec::new(),
                };
                for (index, item) in items.into_iter().enumerate() {
                    let mut frame = Map::new();
                    frame.insert(var.clone(), item);
                    let mut loop_info = Map::new();
                    loop_info.insert("index".to_string(), Value::from(index + 1));
                    frame.insert("loop".to_string(), Value::Object(loop_info));
                    scope.frames.push(frame);
                    render_nodes(body, scope, out);
                    scope.frames.pop();
                }
            }
        }
    }
}

/// Render parsed template nodes against a context map.
pub fn render(nodes: &[Node], context: &Map<String, Value>) -> String {
    let mut scope = Scope {
        root: context,
        frames: Vec::new(),
    };
    let mut out = String::new();
    render_nodes(nodes, &mut scope, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use serde_json::json;

    fn ctx(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn undefined_references_render_empty() {
        let nodes = parse("a{{missing}}b{{deep.missing.path}}c").unwrap();
        assert_eq!(render(&nodes, &ctx(json!({}))), "abc");
    }

    #[test]
    fn attribute_access_and_scalars() {
        let nodes = parse("{{project.name}} / {{year}}").unwrap();
        let context = ctx(json!({"project": {"name": "System X"}, "year": 2025}));
        assert_eq!(render(&nodes, &context), "System X / 2025");
    }

    #[test]
    fn currency_filter_formats_polish() {
        let nodes = parse("{{total|format_currency}}").unwrap();
        let context = ctx(json!({"total": 120000.0}));
        assert_eq!(render(&nodes, &context), "120 000,00 zł");
    }

    #[test]
    fn round_filter() {
        let nodes = parse("Nexus: {{nexus|round(4)}}").unwrap();
        assert_eq!(render(&nodes, &ctx(json!({"nexus": 1.0}))), "Nexus: 1.0000");
        assert_eq!(
            render(&nodes, &ctx(json!({"nexus": 0.65}))),
            "Nexus: 0.6500"
        );
    }

    #[test]
    fn for_loop_binds_item_and_index() {
        let nodes = parse("{% for w in workers %}{{loop.index}}. {{w.name}}\n{% endfor %}").unwrap();
        let context = ctx(json!({"workers": [{"name": "Jan"}, {"name": "Anna"}]}));
        assert_eq!(render(&nodes, &context), "1. Jan\n2. Anna\n");
    }

    #[test]
    fn for_over_missing_list_renders_nothing() {
        let nodes = parse("x{% for w in workers %}{{w.name}}{% endfor %}y").unwrap();
        assert_eq!(render(&nodes, &ctx(json!({}))), "xy");
    }

    #[test]
    fn if_else_truthiness() {
        let nodes = parse("{% if items %}są{% else %}brak{% endif %}").unwrap();
        assert_eq!(render(&nodes, &ctx(json!({"items": [1]}))), "są");
        assert_eq!(render(&nodes, &ctx(json!({"items": []}))), "brak");
        assert_eq!(render(&nodes, &ctx(json!({}))), "brak");
    }

    #[test]
    fn negated_and_compared_conditions() {
        let nodes = parse("{% if not items %}pusto{% endif %}").unwrap();
        assert_eq!(render(&nodes, &ctx(json!({}))), "pusto");

        let nodes = parse("{% if nexus >= 1 %}max{% endif %}").unwrap();
        assert_eq!(render(&nodes, &ctx(json!({"nexus": 1.0}))), "max");
        assert_eq!(render(&nodes, &ctx(json!({"nexus": 0.8}))), "");
    }

    #[test]
    fn loop_variable_shadows_root() {
        let nodes = parse("{% for x in xs %}{{x}}{% endfor %}{{x}}").unwrap();
        let context = ctx(json!({"x": "root", "xs": ["a", "b"]}));
        assert_eq!(render(&nodes, &context), "abroot");
    }
}
