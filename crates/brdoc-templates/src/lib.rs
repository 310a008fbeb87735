//! # brdoc-templates
//!
//! Typed document templates and the substitution dialect used to expand
//! them deterministically:
//! - a small expression AST (scalar/attribute references, pipe filters,
//!   `if`/`for` blocks with `loop.index`)
//! - a parser and an evaluator where undefined references render empty
//! - the closed registry of built-in B+R / IP Box templates with their
//!   declared data requirements and demo bodies

pub mod ast;
pub mod builtin;
pub mod parser;
pub mod registry;
pub mod render;

pub use ast::*;
pub use parser::{parse, ParseError};
pub use registry::*;
pub use render::render;

use serde_json::{Map, Value};

use brdoc_core::error::{BrError, BrResult};

/// Parse and render a template body in one step.
pub fn expand(body: &str, context: &Map<String, Value>) -> BrResult<String> {
    let nodes = parse(body).map_err(|e| BrError::template(e.to_string()))?;
    Ok(render(&nodes, context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expand_combines_parse_and_render() {
        let context = json!({"name": "Projekt X"});
        let out = expand("Nazwa: {{name}}", context.as_object().unwrap()).unwrap();
        assert_eq!(out, "Nazwa: Projekt X");
    }

    #[test]
    fn expand_reports_parse_errors() {
        let context = Map::new();
        assert!(expand("{% if x %}", &context).is_err());
    }
}
