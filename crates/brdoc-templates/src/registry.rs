//! Typed template definitions and the closed template registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use brdoc_core::enums::{DocumentCategory, TimeScope};

/// A data-source requirement declared by a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDataRequirement {
    pub source_name: String,
    pub required_params: Vec<String>,
    #[serde(default)]
    pub optional_params: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl TemplateDataRequirement {
    pub fn new(source_name: impl Into<String>, required_params: &[&str]) -> Self {
        Self {
            source_name: source_name.into(),
            required_params: required_params.iter().map(|s| s.to_string()).collect(),
            optional_params: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_optional(mut self, optional: &[&str]) -> Self {
        self.optional_params = optional.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A document template definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: DocumentCategory,
    pub time_scope: TimeScope,
    #[serde(default)]
    pub data_requirements: Vec<TemplateDataRequirement>,
    /// Template body in the substitution dialect.
    pub body: String,
    /// Pre-filled Markdown for UI previews without live data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_body: Option<String>,
    /// Prompt used when a language model drafts the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_prompt: Option<String>,
    pub output_format: String,
    pub version: String,
    /// When set, undefined references fail expansion instead of
    /// rendering empty. No built-in template enables this.
    #[serde(default)]
    pub strict: bool,
}

impl DocumentTemplate {
    /// Union of required parameters across all data requirements.
    pub fn required_params(&self) -> Vec<String> {
        let mut params: Vec<String> = Vec::new();
        for req in &self.data_requirements {
            for p in &req.required_params {
                if !params.contains(p) {
                    params.push(p.clone());
                }
            }
        }
        params
    }

    /// Listing entry without the (large) body.
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category,
            time_scope: self.time_scope,
            required_params: self.required_params(),
            output_format: self.output_format.clone(),
            version: self.version.clone(),
        }
    }
}

/// Template metadata exposed by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: DocumentCategory,
    pub time_scope: TimeScope,
    pub required_params: Vec<String>,
    pub output_format: String,
    pub version: String,
}

/// Closed registry of document templates, populated at startup.
pub struct TemplateRegistry {
    templates: Vec<DocumentTemplate>,
    by_id: HashMap<String, usize>,
}

impl TemplateRegistry {
    /// Empty registry, for tests substituting their own templates.
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in B+R / IP Box templates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for template in crate::builtin::all() {
            registry.register(template);
        }
        registry
    }

    /// Register a template; the last registration under an id wins.
    pub fn register(&mut self, template: DocumentTemplate) {
        match self.by_id.get(&template.id) {
            Some(&idx) => self.templates[idx] = template,
            None => {
                self.by_id.insert(template.id.clone(), self.templates.len());
                self.templates.push(template);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&DocumentTemplate> {
        self.by_id.get(id).map(|&idx| &self.templates[idx])
    }

    /// Summaries of all templates, in registration order.
    pub fn list(&self) -> Vec<TemplateSummary> {
        self.templates.iter().map(|t| t.summary()).collect()
    }

    pub fn by_category(&self, category: DocumentCategory) -> Vec<&DocumentTemplate> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn builtins_cover_the_required_set() {
        let registry = TemplateRegistry::with_builtins();
        for id in [
            "project_card",
            "timesheet_monthly",
            "expense_registry",
            "nexus_calculation",
            "br_annual_summary",
            "ip_box_procedure",
            "tax_interpretation_request",
            "br_contract",
        ] {
            assert!(registry.get(id).is_some(), "missing template {id}");
        }
    }

    #[test]
    fn every_builtin_body_parses() {
        let registry = TemplateRegistry::with_builtins();
        for summary in registry.list() {
            let template = registry.get(&summary.id).unwrap();
            parse(&template.body)
                .unwrap_or_else(|e| panic!("template {} failed to parse: {e}", template.id));
            if let Some(demo) = &template.demo_body {
                parse(demo).unwrap_or_else(|e| panic!("demo {} failed to parse: {e}", template.id));
            }
        }
    }

    #[test]
    fn every_builtin_requires_project_id() {
        let registry = TemplateRegistry::with_builtins();
        for summary in registry.list() {
            assert!(
                summary.required_params.contains(&"project_id".to_string()),
                "template {} lacks project_id",
                summary.id
            );
        }
    }

    #[test]
    fn no_builtin_is_strict() {
        let registry = TemplateRegistry::with_builtins();
        for summary in registry.list() {
            assert!(!registry.get(&summary.id).unwrap().strict);
        }
    }
}
