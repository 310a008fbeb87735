//! The document generator: template resolution, concurrent fetches,
//! model drafts with a guaranteed deterministic fallback, and variable
//! pre-tracking.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use brdoc_core::enums::DocumentCategory;
use brdoc_core::error::{BrError, BrResult};
use brdoc_core::format::format_pln;
use brdoc_llm::{FallbackChain, LlmRequest};
use brdoc_sources::{
    DataSourceRegistry, DataSourceResult, FetchConfig, FetchParams, TrackedVariable,
    VariableTracker,
};
use brdoc_templates::{expand, DocumentTemplate, TemplateRegistry};
use rust_decimal::prelude::*;

use crate::context::build_context;
use crate::refine::RefinementEntry;

/// Minimum non-whitespace characters for an accepted model draft.
const MODEL_MIN_CHARS: usize = 100;

/// A generated document with its tracked variables and refinement log.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub markdown: String,
    pub refinement_log: Vec<RefinementEntry>,
    pub tracked: Vec<TrackedVariable>,
    /// Whether the model path produced the accepted draft.
    pub model_generated: bool,
}

/// Well-known context scalars with a (source, path) origin, eligible
/// for pre-tracking.
struct TrackedScalar {
    context_path: &'static [&'static str],
    display_name: &'static str,
    source: &'static str,
    path: &'static str,
    format: ScalarFormat,
}

enum ScalarFormat {
    Currency,
    Round4,
    Plain,
}

const TRACKED_SCALARS: [TrackedScalar; 3] = [
    TrackedScalar {
        context_path: &["total_gross"],
        display_name: "total_gross",
        source: "expenses_summary",
        path: "total_gross",
        format: ScalarFormat::Currency,
    },
    TrackedScalar {
        context_path: &["total_hours"],
        display_name: "total_hours",
        source: "timesheet_summary",
        path: "total_hours",
        format: ScalarFormat::Plain,
    },
    TrackedScalar {
        context_path: &["nexus", "nexus"],
        display_name: "nexus",
        source: "nexus_calculation",
        path: "nexus",
        format: ScalarFormat::Round4,
    },
];

/// Template-driven document generator.
///
/// Registries are passed in explicitly so tests can substitute their
/// own; nothing here is process-global.
pub struct DocumentGenerator {
    templates: Arc<TemplateRegistry>,
    sources: Arc<DataSourceRegistry>,
    chain: Arc<FallbackChain>,
    base_url: String,
}

impl DocumentGenerator {
    pub fn new(
        templates: Arc<TemplateRegistry>,
        sources: Arc<DataSourceRegistry>,
        chain: Arc<FallbackChain>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            sources,
            chain,
            base_url: base_url.into(),
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn sources(&self) -> &DataSourceRegistry {
        &self.sources
    }

    /// Schedule the template's declared fetches concurrently.
    pub async fn fetch_for_template(
        &self,
        template: &DocumentTemplate,
        params: &FetchParams,
    ) -> Vec<(String, DataSourceResult)> {
        let configs: Vec<FetchConfig> = template
            .data_requirements
            .iter()
            .map(|req| {
                let mut fetch_params = FetchParams::new();
                for name in req.required_params.iter().chain(&req.optional_params) {
                    if let Some(value) = params.get(name) {
                        fetch_params.insert(name.clone(), value.clone());
                    }
                }
                FetchConfig::new(&req.source_name, fetch_params)
            })
            .collect();
        self.sources.fetch_multiple(&configs).await
    }

    /// Resolve the substitution context a template would be expanded
    /// against; used by the preview endpoint.
    pub async fn preview_context(
        &self,
        template_id: &str,
        params: &FetchParams,
        extra: &Map<String, Value>,
    ) -> BrResult<Map<String, Value>> {
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| BrError::not_found(format!("Nieznany szablon: {template_id}")))?;
        let fetched = self.fetch_for_template(template, params).await;
        Ok(build_context(&fetched, &params_as_map(params), extra))
    }

    /// Generate a document.
    ///
    /// Template expansion is guaranteed to produce output for a
    /// well-formed project regardless of model availability; the model
    /// path is attempted first when requested and its draft is accepted
    /// only with at least one `#` heading and 100 non-whitespace chars.
    pub async fn generate(
        &self,
        template_id: &str,
        params: &FetchParams,
        extra: &Map<String, Value>,
        use_model: bool,
    ) -> BrResult<GeneratedDocument> {
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| BrError::not_found(format!("Nieznany szablon: {template_id}")))?;

        let fetched = self.fetch_for_template(template, params).await;
        let context = build_context(&fetched, &params_as_map(params), extra);

        let mut model_generated = false;
        let mut markdown = if use_model && self.chain.is_configured() {
            match self.try_model_draft(template, &context).await {
                Some(draft) => {
                    model_generated = true;
                    draft
                }
                None => expand(&template.body, &context)?,
            }
        } else {
            expand(&template.body, &context)?
        };

        // Pre-tracking pass: annotate well-known scalars and collect
        // their verification footnotes.
        let project_id = params
            .get("project_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let mut tracker = VariableTracker::new(self.base_url.clone(), project_id);
        for scalar in &TRACKED_SCALARS {
            let mut value: Option<&Value> = context.get(scalar.context_path[0]);
            for part in &scalar.context_path[1..] {
                value = value.and_then(|v| v.get(part));
            }
            let Some(value) = value else { continue };

            let formatted = match scalar.format {
                ScalarFormat::Currency => value
                    .as_f64()
                    .and_then(Decimal::from_f64)
                    .map(format_pln),
                ScalarFormat::Round4 => value.as_f64().map(|n| format!("{n:.4}")),
                ScalarFormat::Plain => Some(match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }),
            };
            let Some(formatted) = formatted else { continue };

            let reference = tracker.track(
                scalar.display_name,
                value.clone(),
                scalar.source,
                scalar.path,
                None,
            );
            markdown = annotate_first_occurrence(&markdown, &formatted, &reference);
        }

        markdown.push_str(&tracker.footnotes_section());

        info!(
            template = template_id,
            model_generated,
            tracked = tracker.count(),
            "document generated"
        );

        Ok(GeneratedDocument {
            markdown,
            refinement_log: Vec::new(),
            tracked: tracker.variables().to_vec(),
            model_generated,
        })
    }

    async fn try_model_draft(
        &self,
        template: &DocumentTemplate,
        context: &Map<String, Value>,
    ) -> Option<String> {
        let model_prompt = template.model_prompt.as_deref()?;
        let context_json = serde_json::to_string_pretty(context).ok()?;
        let prompt = format!("{model_prompt}\n\nDANE ŹRÓDŁOWE (JSON):\n{context_json}");

        let max_tokens = match template.category {
            DocumentCategory::Financial | DocumentCategory::Timesheet => 2000,
            _ => 8000,
        };
        let request = LlmRequest::new(prompt)
            .with_system(brdoc_llm::prompts::BR_EXPENSE_DOC_PROMPT)
            .with_temperature(0.3)
            .with_max_tokens(max_tokens);

        let response = self.chain.generate(&request).await;
        if !response.is_success() {
            warn!(template = %template.id, "model draft unavailable, using template");
            return None;
        }

        let draft = response.content;
        let has_heading = draft.lines().any(|l| l.trim_start().starts_with('#'));
        let significant = draft.chars().filter(|c| !c.is_whitespace()).count();
        if has_heading && significant >= MODEL_MIN_CHARS {
            Some(draft)
        } else {
            warn!(template = %template.id, "model draft rejected, using template");
            None
        }
    }
}

fn params_as_map(params: &FetchParams) -> Map<String, Value> {
    params.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Annotate the first plain-text occurrence of `value` with a bold
/// marker and the footnote reference. An already-bold occurrence only
/// receives the reference.
pub fn annotate_first_occurrence(markdown: &str, value: &str, reference: &str) -> String {
    if value.is_empty() {
        return markdown.to_string();
    }
    let bold = format!("**{value}**");
    if let Some(idx) = markdown.find(&bold) {
        let insert_at = idx + bold.len();
        // Skip when a reference is already attached.
        if markdown[insert_at..].starts_with("[^") {
            return markdown.to_string();
        }
        let mut out = markdown.to_string();
        out.insert_str(insert_at, reference);
        return out;
    }
    if let Some(idx) = markdown.find(value) {
        let mut out = String::with_capacity(markdown.len() + bold.len() + reference.len());
        out.push_str(&markdown[..idx]);
        out.push_str(&bold);
        out.push_str(reference);
        out.push_str(&markdown[idx + value.len()..]);
        return out;
    }
    markdown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generator() -> DocumentGenerator {
        DocumentGenerator::new(
            Arc::new(TemplateRegistry::with_builtins()),
            Arc::new(DataSourceRegistry::new()),
            Arc::new(FallbackChain::empty()),
            "http://localhost:81",
        )
    }

    fn params() -> FetchParams {
        let mut params = FetchParams::new();
        params.insert("project_id".to_string(), json!("p-1"));
        params.insert("year".to_string(), json!(2025));
        params
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let result = generator()
            .generate("no_such_template", &params(), &Map::new(), false)
            .await;
        assert!(matches!(result, Err(BrError::NotFound(_))));
    }

    #[tokio::test]
    async fn template_fallback_always_produces_output() {
        let mut extra = Map::new();
        extra.insert(
            "project".to_string(),
            json!({
                "name": "System pomiarowy",
                "code": "BR-2025-001",
                "fiscal_year": 2025,
                "company_name": "Softreck",
                "company_nip": "588-191-86-62",
                "start_date": "2025-01-01",
                "end_date": "2025-12-31",
                "status": "active",
                "description": "Opis prac badawczych.",
            }),
        );
        let doc = generator()
            .generate("project_card", &params(), &extra, false)
            .await
            .unwrap();
        assert!(doc.markdown.contains("# KARTA PROJEKTOWA"));
        assert!(doc.markdown.contains("System pomiarowy"));
        assert!(!doc.model_generated);
    }

    #[tokio::test]
    async fn model_request_with_unreachable_chain_equals_template_expansion() {
        // `use_model = true` with no reachable model must fall back to
        // the deterministic path byte for byte.
        let gen = generator();
        let with_model = gen
            .generate("ip_box_procedure", &params(), &Map::new(), true)
            .await
            .unwrap();
        let without_model = gen
            .generate("ip_box_procedure", &params(), &Map::new(), false)
            .await
            .unwrap();
        assert_eq!(with_model.markdown, without_model.markdown);
        assert!(!with_model.model_generated);
    }

    #[tokio::test]
    async fn tracked_scalars_are_annotated_and_footnoted() {
        let mut extra = Map::new();
        extra.insert("total_gross".to_string(), json!(17220.0));
        let doc = generator()
            .generate("expense_registry", &params(), &extra, false)
            .await
            .unwrap();
        // 17 220,00 zł appears in the summary table; first occurrence
        // gets the inline annotation, the definition lands at the end.
        assert!(doc.markdown.contains("**17 220,00 zł**[^1]"));
        assert!(doc.markdown.contains("## Przypisy źródłowe"));
        assert!(doc.markdown.contains(
            "[^1]: Źródło: [total_gross](http://localhost:81/api/project/p-1/variable/expenses_summary/total_gross)"
        ));
        let reference_pos = doc.markdown.find("[^1]").unwrap();
        let definition_pos = doc.markdown.find("[^1]:").unwrap();
        assert!(reference_pos < definition_pos);
    }

    #[test]
    fn annotation_bolds_first_plain_occurrence_only() {
        let out = annotate_first_occurrence("a 100,00 zł b 100,00 zł", "100,00 zł", "[^1]");
        assert_eq!(out, "a **100,00 zł**[^1] b 100,00 zł");
    }

    #[test]
    fn annotation_reuses_existing_bold() {
        let out = annotate_first_occurrence("Suma: **3 000,00 zł**", "3 000,00 zł", "[^2]");
        assert_eq!(out, "Suma: **3 000,00 zł**[^2]");
    }

    #[test]
    fn annotation_skips_missing_values() {
        let out = annotate_first_occurrence("bez kwot", "1,00 zł", "[^1]");
        assert_eq!(out, "bez kwot");
    }
}
