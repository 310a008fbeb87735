//! Top-level generate → validate → refine → render → commit controller.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use brdoc_core::error::{BrError, BrResult};
use brdoc_core::models::{
    DailyTimeEntry, ExpenseRecord, ProjectInput, RevenueRecord, ValidationResult,
};
use brdoc_core::summary;
use brdoc_core::ValidationIssue;
use brdoc_generators::{refine, DocumentGenerator, RefinementEntry};
use brdoc_llm::FallbackChain;
use brdoc_render::{PdfOptions, Renderer};
use brdoc_sources::{DataSourceRegistry, FetchParams};
use brdoc_store::VersionStore;
use brdoc_templates::TemplateRegistry;
use brdoc_validators::{ValidationPipeline, ValidationRequest};
use rust_decimal::prelude::*;

use crate::config::BrConfig;

/// Score at which a draft is accepted without refinement.
const PASS_SCORE: f64 = 0.8;
/// Score floor for partial success with warnings only.
const WARNING_SCORE: f64 = 0.6;

/// Outcome status of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Passed,
    Warning,
    Failed,
}

/// Options of one orchestration request.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub template_id: String,
    pub project_id: String,
    pub use_llm: bool,
    pub render_pdf: bool,
    pub max_iterations: u32,
    pub style: String,
    /// Invoice segment for per-expense artifact names.
    pub invoice_segment: Option<String>,
}

impl GenerationOptions {
    pub fn new(template_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            project_id: project_id.into(),
            use_llm: false,
            render_pdf: false,
            max_iterations: 3,
            style: "br_document".to_string(),
            invoice_segment: None,
        }
    }
}

/// Structured result of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub status: GenerationStatus,
    pub score: f64,
    pub iterations: u32,
    pub markdown_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<PathBuf>,
    pub version: String,
    pub stages: Vec<ValidationResult>,
    pub issues: Vec<ValidationIssue>,
    pub refinement_log: Vec<RefinementEntry>,
    pub content: String,
}

/// Read-model rows of a project, provided by the caller's persistence
/// layer.
#[derive(Debug, Clone, Default)]
pub struct ProjectData {
    pub expenses: Vec<ExpenseRecord>,
    pub time_entries: Vec<DailyTimeEntry>,
    pub revenues: Vec<RevenueRecord>,
}

/// Orchestrator owning the registries and collaborators.
///
/// All built-ins are registered during construction; tests substitute
/// alternative registries through `with_parts`.
pub struct Orchestrator {
    generator: DocumentGenerator,
    chain: Arc<FallbackChain>,
    store: VersionStore,
    renderer: Renderer,
    config: BrConfig,
}

impl Orchestrator {
    pub fn new(config: BrConfig) -> Self {
        let chain = Arc::new(FallbackChain::new(config.models.clone()));
        // The SQL pool is attached by the server layer; a registry
        // without one degrades to contained fetch failures.
        let sources = Arc::new(DataSourceRegistry::with_defaults(None));
        let templates = Arc::new(TemplateRegistry::with_builtins());
        Self::with_parts(config, templates, sources, chain)
    }

    pub fn with_parts(
        config: BrConfig,
        templates: Arc<TemplateRegistry>,
        sources: Arc<DataSourceRegistry>,
        chain: Arc<FallbackChain>,
    ) -> Self {
        let generator = DocumentGenerator::new(
            templates,
            sources,
            Arc::clone(&chain),
            config.base_url.clone(),
        );
        let store = VersionStore::new(config.data_root.clone());
        Self {
            generator,
            chain,
            store,
            renderer: Renderer::default(),
            config,
        }
    }

    pub fn generator(&self) -> &DocumentGenerator {
        &self.generator
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    fn artifact_name(&self, options: &GenerationOptions) -> String {
        let date = Utc::now().format("%Y%m%d");
        match &options.invoice_segment {
            Some(segment) => {
                let clean = segment.replace(['/', '\\'], "-");
                let short: String = options.project_id.chars().take(8).collect();
                format!("BR_DOC_{date}_{clean}_{short}.md")
            }
            None => format!("BR_SUMMARY_{date}.md"),
        }
    }

    fn status_for(score: f64, error_count: usize) -> GenerationStatus {
        if error_count > 0 {
            GenerationStatus::Failed
        } else if score >= PASS_SCORE {
            GenerationStatus::Passed
        } else if score >= WARNING_SCORE {
            GenerationStatus::Warning
        } else {
            GenerationStatus::Failed
        }
    }

    /// Generate, validate, refine, render, and commit documentation for
    /// a project.
    pub async fn generate_documentation(
        &self,
        project: &ProjectInput,
        data: &ProjectData,
        options: &GenerationOptions,
    ) -> BrResult<GenerationReport> {
        // The single unconditional abort: invariant violations are
        // rejected before any fetch happens.
        project.validate()?;

        // Aggregate the read model for the template context.
        let totals = summary::totals(&data.expenses);
        let mut extra = Map::new();
        extra.insert("project".to_string(), project_context(project));
        extra.insert(
            "total_costs".to_string(),
            Value::from(totals.gross.to_f64().unwrap_or(0.0)),
        );
        if !data.expenses.is_empty() {
            extra.insert(
                "total_gross".to_string(),
                Value::from(totals.gross.to_f64().unwrap_or(0.0)),
            );
            extra.insert(
                "total_qualified".to_string(),
                Value::from(totals.qualified_gross.to_f64().unwrap_or(0.0)),
            );
            extra.insert(
                "total_deduction".to_string(),
                Value::from(totals.total_deduction.to_f64().unwrap_or(0.0)),
            );
            extra.insert("expenses".to_string(), to_value_array(&data.expenses));
            extra.insert(
                "expense_count".to_string(),
                Value::from(data.expenses.len()),
            );
            let by_category: Vec<Value> = summary::by_category(&data.expenses)
                .into_iter()
                .map(|(category, breakdown)| {
                    let mut row = Map::new();
                    row.insert("category".to_string(), Value::from(category.tag()));
                    row.insert(
                        "category_name".to_string(),
                        Value::from(category.display_name_pl()),
                    );
                    row.insert("count".to_string(), Value::from(breakdown.count));
                    row.insert(
                        "total_gross".to_string(),
                        Value::from(breakdown.gross.to_f64().unwrap_or(0.0)),
                    );
                    row.insert(
                        "qualified_amount".to_string(),
                        Value::from(breakdown.gross.to_f64().unwrap_or(0.0)),
                    );
                    Value::Object(row)
                })
                .collect();
            extra.insert(
                "expenses_by_category".to_string(),
                Value::Array(by_category),
            );
        }
        if !data.revenues.is_empty() {
            extra.insert("revenues".to_string(), to_value_array(&data.revenues));
            let revenue_totals = summary::revenue_totals(&data.revenues);
            extra.insert(
                "total_revenue".to_string(),
                Value::from(revenue_totals.gross.to_f64().unwrap_or(0.0)),
            );
        }
        if !data.time_entries.is_empty() {
            let monthly = summary::monthly_breakdown(&data.time_entries);
            let total_hours: f64 = monthly.iter().map(|m| m.hours).sum();
            extra.insert("total_hours".to_string(), Value::from(total_hours));
        }

        let mut params = FetchParams::new();
        params.insert("project_id".to_string(), Value::from(options.project_id.clone()));
        params.insert("year".to_string(), Value::from(project.fiscal_year));

        // Draft.
        let generated = self
            .generator
            .generate(&options.template_id, &params, &extra, options.use_llm)
            .await?;
        let mut content = generated.markdown;
        let mut refinement_log = generated.refinement_log;

        // Validate, refining while the score is below threshold. The
        // model-review stage joins only when a chain is reachable.
        let mut pipeline = ValidationPipeline::with_defaults();
        if options.use_llm && self.chain.is_configured() {
            pipeline.add_validator(Box::new(brdoc_validators::ModelReviewValidator::new(
                Arc::clone(&self.chain),
            )));
        }
        let mut report = pipeline
            .validate(
                ValidationRequest::new(&options.template_id, content.clone())
                    .with_project(&options.project_id)
                    .with_year(project.fiscal_year),
            )
            .await;

        let mut iterations = 0u32;
        while report.overall_score < PASS_SCORE
            && iterations < options.max_iterations
            && self.chain.is_configured()
        {
            iterations += 1;
            info!(
                iteration = iterations,
                score = report.overall_score,
                "score below threshold, refining"
            );
            let outcome = refine(&self.chain, &content, &report.all_issues, 1).await;
            let applied = outcome
                .log
                .iter()
                .any(|e| e.status == brdoc_generators::RefinementStatus::Success);
            refinement_log.extend(outcome.log);
            if !applied {
                warn!(iteration = iterations, "refinement made no progress");
                break;
            }
            content = outcome.content;
            report = pipeline
                .validate(
                    ValidationRequest::new(&options.template_id, content.clone())
                        .with_project(&options.project_id)
                        .with_year(project.fiscal_year),
                )
                .await;
        }

        // Commit the Markdown; the draft is retained even when failed.
        let artifact = self
            .store
            .root()
            .join(&options.project_id)
            .join(self.artifact_name(options));
        let version = self
            .store
            .commit_file(&artifact, content.as_bytes(), &commit_message(project, options))
            .await?;

        // Optional PDF as a sibling artifact.
        let pdf_path = if options.render_pdf {
            let pdf_options = PdfOptions {
                title: project.name.clone(),
                font_path: self.config.pdf_font_path.clone(),
            };
            let bytes = self
                .renderer
                .to_pdf(&content, &options.style, &pdf_options)?;
            let pdf_artifact = artifact.with_extension("pdf");
            self.store
                .commit_file(&pdf_artifact, &bytes, &commit_message(project, options))
                .await?;
            Some(pdf_artifact)
        } else {
            None
        };

        let status = Self::status_for(report.overall_score, report.error_count);
        info!(
            ?status,
            score = report.overall_score,
            iterations,
            version = %version,
            "documentation generated"
        );

        Ok(GenerationReport {
            status,
            score: report.overall_score,
            iterations,
            markdown_path: artifact,
            pdf_path,
            version,
            stages: report.stages,
            issues: report.all_issues,
            refinement_log,
            content,
        })
    }
}

impl Orchestrator {
    /// Generate, validate, and commit documentation for a single
    /// expense. The deterministic builder prefills the Polish invoice
    /// table and the OCR excerpt; a model draft is attempted first when
    /// requested.
    pub async fn generate_expense_documentation(
        &self,
        project: &ProjectInput,
        expense: &brdoc_core::models::ExpenseRecord,
        document: Option<&brdoc_core::models::ExtractedInvoice>,
        options: &GenerationOptions,
    ) -> BrResult<GenerationReport> {
        project.validate()?;

        let mut content = if options.use_llm && self.chain.is_configured() {
            let prompt = brdoc_generators::build_expense_prompt(expense, project, document);
            let request = brdoc_llm::LlmRequest::new(prompt)
                .with_system(brdoc_llm::prompts::BR_EXPENSE_DOC_PROMPT)
                .with_temperature(0.3)
                .with_max_tokens(2000);
            let response = self.chain.generate(&request).await;
            let draft = response.content;
            let acceptable = draft.lines().any(|l| l.trim_start().starts_with('#'))
                && draft.chars().filter(|c| !c.is_whitespace()).count() >= 100;
            if response.error.is_none() && acceptable {
                draft
            } else {
                brdoc_generators::expense_document(expense, project, document)
            }
        } else {
            brdoc_generators::expense_document(expense, project, document)
        };

        // Invoice-bound variables carry their own verification URLs.
        let mut tracker = brdoc_sources::VariableTracker::new(
            self.config.base_url.clone(),
            Some(options.project_id.clone()),
        );
        let gross = expense.gross_amount.to_f64().unwrap_or(0.0);
        let reference = tracker.track_invoice(
            "gross_amount",
            serde_json::Value::from(gross),
            &expense.id,
        );
        let formatted = format!("{:.2}", expense.gross_amount);
        content = brdoc_generators::annotate_first_occurrence(&content, &formatted, &reference);
        tracker.track_invoice(
            "vendor_nip",
            serde_json::Value::from(expense.vendor_nip.clone()),
            &expense.id,
        );
        content.push_str(&tracker.footnotes_section());

        let pipeline = ValidationPipeline::with_defaults();
        let report = pipeline
            .validate(
                ValidationRequest::new("expense_doc", content.clone())
                    .with_project(&options.project_id)
                    .with_year(project.fiscal_year),
            )
            .await;

        let mut expense_options = options.clone();
        expense_options.invoice_segment = Some(expense.invoice_number.clone());
        let artifact = self
            .store
            .root()
            .join(&options.project_id)
            .join(self.artifact_name(&expense_options));
        let version = self
            .store
            .commit_file(
                &artifact,
                content.as_bytes(),
                &commit_message(project, &expense_options),
            )
            .await?;

        Ok(GenerationReport {
            status: Self::status_for(report.overall_score, report.error_count),
            score: report.overall_score,
            iterations: 0,
            markdown_path: artifact,
            pdf_path: None,
            version,
            stages: report.stages,
            issues: report.all_issues,
            refinement_log: Vec::new(),
            content,
        })
    }

    /// Generate and commit the comprehensive project summary from the
    /// deterministic builder.
    pub async fn generate_project_summary(
        &self,
        project: &ProjectInput,
        data: &ProjectData,
        options: &GenerationOptions,
    ) -> BrResult<GenerationReport> {
        project.validate()?;

        let content = brdoc_generators::summary_document(
            project,
            &data.expenses,
            &data.time_entries,
            &data.revenues,
        );

        let pipeline = ValidationPipeline::with_defaults();
        let report = pipeline
            .validate(
                ValidationRequest::new("project_summary", content.clone())
                    .with_project(&options.project_id)
                    .with_year(project.fiscal_year),
            )
            .await;

        let mut summary_options = options.clone();
        summary_options.invoice_segment = None;
        let artifact = self
            .store
            .root()
            .join(&options.project_id)
            .join(self.artifact_name(&summary_options));
        let version = self
            .store
            .commit_file(
                &artifact,
                content.as_bytes(),
                &commit_message(project, &summary_options),
            )
            .await?;

        Ok(GenerationReport {
            status: Self::status_for(report.overall_score, report.error_count),
            score: report.overall_score,
            iterations: 0,
            markdown_path: artifact,
            pdf_path: None,
            version,
            stages: report.stages,
            issues: report.all_issues,
            refinement_log: Vec::new(),
            content,
        })
    }
}

fn commit_message(project: &ProjectInput, options: &GenerationOptions) -> String {
    match &options.invoice_segment {
        Some(segment) => format!("Expense doc: {segment} ({})", options.project_id),
        None => format!("Summary: {} ({})", project.name, options.project_id),
    }
}

fn project_context(project: &ProjectInput) -> Value {
    let mut map = Map::new();
    map.insert("name".to_string(), Value::from(project.name.clone()));
    map.insert("code".to_string(), Value::from(project.code.clone()));
    map.insert("fiscal_year".to_string(), Value::from(project.fiscal_year));
    map.insert(
        "company_name".to_string(),
        Value::from(project.company_name.clone()),
    );
    map.insert(
        "company_nip".to_string(),
        Value::from(brdoc_core::format::format_nip(&project.company_nip)),
    );
    map.insert(
        "start_date".to_string(),
        Value::from(project.start_date.format("%Y-%m-%d").to_string()),
    );
    map.insert(
        "end_date".to_string(),
        Value::from(project.end_date.format("%Y-%m-%d").to_string()),
    );
    map.insert("status".to_string(), Value::from("active"));
    map.insert(
        "description".to_string(),
        Value::from(project.description.clone()),
    );
    if let Some(problem) = &project.technical_problem {
        map.insert(
            "technical_problem".to_string(),
            Value::from(problem.description.clone()),
        );
    }
    if let Some(methodology) = &project.methodology {
        map.insert(
            "hypothesis".to_string(),
            Value::from(methodology.approach.clone()),
        );
    }
    Value::Object(map)
}

fn to_value_array<T: Serialize>(items: &[T]) -> Value {
    serde_json::to_value(items).unwrap_or(Value::Array(Vec::new()))
}
