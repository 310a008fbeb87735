//! Multi-stage validation pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use brdoc_core::models::{ValidationIssue, ValidationResult};

use crate::context::{ValidationContext, Validator};
use crate::financial::FinancialValidator;
use crate::legal::LegalValidator;
use crate::structure::StructureValidator;

/// Aggregated result of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Conjunction of stage `valid`s.
    pub valid: bool,
    /// Arithmetic mean over stages actually executed.
    pub overall_score: f64,
    pub error_count: usize,
    pub warning_count: usize,
    /// Stage results in execution order.
    pub stages: Vec<ValidationResult>,
    pub all_issues: Vec<ValidationIssue>,
    pub document_type: String,
    pub content_length: usize,
}

impl PipelineReport {
    pub fn stage(&self, name: &str) -> Option<&ValidationResult> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

/// Input of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ValidationRequest {
    pub document_type: String,
    pub content: String,
    pub project_id: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub data: Map<String, Value>,
}

impl ValidationRequest {
    pub fn new(document_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }
}

/// Ordered validator pipeline.
///
/// Stages run strictly in registered order over a shared context; the
/// pipeline never short-circuits on warnings and continues on errors
/// unless `stop_on_error` is set.
pub struct ValidationPipeline {
    validators: Vec<Box<dyn Validator>>,
    stop_on_error: bool,
}

impl ValidationPipeline {
    pub fn new(validators: Vec<Box<dyn Validator>>) -> Self {
        Self {
            validators,
            stop_on_error: false,
        }
    }

    /// Default order: structure → legal → financial.
    ///
    /// The optional model-review stage is appended by callers holding a
    /// configured chain.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(StructureValidator),
            Box::new(LegalValidator),
            Box::new(FinancialValidator),
        ])
    }

    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub fn add_validator(&mut self, validator: Box<dyn Validator>) {
        self.validators.push(validator);
    }

    /// Run all stages and aggregate.
    pub async fn validate(&self, request: ValidationRequest) -> PipelineReport {
        let mut context = ValidationContext::new(&request.document_type, &request.content)
            .with_data(request.data);
        context.project_id = request.project_id;
        context.year = request.year;
        context.month = request.month;

        info!(
            document_type = %request.document_type,
            content_length = request.content.len(),
            validators = self.validators.len(),
            "validation started"
        );

        for validator in &self.validators {
            context.current_stage = validator.stage();
            let result = validator.validate(&mut context).await;
            info!(
                stage = result.stage.as_str(),
                valid = result.valid,
                issues = result.issues.len(),
                score = result.score,
                "validation stage complete"
            );
            if self.stop_on_error && !result.valid {
                warn!(stage = result.stage.as_str(), "validation stopped on error");
                break;
            }
        }

        let stages: Vec<ValidationResult> =
            context.stage_results().into_iter().cloned().collect();
        let valid = stages.iter().all(|s| s.valid);
        let overall_score =
            stages.iter().map(|s| s.score).sum::<f64>() / stages.len().max(1) as f64;

        PipelineReport {
            valid,
            overall_score,
            error_count: context.error_count(),
            warning_count: context.warning_count(),
            all_issues: context.all_issues().to_vec(),
            stages,
            document_type: request.document_type,
            content_length: request.content.chars().count(),
        }
    }

    /// Quick boolean check.
    pub async fn validate_quick(
        &self,
        content: impl Into<String>,
        document_type: impl Into<String>,
    ) -> bool {
        self.validate(ValidationRequest::new(document_type, content))
            .await
            .valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_project_card() -> String {
        format!(
            "# KARTA PROJEKTOWA BADAWCZO-ROZWOJOWA\n\n\
             ## 1. IDENTYFIKACJA PROJEKTU\n\n\
             | Pole | Wartość |\n|------|---------|\n\
             | Nazwa projektu | System analizy danych pomiarowych |\n\
             | NIP | 588-191-86-62 |\n| Rok | 2025 |\n\n\
             ## 2. OPIS DZIAŁALNOŚCI B+R\n\n\
             Prace badawczo-rozwojowe zgodnie z art. 18d CIT, kategoria: materiały i surowce.\n\
             Wydatki kwalifikowane z uzasadnieniem.\n\n\
             ## 3. ZESPÓŁ BADAWCZY\n\n| Pracownik | Godziny |\n|---|---|\n| Jan Kowalski | 120 |\n\n\
             ## 4. KOSZTY PROJEKTOWE\n\n\
             | Kategoria | Kwota |\n|---|---|\n| Materiały | 1 000,00 zł |\n| Sprzęt | 2 000,00 zł |\n\
             Suma: 3 000,00 zł\n"
        )
    }

    #[tokio::test]
    async fn happy_path_scores_high() {
        let pipeline = ValidationPipeline::with_defaults();
        let report = pipeline
            .validate(
                ValidationRequest::new("project_card", valid_project_card()).with_year(2025),
            )
            .await;
        assert!(report.valid, "issues: {:?}", report.all_issues);
        assert!(report.overall_score >= 0.8, "score: {}", report.overall_score);
        assert_eq!(report.stages.len(), 3);
    }

    #[tokio::test]
    async fn invalid_nip_fails_legal_stage_only() {
        let content = valid_project_card().replace("588-191-86-62", "123-456-78-90");
        let pipeline = ValidationPipeline::with_defaults();
        let report = pipeline
            .validate(ValidationRequest::new("project_card", content).with_year(2025))
            .await;
        assert!(!report.valid);
        assert!(report.stage("structure").unwrap().valid);
        assert!(!report.stage("legal").unwrap().valid);
        assert!(report
            .all_issues
            .iter()
            .any(|i| i.code == "INVALID_NIP"));
    }

    #[tokio::test]
    async fn overall_score_is_mean_of_executed_stages() {
        let pipeline = ValidationPipeline::with_defaults();
        let report = pipeline
            .validate(ValidationRequest::new("project_card", valid_project_card()))
            .await;
        let mean: f64 =
            report.stages.iter().map(|s| s.score).sum::<f64>() / report.stages.len() as f64;
        assert!((report.overall_score - mean).abs() < 1e-9);
    }

    #[tokio::test]
    async fn stop_on_error_halts_after_failing_stage() {
        let pipeline = ValidationPipeline::with_defaults().stop_on_error(true);
        // Too short → structure fails, later stages never run.
        let report = pipeline
            .validate(ValidationRequest::new("project_card", "# X"))
            .await;
        assert_eq!(report.stages.len(), 1);
        assert_eq!(report.stages[0].stage, "structure");
    }

    #[tokio::test]
    async fn stage_issue_multiset_matches_individual_runs() {
        // Running the pipeline equals running stages individually and
        // concatenating their issues.
        let content = valid_project_card().replace("588-191-86-62", "123-456-78-90");
        let pipeline = ValidationPipeline::with_defaults();
        let report = pipeline
            .validate(ValidationRequest::new("project_card", content.clone()).with_year(2025))
            .await;

        let mut individual: Vec<String> = Vec::new();
        for validator in [
            Box::new(StructureValidator) as Box<dyn Validator>,
            Box::new(LegalValidator),
            Box::new(FinancialValidator),
        ] {
            let mut ctx =
                ValidationContext::new("project_card", content.clone()).with_year(2025);
            let result = validator.validate(&mut ctx).await;
            individual.extend(result.issues.iter().map(|i| i.code.clone()));
        }

        let mut combined: Vec<String> =
            report.all_issues.iter().map(|i| i.code.clone()).collect();
        individual.sort();
        combined.sort();
        assert_eq!(combined, individual);
    }

    #[tokio::test]
    async fn empty_pipeline_does_not_divide_by_zero() {
        let pipeline = ValidationPipeline::new(vec![]);
        let report = pipeline
            .validate(ValidationRequest::new("project_card", "x"))
            .await;
        assert_eq!(report.stages.len(), 0);
        assert_eq!(report.overall_score, 0.0);
        assert!(report.valid);
    }
}
