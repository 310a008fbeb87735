//! Shared context of the validation pipeline.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use brdoc_core::models::{ValidationIssue, ValidationResult};
use brdoc_core::ValidationSeverity;

/// Stages of the validation pipeline, in default execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStage {
    Structure,
    Legal,
    Financial,
    ModelReview,
    Final,
}

impl ValidationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStage::Structure => "structure",
            ValidationStage::Legal => "legal",
            ValidationStage::Financial => "financial",
            ValidationStage::ModelReview => "model_review",
            ValidationStage::Final => "final",
        }
    }
}

/// Context carried through the pipeline.
///
/// The issue list is monotonic: stages only append, and issues from an
/// earlier stage are visible to later ones. The context is owned by a
/// single task for its lifetime.
pub struct ValidationContext {
    pub document_type: String,
    pub content: String,
    pub project_id: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Source data available to validators (e.g. fetched payloads).
    pub data: Map<String, Value>,
    pub current_stage: ValidationStage,
    all_issues: Vec<ValidationIssue>,
    stage_results: HashMap<String, ValidationResult>,
    stage_order: Vec<String>,
}

impl ValidationContext {
    pub fn new(document_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            content: content.into(),
            project_id: None,
            year: None,
            month: None,
            data: Map::new(),
            current_stage: ValidationStage::Structure,
            all_issues: Vec::new(),
            stage_results: HashMap::new(),
            stage_order: Vec::new(),
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

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Append issues from a stage; the aggregated list never shrinks.
    pub fn add_issues(&mut self, issues: &[ValidationIssue]) {
        self.all_issues.extend_from_slice(issues);
    }

    pub fn set_stage_result(&mut self, result: ValidationResult) {
        let stage = result.stage.clone();
        if !self.stage_order.contains(&stage) {
            self.stage_order.push(stage.clone());
        }
        self.stage_results.insert(stage, result);
    }

    pub fn stage_result(&self, stage: &str) -> Option<&ValidationResult> {
        self.stage_results.get(stage)
    }

    /// Stage results in execution order.
    pub fn stage_results(&self) -> Vec<&ValidationResult> {
        self.stage_order
            .iter()
            .filter_map(|s| self.stage_results.get(s))
            .collect()
    }

    pub fn all_issues(&self) -> &[ValidationIssue] {
        &self.all_issues
    }

    pub fn error_count(&self) -> usize {
        self.all_issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.all_issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// A validation stage.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Stage this validator implements.
    fn stage(&self) -> ValidationStage;

    /// Inspect the context, append issues, and produce the stage result.
    ///
    /// Implementations must record their result on the context via
    /// `set_stage_result` and `add_issues`.
    async fn validate(&self, context: &mut ValidationContext) -> ValidationResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_are_monotonic() {
        let mut ctx = ValidationContext::new("project_card", "# T");
        ctx.add_issues(&[ValidationIssue::warning("A", "a")]);
        ctx.add_issues(&[ValidationIssue::error("B", "b")]);
        assert_eq!(ctx.all_issues().len(), 2);
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
    }

    #[test]
    fn stage_results_keep_execution_order() {
        let mut ctx = ValidationContext::new("project_card", "");
        ctx.set_stage_result(ValidationResult::from_issues("structure", vec![], 1.0));
        ctx.set_stage_result(ValidationResult::from_issues("legal", vec![], 0.9));
        let stages: Vec<&str> = ctx.stage_results().iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(stages, vec!["structure", "legal"]);
    }
}
