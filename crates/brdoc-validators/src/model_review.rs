//! Optional model-review stage.
//!
//! Asks the fallback chain to score the document and list issues as
//! JSON. Transport failures make the stage a no-op; the stage can only
//! fail the document when the model explicitly returns an error-severity
//! issue.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use brdoc_core::models::{ValidationIssue, ValidationResult};
use brdoc_core::ValidationSeverity;
use brdoc_llm::{prompts, FallbackChain, LlmRequest};

use crate::context::{ValidationContext, ValidationStage, Validator};

#[derive(Debug, Deserialize)]
struct ReviewReply {
    #[serde(default = "default_score")]
    score: f64,
    #[serde(default)]
    issues: Vec<ReviewIssue>,
}

fn default_score() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct ReviewIssue {
    #[serde(default)]
    severity: String,
    message: String,
    #[serde(default)]
    suggestion: Option<String>,
}

/// Model-backed content review.
pub struct ModelReviewValidator {
    chain: Arc<FallbackChain>,
}

impl ModelReviewValidator {
    pub fn new(chain: Arc<FallbackChain>) -> Self {
        Self { chain }
    }

    /// Extract the JSON object from a reply that may wrap it in prose or
    /// a fenced code block.
    fn parse_reply(content: &str) -> Option<ReviewReply> {
        let start = content.find('{')?;
        let end = content.rfind('}')?;
        serde_json::from_str(&content[start..=end]).ok()
    }

    fn severity_from(text: &str) -> ValidationSeverity {
        match text {
            "error" => ValidationSeverity::Error,
            "warning" => ValidationSeverity::Warning,
            _ => ValidationSeverity::Info,
        }
    }
}

#[async_trait]
impl Validator for ModelReviewValidator {
    fn stage(&self) -> ValidationStage {
        ValidationStage::ModelReview
    }

    async fn validate(&self, context: &mut ValidationContext) -> ValidationResult {
        let stage = self.stage().as_str();

        let request = LlmRequest::new(prompts::model_review_prompt(&context.content))
            .with_temperature(0.0)
            .with_max_tokens(2000);
        let response = self.chain.generate(&request).await;

        if !response.is_success() {
            // Transport failure: a no-op stage with a perfect score.
            debug!(error = ?response.error, "model review unavailable, skipping");
            let result = ValidationResult::from_issues(stage, vec![], 1.0);
            context.set_stage_result(result.clone());
            return result;
        }

        let reply = match Self::parse_reply(&response.content) {
            Some(reply) => reply,
            None => {
                debug!("model review reply was not valid JSON, skipping");
                let result = ValidationResult::from_issues(stage, vec![], 1.0);
                context.set_stage_result(result.clone());
                return result;
            }
        };

        let issues: Vec<ValidationIssue> = reply
            .issues
            .into_iter()
            .map(|i| {
                let mut issue = ValidationIssue::new(
                    Self::severity_from(&i.severity),
                    "MODEL_REVIEW",
                    i.message,
                );
                if let Some(suggestion) = i.suggestion {
                    issue = issue.with_suggestion(suggestion);
                }
                issue
            })
            .collect();

        let result = ValidationResult::from_issues(stage, issues, reply.score.clamp(0.0, 1.0));
        context.add_issues(&result.issues);
        context.set_stage_result(result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_parsing_tolerates_wrapping() {
        let wrapped = "Oto ocena:\n```json\n{\"score\": 0.8, \"issues\": [\
                       {\"severity\": \"warning\", \"message\": \"m\"}]}\n```";
        let reply = ModelReviewValidator::parse_reply(wrapped).unwrap();
        assert_eq!(reply.score, 0.8);
        assert_eq!(reply.issues.len(), 1);
    }

    #[test]
    fn garbage_reply_is_none() {
        assert!(ModelReviewValidator::parse_reply("no json here").is_none());
    }

    #[tokio::test]
    async fn unreachable_chain_is_a_noop_stage() {
        let chain = Arc::new(FallbackChain::empty());
        let validator = ModelReviewValidator::new(chain);
        let mut ctx = ValidationContext::new("project_card", "# Dokument");
        let result = validator.validate(&mut ctx).await;
        assert!(result.valid);
        assert_eq!(result.score, 1.0);
        assert!(result.issues.is_empty());
    }
}
