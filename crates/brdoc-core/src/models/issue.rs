//! Validation issue and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::ValidationSeverity;

/// A single validation issue.
///
/// `code` is a stable, public `UPPER_SNAKE_CASE` identifier callers may
/// key on (e.g. `INVALID_NIP`, `TOTAL_MISMATCH`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// URL at which the flagged value can be verified, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        severity: ValidationSeverity,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            location: None,
            suggestion: None,
            source_url: None,
        }
    }

    /// Create an error-severity issue.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Error, code, message)
    }

    /// Create a warning-severity issue.
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Warning, code, message)
    }

    /// Create an info-severity issue.
    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Info, code, message)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Result of one validation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff the stage produced no error-severity issues.
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    /// Quality score in [0, 1].
    pub score: f64,
    pub stage: String,
    pub validated_at: DateTime<Utc>,
}

impl ValidationResult {
    /// Build a stage result; `valid` is derived from the error count.
    pub fn from_issues(stage: impl Into<String>, issues: Vec<ValidationIssue>, score: f64) -> Self {
        let valid = !issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error);
        Self {
            valid,
            issues,
            score: score.clamp(0.0, 1.0),
            stage: stage.into(),
            validated_at: Utc::now(),
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_follows_error_count() {
        let ok = ValidationResult::from_issues(
            "structure",
            vec![ValidationIssue::warning("EMPTY_SECTIONS", "puste sekcje")],
            0.95,
        );
        assert!(ok.valid);
        assert_eq!(ok.warning_count(), 1);

        let bad = ValidationResult::from_issues(
            "legal",
            vec![ValidationIssue::error("INVALID_NIP", "zły NIP")],
            0.75,
        );
        assert!(!bad.valid);
        assert_eq!(bad.error_count(), 1);
    }

    #[test]
    fn score_is_clamped() {
        let r = ValidationResult::from_issues("financial", vec![], 1.7);
        assert_eq!(r.score, 1.0);
        let r = ValidationResult::from_issues("financial", vec![], -0.3);
        assert_eq!(r.score, 0.0);
    }
}
