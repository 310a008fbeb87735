//! Iterative model-backed refinement with the numeric-preservation
//! post-condition.

use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use brdoc_core::models::ValidationIssue;
use brdoc_llm::{prompts, FallbackChain, LlmRequest};

/// Outcome of one refinement iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementStatus {
    Success,
    Skipped,
    Failed,
    Error,
}

/// Log entry of one refinement iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementEntry {
    pub iteration: u32,
    pub status: RefinementStatus,
    pub reason: String,
}

/// Result of a refinement run.
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    pub content: String,
    pub log: Vec<RefinementEntry>,
}

/// All decimal numeric literals of a document.
pub fn numeric_literals(text: &str) -> BTreeSet<String> {
    let re = Regex::new(r"\d+(?:[.,]\d+)?").expect("static regex");
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Refinement safety: every numeric literal of the prior draft must
/// still occur in the refined draft. No amount may silently change.
pub fn preserves_numerics(before: &str, after: &str) -> bool {
    let after_set = numeric_literals(after);
    numeric_literals(before).is_subset(&after_set)
}

/// Format the issue list the way the refinement prompt expects.
pub fn format_issues(issues: &[ValidationIssue]) -> String {
    use brdoc_core::ValidationSeverity;

    issues
        .iter()
        .map(|i| {
            let severity = match i.severity {
                ValidationSeverity::Error => "ERROR",
                ValidationSeverity::Warning => "WARNING",
                ValidationSeverity::Info => "INFO",
            };
            format!(
                "- [{severity}] {}\n  Lokalizacja: {}\n  Sugestia: {}",
                i.message,
                i.location.as_deref().unwrap_or("unknown"),
                i.suggestion.as_deref().unwrap_or(""),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Refine a document against a fixed issue list.
///
/// Runs at most `max_iterations` model calls; each accepted draft must
/// be non-empty, contain a `#` heading, and preserve every numeric
/// literal of the prior draft. The loop exits early when the chain is
/// unavailable.
pub async fn refine(
    chain: &FallbackChain,
    content: &str,
    issues: &[ValidationIssue],
    max_iterations: u32,
) -> RefinementOutcome {
    let mut refined = content.to_string();
    let mut log = Vec::new();

    if issues.is_empty() {
        return RefinementOutcome {
            content: refined,
            log,
        };
    }

    let issues_text = format_issues(issues);

    for iteration in 1..=max_iterations {
        if !chain.is_configured() {
            log.push(RefinementEntry {
                iteration,
                status: RefinementStatus::Skipped,
                reason: "Brak skonfigurowanych modeli".to_string(),
            });
            break;
        }

        let prompt = prompts::refinement_prompt(&issues_text, &refined);
        let request = LlmRequest::new(prompt)
            .with_temperature(0.3)
            .with_max_tokens(8000);
        let response = chain.generate(&request).await;

        if !response.is_success() {
            let reason = response
                .error
                .unwrap_or_else(|| "pusta odpowiedź".to_string());
            warn!(iteration, reason = %reason, "refinement call failed");
            log.push(RefinementEntry {
                iteration,
                status: RefinementStatus::Error,
                reason,
            });
            if response.model == "fallback_exhausted" {
                break;
            }
            continue;
        }

        let candidate = response.content;
        if !candidate.contains('#') {
            log.push(RefinementEntry {
                iteration,
                status: RefinementStatus::Skipped,
                reason: "Odpowiedź modelu bez struktury Markdown".to_string(),
            });
            continue;
        }
        if !preserves_numerics(&refined, &candidate) {
            log.push(RefinementEntry {
                iteration,
                status: RefinementStatus::Skipped,
                reason: "Odpowiedź modelu zmienia wartości liczbowe".to_string(),
            });
            continue;
        }

        info!(iteration, "refinement applied");
        refined = candidate;
        log.push(RefinementEntry {
            iteration,
            status: RefinementStatus::Success,
            reason: "Zastosowano poprawki modelu".to_string(),
        });
    }

    RefinementOutcome {
        content: refined,
        log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_literals_capture_both_separators() {
        let set = numeric_literals("Kwota 1230,00 i 45.5 oraz rok 2025");
        assert!(set.contains("1230,00"));
        assert!(set.contains("45.5"));
        assert!(set.contains("2025"));
    }

    #[test]
    fn preservation_is_subset_not_equality() {
        let before = "Suma: 100,00 zł";
        let added = "Suma: 100,00 zł, odliczenie 200,00 zł";
        let changed = "Suma: 150,00 zł";
        assert!(preserves_numerics(before, added));
        assert!(!preserves_numerics(before, changed));
        assert!(preserves_numerics(before, before));
    }

    #[test]
    fn issue_formatting_carries_severity_location_suggestion() {
        let issues = vec![ValidationIssue::error("MISSING_SECTION", "Brak sekcji")
            .with_location("sekcja 4")
            .with_suggestion("Dodaj sekcję")];
        let text = format_issues(&issues);
        assert!(text.contains("[ERROR] Brak sekcji"));
        assert!(text.contains("Lokalizacja: sekcja 4"));
        assert!(text.contains("Sugestia: Dodaj sekcję"));
    }

    #[tokio::test]
    async fn empty_issue_list_is_a_no_op() {
        let chain = FallbackChain::empty();
        let outcome = refine(&chain, "# Dok", &[], 3).await;
        assert_eq!(outcome.content, "# Dok");
        assert!(outcome.log.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_chain_skips_and_stops() {
        let chain = FallbackChain::empty();
        let issues = vec![ValidationIssue::warning("X", "x")];
        let outcome = refine(&chain, "# Dok", &issues, 3).await;
        assert_eq!(outcome.log.len(), 1);
        assert_eq!(outcome.log[0].status, RefinementStatus::Skipped);
        assert_eq!(outcome.content, "# Dok");
    }
}
