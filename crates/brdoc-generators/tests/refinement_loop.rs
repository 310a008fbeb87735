//! Refinement convergence: a draft missing required content is repaired
//! by the model, the score crosses the threshold, and every numeric
//! literal of the original survives.

use std::time::Duration;

use brdoc_generators::{numeric_literals, refine, RefinementStatus};
use brdoc_llm::{FallbackChain, LlmProvider, ModelConfig};
use brdoc_test_utils::http_stub::{ollama_reply, spawn_json_stub};
use brdoc_validators::{ValidationPipeline, ValidationRequest};

/// An expense registry missing its summary section and dates.
fn draft_before() -> String {
    "# EWIDENCJA WYDATKÓW B+R\n\n\
     | Nr | Dostawca | Kwota brutto |\n|----|----------|--------------|\n\
     | 1 | Elektronika Lab | 12 300,00 zł |\n"
        .to_string()
}

/// The repaired registry: same numbers, all required content present.
fn draft_after() -> String {
    "# EWIDENCJA WYDATKÓW B+R\n\n\
     Kategoria kosztów: materiały i surowce (art. 18d CIT), wydatek kwalifikowany \
     z uzasadnieniem.\n\n\
     | Nr | Data | Dostawca | Kwota brutto |\n|----|------|----------|--------------|\n\
     | 1 | 2025-03-14 | Elektronika Lab | 12 300,00 zł netto + VAT |\n\n\
     ## Podsumowanie\n\n\
     | Metryka | Wartość |\n|---------|---------|\n\
     | Suma brutto | 12 300,00 zł |\n"
        .to_string()
}

#[tokio::test]
async fn refinement_converges_in_one_iteration() {
    let pipeline = ValidationPipeline::with_defaults();

    let before_report = pipeline
        .validate(ValidationRequest::new("expense_registry", draft_before()).with_year(2025))
        .await;
    assert!(
        before_report.overall_score < 0.8,
        "draft should start below threshold, got {}",
        before_report.overall_score
    );

    let base_url = spawn_json_stub(ollama_reply(&draft_after())).await;
    let chain = FallbackChain::new(vec![ModelConfig::new(LlmProvider::Ollama, "llama3.2", 1)
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))]);

    let outcome = refine(&chain, &draft_before(), &before_report.all_issues, 1).await;
    assert_eq!(outcome.log.len(), 1);
    assert_eq!(outcome.log[0].status, RefinementStatus::Success);

    // Every numeric literal of the original survives the refinement.
    let before_numbers = numeric_literals(&draft_before());
    let after_numbers = numeric_literals(&outcome.content);
    assert!(before_numbers.is_subset(&after_numbers));

    let after_report = pipeline
        .validate(
            ValidationRequest::new("expense_registry", outcome.content.clone()).with_year(2025),
        )
        .await;
    assert!(
        after_report.overall_score >= 0.8,
        "refined draft should pass, got {} with {:?}",
        after_report.overall_score,
        after_report.all_issues
    );
}

#[tokio::test]
async fn refinement_rejects_drafts_that_change_amounts() {
    let tampered = draft_after().replace("12 300,00", "15 000,00");
    let base_url = spawn_json_stub(ollama_reply(&tampered)).await;
    let chain = FallbackChain::new(vec![ModelConfig::new(LlmProvider::Ollama, "llama3.2", 1)
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))]);

    let pipeline = ValidationPipeline::with_defaults();
    let report = pipeline
        .validate(ValidationRequest::new("expense_registry", draft_before()))
        .await;

    let outcome = refine(&chain, &draft_before(), &report.all_issues, 1).await;
    assert_eq!(outcome.log[0].status, RefinementStatus::Skipped);
    // The original draft is kept untouched.
    assert_eq!(outcome.content, draft_before());
}
