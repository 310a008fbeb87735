//! Legal compliance validator: NIP checksums, B+R categories, legal
//! references, date consistency, related-party disclosure.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};

use brdoc_core::check::validate_nip;
use brdoc_core::enums::BrCategory;
use brdoc_core::models::{ValidationIssue, ValidationResult};
use brdoc_core::ValidationSeverity;

use crate::context::{ValidationContext, ValidationStage, Validator};

/// Legal references accepted for formal document types.
const LEGAL_REFERENCE_PATTERNS: [&str; 3] = [
    r"art\.?\s*18d",
    r"IP\s*Box|art\.?\s*24d",
    r"B\+R|B&R|badawczo[-\s]?rozwojow",
];

/// Document types that must cite a legal basis.
const FORMAL_DOC_TYPES: [&str; 2] = ["project_card", "nexus_calculation"];

/// Document types whose expenses need qualification justifications.
const JUSTIFIED_DOC_TYPES: [&str; 2] = ["expense_registry", "project_card"];

fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("static regex")
}

/// Validates legal compliance of B+R documentation.
pub struct LegalValidator;

impl LegalValidator {
    fn check_nips(content: &str, issues: &mut Vec<ValidationIssue>) {
        // Tolerant candidate extraction: separated or bare 10-digit runs.
        let nip_re =
            Regex::new(r"\b(\d{3}[-\s]\d{3}[-\s]\d{2}[-\s]\d{2})\b|\b(\d{10})\b")
                .expect("static regex");
        for m in nip_re.find_iter(content) {
            let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.len() != 10 {
                continue;
            }
            if let Err(reason) = validate_nip(&digits) {
                issues.push(
                    ValidationIssue::error(
                        "INVALID_NIP",
                        format!("Nieprawidłowy NIP: {digits} - {reason}"),
                    )
                    .with_location(format!("pozycja {}", m.start())),
                );
            }
        }
    }

    fn check_category_mention(content: &str, issues: &mut Vec<ValidationIssue>) {
        let mentioned = BrCategory::ALL.iter().any(|cat| {
            let tag_pattern = cat.tag().replace('_', r"[\s_-]?");
            ci(&tag_pattern).is_match(content)
                || ci(&regex::escape(cat.display_name_pl())).is_match(content)
        });
        if !mentioned {
            issues.push(
                ValidationIssue::warning(
                    "MISSING_BR_CATEGORY",
                    "Brak wyraźnego odniesienia do kategorii kosztów B+R",
                )
                .with_suggestion("Dodaj informacje o kategorii kosztu wg art. 18d CIT"),
            );
        }
    }

    fn check_legal_reference(doc_type: &str, content: &str, issues: &mut Vec<ValidationIssue>) {
        if !FORMAL_DOC_TYPES.contains(&doc_type) {
            return;
        }
        let has_reference = LEGAL_REFERENCE_PATTERNS
            .iter()
            .any(|p| ci(p).is_match(content));
        if !has_reference {
            issues.push(
                ValidationIssue::info(
                    "MISSING_LEGAL_REFERENCE",
                    "Brak odniesienia do podstawy prawnej",
                )
                .with_suggestion(
                    "Rozważ dodanie odniesienia do art. 18d CIT lub przepisów IP Box",
                ),
            );
        }
    }

    fn check_justifications(doc_type: &str, content: &str, issues: &mut Vec<ValidationIssue>) {
        if !JUSTIFIED_DOC_TYPES.contains(&doc_type) {
            return;
        }
        if !ci(r"kwalifikowan|qualified|uzasadnienie|justification").is_match(content) {
            issues.push(
                ValidationIssue::warning(
                    "MISSING_QUALIFICATION_JUSTIFICATION",
                    "Brak uzasadnień kwalifikowalności wydatków",
                )
                .with_suggestion(
                    "Każdy wydatek powinien mieć uzasadnienie kwalifikowalności B+R",
                ),
            );
        }
    }

    fn check_date_consistency(year: i32, content: &str, issues: &mut Vec<ValidationIssue>) {
        let date_re = Regex::new(r"(\d{4})[-/]\d{2}[-/]\d{2}").expect("static regex");
        let mut invalid_years: Vec<i32> = date_re
            .captures_iter(content)
            .filter_map(|c| c[1].parse::<i32>().ok())
            .filter(|y| (*y - year).abs() > 1)
            .collect();
        invalid_years.sort();
        invalid_years.dedup();
        if !invalid_years.is_empty() {
            issues.push(
                ValidationIssue::warning(
                    "INCONSISTENT_DATES",
                    format!("Znaleziono daty z nieoczekiwanych lat: {invalid_years:?}"),
                )
                .with_suggestion(format!("Upewnij się, że wszystkie daty dotyczą roku {year}")),
            );
        }
    }

    fn check_related_party(content: &str, issues: &mut Vec<ValidationIssue>) {
        let related_terms = [
            r"podmiot(y|ów|ami)?\s+powiązan",
            r"spółka\s+(córka|matka)",
            r"related\s+party",
        ];
        let has_related = related_terms.iter().any(|t| ci(t).is_match(content));
        if !has_related {
            return;
        }
        let disclosure_terms = [r"ujawnieni", r"disclosure", r"ceny\s+transferowe"];
        let has_disclosure = disclosure_terms.iter().any(|t| ci(t).is_match(content));
        if !has_disclosure {
            issues.push(
                ValidationIssue::warning(
                    "RELATED_PARTY_DISCLOSURE",
                    "Dokument wspomina o podmiocie powiązanym bez odpowiedniego ujawnienia",
                )
                .with_suggestion("Dodaj informacje o cenach transferowych i niezależności"),
            );
        }
    }
}

#[async_trait]
impl Validator for LegalValidator {
    fn stage(&self) -> ValidationStage {
        ValidationStage::Legal
    }

    async fn validate(&self, context: &mut ValidationContext) -> ValidationResult {
        let mut issues = Vec::new();
        let content = context.content.clone();
        let doc_type = context.document_type.clone();

        Self::check_nips(&content, &mut issues);
        Self::check_category_mention(&content, &mut issues);
        Self::check_legal_reference(&doc_type, &content, &mut issues);
        Self::check_justifications(&doc_type, &content, &mut issues);
        if let Some(year) = context.year {
            Self::check_date_consistency(year, &content, &mut issues);
        }
        Self::check_related_party(&content, &mut issues);

        let errors = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
            .count() as f64;
        let warnings = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
            .count() as f64;
        let score = (1.0 - errors * 0.25 - warnings * 0.1).max(0.0);

        let result = ValidationResult::from_issues(self.stage().as_str(), issues, score);
        context.add_issues(&result.issues);
        context.set_stage_result(result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(doc_type: &str, content: &str, year: Option<i32>) -> ValidationResult {
        let mut ctx = ValidationContext::new(doc_type, content);
        if let Some(y) = year {
            ctx = ctx.with_year(y);
        }
        LegalValidator.validate(&mut ctx).await
    }

    #[tokio::test]
    async fn invalid_nip_is_flagged() {
        let content = "Dokumentacja B+R. NIP dostawcy: 1234567890. Materiały i surowce.";
        let result = run("expense_registry", content, None).await;
        assert!(!result.valid);
        assert!(result.issues.iter().any(|i| i.code == "INVALID_NIP"));
    }

    #[tokio::test]
    async fn valid_nip_passes_in_both_shapes() {
        for content in [
            "Dokumentacja B+R, uzasadnienie kwalifikowalności. NIP: 5881918662. Materiały i surowce.",
            "Dokumentacja B+R, uzasadnienie kwalifikowalności. NIP: 588-191-86-62. Materiały i surowce.",
        ] {
            let result = run("expense_registry", content, None).await;
            assert!(result.valid, "issues: {:?}", result.issues);
        }
    }

    #[tokio::test]
    async fn missing_category_mention_warns() {
        let result = run("expense_registry", "Dokument bez żadnych kategorii, uzasadnienie jest.", None).await;
        assert!(result.issues.iter().any(|i| i.code == "MISSING_BR_CATEGORY"));
    }

    #[tokio::test]
    async fn formal_docs_need_legal_reference() {
        let result = run("project_card", "Dokument opisujący projekt. Materiały i surowce, kwalifikowany.", None).await;
        assert!(result
            .issues
            .iter()
            .any(|i| i.code == "MISSING_LEGAL_REFERENCE"));

        let with_ref = "Projekt B+R zgodny z art. 18d CIT. Materiały i surowce, kwalifikowany.";
        let result = run("project_card", with_ref, None).await;
        assert!(!result
            .issues
            .iter()
            .any(|i| i.code == "MISSING_LEGAL_REFERENCE"));
    }

    #[tokio::test]
    async fn out_of_range_dates_warn() {
        let content = "Faktura z 2019-05-01 w dokumentacji B+R, materiały i surowce, uzasadnienie.";
        let result = run("expense_registry", content, Some(2025)).await;
        assert!(result.issues.iter().any(|i| i.code == "INCONSISTENT_DATES"));

        let adjacent = "Faktura z 2024-12-30 w dokumentacji B+R, materiały i surowce, uzasadnienie.";
        let result = run("expense_registry", adjacent, Some(2025)).await;
        assert!(!result.issues.iter().any(|i| i.code == "INCONSISTENT_DATES"));
    }

    #[tokio::test]
    async fn related_party_without_disclosure_warns() {
        let content = "Usługi od podmiotu powiązanego w projekcie B+R, materiały i surowce.";
        let result = run("project_card", content, None).await;
        assert!(result
            .issues
            .iter()
            .any(|i| i.code == "RELATED_PARTY_DISCLOSURE"));

        let disclosed = "Usługi od podmiotu powiązanego; ujawnienie i ceny transferowe opisano. \
                         Projekt B+R, materiały i surowce.";
        let result = run("project_card", disclosed, None).await;
        assert!(!result
            .issues
            .iter()
            .any(|i| i.code == "RELATED_PARTY_DISCLOSURE"));
    }
}
