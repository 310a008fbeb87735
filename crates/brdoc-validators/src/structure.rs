//! Structure validator: required sections, fields, and formatting.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};

use brdoc_core::models::{ValidationIssue, ValidationResult};

use crate::context::{ValidationContext, ValidationStage, Validator};

/// A section or field requirement: display name, matching pattern,
/// whether it is mandatory.
struct Requirement {
    name: &'static str,
    pattern: &'static str,
    required: bool,
}

const fn req(name: &'static str, pattern: &'static str, required: bool) -> Requirement {
    Requirement {
        name,
        pattern,
        required,
    }
}

/// Required top-level sections by document type (Polish section names).
fn required_sections(doc_type: &str) -> Vec<Requirement> {
    match doc_type {
        "project_card" => vec![
            req("Identyfikacja", r"##\s*.*(Identyfikacja|Dane\s+projektu)", true),
            req("Opis projektu", r"##\s*.*(Opis|Cel|Zakres)", true),
            req("Zespół", r"##\s*.*(Zespół|Pracownicy|Kadra)", false),
            req("Koszty", r"##\s*.*(Koszty|Wydatki|Budżet)", true),
        ],
        "expense_registry" => vec![
            req("Nagłówek", r"#\s*(Ewidencja|Rejestr)\s+(Wydatków|Kosztów)", true),
            req("Podsumowanie", r"##\s*.*(Podsumowanie|Suma)", true),
            req("Tabela wydatków", r"\|.*\|.*\|", true),
        ],
        "nexus_calculation" => vec![
            req("Nagłówek", r"#\s*.*(Obliczenie\s+)?.*Nexus", true),
            req("Składniki", r"##\s*.*(Składniki|Komponenty)", true),
            req("Obliczenie", r"##\s*.*(Obliczenie|Wynik|Kalkulacja)", true),
            req("Wzór", r"nexus\s*=|formula", false),
        ],
        "timesheet_monthly" => vec![
            req("Nagłówek", r"#\s*(Ewidencja|Rejestr)\s+Czasu", true),
            req("Pracownik", r"(Pracownik|Imię|Nazwisko)", true),
            req("Godziny", r"(godzin|hours|czas)", true),
        ],
        _ => vec![],
    }
}

/// Required inline fields by document type.
fn required_fields(doc_type: &str) -> Vec<Requirement> {
    match doc_type {
        "project_card" => vec![
            req("NIP", r"\bNIP\b.{0,20}?\d{3}[-\s]?\d{3}[-\s]?\d{2}[-\s]?\d{2}\b", true),
            req("Rok", r"\b(Rok|Year)\b.{0,20}?\d{4}\b", true),
            req("Nazwa projektu", r"(Nazwa|Tytuł)\s*(projektu)?.{0,10}\S{3,}", true),
        ],
        "expense_registry" => vec![
            req("Kwota", r"\d+[,.\s]\d{2}\s*(zł|PLN)", true),
            req("Data", r"\d{4}[-/]\d{2}[-/]\d{2}|\d{2}[./]\d{2}[./]\d{4}", true),
        ],
        "nexus_calculation" => vec![
            req("Wartość Nexus", r"[Nn]exus.{0,10}?\d+[.,]\d+", true),
            req("Składnik a", r"\ba\b.{0,5}?\d+", true),
            req("Składnik b", r"\bb\b.{0,5}?\d+", false),
        ],
        _ => vec![],
    }
}

fn matches_ci(pattern: &str, content: &str) -> bool {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

/// Validates document structure and formatting.
pub struct StructureValidator;

#[async_trait]
impl Validator for StructureValidator {
    fn stage(&self) -> ValidationStage {
        ValidationStage::Structure
    }

    async fn validate(&self, context: &mut ValidationContext) -> ValidationResult {
        let mut issues = Vec::new();
        let content = context.content.clone();
        let doc_type = context.document_type.clone();

        if content.chars().count() < 100 {
            issues.push(ValidationIssue::error(
                "DOC_TOO_SHORT",
                "Dokument jest zbyt krótki (minimum 100 znaków)",
            ));
        }

        let title_re = Regex::new(r"(?m)^#\s+.+").expect("static regex");
        if !title_re.is_match(&content) {
            issues.push(ValidationIssue::error(
                "MISSING_TITLE",
                "Brak nagłówka głównego (# Tytuł)",
            ));
        }

        for section in required_sections(&doc_type) {
            if !matches_ci(section.pattern, &content) {
                if section.required {
                    issues.push(
                        ValidationIssue::error(
                            "MISSING_SECTION",
                            format!("Brak wymaganej sekcji: {}", section.name),
                        )
                        .with_suggestion(format!("Dodaj sekcję ## {}", section.name)),
                    );
                } else {
                    issues.push(ValidationIssue::warning(
                        "MISSING_OPTIONAL_SECTION",
                        format!("Brak opcjonalnej sekcji: {}", section.name),
                    ));
                }
            }
        }

        for field in required_fields(&doc_type) {
            if !matches_ci(field.pattern, &content) {
                if field.required {
                    issues.push(ValidationIssue::error(
                        "MISSING_FIELD",
                        format!("Brak wymaganego pola: {}", field.name),
                    ));
                } else {
                    issues.push(ValidationIssue::warning(
                        "MISSING_OPTIONAL_FIELD",
                        format!("Brak opcjonalnego pola: {}", field.name),
                    ));
                }
            }
        }

        // Table rows need at least three pipes (two columns).
        let table_row_re = Regex::new(r"\|[^\n]+\|").expect("static regex");
        for (idx, row) in table_row_re.find_iter(&content).enumerate() {
            if row.as_str().matches('|').count() < 3 {
                issues.push(ValidationIssue::warning(
                    "INVALID_TABLE_FORMAT",
                    format!("Nieprawidłowy format tabeli w wierszu {}", idx + 1),
                ));
            }
        }

        let empty_section_re = Regex::new(r"##\s+[^\n]+\n\s*\n##").expect("static regex");
        let empty_count = empty_section_re.find_iter(&content).count();
        if empty_count > 0 {
            issues.push(ValidationIssue::warning(
                "EMPTY_SECTIONS",
                format!("Znaleziono {empty_count} pustych sekcji"),
            ));
        }

        let errors = issues
            .iter()
            .filter(|i| i.severity == brdoc_core::ValidationSeverity::Error)
            .count() as f64;
        let warnings = issues
            .iter()
            .filter(|i| i.severity == brdoc_core::ValidationSeverity::Warning)
            .count() as f64;
        let score = (1.0 - errors * 0.2 - warnings * 0.05).max(0.0);

        let result = ValidationResult::from_issues(self.stage().as_str(), issues, score);
        context.add_issues(&result.issues);
        context.set_stage_result(result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(doc_type: &str, content: &str) -> ValidationResult {
        let mut ctx = ValidationContext::new(doc_type, content);
        StructureValidator.validate(&mut ctx).await
    }

    #[tokio::test]
    async fn short_document_fails() {
        let result = run("project_card", "# X").await;
        assert!(!result.valid);
        assert!(result.issues.iter().any(|i| i.code == "DOC_TOO_SHORT"));
    }

    #[tokio::test]
    async fn complete_project_card_passes() {
        let content = "# KARTA PROJEKTOWA BADAWCZO-ROZWOJOWA\n\n\
            ## 1. IDENTYFIKACJA PROJEKTU\n\n\
            | Pole | Wartość |\n|------|---------|\n\
            | Nazwa projektu | System analizy danych |\n\
            | NIP | 588-191-86-62 |\n| Rok | 2025 |\n\n\
            ## 2. OPIS DZIAŁALNOŚCI B+R\n\nOpis prac badawczych nad systemem.\n\n\
            ## 3. ZESPÓŁ BADAWCZY\n\n| Pracownik | Godziny |\n|---|---|\n| Jan | 100 |\n\n\
            ## 4. KOSZTY PROJEKTOWE\n\n| Kategoria | Kwota |\n|---|---|\n| Materiały | 1 000,00 zł |\n";
        let result = run("project_card", content).await;
        assert!(result.valid, "issues: {:?}", result.issues);
        assert!(result.score > 0.9);
    }

    #[tokio::test]
    async fn missing_section_is_an_error() {
        let content = format!(
            "# KARTA\n\n## 1. IDENTYFIKACJA\n\nNazwa projektu: Test, NIP 588-191-86-62, Rok 2025.\n{}",
            "x".repeat(100)
        );
        let result = run("project_card", &content).await;
        assert!(result
            .issues
            .iter()
            .any(|i| i.code == "MISSING_SECTION" && i.message.contains("Koszty")));
    }

    #[tokio::test]
    async fn unknown_doc_type_checks_only_basics() {
        let content = format!("# Dowolny dokument\n\n{}", "treść ".repeat(30));
        let result = run("freeform", &content).await;
        assert!(result.valid);
    }
}
