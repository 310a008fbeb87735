//! Financial validator: amounts, totals, percentages, currencies, and
//! the Nexus indicator.

use std::collections::BTreeMap;

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};

use brdoc_core::models::{ValidationIssue, ValidationResult};
use brdoc_core::{NexusComponents, ValidationSeverity};

use crate::context::{ValidationContext, ValidationStage, Validator};

/// Amounts above this threshold are flagged as suspicious (PLN).
const SUSPICIOUS_AMOUNT: f64 = 10_000_000.0;

/// Tolerance for totals and Nexus discrepancies.
const TOLERANCE: f64 = 0.01;

/// An extracted amount with its character offset.
#[derive(Debug, Clone, Copy)]
struct Amount {
    value: f64,
    offset: usize,
}

fn amount_regex() -> Regex {
    // Polish currency format: optional sign, space/nbsp thousands
    // separators, comma or dot decimals, zł/PLN suffix.
    RegexBuilder::new(r"(-?\d{1,3}(?:[\s\u{a0}]?\d{3})*(?:[,.]\d{2})?)\s*(?:zł|PLN)")
        .case_insensitive(true)
        .build()
        .expect("static regex")
}

fn parse_number(text: &str) -> Option<f64> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    normalized.parse().ok()
}

fn extract_amounts(content: &str) -> Vec<Amount> {
    amount_regex()
        .captures_iter(content)
        .filter_map(|cap| {
            let m = cap.get(1)?;
            Some(Amount {
                value: parse_number(m.as_str())?,
                offset: m.start(),
            })
        })
        .collect()
}

/// Validates financial calculations in B+R documents.
pub struct FinancialValidator;

impl FinancialValidator {
    fn check_amounts(amounts: &[Amount], issues: &mut Vec<ValidationIssue>) {
        for amount in amounts {
            if amount.value < 0.0 {
                issues.push(
                    ValidationIssue::error(
                        "NEGATIVE_AMOUNT",
                        format!("Wykryto ujemną kwotę: {}", amount.value),
                    )
                    .with_location(format!("pozycja {}", amount.offset)),
                );
            }
            if amount.value > SUSPICIOUS_AMOUNT {
                issues.push(
                    ValidationIssue::warning(
                        "SUSPICIOUS_AMOUNT",
                        format!("Podejrzanie wysoka kwota: {:.2} PLN", amount.value),
                    )
                    .with_location(format!("pozycja {}", amount.offset)),
                );
            }
        }
    }

    fn check_nexus(doc_type: &str, content: &str, issues: &mut Vec<ValidationIssue>) {
        let nexus_re = Regex::new(r"[Nn]exus[:\s]*(\d+[.,]\d+)").expect("static regex");
        let Some(cap) = nexus_re.captures(content) else {
            if doc_type == "nexus_calculation" {
                issues.push(ValidationIssue::error(
                    "NEXUS_MISSING",
                    "Brak wartości wskaźnika Nexus w dokumencie",
                ));
            }
            return;
        };

        let Some(nexus) = parse_number(&cap[1]) else {
            issues.push(ValidationIssue::error(
                "NEXUS_INVALID_FORMAT",
                format!("Nieprawidłowy format wskaźnika Nexus: {}", &cap[1]),
            ));
            return;
        };

        if nexus < 0.0 {
            issues.push(ValidationIssue::error(
                "NEXUS_NEGATIVE",
                format!("Wskaźnik Nexus nie może być ujemny: {nexus}"),
            ));
        } else if nexus > 1.0 {
            issues.push(
                ValidationIssue::error(
                    "NEXUS_EXCEEDS_ONE",
                    format!("Wskaźnik Nexus nie może przekraczać 1.0: {nexus}"),
                )
                .with_suggestion("Sprawdź obliczenia - Nexus = min(1, ((a+b)×1.3) / (a+b+c+d))"),
            );
        } else if nexus < 0.5 {
            issues.push(
                ValidationIssue::warning(
                    "NEXUS_LOW",
                    format!("Niski wskaźnik Nexus: {nexus:.4}"),
                )
                .with_suggestion(
                    "Niski Nexus oznacza znaczące koszty od podmiotów powiązanych lub zakupu IP",
                ),
            );
        }

        // Recompute from components when they are discoverable.
        let mut components: BTreeMap<char, f64> = BTreeMap::new();
        for symbol in ['a', 'b', 'c', 'd'] {
            let comp_re =
                RegexBuilder::new(&format!(r"\b{symbol}[:\s]+(\d+(?:[,.]\d+)?)\b"))
                    .case_insensitive(true)
                    .build()
                    .expect("static regex");
            if let Some(cap) = comp_re.captures(content) {
                if let Some(value) = parse_number(&cap[1]) {
                    components.insert(symbol, value);
                }
            }
        }

        if components.len() >= 2 {
            let get = |c: char| components.get(&c).copied().unwrap_or(0.0);
            let recomputed =
                NexusComponents::new(get('a'), get('b'), get('c'), get('d'));
            if recomputed.total() > 0.0 {
                let expected = recomputed.ratio();
                if (expected - nexus).abs() > TOLERANCE {
                    issues.push(
                        ValidationIssue::error(
                            "NEXUS_MISMATCH",
                            format!(
                                "Niezgodność Nexus: podano {nexus:.4}, obliczono {expected:.4}"
                            ),
                        )
                        .with_suggestion("Przelicz wskaźnik Nexus"),
                    );
                }
            }
        }
    }

    fn check_totals(content: &str, amounts: &[Amount], issues: &mut Vec<ValidationIssue>) {
        let total_re = RegexBuilder::new(
            r"(suma|total|razem|ogółem)[:\s]*(-?\d{1,3}(?:[\s\u{a0}]?\d{3})*(?:[,.]\d{2})?)\s*(?:zł|PLN)?",
        )
        .case_insensitive(true)
        .build()
        .expect("static regex");

        for cap in total_re.captures_iter(content) {
            let Some(stated_total) = parse_number(&cap[2]) else {
                continue;
            };
            if amounts.len() <= 2 {
                continue;
            }
            // Line items are the amounts that are not the total itself.
            let line_items: Vec<f64> = amounts
                .iter()
                .map(|a| a.value)
                .filter(|v| (v - stated_total).abs() > TOLERANCE)
                .collect();
            if line_items.is_empty() {
                continue;
            }
            let calculated: f64 = line_items.iter().sum();
            if (calculated - stated_total).abs() > TOLERANCE {
                let diff = stated_total - calculated;
                issues.push(
                    ValidationIssue::warning(
                        "TOTAL_MISMATCH",
                        format!(
                            "Możliwa niezgodność sumy: podano {stated_total:.2}, \
                             obliczono {calculated:.2} (różnica: {diff:.2})"
                        ),
                    )
                    .with_suggestion("Sprawdź sumowanie pozycji"),
                );
            }
        }
    }

    fn check_percentages(content: &str, issues: &mut Vec<ValidationIssue>) {
        let pct_re = Regex::new(r"(\d+(?:[,.]\d+)?)\s*%").expect("static regex");
        for cap in pct_re.captures_iter(content) {
            if let Some(pct) = parse_number(&cap[1]) {
                if pct > 100.0 {
                    issues.push(ValidationIssue::error(
                        "INVALID_PERCENTAGE",
                        format!("Wartość procentowa przekracza 100%: {pct}%"),
                    ));
                }
            }
        }
    }

    fn check_currencies(content: &str, issues: &mut Vec<ValidationIssue>) {
        let currency_re = Regex::new(r"PLN|EUR|USD|zł|€|\$").expect("static regex");
        let mut seen: Vec<&str> = currency_re
            .find_iter(content)
            .map(|m| match m.as_str() {
                "zł" | "PLN" => "PLN",
                "€" | "EUR" => "EUR",
                _ => "USD",
            })
            .collect();
        seen.sort();
        seen.dedup();
        if seen.len() > 1 && !seen.contains(&"PLN") {
            issues.push(
                ValidationIssue::warning(
                    "MIXED_CURRENCIES",
                    format!("Dokument zawiera różne waluty: {seen:?}"),
                )
                .with_suggestion(
                    "Upewnij się, że kwoty są przeliczone na PLN według kursu NBP",
                ),
            );
        }
    }

    fn check_vat_info(doc_type: &str, content: &str, issues: &mut Vec<ValidationIssue>) {
        if doc_type != "expense_registry" {
            return;
        }
        let vat_re = RegexBuilder::new(r"VAT|netto|brutto")
            .case_insensitive(true)
            .build()
            .expect("static regex");
        if !vat_re.is_match(content) {
            issues.push(ValidationIssue::warning(
                "MISSING_VAT_INFO",
                "Brak informacji o VAT (netto/brutto)",
            ));
        }
    }
}

#[async_trait]
impl Validator for FinancialValidator {
    fn stage(&self) -> ValidationStage {
        ValidationStage::Financial
    }

    async fn validate(&self, context: &mut ValidationContext) -> ValidationResult {
        let mut issues = Vec::new();
        let content = context.content.clone();
        let doc_type = context.document_type.clone();

        let amounts = extract_amounts(&content);
        Self::check_amounts(&amounts, &mut issues);
        Self::check_nexus(&doc_type, &content, &mut issues);
        Self::check_totals(&content, &amounts, &mut issues);
        Self::check_percentages(&content, &mut issues);
        Self::check_currencies(&content, &mut issues);
        Self::check_vat_info(&doc_type, &content, &mut issues);

        let errors = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
            .count() as f64;
        let warnings = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
            .count() as f64;
        let score = (1.0 - errors * 0.3 - warnings * 0.1).max(0.0);

        let result = ValidationResult::from_issues(self.stage().as_str(), issues, score);
        context.add_issues(&result.issues);
        context.set_stage_result(result.clone());
        result
    }
}
