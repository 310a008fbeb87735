//! Project input record, the immutable root of a generation request.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::check::{validate_date_range, validate_fiscal_year, validate_nip};
use crate::enums::{
    BrCategory, InnovationScope, InnovationType, MilestoneStatus, UncertaintyLevel,
};
use crate::error::{BrError, BrResult};

/// Tolerance for cost-total consistency checks, in PLN.
const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Description of the technical/scientific problem behind the project.
///
/// Tax authorities expect a clear statement of why standard solutions do
/// not suffice; the uncertainty factors carry the burden of proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalProblem {
    pub description: String,
    pub why_no_standard_solution: String,
    #[serde(default)]
    pub required_knowledge_domains: Vec<String>,
    #[serde(default)]
    pub uncertainty_factors: Vec<String>,
    pub uncertainty_level: UncertaintyLevel,
}

/// Systematic research methodology of the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchMethodology {
    /// Research approach, e.g. iterative with experimental elements.
    pub approach: String,
    #[serde(default)]
    pub phases: Vec<String>,
    #[serde(default)]
    pub validation_methods: Vec<String>,
    #[serde(default)]
    pub success_criteria: Vec<String>,
    pub systematic: bool,
    pub creative: bool,
    pub innovative: bool,
}

/// A project milestone with deliverables and findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub target_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_date: Option<NaiveDate>,
    #[serde(default)]
    pub deliverables: Vec<String>,
    pub status: MilestoneStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(default)]
    pub hours_spent: f64,
}

/// Risk analysis documenting the uncertainty element of B+R work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskAnalysis {
    #[serde(default)]
    pub identified_risks: Vec<String>,
    #[serde(default)]
    pub mitigation_strategies: Vec<String>,
    #[serde(default)]
    pub actual_failures: Vec<String>,
    #[serde(default)]
    pub lessons_learned: Vec<String>,
}

/// A single cost item of the project input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostItem {
    pub description: String,
    pub category: BrCategory,
    pub gross_amount: Decimal,
    /// Claimed deduction; must equal `gross × category rate`.
    pub deduction_amount: Decimal,
}

impl CostItem {
    /// Build a cost item with the deduction derived from the statutory rate.
    pub fn new(description: impl Into<String>, category: BrCategory, gross: Decimal) -> Self {
        let rate = Decimal::from_f64(category.deduction_rate()).unwrap_or(Decimal::ONE);
        Self {
            description: description.into(),
            category,
            gross_amount: gross,
            deduction_amount: (gross * rate).round_dp(2),
        }
    }

    /// Expected deduction for this item per the statutory rate.
    pub fn expected_deduction(&self) -> Decimal {
        let rate = Decimal::from_f64(self.category.deduction_rate()).unwrap_or(Decimal::ONE);
        (self.gross_amount * rate).round_dp(2)
    }
}

/// Documentation generation preferences carried on the project input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationConfig {
    /// Whether a model-backed draft should be attempted.
    #[serde(default)]
    pub use_llm: bool,
    /// Whether a PDF artifact should be rendered next to the Markdown.
    #[serde(default)]
    pub render_pdf: bool,
    /// Maximum refinement iterations when the score is below threshold.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    3
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            use_llm: false,
            render_pdf: false,
            max_iterations: default_max_iterations(),
        }
    }
}

/// Project input record.
///
/// Immutable for the duration of a generation request; `validate` is the
/// single unconditional gate of the pipeline: a project whose invariants
/// fail is rejected before any fetch happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    pub code: String,
    pub fiscal_year: i32,
    pub company_name: String,
    pub company_nip: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub milestones: Vec<Milestone>,

    pub innovation_type: InnovationType,
    pub innovation_scope: InnovationScope,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_problem: Option<TechnicalProblem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methodology: Option<ResearchMethodology>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_analysis: Option<RiskAnalysis>,
    #[serde(default)]
    pub research_methods: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,

    #[serde(default)]
    pub costs: Vec<CostItem>,
    /// Stated aggregate of all cost items; checked against their sum.
    pub total_costs: Decimal,

    #[serde(default)]
    pub documentation: DocumentationConfig,
}

impl ProjectInput {
    /// Recommended minimum length of the innovation description.
    pub const DESCRIPTION_RECOMMENDED_CHARS: usize = 100;

    /// Verify all project-input invariants.
    ///
    /// Checks: NIP checksum, fiscal year bounds, start ≤ end, the
    /// stated total against the sum of item grosses, and each item's
    /// deduction against `gross × statutory rate` (±0.01 PLN).
    pub fn validate(&self) -> BrResult<()> {
        validate_nip(&self.company_nip).map_err(BrError::validation)?;
        validate_fiscal_year(self.fiscal_year, true).map_err(BrError::validation)?;
        validate_date_range(self.start_date, self.end_date).map_err(BrError::validation)?;

        let item_sum: Decimal = self.costs.iter().map(|c| c.gross_amount).sum();
        if (item_sum - self.total_costs).abs() > AMOUNT_TOLERANCE {
            return Err(BrError::validation(format!(
                "Suma pozycji kosztowych ({item_sum}) nie zgadza się z podaną sumą ({})",
                self.total_costs
            )));
        }

        for item in &self.costs {
            let expected = item.expected_deduction();
            if (item.deduction_amount - expected).abs() > AMOUNT_TOLERANCE {
                return Err(BrError::validation(format!(
                    "Pozycja '{}': odliczenie {} nie odpowiada stawce kategorii (oczekiwano {})",
                    item.description, item.deduction_amount, expected
                )));
            }
        }
        Ok(())
    }

    /// Total statutory deduction across all cost items.
    pub fn total_deduction(&self) -> Decimal {
        self.costs.iter().map(|c| c.deduction_amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_project() -> ProjectInput {
        ProjectInput {
            name: "System analizy danych pomiarowych".to_string(),
            code: "BR-2025-001".to_string(),
            fiscal_year: 2025,
            company_name: "Softreck".to_string(),
            company_nip: "5881918662".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            milestones: vec![],
            innovation_type: InnovationType::Product,
            innovation_scope: InnovationScope::National,
            description: "Opracowanie prototypowego systemu przetwarzania danych pomiarowych \
                          z wykorzystaniem autorskich algorytmów analizy sygnałów."
                .to_string(),
            technical_problem: None,
            methodology: None,
            risk_analysis: None,
            research_methods: vec!["prototypowanie".to_string()],
            risk_factors: vec!["ryzyko wydajnościowe".to_string()],
            costs: vec![CostItem::new(
                "Wynagrodzenia zespołu B+R",
                BrCategory::PersonnelEmployment,
                dec!(120000),
            )],
            total_costs: dec!(120000),
            documentation: DocumentationConfig::default(),
        }
    }

    #[test]
    fn valid_project_passes() {
        assert!(sample_project().validate().is_ok());
    }

    #[test]
    fn personnel_deduction_is_doubled() {
        let p = sample_project();
        assert_eq!(p.total_deduction(), dec!(240000.00));
    }

    #[test]
    fn bad_nip_is_rejected() {
        let mut p = sample_project();
        p.company_nip = "1234567890".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn total_mismatch_is_rejected() {
        let mut p = sample_project();
        p.total_costs = dec!(100000);
        assert!(p.validate().is_err());
    }

    #[test]
    fn tampered_deduction_is_rejected() {
        let mut p = sample_project();
        p.costs[0].deduction_amount = dec!(120000);
        assert!(p.validate().is_err());
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let mut p = sample_project();
        p.end_date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(p.validate().is_err());
    }
}
