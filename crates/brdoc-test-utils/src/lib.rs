//! Shared fixtures and stubs for integration tests.

pub mod http_stub;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use brdoc_core::enums::{
    BrCategory, BrTaskType, DocumentStatus, InnovationScope, InnovationType, TimeSlot,
};
use brdoc_core::models::{
    CostItem, DailyTimeEntry, DocumentationConfig, ExpenseRecord, ProjectInput, RevenueRecord,
};

/// A valid NIP with a correct checksum.
pub const VALID_NIP: &str = "5881918662";

/// A syntactically correct NIP whose checksum fails.
pub const INVALID_NIP: &str = "1234567890";

/// Fiscal year of the fixtures: the previous calendar year, so
/// generation dates stay within the validators' one-year tolerance.
pub fn fiscal_year() -> i32 {
    Utc::now().year() - 1
}

/// A well-formed project with one employment cost of
/// 12 × 10 000 PLN at the 200% personnel rate.
pub fn sample_project() -> ProjectInput {
    ProjectInput {
        name: "System analizy sygnałów pomiarowych".to_string(),
        code: format!("BR-{}-001", fiscal_year()),
        fiscal_year: fiscal_year(),
        company_name: "Softreck".to_string(),
        company_nip: VALID_NIP.to_string(),
        start_date: NaiveDate::from_ymd_opt(fiscal_year(), 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(fiscal_year(), 12, 31).unwrap(),
        milestones: vec![],
        innovation_type: InnovationType::Product,
        innovation_scope: InnovationScope::National,
        description: "Opracowanie prototypowego systemu przetwarzania i klasyfikacji sygnałów \
                      pomiarowych z wykorzystaniem autorskich algorytmów analizy widmowej."
            .to_string(),
        technical_problem: None,
        methodology: None,
        risk_analysis: None,
        research_methods: vec!["prototypowanie".to_string(), "eksperymenty".to_string()],
        risk_factors: vec!["ryzyko wydajnościowe".to_string()],
        costs: vec![CostItem::new(
            "Wynagrodzenia zespołu B+R (12 miesięcy)",
            BrCategory::PersonnelEmployment,
            dec!(120000),
        )],
        total_costs: dec!(120000),
        documentation: DocumentationConfig::default(),
    }
}

/// Twelve monthly personnel expenses of 10 000 PLN at the 200% rate.
pub fn monthly_personnel_expenses() -> Vec<ExpenseRecord> {
    (1..=12)
        .map(|month| ExpenseRecord {
            id: format!("exp-{}-{month:02}", fiscal_year()),
            invoice_number: format!("LP/{}/{month:02}", fiscal_year()),
            invoice_date: NaiveDate::from_ymd_opt(fiscal_year(), month, 28).unwrap(),
            vendor_name: "Lista płac".to_string(),
            vendor_nip: "1111111111".to_string(),
            net_amount: dec!(10000),
            vat_amount: Decimal::ZERO,
            gross_amount: dec!(10000),
            currency: "PLN".to_string(),
            br_category: BrCategory::PersonnelEmployment,
            br_qualified: true,
            br_deduction_rate: 2.0,
            br_qualification_reason: Some(
                "Wynagrodzenie pracownika realizującego prace B+R".to_string(),
            ),
            status: DocumentStatus::Completed,
            document_id: None,
            document_filename: None,
        })
        .collect()
}

/// A single qualified material expense.
pub fn material_expense(id: &str, gross: Decimal) -> ExpenseRecord {
    ExpenseRecord {
        id: id.to_string(),
        invoice_number: format!("FV/{}/{id}", fiscal_year()),
        invoice_date: NaiveDate::from_ymd_opt(fiscal_year(), 3, 14).unwrap(),
        vendor_name: "Elektronika Lab Sp. z o.o.".to_string(),
        vendor_nip: "1111111111".to_string(),
        net_amount: (gross / dec!(1.23)).round_dp(2),
        vat_amount: (gross - gross / dec!(1.23)).round_dp(2),
        gross_amount: gross,
        currency: "PLN".to_string(),
        br_category: BrCategory::Materials,
        br_qualified: true,
        br_deduction_rate: 1.0,
        br_qualification_reason: Some("Podzespoły do budowy prototypu".to_string()),
        status: DocumentStatus::Completed,
        document_id: None,
        document_filename: None,
    }
}

/// A compliant daily time entry.
pub fn sample_time_entry(worker: &str, month: u32, day: u32, hours: f64) -> DailyTimeEntry {
    DailyTimeEntry {
        project_id: "p-1".to_string(),
        worker_id: worker.to_lowercase(),
        worker_name: worker.to_string(),
        work_date: NaiveDate::from_ymd_opt(fiscal_year(), month, day).unwrap(),
        time_slot: TimeSlot::Morning,
        hours,
        task_type: BrTaskType::Development,
        description: "Implementacja modułu analizy widmowej wraz z testami jednostkowymi \
                      i walidacją wyników na danych referencyjnych"
            .to_string(),
        git_commits: vec![],
    }
}

/// An IP-qualified revenue record.
pub fn sample_revenue(id: &str, gross: Decimal) -> RevenueRecord {
    RevenueRecord {
        id: id.to_string(),
        invoice_number: format!("FS/{}/{id}", fiscal_year()),
        invoice_date: NaiveDate::from_ymd_opt(fiscal_year(), 9, 1).unwrap(),
        client_name: "Klient Przemysłowy SA".to_string(),
        client_nip: Some("2222222222".to_string()),
        net_amount: (gross / dec!(1.23)).round_dp(2),
        gross_amount: gross,
        currency: "PLN".to_string(),
        ip_qualified: true,
        ip_description: Some("Licencja na oprogramowanie analityczne".to_string()),
        document_id: None,
    }
}
