//! Roll-ups over read-model rows feeding the document generator.
//!
//! Pure functions: inputs are never mutated, outputs are ordered where
//! the templates need stable iteration.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::BrCategory;
use crate::models::{DailyTimeEntry, ExpenseRecord, RevenueRecord};

/// Per-category expense roll-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub count: usize,
    pub gross: Decimal,
    pub deduction: Decimal,
}

/// Overall expense totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTotals {
    pub gross: Decimal,
    pub qualified_gross: Decimal,
    pub total_deduction: Decimal,
}

/// One row of the monthly timesheet breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyHours {
    pub year: i32,
    pub month: u32,
    pub worker_name: String,
    pub hours: f64,
}

/// One contractor roll-up row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorTotal {
    pub vendor_name: String,
    pub vendor_nip: String,
    pub total_amount: Decimal,
    pub invoice_count: usize,
}

/// Revenue totals for the monetisation section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueTotals {
    pub gross: Decimal,
    pub ip_qualified_gross: Decimal,
    pub invoice_count: usize,
}

/// Group qualified expenses by category.
pub fn by_category(expenses: &[ExpenseRecord]) -> BTreeMap<BrCategory, CategoryBreakdown> {
    let mut map: BTreeMap<BrCategory, CategoryBreakdown> = BTreeMap::new();
    for e in expenses.iter().filter(|e| e.br_qualified) {
        let entry = map.entry(e.br_category).or_default();
        entry.count += 1;
        entry.gross += e.gross_amount;
        entry.deduction += e.deduction_amount();
    }
    map
}

/// Overall gross / qualified-gross / deduction totals.
pub fn totals(expenses: &[ExpenseRecord]) -> ExpenseTotals {
    let mut t = ExpenseTotals::default();
    for e in expenses {
        t.gross += e.gross_amount;
        if e.br_qualified {
            t.qualified_gross += e.gross_amount;
            t.total_deduction += e.deduction_amount();
        }
    }
    t
}

/// Month-by-month hours per worker, ordered by (year, month, worker).
pub fn monthly_breakdown(entries: &[DailyTimeEntry]) -> Vec<MonthlyHours> {
    use chrono::Datelike;

    let mut map: BTreeMap<(i32, u32, String), f64> = BTreeMap::new();
    for e in entries {
        let key = (e.work_date.year(), e.work_date.month(), e.worker_name.clone());
        *map.entry(key).or_insert(0.0) += e.hours;
    }
    map.into_iter()
        .map(|((year, month, worker_name), hours)| MonthlyHours {
            year,
            month,
            worker_name,
            hours,
        })
        .collect()
}

/// Per-vendor invoice roll-up, ordered by descending total amount.
///
/// Self-issued invoices are excluded: a vendor whose digit-normalised
/// NIP equals `company_nip` is the reporting company itself.
pub fn contractor_rollup(expenses: &[ExpenseRecord], company_nip: &str) -> Vec<ContractorTotal> {
    let company_digits: String = company_nip.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut map: BTreeMap<(String, String), (Decimal, usize)> = BTreeMap::new();
    for e in expenses {
        if e.vendor_nip_digits() == company_digits {
            continue;
        }
        let key = (e.vendor_name.clone(), e.vendor_nip.clone());
        let entry = map.entry(key).or_insert((Decimal::ZERO, 0));
        entry.0 += e.gross_amount;
        entry.1 += 1;
    }

    let mut rows: Vec<ContractorTotal> = map
        .into_iter()
        .map(|((vendor_name, vendor_nip), (total_amount, invoice_count))| ContractorTotal {
            vendor_name,
            vendor_nip,
            total_amount,
            invoice_count,
        })
        .collect();
    rows.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    rows
}

/// Gross and IP-qualified revenue totals.
pub fn revenue_totals(revenues: &[RevenueRecord]) -> RevenueTotals {
    let mut t = RevenueTotals::default();
    for r in revenues {
        t.gross += r.gross_amount;
        if r.ip_qualified {
            t.ip_qualified_gross += r.gross_amount;
        }
        t.invoice_count += 1;
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{DocumentStatus, TimeSlot};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn expense(
        vendor: &str,
        nip: &str,
        gross: Decimal,
        category: BrCategory,
        qualified: bool,
    ) -> ExpenseRecord {
        ExpenseRecord {
            id: format!("{vendor}-{gross}"),
            invoice_number: "FV/1".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            vendor_name: vendor.to_string(),
            vendor_nip: nip.to_string(),
            net_amount: gross,
            vat_amount: Decimal::ZERO,
            gross_amount: gross,
            currency: "PLN".to_string(),
            br_category: category,
            br_qualified: qualified,
            br_deduction_rate: category.deduction_rate(),
            br_qualification_reason: None,
            status: DocumentStatus::Completed,
            document_id: None,
            document_filename: None,
        }
    }

    #[test]
    fn totals_sum_all_and_deduct_qualified() {
        let expenses = vec![
            expense("A", "1111111111", dec!(1000), BrCategory::Materials, true),
            expense("B", "2222222222", dec!(500), BrCategory::PersonnelEmployment, true),
            expense("C", "3333333333", dec!(200), BrCategory::Other, false),
        ];
        let t = totals(&expenses);
        assert_eq!(t.gross, dec!(1700));
        assert_eq!(t.qualified_gross, dec!(1500));
        // 1000 × 100% + 500 × 200%
        assert_eq!(t.total_deduction, dec!(2000.00));
    }

    #[test]
    fn category_breakdown_skips_unqualified() {
        let expenses = vec![
            expense("A", "1", dec!(1000), BrCategory::Materials, true),
            expense("B", "2", dec!(300), BrCategory::Materials, true),
            expense("C", "3", dec!(999), BrCategory::Materials, false),
        ];
        let map = by_category(&expenses);
        let m = &map[&BrCategory::Materials];
        assert_eq!(m.count, 2);
        assert_eq!(m.gross, dec!(1300));
    }

    #[test]
    fn contractor_rollup_excludes_own_nip() {
        let expenses = vec![
            expense("Obcy", "1111111111", dec!(100), BrCategory::Other, true),
            expense("Własna", "588-191-86-62", dec!(900), BrCategory::Other, true),
        ];
        let rows = contractor_rollup(&expenses, "5881918662");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vendor_name, "Obcy");
    }

    #[test]
    fn monthly_breakdown_orders_and_sums() {
        let mk = |day: u32, month: u32, worker: &str, hours: f64| DailyTimeEntry {
            project_id: "p".to_string(),
            worker_id: worker.to_string(),
            worker_name: worker.to_string(),
            work_date: NaiveDate::from_ymd_opt(2025, month, day).unwrap(),
            time_slot: TimeSlot::Morning,
            hours,
            task_type: crate::enums::BrTaskType::Development,
            description: String::new(),
            git_commits: vec![],
        };
        let rows = monthly_breakdown(&[
            mk(3, 2, "Anna", 4.0),
            mk(4, 2, "Anna", 4.0),
            mk(1, 1, "Jan", 8.0),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, 1);
        assert_eq!(rows[0].worker_name, "Jan");
        assert_eq!(rows[1].hours, 8.0);
    }
}
