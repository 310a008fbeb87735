//! Read-model rows consumed by the generator: expenses, revenues, and
//! the extracted-invoice shape produced by OCR ingestion.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{BrCategory, DocumentStatus};

/// An expense row as consumed from the read model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub vendor_name: String,
    pub vendor_nip: String,
    pub net_amount: Decimal,
    pub vat_amount: Decimal,
    pub gross_amount: Decimal,
    pub currency: String,
    pub br_category: BrCategory,
    pub br_qualified: bool,
    /// Statutory multiplier applied to the gross amount (2.0 = 200%).
    pub br_deduction_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub br_qualification_reason: Option<String>,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_filename: Option<String>,
}

impl ExpenseRecord {
    /// Deduction amount for this expense (`gross × rate`), zero when not
    /// qualified.
    pub fn deduction_amount(&self) -> Decimal {
        if !self.br_qualified {
            return Decimal::ZERO;
        }
        let rate = Decimal::from_f64(self.br_deduction_rate).unwrap_or(Decimal::ONE);
        (self.gross_amount * rate).round_dp(2)
    }

    /// Vendor NIP reduced to digits, for identity comparisons.
    pub fn vendor_nip_digits(&self) -> String {
        self.vendor_nip
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect()
    }
}

/// A revenue row (IP Box monetisation) from the read model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueRecord {
    pub id: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub client_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_nip: Option<String>,
    pub net_amount: Decimal,
    pub gross_amount: Decimal,
    pub currency: String,
    pub ip_qualified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

/// Invoice data extracted by the OCR pipeline.
///
/// Only the shape is specified here; ingestion itself is an external
/// collaborator. The generator consumes the first 500 characters of
/// `ocr_text` and the confidence rounded to one decimal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    pub filename: String,
    pub document_type: String,
    pub ocr_status: DocumentStatus,
    /// Recognition confidence in [0, 1].
    pub ocr_confidence: f64,
    pub ocr_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_nip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_amount: Option<Decimal>,
}

impl ExtractedInvoice {
    /// OCR excerpt included in generated documents (first 500 chars).
    pub fn excerpt(&self) -> &str {
        let mut end = self.ocr_text.len().min(500);
        while !self.ocr_text.is_char_boundary(end) {
            end -= 1;
        }
        &self.ocr_text[..end]
    }

    /// Confidence as a percentage rounded to one decimal.
    pub fn confidence_percent(&self) -> f64 {
        (self.ocr_confidence * 1000.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn expense(gross: Decimal, rate: f64, qualified: bool) -> ExpenseRecord {
        ExpenseRecord {
            id: "e-1".to_string(),
            invoice_number: "FV/2025/001".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            vendor_name: "Dostawca".to_string(),
            vendor_nip: "588-191-86-62".to_string(),
            net_amount: gross / dec!(1.23),
            vat_amount: gross - gross / dec!(1.23),
            gross_amount: gross,
            currency: "PLN".to_string(),
            br_category: BrCategory::Materials,
            br_qualified: qualified,
            br_deduction_rate: rate,
            br_qualification_reason: None,
            status: DocumentStatus::Completed,
            document_id: None,
            document_filename: None,
        }
    }

    #[test]
    fn deduction_respects_rate_and_qualification() {
        assert_eq!(expense(dec!(1000), 1.0, true).deduction_amount(), dec!(1000.00));
        assert_eq!(expense(dec!(1000), 2.0, true).deduction_amount(), dec!(2000.00));
        assert_eq!(expense(dec!(1000), 2.0, false).deduction_amount(), dec!(0));
    }

    #[test]
    fn nip_digit_normalisation() {
        assert_eq!(expense(dec!(1), 1.0, true).vendor_nip_digits(), "5881918662");
    }

    #[test]
    fn ocr_excerpt_is_bounded() {
        let invoice = ExtractedInvoice {
            filename: "fv.pdf".to_string(),
            document_type: "invoice".to_string(),
            ocr_status: DocumentStatus::Completed,
            ocr_confidence: 0.876,
            ocr_text: "ż".repeat(600),
            invoice_number: None,
            invoice_date: None,
            vendor_nip: None,
            gross_amount: None,
        };
        assert!(invoice.excerpt().len() <= 500);
        assert!(invoice.excerpt().chars().all(|c| c == 'ż'));
        assert_eq!(invoice.confidence_percent(), 87.6);
    }
}
