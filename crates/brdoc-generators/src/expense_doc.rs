//! Single-expense documentation: prompt building and the deterministic
//! template fallback with the Polish invoice table and OCR excerpt.

use chrono::Utc;
use rust_decimal::prelude::*;

use brdoc_core::format::format_date;
use brdoc_core::models::{ExpenseRecord, ExtractedInvoice, ProjectInput};

/// Stable per-expense iteration number derived from the expense id.
pub fn iteration_number(expense_id: &str) -> u32 {
    let mut hash: u32 = 5381;
    for byte in expense_id.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u32);
    }
    hash % 1000 + 1
}

fn short_id(id: &str) -> &str {
    let mut end = id.len().min(8);
    while !id.is_char_boundary(end) {
        end -= 1;
    }
    &id[..end]
}

/// Build the model prompt for a single-expense document.
pub fn build_expense_prompt(
    expense: &ExpenseRecord,
    project: &ProjectInput,
    document: Option<&ExtractedInvoice>,
) -> String {
    let deduction = expense.gross_amount
        * Decimal::from_f64(expense.br_deduction_rate).unwrap_or(Decimal::ONE);

    let ocr_part = document
        .filter(|d| !d.ocr_text.is_empty())
        .map(|d| format!("\nOPIS Z DOKUMENTU: {}...\n", d.excerpt()))
        .unwrap_or_default();

    format!(
        "Wygeneruj dokumentację B+R dla poniższego wydatku:\n\n\
         DANE PROJEKTU:\n\
         - Nazwa projektu: {project_name}\n\
         - Rok podatkowy: {fiscal_year}\n\
         - Firma: {company}\n\n\
         DANE WYDATKU:\n\
         - Nr faktury: {invoice_number}\n\
         - Data faktury: {invoice_date}\n\
         - Dostawca: {vendor}\n\
         - NIP dostawcy: {vendor_nip}\n\
         - Kwota brutto: {gross} {currency}\n\
         - Kwota netto: {net} {currency}\n\
         - VAT: {vat} {currency}\n\n\
         KLASYFIKACJA B+R:\n\
         - Kategoria: {category}\n\
         - Kwalifikowany: {qualified}\n\
         - Stawka odliczenia: {rate}%\n\
         - Kwota odliczenia: {deduction:.2} PLN\n\
         - Uzasadnienie: {reason}\n\
         {ocr_part}\n\
         Wygeneruj profesjonalną dokumentację B+R w formacie Markdown zawierającą:\n\
         1. Nagłówek z numerem dokumentu i datą\n\
         2. Identyfikację wydatku\n\
         3. Związek z działalnością B+R projektu\n\
         4. Uzasadnienie kategorii kosztów\n\
         5. Kalkulację odliczenia\n\
         6. Podsumowanie\n\n\
         Format: Markdown z nagłówkami H1, H2, H3",
        project_name = project.name,
        fiscal_year = project.fiscal_year,
        company = project.company_name,
        invoice_number = expense.invoice_number,
        invoice_date = format_date(expense.invoice_date),
        vendor = expense.vendor_name,
        vendor_nip = expense.vendor_nip,
        gross = expense.gross_amount,
        net = expense.net_amount,
        vat = expense.vat_amount,
        currency = expense.currency,
        category = expense.br_category.display_name_with_rate_pl(),
        qualified = if expense.br_qualified { "Tak" } else { "Nie" },
        rate = (expense.br_deduction_rate * 100.0) as u32,
        reason = expense
            .br_qualification_reason
            .as_deref()
            .unwrap_or("Brak"),
    )
}

/// Deterministic single-expense document (the guaranteed fallback path).
pub fn expense_document(
    expense: &ExpenseRecord,
    project: &ProjectInput,
    document: Option<&ExtractedInvoice>,
) -> String {
    let rate_pct = (expense.br_deduction_rate * 100.0) as u32;
    let deduction = (expense.gross_amount
        * Decimal::from_f64(expense.br_deduction_rate).unwrap_or(Decimal::ONE))
    .round_dp(2);
    let doc_date = Utc::now().format("%Y-%m-%d").to_string();
    let iteration = iteration_number(&expense.id);
    let vat_pct = if expense.net_amount > Decimal::ZERO {
        ((expense.vat_amount / expense.net_amount) * Decimal::from(100))
            .round()
            .to_u32()
            .unwrap_or(23)
    } else {
        23
    };

    let ocr_section = document
        .map(|d| {
            format!(
                "\n## 6. Dane źródłowe dokumentu\n\n\
                 ### Wyniki przetwarzania OCR\n\n\
                 | Parametr | Wartość |\n|----------|---------|\n\
                 | Nazwa pliku | {filename} |\n\
                 | Typ dokumentu | {doc_type} |\n\
                 | Pewność OCR | {confidence:.1}% |\n\n\
                 ### Fragment rozpoznanego tekstu\n\n\
                 ```\n{excerpt}\n```\n",
                filename = d.filename,
                doc_type = d.document_type,
                confidence = d.confidence_percent(),
                excerpt = d.excerpt(),
            )
        })
        .unwrap_or_default();

    let reason = expense.br_qualification_reason.as_deref().unwrap_or(
        "Wydatek został zakwalifikowany jako koszt kwalifikowany w ramach działalności \
         badawczo-rozwojowej na podstawie związku z realizowanym projektem B+R.",
    );

    format!(
        "# Dokumentacja Wydatku B+R - Iteracja #{iteration}\n\n\
         **Nr dokumentu:** BR-{id8}\n\
         **Data sporządzenia:** {doc_date}\n\
         **Wersja:** 1.0\n\n\
         ---\n\n\
         ## 1. Identyfikacja wydatku\n\n\
         | Parametr | Wartość |\n|----------|---------|\n\
         | Nr faktury | {invoice_number} |\n\
         | Data faktury | {invoice_date} |\n\
         | Dostawca | {vendor} |\n\
         | NIP dostawcy | {vendor_nip} |\n\
         | Kwota brutto | {gross:.2} {currency} |\n\
         | Kwota netto | {net:.2} {currency} |\n\
         | VAT | {vat:.2} {currency} |\n\n\
         ## 2. Powiązanie z projektem B+R\n\n\
         **Projekt:** {project_name}\n\
         **Rok podatkowy:** {fiscal_year}\n\n\
         Niniejszy wydatek stanowi iterację #{iteration} w ramach projektu \
         badawczo-rozwojowego i dokumentuje postęp prac nad innowacyjnymi rozwiązaniami.\n\n\
         ## 3. Opis prac badawczo-rozwojowych\n\n\
         ### Cel iteracji\n\n\
         W ramach tej iteracji projektu przeprowadzono prace związane z:\n\
         - Testowaniem nowych rozwiązań technologicznych\n\
         - Weryfikacją hipotez badawczych\n\
         - Dokumentacją wyników eksperymentów\n\n\
         ### Metodologia\n\n\
         Prace prowadzono zgodnie z metodyką badawczo-rozwojową obejmującą:\n\
         1. Planowanie eksperymentu\n\
         2. Realizację testów\n\
         3. Analizę wyników\n\
         4. Dokumentację wniosków\n\n\
         ## 4. Klasyfikacja kosztów B+R\n\n\
         **Kategoria:** {category}\n\n\
         ### Uzasadnienie klasyfikacji\n\n\
         {reason}\n\n\
         ## 5. Kalkulacja odliczenia\n\n\
         | Element | Wartość | Obliczenie |\n|---------|---------|------------|\n\
         | Kwota brutto | {gross:.2} PLN | - |\n\
         | Kwota netto | {net:.2} PLN | - |\n\
         | VAT ({vat_pct}%) | {vat:.2} PLN | {net:.2} × {vat_pct}% |\n\
         | Kwota kwalifikowana | {gross:.2} PLN | kwota brutto |\n\
         | Stawka odliczenia | {rate_pct}% | art. 18d CIT |\n\
         | **Odliczenie B+R** | **{deduction:.2} PLN** | {gross:.2} × {rate_pct}% |\n\
         {ocr_section}\n\
         ## 7. Podsumowanie\n\n\
         Wydatek stanowi część iteracji #{iteration} projektu B+R i kwalifikuje się do \
         odliczenia zgodnie z art. 18d ustawy o CIT. Dokumentacja potwierdza związek wydatku \
         z działalnością badawczo-rozwojową oraz prawidłowość kalkulacji.\n\n\
         **Całkowita kwota do odliczenia: {deduction:.2} PLN**\n\n\
         ---\n\n\
         *Dokumentacja wygenerowana automatycznie przez System B+R*\n\
         *Data: {doc_date} | Iteracja: #{iteration}*\n",
        id8 = short_id(&expense.id),
        invoice_number = expense.invoice_number,
        invoice_date = format_date(expense.invoice_date),
        vendor = expense.vendor_name,
        vendor_nip = expense.vendor_nip,
        gross = expense.gross_amount,
        net = expense.net_amount,
        vat = expense.vat_amount,
        currency = expense.currency,
        project_name = project.name,
        fiscal_year = project.fiscal_year,
        category = expense.br_category.display_name_pl(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use brdoc_core::enums::{BrCategory, DocumentStatus, InnovationScope, InnovationType};
    use brdoc_core::models::DocumentationConfig;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn project() -> ProjectInput {
        ProjectInput {
            name: "System pomiarowy".to_string(),
            code: "BR-2025-001".to_string(),
            fiscal_year: 2025,
            company_name: "Softreck".to_string(),
            company_nip: "5881918662".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            milestones: vec![],
            innovation_type: InnovationType::Product,
            innovation_scope: InnovationScope::Company,
            description: "Opis projektu".to_string(),
            technical_problem: None,
            methodology: None,
            risk_analysis: None,
            research_methods: vec![],
            risk_factors: vec![],
            costs: vec![],
            total_costs: dec!(0),
            documentation: DocumentationConfig::default(),
        }
    }

    fn expense() -> ExpenseRecord {
        ExpenseRecord {
            id: "abc12345-6789".to_string(),
            invoice_number: "FV/2025/042".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            vendor_name: "Elektronika Lab".to_string(),
            vendor_nip: "1111111111".to_string(),
            net_amount: dec!(1000.00),
            vat_amount: dec!(230.00),
            gross_amount: dec!(1230.00),
            currency: "PLN".to_string(),
            br_category: BrCategory::Materials,
            br_qualified: true,
            br_deduction_rate: 1.0,
            br_qualification_reason: Some("Podzespoły do prototypu".to_string()),
            status: DocumentStatus::Completed,
            document_id: None,
            document_filename: None,
        }
    }

    #[test]
    fn iteration_number_is_stable_and_bounded() {
        let a = iteration_number("abc");
        assert_eq!(a, iteration_number("abc"));
        assert!((1..=1000).contains(&a));
        assert_ne!(iteration_number("abc"), iteration_number("abd"));
    }

    #[test]
    fn fallback_document_has_all_sections() {
        let doc = expense_document(&expense(), &project(), None);
        assert!(doc.starts_with("# Dokumentacja Wydatku B+R"));
        assert!(doc.contains("## 1. Identyfikacja wydatku"));
        assert!(doc.contains("## 5. Kalkulacja odliczenia"));
        assert!(doc.contains("FV/2025/042"));
        assert!(doc.contains("1230.00 PLN"));
        assert!(doc.contains("art. 18d"));
        assert!(!doc.contains("## 6."));
    }

    #[test]
    fn ocr_excerpt_is_included_when_present() {
        let invoice = ExtractedInvoice {
            filename: "fv_042.pdf".to_string(),
            document_type: "invoice".to_string(),
            ocr_status: DocumentStatus::Completed,
            ocr_confidence: 0.912,
            ocr_text: "FAKTURA VAT nr FV/2025/042 ".repeat(30),
            invoice_number: None,
            invoice_date: None,
            vendor_nip: None,
            gross_amount: None,
        };
        let doc = expense_document(&expense(), &project(), Some(&invoice));
        assert!(doc.contains("## 6. Dane źródłowe dokumentu"));
        assert!(doc.contains("91.2%"));
        // Excerpt is capped at 500 characters.
        let fence = doc.split("```").nth(1).unwrap();
        assert!(fence.len() <= 510);
    }

    #[test]
    fn prompt_mentions_classification_and_amounts() {
        let prompt = build_expense_prompt(&expense(), &project(), None);
        assert!(prompt.contains("Materiały i surowce - 100%"));
        assert!(prompt.contains("Kwota odliczenia: 1230.00 PLN"));
        assert!(prompt.contains("Stawka odliczenia: 100%"));
    }
}
