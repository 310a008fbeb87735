//! Project summary documentation: the comprehensive B+R dossier with
//! cost, timesheet, contractor, and monetisation sections.

use chrono::Utc;
use rust_decimal::Decimal;

use brdoc_core::format::{format_nip, format_pln, month_name_pl};
use brdoc_core::models::{DailyTimeEntry, ExpenseRecord, ProjectInput, RevenueRecord};
use brdoc_core::summary::{self, ContractorTotal, MonthlyHours};

use crate::expense_doc::iteration_number;

fn doc_link(document_id: Option<&str>, filename: Option<&str>) -> String {
    match document_id {
        Some(id) => format!("[{}](/api/documents/{id}/file)", filename.unwrap_or("Dokument")),
        None => "Brak dokumentu".to_string(),
    }
}

fn expense_details(expenses: &[ExpenseRecord], company_nip: &str) -> String {
    let company_digits: String = company_nip.chars().filter(|c| c.is_ascii_digit()).collect();
    let cost_expenses: Vec<&ExpenseRecord> = expenses
        .iter()
        .filter(|e| e.vendor_nip_digits() != company_digits)
        .collect();

    if cost_expenses.is_empty() {
        return "Brak wydatków kosztowych do udokumentowania.\n".to_string();
    }

    let mut out = String::new();
    for (i, e) in cost_expenses.iter().enumerate() {
        let iteration = iteration_number(&e.id);
        let status = if e.br_qualified {
            "✓ Kwalifikowany"
        } else {
            "Oczekuje na klasyfikację"
        };
        let reason = e.br_qualification_reason.as_deref().unwrap_or(
            "Wydatek związany z realizacją prac badawczo-rozwojowych w ramach projektu. \
             Stanowi koszt niezbędny do przeprowadzenia eksperymentów i testów prototypowych \
             rozwiązań.",
        );

        out.push_str(&format!(
            "\n### Iteracja #{iteration} - Wydatek {nr}\n\n\
             | Parametr | Wartość |\n|----------|---------|\n\
             | Nr faktury | {invoice} |\n\
             | Data | {date} |\n\
             | Dostawca | {vendor} |\n\
             | NIP dostawcy | {nip} |\n\
             | Kwota netto | {net} |\n\
             | VAT | {vat} |\n\
             | Kwota brutto | {gross} |\n\
             | Kategoria B+R | {category} |\n\
             | Status kwalifikacji | {status} |\n\
             | Stawka odliczenia | {rate}% |\n\
             | Kwota odliczenia | {deduction} |\n\
             | Dokument źródłowy | {link} |\n\n\
             **Uzasadnienie kwalifikacji B+R:**\n\n{reason}\n\n\
             ---\n",
            nr = i + 1,
            invoice = e.invoice_number,
            date = e.invoice_date.format("%Y-%m-%d"),
            vendor = e.vendor_name,
            nip = format_nip(&e.vendor_nip),
            net = format_pln(e.net_amount),
            vat = format_pln(e.vat_amount),
            gross = format_pln(e.gross_amount),
            category = e.br_category.display_name_pl(),
            rate = (e.br_deduction_rate * 100.0) as u32,
            deduction = format_pln(e.deduction_amount()),
            link = doc_link(e.document_id.as_deref(), e.document_filename.as_deref()),
        ));
    }
    out
}

fn timesheet_section(entries: &[DailyTimeEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let monthly = summary::monthly_breakdown(entries);
    let total_hours: f64 = monthly.iter().map(|m| m.hours).sum();

    // Per-worker totals, ordered by name.
    let mut by_worker: std::collections::BTreeMap<&str, f64> = Default::default();
    for row in &monthly {
        *by_worker.entry(row.worker_name.as_str()).or_default() += row.hours;
    }

    let mut out = format!(
        "\n## 7. Ewidencja czasu pracy\n\n\
         | Parametr | Wartość |\n|----------|---------|\n\
         | Łączna liczba godzin | {total_hours} h |\n\n\
         ### 7.1 Podział godzin według pracowników:\n\n\
         | Pracownik | Godziny |\n|-----------|---------|\n"
    );
    for (worker, hours) in &by_worker {
        out.push_str(&format!("| {worker} | {hours} h |\n"));
    }

    out.push_str("\n### 7.2 Rozbicie miesięczne godzin:\n\n");
    out.push_str("| Miesiąc | Pracownik | Godziny |\n|---------|-----------|--------|\n");
    for MonthlyHours {
        year,
        month,
        worker_name,
        hours,
    } in &monthly
    {
        out.push_str(&format!(
            "| {} {year} | {worker_name} | {hours} h |\n",
            month_name_pl(*month)
        ));
    }
    out
}

fn contractors_section(contractors: &[ContractorTotal]) -> String {
    if contractors.is_empty() {
        return String::new();
    }
    let mut out = String::from(
        "\n## 8. Kooperanci i dostawcy (faktury kosztowe)\n\n\
         | Nazwa | NIP | Kwota | Liczba faktur |\n|-------|-----|-------|---------------|\n",
    );
    for c in contractors {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            c.vendor_name,
            format_nip(&c.vendor_nip),
            format_pln(c.total_amount),
            c.invoice_count,
        ));
    }
    out
}

fn revenues_section(revenues: &[RevenueRecord], total_gross: Decimal) -> (String, Decimal) {
    if revenues.is_empty() {
        return (String::new(), Decimal::ZERO);
    }
    let totals = summary::revenue_totals(revenues);

    let mut out = String::from(
        "\n## 9. Monetyzacja projektu B+R (faktury przychodowe)\n\n\
         Poniższa sekcja dokumentuje przychody z komercjalizacji wyników projektu B+R.\n\n\
         | Data | Nr faktury | Klient | Kwota | Opis |\n\
         |------|------------|--------|-------|------|\n",
    );
    for r in revenues {
        let description: String = r
            .ip_description
            .as_deref()
            .unwrap_or("Usługi B+R")
            .chars()
            .take(30)
            .collect();
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            r.invoice_date.format("%Y-%m-%d"),
            r.invoice_number,
            r.client_name,
            format_pln(r.gross_amount),
            description,
        ));
    }

    let balance = totals.gross - total_gross;
    out.push_str(&format!(
        "\n**Łączne przychody z projektu B+R:** {}\n\n\
         ### Analiza rentowności projektu\n\n\
         | Wskaźnik | Wartość |\n|----------|---------|\n\
         | Koszty projektu | {} |\n\
         | Przychody projektu | {} |\n\
         | Bilans projektu | {} |\n",
        format_pln(totals.gross),
        format_pln(total_gross),
        format_pln(totals.gross),
        format_pln(balance),
    ));
    (out, totals.gross)
}

/// Deterministic comprehensive project summary.
pub fn summary_document(
    project: &ProjectInput,
    expenses: &[ExpenseRecord],
    time_entries: &[DailyTimeEntry],
    revenues: &[RevenueRecord],
) -> String {
    let doc_date = Utc::now().format("%Y-%m-%d").to_string();
    let totals = summary::totals(expenses);
    let by_category = summary::by_category(expenses);
    let contractors = summary::contractor_rollup(expenses, &project.company_nip);

    let mut category_rows = String::new();
    let mut category_count = 0usize;
    for (category, data) in &by_category {
        category_rows.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            category.display_name_pl(),
            data.count,
            format_pln(data.gross),
            format_pln(data.deduction),
        ));
        category_count += data.count;
    }

    let details = expense_details(expenses, &project.company_nip);
    let timesheet = timesheet_section(time_entries);
    let contractors_md = contractors_section(&contractors);
    let (revenues_md, total_revenue) = revenues_section(revenues, totals.gross);

    format!(
        "# Dokumentacja Projektu B+R: {project_name}\n\n\
         **Kod projektu:** {code}\n\
         **Rok podatkowy:** {fiscal_year}\n\
         **Data sporządzenia:** {doc_date}\n\
         **Firma:** {company}\n\
         **NIP:** {nip}\n\n\
         ---\n\n\
         ## Streszczenie Wykonawcze\n\n\
         Niniejsza dokumentacja przedstawia kompleksowe podsumowanie projektu \
         badawczo-rozwojowego realizowanego w roku podatkowym {fiscal_year}. Projekt spełnia \
         kryteria działalności B+R określone w art. 4a pkt 26-28 ustawy o CIT: \
         systematyczność, twórczość i innowacyjność.\n\n\
         | Parametr | Wartość |\n|----------|---------|\n\
         | Całkowite koszty projektu | {total_gross} |\n\
         | Koszty kwalifikowane B+R | {total_qualified} |\n\
         | Kwota odliczenia podatkowego | {total_deduction} |\n\
         | Przychody z komercjalizacji | {total_revenue} |\n\n\
         ---\n\n\
         ## 1. Opis projektu\n\n\
         ### 1.1 Cel projektu\n\n\
         {description}\n\n\
         ### 1.2 Innowacyjność rozwiązania\n\n\
         Projekt charakteryzuje się następującymi elementami innowacyjności:\n\
         - Rozwój nowych technologii i metod\n\
         - Testowanie prototypowych rozwiązań\n\
         - Dokumentacja doświadczeń i wniosków z eksperymentów\n\n\
         ## 2. Metodologia badawcza\n\n\
         ### 2.1 Systematyczność\n\n\
         Projekt realizowany zgodnie z przyjętym harmonogramem i metodyką, z regularnymi \
         przeglądami postępów i dokumentacją wyników każdej iteracji.\n\n\
         ### 2.2 Twórczość\n\n\
         Prace projektowe miały charakter twórczy - oparte na oryginalnych koncepcjach \
         i kreatywnym podejściu do rozwiązywania problemów technologicznych.\n\n\
         ### 2.3 Element niepewności\n\n\
         W projekcie występował element niepewności co do osiągnięcia zakładanych rezultatów, \
         co jest cechą charakterystyczną działalności badawczo-rozwojowej.\n\n\
         ## 3. Podsumowanie kosztów\n\n\
         ### 3.1 Zestawienie ogólne\n\n\
         | Parametr | Wartość |\n|----------|---------|\n\
         | Liczba wszystkich wydatków | {expense_count} |\n\
         | Liczba wydatków kwalifikowanych B+R | {qualified_count} |\n\
         | Suma wszystkich wydatków | {total_gross} |\n\
         | Suma wydatków kwalifikowanych | {total_qualified} |\n\
         | **Całkowita kwota odliczenia B+R** | **{total_deduction}** |\n\n\
         ### 3.2 Podział według kategorii kosztów kwalifikowanych\n\n\
         | Kategoria | Liczba | Kwota | Odliczenie |\n\
         |-----------|--------|-------|------------|\n\
         {category_rows}\
         | **RAZEM** | **{category_count}** | **{total_qualified}** | **{total_deduction}** |\n\n\
         ## 4. Podstawa prawna\n\n\
         Dokumentacja sporządzona zgodnie z wymogami:\n\
         - Art. 18d ustawy z dnia 15 lutego 1992 r. o podatku dochodowym od osób prawnych\n\
         - Art. 26e ustawy z dnia 26 lipca 1991 r. o podatku dochodowym od osób fizycznych\n\n\
         ### Stawki odliczenia kosztów kwalifikowanych:\n\n\
         | Kategoria | Stawka | Podstawa prawna |\n\
         |-----------|--------|------------------|\n\
         | Wynagrodzenia (umowa o pracę) | 200% | art. 18d ust. 2 pkt 1 |\n\
         | Umowy cywilnoprawne | 200% | art. 18d ust. 2 pkt 1a |\n\
         | Materiały i surowce | 100% | art. 18d ust. 2 pkt 2 |\n\
         | Ekspertyzy i usługi | 100% | art. 18d ust. 2 pkt 3 |\n\
         | Amortyzacja | 100% | art. 18d ust. 3 |\n\n\
         ## 5. Szczegółowa dokumentacja wydatków\n\n\
         Każdy wydatek stanowi odrębną iterację w projekcie B+R, dokumentując postęp prac:\n\
         {details}{timesheet}{contractors_md}{revenues_md}\n\
         ## 10. Oświadczenie\n\n\
         Oświadczam, że:\n\
         1. Wydatki ujęte w dokumentacji zostały faktycznie poniesione w roku podatkowym \
         {fiscal_year}\n\
         2. Wydatki są bezpośrednio związane z prowadzoną działalnością badawczo-rozwojową\n\
         3. Dokumentacja odzwierciedla rzeczywisty przebieg prac B+R\n\
         4. Projekt spełnia kryteria systematyczności, twórczości i innowacyjności\n\n\
         ---\n\n\
         *Dokumentacja wygenerowana automatycznie przez System B+R*\n\
         *Data: {doc_date}*\n\
         *Wersja dokumentu: 1.0*\n",
        project_name = project.name,
        code = project.code,
        fiscal_year = project.fiscal_year,
        company = project.company_name,
        nip = format_nip(&project.company_nip),
        total_gross = format_pln(totals.gross),
        total_qualified = format_pln(totals.qualified_gross),
        total_deduction = format_pln(totals.total_deduction),
        total_revenue = format_pln(total_revenue),
        description = project.description,
        expense_count = expenses.len(),
        qualified_count = expenses.iter().filter(|e| e.br_qualified).count(),
    )
}
