//! Annual report templates.

use brdoc_core::enums::{DocumentCategory, TimeScope};

use crate::registry::{DocumentTemplate, TemplateDataRequirement};

pub fn br_annual_summary() -> DocumentTemplate {
    DocumentTemplate {
        id: "br_annual_summary".to_string(),
        name: "Roczne Podsumowanie B+R".to_string(),
        description: "Kompleksowe roczne zestawienie działalności B+R dla celów podatkowych"
            .to_string(),
        category: DocumentCategory::Report,
        time_scope: TimeScope::Yearly,
        data_requirements: vec![
            TemplateDataRequirement::new("project_info", &["project_id"])
                .with_description("Informacje o projekcie"),
            TemplateDataRequirement::new("expenses_by_category", &["project_id"])
                .with_optional(&["year"])
                .with_description("Wydatki według kategorii"),
            TemplateDataRequirement::new("timesheet_summary", &["project_id"])
                .with_optional(&["year"])
                .with_description("Godziny pracy miesięcznie"),
            TemplateDataRequirement::new("revenues", &["project_id"])
                .with_optional(&["year"])
                .with_description("Przychody"),
            TemplateDataRequirement::new("nexus_calculation", &["project_id"])
                .with_optional(&["year"])
                .with_description("Wskaźnik Nexus"),
        ],
        body: r#"# ROCZNE PODSUMOWANIE DZIAŁALNOŚCI B+R

## Informacje ogólne

| Pole | Wartość |
|------|---------|
| **Projekt** | {{project.name}} |
| **Kod** | {{project.code}} |
| **Rok podatkowy** | {{year}} |
| **Firma** | {{project.company_name}} |
| **NIP** | {{project.company_nip}} |
| **Data sporządzenia** | {{generated_date}} |

---

## 1. Koszty kwalifikowane B+R

### 1.1 Zestawienie według kategorii

| Kategoria | Liczba | Kwota brutto | Kwalifikowane |
|-----------|--------|--------------|---------------|
{% for cat in expenses_by_category %}| {{cat.category_name}} | {{cat.count}} | {{cat.total_gross|format_currency}} | {{cat.qualified_amount|format_currency}} |
{% endfor %}{% if not expenses_by_category %}| *(Brak wydatków)* | 0 | 0,00 zł | 0,00 zł |
{% endif %}| **RAZEM** | | **{{total_gross|format_currency}}** | **{{total_qualified|format_currency}}** |

### 1.2 Ulga B+R

**Kwota ulgi do odliczenia (art. 18d CIT): {{total_deduction|format_currency}}**

---

## 2. Ewidencja czasu pracy

| Pracownik | Łączne godziny B+R |
|-----------|-------------------|
{% for entry in timesheet %}| {{entry.worker_name}} | {{entry.total_hours}} h |
{% endfor %}{% if not timesheet %}| *(Brak danych)* | 0 h |
{% endif %}| **RAZEM** | **{{total_hours}} h** |

---

## 3. Przychody z IP (IP Box)

| Data | Opis | Kwota | Kwalif. IP Box |
|------|------|-------|----------------|
{% for rev in revenues %}| {{rev.invoice_date|format_date}} | {{rev.ip_description}} | {{rev.gross_amount|format_currency}} | {% if rev.ip_qualified %}✓{% else %}✗{% endif %} |
{% endfor %}{% if not revenues %}| - | Brak przychodów w tym okresie | 0,00 zł | - |
{% endif %}| **RAZEM** | | **{{total_revenue|format_currency}}** | |

---

## 4. Wskaźnik Nexus

| Składnik | Wartość |
|----------|---------|
| a (bezpośrednie) | {{nexus.a_direct|format_currency}} |
| b (niepowiązane) | {{nexus.b_unrelated|format_currency}} |
| c (powiązane) | {{nexus.c_related|format_currency}} |
| d (zakup IP) | {{nexus.d_ip|format_currency}} |

Nexus: {{nexus.nexus|round(4)}}

---

## 5. Podsumowanie podatkowe

| Ulga/Preferencja | Wartość |
|------------------|---------|
| Ulga B+R (art. 18d CIT) | {{total_deduction|format_currency}} |
| Dochód kwalifikowany IP Box | {{qualified_income|format_currency}} |
| Oszczędność podatkowa IP Box | {{ip_box_savings|format_currency}} |

---

*Dokument wygenerowany automatycznie. Wymaga weryfikacji przez doradcę podatkowego.*
"#
        .to_string(),
        demo_body: None,
        model_prompt: Some(
            "Wygeneruj kompleksowe roczne podsumowanie działalności B+R.\nDokument powinien \
             zawierać:\n1. Pełne zestawienie kosztów kwalifikowanych według kategorii\n2. \
             Miesięczne rozbicie godzin pracy dla każdego pracownika\n3. Przychody z IP z \
             oznaczeniem kwalifikacji IP Box\n4. Obliczenie wskaźnika Nexus\n5. Podsumowanie \
             korzyści podatkowych\n\nUżyj profesjonalnego języka. Wszystkie kwoty w PLN z \
             formatowaniem."
                .to_string(),
        ),
        output_format: "markdown".to_string(),
        version: "1.0".to_string(),
        strict: false,
    }
}
