//! Financial documentation templates.

use brdoc_core::enums::{DocumentCategory, TimeScope};

use crate::registry::{DocumentTemplate, TemplateDataRequirement};

pub fn expense_registry() -> DocumentTemplate {
    DocumentTemplate {
        id: "expense_registry".to_string(),
        name: "Ewidencja Wydatków B+R".to_string(),
        description: "Szczegółowy rejestr wydatków kwalifikowanych do ulgi B+R".to_string(),
        category: DocumentCategory::Financial,
        time_scope: TimeScope::Monthly,
        data_requirements: vec![
            TemplateDataRequirement::new("project_info", &["project_id"])
                .with_description("Informacje o projekcie"),
            TemplateDataRequirement::new("expenses_summary", &["project_id"])
                .with_optional(&["year", "month"])
                .with_description("Lista wydatków"),
        ],
        body: r#"# EWIDENCJA WYDATKÓW B+R

**Projekt:** {{project.name}} ({{project.code}})

**Okres:** {% if month_name %}{{month_name}} {% endif %}{{year}}

## Lista wydatków

| Nr | Data | Dostawca | Nr faktury | Kwota brutto | Kwalif. B+R | Uzasadnienie |
|----|------|----------|------------|--------------|-------------|--------------|
{% for exp in expenses %}| {{loop.index}} | {{exp.invoice_date|format_date}} | {{exp.vendor_name}} | {{exp.invoice_number}} | {{exp.gross_amount|format_currency}} | {% if exp.br_qualified %}✓{% else %}✗{% endif %} | {{exp.br_qualification_reason}} |
{% endfor %}{% if not expenses %}| - | - | - | - | - | - | - |
{% endif %}
---

## PODSUMOWANIE

| Metryka | Wartość |
|---------|---------|
| Liczba wydatków | {{expense_count}} |
| Suma brutto | {{total_gross|format_currency}} |
| Suma netto | {{total_net|format_currency}} |
| Kwalifikowane B+R | {{total_qualified|format_currency}} |
| Kwota odliczenia (art. 18d CIT) | {{total_deduction|format_currency}} |

---

Sporządził: _________________________

Data: {{generated_date}}
"#
        .to_string(),
        demo_body: Some(
            r#"# EWIDENCJA WYDATKÓW B+R

**Projekt:** System automatyzacji procesów B+R (BR-2025-001)

**Okres:** 2025

## Lista wydatków

| Nr | Data | Dostawca | Nr faktury | Kwota brutto | Kwalif. B+R | Uzasadnienie |
|----|------|----------|------------|--------------|-------------|--------------|
| 1 | 2025-02-10 | Elektronika Lab Sp. z o.o. | FV/2025/0042 | 12 300,00 zł | ✓ | Podzespoły do prototypu |
| 2 | 2025-03-04 | Hurtownia Metali S.A. | FV/2025/0107 | 4 920,00 zł | ✓ | Materiały konstrukcyjne |

---

## PODSUMOWANIE

| Metryka | Wartość |
|---------|---------|
| Liczba wydatków | 2 |
| Suma brutto | 17 220,00 zł |
| Suma netto | 14 000,00 zł |
| Kwalifikowane B+R | 17 220,00 zł |
| Kwota odliczenia (art. 18d CIT) | 17 220,00 zł |
"#
            .to_string(),
        ),
        model_prompt: Some(
            "Wygeneruj ewidencję wydatków B+R na podstawie dostarczonych danych.\nDla każdego \
             wydatku podaj uzasadnienie kwalifikacji do B+R.\nPodsumuj według kategorii i \
             oblicz procent kwalifikowanych."
                .to_string(),
        ),
        output_format: "markdown".to_string(),
        version: "1.0".to_string(),
        strict: false,
    }
}
