//! Timesheet documentation templates.

use brdoc_core::enums::{DocumentCategory, TimeScope};

use crate::registry::{DocumentTemplate, TemplateDataRequirement};

pub fn timesheet_monthly() -> DocumentTemplate {
    DocumentTemplate {
        id: "timesheet_monthly".to_string(),
        name: "Miesięczny Rejestr Czasu Pracy B+R".to_string(),
        description: "Zestawienie godzin pracy zespołu w projekcie B+R za dany miesiąc"
            .to_string(),
        category: DocumentCategory::Timesheet,
        time_scope: TimeScope::Monthly,
        data_requirements: vec![
            TemplateDataRequirement::new("project_info", &["project_id"])
                .with_description("Informacje o projekcie"),
            TemplateDataRequirement::new("timesheet_summary", &["project_id", "year", "month"])
                .with_description("Dane z ewidencji czasu pracy"),
        ],
        body: r#"# REJESTR CZASU PRACY - PROJEKT B+R

**Projekt:** {{project.name}} ({{project.code}})

**Okres:** {{month_name}} {{year}}

## Zestawienie godzin pracy

| Pracownik | Godziny B+R | Dni roboczych |
|-----------|-------------|---------------|
{% for entry in timesheet %}| {{entry.worker_name}} | {{entry.total_hours}} h | {{entry.days_worked}} |
{% endfor %}{% if not timesheet %}| *(Brak wpisów)* | 0 h | - |
{% endif %}
---

**PODSUMOWANIE:**

| Metryka | Wartość |
|---------|---------|
| Łączna liczba godzin B+R | **{{total_hours}} h** |
| Liczba pracowników | **{{worker_count}}** |
| Średnia godzin/pracownika | **{{avg_hours|round(1)}} h** |

---

Zatwierdzenie kierownika projektu: _________________________

Data: {{generated_date}}
"#
        .to_string(),
        demo_body: Some(
            r#"# REJESTR CZASU PRACY - PROJEKT B+R

**Projekt:** System automatyzacji procesów B+R (BR-2025-001)

**Okres:** Maj 2025

## Zestawienie godzin pracy

| Pracownik | Godziny B+R | Dni roboczych |
|-----------|-------------|---------------|
| Jan Kowalski | 84 h | 12 |
| Anna Nowak | 62 h | 9 |

---

**PODSUMOWANIE:**

| Metryka | Wartość |
|---------|---------|
| Łączna liczba godzin B+R | **146 h** |
| Liczba pracowników | **2** |
| Średnia godzin/pracownika | **73.0 h** |
"#
            .to_string(),
        ),
        model_prompt: Some(
            "Wygeneruj miesięczny rejestr czasu pracy dla projektu B+R.\nPodsumuj godziny \
             każdego pracownika i opisz wykonane zadania.\nOblicz statystyki zbiorcze."
                .to_string(),
        ),
        output_format: "markdown".to_string(),
        version: "1.0".to_string(),
        strict: false,
    }
}
