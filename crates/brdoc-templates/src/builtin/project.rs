//! Project documentation templates.

use brdoc_core::enums::{DocumentCategory, TimeScope};

use crate::registry::{DocumentTemplate, TemplateDataRequirement};

pub fn project_card() -> DocumentTemplate {
    DocumentTemplate {
        id: "project_card".to_string(),
        name: "Karta Projektowa B+R".to_string(),
        description: "Karta identyfikacyjna projektu badawczo-rozwojowego zawierająca cele, \
                      zespół i koszty"
            .to_string(),
        category: DocumentCategory::Project,
        time_scope: TimeScope::Project,
        data_requirements: vec![
            TemplateDataRequirement::new("project_info", &["project_id"])
                .with_description("Podstawowe informacje o projekcie"),
            TemplateDataRequirement::new("timesheet_summary", &["project_id"])
                .with_description("Zespół projektowy i godziny B+R"),
            TemplateDataRequirement::new("expenses_by_category", &["project_id"])
                .with_description("Podsumowanie kosztów"),
        ],
        body: r#"# KARTA PROJEKTOWA BADAWCZO-ROZWOJOWA

## 1. IDENTYFIKACJA PROJEKTU

| Pole | Wartość |
|------|---------|
| **Nazwa projektu** | {{project.name}} |
| **Kod/Symbol projektu** | {{project.code}} |
| **Rok fiskalny** | {{project.fiscal_year}} |
| **Firma** | {{project.company_name}} |
| **NIP** | {{project.company_nip}} |
| **Data rozpoczęcia** | {{project.start_date|format_date}} |
| **Przewidywana data zakończenia** | {{project.end_date|format_date}} |
| **Status** | {{project.status}} |

## 2. OPIS DZIAŁALNOŚCI B+R

### Cel badań / zakres prac:
{{project.description}}

### Problem techniczny:
{{project.technical_problem}}

### Hipoteza badawcza:
{{project.hypothesis}}

## 3. ZESPÓŁ BADAWCZY

| Pracownik | Godziny B+R | Dni robocze |
|-----------|-------------|-------------|
{% for worker in timesheet %}| {{worker.worker_name}} | {{worker.total_hours}} h | {{worker.days_worked}} |
{% endfor %}{% if not timesheet %}| *(Brak przypisanych pracowników)* | - | - |
{% endif %}
## 4. KOSZTY PROJEKTOWE

| Kategoria | Liczba pozycji | Kwota brutto (PLN) | Kwalifikowane B+R |
|-----------|----------------|-------------------|-------------------|
{% for cat in expenses_by_category %}| {{cat.category_name}} | {{cat.count}} | {{cat.total_gross|format_currency}} | {{cat.qualified_amount|format_currency}} |
{% endfor %}{% if not expenses_by_category %}| *(Brak wydatków)* | 0 | 0,00 zł | 0,00 zł |
{% endif %}| **RAZEM** | | **{{total_gross|format_currency}}** | **{{total_qualified|format_currency}}** |

**Kwota odliczenia B+R: {{total_deduction|format_currency}}**

Podstawa prawna: art. 18d ustawy o CIT.

## 5. ZATWIERDZENIE

Osoba odpowiedzialna: _________________________

Data zatwierdzenia: {{generated_date}}

Podpis: _________________________
"#
        .to_string(),
        demo_body: Some(
            r#"# KARTA PROJEKTOWA BADAWCZO-ROZWOJOWA

## 1. IDENTYFIKACJA PROJEKTU

| Pole | Wartość |
|------|---------|
| **Nazwa projektu** | System automatyzacji procesów B+R |
| **Kod/Symbol projektu** | BR-2025-00000001 |
| **Rok fiskalny** | 2025 |
| **NIP** | 588-191-86-62 |
| **Data rozpoczęcia** | 2025-01-01 |
| **Przewidywana data zakończenia** | 2025-12-31 |
| **Status** | W realizacji |

## 2. OPIS DZIAŁALNOŚCI B+R

### Cel badań / zakres prac:
Opracowanie innowacyjnego systemu do automatyzacji procesów badawczo-rozwojowych.

### Problem techniczny:
Brak efektywnych narzędzi do zarządzania dokumentacją B+R i obliczania wskaźnika Nexus.

### Hipoteza badawcza:
Zastosowanie automatyzacji pozwoli na skrócenie czasu przygotowania dokumentacji o 80%.

## 3. ZESPÓŁ BADAWCZY

| Pracownik | Godziny B+R | Dni robocze |
|-----------|-------------|-------------|
| Jan Kowalski | 160 h | 20 |
| Anna Nowak | 120 h | 15 |

## 4. KOSZTY PROJEKTOWE

| Kategoria | Liczba pozycji | Kwota brutto (PLN) | Kwalifikowane B+R |
|-----------|----------------|-------------------|-------------------|
| Wynagrodzenia pracowników (umowa o pracę) | 12 | 120 000,00 zł | 120 000,00 zł |
| Materiały i surowce | 5 | 15 000,00 zł | 15 000,00 zł |
| **RAZEM** | | **135 000,00 zł** | **135 000,00 zł** |
"#
            .to_string(),
        ),
        model_prompt: Some(
            "Na podstawie dostarczonych danych projektu B+R wygeneruj profesjonalną Kartę \
             Projektową.\nDokument powinien zawierać:\n1. Pełną identyfikację projektu\n2. \
             Szczegółowy opis celów badawczych i hipotez\n3. Listę zespołu z rolami\n4. \
             Zestawienie kosztów według kategorii\n\nUżyj formalnego języka urzędowego. \
             Wszystkie kwoty formatuj z separatorem tysięcy i symbolem PLN."
                .to_string(),
        ),
        output_format: "markdown".to_string(),
        version: "1.0".to_string(),
        strict: false,
    }
}
