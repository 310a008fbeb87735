//! Tax documentation templates: Nexus calculation, IP Box procedure,
//! and the individual-interpretation request.

use brdoc_core::enums::{DocumentCategory, TimeScope};

use crate::registry::{DocumentTemplate, TemplateDataRequirement};

pub fn nexus_calculation() -> DocumentTemplate {
    DocumentTemplate {
        id: "nexus_calculation".to_string(),
        name: "Obliczenie Wskaźnika Nexus".to_string(),
        description: "Kalkulacja wskaźnika Nexus dla potrzeb IP Box".to_string(),
        category: DocumentCategory::Tax,
        time_scope: TimeScope::Yearly,
        data_requirements: vec![
            TemplateDataRequirement::new("project_info", &["project_id"])
                .with_description("Informacje o projekcie"),
            TemplateDataRequirement::new("nexus_calculation", &["project_id"])
                .with_optional(&["year"])
                .with_description("Dane do obliczenia Nexus"),
            TemplateDataRequirement::new("revenues", &["project_id"])
                .with_optional(&["year"])
                .with_description("Przychody z IP"),
        ],
        body: r#"# OBLICZENIE WSKAŹNIKA NEXUS - IP BOX

**Projekt:** {{project.name}}{% if project.code %} ({{project.code}}){% endif %}

**Rok podatkowy:** {{year}}

## 1. Składniki wzoru Nexus

| Symbol | Opis | Kwota (PLN) |
|--------|------|-------------|
| **a** | Koszty B+R poniesione bezpośrednio | {{nexus.a_direct|format_currency}} |
| **b** | Koszty nabycia B+R od podmiotów niepowiązanych | {{nexus.b_unrelated|format_currency}} |
| **c** | Koszty nabycia B+R od podmiotów powiązanych | {{nexus.c_related|format_currency}} |
| **d** | Koszty zakupu gotowego IP | {{nexus.d_ip|format_currency}} |

## 2. Obliczenie wskaźnika

```
Nexus = ((a + b) × 1,3) / (a + b + c + d)

a: {{nexus.a_direct|round(2)}}
b: {{nexus.b_unrelated|round(2)}}
c: {{nexus.c_related|round(2)}}
d: {{nexus.d_ip|round(2)}}
```

Nexus: {{nexus.nexus|round(4)}}

{% if nexus.nexus >= 1 %}**Uwaga:** Wskaźnik Nexus nie może przekroczyć 1, więc przyjmujemy wartość **1,0**.
{% endif %}
## 3. Zastosowanie do dochodu

| Pozycja | Wartość |
|---------|---------|
| Przychody z IP | {{total_revenue|format_currency}} |
| Koszty uzyskania | {{total_costs|format_currency}} |
| Dochód z IP | {{ip_income|format_currency}} |
| Wskaźnik Nexus | {{nexus.nexus|round(4)}} |
| **Dochód kwalifikowany** | **{{qualified_income|format_currency}}** |
| Stawka IP Box | 5% |
| **Podatek IP Box** | **{{ip_tax|format_currency}}** |

Podstawa prawna: art. 24d ustawy o CIT (IP Box).

---

Obliczenie wykonano: {{generated_date}}
"#
        .to_string(),
        demo_body: Some(
            r#"# OBLICZENIE WSKAŹNIKA NEXUS - IP BOX

**Projekt:** System automatyzacji procesów B+R (BR-2025-001)

**Rok podatkowy:** 2025

## 1. Składniki wzoru Nexus

| Symbol | Opis | Kwota (PLN) |
|--------|------|-------------|
| **a** | Koszty B+R poniesione bezpośrednio | 50 000,00 zł |
| **b** | Koszty nabycia B+R od podmiotów niepowiązanych | 10 000,00 zł |
| **c** | Koszty nabycia B+R od podmiotów powiązanych | 0,00 zł |
| **d** | Koszty zakupu gotowego IP | 0,00 zł |

## 2. Obliczenie wskaźnika

```
Nexus = ((a + b) × 1,3) / (a + b + c + d)

a: 50000.00
b: 10000.00
c: 0.00
d: 0.00
```

Nexus: 1.0000

**Uwaga:** Wskaźnik Nexus nie może przekroczyć 1, więc przyjmujemy wartość **1,0**.
"#
            .to_string(),
        ),
        model_prompt: Some(
            "Wykonaj obliczenie wskaźnika Nexus dla IP Box na podstawie dostarczonych danych.\n\
             Wyjaśnij każdy składnik wzoru i jego źródło.\nOblicz dochód kwalifikowany i \
             należny podatek."
                .to_string(),
        ),
        output_format: "markdown".to_string(),
        version: "1.0".to_string(),
        strict: false,
    }
}

pub fn ip_box_procedure() -> DocumentTemplate {
    DocumentTemplate {
        id: "ip_box_procedure".to_string(),
        name: "Procedura Wewnętrzna IP Box".to_string(),
        description: "Dokument opisujący wewnętrzne procedury stosowania preferencji IP Box"
            .to_string(),
        category: DocumentCategory::Tax,
        time_scope: TimeScope::Project,
        data_requirements: vec![TemplateDataRequirement::new("project_info", &["project_id"])
            .with_description("Informacje o projekcie")],
        body: r#"# PROCEDURA WEWNĘTRZNA - STOSOWANIE IP BOX

**Podmiot:** {{project.company_name}}

**NIP:** {{project.company_nip}}

**Data wdrożenia:** {{generated_date}}

---

## 1. CEL PROCEDURY

Niniejsza procedura określa zasady identyfikacji, ewidencji i rozliczania kwalifikowanych
praw własności intelektualnej (IP) dla potrzeb zastosowania preferencyjnej stawki podatku
5% (IP Box), zgodnie z art. 24d ustawy o CIT.

---

## 2. IDENTYFIKACJA KWALIFIKOWANEGO IP

### 2.1 Rodzaje kwalifikowanego IP

Procedura obejmuje następujące kategorie IP:

- [ ] Patenty
- [ ] Prawa ochronne na wzory użytkowe
- [ ] Prawa z rejestracji wzorów przemysłowych
- [x] Autorskie prawa do programów komputerowych
- [ ] Know-how

### 2.2 Projekty objęte procedurą

| Projekt | Kod | Rodzaj IP | Status |
|---------|-----|-----------|--------|
| {{project.name}} | {{project.code}} | Program komputerowy | W realizacji |

---

## 3. PROWADZENIE EWIDENCJI IP BOX

### 3.1 Zakres ewidencji

Dla każdego kwalifikowanego IP prowadzi się odrębną ewidencję zawierającą:

1. **Przychody z IP:**
   - Sprzedaż licencji
   - Opłaty licencyjne
   - Przychody z usług wykorzystujących IP

2. **Koszty bezpośrednie:**
   - Wynagrodzenia pracowników B+R
   - Materiały i surowce
   - Usługi zewnętrzne

3. **Koszty pośrednie (dla Nexus):**
   - Koszty od podmiotów powiązanych
   - Koszty zakupu gotowego IP

### 3.2 Terminy aktualizacji

| Czynność | Termin |
|----------|--------|
| Rejestracja przychodów | Na bieżąco |
| Rejestracja kosztów | Do 5. dnia następnego miesiąca |
| Podsumowanie miesięczne | Do 10. dnia następnego miesiąca |
| Obliczenie Nexus | Rocznie, do 31 stycznia |

---

## 4. OBLICZANIE WSKAŹNIKA NEXUS

### 4.1 Wzór

```
Nexus = ((a + b) × 1,3) / (a + b + c + d)
```

Gdzie:
- **a** = koszty B+R poniesione bezpośrednio
- **b** = koszty nabycia B+R od podmiotów niepowiązanych
- **c** = koszty nabycia B+R od podmiotów powiązanych
- **d** = koszty zakupu gotowego IP

### 4.2 Zasady

1. Wskaźnik Nexus nie może przekroczyć 1
2. Obliczany oddzielnie dla każdego IP
3. W przypadku braku kosztów przyjmuje się wartość 1

---

## 5. ROZLICZENIE W ZEZNANIU ROCZNYM

### 5.1 Dochód kwalifikowany

```
Dochód kwalifikowany = Dochód z IP × Wskaźnik Nexus
```

### 5.2 Opodatkowanie

- Dochód kwalifikowany: stawka 5%
- Pozostały dochód: stawka standardowa (19% / skala)

---

## 6. PRZECHOWYWANIE DOKUMENTACJI

### 6.1 Zakres archiwizacji

1. Ewidencje IP Box
2. Faktury i dokumenty kosztowe
3. Umowy dotyczące komercjalizacji IP
4. Dokumenty rejestracyjne IP
5. Zeznania podatkowe

### 6.2 Okres przechowywania

Minimum 5 lat od końca roku, w którym złożono zeznanie.

---

## 7. ODPOWIEDZIALNOŚĆ

| Rola | Zakres odpowiedzialności |
|------|-------------------------|
| Kierownik projektu | Identyfikacja IP, nadzór nad ewidencją |
| Księgowość | Prowadzenie ewidencji, obliczenia |
| Zarząd | Zatwierdzenie procedury, nadzór |

---

**Zatwierdzam:**

_____________________
(podpis, data)
"#
        .to_string(),
        demo_body: None,
        model_prompt: Some(
            "Wygeneruj procedurę wewnętrzną IP Box dostosowaną do specyfiki projektu.\n\
             Uwzględnij wszystkie wymagane elementy ewidencyjne i obliczeniowe."
                .to_string(),
        ),
        output_format: "markdown".to_string(),
        version: "1.0".to_string(),
        strict: false,
    }
}

pub fn tax_interpretation_request() -> DocumentTemplate {
    DocumentTemplate {
        id: "tax_interpretation_request".to_string(),
        name: "Wniosek o Interpretację Indywidualną".to_string(),
        description: "Wzór wniosku do KIS o interpretację przepisów B+R/IP Box".to_string(),
        category: DocumentCategory::Tax,
        time_scope: TimeScope::Project,
        data_requirements: vec![
            TemplateDataRequirement::new("project_info", &["project_id"])
                .with_description("Informacje o projekcie"),
            TemplateDataRequirement::new("expenses_by_category", &["project_id"])
                .with_description("Struktura kosztów"),
        ],
        body: r#"# WNIOSEK O WYDANIE INTERPRETACJI INDYWIDUALNEJ

**Do:** Dyrektor Krajowej Informacji Skarbowej

**Od:**
- Nazwa/Imię i nazwisko: {{project.company_name}}
- NIP: {{project.company_nip}}
- Adres: _____________________

**Data:** {{generated_date}}

---

## I. OPIS ZDARZENIA PRZYSZŁEGO

Wnioskodawca prowadzi działalność gospodarczą, w ramach której realizuje projekt
badawczo-rozwojowy:

**Nazwa projektu:** {{project.name}}

**Kod projektu:** {{project.code}}

**Opis projektu:**
{{project.description}}

**Problem techniczny:**
{{project.technical_problem}}

**Hipoteza badawcza:**
{{project.hypothesis}}

### Struktura kosztów projektu:

| Kategoria | Szacowana kwota roczna |
|-----------|----------------------|
{% for cat in expenses_by_category %}| {{cat.category_name}} | {{cat.total_gross|format_currency}} |
{% endfor %}
---

## II. PYTANIA

### Pytanie 1: Kwalifikacja działalności jako B+R

Czy opisana powyżej działalność stanowi działalność badawczo-rozwojową w rozumieniu
art. 4a pkt 26 ustawy o podatku dochodowym od osób prawnych (odpowiednio art. 5a pkt 38
ustawy o PIT)?

### Pytanie 2: Kwalifikacja kosztów

Czy wymienione kategorie kosztów stanowią koszty kwalifikowane, o których mowa w art. 18d
ustawy o CIT (odpowiednio art. 26e ustawy o PIT), uprawniające do odliczenia w ramach
ulgi B+R?

### Pytanie 3: Kwalifikowane IP

Czy wytwarzane w ramach projektu oprogramowanie stanowi kwalifikowane prawo własności
intelektualnej w rozumieniu art. 24d ust. 2 pkt 8 ustawy o CIT, uprawniające do
zastosowania preferencyjnej stawki 5%?

### Pytanie 4: Wskaźnik Nexus

Jak prawidłowo obliczyć wskaźnik Nexus w przypadku, gdy Wnioskodawca ponosi wyłącznie
koszty bezpośrednie działalności B+R (kategoria "a" we wzorze)?

---

## III. STANOWISKO WNIOSKODAWCY

### Ad. Pytanie 1:
Zdaniem Wnioskodawcy, opisana działalność spełnia wszystkie przesłanki działalności
badawczo-rozwojowej:
1. Ma charakter twórczy
2. Jest prowadzona w sposób systematyczny
3. Zmierza do zwiększenia zasobów wiedzy i wykorzystania ich do nowych zastosowań

### Ad. Pytanie 2:
Zdaniem Wnioskodawcy, wszystkie wymienione kategorie kosztów stanowią koszty
kwalifikowane w rozumieniu art. 18d ustawy o CIT.

### Ad. Pytanie 3:
Zdaniem Wnioskodawcy, wytwarzane oprogramowanie stanowi kwalifikowane IP.

### Ad. Pytanie 4:
Zdaniem Wnioskodawcy, w przypadku braku kosztów kategorii "b", "c" i "d", wskaźnik Nexus
wynosi 1.

---

## IV. OŚWIADCZENIE

Oświadczam, że elementy stanu faktycznego objęte wnioskiem o wydanie interpretacji w dniu
złożenia wniosku nie są przedmiotem toczącego się postępowania podatkowego, kontroli
podatkowej, kontroli celno-skarbowej oraz że w tym zakresie sprawa nie została
rozstrzygnięta co do jej istoty w decyzji lub postanowieniu organu podatkowego.

---

_____________________
(podpis Wnioskodawcy)

---

*Załączniki:*
1. Dowód uiszczenia opłaty (40 PLN)
2. Pełnomocnictwo (jeśli dotyczy)
"#
        .to_string(),
        demo_body: None,
        model_prompt: Some(
            "Wygeneruj wniosek o interpretację indywidualną do KIS.\nSzczegółowo opisz stan \
             faktyczny projektu B+R.\nSformułuj precyzyjne pytania dotyczące kwalifikacji B+R \
             i IP Box.\nPrzedstaw stanowisko wnioskodawcy z argumentacją prawną."
                .to_string(),
        ),
        output_format: "markdown".to_string(),
        version: "1.0".to_string(),
        strict: false,
    }
}
