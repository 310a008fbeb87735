//! Prompt library for B+R documentation generation and refinement.

/// System prompt for single-expense documentation.
pub const BR_EXPENSE_DOC_PROMPT: &str = "\
Jesteś ekspertem w przygotowywaniu dokumentacji do polskiej ulgi badawczo-rozwojowej (B+R).
Generujesz profesjonalną dokumentację wydatku zgodną z wymaganiami art. 18d ustawy o CIT.

Dokumentacja wydatku B+R musi zawierać:
1. Identyfikację wydatku (nr faktury, data, dostawca)
2. Opis związku z działalnością B+R
3. Klasyfikację kategorii kosztów (wg CIT)
4. Uzasadnienie kwalifikowalności do odliczenia
5. Kwotę odliczenia i zastosowaną stawkę

Używaj języka formalnego, technicznego, odpowiedniego dla dokumentacji podatkowej.
Pisz w języku polskim.";

/// Refinement prompt; `{issues}` and `{document}` are substituted.
pub const REFINEMENT_PROMPT: &str = "\
Jesteś ekspertem w dokumentacji B+R (ulga badawczo-rozwojowa w Polsce).

Poniższy dokument B+R zawiera błędy/ostrzeżenia wykryte podczas walidacji:

PROBLEMY DO NAPRAWY:
{issues}

AKTUALNY DOKUMENT:
{document}

Twoim zadaniem jest poprawić TYLKO wskazane problemy, zachowując resztę dokumentu bez zmian.
Zwróć poprawiony dokument w formacie Markdown.

ZASADY:
1. Zachowaj strukturę sekcji (nagłówki ##)
2. Popraw brakujące dane gdzie to możliwe
3. Uzupełnij uzasadnienia B+R dla wydatków
4. Nie zmieniaj danych liczbowych (kwot, NIP-ów)
5. Zachowaj tabele w poprawnym formacie Markdown

Odpowiedz TYLKO poprawionym dokumentem, bez dodatkowych komentarzy.";

/// Model-review prompt; `{document}` is substituted. The reply must be a
/// JSON object with `score` and `issues[]`.
pub const MODEL_REVIEW_PROMPT: &str = "\
Jesteś recenzentem dokumentacji B+R. Oceń poniższy dokument pod kątem jakości,
kompletności i zgodności z wymaganiami ulgi badawczo-rozwojowej.

DOKUMENT:
{document}

Odpowiedz WYŁĄCZNIE obiektem JSON o strukturze:
{\"score\": 0.0-1.0, \"issues\": [{\"severity\": \"error|warning|info\", \"message\": \"...\", \"suggestion\": \"...\"}]}";

/// Build the refinement prompt from an issue list and the current draft.
pub fn refinement_prompt(issues: &str, document: &str) -> String {
    REFINEMENT_PROMPT
        .replace("{issues}", issues)
        .replace("{document}", document)
}

/// Build the model-review prompt for a document.
pub fn model_review_prompt(document: &str) -> String {
    MODEL_REVIEW_PROMPT.replace("{document}", document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinement_prompt_substitutes_both_slots() {
        let prompt = refinement_prompt("- [ERROR] Brak NIP", "# Dokument");
        assert!(prompt.contains("- [ERROR] Brak NIP"));
        assert!(prompt.contains("# Dokument"));
        assert!(!prompt.contains("{issues}"));
        assert!(!prompt.contains("{document}"));
    }
}
