//! Daily B+R work-time entries with tax-compliance validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{BrTaskType, TimeSlot};

/// Generic descriptions rejected outright when they make up the whole entry.
const GENERIC_PHRASES: [&str; 5] = [
    "praca nad projektem",
    "prace programistyczne",
    "development",
    "coding",
    "różne zadania",
];

/// Keywords that mark a description as B+R-specific.
const BR_KEYWORDS: [&str; 13] = [
    "implementacja",
    "analiza",
    "test",
    "prototyp",
    "badanie",
    "eksperyment",
    "optymalizacja",
    "architektura",
    "moduł",
    "algorytm",
    "walidacja",
    "integracja",
    "refaktoryzacja",
];

/// Link to a git commit serving as work evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitCommitLink {
    pub repo_name: String,
    pub commit_hash: String,
    pub commit_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_url: Option<String>,
}

/// A daily time entry for B+R work.
///
/// Compliance minimums: 0.5–12 hours per entry and a description of at
/// least 50 characters that is specific to the work done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTimeEntry {
    pub project_id: String,
    pub worker_id: String,
    pub worker_name: String,
    pub work_date: NaiveDate,
    pub time_slot: TimeSlot,
    pub hours: f64,
    pub task_type: BrTaskType,
    pub description: String,
    #[serde(default)]
    pub git_commits: Vec<GitCommitLink>,
}

impl DailyTimeEntry {
    pub const MIN_HOURS: f64 = 0.5;
    pub const MAX_HOURS: f64 = 12.0;
    pub const MIN_DESCRIPTION_CHARS: usize = 50;
    /// Length at which a description is accepted without a B+R keyword.
    pub const KEYWORDLESS_DESCRIPTION_CHARS: usize = 100;

    /// Whether the entry carries git-commit evidence.
    pub fn has_evidence(&self) -> bool {
        !self.git_commits.is_empty()
    }

    /// Validate the entry for B+R compliance.
    ///
    /// The description must reference at least one B+R keyword OR be at
    /// least 100 characters long; bare generic phrases are rejected.
    pub fn validate(&self) -> Result<(), String> {
        if self.hours < Self::MIN_HOURS || self.hours > Self::MAX_HOURS {
            return Err(format!(
                "Godziny pracy muszą mieścić się w zakresie {}-{} (podano {})",
                Self::MIN_HOURS,
                Self::MAX_HOURS,
                self.hours
            ));
        }

        let desc = self.description.trim();
        let chars = desc.chars().count();
        if chars < Self::MIN_DESCRIPTION_CHARS {
            return Err(format!(
                "Opis za krótki ({chars} znaków, minimum {})",
                Self::MIN_DESCRIPTION_CHARS
            ));
        }

        let lower = desc.to_lowercase();
        for phrase in GENERIC_PHRASES {
            if lower == phrase {
                return Err(format!(
                    "Opis zbyt ogólny: '{phrase}'. Podaj konkretne informacje o wykonanych pracach."
                ));
            }
        }

        let has_keyword = BR_KEYWORDS.iter().any(|kw| lower.contains(kw));
        if !has_keyword && chars < Self::KEYWORDLESS_DESCRIPTION_CHARS {
            return Err(
                "Opis powinien zawierać słowa kluczowe B+R lub być bardziej szczegółowy \
                 (min. 100 znaków)"
                    .to_string(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(description: &str, hours: f64) -> DailyTimeEntry {
        DailyTimeEntry {
            project_id: "p-1".to_string(),
            worker_id: "w-1".to_string(),
            worker_name: "Jan Kowalski".to_string(),
            work_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            time_slot: TimeSlot::Morning,
            hours,
            task_type: BrTaskType::Development,
            description: description.to_string(),
            git_commits: vec![],
        }
    }

    #[test]
    fn keyword_description_passes() {
        let e = entry(
            "Implementacja modułu parsera danych pomiarowych wraz z testami jednostkowymi",
            6.0,
        );
        assert!(e.validate().is_ok());
    }

    #[test]
    fn short_description_fails() {
        assert!(entry("Implementacja parsera", 4.0).validate().is_err());
    }

    #[test]
    fn keywordless_but_long_description_passes() {
        let long = "Przygotowanie środowiska pomiarowego oraz zestawienie stanowiska do \
                    rejestracji sygnałów z czujników, kalibracja torów wejściowych urządzenia";
        assert!(long.chars().count() >= 100);
        assert!(entry(long, 4.0).validate().is_ok());
    }

    #[test]
    fn generic_phrase_fails_even_if_padded_to_minimum() {
        // Exactly a generic phrase is rejected regardless of other rules.
        let e = entry("praca nad projektem", 4.0);
        assert!(e.validate().is_err());
    }

    #[test]
    fn hours_bounds() {
        let good = "Analiza wyników eksperymentów i walidacja algorytmu klasyfikacji sygnałów";
        assert!(entry(good, 0.4).validate().is_err());
        assert!(entry(good, 12.5).validate().is_err());
        assert!(entry(good, 0.5).validate().is_ok());
        assert!(entry(good, 12.0).validate().is_ok());
    }
}
