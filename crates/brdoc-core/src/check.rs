//! Validation primitives for Polish tax identifiers and domain values.
//!
//! Checks return `Result<(), String>` with a Polish message so callers
//! can surface them directly as validation issues.

use chrono::{Datelike, NaiveDate, Utc};

/// NIP checksum weights (first nine digits, mod 11).
const NIP_WEIGHTS: [u32; 9] = [6, 5, 7, 2, 3, 4, 5, 6, 7];

/// REGON-9 checksum weights.
const REGON9_WEIGHTS: [u32; 8] = [8, 9, 2, 3, 4, 5, 6, 7];

/// REGON-14 checksum weights.
const REGON14_WEIGHTS: [u32; 13] = [2, 4, 8, 5, 0, 9, 7, 3, 6, 1, 2, 4, 8];

/// Earliest fiscal year the B+R relief applies to.
const FIRST_BR_YEAR: i32 = 2004;

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a Polish NIP (tax identification number).
///
/// Accepts separators (`588-191-86-62`); verifies the 10-digit format and
/// the mod-11 weighted checksum, rejecting a control digit of 10.
pub fn validate_nip(nip: &str) -> Result<(), String> {
    let clean: String = nip
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();

    if clean.is_empty() {
        return Err("NIP jest pusty".to_string());
    }
    if clean.len() != 10 {
        return Err(format!("NIP musi mieć 10 cyfr, podano {}", clean.len()));
    }
    if !clean.chars().all(|c| c.is_ascii_digit()) {
        return Err("NIP może zawierać tylko cyfry".to_string());
    }

    let digits: Vec<u32> = clean.chars().map(|c| c.to_digit(10).unwrap()).collect();
    let checksum: u32 = digits
        .iter()
        .take(9)
        .zip(NIP_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();
    let control = checksum % 11;

    if control == 10 {
        return Err("Nieprawidłowa suma kontrolna NIP".to_string());
    }
    if control != digits[9] {
        return Err(format!(
            "Nieprawidłowa suma kontrolna NIP (oczekiwano {}, jest {})",
            control, digits[9]
        ));
    }
    Ok(())
}

fn regon_checksum(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights.iter()).map(|(d, w)| d * w).sum();
    let c = sum % 11;
    if c == 10 {
        0
    } else {
        c
    }
}

/// Validate a Polish REGON (9- or 14-digit business registry number).
pub fn validate_regon(regon: &str) -> Result<(), String> {
    let clean = digits_only(regon);
    let digits: Vec<u32> = clean.chars().map(|c| c.to_digit(10).unwrap()).collect();

    match digits.len() {
        9 => {
            if regon_checksum(&digits[..8], &REGON9_WEIGHTS) != digits[8] {
                return Err("Nieprawidłowa suma kontrolna REGON".to_string());
            }
            Ok(())
        }
        14 => {
            if regon_checksum(&digits[..8], &REGON9_WEIGHTS) != digits[8] {
                return Err("Nieprawidłowa suma kontrolna REGON".to_string());
            }
            if regon_checksum(&digits[..13], &REGON14_WEIGHTS) != digits[13] {
                return Err("Nieprawidłowa suma kontrolna REGON-14".to_string());
            }
            Ok(())
        }
        n => Err(format!("REGON musi mieć 9 lub 14 cyfr, podano {n}")),
    }
}

/// Validate that `start` is not after `end`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), String> {
    if start > end {
        return Err(format!(
            "Data początkowa ({start}) jest późniejsza niż końcowa ({end})"
        ));
    }
    Ok(())
}

/// Validate a fiscal year: not before 2004 (introduction of the B+R
/// relief), not in the future unless `allow_future`, and never more than
/// one year ahead.
pub fn validate_fiscal_year(year: i32, allow_future: bool) -> Result<(), String> {
    let current_year = Utc::now().year();

    if year < FIRST_BR_YEAR {
        return Err(
            "Rok fiskalny nie może być wcześniejszy niż 2004 (wprowadzenie ulgi B+R)".to_string(),
        );
    }
    if !allow_future && year > current_year {
        return Err(format!("Rok fiskalny ({year}) nie może być z przyszłości"));
    }
    if year > current_year + 1 {
        return Err(format!("Rok fiskalny ({year}) jest zbyt daleko w przyszłości"));
    }
    Ok(())
}

/// Validate a monetary amount against bounds.
pub fn validate_amount(
    amount: f64,
    min_value: f64,
    max_value: Option<f64>,
    field_name: &str,
) -> Result<(), String> {
    if !amount.is_finite() {
        return Err(format!("{field_name} musi być liczbą"));
    }
    if amount < min_value {
        return Err(format!("{field_name} nie może być mniejsza niż {min_value}"));
    }
    if let Some(max) = max_value {
        if amount > max {
            return Err(format!("{field_name} nie może przekraczać {max}"));
        }
    }
    Ok(())
}

/// Validate a percentage value; both 0–1 fractions and 0–100 percents
/// are accepted.
pub fn validate_percentage(value: f64, field_name: &str) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{field_name} musi być liczbą"));
    }
    if value < 0.0 {
        return Err(format!("{field_name} nie może być ujemna"));
    }
    if value > 100.0 {
        return Err(format!("{field_name} nie może przekraczać 100%"));
    }
    Ok(())
}

/// Validate a Nexus indicator value (must lie in [0, 1]).
pub fn validate_nexus_value(nexus: f64) -> Result<(), String> {
    if !nexus.is_finite() {
        return Err("Wskaźnik Nexus musi być liczbą".to_string());
    }
    if nexus < 0.0 {
        return Err("Wskaźnik Nexus nie może być ujemny".to_string());
    }
    if nexus > 1.0 {
        return Err(format!("Wskaźnik Nexus nie może przekraczać 1.0 (jest {nexus})"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_nips() {
        assert!(validate_nip("5881918662").is_ok());
        assert!(validate_nip("588-191-86-62").is_ok());
        assert!(validate_nip("5881918661").is_err());
        assert!(validate_nip("1234567890").is_err());
        assert!(validate_nip("").is_err());
        assert!(validate_nip("58819186").is_err());
        assert!(validate_nip("58819186ab").is_err());
    }

    #[test]
    fn known_regons() {
        // 123456785: checksum of 12345678 with weights [8,9,2,3,4,5,6,7] is 5.
        assert!(validate_regon("123456785").is_ok());
        assert!(validate_regon("123456789").is_err());
        assert!(validate_regon("12345").is_err());
    }

    #[test]
    fn fiscal_year_bounds() {
        assert!(validate_fiscal_year(2003, false).is_err());
        assert!(validate_fiscal_year(2004, false).is_ok());
        assert!(validate_fiscal_year(2025, false).is_ok());
        assert!(validate_fiscal_year(2999, true).is_err());
    }

    #[test]
    fn percentage_both_scales() {
        assert!(validate_percentage(0.5, "Stawka").is_ok());
        assert!(validate_percentage(50.0, "Stawka").is_ok());
        assert!(validate_percentage(100.0, "Stawka").is_ok());
        assert!(validate_percentage(101.0, "Stawka").is_err());
        assert!(validate_percentage(-0.1, "Stawka").is_err());
    }

    #[test]
    fn date_ranges() {
        let a = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert!(validate_date_range(a, b).is_ok());
        assert!(validate_date_range(b, a).is_err());
        assert!(validate_date_range(a, a).is_ok());
    }

    proptest! {
        /// For any 9-digit prefix there is exactly one valid control digit,
        /// unless the checksum is 10, in which case no digit validates.
        #[test]
        fn nip_checksum_is_deterministic(prefix in proptest::collection::vec(0u32..10, 9)) {
            let weighted: u32 = prefix.iter().zip(NIP_WEIGHTS.iter()).map(|(d, w)| d * w).sum();
            let control = weighted % 11;
            let valid_count = (0u32..10)
                .filter(|d| {
                    let nip: String = prefix
                        .iter()
                        .chain(std::iter::once(d))
                        .map(|x| char::from_digit(*x, 10).unwrap())
                        .collect();
                    validate_nip(&nip).is_ok()
                })
                .count();
            if control == 10 {
                prop_assert_eq!(valid_count, 0);
            } else {
                prop_assert_eq!(valid_count, 1);
            }
        }
    }
}
