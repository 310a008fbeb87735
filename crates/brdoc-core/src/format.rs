//! Polish-locale formatting for money, dates, and indicator values.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Polish month names, indexed 1..=12.
pub const MONTH_NAMES_PL: [&str; 12] = [
    "Styczeń",
    "Luty",
    "Marzec",
    "Kwiecień",
    "Maj",
    "Czerwiec",
    "Lipiec",
    "Sierpień",
    "Wrzesień",
    "Październik",
    "Listopad",
    "Grudzień",
];

/// Polish month name for a 1-based month number.
pub fn month_name_pl(month: u32) -> String {
    MONTH_NAMES_PL
        .get(month.wrapping_sub(1) as usize)
        .map(|s| s.to_string())
        .unwrap_or_else(|| month.to_string())
}

/// Format a monetary amount in the Polish convention:
/// space as thousands separator, comma as decimal separator,
/// `zł` suffix for PLN and the currency code otherwise.
///
/// `format_currency(dec!(1234.56), "PLN", true)` → `"1 234,56 zł"`.
pub fn format_currency(value: Decimal, currency: &str, show_currency: bool) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative();
    let abs = rounded.abs();

    let as_str = format!("{:.2}", abs);
    let (int_part, frac_part) = as_str.split_once('.').unwrap_or((as_str.as_str(), "00"));

    // Group integer digits in threes from the right.
    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*ch);
    }

    let sign = if negative { "-" } else { "" };
    let number = format!("{sign}{grouped},{frac_part}");

    if show_currency {
        if currency == "PLN" {
            format!("{number} zł")
        } else {
            format!("{number} {currency}")
        }
    } else {
        number
    }
}

/// Shorthand for the common PLN case.
pub fn format_pln(value: Decimal) -> String {
    format_currency(value, "PLN", true)
}

/// Format a date as ISO `YYYY-MM-DD`.
pub fn format_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Format a date in the Polish convention `DD.MM.YYYY`.
pub fn format_date_pl(value: NaiveDate) -> String {
    value.format("%d.%m.%Y").to_string()
}

/// Polish month name with the year appended, e.g. `"Maj 2025"`.
pub fn format_month_pl(date: NaiveDate) -> String {
    format!("{} {}", month_name_pl(date.month()), date.year())
}

/// Format a NIP with standard separators, `588-191-86-62`.
///
/// Inputs that do not normalise to 10 digits are returned unchanged.
pub fn format_nip(nip: &str) -> String {
    let clean: String = nip.chars().filter(|c| c.is_ascii_digit()).collect();
    if clean.len() != 10 {
        return nip.to_string();
    }
    format!(
        "{}-{}-{}-{}",
        &clean[..3],
        &clean[3..6],
        &clean[6..8],
        &clean[8..]
    )
}

/// Format a fraction or percent value as a percentage string.
///
/// Values ≤ 1 are treated as fractions (`0.5` → `"50.0%"`), larger values
/// as already-scaled percents.
pub fn format_percent(value: f64, decimals: usize) -> String {
    let pct = if value <= 1.0 { value * 100.0 } else { value };
    format!("{pct:.decimals$}%")
}

/// Format hours with the proper Polish declension.
pub fn format_hours(hours: f64) -> String {
    if hours == 1.0 {
        return "1 godzina".to_string();
    }
    let last = hours % 10.0;
    let last_two = hours % 100.0;
    let few = (2.0..=4.0).contains(&hours)
        || ((last == 2.0 || last == 3.0 || last == 4.0)
            && !(last_two == 12.0 || last_two == 13.0 || last_two == 14.0));
    if few {
        format!("{hours:.1} godziny")
    } else {
        format!("{hours:.1} godzin")
    }
}

/// Format a Nexus indicator with four decimal places.
pub fn format_nexus(nexus: f64) -> String {
    format!("{nexus:.4}")
}

/// Parse a Polish-formatted amount (`"1 234,56"`, `"1 234,56 zł"`) back
/// into a decimal. Accepts non-breaking spaces as thousands separators.
pub fn parse_amount_pl(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .trim_end_matches("zł")
        .trim_end_matches("PLN")
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_polish_convention() {
        assert_eq!(format_currency(dec!(1234.56), "PLN", true), "1 234,56 zł");
        assert_eq!(format_currency(dec!(120000), "PLN", true), "120 000,00 zł");
        assert_eq!(format_currency(dec!(0), "PLN", true), "0,00 zł");
        assert_eq!(format_currency(dec!(999.9), "PLN", false), "999,90");
        assert_eq!(format_currency(dec!(1500), "EUR", true), "1 500,00 EUR");
        assert_eq!(format_currency(dec!(-42.5), "PLN", true), "-42,50 zł");
        assert_eq!(
            format_currency(dec!(1234567.89), "PLN", true),
            "1 234 567,89 zł"
        );
    }

    #[test]
    fn nip_formatting() {
        assert_eq!(format_nip("5881918662"), "588-191-86-62");
        assert_eq!(format_nip("588-191-86-62"), "588-191-86-62");
        assert_eq!(format_nip("123"), "123");
    }

    #[test]
    fn percent_accepts_fraction_and_scaled() {
        assert_eq!(format_percent(0.5, 1), "50.0%");
        assert_eq!(format_percent(50.0, 0), "50%");
        assert_eq!(format_percent(1.0, 0), "100%");
    }

    #[test]
    fn hours_declension() {
        assert_eq!(format_hours(1.0), "1 godzina");
        assert_eq!(format_hours(2.0), "2.0 godziny");
        // Any value in [2, 4] takes "godziny", fractions included.
        assert_eq!(format_hours(2.5), "2.5 godziny");
        assert_eq!(format_hours(3.5), "3.5 godziny");
        assert_eq!(format_hours(5.0), "5.0 godzin");
        assert_eq!(format_hours(12.0), "12.0 godzin");
        assert_eq!(format_hours(22.0), "22.0 godziny");
        assert_eq!(format_hours(22.5), "22.5 godzin");
        assert_eq!(format_hours(7.5), "7.5 godzin");
        assert_eq!(format_hours(0.5), "0.5 godzin");
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name_pl(1), "Styczeń");
        assert_eq!(month_name_pl(12), "Grudzień");
        assert_eq!(month_name_pl(13), "13");
    }

    #[test]
    fn amount_round_trip() {
        assert_eq!(parse_amount_pl("1 234,56 zł"), Some(dec!(1234.56)));
        assert_eq!(parse_amount_pl("120 000,00"), Some(dec!(120000.00)));
        assert_eq!(
            parse_amount_pl(&format_pln(dec!(9876543.21))),
            Some(dec!(9876543.21))
        );
        assert_eq!(parse_amount_pl("garbage"), None);
    }

    #[test]
    fn dates() {
        let d = NaiveDate::from_ymd_opt(2025, 5, 7).unwrap();
        assert_eq!(format_date(d), "2025-05-07");
        assert_eq!(format_date_pl(d), "07.05.2025");
        assert_eq!(format_month_pl(d), "Maj 2025");
    }
}
