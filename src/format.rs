//! Colombian (es-CO) presentation helpers for amounts and dates.

use chrono::{Datelike, NaiveDate};

const GROUPING_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';

/// Formats a peso amount as `$ 15.000`, or `$ 324,90` when it has cents.
pub fn format_cop(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;
    let mut body = group_digits(&whole.to_string(), GROUPING_SEPARATOR);
    if fraction != 0 {
        body.push(DECIMAL_SEPARATOR);
        body.push_str(&format!("{:02}", fraction));
    }
    if amount < 0.0 && cents != 0 {
        format!("-$ {}", body)
    } else {
        format!("$ {}", body)
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Parses an amount written either the Colombian way (`18.000,00`) or the
/// US way (`18,000.00`), with or without a `COP`/`$` marker.
pub fn parse_cop_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("COP")
        .trim_end_matches("COP")
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '$')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(comma), None) => {
            let decimals = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, Some(_)) => {
            let mut groups = cleaned.split('.');
            let leading = groups.next().unwrap_or_default();
            let thousands = !leading.is_empty() && groups.clone().all(|group| group.len() == 3);
            if thousands {
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        }
        (None, None) => cleaned,
    };
    normalized.parse::<f64>().ok()
}

/// Formats a date as `1 jun 2024`.
pub fn format_date_es(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), month_abbreviation(date.month()), date.year())
}

/// Spanish three-letter month abbreviation, as printed on ride receipts.
pub fn month_abbreviation(month: u32) -> &'static str {
    match month {
        1 => "ene",
        2 => "feb",
        3 => "mar",
        4 => "abr",
        5 => "may",
        6 => "jun",
        7 => "jul",
        8 => "ago",
        9 => "sep",
        10 => "oct",
        11 => "nov",
        12 => "dic",
        _ => "",
    }
}

/// Inverse of [`month_abbreviation`].
pub fn month_from_abbreviation(abbr: &str) -> Option<u32> {
    let abbr = abbr.to_lowercase();
    (1..=12).find(|month| month_abbreviation(*month) == abbr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_and_fractional_pesos() {
        assert_eq!(format_cop(15_000.0), "$ 15.000");
        assert_eq!(format_cop(1_234_567.0), "$ 1.234.567");
        assert_eq!(format_cop(324.9), "$ 324,90");
        assert_eq!(format_cop(0.0), "$ 0");
        assert_eq!(format_cop(-2_500.0), "-$ 2.500");
    }

    #[test]
    fn parses_colombian_amounts() {
        assert_eq!(parse_cop_amount("18.000,00"), Some(18_000.0));
        assert_eq!(parse_cop_amount("1.234.567,89"), Some(1_234_567.89));
        assert_eq!(parse_cop_amount("15.000"), Some(15_000.0));
        assert_eq!(parse_cop_amount("500,00"), Some(500.0));
        assert_eq!(parse_cop_amount("0,50"), Some(0.5));
        assert_eq!(parse_cop_amount("15.965,10"), Some(15_965.10));
    }

    #[test]
    fn parses_us_style_and_marked_amounts() {
        assert_eq!(parse_cop_amount("COP 15,000.00"), Some(15_000.0));
        assert_eq!(parse_cop_amount("1,425.00 COP"), Some(1_425.0));
        assert_eq!(parse_cop_amount("$ 20000"), Some(20_000.0));
        assert_eq!(parse_cop_amount("9.5"), Some(9.5));
        assert_eq!(parse_cop_amount("COP"), None);
        assert_eq!(parse_cop_amount("abc"), None);
    }

    #[test]
    fn month_abbreviations_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        assert_eq!(format_date_es(date), "2 dic 2025");
        assert_eq!(month_from_abbreviation("DIC"), Some(12));
        assert_eq!(month_from_abbreviation("xyz"), None);
    }
}
