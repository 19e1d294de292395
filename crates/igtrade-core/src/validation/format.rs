//! Single-field format checks shared by the rule tables.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// ISO 4217 style: three uppercase ASCII letters
pub fn is_currency_code(s: &str) -> bool {
    s.len() == 3 && s.chars().all(|c| c.is_ascii_uppercase())
}

/// Instrument identifier, e.g. `IX.D.FTSE.DAILY.IP`
pub fn is_epic(s: &str) -> bool {
    (6..=30).contains(&s.len())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

/// `DFB` (daily funded bet), `-` (no expiry), `MMM-YY` or `DD-MMM-YY`
pub fn is_expiry(s: &str) -> bool {
    if s == "DFB" || s == "-" {
        return true;
    }
    match s.split('-').collect::<Vec<_>>().as_slice() {
        [month, year] => is_month(month) && is_two_digits(year),
        [day, month, year] => is_two_digits(day) && is_month(month) && is_two_digits(year),
        _ => false,
    }
}

fn is_month(s: &str) -> bool {
    MONTHS.contains(&s)
}

fn is_two_digits(s: &str) -> bool {
    s.len() == 2 && s.chars().all(|c| c.is_ascii_digit())
}

/// Caller-chosen reference: 1-30 of `[A-Za-z0-9_.-]`
pub fn is_deal_reference(s: &str) -> bool {
    (1..=30).contains(&s.len())
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

pub fn is_quote_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Deal sizes are positive with at most two decimal places
pub fn is_deal_size(size: Decimal) -> bool {
    size > Decimal::ZERO && size.normalize().scale() <= 2
}

/// `yyyy/mm/dd hh:mm:ss` or `yyyy/mm/dd hh:mm`
pub fn is_good_till_date(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, "%Y/%m/%d %H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y/%m/%d %H:%M").is_ok()
}
