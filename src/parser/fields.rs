use std::sync::LazyLock;

use regex::Regex;

static NON_NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d.]").unwrap());
static PAREN_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d{4})\)").unwrap());
static BARE_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());

const CURRENCY_MARKER: char = '$';

/// Parse a gross figure such as `$2,923,706,026`.
///
/// Everything before the first `$` is dropped, then every character that is
/// not a digit or a decimal point. Unit words go with it: `"$1.5 billion"`
/// yields `1.5`, so figures are only comparable when the source uses one unit.
pub fn clean_box_office(raw: &str) -> Option<f64> {
    let from_marker = match raw.find(CURRENCY_MARKER) {
        Some(idx) => &raw[idx..],
        None => raw,
    };
    let digits = NON_NUMERIC_RE.replace_all(from_marker, "");
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}

/// A parenthesised four-digit number wins over a bare 19xx/20xx token.
pub fn extract_year(text: &str) -> Option<i32> {
    PAREN_YEAR_RE
        .captures(text)
        .or_else(|| BARE_YEAR_RE.captures(text))
        .and_then(|c| c[1].parse().ok())
}

/// Data rows carry a purely numeric rank; notes and separators do not.
pub fn is_valid_rank(text: &str) -> bool {
    is_all_digits(text.trim())
}

pub fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}
