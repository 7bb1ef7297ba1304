//! Numeric parsing of amounts as printed in accounts.

/// Currency codes stripped from amounts.
const CURRENCY_CODES: [&str; 3] = ["GBP", "EUR", "USD"];

/// Parses an amount as printed in a set of accounts.
///
/// Accepts thousands separators, surrounding whitespace, currency symbols
/// and codes, and accounting negatives: `(1,234)` is `-1234.0`. A leading
/// hyphen or unicode minus also negates. Blank cells, lone dashes and
/// anything else that is not a plain decimal number give `None`; they are
/// never read as zero.
pub fn parse_amount(text: &str) -> Option<f64> {
    let mut cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '£' | '€' | '$'))
        .collect();
    for code in CURRENCY_CODES {
        if cleaned.to_ascii_uppercase().contains(code) {
            cleaned = strip_ascii_case_insensitive(&cleaned, code);
        }
    }

    let mut body = cleaned.as_str();
    let mut negative = false;
    if let Some(inner) = body.strip_prefix('(') {
        body = inner.strip_suffix(')')?;
        negative = true;
    }
    if let Some(rest) = body.strip_prefix(|c: char| c == '-' || c == '\u{2212}') {
        body = rest;
        negative = true;
    }

    if !is_plain_decimal(body) {
        return None;
    }
    let value: f64 = body.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn is_plain_decimal(s: &str) -> bool {
    let mut digits = 0;
    let mut dots = 0;
    for c in s.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

fn strip_ascii_case_insensitive(haystack: &str, needle: &str) -> String {
    let upper = haystack.to_ascii_uppercase();
    let mut out = String::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if upper[i..].starts_with(needle) {
            i += needle.len();
        } else {
            let c = haystack[i..].chars().next().unwrap_or_default();
            out.push(c);
            i += c.len_utf8().max(1);
        }
    }
    out
}

/// Finds a four-digit year between 1900 and 2099 in a header cell.
pub(crate) fn find_year(text: &str) -> Option<i32> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|token| token.len() == 4)
        .filter_map(|token| token.parse::<i32>().ok())
        .find(|year| (1900..=2099).contains(year))
}
