//! Label normalisation shared by the vocabulary index and the matchers.

/// Canonical comparison form of a label.
///
/// CamelCase concept names are split into words, apostrophes are dropped,
/// other punctuation becomes a word break, and the result is lower-cased
/// with single spaces. `"ProfitLoss"`, `"Profit (loss)"` and
/// `"profit/loss"` all normalise to `"profit loss"`.
pub fn normalize_label(label: &str) -> String {
    let mut spaced = String::with_capacity(label.len() + 8);
    let mut prev: Option<char> = None;

    for c in label.chars() {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        if c.is_alphanumeric() {
            if c.is_uppercase()
                && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
            {
                spaced.push(' ');
            }
            spaced.extend(c.to_lowercase());
        } else {
            spaced.push(' ');
        }
        prev = Some(c);
    }

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
