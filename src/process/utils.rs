/// Trim whitespace and strip one pair of outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// `None` for cells that are blank once cleaned.
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(clean_str).filter(|s| !s.is_empty())
}

/// Text read as a missing value, besides the empty cell. Matched exactly.
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// `None` for empty cells and NA tokens; any other text is returned as is.
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty() && !NA_TOKENS.contains(s))
}

/// Canonical text form of a customer identifier.
///
/// Spreadsheet exports carry the id as a float (`17850.0`). Digits followed
/// by `.0` lose the suffix; everything else is kept byte-for-byte.
pub fn normalize_customer_id(raw: Option<&str>) -> Option<String> {
    let s = present(raw)?;
    match s.strip_suffix(".0") {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            Some(digits.to_string())
        }
        _ => Some(s.to_string()),
    }
}
