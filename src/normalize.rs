//! Text-level cleanup of raw cell values.
//!
//! Amounts and identifiers are only ever handled as digit strings. Nothing in
//! here parses a number, so leading zeros and stray text survive untouched
//! apart from the punctuation that gets stripped.

/// Cleans a raw value before it is rendered into a fixed-width field.
///
/// Surrounding whitespace is trimmed, every `.` and `,` is removed, and a
/// trailing `.0` is dropped if one is still present afterwards.
pub fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect();

    // The periods are already gone here, so this never matches. Moving it
    // above the filter would change how `"1500.0"` renders.
    match cleaned.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => cleaned,
    }
}

/// Whether the raw text carried a decimal separator before normalization
/// erased it.
pub fn has_decimal_separator(raw: &str) -> bool {
    raw.contains('.') || raw.contains(',')
}

/// Converts an amount into its cents representation.
///
/// Values without any separator are whole units and get `"00"` appended.
/// Values with a separator are assumed to already carry two decimal digits,
/// so the punctuation-free text is used as-is.
pub fn scale_to_cents(raw: &str, cleaned: &str) -> String {
    if has_decimal_separator(raw) {
        cleaned.to_string()
    } else {
        format!("{}00", cleaned)
    }
}

/// Reports whether stripping the separators out of `raw` gives a value that
/// is not reliably in cents: the text holds a separator, but the last one
/// is not followed by exactly two digits (`"10,5"`, `"1.500"`, `"3,"`).
pub fn is_ambiguous_amount(raw: &str) -> bool {
    let raw = raw.trim();
    match raw.rfind(|c: char| c == '.' || c == ',') {
        Some(pos) => {
            let decimals = &raw[pos + 1..];
            decimals.len() != 2 || !decimals.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_strip_thousands_and_decimal_punctuation() {
        assert_eq!(normalize("1.234.567,89"), "123456789");
        assert_eq!(normalize("1,500.50"), "150050");
    }

    #[test]
    fn should_keep_digit_left_by_trailing_point_zero() {
        assert_eq!(normalize("1500.0"), "15000");
        assert_eq!(normalize(" 2.0 "), "20");
    }

    #[test]
    fn should_map_empty_and_blank_values_to_empty_string() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize(".,.,"), "");
    }

    #[test]
    fn should_leave_leading_zeros_and_text_untouched() {
        assert_eq!(normalize("00123"), "00123");
        assert_eq!(normalize(" JUAN PEREZ "), "JUAN PEREZ");
    }

    #[test]
    fn should_scale_whole_amounts_to_cents() {
        assert_eq!(scale_to_cents("1500", &normalize("1500")), "150000");
    }

    #[test]
    fn should_keep_amounts_with_decimal_separator_as_is() {
        assert_eq!(scale_to_cents("1500,50", &normalize("1500,50")), "150050");
        assert_eq!(scale_to_cents("1.500,50", &normalize("1.500,50")), "150050");
    }

    #[test]
    fn should_scale_empty_amount_to_zero_cents() {
        assert_eq!(scale_to_cents("", &normalize("")), "00");
    }

    #[test]
    fn should_flag_amounts_without_two_decimal_digits() {
        assert!(is_ambiguous_amount("10,5"));
        assert!(is_ambiguous_amount("1.500"));
        assert!(is_ambiguous_amount("10,505"));
        assert!(is_ambiguous_amount("3,"));
    }

    #[test]
    fn should_not_flag_whole_or_two_decimal_amounts() {
        assert!(!is_ambiguous_amount("1500"));
        assert!(!is_ambiguous_amount("1500,50"));
        assert!(!is_ambiguous_amount("1.500,50 "));
        assert!(!is_ambiguous_amount(""));
    }
}
