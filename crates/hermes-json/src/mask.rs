//! Value masking.

/// Masks a string, keeping at most its last four characters.
///
/// - blank input is returned unchanged
/// - up to 4 characters: every character becomes `*`
/// - otherwise `visible = min(4, len / 4)` trailing characters are kept
///
/// Lengths count characters, not bytes.
///
/// ```
/// use hermes_json::mask_value;
///
/// assert_eq!(mask_value("4111111111111111"), "************1111");
/// assert_eq!(mask_value("12345"), "****5");
/// assert_eq!(mask_value("12"), "**");
/// ```
#[must_use]
pub fn mask_value(value: &str) -> String {
    if value.trim().is_empty() {
        return value.to_string();
    }

    let len = value.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }

    let visible = (len / 4).min(4);
    let mut masked = "*".repeat(len - visible);
    masked.extend(value.chars().skip(len - visible));
    masked
}
