//! Validation for free-text request fields.

use crate::error::{TrimError, TrimResult};

/// Parse the retained-seconds field.
///
/// Accepts ASCII digits only, without a leading zero, with a value of at least
/// one second. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`TrimError::InvalidRequest`] describing why the text was rejected.
pub fn parse_retained_seconds(text: &str) -> TrimResult<u32> {
    let trimmed = text.trim();
    let reject = |reason| {
        Err(TrimError::invalid(
            "retained_seconds",
            reason,
            Some(text.to_string()),
        ))
    };

    if trimmed.is_empty() {
        return reject("empty");
    }
    if !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return reject("not_numeric");
    }
    if trimmed.starts_with('0') {
        return reject("below_minimum");
    }
    trimmed
        .parse::<u32>()
        .or_else(|_| reject("out_of_range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(text: &str) -> Option<&'static str> {
        match parse_retained_seconds(text) {
            Err(TrimError::InvalidRequest { reason, .. }) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn accepts_positive_integers() -> TrimResult<()> {
        assert_eq!(parse_retained_seconds("30")?, 30);
        assert_eq!(parse_retained_seconds(" 1 ")?, 1);
        assert_eq!(parse_retained_seconds("4294967295")?, u32::MAX);
        Ok(())
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(reason(""), Some("empty"));
        assert_eq!(reason("   "), Some("empty"));
        assert_eq!(reason("abc"), Some("not_numeric"));
        assert_eq!(reason("-5"), Some("not_numeric"));
        assert_eq!(reason("1.5"), Some("not_numeric"));
        assert_eq!(reason("0"), Some("below_minimum"));
        assert_eq!(reason("007"), Some("below_minimum"));
        assert_eq!(reason("4294967296"), Some("out_of_range"));
    }
}
