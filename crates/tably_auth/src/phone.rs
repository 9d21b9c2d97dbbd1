//! Phone number normalization.
//!
//! Every phone used as a key or sent upstream goes through [`normalize`]
//! first, so lookups by phone always compare canonical forms.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AuthError;

// `[0-9]` rather than `\d`: the regex crate's `\d` matches any Unicode digit.
static E164: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[0-9]{7,15}$").expect("valid E.164 regex"));

/// Trims `raw`, prefixes `+` when missing and checks the result against
/// `^\+[0-9]{7,15}$`.
pub fn normalize(raw: &str) -> Result<String, AuthError> {
    let trimmed = raw.trim();
    let candidate = if trimmed.starts_with('+') {
        trimmed.to_string()
    } else {
        format!("+{}", trimmed)
    };

    if E164.is_match(&candidate) {
        Ok(candidate)
    } else {
        Err(AuthError::InvalidPhone(raw.to_string()))
    }
}

/// Whether `raw` normalizes to a valid phone.
pub fn is_valid(raw: &str) -> bool {
    normalize(raw).is_ok()
}

/// Log-safe rendering that keeps only the last four digits.
pub fn mask(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().collect();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(digits.len() - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_adds_plus_and_trims() {
        assert_eq!(normalize("4155551234").unwrap(), "+4155551234");
        assert_eq!(normalize("  +14155551234 \n").unwrap(), "+14155551234");
    }

    #[test]
    fn test_normalize_rejects_invalid_input() {
        assert!(normalize("").is_err());
        assert!(normalize("+").is_err());
        assert!(normalize("123456").is_err()); // 6 digits
        assert!(normalize("1234567890123456").is_err()); // 16 digits
        assert!(normalize("+1 415 555 1234").is_err());
        assert!(normalize("++14155551234").is_err());
        assert!(normalize("+1415555abcd").is_err());
        assert!(normalize("+١٢٣٤٥٦٧٨").is_err()); // Arabic-Indic digits
    }

    #[test]
    fn test_normalize_accepts_bounds() {
        assert!(normalize("1234567").is_ok());
        assert!(normalize("123456789012345").is_ok());
    }

    #[test]
    fn test_mask_keeps_last_four() {
        assert_eq!(mask("+14155551234"), "********1234");
        assert_eq!(mask("123"), "***");
    }

    proptest! {
        #[test]
        fn test_normalize_is_idempotent(raw in "[ \t]{0,2}\\+?[0-9]{5,17}[ \t]{0,2}") {
            if let Ok(once) = normalize(&raw) {
                prop_assert_eq!(normalize(&once).unwrap(), once);
            }
        }

        #[test]
        fn test_normalize_idempotent_on_arbitrary_input(raw in ".*") {
            if let Ok(once) = normalize(&raw) {
                prop_assert_eq!(normalize(&once).unwrap(), once);
            }
        }

        #[test]
        fn test_valid_output_matches_e164(digits in "[0-9]{7,15}") {
            let normalized = normalize(&digits).unwrap();
            prop_assert!(normalized.starts_with('+'));
            prop_assert_eq!(&normalized[1..], digits.as_str());
        }

        #[test]
        fn test_too_short_or_too_long_rejected(digits in "[0-9]{0,6}|[0-9]{16,20}") {
            prop_assert!(normalize(&digits).is_err());
        }
    }
}
