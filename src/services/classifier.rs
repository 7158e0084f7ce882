// Input classification: url, email or phone

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::check::{CheckInput, InputType};
use crate::utils::check_errors::CheckError;

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref IPV4_PATTERN: Regex =
        Regex::new(r"^(?:\d{1,3}\.){3}\d{1,3}(?::\d{1,5})?(?:/.*)?$").unwrap();
    static ref SCHEME_PATTERN: Regex = Regex::new(r"(?i)^https?://").unwrap();
}

const MIN_PHONE_DIGITS: usize = 6;

/// Detect the type of a trimmed, non-blank input.
///
/// Email is tried first so that `user@scam.com` is never read as a URL or a
/// phone number, then URL, then phone.
pub fn detect_input_type(value: &str) -> InputType {
    let value = value.trim();
    if value.is_empty() {
        return InputType::Unknown;
    }

    if EMAIL_PATTERN.is_match(value) {
        return InputType::Email;
    }

    if looks_like_url(value) {
        return InputType::Url;
    }

    if digits_only(value).len() >= MIN_PHONE_DIGITS {
        return InputType::Phone;
    }

    InputType::Unknown
}

fn looks_like_url(value: &str) -> bool {
    if SCHEME_PATTERN.is_match(value) {
        return true;
    }
    if value.contains('.') && value.chars().any(|c| c.is_alphabetic()) {
        return true;
    }
    IPV4_PATTERN.is_match(value)
}

/// Classify a raw submission.
///
/// Blank input fails with `EmptyInput`; anything that is not a url, email or
/// phone fails with `UnclassifiableInput`.
pub fn classify(raw: &str) -> Result<CheckInput, CheckError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CheckError::EmptyInput);
    }

    match detect_input_type(trimmed) {
        InputType::Unknown => Err(CheckError::UnclassifiableInput),
        input_type => Ok(CheckInput {
            raw: trimmed.to_string(),
            input_type,
        }),
    }
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Domain part of an email address, lower-cased
pub fn email_domain(value: &str) -> Option<String> {
    let (_, domain) = value.trim().rsplit_once('@')?;
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_email_before_phone() {
        assert_eq!(detect_input_type("user@scam.com"), InputType::Email);
        assert_eq!(detect_input_type("support123456@bank-verify.bg"), InputType::Email);
    }

    #[test]
    fn test_detects_urls() {
        assert_eq!(detect_input_type("https://example.com"), InputType::Url);
        assert_eq!(detect_input_type("HTTP://EXAMPLE.COM"), InputType::Url);
        assert_eq!(detect_input_type("safe-example.org"), InputType::Url);
        assert_eq!(detect_input_type("192.168.1.5:8081/login"), InputType::Url);
        assert_eq!(detect_input_type("10.0.0.1"), InputType::Url);
    }

    #[test]
    fn test_detects_phone() {
        assert_eq!(detect_input_type("0888123456"), InputType::Phone);
        assert_eq!(detect_input_type("+359 888 123 456"), InputType::Phone);
        assert_eq!(detect_input_type("12345"), InputType::Unknown);
    }

    #[test]
    fn test_unknown_inputs() {
        assert_eq!(detect_input_type("hello"), InputType::Unknown);
        assert_eq!(detect_input_type("   "), InputType::Unknown);
    }

    #[test]
    fn test_classify_errors() {
        assert!(matches!(classify("  "), Err(CheckError::EmptyInput)));
        assert!(matches!(classify("hello"), Err(CheckError::UnclassifiableInput)));

        let input = classify("  example.com ").unwrap();
        assert_eq!(input.raw, "example.com");
        assert_eq!(input.input_type, InputType::Url);
    }

    #[test]
    fn test_classification_is_deterministic() {
        for value in ["a@b.co", "x.y", "0888 123 456", "nothing"] {
            assert_eq!(detect_input_type(value), detect_input_type(value));
        }
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("Alice@PayPal.com"), Some("paypal.com".to_string()));
        assert_eq!(email_domain("no-at-sign"), None);
        assert_eq!(email_domain("trailing@"), None);
    }
}
