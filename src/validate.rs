//! Field validators and text normalization shared by every extractor.
//!
//! These are deliberately permissive. The goal is to reject obvious garbage
//! (a name with no letters, a "phone" with three digits) without turning
//! away a real lead over formatting. Strict RFC-level validation belongs to
//! downstream systems that act on the data, not to intake.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid pattern"));

/// Returns `true` if `name` looks like a human name: at least two characters
/// after trimming, and at least one ASCII letter somewhere.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    name.trim().len() >= 2 && name.chars().any(|c| c.is_ascii_alphabetic())
}

/// Returns `true` if `phone` contains at least nine digits.
///
/// Non-digit characters (spaces, dashes, a leading `+`) are ignored, so
/// `082 123 4567` and `+27821234567` both pass.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().filter(char::is_ascii_digit).count() >= 9
}

/// Returns `true` if `email` has a plausible address shape: at least five
/// characters, an `@`, and a dot somewhere after the last `@`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 {
        return false;
    }
    match email.rsplit_once('@') {
        Some((_, domain)) => domain.contains('.'),
        None => false,
    }
}

/// Trims `text` and collapses every internal whitespace run (including
/// newlines) to a single space.
#[must_use]
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Splits a full name into first and last components.
///
/// The last whitespace-separated token becomes the last name; everything
/// before it is the first name, so `"Mary Jane Watson"` splits into
/// `("Mary Jane", "Watson")`. A single token is a first name with an empty
/// last name.
#[must_use]
pub fn split_name(full_name: &str) -> (String, String) {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    match tokens.as_slice() {
        [] => (String::new(), String::new()),
        [only] => ((*only).to_string(), String::new()),
        [first, last] => ((*first).to_string(), (*last).to_string()),
        [init @ .., last] => (init.join(" "), (*last).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("Jane Doe"));
        assert!(is_valid_name("Jo"));
        assert!(is_valid_name(" X9 "));
        assert!(!is_valid_name("J"));
        assert!(!is_valid_name("  J  "));
        assert!(!is_valid_name("42"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("0821234567"));
        assert!(is_valid_phone("082 123 4567"));
        assert!(is_valid_phone("+27 82 123 4567"));
        assert!(is_valid_phone("082123456"));
        assert!(!is_valid_phone("08212345"));
        assert!(!is_valid_phone("no digits here"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.c"));
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("first.last@sub.example.co.za"));
        assert!(!is_valid_email("a@bc"));
        assert!(!is_valid_email("@b.c"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Jane   Doe  "), "Jane Doe");
        assert_eq!(clean_text("Cape\nTown"), "Cape Town");
        assert_eq!(clean_text("a\t b\n\nc"), "a b c");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_split_name_policy() {
        assert_eq!(split_name("Jane Doe"), ("Jane".into(), "Doe".into()));
        assert_eq!(
            split_name("Mary Jane Watson"),
            ("Mary Jane".into(), "Watson".into())
        );
        assert_eq!(split_name("Cher"), ("Cher".into(), String::new()));
        assert_eq!(split_name(""), (String::new(), String::new()));
        assert_eq!(split_name("   "), (String::new(), String::new()));
    }
}
