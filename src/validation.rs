use regex::Regex;
use std::sync::LazyLock;

/// Titles that mark a contact as able to sign off a deal.
pub const DECISION_MAKER_KEYWORDS: [&str; 6] =
    ["ceo", "president", "director", "manager", "owner", "founder"];

/// Minimum digit count for a usable phone number.
pub const MIN_PHONE_DIGITS: usize = 10;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Validate email address
///
/// Matches `local@domain.tld` where the domain contains a dot and the
/// TLD has at least two letters.
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_REGEX.is_match(email)
}

/// Strips everything but ASCII digits.
pub fn phone_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// A phone is usable when it carries at least ten digits, whatever the formatting.
pub fn is_valid_phone(phone: &str) -> bool {
    phone_digits(phone).len() >= MIN_PHONE_DIGITS
}

pub fn is_decision_maker(position: &str) -> bool {
    let position = position.to_lowercase();
    DECISION_MAKER_KEYWORDS
        .iter()
        .any(|keyword| position.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+crm@sub.example.co.uk"));
        assert!(is_valid_email("a_b-c%d@host-name.io"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@example.c"));
        assert!(!is_valid_email("user example@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@.com1"));
    }

    #[test]
    fn test_phone_digit_threshold() {
        assert!(is_valid_phone("(555) 010-9999"));
        assert!(is_valid_phone("+44 20 7946 0958"));
        assert!(!is_valid_phone("555-0199"));
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("call me maybe"));
    }

    #[test]
    fn test_decision_maker_substring_match() {
        assert!(is_decision_maker("CEO"));
        assert!(is_decision_maker("Regional Sales Manager"));
        assert!(is_decision_maker("Co-Founder & CTO"));
        assert!(!is_decision_maker("Software Engineer"));
        assert!(!is_decision_maker(""));
    }
}
