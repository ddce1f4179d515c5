//! Email/phone identifier classification and normalization.
//!
//! A sign-in identifier is free text: email address or phone number. Emails
//! are recognized first, because a string containing `@` must never reach
//! the phone parser, whose heuristics are looser. Phones normalize to E.164
//! with the US numbering plan as the default region when no country code is
//! given; anything structurally invalid yields `None`, never a partial
//! best-effort value.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Simplified RFC 5322, anchored: local part, @, domain, dot, tld >= 2
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();

    // North American numbering plan: area code and exchange begin 2-9
    static ref NANP_REGEX: Regex = Regex::new(r"^[2-9][0-9]{2}[2-9][0-9]{6}$").unwrap();
}

/// Classification of one raw identifier string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Email,
    Phone,
    Invalid,
}

/// Classify a raw identifier. Email is tested first; everything else is
/// evaluated as a phone candidate.
pub fn classify(raw: &str) -> IdentifierKind {
    if is_email(raw) {
        IdentifierKind::Email
    } else if is_valid_phone(raw) {
        IdentifierKind::Phone
    } else {
        IdentifierKind::Invalid
    }
}

/// True if the trimmed input looks like an email address.
pub fn is_email(raw: &str) -> bool {
    EMAIL_REGEX.is_match(raw.trim())
}

/// Trim and lowercase. Total and idempotent.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// True if the input parses to a structurally valid phone number.
pub fn is_valid_phone(raw: &str) -> bool {
    normalize_to_e164(raw).is_some()
}

/// Normalize a phone number to E.164 (`+<countrycode><national>`, no
/// separators). US is assumed when no country code is present. Returns
/// `None` on any parse failure or structural invalidity. Idempotent over
/// its own output.
pub fn normalize_to_e164(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (has_country_code, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '(' | ')' | '-' | '.' => {}
            _ => return None,
        }
    }

    if has_country_code {
        return match digits.strip_prefix('1') {
            // +1 is the NANP; hold it to the full structural rules
            Some(national) => format_nanp(national),
            // Other country codes: ITU length bounds only
            None => {
                if (8..=15).contains(&digits.len()) && !digits.starts_with('0') {
                    Some(format!("+{digits}"))
                } else {
                    None
                }
            }
        };
    }

    // Default region: domestic 10-digit, or 11 digits with a leading 1
    let national = match digits.len() {
        10 => digits.as_str(),
        11 => digits.strip_prefix('1')?,
        _ => return None,
    };
    format_nanp(national)
}

fn format_nanp(national: &str) -> Option<String> {
    if NANP_REGEX.is_match(national) {
        Some(format!("+1{national}"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_emails() {
        assert_eq!(classify("user@example.com"), IdentifierKind::Email);
        assert_eq!(classify("  First.Last+tag@sub.example.org  "), IdentifierKind::Email);
        assert_eq!(classify("a@b.co"), IdentifierKind::Email);
    }

    #[test]
    fn test_classify_phones() {
        assert_eq!(classify("2125551234"), IdentifierKind::Phone);
        assert_eq!(classify("(212) 555-1234"), IdentifierKind::Phone);
        assert_eq!(classify("+12125551234"), IdentifierKind::Phone);
    }

    #[test]
    fn test_classify_invalid() {
        assert_eq!(classify(""), IdentifierKind::Invalid);
        assert_eq!(classify("123"), IdentifierKind::Invalid);
        assert_eq!(classify("not an identifier"), IdentifierKind::Invalid);
        // Malformed email never falls through to the phone parser
        assert_eq!(classify("user@nodot"), IdentifierKind::Invalid);
    }

    #[test]
    fn test_email_requires_tld() {
        assert!(is_email("user@example.com"));
        assert!(!is_email("user@example"));
        assert!(!is_email("user@example.c"));
        assert!(!is_email("userexample.com"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.COM  "), "user@example.com");
        // Idempotent
        assert_eq!(normalize_email("user@example.com"), "user@example.com");
    }

    #[test]
    fn test_normalize_to_e164_domestic() {
        assert_eq!(normalize_to_e164("2125551234").as_deref(), Some("+12125551234"));
        assert_eq!(normalize_to_e164("(212) 555-1234").as_deref(), Some("+12125551234"));
        assert_eq!(normalize_to_e164("212.555.1234").as_deref(), Some("+12125551234"));
        assert_eq!(normalize_to_e164("1-212-555-1234").as_deref(), Some("+12125551234"));
    }

    #[test]
    fn test_normalize_to_e164_international() {
        assert_eq!(normalize_to_e164("+12125551234").as_deref(), Some("+12125551234"));
        assert_eq!(
            normalize_to_e164("+44 20 7183 8750").as_deref(),
            Some("+442071838750")
        );
    }

    #[test]
    fn test_normalize_to_e164_rejects_invalid() {
        assert_eq!(normalize_to_e164(""), None);
        assert_eq!(normalize_to_e164("   "), None);
        assert_eq!(normalize_to_e164("123"), None);
        // NANP area code and exchange cannot begin with 0 or 1
        assert_eq!(normalize_to_e164("0125551234"), None);
        assert_eq!(normalize_to_e164("2120551234"), None);
        assert_eq!(normalize_to_e164("212555123"), None);
        assert_eq!(normalize_to_e164("21255512345"), None);
        assert_eq!(normalize_to_e164("abc-555-1234"), None);
        assert_eq!(normalize_to_e164("user@example.com"), None);
        // +1 numbers must satisfy the NANP structure too
        assert_eq!(normalize_to_e164("+10005551234"), None);
    }

    #[test]
    fn test_normalize_to_e164_idempotent() {
        for input in ["2125551234", "(212) 555-1234", "+442071838750"] {
            let once = normalize_to_e164(input).unwrap();
            assert_eq!(normalize_to_e164(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("2125551234"));
        assert!(!is_valid_phone("123"));
        assert!(!is_valid_phone(""));
    }
}
