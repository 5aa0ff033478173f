//! Post-match validator predicates.
//!
//! A rule's regex is intentionally loose; validators reject spans that
//! match the shape but are implausible as real values (test card
//! numbers failing Luhn, reserved SSN areas, hash-like strings matching
//! a generic token pattern).

/// Luhn checksum over the digits of `span` (payment cards).
///
/// Non-digit separators are ignored; fewer than two digits fails.
#[must_use]
pub fn luhn_valid(span: &str) -> bool {
    let digits: Vec<u8> = span
        .chars()
        .filter(char::is_ascii_digit)
        .map(|c| c as u8 - b'0')
        .collect();

    if digits.len() < 2 {
        return false;
    }

    let mut sum: u32 = 0;
    for (i, &d) in digits.iter().rev().enumerate() {
        let mut val = u32::from(d);
        if i % 2 == 1 {
            val *= 2;
            if val > 9 {
                val -= 9;
            }
        }
        sum += val;
    }

    sum % 10 == 0
}

/// SSN area/group/serial plausibility rules.
///
/// Area cannot be 000, 666, or 900-999; group cannot be 00; serial
/// cannot be 0000.
#[must_use]
pub fn ssn_valid(span: &str) -> bool {
    let digits: String = span.chars().filter(char::is_ascii_digit).collect();

    if digits.len() != 9 {
        return false;
    }

    let area = &digits[0..3];
    let group = &digits[3..5];
    let serial = &digits[5..9];

    if area == "000" || area == "666" || area.starts_with('9') {
        return false;
    }
    if group == "00" {
        return false;
    }
    if serial == "0000" {
        return false;
    }

    true
}

/// Character-class diversity check for generic token patterns.
///
/// Requires at least one letter and one digit, and more than one
/// distinct character, so all-letter words, bare digit runs, and
/// repeated filler that happen to match a token-shaped regex are
/// rejected.
#[must_use]
pub fn mixed_alphanumeric(span: &str) -> bool {
    let has_alpha = span.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = span.chars().any(|c| c.is_ascii_digit());
    let mut chars = span.chars();
    let first = chars.next();
    let uniform = first.is_some_and(|f| chars.all(|c| c == f));

    has_alpha && has_digit && !uniform
}
