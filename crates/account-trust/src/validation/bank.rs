use std::sync::OnceLock;

use regex::Regex;

use super::ValidationReason;

const QATAR_IBAN_LENGTH: usize = 29;
const MIN_ACCOUNT_NUMBER_DIGITS: usize = 8;

fn iban_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{1,30}$").expect("IBAN pattern compiles")
    })
}

fn swift_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z0-9]{8}([A-Z0-9]{3})?$").expect("SWIFT pattern compiles")
    })
}

/// Uppercase with whitespace removed, the canonical form for IBAN and SWIFT/BIC codes.
pub fn normalize_bank_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Structured form of [`validate_iban`]. Absent or blank input is valid and yields `None`.
pub fn check_iban(iban: Option<&str>) -> Result<Option<String>, ValidationReason> {
    let normalized = match iban.map(normalize_bank_code) {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(None),
    };

    if !iban_pattern().is_match(&normalized) {
        return Err(ValidationReason::InvalidFormat);
    }
    if normalized.starts_with("QA") && normalized.len() != QATAR_IBAN_LENGTH {
        return Err(ValidationReason::InvalidLength {
            expected: QATAR_IBAN_LENGTH,
        });
    }
    Ok(Some(normalized))
}

/// Optional IBAN: country code, check digits, 1-30 alphanumerics. Qatari IBANs must be 29 long.
pub fn validate_iban(iban: Option<&str>) -> bool {
    check_iban(iban).is_ok()
}

/// Structured form of [`validate_swift`].
pub fn check_swift(code: Option<&str>) -> Result<Option<String>, ValidationReason> {
    let normalized = match code.map(normalize_bank_code) {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(None),
    };

    if !swift_pattern().is_match(&normalized) {
        return Err(ValidationReason::InvalidFormat);
    }
    Ok(Some(normalized))
}

/// Optional SWIFT/BIC: 8 or 11 alphanumerics after normalization.
pub fn validate_swift(code: Option<&str>) -> bool {
    check_swift(code).is_ok()
}

/// Structured form of [`validate_account_number`]; returns the digits on success.
pub fn check_account_number(raw: &str) -> Result<String, ValidationReason> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() {
        return Err(ValidationReason::Missing);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationReason::InvalidFormat);
    }
    if digits.len() < MIN_ACCOUNT_NUMBER_DIGITS {
        return Err(ValidationReason::InvalidFormat);
    }
    Ok(digits)
}

/// Required, digits only, at least eight after stripping spaces.
pub fn validate_account_number(raw: &str) -> bool {
    check_account_number(raw).is_ok()
}

/// Display form keeping only the last four characters.
pub fn mask_account_number(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let visible = chars.len().min(4);
    let hidden = chars.len() - visible;
    let mut masked = "*".repeat(hidden);
    masked.extend(&chars[hidden..]);
    masked
}
