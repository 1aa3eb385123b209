use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ValidationReason;

const MIN_CARD_DIGITS: usize = 13;
const MAX_CARD_DIGITS: usize = 19;

/// Card network inferred from the number prefix. Only Amex changes validation (CVV length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Other,
}

impl CardBrand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Amex => "American Express",
            Self::Other => "Card",
        }
    }

    pub const fn cvv_length(self) -> usize {
        match self {
            Self::Amex => 4,
            _ => 3,
        }
    }
}

/// Card number with all whitespace removed.
pub fn card_digits(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Structured form of [`validate_card_number`]; returns the normalized digits on success.
pub fn check_card_number(raw: &str) -> Result<String, ValidationReason> {
    let digits = card_digits(raw);
    if digits.is_empty() {
        return Err(ValidationReason::Missing);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationReason::InvalidFormat);
    }
    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) {
        return Err(ValidationReason::InvalidFormat);
    }
    if !luhn_checksum_holds(&digits) {
        return Err(ValidationReason::ChecksumFailed);
    }
    Ok(digits)
}

/// 13-19 digits (whitespace ignored) passing the Luhn checksum.
pub fn validate_card_number(raw: &str) -> bool {
    check_card_number(raw).is_ok()
}

/// Expects ASCII digits only.
fn luhn_checksum_holds(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(index, byte)| {
            let digit = u32::from(byte - b'0');
            if index % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

pub fn detect_card_brand(raw: &str) -> CardBrand {
    let digits = card_digits(raw);
    let prefix = |len: usize| -> Option<u32> { digits.get(..len)?.parse().ok() };

    if matches!(prefix(2), Some(34 | 37)) {
        return CardBrand::Amex;
    }
    if digits.starts_with('4') {
        return CardBrand::Visa;
    }
    if matches!(prefix(2), Some(51..=55)) || matches!(prefix(4), Some(2221..=2720)) {
        return CardBrand::Mastercard;
    }
    CardBrand::Other
}

/// Structured form of [`validate_expiry`].
pub fn check_expiry(month: u32, year: i32, today: NaiveDate) -> Result<(), ValidationReason> {
    if !(1..=12).contains(&month) {
        return Err(ValidationReason::OutOfRange);
    }
    let (current_year, current_month) = (today.year(), today.month());
    if year < current_year || (year == current_year && month <= current_month) {
        return Err(ValidationReason::Expired);
    }
    Ok(())
}

/// A card expiring in the current month counts as expired.
pub fn validate_expiry(month: u32, year: i32, today: NaiveDate) -> bool {
    check_expiry(month, year, today).is_ok()
}

/// Structured form of [`validate_cvv`].
pub fn check_cvv(cvv: &str, card_number: &str) -> Result<(), ValidationReason> {
    let cvv = cvv.trim();
    if cvv.is_empty() {
        return Err(ValidationReason::Missing);
    }
    if !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationReason::InvalidFormat);
    }
    let expected = detect_card_brand(card_number).cvv_length();
    if cvv.len() != expected {
        return Err(ValidationReason::InvalidLength { expected });
    }
    Ok(())
}

/// Four digits for Amex, three for every other brand.
pub fn validate_cvv(cvv: &str, card_number: &str) -> bool {
    check_cvv(cvv, card_number).is_ok()
}
