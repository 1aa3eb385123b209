//! Pure format and checksum validators for financial identifiers.
//!
//! Every validator is total: malformed input yields `false` (or a [`ValidationReason`]),
//! never a panic or a coerced "best guess" value.

mod bank;
mod card;

pub use bank::{
    check_account_number, check_iban, check_swift, mask_account_number, normalize_bank_code,
    validate_account_number, validate_iban, validate_swift,
};
pub use card::{
    card_digits, check_card_number, check_cvv, check_expiry, detect_card_brand,
    validate_card_number, validate_cvv, validate_expiry, CardBrand,
};

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// Record fields that can fail validation, labelled with the request keys they come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CardNumber,
    ExpiryMonth,
    ExpiryYear,
    Cvv,
    CardholderName,
    BankName,
    AccountHolderName,
    AccountNumber,
    Iban,
    SwiftCode,
    AccountType,
    Currency,
    TaxId,
    TaxIdType,
    LegalName,
    PhoneNumber,
    TaxAddress,
    TaxCity,
    TaxState,
    TaxPostalCode,
    TaxCountry,
    TaxWithholdingRate,
    FirstName,
    LastName,
    DocumentType,
    DocumentNumber,
    OriginalName,
    #[serde(rename = "status")]
    DocumentStatus,
}

impl Field {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CardNumber => "card_number",
            Self::ExpiryMonth => "expiry_month",
            Self::ExpiryYear => "expiry_year",
            Self::Cvv => "cvv",
            Self::CardholderName => "cardholder_name",
            Self::BankName => "bank_name",
            Self::AccountHolderName => "account_holder_name",
            Self::AccountNumber => "account_number",
            Self::Iban => "iban",
            Self::SwiftCode => "swift_code",
            Self::AccountType => "account_type",
            Self::Currency => "currency",
            Self::TaxId => "tax_id",
            Self::TaxIdType => "tax_id_type",
            Self::LegalName => "legal_name",
            Self::PhoneNumber => "phone_number",
            Self::TaxAddress => "tax_address",
            Self::TaxCity => "tax_city",
            Self::TaxState => "tax_state",
            Self::TaxPostalCode => "tax_postal_code",
            Self::TaxCountry => "tax_country",
            Self::TaxWithholdingRate => "tax_withholding_rate",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::DocumentType => "document_type",
            Self::DocumentNumber => "document_number",
            Self::OriginalName => "original_name",
            Self::DocumentStatus => "status",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationReason {
    /// Required value absent or blank.
    Missing,
    InvalidFormat,
    ChecksumFailed,
    Expired,
    InvalidLength { expected: usize },
    OutOfRange,
    /// Well-formed but not permitted in this context.
    NotAllowed,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "is required"),
            Self::InvalidFormat => write!(f, "has an invalid format"),
            Self::ChecksumFailed => write!(f, "failed its checksum"),
            Self::Expired => write!(f, "has expired"),
            Self::InvalidLength { expected } => write!(f, "must be {expected} characters"),
            Self::OutOfRange => write!(f, "is out of range"),
            Self::NotAllowed => write!(f, "is not allowed here"),
        }
    }
}

/// Field-level validation failure surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub const fn new(field: Field, reason: ValidationReason) -> Self {
        Self { field, reason }
    }

    pub const fn missing(field: Field) -> Self {
        Self::new(field, ValidationReason::Missing)
    }

    /// JSON body used by the HTTP routers for 422 responses.
    pub fn payload(&self) -> Value {
        json!({
            "error": self.to_string(),
            "field": self.field.label(),
            "reason": self.reason,
        })
    }
}

/// Returns the trimmed value when non-blank.
pub(crate) fn required<'a>(value: &'a str, field: Field) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::missing(field))
    } else {
        Ok(trimmed)
    }
}

/// Same as [`required`] for optional inputs.
pub(crate) fn required_opt<'a>(
    value: Option<&'a str>,
    field: Field,
) -> Result<&'a str, ValidationError> {
    required(value.unwrap_or_default(), field)
}

/// Trimmed, non-blank optional text.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
