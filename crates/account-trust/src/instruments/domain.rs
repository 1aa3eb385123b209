use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{OwnerId, RecordId};
use crate::validation::CardBrand;

/// Stored card. The full PAN and CVV never reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub card_type: CardBrand,
    pub last4: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cardholder_name: String,
    pub is_default: bool,
}

/// Card details as submitted by the caller.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardSubmission {
    pub card_number: String,
    pub expiry_month: Option<u32>,
    pub expiry_year: Option<i32>,
    pub cvv: String,
    pub cardholder_name: String,
}

impl fmt::Debug for CardSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardSubmission")
            .field("card_number", &"<redacted>")
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"<redacted>")
            .field("cardholder_name", &self.cardholder_name)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Savings,
    Checking,
    Current,
}

impl AccountType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Checking => "checking",
            Self::Current => "current",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "savings" => Some(Self::Savings),
            "checking" => Some(Self::Checking),
            "current" => Some(Self::Current),
            _ => None,
        }
    }
}

/// Payout account. `account_number` holds the masked form only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub bank_name: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub iban: Option<String>,
    pub swift_code: Option<String>,
    pub routing_number: Option<String>,
    pub branch_code: Option<String>,
    pub bank_address: Option<String>,
    pub account_type: AccountType,
    pub currency: String,
    pub is_default: bool,
}

/// Bank account details as submitted by the caller.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct BankAccountSubmission {
    pub bank_name: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub iban: Option<String>,
    pub swift_code: Option<String>,
    pub routing_number: Option<String>,
    pub branch_code: Option<String>,
    pub bank_address: Option<String>,
    pub account_type: Option<AccountType>,
    pub currency: Option<String>,
}

impl fmt::Debug for BankAccountSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankAccountSubmission")
            .field("bank_name", &self.bank_name)
            .field("account_holder_name", &self.account_holder_name)
            .field("account_number", &"<redacted>")
            .field("iban", &self.iban.as_ref().map(|_| "<redacted>"))
            .field("swift_code", &self.swift_code)
            .field("account_type", &self.account_type)
            .field("currency", &self.currency)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    PaymentMethod,
    BankAccount,
}

impl InstrumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PaymentMethod => "payment method",
            Self::BankAccount => "bank account",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Common surface of owner-scoped instruments sharing the single-default rule.
pub trait Instrument: Clone + Send + Sync + 'static {
    const KIND: InstrumentKind;

    fn id(&self) -> &RecordId;
    fn owner_id(&self) -> &OwnerId;
    fn is_default(&self) -> bool;
    /// Only stores call this, inside their atomic default swap.
    fn set_default_flag(&mut self, value: bool);
}

impl Instrument for PaymentMethod {
    const KIND: InstrumentKind = InstrumentKind::PaymentMethod;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    fn is_default(&self) -> bool {
        self.is_default
    }

    fn set_default_flag(&mut self, value: bool) {
        self.is_default = value;
    }
}

impl Instrument for BankAccount {
    const KIND: InstrumentKind = InstrumentKind::BankAccount;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    fn is_default(&self) -> bool {
        self.is_default
    }

    fn set_default_flag(&mut self, value: bool) {
        self.is_default = value;
    }
}

/// Result of removing an instrument. No replacement default is ever promoted, so
/// `default_cleared` tells the caller the owner now has no default of this kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome<T> {
    pub removed: T,
    pub default_cleared: bool,
}
