use chrono::NaiveDate;

use super::domain::{
    AccountType, BankAccount, BankAccountSubmission, CardSubmission, PaymentMethod,
};
use crate::domain::{OwnerId, RecordId};
use crate::validation::{
    self, check_account_number, check_card_number, check_cvv, check_expiry, check_iban,
    check_swift, detect_card_brand, mask_account_number, Field, ValidationError,
    ValidationReason,
};

/// Turns raw submissions into storable records, failing on the first invalid field.
#[derive(Debug, Clone)]
pub struct InstrumentGuard {
    default_currency: String,
}

impl Default for InstrumentGuard {
    fn default() -> Self {
        Self::new("QAR")
    }
}

impl InstrumentGuard {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            default_currency: default_currency.into(),
        }
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// Missing fields are reported before any format check runs.
    pub fn payment_method_from_submission(
        &self,
        id: RecordId,
        owner: &OwnerId,
        submission: &CardSubmission,
        today: NaiveDate,
    ) -> Result<PaymentMethod, ValidationError> {
        validation::required(&submission.card_number, Field::CardNumber)?;
        let month = submission
            .expiry_month
            .ok_or(ValidationError::missing(Field::ExpiryMonth))?;
        let year = submission
            .expiry_year
            .ok_or(ValidationError::missing(Field::ExpiryYear))?;
        validation::required(&submission.cvv, Field::Cvv)?;
        let cardholder_name =
            validation::required(&submission.cardholder_name, Field::CardholderName)?;

        let digits = check_card_number(&submission.card_number)
            .map_err(|reason| ValidationError::new(Field::CardNumber, reason))?;

        check_expiry(month, year, today).map_err(|reason| {
            let field = match reason {
                ValidationReason::OutOfRange => Field::ExpiryMonth,
                _ => Field::ExpiryYear,
            };
            ValidationError::new(field, reason)
        })?;

        check_cvv(&submission.cvv, &digits)
            .map_err(|reason| ValidationError::new(Field::Cvv, reason))?;

        Ok(PaymentMethod {
            id,
            owner_id: owner.clone(),
            card_type: detect_card_brand(&digits),
            last4: digits[digits.len() - 4..].to_string(),
            expiry_month: month,
            expiry_year: year,
            cardholder_name: cardholder_name.to_string(),
            is_default: false,
        })
    }

    pub fn bank_account_from_submission(
        &self,
        id: RecordId,
        owner: &OwnerId,
        submission: &BankAccountSubmission,
    ) -> Result<BankAccount, ValidationError> {
        let bank_name = validation::required(&submission.bank_name, Field::BankName)?;
        let account_holder_name =
            validation::required(&submission.account_holder_name, Field::AccountHolderName)?;
        validation::required(&submission.account_number, Field::AccountNumber)?;
        let account_type: AccountType = submission
            .account_type
            .ok_or(ValidationError::missing(Field::AccountType))?;

        let digits = check_account_number(&submission.account_number)
            .map_err(|reason| ValidationError::new(Field::AccountNumber, reason))?;
        let iban = check_iban(submission.iban.as_deref())
            .map_err(|reason| ValidationError::new(Field::Iban, reason))?;
        let swift_code = check_swift(submission.swift_code.as_deref())
            .map_err(|reason| ValidationError::new(Field::SwiftCode, reason))?;

        let currency = match validation::non_blank(submission.currency.clone()) {
            Some(code) => {
                let code = code.to_ascii_uppercase();
                if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ValidationError::new(
                        Field::Currency,
                        ValidationReason::InvalidFormat,
                    ));
                }
                code
            }
            None => self.default_currency.clone(),
        };

        Ok(BankAccount {
            id,
            owner_id: owner.clone(),
            bank_name: bank_name.to_string(),
            account_holder_name: account_holder_name.to_string(),
            account_number: mask_account_number(&digits),
            iban,
            swift_code,
            routing_number: validation::non_blank(submission.routing_number.clone()),
            branch_code: validation::non_blank(submission.branch_code.clone()),
            bank_address: validation::non_blank(submission.bank_address.clone()),
            account_type,
            currency,
            is_default: false,
        })
    }
}
