use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{AccountType, BankAccountSubmission, CardSubmission};
use super::guard::InstrumentGuard;
use crate::domain::{OwnerId, RecordId};
use crate::validation::{Field, ValidationError, ValidationReason};

#[derive(Debug)]
pub enum BatchImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for BatchImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchImportError::Io(err) => write!(f, "failed to read instrument export: {}", err),
            BatchImportError::Csv(err) => write!(f, "invalid instrument CSV data: {}", err),
        }
    }
}

impl std::error::Error for BatchImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchImportError::Io(err) => Some(err),
            BatchImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BatchImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BatchImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    Cards,
    BankAccounts,
}

/// Validation verdict for a single CSV data row (1-based, header excluded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    pub row: usize,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub kind: BatchKind,
    pub rows: Vec<RowOutcome>,
}

impl BatchReport {
    pub fn accepted(&self) -> usize {
        self.rows.iter().filter(|row| row.accepted).count()
    }

    pub fn rejected(&self) -> usize {
        self.rows.len() - self.accepted()
    }
}

/// Dry-run validator for card and bank account exports. Nothing is persisted.
pub struct BatchValidator {
    guard: InstrumentGuard,
}

impl BatchValidator {
    pub fn new(guard: InstrumentGuard) -> Self {
        Self { guard }
    }

    pub fn validate_path<P: AsRef<Path>>(
        &self,
        path: P,
        kind: BatchKind,
        today: NaiveDate,
    ) -> Result<BatchReport, BatchImportError> {
        let file = File::open(path)?;
        self.validate_reader(file, kind, today)
    }

    pub fn validate_reader<R: Read>(
        &self,
        reader: R,
        kind: BatchKind,
        today: NaiveDate,
    ) -> Result<BatchReport, BatchImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let owner = OwnerId::new("batch");
        let mut rows = Vec::new();

        match kind {
            BatchKind::Cards => {
                for (index, record) in csv_reader.deserialize::<CardRow>().enumerate() {
                    let row = index + 1;
                    let outcome = record?
                        .into_submission()
                        .and_then(|submission| {
                            self.guard.payment_method_from_submission(
                                RecordId::new(format!("row-{row}")),
                                &owner,
                                &submission,
                                today,
                            )
                        })
                        .map(|card| format!("{} ending {}", card.card_type.label(), card.last4));
                    rows.push(RowOutcome::from_result(row, outcome));
                }
            }
            BatchKind::BankAccounts => {
                for (index, record) in csv_reader.deserialize::<BankRow>().enumerate() {
                    let row = index + 1;
                    let outcome = record?
                        .into_submission()
                        .and_then(|submission| {
                            self.guard.bank_account_from_submission(
                                RecordId::new(format!("row-{row}")),
                                &owner,
                                &submission,
                            )
                        })
                        .map(|account| {
                            format!("{} {}", account.bank_name, account.account_number)
                        });
                    rows.push(RowOutcome::from_result(row, outcome));
                }
            }
        }

        Ok(BatchReport { kind, rows })
    }
}

impl RowOutcome {
    fn from_result(row: usize, outcome: Result<String, ValidationError>) -> Self {
        match outcome {
            Ok(summary) => Self {
                row,
                accepted: true,
                summary: Some(summary),
                error: None,
            },
            Err(error) => Self {
                row,
                accepted: false,
                summary: None,
                error: Some(error),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct CardRow {
    #[serde(default)]
    card_number: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    expiry_month: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    expiry_year: Option<String>,
    #[serde(default)]
    cvv: String,
    #[serde(default)]
    cardholder_name: String,
}

impl CardRow {
    fn into_submission(self) -> Result<CardSubmission, ValidationError> {
        Ok(CardSubmission {
            expiry_month: parse_number(self.expiry_month, Field::ExpiryMonth)?,
            expiry_year: parse_number(self.expiry_year, Field::ExpiryYear)?,
            card_number: self.card_number,
            cvv: self.cvv,
            cardholder_name: self.cardholder_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BankRow {
    #[serde(default)]
    bank_name: String,
    #[serde(default)]
    account_holder_name: String,
    #[serde(default)]
    account_number: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    iban: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    swift_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    account_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    currency: Option<String>,
}

impl BankRow {
    fn into_submission(self) -> Result<BankAccountSubmission, ValidationError> {
        let account_type = match self.account_type {
            Some(raw) => Some(AccountType::parse(&raw).ok_or(ValidationError::new(
                Field::AccountType,
                ValidationReason::InvalidFormat,
            ))?),
            None => None,
        };

        Ok(BankAccountSubmission {
            bank_name: self.bank_name,
            account_holder_name: self.account_holder_name,
            account_number: self.account_number,
            iban: self.iban,
            swift_code: self.swift_code,
            account_type,
            currency: self.currency,
            ..BankAccountSubmission::default()
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    field: Field,
) -> Result<Option<T>, ValidationError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ValidationError::new(field, ValidationReason::InvalidFormat))
        })
        .transpose()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
    }

    #[test]
    fn card_rows_are_validated_independently() {
        let csv = "card_number,expiry_month,expiry_year,cvv,cardholder_name\n\
4532015112830366,12,2030,123,John Doe\n\
4532015112830367,12,2030,123,John Doe\n\
378282246310005,1,2027,1234,Jane Roe\n\
4532015112830366,xx,2030,123,John Doe\n";

        let report = BatchValidator::new(InstrumentGuard::default())
            .validate_reader(Cursor::new(csv), BatchKind::Cards, today())
            .expect("csv parses");

        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.accepted(), 2);
        assert_eq!(report.rejected(), 2);
        assert_eq!(report.rows[0].summary.as_deref(), Some("Visa ending 0366"));
        assert_eq!(
            report.rows[1].error,
            Some(ValidationError::new(
                Field::CardNumber,
                ValidationReason::ChecksumFailed
            ))
        );
        assert_eq!(
            report.rows[2].summary.as_deref(),
            Some("American Express ending 0005")
        );
        assert_eq!(
            report.rows[3].error,
            Some(ValidationError::new(
                Field::ExpiryMonth,
                ValidationReason::InvalidFormat
            ))
        );
    }

    #[test]
    fn bank_rows_report_missing_type() {
        let csv = "bank_name,account_holder_name,account_number,iban,swift_code,account_type,currency\n\
Doha Bank,John Doe,001234567890,QA58DOHB00001234567890ABCDEFG,DOHBQAQA,current,\n\
Doha Bank,John Doe,001234567890,,,,\n\
Doha Bank,John Doe,001234567890,,,brokerage,\n";

        let report = BatchValidator::new(InstrumentGuard::new("QAR"))
            .validate_reader(Cursor::new(csv), BatchKind::BankAccounts, today())
            .expect("csv parses");

        assert_eq!(report.accepted(), 1);
        assert_eq!(
            report.rows[0].summary.as_deref(),
            Some("Doha Bank ********7890")
        );
        assert_eq!(
            report.rows[1].error,
            Some(ValidationError::missing(Field::AccountType))
        );
        assert_eq!(
            report.rows[2].error,
            Some(ValidationError::new(
                Field::AccountType,
                ValidationReason::InvalidFormat
            ))
        );
    }

    #[test]
    fn validate_path_propagates_io_errors() {
        let error = BatchValidator::new(InstrumentGuard::default())
            .validate_path("./does-not-exist.csv", BatchKind::Cards, today())
            .expect_err("expected io error");

        match error {
            BatchImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
