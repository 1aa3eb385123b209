use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::{OwnerId, RecordId};
use crate::instruments::domain::{
    AccountType, BankAccount, BankAccountSubmission, CardSubmission, Instrument, PaymentMethod,
};
use crate::instruments::repository::InstrumentRepository;
use crate::instruments::{InstrumentGuard, InstrumentRegistry};
use crate::repository::RepositoryError;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

pub(super) fn owner() -> OwnerId {
    OwnerId::new("host-42")
}

pub(super) fn other_owner() -> OwnerId {
    OwnerId::new("guest-7")
}

pub(super) fn visa_card() -> CardSubmission {
    CardSubmission {
        card_number: "4532015112830366".to_string(),
        expiry_month: Some(12),
        expiry_year: Some(2030),
        cvv: "123".to_string(),
        cardholder_name: "John Doe".to_string(),
    }
}

pub(super) fn mastercard() -> CardSubmission {
    CardSubmission {
        card_number: "5555 5555 5555 4444".to_string(),
        expiry_month: Some(3),
        expiry_year: Some(2028),
        cvv: "321".to_string(),
        cardholder_name: "John Doe".to_string(),
    }
}

pub(super) fn bank_submission() -> BankAccountSubmission {
    BankAccountSubmission {
        bank_name: "Doha Bank".to_string(),
        account_holder_name: "John Doe".to_string(),
        account_number: "001234567890".to_string(),
        iban: Some("QA58DOHB00001234567890ABCDEFG".to_string()),
        swift_code: Some("DOHBQAQA".to_string()),
        account_type: Some(AccountType::Savings),
        ..BankAccountSubmission::default()
    }
}

pub(super) type MemoryRegistry =
    InstrumentRegistry<MemoryInstrumentStore<PaymentMethod>, MemoryInstrumentStore<BankAccount>>;

pub(super) fn build_registry() -> (
    MemoryRegistry,
    Arc<MemoryInstrumentStore<PaymentMethod>>,
    Arc<MemoryInstrumentStore<BankAccount>>,
) {
    let cards = Arc::new(MemoryInstrumentStore::default());
    let bank_accounts = Arc::new(MemoryInstrumentStore::default());
    let registry = InstrumentRegistry::new(
        cards.clone(),
        bank_accounts.clone(),
        InstrumentGuard::new("QAR"),
    );
    (registry, cards, bank_accounts)
}

/// Insertion-ordered store; every mutation happens under one lock.
pub(super) struct MemoryInstrumentStore<T> {
    pub(super) records: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for MemoryInstrumentStore<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Instrument> MemoryInstrumentStore<T> {
    pub(super) fn default_count(&self, owner: &OwnerId) -> usize {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|record| record.owner_id() == owner && record.is_default())
            .count()
    }
}

impl<T: Instrument> InstrumentRepository<T> for MemoryInstrumentStore<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.iter().any(|existing| existing.id() == record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RecordId) -> Result<Option<T>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.iter().find(|record| record.id() == id).cloned())
    }

    fn list(&self, owner: &OwnerId) -> Result<Vec<T>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.owner_id() == owner)
            .cloned()
            .collect())
    }

    fn delete(&self, id: &RecordId) -> Result<Option<T>, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let position = guard.iter().position(|record| record.id() == id);
        Ok(position.map(|index| guard.remove(index)))
    }

    fn swap_default(&self, owner: &OwnerId, id: &RecordId) -> Result<T, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if !guard
            .iter()
            .any(|record| record.owner_id() == owner && record.id() == id)
        {
            return Err(RepositoryError::NotFound);
        }

        let mut updated = None;
        for record in guard.iter_mut().filter(|record| record.owner_id() == owner) {
            let is_target = record.id() == id;
            record.set_default_flag(is_target);
            if is_target {
                updated = Some(record.clone());
            }
        }
        updated.ok_or(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableStore;

impl<T: Instrument> InstrumentRepository<T> for UnavailableStore {
    fn insert(&self, _record: T) -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &RecordId) -> Result<Option<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _owner: &OwnerId) -> Result<Vec<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &RecordId) -> Result<Option<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn swap_default(&self, _owner: &OwnerId, _id: &RecordId) -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
