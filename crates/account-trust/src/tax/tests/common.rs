use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::OwnerId;
use crate::repository::RepositoryError;
use crate::tax::{
    TaxInformation, TaxProfileDraft, TaxProfileManager, TaxProfileRepository, TaxRules,
};
use crate::verification::{ContactChannel, ContactVerifier, VerificationError};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap()
}

pub(super) fn owner() -> OwnerId {
    OwnerId::new("host-42")
}

pub(super) fn draft() -> TaxProfileDraft {
    TaxProfileDraft {
        tax_id: "28763400123".to_string(),
        legal_name: "John Doe".to_string(),
        phone_number: "+974 5555 1234".to_string(),
        tax_address: "Building 12, Street 850".to_string(),
        tax_city: "Doha".to_string(),
        ..TaxProfileDraft::default()
    }
}

pub(super) fn build_manager() -> (
    TaxProfileManager<MemoryTaxStore, MemoryVerifier>,
    Arc<MemoryTaxStore>,
    Arc<MemoryVerifier>,
) {
    let store = Arc::new(MemoryTaxStore::default());
    let verifier = Arc::new(MemoryVerifier::default());
    let manager = TaxProfileManager::new(store.clone(), verifier.clone(), TaxRules::new("QA"));
    (manager, store, verifier)
}

#[derive(Default)]
pub(super) struct MemoryTaxStore {
    records: Arc<Mutex<HashMap<OwnerId, TaxInformation>>>,
}

impl MemoryTaxStore {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("tax mutex poisoned").len()
    }
}

impl TaxProfileRepository for MemoryTaxStore {
    fn fetch(&self, owner: &OwnerId) -> Result<Option<TaxInformation>, RepositoryError> {
        let guard = self.records.lock().expect("tax mutex poisoned");
        Ok(guard.get(owner).cloned())
    }

    fn put(&self, record: TaxInformation) -> Result<TaxInformation, RepositoryError> {
        let mut guard = self.records.lock().expect("tax mutex poisoned");
        guard.insert(record.owner_id.clone(), record.clone());
        Ok(record)
    }

    fn delete(&self, owner: &OwnerId) -> Result<bool, RepositoryError> {
        let mut guard = self.records.lock().expect("tax mutex poisoned");
        Ok(guard.remove(owner).is_some())
    }
}

/// Store that reports `NotFound` for deletes of absent profiles.
pub(super) struct StrictDeleteStore;

impl TaxProfileRepository for StrictDeleteStore {
    fn fetch(&self, _owner: &OwnerId) -> Result<Option<TaxInformation>, RepositoryError> {
        Ok(None)
    }

    fn put(&self, _record: TaxInformation) -> Result<TaxInformation, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn delete(&self, _owner: &OwnerId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub(super) struct MemoryVerifier {
    verified: Mutex<HashSet<(OwnerId, ContactChannel, String)>>,
}

impl MemoryVerifier {
    pub(super) fn verify(&self, owner: &OwnerId, channel: ContactChannel, value: &str) {
        self.verified
            .lock()
            .expect("verifier mutex poisoned")
            .insert((owner.clone(), channel, value.to_string()));
    }
}

impl ContactVerifier for MemoryVerifier {
    fn is_verified(
        &self,
        owner: &OwnerId,
        channel: ContactChannel,
        value: &str,
    ) -> Result<bool, VerificationError> {
        let guard = self.verified.lock().expect("verifier mutex poisoned");
        Ok(guard.contains(&(owner.clone(), channel, value.to_string())))
    }

    fn has_verified(
        &self,
        owner: &OwnerId,
        channel: ContactChannel,
    ) -> Result<bool, VerificationError> {
        let guard = self.verified.lock().expect("verifier mutex poisoned");
        Ok(guard
            .iter()
            .any(|(candidate, kind, _)| candidate == owner && *kind == channel))
    }
}

pub(super) struct OfflineVerifier;

impl ContactVerifier for OfflineVerifier {
    fn is_verified(
        &self,
        _owner: &OwnerId,
        _channel: ContactChannel,
        _value: &str,
    ) -> Result<bool, VerificationError> {
        Err(VerificationError::Unavailable("otp gateway timeout".to_string()))
    }

    fn has_verified(
        &self,
        _owner: &OwnerId,
        _channel: ContactChannel,
    ) -> Result<bool, VerificationError> {
        Err(VerificationError::Unavailable("otp gateway timeout".to_string()))
    }
}
