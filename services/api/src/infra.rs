use account_trust::config::TrustConfig;
use account_trust::domain::{OwnerId, RecordId};
use account_trust::instruments::{
    BankAccount, Instrument, InstrumentGuard, InstrumentRegistry, InstrumentRepository,
    PaymentMethod,
};
use account_trust::kyc::{
    insert_exclusive, DocumentStatus, DocumentStore, KycDocument, KycRepository, KycStatus,
    KycVerification, KycWorkflow, StoreOutcome,
};
use account_trust::repository::RepositoryError;
use account_trust::tax::{TaxInformation, TaxProfileManager, TaxProfileRepository, TaxRules};
use account_trust::verification::{
    normalize_phone, ContactChannel, ContactVerifier, VerificationError,
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Registry = InstrumentRegistry<
    InMemoryInstrumentStore<PaymentMethod>,
    InMemoryInstrumentStore<BankAccount>,
>;
pub(crate) type TaxManager = TaxProfileManager<InMemoryTaxStore, InMemoryContactVerifier>;
pub(crate) type Workflow = KycWorkflow<InMemoryKycStore, InMemoryDocumentStore>;

/// Services wired to the in-memory collaborators.
#[derive(Clone)]
pub(crate) struct TrustServices {
    pub(crate) registry: Arc<Registry>,
    pub(crate) tax: Arc<TaxManager>,
    pub(crate) kyc: Arc<Workflow>,
    pub(crate) contacts: Arc<InMemoryContactVerifier>,
}

impl TrustServices {
    pub(crate) fn in_memory(config: &TrustConfig) -> Self {
        let contacts = Arc::new(InMemoryContactVerifier::default());
        let registry = Arc::new(InstrumentRegistry::new(
            Arc::new(InMemoryInstrumentStore::default()),
            Arc::new(InMemoryInstrumentStore::default()),
            InstrumentGuard::new(config.default_currency.clone()),
        ));
        let tax = Arc::new(TaxProfileManager::new(
            Arc::new(InMemoryTaxStore::default()),
            contacts.clone(),
            TaxRules::new(config.default_tax_country.clone()),
        ));
        let kyc = Arc::new(KycWorkflow::new(
            Arc::new(InMemoryKycStore::default()),
            Arc::new(InMemoryDocumentStore::default()),
            config.kyc_auto_review,
        ));

        Self {
            registry,
            tax,
            kyc,
            contacts,
        }
    }
}

#[derive(Clone)]
pub(crate) struct InMemoryInstrumentStore<T> {
    records: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for InMemoryInstrumentStore<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Instrument> InstrumentRepository<T> for InMemoryInstrumentStore<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.records.lock().expect("instrument mutex poisoned");
        if guard.iter().any(|existing| existing.id() == record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RecordId) -> Result<Option<T>, RepositoryError> {
        let guard = self.records.lock().expect("instrument mutex poisoned");
        Ok(guard.iter().find(|record| record.id() == id).cloned())
    }

    fn list(&self, owner: &OwnerId) -> Result<Vec<T>, RepositoryError> {
        let guard = self.records.lock().expect("instrument mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.owner_id() == owner)
            .cloned()
            .collect())
    }

    fn delete(&self, id: &RecordId) -> Result<Option<T>, RepositoryError> {
        let mut guard = self.records.lock().expect("instrument mutex poisoned");
        let position = guard.iter().position(|record| record.id() == id);
        Ok(position.map(|index| guard.remove(index)))
    }

    fn swap_default(&self, owner: &OwnerId, id: &RecordId) -> Result<T, RepositoryError> {
        let mut guard = self.records.lock().expect("instrument mutex poisoned");
        let target = guard
            .iter()
            .position(|record| record.owner_id() == owner && record.id() == id)
            .ok_or(RepositoryError::NotFound)?;

        for record in guard.iter_mut().filter(|record| record.owner_id() == owner) {
            record.set_default_flag(false);
        }
        guard[target].set_default_flag(true);
        Ok(guard[target].clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTaxStore {
    records: Arc<Mutex<HashMap<OwnerId, TaxInformation>>>,
}

impl TaxProfileRepository for InMemoryTaxStore {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryKycStore {
    records: Arc<Mutex<HashMap<OwnerId, KycVerification>>>,
}

impl KycRepository for InMemoryKycStore {
    fn fetch(&self, owner: &OwnerId) -> Result<Option<KycVerification>, RepositoryError> {
        let guard = self.records.lock().expect("kyc mutex poisoned");
        Ok(guard.get(owner).cloned())
    }

    fn compare_and_save(
        &self,
        record: KycVerification,
        expected: Option<KycStatus>,
    ) -> Result<KycVerification, RepositoryError> {
        let mut guard = self.records.lock().expect("kyc mutex poisoned");
        let current = guard.get(&record.owner_id).map(|existing| existing.status);
        if current != expected {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.owner_id.clone(), record.clone());
        Ok(record)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDocumentStore {
    documents: Arc<Mutex<Vec<KycDocument>>>,
}

impl DocumentStore for InMemoryDocumentStore {
    fn store_exclusive(
        &self,
        document: KycDocument,
        supersede_pending: bool,
    ) -> Result<StoreOutcome, RepositoryError> {
        let mut guard = self.documents.lock().expect("document mutex poisoned");
        Ok(insert_exclusive(&mut guard, document, supersede_pending))
    }

    fn list(&self, owner: &OwnerId) -> Result<Vec<KycDocument>, RepositoryError> {
        let guard = self.documents.lock().expect("document mutex poisoned");
        Ok(guard
            .iter()
            .filter(|document| &document.owner_id == owner)
            .cloned()
            .collect())
    }

    fn set_status(
        &self,
        owner: &OwnerId,
        id: &RecordId,
        status: DocumentStatus,
        reviewed_at: DateTime<Utc>,
    ) -> Result<KycDocument, RepositoryError> {
        let mut guard = self.documents.lock().expect("document mutex poisoned");
        let document = guard
            .iter_mut()
            .find(|document| &document.owner_id == owner && &document.id == id)
            .ok_or(RepositoryError::NotFound)?;
        document.status = status;
        document.reviewed_at = Some(reviewed_at);
        Ok(document.clone())
    }
}

/// Contact values marked verified by the (external) OTP flow.
#[derive(Default, Clone)]
pub(crate) struct InMemoryContactVerifier {
    verified: Arc<Mutex<HashSet<(OwnerId, ContactChannel, String)>>>,
}

impl InMemoryContactVerifier {
    pub(crate) fn mark_verified(&self, owner: &OwnerId, channel: ContactChannel, value: &str) {
        let value = match channel {
            ContactChannel::Phone => normalize_phone(value),
            ContactChannel::Email => value.trim().to_ascii_lowercase(),
        };
        self.verified
            .lock()
            .expect("verifier mutex poisoned")
            .insert((owner.clone(), channel, value));
    }
}

impl ContactVerifier for InMemoryContactVerifier {
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

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
