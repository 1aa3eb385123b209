use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{OwnerId, RecordId};
use crate::kyc::{
    insert_exclusive, DocumentStatus, DocumentStore, DocumentUpload, KycDocument,
    KycDocumentType, KycRepository, KycStatus, KycVerification, KycWorkflow, PersonalInfo,
    StoreOutcome,
};
use crate::repository::RepositoryError;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap()
}

pub(super) fn later(minutes: i64) -> DateTime<Utc> {
    now() + Duration::minutes(minutes)
}

pub(super) fn owner() -> OwnerId {
    OwnerId::new("host-42")
}

pub(super) fn upload(document_type: KycDocumentType, name: &str) -> DocumentUpload {
    DocumentUpload {
        document_type,
        original_name: name.to_string(),
    }
}

pub(super) fn personal_info() -> PersonalInfo {
    PersonalInfo {
        first_name: " John ".to_string(),
        last_name: "Doe".to_string(),
        nationality: Some("QA".to_string()),
        document_type: Some(KycDocumentType::Passport),
        document_number: "P1234567".to_string(),
        ..PersonalInfo::default()
    }
}

pub(super) type MemoryWorkflow = KycWorkflow<MemoryKycStore, MemoryDocumentStore>;

pub(super) fn build_workflow(
    auto_review: bool,
) -> (MemoryWorkflow, Arc<MemoryKycStore>, Arc<MemoryDocumentStore>) {
    let verifications = Arc::new(MemoryKycStore::default());
    let documents = Arc::new(MemoryDocumentStore::default());
    let workflow = KycWorkflow::new(verifications.clone(), documents.clone(), auto_review);
    (workflow, verifications, documents)
}

/// Uploads a passport and a selfie so submission gates pass.
pub(super) fn upload_required_documents(workflow: &MemoryWorkflow) -> Vec<KycDocument> {
    vec![
        workflow
            .upload_document(
                &owner(),
                upload(KycDocumentType::Passport, "passport.jpg"),
                now(),
            )
            .expect("passport accepted"),
        workflow
            .upload_document(&owner(), upload(KycDocumentType::Selfie, "selfie.png"), now())
            .expect("selfie accepted"),
    ]
}

#[derive(Default)]
pub(super) struct MemoryKycStore {
    records: Arc<Mutex<HashMap<OwnerId, KycVerification>>>,
}

impl MemoryKycStore {
    /// Overwrites the stored status, simulating a concurrent writer.
    pub(super) fn force_status(&self, owner: &OwnerId, status: KycStatus) {
        let mut guard = self.records.lock().expect("kyc mutex poisoned");
        if let Some(record) = guard.get_mut(owner) {
            record.status = status;
        }
    }
}

impl KycRepository for MemoryKycStore {
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

pub(super) struct UnavailableKycStore;

impl KycRepository for UnavailableKycStore {
    fn fetch(&self, _owner: &OwnerId) -> Result<Option<KycVerification>, RepositoryError> {
        Ok(None)
    }

    fn compare_and_save(
        &self,
        _record: KycVerification,
        _expected: Option<KycStatus>,
    ) -> Result<KycVerification, RepositoryError> {
        Err(RepositoryError::Unavailable("write timeout".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryDocumentStore {
    documents: Arc<Mutex<Vec<KycDocument>>>,
}

impl DocumentStore for MemoryDocumentStore {
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
