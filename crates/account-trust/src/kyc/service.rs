use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::documents::{accepted_content_type, DocumentStore, StoreOutcome};
use super::domain::{
    DocumentStatus, DocumentUpload, KycDocument, KycDocumentType, KycStatus, KycVerification,
    PersonalInfo, ReviewDecision,
};
use super::repository::KycRepository;
use super::steps::{document_gate, personal_info_gate, KycStep, KycWizard, StepError};
use crate::domain::{next_record_id, OwnerId, RecordId};
use crate::repository::RepositoryError;
use crate::validation::{non_blank, Field, ValidationError, ValidationReason};

/// Document collection, submission and the persisted review lifecycle.
pub struct KycWorkflow<R, D> {
    verifications: Arc<R>,
    documents: Arc<D>,
    auto_review: bool,
}

impl<R, D> KycWorkflow<R, D>
where
    R: KycRepository + 'static,
    D: DocumentStore + 'static,
{
    /// With `auto_review`, a submission is written straight to `under_review`.
    pub fn new(verifications: Arc<R>, documents: Arc<D>, auto_review: bool) -> Self {
        Self {
            verifications,
            documents,
            auto_review,
        }
    }

    /// Stores a new document. A type that already has a pending or verified document
    /// cannot be uploaded again; rejected ones may be replaced. While the verification
    /// is rejected, a new upload supersedes the pending document of its type so the
    /// owner can amend the submission.
    pub fn upload_document(
        &self,
        owner: &OwnerId,
        upload: DocumentUpload,
        now: DateTime<Utc>,
    ) -> Result<KycDocument, KycError> {
        let content_type = accepted_content_type(&upload.original_name)?;
        let amending = self
            .verifications
            .fetch(owner)?
            .is_some_and(|record| record.status == KycStatus::Rejected);

        let document = KycDocument {
            id: next_record_id("doc"),
            owner_id: owner.clone(),
            document_type: upload.document_type,
            original_name: upload.original_name.trim().to_string(),
            content_type,
            status: DocumentStatus::Pending,
            uploaded_at: now,
            reviewed_at: None,
        };
        let (stored, superseded) = match self.documents.store_exclusive(document, amending)? {
            StoreOutcome::Stored {
                document,
                superseded,
            } => (document, superseded),
            StoreOutcome::Occupied(active) => {
                return Err(KycError::Conflict(KycConflict::DocumentAlreadyActive {
                    document_type: upload.document_type,
                    status: active.status,
                }))
            }
        };

        if let Some(previous) = &superseded {
            info!(owner = %owner, id = %previous, "kyc document superseded");
        }
        info!(
            owner = %owner,
            id = %stored.id,
            document_type = stored.document_type.label(),
            "kyc document uploaded"
        );
        Ok(stored)
    }

    pub fn documents(&self, owner: &OwnerId) -> Result<Vec<KycDocument>, KycError> {
        Ok(self.documents.list(owner)?)
    }

    /// Out-of-band authenticity result for one document. Verified documents are final.
    pub fn record_document_review(
        &self,
        owner: &OwnerId,
        id: &RecordId,
        status: DocumentStatus,
        now: DateTime<Utc>,
    ) -> Result<KycDocument, KycError> {
        if status == DocumentStatus::Pending {
            return Err(
                ValidationError::new(Field::DocumentStatus, ValidationReason::NotAllowed).into(),
            );
        }

        let current = self
            .documents
            .list(owner)?
            .into_iter()
            .find(|document| &document.id == id)
            .ok_or_else(|| KycError::DocumentNotFound { id: id.clone() })?;
        if current.status == DocumentStatus::Verified {
            return Err(KycError::Conflict(KycConflict::DocumentImmutable {
                id: id.clone(),
            }));
        }

        let updated = self.documents.set_status(owner, id, status, now)?;
        info!(
            owner = %owner,
            id = %id,
            status = updated.status.label(),
            "kyc document reviewed"
        );
        Ok(updated)
    }

    /// Single all-or-nothing write of personal info, document snapshot and status.
    /// First submissions create the record; a rejected record starts a new cycle.
    pub fn submit(
        &self,
        owner: &OwnerId,
        personal_info: PersonalInfo,
        now: DateTime<Utc>,
    ) -> Result<KycVerification, KycError> {
        personal_info_gate(&personal_info)?;

        let documents: Vec<KycDocument> = self
            .documents
            .list(owner)?
            .into_iter()
            .filter(KycDocument::is_active)
            .collect();
        document_gate(&documents)?;

        let existing = self.verifications.fetch(owner)?;
        let (id, submission_count, expected) = match &existing {
            None => (next_record_id("kyc"), 1, None),
            Some(record) if record.status == KycStatus::Rejected => (
                record.id.clone(),
                record.submission_count + 1,
                Some(KycStatus::Rejected),
            ),
            Some(record) if record.status.is_terminal() => {
                return Err(KycError::Conflict(KycConflict::VerificationFinal {
                    status: record.status,
                }))
            }
            Some(record) => {
                return Err(KycError::Conflict(KycConflict::SubmissionInProgress {
                    status: record.status,
                }))
            }
        };

        let status = if self.auto_review {
            KycStatus::UnderReview
        } else {
            KycStatus::Pending
        };
        let record = KycVerification {
            id,
            owner_id: owner.clone(),
            verification_code: verification_code(owner, submission_count),
            personal_info: normalize_personal_info(personal_info),
            documents,
            status,
            submitted_at: now,
            reviewed_at: None,
            rejection_reason: None,
            submission_count,
        };

        let stored = self
            .verifications
            .compare_and_save(record, expected)
            .map_err(conflict_on_race)?;
        info!(
            owner = %owner,
            code = %stored.verification_code,
            cycle = stored.submission_count,
            status = stored.status.label(),
            "kyc verification submitted"
        );
        Ok(stored)
    }

    /// Reviewer picked the submission up: `pending -> under_review`.
    pub fn begin_review(&self, owner: &OwnerId) -> Result<KycVerification, KycError> {
        let current = self.require_verification(owner)?;
        let stored = self.transition(current, KycStatus::UnderReview, |_| {})?;
        info!(owner = %owner, code = %stored.verification_code, "kyc review started");
        Ok(stored)
    }

    /// Reviewer verdict: `under_review -> approved | rejected | flagged`.
    pub fn record_review(
        &self,
        owner: &OwnerId,
        decision: ReviewDecision,
        now: DateTime<Utc>,
    ) -> Result<KycVerification, KycError> {
        let current = self.require_verification(owner)?;
        let target = decision.target_status();
        let rejection_reason = match decision {
            ReviewDecision::Reject { reason } => non_blank(reason),
            ReviewDecision::Approve | ReviewDecision::Flag => None,
        };

        let stored = self.transition(current, target, |record| {
            record.reviewed_at = Some(now);
            record.rejection_reason = rejection_reason;
        })?;
        if stored.status == KycStatus::Flagged {
            warn!(owner = %owner, code = %stored.verification_code, "kyc verification flagged");
        } else {
            info!(
                owner = %owner,
                code = %stored.verification_code,
                status = stored.status.label(),
                "kyc verification reviewed"
            );
        }
        Ok(stored)
    }

    pub fn verification(&self, owner: &OwnerId) -> Result<Option<KycVerification>, KycError> {
        Ok(self.verifications.fetch(owner)?)
    }

    /// Wizard position to resume from: the status screen once anything was submitted.
    pub fn wizard(&self, owner: &OwnerId) -> Result<KycWizard, KycError> {
        Ok(match self.verifications.fetch(owner)? {
            Some(_) => KycWizard::at(KycStep::Status),
            None => KycWizard::new(),
        })
    }

    fn require_verification(&self, owner: &OwnerId) -> Result<KycVerification, KycError> {
        self.verifications
            .fetch(owner)?
            .ok_or_else(|| KycError::VerificationNotFound {
                owner: owner.clone(),
            })
    }

    fn transition(
        &self,
        mut record: KycVerification,
        next: KycStatus,
        apply: impl FnOnce(&mut KycVerification),
    ) -> Result<KycVerification, KycError> {
        let from = record.status;
        if !from.can_transition_to(next) {
            return Err(KycError::Conflict(KycConflict::IllegalTransition {
                from,
                to: next,
            }));
        }

        record.status = next;
        apply(&mut record);
        self.verifications
            .compare_and_save(record, Some(from))
            .map_err(conflict_on_race)
    }
}

fn verification_code(owner: &OwnerId, cycle: u32) -> String {
    format!("KYC-{owner}-{cycle}")
}

fn normalize_personal_info(info: PersonalInfo) -> PersonalInfo {
    PersonalInfo {
        first_name: info.first_name.trim().to_string(),
        last_name: info.last_name.trim().to_string(),
        nationality: non_blank(info.nationality),
        address: non_blank(info.address),
        document_number: info.document_number.trim().to_string(),
        ..info
    }
}

fn conflict_on_race(err: RepositoryError) -> KycError {
    match err {
        RepositoryError::Conflict => KycError::Conflict(KycConflict::ConcurrentUpdate),
        other => KycError::Repository(other),
    }
}

/// Reasons a KYC request collides with the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KycConflict {
    #[error("a {document_type} document is already {status}")]
    DocumentAlreadyActive {
        document_type: KycDocumentType,
        status: DocumentStatus,
    },
    #[error("document {id} is verified and cannot change")]
    DocumentImmutable { id: RecordId },
    #[error("a submission is already {status}")]
    SubmissionInProgress { status: KycStatus },
    #[error("verification is {status} and cannot be resubmitted")]
    VerificationFinal { status: KycStatus },
    #[error("cannot move verification from {from} to {to}")]
    IllegalTransition { from: KycStatus, to: KycStatus },
    #[error("verification changed concurrently")]
    ConcurrentUpdate,
}

/// Error raised by the KYC workflow.
#[derive(Debug, thiserror::Error)]
pub enum KycError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Step(#[from] StepError),
    #[error("document {id} not found")]
    DocumentNotFound { id: RecordId },
    #[error("no verification on file for {owner}")]
    VerificationNotFound { owner: OwnerId },
    #[error(transparent)]
    Conflict(KycConflict),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
