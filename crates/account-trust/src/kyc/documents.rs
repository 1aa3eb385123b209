use chrono::{DateTime, Utc};

use super::domain::{DocumentStatus, KycDocument};
use crate::domain::{OwnerId, RecordId};
use crate::repository::RepositoryError;
use crate::validation::{required, Field, ValidationError, ValidationReason};

/// Document storage collaborator. Stores file metadata keyed by owner.
pub trait DocumentStore: Send + Sync {
    /// Stores `document` unless the owner already has an active document of its type,
    /// checked and written as one atomic step. With `supersede_pending`, a pending
    /// document of that type is rejected (reviewed at `document.uploaded_at`) in the
    /// same step instead of blocking. Verified documents always block.
    fn store_exclusive(
        &self,
        document: KycDocument,
        supersede_pending: bool,
    ) -> Result<StoreOutcome, RepositoryError>;
    /// Owner's documents in upload order.
    fn list(&self, owner: &OwnerId) -> Result<Vec<KycDocument>, RepositoryError>;
    fn set_status(
        &self,
        owner: &OwnerId,
        id: &RecordId,
        status: DocumentStatus,
        reviewed_at: DateTime<Utc>,
    ) -> Result<KycDocument, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored {
        document: KycDocument,
        superseded: Option<RecordId>,
    },
    /// The active document holding the slot.
    Occupied(KycDocument),
}

/// [`DocumentStore::store_exclusive`] over a plain list, for stores that hold every
/// document behind one lock.
pub fn insert_exclusive(
    documents: &mut Vec<KycDocument>,
    document: KycDocument,
    supersede_pending: bool,
) -> StoreOutcome {
    let active = documents.iter_mut().find(|existing| {
        existing.owner_id == document.owner_id
            && existing.document_type == document.document_type
            && existing.is_active()
    });

    let superseded = match active {
        None => None,
        Some(existing) if supersede_pending && existing.status == DocumentStatus::Pending => {
            existing.status = DocumentStatus::Rejected;
            existing.reviewed_at = Some(document.uploaded_at);
            Some(existing.id.clone())
        }
        Some(existing) => return StoreOutcome::Occupied(existing.clone()),
    };

    documents.push(document.clone());
    StoreOutcome::Stored {
        document,
        superseded,
    }
}

/// Resolves the upload's content type from its file name. Only images and PDF pass.
pub fn accepted_content_type(original_name: &str) -> Result<String, ValidationError> {
    let name = required(original_name, Field::OriginalName)?;
    let guessed = mime_guess::from_path(name).first().ok_or(ValidationError::new(
        Field::OriginalName,
        ValidationReason::InvalidFormat,
    ))?;

    if guessed.type_() == mime::IMAGE || guessed == mime::APPLICATION_PDF {
        Ok(guessed.essence_str().to_string())
    } else {
        Err(ValidationError::new(
            Field::OriginalName,
            ValidationReason::NotAllowed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kyc::domain::KycDocumentType;
    use chrono::TimeZone;

    fn document(id: &str, document_type: KycDocumentType, minute: u32) -> KycDocument {
        KycDocument {
            id: RecordId::new(id),
            owner_id: OwnerId::new("host-42"),
            document_type,
            original_name: format!("{id}.jpg"),
            content_type: "image/jpeg".to_string(),
            status: DocumentStatus::Pending,
            uploaded_at: Utc.with_ymd_and_hms(2025, 6, 15, 9, minute, 0).unwrap(),
            reviewed_at: None,
        }
    }

    #[test]
    fn pending_document_blocks_unless_superseded() {
        let mut documents = vec![document("doc-1", KycDocumentType::Selfie, 0)];

        let duplicate = document("doc-2", KycDocumentType::Selfie, 5);
        match insert_exclusive(&mut documents, duplicate, false) {
            StoreOutcome::Occupied(active) => assert_eq!(active.id, RecordId::new("doc-1")),
            other => panic!("expected occupied slot, got {other:?}"),
        }
        assert_eq!(documents.len(), 1);

        let replacement = document("doc-3", KycDocumentType::Selfie, 10);
        match insert_exclusive(&mut documents, replacement.clone(), true) {
            StoreOutcome::Stored {
                document,
                superseded,
            } => {
                assert_eq!(document, replacement);
                assert_eq!(superseded, Some(RecordId::new("doc-1")));
            }
            other => panic!("expected stored document, got {other:?}"),
        }
        assert_eq!(documents[0].status, DocumentStatus::Rejected);
        assert_eq!(documents[0].reviewed_at, Some(replacement.uploaded_at));
        assert_eq!(documents.len(), 2);
    }

    #[test]
    fn verified_document_is_never_superseded() {
        let mut verified = document("doc-1", KycDocumentType::Passport, 0);
        verified.status = DocumentStatus::Verified;
        let mut documents = vec![verified];

        let passport = document("doc-2", KycDocumentType::Passport, 5);
        match insert_exclusive(&mut documents, passport, true) {
            StoreOutcome::Occupied(active) => assert_eq!(active.status, DocumentStatus::Verified),
            other => panic!("expected occupied slot, got {other:?}"),
        }

        let selfie = document("doc-3", KycDocumentType::Selfie, 5);
        match insert_exclusive(&mut documents, selfie, false) {
            StoreOutcome::Stored { superseded: None, .. } => {}
            other => panic!("expected stored selfie, got {other:?}"),
        }
    }

    #[test]
    fn images_and_pdf_are_accepted() {
        assert_eq!(accepted_content_type("passport.JPG").as_deref(), Ok("image/jpeg"));
        assert_eq!(accepted_content_type("selfie.png").as_deref(), Ok("image/png"));
        assert_eq!(
            accepted_content_type("statement.pdf").as_deref(),
            Ok("application/pdf")
        );
    }

    #[test]
    fn other_files_are_refused() {
        assert_eq!(
            accepted_content_type("notes.docx"),
            Err(ValidationError::new(
                Field::OriginalName,
                ValidationReason::NotAllowed
            ))
        );
        assert_eq!(
            accepted_content_type("scan"),
            Err(ValidationError::new(
                Field::OriginalName,
                ValidationReason::InvalidFormat
            ))
        );
        assert_eq!(
            accepted_content_type("  "),
            Err(ValidationError::missing(Field::OriginalName))
        );
    }
}
