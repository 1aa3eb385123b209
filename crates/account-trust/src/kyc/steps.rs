//! Client-side wizard gating. Navigation state only; the persisted lifecycle lives in
//! [`KycStatus`](super::domain::KycStatus) and is never touched here.

use std::fmt;

use serde::Serialize;

use super::domain::{KycDocument, KycDocumentType, KycStatus, PersonalInfo};
use crate::validation::{required, Field, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStep {
    Documents,
    PersonalInfo,
    Review,
    Status,
}

impl KycStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::PersonalInfo => "personal_info",
            Self::Review => "review",
            Self::Status => "status",
        }
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Documents => Some(Self::PersonalInfo),
            Self::PersonalInfo => Some(Self::Review),
            Self::Review => Some(Self::Status),
            Self::Status => None,
        }
    }

    const fn previous(self) -> Option<Self> {
        match self {
            Self::PersonalInfo => Some(Self::Documents),
            Self::Review => Some(Self::PersonalInfo),
            Self::Documents | Self::Status => None,
        }
    }
}

impl fmt::Display for KycStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("an identity document (passport, national id or driver's license) is required")]
    MissingIdentityDocument,
    #[error("exactly one selfie is required, found {found}")]
    SelfieCount { found: usize },
    #[error(transparent)]
    Incomplete(#[from] ValidationError),
    #[error("verification has not been submitted yet")]
    NotSubmitted,
    #[error("cannot move {direction} from the {step} step")]
    Boundary {
        step: KycStep,
        direction: &'static str,
    },
    #[error("only a rejected verification can be restarted, current status is {status}")]
    RestartNotAllowed { status: KycStatus },
}

/// Step 1 gate: at least one active identity document and exactly one active selfie.
/// Address-proof documents never affect the result.
pub fn document_gate(documents: &[KycDocument]) -> Result<(), StepError> {
    let active = documents.iter().filter(|document| document.is_active());
    let mut identity = 0;
    let mut selfies = 0;
    for document in active {
        if document.document_type.is_identity() {
            identity += 1;
        } else if document.document_type == KycDocumentType::Selfie {
            selfies += 1;
        }
    }

    if identity == 0 {
        return Err(StepError::MissingIdentityDocument);
    }
    if selfies != 1 {
        return Err(StepError::SelfieCount { found: selfies });
    }
    Ok(())
}

/// Step 2 gate: first name, last name, document type and number.
pub fn personal_info_gate(info: &PersonalInfo) -> Result<(), ValidationError> {
    required(&info.first_name, Field::FirstName)?;
    required(&info.last_name, Field::LastName)?;
    if info.document_type.is_none() {
        return Err(ValidationError::missing(Field::DocumentType));
    }
    required(&info.document_number, Field::DocumentNumber)?;
    Ok(())
}

/// Sequential wizard: Documents -> PersonalInfo -> Review -> Status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KycWizard {
    step: KycStep,
}

impl Default for KycWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl KycWizard {
    pub const fn new() -> Self {
        Self {
            step: KycStep::Documents,
        }
    }

    pub const fn at(step: KycStep) -> Self {
        Self { step }
    }

    pub const fn step(&self) -> KycStep {
        self.step
    }

    /// Moves forward when the current step's gate passes. Leaving Review requires the
    /// submission to have been accepted (`submitted` carries its status).
    pub fn advance(
        &mut self,
        documents: &[KycDocument],
        personal_info: &PersonalInfo,
        submitted: Option<KycStatus>,
    ) -> Result<KycStep, StepError> {
        match self.step {
            KycStep::Documents => document_gate(documents)?,
            KycStep::PersonalInfo => personal_info_gate(personal_info)?,
            KycStep::Review => {
                if submitted.is_none() {
                    return Err(StepError::NotSubmitted);
                }
            }
            KycStep::Status => {}
        }

        let next = self.step.next().ok_or(StepError::Boundary {
            step: self.step,
            direction: "forward",
        })?;
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Result<KycStep, StepError> {
        let previous = self.step.previous().ok_or(StepError::Boundary {
            step: self.step,
            direction: "back",
        })?;
        self.step = previous;
        Ok(previous)
    }

    /// From the Status step, a rejected verification sends the user back to documents.
    pub fn restart_after_rejection(&mut self, status: KycStatus) -> Result<KycStep, StepError> {
        if self.step != KycStep::Status {
            return Err(StepError::Boundary {
                step: self.step,
                direction: "back",
            });
        }
        if status != KycStatus::Rejected {
            return Err(StepError::RestartNotAllowed { status });
        }
        self.step = KycStep::Documents;
        Ok(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OwnerId, RecordId};
    use crate::kyc::domain::DocumentStatus;
    use crate::validation::ValidationReason;
    use chrono::{TimeZone, Utc};

    fn document(document_type: KycDocumentType, status: DocumentStatus) -> KycDocument {
        KycDocument {
            id: RecordId::new(format!("doc-{}", document_type.label())),
            owner_id: OwnerId::new("host-42"),
            document_type,
            original_name: "upload.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            status,
            uploaded_at: Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap(),
            reviewed_at: None,
        }
    }

    fn personal_info() -> PersonalInfo {
        PersonalInfo {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            document_type: Some(KycDocumentType::Passport),
            document_number: "P1234567".to_string(),
            ..PersonalInfo::default()
        }
    }

    #[test]
    fn documents_gate_needs_identity_and_selfie() {
        let passport = document(KycDocumentType::Passport, DocumentStatus::Pending);
        let selfie = document(KycDocumentType::Selfie, DocumentStatus::Pending);
        let bill = document(KycDocumentType::UtilityBill, DocumentStatus::Verified);

        assert_eq!(
            document_gate(&[selfie.clone(), bill.clone()]),
            Err(StepError::MissingIdentityDocument)
        );
        assert_eq!(
            document_gate(&[passport.clone(), bill.clone()]),
            Err(StepError::SelfieCount { found: 0 })
        );
        assert_eq!(
            document_gate(&[passport.clone(), selfie.clone(), selfie.clone()]),
            Err(StepError::SelfieCount { found: 2 })
        );
        assert_eq!(document_gate(&[passport, selfie]), Ok(()));
    }

    #[test]
    fn rejected_documents_do_not_count() {
        let passport = document(KycDocumentType::Passport, DocumentStatus::Rejected);
        let selfie = document(KycDocumentType::Selfie, DocumentStatus::Verified);
        assert_eq!(
            document_gate(&[passport, selfie]),
            Err(StepError::MissingIdentityDocument)
        );
    }

    #[test]
    fn personal_info_gate_reports_first_missing_field() {
        let mut info = personal_info();
        assert_eq!(personal_info_gate(&info), Ok(()));

        info.document_type = None;
        assert_eq!(
            personal_info_gate(&info),
            Err(ValidationError::missing(Field::DocumentType))
        );

        info.last_name = "  ".to_string();
        assert_eq!(
            personal_info_gate(&info),
            Err(ValidationError::new(Field::LastName, ValidationReason::Missing))
        );
    }

    #[test]
    fn wizard_walks_forward_only_through_open_gates() {
        let documents = vec![
            document(KycDocumentType::NationalId, DocumentStatus::Pending),
            document(KycDocumentType::Selfie, DocumentStatus::Pending),
        ];
        let mut wizard = KycWizard::new();

        assert_eq!(
            wizard.advance(&[], &personal_info(), None),
            Err(StepError::MissingIdentityDocument)
        );
        assert_eq!(wizard.step(), KycStep::Documents);

        assert_eq!(
            wizard.advance(&documents, &PersonalInfo::default(), None),
            Ok(KycStep::PersonalInfo)
        );
        assert_eq!(
            wizard.advance(&documents, &PersonalInfo::default(), None),
            Err(StepError::Incomplete(ValidationError::missing(Field::FirstName)))
        );
        assert_eq!(
            wizard.advance(&documents, &personal_info(), None),
            Ok(KycStep::Review)
        );
        assert_eq!(
            wizard.advance(&documents, &personal_info(), None),
            Err(StepError::NotSubmitted)
        );
        assert_eq!(wizard.back(), Ok(KycStep::PersonalInfo));
        wizard
            .advance(&documents, &personal_info(), None)
            .expect("review again");
        assert_eq!(
            wizard.advance(&documents, &personal_info(), Some(KycStatus::UnderReview)),
            Ok(KycStep::Status)
        );
        assert!(matches!(
            wizard.advance(&documents, &personal_info(), Some(KycStatus::UnderReview)),
            Err(StepError::Boundary { .. })
        ));
    }

    #[test]
    fn only_rejection_reopens_the_wizard() {
        let mut wizard = KycWizard::at(KycStep::Status);
        assert!(matches!(wizard.back(), Err(StepError::Boundary { .. })));
        assert_eq!(
            wizard.restart_after_rejection(KycStatus::Approved),
            Err(StepError::RestartNotAllowed {
                status: KycStatus::Approved
            })
        );
        assert_eq!(
            wizard.restart_after_rejection(KycStatus::Rejected),
            Ok(KycStep::Documents)
        );
        assert!(matches!(
            wizard.restart_after_rejection(KycStatus::Rejected),
            Err(StepError::Boundary { .. })
        ));
    }
}
