use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{OwnerId, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycDocumentType {
    Passport,
    NationalId,
    DriversLicense,
    UtilityBill,
    BankStatement,
    RentalAgreement,
    Selfie,
}

impl KycDocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::NationalId => "national_id",
            Self::DriversLicense => "drivers_license",
            Self::UtilityBill => "utility_bill",
            Self::BankStatement => "bank_statement",
            Self::RentalAgreement => "rental_agreement",
            Self::Selfie => "selfie",
        }
    }

    /// Government-issued photo identity documents.
    pub const fn is_identity(self) -> bool {
        matches!(self, Self::Passport | Self::NationalId | Self::DriversLicense)
    }

    pub const fn is_address_proof(self) -> bool {
        matches!(
            self,
            Self::UtilityBill | Self::BankStatement | Self::RentalAgreement
        )
    }
}

impl fmt::Display for KycDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Verified,
    Rejected,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycDocument {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub document_type: KycDocumentType,
    pub original_name: String,
    pub content_type: String,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl KycDocument {
    /// Pending and verified documents count toward the upload gate; rejected ones do not.
    pub fn is_active(&self) -> bool {
        self.status != DocumentStatus::Rejected
    }
}

/// Upload metadata. File bytes travel through the document store, not this crate.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUpload {
    pub document_type: KycDocumentType,
    #[serde(default)]
    pub original_name: String,
}

/// Persisted verification lifecycle.
///
/// ```text
/// pending -> under_review -> approved | rejected | flagged
/// rejected -> pending
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Flagged,
}

impl KycStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Flagged => "flagged",
        }
    }

    pub const fn can_transition_to(self, next: KycStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::UnderReview)
                | (Self::UnderReview, Self::Approved)
                | (Self::UnderReview, Self::Rejected)
                | (Self::UnderReview, Self::Flagged)
                | (Self::Rejected, Self::Pending)
        )
    }

    /// No user-initiated transition leaves these states.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Flagged)
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub document_type: Option<KycDocumentType>,
    pub document_number: String,
    pub document_expiry: Option<NaiveDate>,
}

/// One active verification per owner, reused across resubmission cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycVerification {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub verification_code: String,
    pub personal_info: PersonalInfo,
    pub documents: Vec<KycDocument>,
    pub status: KycStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub submission_count: u32,
}

/// Outcome delivered by the external reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject {
        #[serde(default)]
        reason: Option<String>,
    },
    Flag,
}

impl ReviewDecision {
    pub const fn target_status(&self) -> KycStatus {
        match self {
            Self::Approve => KycStatus::Approved,
            Self::Reject { .. } => KycStatus::Rejected,
            Self::Flag => KycStatus::Flagged,
        }
    }
}
