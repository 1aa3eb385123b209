//! Identity verification: document collection, wizard gating and the review lifecycle.

pub mod documents;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod steps;

#[cfg(test)]
mod tests;

pub use documents::{accepted_content_type, insert_exclusive, DocumentStore, StoreOutcome};
pub use domain::{
    DocumentStatus, DocumentUpload, KycDocument, KycDocumentType, KycStatus, KycVerification,
    PersonalInfo, ReviewDecision,
};
pub use repository::KycRepository;
pub use router::kyc_router;
pub use service::{KycConflict, KycError, KycWorkflow};
pub use steps::{document_gate, personal_info_gate, KycStep, KycWizard, StepError};
