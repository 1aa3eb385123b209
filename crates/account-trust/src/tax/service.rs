use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::domain::{TaxInformation, TaxProfileDraft};
use super::repository::TaxProfileRepository;
use super::rules::TaxRules;
use crate::domain::OwnerId;
use crate::repository::RepositoryError;
use crate::validation::ValidationError;
use crate::verification::{normalize_phone, ContactChannel, ContactVerifier, VerificationError};

/// Maintains the single tax profile per owner.
pub struct TaxProfileManager<R, V> {
    repository: Arc<R>,
    verifier: Arc<V>,
    rules: TaxRules,
}

impl<R, V> TaxProfileManager<R, V>
where
    R: TaxProfileRepository + 'static,
    V: ContactVerifier + 'static,
{
    pub fn new(repository: Arc<R>, verifier: Arc<V>, rules: TaxRules) -> Self {
        Self {
            repository,
            verifier,
            rules,
        }
    }

    /// Validates and fully replaces the owner's profile. The record is marked verified
    /// only when its phone number has already passed contact verification.
    pub fn upsert(
        &self,
        owner: &OwnerId,
        draft: TaxProfileDraft,
        now: DateTime<Utc>,
    ) -> Result<TaxInformation, TaxProfileError> {
        let mut record = self.rules.build(owner, &draft, now)?;
        record.is_verified = self.verifier.is_verified(
            owner,
            ContactChannel::Phone,
            &normalize_phone(&record.phone_number),
        )?;

        let stored = self.repository.put(record)?;
        info!(
            owner = %owner,
            tax_id_type = stored.tax_id_type.label(),
            business_type = stored.business_type.label(),
            country = %stored.tax_country,
            verified = stored.is_verified,
            "tax profile saved"
        );
        Ok(stored)
    }

    pub fn get(&self, owner: &OwnerId) -> Result<Option<TaxInformation>, TaxProfileError> {
        Ok(self.repository.fetch(owner)?)
    }

    /// Idempotent: returns `false` when there was nothing to delete.
    pub fn delete(&self, owner: &OwnerId) -> Result<bool, TaxProfileError> {
        let existed = match self.repository.delete(owner) {
            Ok(existed) => existed,
            Err(RepositoryError::NotFound) => false,
            Err(other) => return Err(other.into()),
        };

        if existed {
            info!(owner = %owner, "tax profile deleted");
        } else {
            debug!(owner = %owner, "tax profile delete skipped; none on file");
        }
        Ok(existed)
    }

    pub fn rules(&self) -> &TaxRules {
        &self.rules
    }
}

/// Error raised by the tax profile manager.
#[derive(Debug, thiserror::Error)]
pub enum TaxProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
