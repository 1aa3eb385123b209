use super::domain::{KycStatus, KycVerification};
use crate::domain::OwnerId;
use crate::repository::RepositoryError;

/// Storage for the owner's active verification.
pub trait KycRepository: Send + Sync {
    fn fetch(&self, owner: &OwnerId) -> Result<Option<KycVerification>, RepositoryError>;

    /// Writes `record` only if the stored status still equals `expected` (`None` meaning
    /// no record yet); otherwise returns [`RepositoryError::Conflict`] and writes nothing.
    fn compare_and_save(
        &self,
        record: KycVerification,
        expected: Option<KycStatus>,
    ) -> Result<KycVerification, RepositoryError>;
}
