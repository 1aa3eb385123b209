use super::domain::TaxInformation;
use crate::domain::OwnerId;
use crate::repository::RepositoryError;

/// Storage for the per-owner tax profile singleton.
pub trait TaxProfileRepository: Send + Sync {
    fn fetch(&self, owner: &OwnerId) -> Result<Option<TaxInformation>, RepositoryError>;
    /// Full replace of the owner's profile.
    fn put(&self, record: TaxInformation) -> Result<TaxInformation, RepositoryError>;
    /// Returns whether a profile existed.
    fn delete(&self, owner: &OwnerId) -> Result<bool, RepositoryError>;
}
