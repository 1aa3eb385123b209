use super::domain::Instrument;
use crate::domain::{OwnerId, RecordId};
use crate::repository::RepositoryError;

/// Account store slice holding one kind of instrument.
///
/// `list` must return an owner's records in insertion order. `swap_default` must be a single
/// atomic write: every other record of `owner` loses the flag and `id` gains it, or nothing
/// changes. It returns `NotFound` when `id` is not one of `owner`'s records.
pub trait InstrumentRepository<T: Instrument>: Send + Sync {
    fn insert(&self, record: T) -> Result<T, RepositoryError>;
    fn fetch(&self, id: &RecordId) -> Result<Option<T>, RepositoryError>;
    fn list(&self, owner: &OwnerId) -> Result<Vec<T>, RepositoryError>;
    fn delete(&self, id: &RecordId) -> Result<Option<T>, RepositoryError>;
    fn swap_default(&self, owner: &OwnerId, id: &RecordId) -> Result<T, RepositoryError>;
}
