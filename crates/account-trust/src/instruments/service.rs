use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::domain::{
    BankAccount, BankAccountSubmission, CardSubmission, Instrument, InstrumentKind,
    PaymentMethod, RemovalOutcome,
};
use super::guard::InstrumentGuard;
use super::repository::InstrumentRepository;
use crate::domain::{next_record_id, OwnerId, RecordId};
use crate::repository::RepositoryError;
use crate::validation::ValidationError;

/// Registry composing the instrument guard with the card and bank account stores.
pub struct InstrumentRegistry<C, B> {
    guard: InstrumentGuard,
    cards: Arc<C>,
    bank_accounts: Arc<B>,
}

impl<C, B> InstrumentRegistry<C, B>
where
    C: InstrumentRepository<PaymentMethod> + 'static,
    B: InstrumentRepository<BankAccount> + 'static,
{
    pub fn new(cards: Arc<C>, bank_accounts: Arc<B>, guard: InstrumentGuard) -> Self {
        Self {
            guard,
            cards,
            bank_accounts,
        }
    }

    /// Validate and store a card. New cards are never made default implicitly.
    pub fn add_payment_method(
        &self,
        owner: &OwnerId,
        submission: CardSubmission,
        today: NaiveDate,
    ) -> Result<PaymentMethod, RegistryError> {
        let record = self.guard.payment_method_from_submission(
            next_record_id("pm"),
            owner,
            &submission,
            today,
        )?;

        let stored = self.cards.insert(record)?;
        info!(
            owner = %owner,
            id = %stored.id,
            brand = stored.card_type.label(),
            last4 = %stored.last4,
            "payment method added"
        );
        Ok(stored)
    }

    pub fn remove_payment_method(
        &self,
        owner: &OwnerId,
        id: &RecordId,
    ) -> Result<RemovalOutcome<PaymentMethod>, RegistryError> {
        remove_owned(self.cards.as_ref(), owner, id)
    }

    pub fn set_default_payment_method(
        &self,
        owner: &OwnerId,
        id: &RecordId,
    ) -> Result<PaymentMethod, RegistryError> {
        set_default_owned(self.cards.as_ref(), owner, id)
    }

    /// Owner's cards in insertion order.
    pub fn payment_methods(&self, owner: &OwnerId) -> Result<Vec<PaymentMethod>, RegistryError> {
        Ok(self.cards.list(owner)?)
    }

    pub fn default_payment_method(
        &self,
        owner: &OwnerId,
    ) -> Result<Option<PaymentMethod>, RegistryError> {
        default_of(self.cards.as_ref(), owner)
    }

    pub fn has_default_payment_method(&self, owner: &OwnerId) -> Result<bool, RegistryError> {
        Ok(self.default_payment_method(owner)?.is_some())
    }

    pub fn add_bank_account(
        &self,
        owner: &OwnerId,
        submission: BankAccountSubmission,
    ) -> Result<BankAccount, RegistryError> {
        let record =
            self.guard
                .bank_account_from_submission(next_record_id("ba"), owner, &submission)?;

        let stored = self.bank_accounts.insert(record)?;
        info!(
            owner = %owner,
            id = %stored.id,
            account_type = stored.account_type.label(),
            currency = %stored.currency,
            "bank account added"
        );
        Ok(stored)
    }

    pub fn remove_bank_account(
        &self,
        owner: &OwnerId,
        id: &RecordId,
    ) -> Result<RemovalOutcome<BankAccount>, RegistryError> {
        remove_owned(self.bank_accounts.as_ref(), owner, id)
    }

    pub fn set_default_bank_account(
        &self,
        owner: &OwnerId,
        id: &RecordId,
    ) -> Result<BankAccount, RegistryError> {
        set_default_owned(self.bank_accounts.as_ref(), owner, id)
    }

    /// Owner's bank accounts in insertion order.
    pub fn bank_accounts(&self, owner: &OwnerId) -> Result<Vec<BankAccount>, RegistryError> {
        Ok(self.bank_accounts.list(owner)?)
    }

    pub fn default_bank_account(
        &self,
        owner: &OwnerId,
    ) -> Result<Option<BankAccount>, RegistryError> {
        default_of(self.bank_accounts.as_ref(), owner)
    }

    pub fn has_default_bank_account(&self, owner: &OwnerId) -> Result<bool, RegistryError> {
        Ok(self.default_bank_account(owner)?.is_some())
    }

    pub fn guard(&self) -> &InstrumentGuard {
        &self.guard
    }
}

fn fetch_owned<T, R>(repository: &R, owner: &OwnerId, id: &RecordId) -> Result<T, RegistryError>
where
    T: Instrument,
    R: InstrumentRepository<T> + ?Sized,
{
    let record = repository
        .fetch(id)?
        .ok_or_else(|| RegistryError::NotFound {
            kind: T::KIND,
            id: id.clone(),
        })?;

    if record.owner_id() != owner {
        return Err(RegistryError::Ownership {
            kind: T::KIND,
            id: id.clone(),
        });
    }
    Ok(record)
}

fn remove_owned<T, R>(
    repository: &R,
    owner: &OwnerId,
    id: &RecordId,
) -> Result<RemovalOutcome<T>, RegistryError>
where
    T: Instrument,
    R: InstrumentRepository<T> + ?Sized,
{
    fetch_owned(repository, owner, id)?;

    let removed = repository
        .delete(id)?
        .ok_or_else(|| RegistryError::NotFound {
            kind: T::KIND,
            id: id.clone(),
        })?;
    let default_cleared = removed.is_default();

    info!(owner = %owner, id = %id, kind = T::KIND.label(), default_cleared, "instrument removed");
    Ok(RemovalOutcome {
        removed,
        default_cleared,
    })
}

fn set_default_owned<T, R>(
    repository: &R,
    owner: &OwnerId,
    id: &RecordId,
) -> Result<T, RegistryError>
where
    T: Instrument,
    R: InstrumentRepository<T> + ?Sized,
{
    fetch_owned(repository, owner, id)?;

    let updated = repository
        .swap_default(owner, id)
        .map_err(|err| match err {
            RepositoryError::NotFound => RegistryError::NotFound {
                kind: T::KIND,
                id: id.clone(),
            },
            other => RegistryError::Repository(other),
        })?;

    info!(owner = %owner, id = %id, kind = T::KIND.label(), "default instrument changed");
    Ok(updated)
}

fn default_of<T, R>(repository: &R, owner: &OwnerId) -> Result<Option<T>, RegistryError>
where
    T: Instrument,
    R: InstrumentRepository<T> + ?Sized,
{
    Ok(repository
        .list(owner)?
        .into_iter()
        .find(|record| record.is_default()))
}

/// Error raised by the instrument registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} {id} not found")]
    NotFound { kind: InstrumentKind, id: RecordId },
    #[error("{kind} {id} belongs to another owner")]
    Ownership { kind: InstrumentKind, id: RecordId },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
