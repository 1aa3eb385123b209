//! Payment cards and payout bank accounts, each collection holding at most one default.

pub mod domain;
pub mod guard;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AccountType, BankAccount, BankAccountSubmission, CardSubmission, Instrument, InstrumentKind,
    PaymentMethod, RemovalOutcome,
};
pub use guard::InstrumentGuard;
pub use import::{BatchImportError, BatchKind, BatchReport, BatchValidator, RowOutcome};
pub use repository::InstrumentRepository;
pub use router::{instrument_router, InstrumentListView};
pub use service::{InstrumentRegistry, RegistryError};
