//! Per-owner tax profile with jurisdiction-aware required fields.

pub mod domain;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{BusinessType, TaxIdType, TaxInformation, TaxProfileDraft};
pub use repository::TaxProfileRepository;
pub use router::tax_router;
pub use rules::TaxRules;
pub use service::{TaxProfileError, TaxProfileManager};
