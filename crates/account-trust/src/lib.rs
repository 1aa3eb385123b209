//! Account trust rules for the rental marketplace: payment instruments, payout accounts,
//! tax profiles, and identity (KYC) verification.

pub mod config;
pub mod domain;
pub mod error;
pub mod instruments;
pub mod kyc;
pub mod overview;
pub mod repository;
pub mod tax;
pub mod telemetry;
pub mod validation;
pub mod verification;
