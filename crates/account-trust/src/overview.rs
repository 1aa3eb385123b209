//! Per-owner trust summary combining instruments, tax, KYC and contact verification.

use serde::Serialize;

use crate::domain::OwnerId;
use crate::instruments::{
    BankAccount, InstrumentRegistry, InstrumentRepository, PaymentMethod, RegistryError,
};
use crate::kyc::{DocumentStore, KycError, KycRepository, KycStatus, KycWorkflow};
use crate::tax::{TaxProfileError, TaxProfileManager, TaxProfileRepository};
use crate::verification::{ContactChannel, ContactVerifier, VerificationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountTrustOverview {
    pub owner_id: OwnerId,
    pub has_default_payment_method: bool,
    pub has_default_bank_account: bool,
    pub payment_method_count: usize,
    pub bank_account_count: usize,
    pub tax_profile_on_file: bool,
    pub tax_profile_verified: bool,
    pub kyc_status: Option<KycStatus>,
    pub email_verified: bool,
    pub phone_verified: bool,
}

impl AccountTrustOverview {
    pub fn collect<C, B, T, V, R, D, E>(
        owner: &OwnerId,
        registry: &InstrumentRegistry<C, B>,
        tax: &TaxProfileManager<T, V>,
        kyc: &KycWorkflow<R, D>,
        contacts: &E,
    ) -> Result<Self, OverviewError>
    where
        C: InstrumentRepository<PaymentMethod> + 'static,
        B: InstrumentRepository<BankAccount> + 'static,
        T: TaxProfileRepository + 'static,
        V: ContactVerifier + 'static,
        R: KycRepository + 'static,
        D: DocumentStore + 'static,
        E: ContactVerifier + ?Sized,
    {
        let cards = registry.payment_methods(owner)?;
        let bank_accounts = registry.bank_accounts(owner)?;
        let tax_profile = tax.get(owner)?;
        let verification = kyc.verification(owner)?;

        Ok(Self {
            owner_id: owner.clone(),
            has_default_payment_method: cards.iter().any(|card| card.is_default),
            has_default_bank_account: bank_accounts.iter().any(|account| account.is_default),
            payment_method_count: cards.len(),
            bank_account_count: bank_accounts.len(),
            tax_profile_on_file: tax_profile.is_some(),
            tax_profile_verified: tax_profile.is_some_and(|profile| profile.is_verified),
            kyc_status: verification.map(|record| record.status),
            email_verified: contacts.has_verified(owner, ContactChannel::Email)?,
            phone_verified: contacts.has_verified(owner, ContactChannel::Phone)?,
        })
    }

    /// Payouts need a default bank account, a verified tax profile and approved KYC.
    pub fn ready_for_payouts(&self) -> bool {
        self.has_default_bank_account
            && self.tax_profile_verified
            && self.kyc_status == Some(KycStatus::Approved)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OverviewError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Tax(#[from] TaxProfileError),
    #[error(transparent)]
    Kyc(#[from] KycError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
}
