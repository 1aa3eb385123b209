use crate::infra::{parse_date, TrustServices};
use account_trust::config::{AppConfig, TrustConfig};
use account_trust::domain::OwnerId;
use account_trust::error::AppError;
use account_trust::instruments::{
    AccountType, BankAccountSubmission, BatchKind, BatchReport, BatchValidator, CardSubmission,
    InstrumentGuard,
};
use account_trust::kyc::{DocumentUpload, KycDocumentType, PersonalInfo, ReviewDecision};
use account_trust::overview::AccountTrustOverview;
use account_trust::tax::TaxProfileDraft;
use account_trust::verification::ContactChannel;
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportKind {
    Cards,
    BankAccounts,
}

impl From<ExportKind> for BatchKind {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::Cards => BatchKind::Cards,
            ExportKind::BankAccounts => BatchKind::BankAccounts,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// CSV export to validate (header row required)
    pub(crate) path: PathBuf,
    /// Which instrument the export contains
    #[arg(long, value_enum, default_value = "cards")]
    pub(crate) kind: ExportKind,
    /// Reference date for card expiry checks (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the report as JSON instead of one line per row
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Owner id used for the walkthrough.
    #[arg(long, default_value = "host-42")]
    pub(crate) owner: String,
    /// Override the reference date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Reject the first KYC submission to show the resubmission cycle.
    #[arg(long)]
    pub(crate) reject_first: bool,
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let ValidateArgs {
        path,
        kind,
        today,
        json,
    } = args;

    let config = AppConfig::load()?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let validator = BatchValidator::new(InstrumentGuard::new(config.trust.default_currency));
    let report = validator.validate_path(&path, kind.into(), today)?;

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => println!("Report unavailable: {err}"),
        }
    } else {
        render_batch_report(&path, &report);
    }
    Ok(())
}

fn render_batch_report(path: &std::path::Path, report: &BatchReport) {
    println!(
        "{}: {} rows | {} accepted | {} rejected",
        path.display(),
        report.rows.len(),
        report.accepted(),
        report.rejected()
    );
    for row in &report.rows {
        match (&row.summary, &row.error) {
            (Some(summary), _) => println!("  row {:>4}  ok      {}", row.row, summary),
            (None, Some(error)) => println!("  row {:>4}  reject  {}", row.row, error),
            (None, None) => println!("  row {:>4}  reject", row.row),
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        owner,
        today,
        reject_first,
    } = args;
    let owner = OwnerId::new(owner);
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let services = TrustServices::in_memory(&TrustConfig {
        kyc_auto_review: false,
        ..TrustConfig::default()
    });

    println!("Account trust demo for {owner} (reference date {today})");

    println!("\nPayment methods");
    let cards = [
        demo_card("4532015112830366", 12, 2030, "123"),
        demo_card("4532015112830367", 12, 2030, "123"),
        demo_card("378282246310005", 1, 2029, "123"),
        demo_card("5555555555554444", 3, 2028, "321"),
    ];
    let mut accepted = Vec::new();
    for submission in cards {
        match services
            .registry
            .add_payment_method(&owner, submission, today)
        {
            Ok(card) => {
                println!(
                    "- added {} ending {} (default: {})",
                    card.card_type.label(),
                    card.last4,
                    card.is_default
                );
                accepted.push(card);
            }
            Err(err) => println!("- rejected: {err}"),
        }
    }
    for card in &accepted {
        if let Err(err) = services
            .registry
            .set_default_payment_method(&owner, &card.id)
        {
            println!("  default change failed: {err}");
            return Ok(());
        }
        let defaults: Vec<_> = match services.registry.payment_methods(&owner) {
            Ok(cards) => cards
                .into_iter()
                .filter(|card| card.is_default)
                .map(|card| card.last4)
                .collect(),
            Err(err) => {
                println!("  listing failed: {err}");
                return Ok(());
            }
        };
        println!("  default is now {:?}", defaults);
    }

    println!("\nPayout account");
    let account = match services
        .registry
        .add_bank_account(&owner, demo_bank_account())
    {
        Ok(account) => account,
        Err(err) => {
            println!("- rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- added {} {} ({}, {})",
        account.bank_name,
        account.account_number,
        account.account_type.label(),
        account.currency
    );
    if let Err(err) = services
        .registry
        .set_default_bank_account(&owner, &account.id)
    {
        println!("  default change failed: {err}");
    }

    println!("\nTax profile");
    services
        .contacts
        .mark_verified(&owner, ContactChannel::Phone, "+974 5555 1234");
    services
        .contacts
        .mark_verified(&owner, ContactChannel::Email, "host@example.com");
    match services.tax.upsert(&owner, demo_tax_draft(), Utc::now()) {
        Ok(profile) => println!(
            "- saved {} profile for {} in {} (verified: {})",
            profile.business_type.label(),
            profile.legal_name,
            profile.tax_country,
            profile.is_verified
        ),
        Err(err) => println!("- rejected: {err}"),
    }

    println!("\nIdentity verification");
    for (document_type, name) in [
        (KycDocumentType::Passport, "passport.jpg"),
        (KycDocumentType::Selfie, "selfie.png"),
        (KycDocumentType::UtilityBill, "bill.pdf"),
    ] {
        let upload = DocumentUpload {
            document_type,
            original_name: name.to_string(),
        };
        match services.kyc.upload_document(&owner, upload, Utc::now()) {
            Ok(document) => println!(
                "- uploaded {} as {} ({})",
                document.original_name,
                document.document_type.label(),
                document.content_type
            ),
            Err(err) => println!("- upload rejected: {err}"),
        }
    }

    let cycles = if reject_first { 2 } else { 1 };
    for cycle in 1..=cycles {
        let submitted = match services.kyc.submit(&owner, demo_personal_info(), Utc::now()) {
            Ok(record) => record,
            Err(err) => {
                println!("- submission blocked: {err}");
                return Ok(());
            }
        };
        println!(
            "- submitted {} -> {}",
            submitted.verification_code,
            submitted.status.label()
        );

        if let Err(err) = services.kyc.begin_review(&owner) {
            println!("  review could not start: {err}");
            return Ok(());
        }
        let decision = if reject_first && cycle == 1 {
            ReviewDecision::Reject {
                reason: Some("address proof is older than three months".to_string()),
            }
        } else {
            ReviewDecision::Approve
        };
        match services.kyc.record_review(&owner, decision, Utc::now()) {
            Ok(record) => println!(
                "  reviewer decision: {}{}",
                record.status.label(),
                record
                    .rejection_reason
                    .map(|reason| format!(" ({reason})"))
                    .unwrap_or_default()
            ),
            Err(err) => {
                println!("  review failed: {err}");
                return Ok(());
            }
        }

        if cycle < cycles {
            let upload = DocumentUpload {
                document_type: KycDocumentType::UtilityBill,
                original_name: "bill-recent.pdf".to_string(),
            };
            match services.kyc.upload_document(&owner, upload, Utc::now()) {
                Ok(document) => {
                    println!("  replaced address proof with {}", document.original_name)
                }
                Err(err) => println!("  replacement rejected: {err}"),
            }
        }
    }

    println!("\nTrust overview");
    match AccountTrustOverview::collect(
        &owner,
        services.registry.as_ref(),
        services.tax.as_ref(),
        services.kyc.as_ref(),
        services.contacts.as_ref(),
    ) {
        Ok(overview) => {
            match serde_json::to_string_pretty(&overview) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("Overview payload unavailable: {err}"),
            }
            println!("Ready for payouts: {}", overview.ready_for_payouts());
        }
        Err(err) => println!("Overview unavailable: {err}"),
    }

    Ok(())
}

fn demo_card(number: &str, month: u32, year: i32, cvv: &str) -> CardSubmission {
    CardSubmission {
        card_number: number.to_string(),
        expiry_month: Some(month),
        expiry_year: Some(year),
        cvv: cvv.to_string(),
        cardholder_name: "John Doe".to_string(),
    }
}

fn demo_bank_account() -> BankAccountSubmission {
    BankAccountSubmission {
        bank_name: "Doha Bank".to_string(),
        account_holder_name: "John Doe".to_string(),
        account_number: "0012 3456 7890".to_string(),
        iban: Some("QA58 DOHB 0000 1234 5678 90AB CDEF G".to_string()),
        swift_code: Some("dohbqaqa".to_string()),
        account_type: Some(AccountType::Savings),
        ..BankAccountSubmission::default()
    }
}

fn demo_tax_draft() -> TaxProfileDraft {
    TaxProfileDraft {
        tax_id: "28763400123".to_string(),
        legal_name: "John Doe".to_string(),
        phone_number: "+974 5555 1234".to_string(),
        tax_address: "Building 12, Street 850, Al Sadd".to_string(),
        tax_city: "Doha".to_string(),
        ..TaxProfileDraft::default()
    }
}

fn demo_personal_info() -> PersonalInfo {
    PersonalInfo {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: parse_date("1988-04-02").ok(),
        nationality: Some("QA".to_string()),
        document_type: Some(KycDocumentType::Passport),
        document_number: "P1234567".to_string(),
        ..PersonalInfo::default()
    }
}
