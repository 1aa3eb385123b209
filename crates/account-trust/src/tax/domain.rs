use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::OwnerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxIdType {
    #[default]
    Qid,
    Ssn,
    Ein,
    Cr,
    Vat,
}

impl TaxIdType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Qid => "qid",
            Self::Ssn => "ssn",
            Self::Ein => "ein",
            Self::Cr => "cr",
            Self::Vat => "vat",
        }
    }

    /// Identifier types issued to registered businesses rather than people.
    pub const fn is_entity(self) -> bool {
        matches!(self, Self::Ein | Self::Cr | Self::Vat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    #[default]
    Individual,
    SoleProprietorship,
    Llc,
    Corporation,
    Partnership,
}

impl BusinessType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::SoleProprietorship => "sole_proprietorship",
            Self::Llc => "llc",
            Self::Corporation => "corporation",
            Self::Partnership => "partnership",
        }
    }

    pub const fn is_entity(self) -> bool {
        matches!(self, Self::Llc | Self::Corporation | Self::Partnership)
    }
}

/// The single tax profile held per owner. Replaced wholesale on every upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxInformation {
    pub owner_id: OwnerId,
    pub tax_id_type: TaxIdType,
    pub tax_id: String,
    pub legal_name: String,
    pub phone_number: String,
    pub business_type: BusinessType,
    pub tax_country: String,
    pub tax_address: String,
    pub tax_city: String,
    pub tax_state: Option<String>,
    pub tax_postal_code: Option<String>,
    pub subject_to_backup_withholding: bool,
    pub exempt_from_backup_withholding: bool,
    pub tax_withholding_rate: Option<f64>,
    pub fatca_status: Option<String>,
    pub crs_status: Option<String>,
    pub requires_reporting: bool,
    pub is_verified: bool,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied tax profile fields. Absent optional fields take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaxProfileDraft {
    pub tax_id_type: Option<TaxIdType>,
    pub tax_id: String,
    pub legal_name: String,
    pub phone_number: String,
    pub business_type: Option<BusinessType>,
    pub tax_country: Option<String>,
    pub tax_address: String,
    pub tax_city: String,
    pub tax_state: Option<String>,
    pub tax_postal_code: Option<String>,
    pub subject_to_backup_withholding: bool,
    pub exempt_from_backup_withholding: bool,
    pub tax_withholding_rate: Option<f64>,
    pub fatca_status: Option<String>,
    pub crs_status: Option<String>,
    pub requires_reporting: Option<bool>,
}
