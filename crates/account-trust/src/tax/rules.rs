use chrono::{DateTime, Utc};

use super::domain::{TaxInformation, TaxProfileDraft};
use crate::domain::OwnerId;
use crate::validation::{non_blank, required, Field, ValidationError, ValidationReason};

/// Field requirements for tax profiles, including the jurisdiction-specific ones.
#[derive(Debug, Clone)]
pub struct TaxRules {
    default_country: String,
}

impl Default for TaxRules {
    fn default() -> Self {
        Self::new("QA")
    }
}

impl TaxRules {
    pub fn new(default_country: impl Into<String>) -> Self {
        Self {
            default_country: default_country.into().trim().to_ascii_uppercase(),
        }
    }

    pub fn default_country(&self) -> &str {
        &self.default_country
    }

    /// Builds the stored record with `is_verified` unset; the phone check happens later.
    pub fn build(
        &self,
        owner: &OwnerId,
        draft: &TaxProfileDraft,
        now: DateTime<Utc>,
    ) -> Result<TaxInformation, ValidationError> {
        let tax_id = required(&draft.tax_id, Field::TaxId)?;
        let legal_name = required(&draft.legal_name, Field::LegalName)?;
        let phone_number = required(&draft.phone_number, Field::PhoneNumber)?;
        let tax_address = required(&draft.tax_address, Field::TaxAddress)?;
        let tax_city = required(&draft.tax_city, Field::TaxCity)?;

        let tax_country = match non_blank(draft.tax_country.clone()) {
            Some(country) => normalize_country(&country)?,
            None => self.default_country.clone(),
        };
        let tax_state = non_blank(draft.tax_state.clone());
        let tax_postal_code = non_blank(draft.tax_postal_code.clone());
        if tax_country == "US" {
            if tax_state.is_none() {
                return Err(ValidationError::missing(Field::TaxState));
            }
            if tax_postal_code.is_none() {
                return Err(ValidationError::missing(Field::TaxPostalCode));
            }
        }

        let tax_id_type = draft.tax_id_type.unwrap_or_default();
        let business_type = draft.business_type.unwrap_or_default();
        if business_type.is_entity() && !tax_id_type.is_entity() {
            return Err(ValidationError::new(
                Field::TaxIdType,
                ValidationReason::NotAllowed,
            ));
        }

        if let Some(rate) = draft.tax_withholding_rate {
            if !(0.0..=100.0).contains(&rate) {
                return Err(ValidationError::new(
                    Field::TaxWithholdingRate,
                    ValidationReason::OutOfRange,
                ));
            }
        }

        Ok(TaxInformation {
            owner_id: owner.clone(),
            tax_id_type,
            tax_id: tax_id.to_string(),
            legal_name: legal_name.to_string(),
            phone_number: phone_number.to_string(),
            business_type,
            tax_country,
            tax_address: tax_address.to_string(),
            tax_city: tax_city.to_string(),
            tax_state,
            tax_postal_code,
            subject_to_backup_withholding: draft.subject_to_backup_withholding,
            exempt_from_backup_withholding: draft.exempt_from_backup_withholding,
            tax_withholding_rate: draft.tax_withholding_rate,
            fatca_status: non_blank(draft.fatca_status.clone()),
            crs_status: non_blank(draft.crs_status.clone()),
            requires_reporting: draft.requires_reporting.unwrap_or(true),
            is_verified: false,
            updated_at: now,
        })
    }
}

fn normalize_country(raw: &str) -> Result<String, ValidationError> {
    let country = raw.trim().to_ascii_uppercase();
    if country.len() == 2 && country.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(country)
    } else {
        Err(ValidationError::new(
            Field::TaxCountry,
            ValidationReason::InvalidFormat,
        ))
    }
}
