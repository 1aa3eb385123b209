//! Contact verification collaborator. The OTP exchange itself lives outside this crate;
//! only the verified/unverified result is consumed here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::OwnerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    Email,
    Phone,
}

impl ContactChannel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for ContactChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Answers whether an owner has proven control of a contact value.
pub trait ContactVerifier: Send + Sync {
    fn is_verified(
        &self,
        owner: &OwnerId,
        channel: ContactChannel,
        value: &str,
    ) -> Result<bool, VerificationError>;

    /// Whether any value on `channel` is verified for the owner.
    fn has_verified(
        &self,
        owner: &OwnerId,
        channel: ContactChannel,
    ) -> Result<bool, VerificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("verification service unavailable: {0}")]
    Unavailable(String),
}

/// Normalizes phone numbers for comparison: keeps a leading `+` and the digits.
pub fn normalize_phone(value: &str) -> String {
    let trimmed = value.trim();
    let mut normalized = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        normalized.push('+');
    }
    normalized.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers_drop_formatting() {
        assert_eq!(normalize_phone(" +974 5555-1234 "), "+97455551234");
        assert_eq!(normalize_phone("(555) 010 2000"), "5550102000");
    }
}
