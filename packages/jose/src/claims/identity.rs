//! `iss`, `aud` and `jti` validators.

use super::{wrong_type, Payload};
use crate::{error::ClaimError, traits::ValidationProvider};
use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// How [`IssuerValidator`] treats its issuer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuerMode {
    /// Listed issuers are rejected, everything else passes.
    #[default]
    Denylist,
    /// Only listed issuers pass.
    Allowlist,
}

/// Checks `iss` against a list of issuers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuerValidator {
    /// Issuer names
    pub issuers: Vec<String>,
    /// Whether `issuers` is a denylist or an allowlist
    pub mode: IssuerMode,
}

impl IssuerValidator {
    /// Reject the listed issuers.
    pub fn denylist<I, S>(issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            issuers: issuers.into_iter().map(Into::into).collect(),
            mode: IssuerMode::Denylist,
        }
    }

    /// Accept only the listed issuers.
    pub fn allowlist<I, S>(issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            issuers: issuers.into_iter().map(Into::into).collect(),
            mode: IssuerMode::Allowlist,
        }
    }
}

impl ValidationProvider for IssuerValidator {
    fn validate(&self, payload: &[u8]) -> Result<(), ClaimError> {
        let payload = Payload::parse(payload)?;
        let issuer = payload.string("iss")?;
        let listed = issuer.is_some_and(|iss| self.issuers.iter().any(|known| known == iss));
        match (self.mode, issuer) {
            (IssuerMode::Denylist, Some(iss)) if listed => Err(ClaimError::IssuerDenied(iss.into())),
            (IssuerMode::Denylist, _) => Ok(()),
            (IssuerMode::Allowlist, None) => Err(ClaimError::MissingClaim("iss")),
            (IssuerMode::Allowlist, Some(iss)) if !listed => {
                Err(ClaimError::IssuerNotAllowed(iss.into()))
            }
            (IssuerMode::Allowlist, Some(_)) => Ok(()),
        }
    }
}

/// Requires `aud` to equal, or as an array to contain, `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceValidator {
    /// Audience this service answers to
    pub expected: String,
}

impl AudienceValidator {
    /// Validator for the given audience.
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    fn mismatch(&self) -> ClaimError {
        ClaimError::AudienceMismatch {
            expected: self.expected.clone(),
        }
    }
}

impl ValidationProvider for AudienceValidator {
    fn validate(&self, payload: &[u8]) -> Result<(), ClaimError> {
        let payload = Payload::parse(payload)?;
        match payload.value("aud") {
            None => Err(ClaimError::MissingClaim("aud")),
            Some(Value::String(aud)) if *aud == self.expected => Ok(()),
            Some(Value::String(_)) => Err(self.mismatch()),
            Some(Value::Array(entries)) => {
                let mut found = false;
                for entry in entries {
                    let aud = entry
                        .as_str()
                        .ok_or_else(|| wrong_type("aud", "a string or an array of strings"))?;
                    found |= aud == self.expected;
                }
                if found {
                    Ok(())
                } else {
                    Err(self.mismatch())
                }
            }
            Some(_) => Err(wrong_type("aud", "a string or an array of strings")),
        }
    }
}

/// Runtime denylist of token IDs.
///
/// Clones share the same set, so a clone kept by the caller can revoke
/// tokens after the validator is registered.
#[derive(Debug, Clone, Default)]
pub struct TokenIdValidator {
    denied: Arc<DashSet<String>>,
}

impl TokenIdValidator {
    /// Empty denylist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Denylist seeded with `ids`.
    pub fn with_denied<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let validator = Self::new();
        for id in ids {
            validator.deny(id);
        }
        validator
    }

    /// Reject tokens carrying `jti`. Returns false if it was already denied.
    pub fn deny(&self, jti: impl Into<String>) -> bool {
        let jti = jti.into();
        tracing::debug!(%jti, "token id denied");
        self.denied.insert(jti)
    }

    /// Lift a denial. Returns whether `jti` was denied.
    pub fn allow(&self, jti: &str) -> bool {
        self.denied.remove(jti).is_some()
    }

    /// Whether `jti` is currently denied.
    pub fn is_denied(&self, jti: &str) -> bool {
        self.denied.contains(jti)
    }

    /// Number of denied IDs.
    pub fn len(&self) -> usize {
        self.denied.len()
    }

    /// Whether nothing is denied.
    pub fn is_empty(&self) -> bool {
        self.denied.is_empty()
    }
}

impl ValidationProvider for TokenIdValidator {
    fn validate(&self, payload: &[u8]) -> Result<(), ClaimError> {
        match Payload::parse(payload)?.string("jti")? {
            Some(jti) if self.is_denied(jti) => Err(ClaimError::TokenIdDenied(jti.into())),
            _ => Ok(()),
        }
    }
}
