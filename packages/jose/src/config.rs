//! Validation options: one serde-loadable struct that installs the standard
//! claim validators into a registry.

use crate::{
    claims::{
        AudienceValidator, ExpiresValidator, IssuedAtValidator, IssuerMode, IssuerValidator,
        NotBeforeValidator, TokenIdValidator,
    },
    error::JoseResult,
    registry::Registry,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Claim validation settings.
///
/// Every field has a default, so a partial document deserializes:
///
/// ```
/// use cryypt_jose::ValidationOptions;
///
/// let options: ValidationOptions =
///     serde_json::from_str(r#"{"leeway": 5, "expected_audience": "api"}"#).unwrap();
/// assert!(options.validate_exp);
/// assert_eq!(options.leeway, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Clock skew allowance for time-based claims, in seconds.
    pub leeway: i64,
    /// Install the `exp` validator.
    pub validate_exp: bool,
    /// Install the `nbf` validator.
    pub validate_nbf: bool,
    /// Maximum age measured from `iat`, in seconds. Installs the `iat`
    /// validator when set.
    pub max_age: Option<i64>,
    /// Issuers checked by the `iss` validator, installed when non-empty.
    pub issuers: Vec<String>,
    /// Whether `issuers` is a denylist or an allowlist.
    pub issuer_mode: IssuerMode,
    /// Installs the `aud` validator when set.
    pub expected_audience: Option<String>,
    /// Token IDs denied from the start.
    pub denied_token_ids: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            leeway: 60,
            validate_exp: true,
            validate_nbf: true,
            max_age: None,
            issuers: Vec::new(),
            issuer_mode: IssuerMode::Denylist,
            expected_audience: None,
            denied_token_ids: Vec::new(),
        }
    }
}

impl ValidationOptions {
    /// Options with no leeway.
    pub fn strict() -> Self {
        Self {
            leeway: 0,
            ..Self::default()
        }
    }

    /// Set the clock skew allowance.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway.num_seconds();
        self
    }

    /// Toggle the `exp` validator.
    pub fn with_expiry_check(mut self, validate: bool) -> Self {
        self.validate_exp = validate;
        self
    }

    /// Toggle the `nbf` validator.
    pub fn with_not_before_check(mut self, validate: bool) -> Self {
        self.validate_nbf = validate;
        self
    }

    /// Bound token age by `iat`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age.num_seconds());
        self
    }

    /// Accept only these issuers.
    pub fn with_allowed_issuers<I, S>(mut self, issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.issuers = issuers.into_iter().map(Into::into).collect();
        self.issuer_mode = IssuerMode::Allowlist;
        self
    }

    /// Reject these issuers.
    pub fn with_denied_issuers<I, S>(mut self, issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.issuers = issuers.into_iter().map(Into::into).collect();
        self.issuer_mode = IssuerMode::Denylist;
        self
    }

    /// Require this audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = Some(audience.into());
        self
    }

    /// Deny a token ID from the start.
    pub fn with_denied_token_id(mut self, jti: impl Into<String>) -> Self {
        self.denied_token_ids.push(jti.into());
        self
    }

    /// Register the configured validators under `exp`, `nbf`, `iat`, `iss`,
    /// `aud` and `jti`.
    ///
    /// The `jti` validator is always installed; the returned handle revokes
    /// token IDs at runtime. Fails with
    /// [`DuplicateValidator`](crate::JoseError::DuplicateValidator) if a
    /// name is taken, leaving the validators added before it in place.
    pub fn install(&self, registry: &Registry) -> JoseResult<TokenIdValidator> {
        if self.validate_exp {
            registry.add_validation_provider("exp", ExpiresValidator::new(self.leeway))?;
        }
        if self.validate_nbf {
            registry.add_validation_provider("nbf", NotBeforeValidator::new(self.leeway))?;
        }
        if let Some(max_age) = self.max_age {
            registry.add_validation_provider("iat", IssuedAtValidator::new(max_age, self.leeway))?;
        }
        if !self.issuers.is_empty() {
            registry.add_validation_provider(
                "iss",
                IssuerValidator {
                    issuers: self.issuers.clone(),
                    mode: self.issuer_mode,
                },
            )?;
        }
        if let Some(audience) = &self.expected_audience {
            registry.add_validation_provider("aud", AudienceValidator::new(audience.as_str()))?;
        }
        let token_ids = TokenIdValidator::with_denied(self.denied_token_ids.iter().cloned());
        registry.add_validation_provider("jti", token_ids.clone())?;
        tracing::debug!(
            validators = ?registry.validation_provider_names(),
            "validation options installed"
        );
        Ok(token_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoseError;

    #[test]
    fn defaults_install_time_checks_and_jti() {
        let registry = Registry::new();
        ValidationOptions::default().install(&registry).unwrap();
        assert_eq!(registry.validation_provider_names(), vec!["exp", "jti", "nbf"]);
    }

    #[test]
    fn every_option_installs_its_validator() {
        let registry = Registry::new();
        ValidationOptions::strict()
            .with_max_age(Duration::hours(1))
            .with_allowed_issuers(["auth"])
            .with_audience("api")
            .install(&registry)
            .unwrap();
        assert_eq!(
            registry.validation_provider_names(),
            vec!["aud", "exp", "iat", "iss", "jti", "nbf"]
        );
    }

    #[test]
    fn installing_twice_is_a_duplicate() {
        let registry = Registry::new();
        let options = ValidationOptions::default();
        options.install(&registry).unwrap();
        assert!(matches!(
            options.install(&registry),
            Err(JoseError::DuplicateValidator(name)) if name == "exp"
        ));
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let options: ValidationOptions =
            serde_json::from_str(r#"{"issuers":["a"],"issuer_mode":"allowlist"}"#).unwrap();
        assert_eq!(options.leeway, 60);
        assert_eq!(options.issuer_mode, IssuerMode::Allowlist);
    }
}
