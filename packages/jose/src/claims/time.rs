//! `exp`, `nbf` and `iat` validators. Tolerances are in seconds.

use super::Payload;
use crate::{error::ClaimError, traits::ValidationProvider};
use chrono::Utc;

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Rejects tokens whose `exp` plus `tolerance` lies in the past.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiresValidator {
    /// Allowed clock skew in seconds
    pub tolerance: i64,
}

impl ExpiresValidator {
    /// Validator with the given skew allowance.
    pub fn new(tolerance: i64) -> Self {
        Self { tolerance }
    }

    /// Validate against an explicit clock.
    pub fn validate_at(&self, payload: &[u8], now: i64) -> Result<(), ClaimError> {
        let exp = Payload::parse(payload)?
            .timestamp("exp")?
            .ok_or(ClaimError::MissingClaim("exp"))?;
        if now > exp.saturating_add(self.tolerance) {
            return Err(ClaimError::Expired);
        }
        Ok(())
    }
}

impl ValidationProvider for ExpiresValidator {
    fn validate(&self, payload: &[u8]) -> Result<(), ClaimError> {
        self.validate_at(payload, now())
    }
}

/// Rejects tokens whose `nbf` minus `tolerance` lies in the future.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotBeforeValidator {
    /// Allowed clock skew in seconds
    pub tolerance: i64,
}

impl NotBeforeValidator {
    /// Validator with the given skew allowance.
    pub fn new(tolerance: i64) -> Self {
        Self { tolerance }
    }

    /// Validate against an explicit clock. A token without `nbf` passes.
    pub fn validate_at(&self, payload: &[u8], now: i64) -> Result<(), ClaimError> {
        match Payload::parse(payload)?.timestamp("nbf")? {
            Some(nbf) if now < nbf.saturating_sub(self.tolerance) => Err(ClaimError::NotYetValid),
            _ => Ok(()),
        }
    }
}

impl ValidationProvider for NotBeforeValidator {
    fn validate(&self, payload: &[u8]) -> Result<(), ClaimError> {
        self.validate_at(payload, now())
    }
}

/// Bounds token age by `iat`: a token expires `expires_after` seconds after
/// issue and must not be issued in the future.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssuedAtValidator {
    /// Allowed clock skew in seconds
    pub tolerance: i64,
    /// Maximum token age in seconds
    pub expires_after: i64,
}

impl IssuedAtValidator {
    /// Validator for tokens valid `expires_after` seconds from issue.
    pub fn new(expires_after: i64, tolerance: i64) -> Self {
        Self {
            tolerance,
            expires_after,
        }
    }

    /// Validate against an explicit clock.
    pub fn validate_at(&self, payload: &[u8], now: i64) -> Result<(), ClaimError> {
        let iat = Payload::parse(payload)?
            .timestamp("iat")?
            .ok_or(ClaimError::MissingClaim("iat"))?;
        if now > iat.saturating_add(self.expires_after).saturating_add(self.tolerance) {
            return Err(ClaimError::Expired);
        }
        if now < iat.saturating_sub(self.tolerance) {
            return Err(ClaimError::IssuedInFuture);
        }
        Ok(())
    }
}

impl ValidationProvider for IssuedAtValidator {
    fn validate(&self, payload: &[u8]) -> Result<(), ClaimError> {
        self.validate_at(payload, now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn exp(at: i64) -> Vec<u8> {
        format!(r#"{{"exp":{at}}}"#).into_bytes()
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let validator = ExpiresValidator::new(0);
        assert_eq!(validator.validate_at(&exp(NOW), NOW), Ok(()));
        assert_eq!(validator.validate_at(&exp(NOW - 1), NOW), Err(ClaimError::Expired));
    }

    #[test]
    fn fractional_expiry_is_truncated() {
        let validator = ExpiresValidator::new(0);
        let payload = format!(r#"{{"exp":{NOW}.9}}"#).into_bytes();
        assert_eq!(validator.validate_at(&payload, NOW), Ok(()));
        assert_eq!(validator.validate_at(&payload, NOW + 1), Err(ClaimError::Expired));
    }

    #[test]
    fn tolerance_shifts_expiry() {
        let validator = ExpiresValidator::new(30);
        assert_eq!(validator.validate_at(&exp(NOW - 30), NOW), Ok(()));
        assert_eq!(validator.validate_at(&exp(NOW - 31), NOW), Err(ClaimError::Expired));
    }

    #[test]
    fn missing_exp_fails() {
        assert_eq!(
            ExpiresValidator::new(0).validate_at(b"{}", NOW),
            Err(ClaimError::MissingClaim("exp"))
        );
    }

    #[test]
    fn not_before() {
        let validator = NotBeforeValidator::new(5);
        let payload = format!(r#"{{"nbf":{}}}"#, NOW + 5).into_bytes();
        assert_eq!(validator.validate_at(&payload, NOW), Ok(()));
        let payload = format!(r#"{{"nbf":{}}}"#, NOW + 6).into_bytes();
        assert_eq!(validator.validate_at(&payload, NOW), Err(ClaimError::NotYetValid));
        assert_eq!(validator.validate_at(b"{}", NOW), Ok(()));
    }

    #[test]
    fn issued_at_window() {
        let validator = IssuedAtValidator::new(3600, 10);
        let iat = |at: i64| format!(r#"{{"iat":{at}}}"#).into_bytes();
        assert_eq!(validator.validate_at(&iat(NOW - 3610), NOW), Ok(()));
        assert_eq!(validator.validate_at(&iat(NOW - 3611), NOW), Err(ClaimError::Expired));
        assert_eq!(validator.validate_at(&iat(NOW + 10), NOW), Ok(()));
        assert_eq!(
            validator.validate_at(&iat(NOW + 11), NOW),
            Err(ClaimError::IssuedInFuture)
        );
    }

    #[test]
    fn wrong_type_is_malformed() {
        assert!(matches!(
            ExpiresValidator::new(0).validate_at(br#"{"exp":"tomorrow"}"#, NOW),
            Err(ClaimError::MalformedPayload(_))
        ));
    }
}
