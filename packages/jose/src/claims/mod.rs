//! Registered-claim validators and the claims model.
//!
//! Every validator parses the payload as a JSON object. A payload that is not
//! an object, or a claim of the wrong JSON type, fails with
//! [`ClaimError::MalformedPayload`]. How an absent claim is treated depends on
//! the validator: the ones that must prove something (`exp`, `iat`, `aud`,
//! issuer allowlist) fail, the deny-style ones pass.

mod identity;
mod model;
mod time;

pub use identity::{AudienceValidator, IssuerMode, IssuerValidator, TokenIdValidator};
pub use model::{Audience, Claims};
pub use time::{ExpiresValidator, IssuedAtValidator, NotBeforeValidator};

use crate::error::ClaimError;
use serde_json::{Map, Value};

/// Payload parsed once per validator.
pub(crate) struct Payload(Map<String, Value>);

impl Payload {
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self, ClaimError> {
        match serde_json::from_slice(bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(ClaimError::MalformedPayload(
                "payload is not a JSON object".into(),
            )),
            Err(err) => Err(ClaimError::MalformedPayload(err.to_string())),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    /// NumericDate claim, fractional seconds truncated.
    pub(crate) fn timestamp(&self, name: &'static str) -> Result<Option<i64>, ClaimError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        // truncates toward zero, saturating at the i64 bounds
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| wrong_type(name, "a number"))
    }

    pub(crate) fn string(&self, name: &'static str) -> Result<Option<&str>, ClaimError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(wrong_type(name, "a string")),
        }
    }

    pub(crate) fn value(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

pub(crate) fn wrong_type(name: &str, expected: &str) -> ClaimError {
    ClaimError::MalformedPayload(format!("claim {name:?} must be {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_object_payloads_are_malformed() {
        for payload in [&b"[]"[..], b"\"exp\"", b"not json", b""] {
            assert!(matches!(
                Payload::parse(payload),
                Err(ClaimError::MalformedPayload(_))
            ));
        }
    }

    #[test]
    fn null_claims_count_as_absent() {
        let payload = Payload::parse(br#"{"exp":null,"iss":null}"#).unwrap();
        assert_eq!(payload.timestamp("exp"), Ok(None));
        assert_eq!(payload.string("iss"), Ok(None));
    }

    #[test]
    fn timestamps_accept_fractions() {
        let payload = Payload::parse(br#"{"exp":1300819380.75,"nbf":"soon"}"#).unwrap();
        assert_eq!(payload.timestamp("exp"), Ok(Some(1_300_819_380)));
        assert!(payload.timestamp("nbf").is_err());
    }

    #[test]
    fn fractional_timestamps_truncate_toward_zero() {
        let payload = Payload::parse(br#"{"exp":1000.9,"nbf":-5.9,"iat":1e300}"#).unwrap();
        assert_eq!(payload.timestamp("exp"), Ok(Some(1000)));
        assert_eq!(payload.timestamp("nbf"), Ok(Some(-5)));
        assert_eq!(payload.timestamp("iat"), Ok(Some(i64::MAX)));
    }
}
