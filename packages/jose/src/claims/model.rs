//! Registered JWT claims with a fluent builder.

use crate::{algorithms::new_key_id, error::JoseResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `aud` as a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// One audience
    One(String),
    /// Several audiences
    Many(Vec<String>),
}

impl Audience {
    /// Whether `aud` names `audience`.
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(aud) => aud == audience,
            Audience::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Registered claims plus arbitrary extra members.
///
/// ```
/// use chrono::Duration;
/// use cryypt_jose::Claims;
///
/// let claims = Claims::new()
///     .issuer("auth.example")
///     .subject("alice")
///     .audience("api")
///     .expires_in(Duration::minutes(15))
///     .issued_now();
/// assert!(claims.exp.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Audience
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    /// Expiry (unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Not before (unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Issued at (unix seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Token ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Private claims
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// No claims set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `iss`.
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set `sub`.
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Set `aud` to a single audience.
    pub fn audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(Audience::One(aud.into()));
        self
    }

    /// Set `aud` to a list of audiences.
    pub fn audiences<I, S>(mut self, auds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aud = Some(Audience::Many(auds.into_iter().map(Into::into).collect()));
        self
    }

    /// Set `exp`.
    pub fn expires_at(mut self, exp: DateTime<Utc>) -> Self {
        self.exp = Some(exp.timestamp());
        self
    }

    /// Set `exp` relative to now.
    pub fn expires_in(self, ttl: Duration) -> Self {
        self.expires_at(Utc::now() + ttl)
    }

    /// Set `nbf`.
    pub fn not_before(mut self, nbf: DateTime<Utc>) -> Self {
        self.nbf = Some(nbf.timestamp());
        self
    }

    /// Set `iat` to now.
    pub fn issued_now(mut self) -> Self {
        self.iat = Some(Utc::now().timestamp());
        self
    }

    /// Set `jti`.
    pub fn token_id(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// Set `jti` to a fresh random UUID.
    pub fn random_token_id(self) -> JoseResult<Self> {
        Ok(self.token_id(new_key_id()?))
    }

    /// Add a private claim.
    pub fn claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_claims_are_omitted() {
        let claims = Claims::new().subject("alice").claim("admin", true);
        assert_eq!(
            serde_json::to_string(&claims).unwrap(),
            r#"{"sub":"alice","admin":true}"#
        );
    }

    #[test]
    fn audience_accepts_both_shapes() {
        let one: Claims = serde_json::from_str(r#"{"aud":"api"}"#).unwrap();
        let many: Claims = serde_json::from_str(r#"{"aud":["web","api"]}"#).unwrap();
        assert!(one.aud.unwrap().contains("api"));
        assert!(many.aud.unwrap().contains("api"));
    }

    #[test]
    fn random_token_ids_differ() {
        let a = Claims::new().random_token_id().unwrap();
        let b = Claims::new().random_token_id().unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
