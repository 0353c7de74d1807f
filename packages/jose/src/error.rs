//! Error types for signing, verification, key conversion and claim checks

use thiserror::Error;

/// JOSE operation result type
pub type JoseResult<T> = Result<T, JoseError>;

/// Coarse grouping of [`JoseError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Registry misconfiguration
    Configuration,
    /// Key material that cannot be used
    Key,
    /// Token or key encoding that cannot be parsed
    Encoding,
    /// Signature or key-id resolution failure
    Verification,
    /// A claim validator rejected the payload
    Claim,
    /// Randomness, primitive or task failures
    Internal,
}

/// JOSE error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JoseError {
    /// No signing algorithm has been selected on the registry
    #[error("no default signing algorithm is set")]
    NoDefaultAlgorithm,
    /// The named algorithm is not registered
    #[error("algorithm {0:?} is not registered")]
    AlgorithmNotRegistered(String),
    /// An algorithm with this name is already registered
    #[error("algorithm {0:?} is already registered, use set_signature_provider to replace it")]
    DuplicateAlgorithm(String),
    /// A validation provider with this name is already registered
    #[error("validation provider {0:?} is already registered")]
    DuplicateValidator(String),

    /// Key material is of a different type than the algorithm needs
    #[error("expected a {expected} key but got {found}")]
    KeyTypeMismatch {
        /// Key type the algorithm requires
        expected: String,
        /// Key type that was supplied
        found: String,
    },
    /// JWK `kty` value that this library cannot handle
    #[error("unsupported key type {0:?}")]
    UnsupportedKeyType(String),
    /// Unknown or unsupported curve name
    #[error("unsupported curve {0:?}")]
    UnsupportedCurve(String),
    /// Key bytes that do not decode into a key
    #[error("malformed key: {0}")]
    MalformedKey(String),
    /// Decoded key field has the wrong length
    #[error("{field} is {actual} bytes but {expected} are required")]
    KeyLength {
        /// Field or key name
        field: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Decoded length in bytes
        actual: usize,
    },
    /// Ed448 key in the 56-byte public or 144-byte private layout of
    /// some non-RFC 8032 libraries
    #[error("{0} byte Ed448 key is not RFC 8032 encoded; 57 bytes are required")]
    NonStandardEd448Key(usize),
    /// A JWK member required for this key type is absent
    #[error("JWK member {0:?} is missing")]
    MissingKeyField(&'static str),
    /// The key id is already present in the trust store
    #[error("key id {0:?} already exists")]
    DuplicateKeyId(String),
    /// The provider was built without private key material
    #[error("provider has no private key and cannot sign")]
    MissingPrivateKey,
    /// Key material below the accepted strength
    #[error("key too weak: {0}")]
    WeakKey(String),

    /// Invalid base64url input
    #[error("invalid base64url: {0}")]
    Base64(String),
    /// Invalid JSON input or output
    #[error("invalid JSON: {0}")]
    Json(String),
    /// Compact serialization must have exactly three sections
    #[error("token has {0} sections, expected 3")]
    SectionCount(usize),
    /// The signature section decodes to zero bytes
    #[error("token signature is empty")]
    EmptySignature,
    /// Header `typ` is not `JWT`
    #[error("header typ {0:?} is not JWT")]
    NotAJwt(String),

    /// Header names an algorithm that is not registered
    #[error("algorithm {0:?} is not supported")]
    UnsupportedAlgorithm(String),
    /// Header `kid` is not in the trust store
    #[error("unknown key id {0:?}")]
    UnknownKeyId(String),
    /// Signature does not match
    #[error("signature invalid")]
    InvalidSignature,

    /// A registered claim validator rejected the payload
    #[error("validator {validator:?} rejected the token: {source}")]
    ClaimRejected {
        /// Registry name of the validator
        validator: String,
        /// What the validator found
        source: ClaimError,
    },

    /// The OS random source failed
    #[error("secure randomness unavailable: {0}")]
    Randomness(String),
    /// The signature primitive failed
    #[error("signing failed: {0}")]
    Signing(String),
    /// Background task was dropped before reporting
    #[error("background task failed")]
    TaskFailed,
    /// Token was constructed locally and never verified
    #[error("token has not been verified")]
    Unverified,
}

impl JoseError {
    /// Category this error belongs to
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            JoseError::NoDefaultAlgorithm
            | JoseError::AlgorithmNotRegistered(_)
            | JoseError::DuplicateAlgorithm(_)
            | JoseError::DuplicateValidator(_) => ErrorCategory::Configuration,
            JoseError::KeyTypeMismatch { .. }
            | JoseError::UnsupportedKeyType(_)
            | JoseError::UnsupportedCurve(_)
            | JoseError::MalformedKey(_)
            | JoseError::KeyLength { .. }
            | JoseError::NonStandardEd448Key(_)
            | JoseError::MissingKeyField(_)
            | JoseError::DuplicateKeyId(_)
            | JoseError::MissingPrivateKey
            | JoseError::WeakKey(_) => ErrorCategory::Key,
            JoseError::Base64(_)
            | JoseError::Json(_)
            | JoseError::SectionCount(_)
            | JoseError::EmptySignature
            | JoseError::NotAJwt(_) => ErrorCategory::Encoding,
            JoseError::UnsupportedAlgorithm(_)
            | JoseError::UnknownKeyId(_)
            | JoseError::InvalidSignature => ErrorCategory::Verification,
            JoseError::ClaimRejected { .. } => ErrorCategory::Claim,
            JoseError::Randomness(_)
            | JoseError::Signing(_)
            | JoseError::TaskFailed
            | JoseError::Unverified => ErrorCategory::Internal,
        }
    }

    /// Create a malformed key error
    #[inline]
    #[must_use]
    pub fn malformed_key(msg: impl std::fmt::Display) -> Self {
        JoseError::MalformedKey(msg.to_string())
    }

    /// Create a key type mismatch error
    #[inline]
    #[must_use]
    pub fn key_type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        JoseError::KeyTypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn signing(msg: impl std::fmt::Display) -> Self {
        JoseError::Signing(msg.to_string())
    }
}

impl From<base64::DecodeError> for JoseError {
    fn from(err: base64::DecodeError) -> Self {
        JoseError::Base64(err.to_string())
    }
}

impl From<serde_json::Error> for JoseError {
    fn from(err: serde_json::Error) -> Self {
        JoseError::Json(err.to_string())
    }
}

impl From<getrandom::Error> for JoseError {
    fn from(err: getrandom::Error) -> Self {
        JoseError::Randomness(err.to_string())
    }
}

/// Reasons a claim validator rejects a payload
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimError {
    /// `exp` (plus tolerance) lies in the past
    #[error("token has expired")]
    Expired,
    /// `nbf` (minus tolerance) lies in the future
    #[error("token is not valid yet")]
    NotYetValid,
    /// `iat` (minus tolerance) lies in the future
    #[error("token was issued in the future")]
    IssuedInFuture,
    /// A claim the validator depends on is absent
    #[error("claim {0:?} is missing")]
    MissingClaim(&'static str),
    /// Issuer is on the denylist
    #[error("issuer {0:?} is denied")]
    IssuerDenied(String),
    /// Issuer is not on the allowlist
    #[error("issuer {0:?} is not allowed")]
    IssuerNotAllowed(String),
    /// Audience differs from the expected one
    #[error("audience does not contain {expected:?}")]
    AudienceMismatch {
        /// Audience the validator was configured with
        expected: String,
    },
    /// Token id is on the denylist
    #[error("token id {0:?} is denied")]
    TokenIdDenied(String),
    /// Payload is not a JSON object or the claim has the wrong JSON type
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            JoseError::NoDefaultAlgorithm.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            JoseError::DuplicateKeyId("a".into()).category(),
            ErrorCategory::Key
        );
        assert_eq!(JoseError::EmptySignature.category(), ErrorCategory::Encoding);
        assert_eq!(
            JoseError::UnknownKeyId("a".into()).category(),
            ErrorCategory::Verification
        );
        let claim = JoseError::ClaimRejected {
            validator: "exp".into(),
            source: ClaimError::Expired,
        };
        assert_eq!(claim.category(), ErrorCategory::Claim);
    }

    #[test]
    fn claim_rejection_names_the_validator() {
        let err = JoseError::ClaimRejected {
            validator: "aud".into(),
            source: ClaimError::AudienceMismatch {
                expected: "api".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("\"aud\""));
        assert!(msg.contains("\"api\""));
    }
}
