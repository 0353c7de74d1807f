//! Envelope data types: the protected header and the token it travels with.

use crate::error::{JoseError, JoseResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Value of the `typ` header member on every token this crate emits.
pub const JWT_TYPE: &str = "JWT";

/// JWS protected header.
///
/// Members are serialized in declaration order. Optional members are
/// omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Token type, always `JWT` once encoded.
    #[serde(default)]
    pub typ: String,
    /// Registry name of the signing algorithm.
    #[serde(default)]
    pub alg: String,
    /// Key ID hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Key URL hint. Carried, never fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jku: Option<String>,
    /// Curve name, only read by the EdDSA provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
}

impl Header {
    /// Create a header for the given algorithm with no key hints.
    pub fn new(alg: impl Into<String>) -> Self {
        Self {
            typ: JWT_TYPE.to_string(),
            alg: alg.into(),
            kid: None,
            jku: None,
            crv: None,
        }
    }

    /// Key ID with an empty string treated as absent.
    pub fn key_id(&self) -> Option<&str> {
        self.kid.as_deref().filter(|kid| !kid.is_empty())
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Verdict stored on a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    /// Built locally, never decoded.
    Unverified,
    /// Signature and every claim validator passed.
    Valid,
    /// Decoded but rejected.
    Invalid(JoseError),
}

/// A header and opaque payload, plus the verdict reached by decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Protected header.
    pub header: Header,
    /// Payload bytes, normally a JSON object.
    pub payload: Vec<u8>,
    validity: Validity,
}

impl Token {
    /// Wrap raw payload bytes. The provider fills in the header on encode.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            header: Header::default(),
            payload: payload.into(),
            validity: Validity::Unverified,
        }
    }

    /// Serialize `claims` to JSON and wrap them.
    pub fn from_claims<T: Serialize + ?Sized>(claims: &T) -> JoseResult<Self> {
        Ok(Self::new(serde_json::to_vec(claims)?))
    }

    pub(crate) fn decoded(header: Header, payload: Vec<u8>, validity: Validity) -> Self {
        Self {
            header,
            payload,
            validity,
        }
    }

    /// Deserialize the payload.
    pub fn claims<T: DeserializeOwned>(&self) -> JoseResult<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    /// Verdict reached by decode.
    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    /// `Ok` only for a decoded token that passed every check.
    ///
    /// A locally constructed token reports [`JoseError::Unverified`].
    pub fn valid(&self) -> JoseResult<()> {
        match &self.validity {
            Validity::Valid => Ok(()),
            Validity::Invalid(err) => Err(err.clone()),
            Validity::Unverified => Err(JoseError::Unverified),
        }
    }

    /// Shorthand for `valid().is_ok()`.
    pub fn is_valid(&self) -> bool {
        matches!(self.validity, Validity::Valid)
    }
}
