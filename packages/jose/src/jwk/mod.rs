//! JSON Web Key conversion.
//!
//! Every key type used by the signature providers converts to and from a
//! [`Jwk`] through [`JwkKey`], and to and from its native byte encoding
//! through [`RawKey`]. EC coordinates are fixed width, RSA integers are
//! minimal big-endian and OKP curves are told apart by key length.

mod ec;
mod oct;
mod okp;
mod raw;
mod rsa;

pub use ec::{EcPrivateKey, EcPublicKey};
pub use oct::SymmetricKey;
pub use okp::{OkpPrivateKey, OkpPublicKey, ED25519_KEY_LEN, ED448_KEY_LEN};
pub(crate) use okp::{ed448_private, ed448_public};
pub use raw::PublicKey;

use crate::error::{JoseError, JoseResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encode bytes as unpadded base64url.
pub(crate) fn b64_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a JWK member. Trailing `=` padding is accepted.
pub(crate) fn b64_decode_lenient(value: &str) -> JoseResult<Vec<u8>> {
    Ok(URL_SAFE_NO_PAD.decode(value.trim_end_matches('='))?)
}

/// JWK `kty` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Elliptic curve, `EC`.
    Ec,
    /// RSA, `RSA`.
    Rsa,
    /// Symmetric octet sequence, `oct`.
    Oct,
    /// Octet key pair, `OKP`.
    Okp,
    /// Unclassified raw key bytes in `k`, `internal`.
    Internal,
}

impl KeyType {
    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyType::Ec => "EC",
            KeyType::Rsa => "RSA",
            KeyType::Oct => "oct",
            KeyType::Okp => "OKP",
            KeyType::Internal => "internal",
        }
    }

    /// Parse a wire name.
    pub fn parse(value: &str) -> JoseResult<Self> {
        match value {
            "EC" => Ok(KeyType::Ec),
            "RSA" => Ok(KeyType::Rsa),
            "oct" => Ok(KeyType::Oct),
            "OKP" => Ok(KeyType::Okp),
            "internal" => Ok(KeyType::Internal),
            other => Err(JoseError::UnsupportedKeyType(other.to_string())),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWK `crv` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256
    P256,
    /// NIST P-384
    P384,
    /// NIST P-521
    P521,
    /// Edwards25519
    Ed25519,
    /// Edwards448
    Ed448,
}

impl Curve {
    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
            Curve::Ed25519 => "Ed25519",
            Curve::Ed448 => "Ed448",
        }
    }

    /// Parse a wire name.
    pub fn parse(value: &str) -> JoseResult<Self> {
        match value {
            "P-256" => Ok(Curve::P256),
            "P-384" => Ok(Curve::P384),
            "P-521" => Ok(Curve::P521),
            "Ed25519" => Ok(Curve::Ed25519),
            "Ed448" => Ok(Curve::Ed448),
            other => Err(JoseError::UnsupportedCurve(other.to_string())),
        }
    }

    /// Fixed width of a coordinate, scalar or OKP key in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
            Curve::Ed25519 => ED25519_KEY_LEN,
            Curve::Ed448 => ED448_KEY_LEN,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWK `use` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUse {
    /// Signature
    Sig,
    /// Encryption
    Enc,
}

/// JWK `key_ops` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum KeyOperation {
    Sign,
    Verify,
    Encrypt,
    Decrypt,
    WrapKey,
    UnwrapKey,
    DeriveKey,
    DeriveBits,
}

/// JSON Web Key (RFC 7517).
///
/// Key material members hold base64url strings. Which of them are set
/// depends on `kty`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type name, see [`KeyType`].
    pub kty: String,
    /// Curve name for `EC` and `OKP`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// EC x coordinate or OKP public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// EC y coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// RSA modulus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// Private exponent, EC scalar or OKP seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// First RSA prime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    /// Second RSA prime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// `d mod (p-1)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    /// `d mod (q-1)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    /// `q^-1 mod p`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
    /// Symmetric key or raw `internal` key bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
    /// Intended use.
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<KeyUse>,
    /// Permitted operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<KeyOperation>>,
    /// Algorithm the key is meant for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Key ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl Jwk {
    /// Empty JWK of the given type.
    pub fn new(kty: KeyType) -> Self {
        Self {
            kty: kty.as_str().to_string(),
            crv: None,
            x: None,
            y: None,
            n: None,
            e: None,
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
            k: None,
            key_use: None,
            key_ops: None,
            alg: None,
            kid: None,
        }
    }

    /// Parse JWK JSON.
    pub fn from_json(json: &str) -> JoseResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JWK JSON.
    pub fn to_json(&self) -> JoseResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parsed `kty`.
    pub fn key_type(&self) -> JoseResult<KeyType> {
        KeyType::parse(&self.kty)
    }

    /// Parsed `crv`; fails when absent.
    pub fn curve(&self) -> JoseResult<Curve> {
        Curve::parse(self.crv.as_deref().ok_or(JoseError::MissingKeyField("crv"))?)
    }

    /// Whether private members are present.
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// Set `kid`.
    #[must_use]
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Mark as a signature verification key for `alg`.
    #[must_use]
    pub fn for_verification(mut self, alg: impl Into<String>) -> Self {
        self.alg = Some(alg.into());
        self.key_use = Some(KeyUse::Sig);
        self.key_ops = Some(vec![KeyOperation::Verify]);
        self
    }

    pub(crate) fn expect_type(&self, expected: KeyType) -> JoseResult<()> {
        let found = self.key_type()?;
        if found == expected {
            Ok(())
        } else {
            Err(JoseError::key_type_mismatch(expected.as_str(), found.as_str()))
        }
    }

    pub(crate) fn decode_member(
        value: &Option<String>,
        name: &'static str,
    ) -> JoseResult<Vec<u8>> {
        b64_decode_lenient(value.as_deref().ok_or(JoseError::MissingKeyField(name))?)
    }

    /// Decode a fixed-width member.
    pub(crate) fn decode_fixed(
        value: &Option<String>,
        name: &'static str,
        width: usize,
    ) -> JoseResult<Vec<u8>> {
        let bytes = Self::decode_member(value, name)?;
        if bytes.len() != width {
            return Err(JoseError::KeyLength {
                field: name,
                expected: width,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("n", &self.n)
            .field("e", &self.e)
            .field("d", &secret(&self.d))
            .field("p", &secret(&self.p))
            .field("q", &secret(&self.q))
            .field("k", &secret(&self.k))
            .field("alg", &self.alg)
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

/// Conversion between a key and its JWK form.
pub trait JwkKey: Sized {
    /// Encode with the given key ID.
    fn to_jwk(&self, kid: Option<&str>) -> JoseResult<Jwk>;

    /// Decode, checking `kty`, curve and member lengths.
    fn from_jwk(jwk: &Jwk) -> JoseResult<Self>;
}

/// Conversion between a key and its native byte encoding.
///
/// RSA uses DER (SPKI for public, PKCS#8 for private), EC uses SEC1
/// points and big-endian scalars, OKP and symmetric keys are raw bytes.
pub trait RawKey: Sized {
    /// Native encoding.
    fn to_raw(&self) -> JoseResult<Vec<u8>>;

    /// Decode the native encoding.
    fn from_raw(bytes: &[u8]) -> JoseResult<Self>;
}

/// Decode either a standard JWK or an `internal` raw-bytes JWK.
pub(crate) fn decode_any<K: JwkKey + RawKey>(jwk: &Jwk) -> JoseResult<K> {
    if jwk.key_type()? == KeyType::Internal {
        K::from_raw(&Jwk::decode_member(&jwk.k, "k")?)
    } else {
        K::from_jwk(jwk)
    }
}

/// Left-pad `bytes` with zeros to `width`.
pub(crate) fn pad_to(bytes: &[u8], width: usize) -> JoseResult<Vec<u8>> {
    if bytes.len() > width {
        return Err(JoseError::malformed_key(format!(
            "{} byte value exceeds {width} byte width",
            bytes.len()
        )));
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(bytes);
    Ok(out)
}
