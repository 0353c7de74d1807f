//! Signature providers, one per algorithm family.
//!
//! Every provider owns an optional signing key, a [`KeyIdentity`] it stamps
//! into headers and a trust store of verification keys addressed by `kid`.

mod ecdsa;
mod eddsa;
mod hmac;
mod pss;
mod rsa;
pub(crate) mod trust_store;

pub use self::ecdsa::{EcdsaAlgorithm, EcdsaProvider, EcdsaSettings};
pub use self::eddsa::{EddsaProvider, EddsaSettings, EDDSA};
pub use self::hmac::{HmacAlgorithm, HmacProvider, HmacSettings, RevealedSecret};
pub use self::pss::{PssAlgorithm, PssProvider};
pub use self::rsa::{RsaAlgorithm, RsaProvider, RsaSettings, MIN_RSA_BITS};

use crate::{error::JoseResult, jwk::Jwk, types::Header};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Key ID and key URL a provider writes into every header it signs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIdentity {
    /// Key ID.
    pub kid: String,
    /// Key URL hint. Never dereferenced.
    pub jku: Option<String>,
}

impl KeyIdentity {
    /// Identity with a caller-chosen key ID.
    pub fn new(kid: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            jku: None,
        }
    }

    /// Identity with a fresh random key ID.
    pub fn generate() -> JoseResult<Self> {
        Ok(Self::new(new_key_id()?))
    }

    /// Identity named by a JWK's `kid`, generated when it has none.
    pub fn for_jwk(jwk: &Jwk) -> JoseResult<Self> {
        match jwk.kid.as_deref() {
            Some(kid) if !kid.is_empty() => Ok(Self::new(kid)),
            _ => Self::generate(),
        }
    }

    /// Attach a key URL hint.
    #[must_use]
    pub fn with_key_url(mut self, jku: impl Into<String>) -> Self {
        self.jku = Some(jku.into());
        self
    }

    pub(crate) fn stamp(&self, alg: &str, header: &mut Header) {
        header.alg = alg.to_string();
        header.kid = Some(self.kid.clone());
        header.jku = self.jku.clone();
    }
}

/// Random UUIDv4 key ID drawn from the OS random source.
pub fn new_key_id() -> JoseResult<String> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes)?;
    Ok(uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string())
}

/// SHA-2 output size shared by HS, RS, PS and ES variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShaSize {
    Sha256,
    Sha384,
    Sha512,
}

impl ShaSize {
    pub(crate) const fn output_len(self) -> usize {
        match self {
            ShaSize::Sha256 => 32,
            ShaSize::Sha384 => 48,
            ShaSize::Sha512 => 64,
        }
    }

    pub(crate) fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            ShaSize::Sha256 => Sha256::digest(data).to_vec(),
            ShaSize::Sha384 => Sha384::digest(data).to_vec(),
            ShaSize::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}
