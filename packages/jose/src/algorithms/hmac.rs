//! HMAC-SHA2 provider (HS256, HS384, HS512).

use super::{trust_store::TrustStore, KeyIdentity, ShaSize};
use crate::{
    error::{JoseError, JoseResult},
    jwk::{Jwk, JwkKey, SymmetricKey},
    traits::SignatureProvider,
    types::Header,
};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use subtle::ConstantTimeEq;

/// HMAC variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HmacAlgorithm {
    /// HMAC with SHA-256
    Hs256,
    /// HMAC with SHA-384
    Hs384,
    /// HMAC with SHA-512
    Hs512,
}

impl HmacAlgorithm {
    /// Header `alg` value.
    pub const fn name(self) -> &'static str {
        match self {
            HmacAlgorithm::Hs256 => "HS256",
            HmacAlgorithm::Hs384 => "HS384",
            HmacAlgorithm::Hs512 => "HS512",
        }
    }

    /// Shortest accepted secret, equal to the digest size.
    pub const fn min_key_len(self) -> usize {
        self.sha().output_len()
    }

    const fn sha(self) -> ShaSize {
        match self {
            HmacAlgorithm::Hs256 => ShaSize::Sha256,
            HmacAlgorithm::Hs384 => ShaSize::Sha384,
            HmacAlgorithm::Hs512 => ShaSize::Sha512,
        }
    }

    fn check_key(self, key: &SymmetricKey) -> JoseResult<()> {
        if key.len() < self.min_key_len() {
            return Err(JoseError::KeyLength {
                field: "k",
                expected: self.min_key_len(),
                actual: key.len(),
            });
        }
        Ok(())
    }

    fn mac(self, key: &[u8], data: &[u8]) -> JoseResult<Vec<u8>> {
        let invalid = |_| JoseError::malformed_key("HMAC key rejected");
        Ok(match self.sha() {
            ShaSize::Sha256 => {
                let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(invalid)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            ShaSize::Sha384 => {
                let mut mac = Hmac::<Sha384>::new_from_slice(key).map_err(invalid)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            ShaSize::Sha512 => {
                let mut mac = Hmac::<Sha512>::new_from_slice(key).map_err(invalid)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        })
    }
}

/// Caller-supplied HMAC key material.
#[derive(Debug, Clone)]
pub struct HmacSettings {
    /// Shared secret.
    pub secret: SymmetricKey,
    /// Key ID and key URL to stamp.
    pub identity: KeyIdentity,
}

impl HmacSettings {
    /// Settings for a raw secret.
    pub fn new(secret: impl Into<Vec<u8>>, kid: impl Into<String>) -> Self {
        Self {
            secret: SymmetricKey::new(secret),
            identity: KeyIdentity::new(kid),
        }
    }

    /// Settings from an `oct` JWK. A missing `kid` is generated.
    pub fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        Ok(Self {
            secret: SymmetricKey::from_jwk(jwk)?,
            identity: KeyIdentity::for_jwk(jwk)?,
        })
    }

    /// Attach a key URL hint.
    #[must_use]
    pub fn with_key_url(mut self, jku: impl Into<String>) -> Self {
        self.identity = self.identity.with_key_url(jku);
        self
    }
}

/// Secret JWK exported from an HMAC provider.
///
/// Anyone holding it can mint tokens. The JWK is only reachable through
/// [`RevealedSecret::expose`] and the type never prints it.
#[derive(Clone)]
pub struct RevealedSecret(Jwk);

impl RevealedSecret {
    /// The secret `oct` JWK.
    pub fn expose(&self) -> &Jwk {
        &self.0
    }

    /// Take the secret `oct` JWK.
    pub fn into_exposed(self) -> Jwk {
        self.0
    }
}

impl fmt::Debug for RevealedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealedSecret")
            .field("kid", &self.0.kid)
            .finish_non_exhaustive()
    }
}

/// HMAC signature provider.
#[derive(Debug)]
pub struct HmacProvider {
    algorithm: HmacAlgorithm,
    identity: KeyIdentity,
    secret: SymmetricKey,
    trusted: TrustStore<SymmetricKey>,
}

impl HmacProvider {
    /// Fresh secret of digest length and random key ID.
    pub fn generate(algorithm: HmacAlgorithm) -> JoseResult<(Self, RevealedSecret)> {
        let mut secret = zeroize::Zeroizing::new(vec![0u8; algorithm.min_key_len()]);
        getrandom::fill(&mut secret)?;
        let settings = HmacSettings {
            secret: SymmetricKey::new(secret.to_vec()),
            identity: KeyIdentity::generate()?,
        };
        let provider = Self::load(settings, algorithm)?;
        let revealed = provider.current_key()?;
        tracing::debug!(alg = algorithm.name(), kid = %provider.identity.kid, "generated HMAC secret");
        Ok((provider, revealed))
    }

    /// [`generate`](Self::generate) with a key URL hint.
    pub fn generate_with_key_url(
        algorithm: HmacAlgorithm,
        jku: impl Into<String>,
    ) -> JoseResult<(Self, RevealedSecret)> {
        let (mut provider, revealed) = Self::generate(algorithm)?;
        provider.identity = provider.identity.with_key_url(jku);
        Ok((provider, revealed))
    }

    /// Provider over a caller-supplied secret.
    pub fn load(settings: HmacSettings, algorithm: HmacAlgorithm) -> JoseResult<Self> {
        algorithm.check_key(&settings.secret)?;
        Ok(Self {
            algorithm,
            trusted: TrustStore::with_own_key(&settings.identity.kid, settings.secret.clone()),
            identity: settings.identity,
            secret: settings.secret,
        })
    }

    /// Variant this provider signs with.
    pub fn algorithm(&self) -> HmacAlgorithm {
        self.algorithm
    }

    /// Own key ID.
    pub fn kid(&self) -> &str {
        &self.identity.kid
    }

    /// Trust another secret under its `kid`.
    pub fn add_trusted_key(&self, jwk: &Jwk) -> JoseResult<()> {
        self.trusted
            .add_jwk(jwk, |key| self.algorithm.check_key(key))
    }

    /// Forget a trusted secret. The own key ID is ignored.
    pub fn remove_trusted_key(&self, kid: &str) -> bool {
        self.trusted.remove(kid)
    }

    /// Export the signing secret.
    pub fn current_key(&self) -> JoseResult<RevealedSecret> {
        let jwk = self.secret.to_jwk(Some(&self.identity.kid))?;
        Ok(RevealedSecret(jwk.for_verification(self.algorithm.name())))
    }
}

impl SignatureProvider for HmacProvider {
    fn alg(&self) -> &str {
        self.algorithm.name()
    }

    fn stamp_header(&self, header: &mut Header) {
        self.identity.stamp(self.algorithm.name(), header);
    }

    fn sign(&self, signing_input: &[u8]) -> JoseResult<Vec<u8>> {
        self.algorithm.mac(self.secret.as_bytes(), signing_input)
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8], header: &Header) -> JoseResult<()> {
        let key = self.trusted.resolve(header.key_id())?;
        let expected = self.algorithm.mac(key.as_bytes(), signing_input)?;
        if bool::from(expected.as_slice().ct_eq(signature)) {
            Ok(())
        } else {
            Err(JoseError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn short_secret_is_rejected() {
        let settings = HmacSettings::new(b"Jefe".to_vec(), "k");
        let err = HmacProvider::load(settings, HmacAlgorithm::Hs256).unwrap_err();
        assert_eq!(
            err,
            JoseError::KeyLength {
                field: "k",
                expected: 32,
                actual: 4
            }
        );
    }

    #[test]
    fn mac_matches_rfc4231_case_1() {
        let key = [0x0bu8; 20];
        let mac = HmacAlgorithm::Hs256.mac(&key, b"Hi There").unwrap();
        assert_eq!(
            mac,
            hex!("b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7")
        );
    }

    #[test]
    fn signature_length_mismatch_is_invalid() {
        let (provider, _) = HmacProvider::generate(HmacAlgorithm::Hs384).unwrap();
        let mut header = Header::default();
        provider.stamp_header(&mut header);
        let sig = provider.sign(b"data").unwrap();
        assert_eq!(sig.len(), 48);
        assert!(provider.verify(b"data", &sig, &header).is_ok());
        assert_eq!(
            provider.verify(b"data", &sig[..47], &header),
            Err(JoseError::InvalidSignature)
        );
    }

    #[test]
    fn revealed_secret_debug_omits_key() {
        let (_, secret) = HmacProvider::generate(HmacAlgorithm::Hs256).unwrap();
        let k = secret.expose().k.clone().unwrap();
        assert!(!format!("{secret:?}").contains(&k));
    }
}
