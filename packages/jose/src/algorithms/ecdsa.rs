//! ECDSA provider over the NIST curves (ES256, ES384, ES512).
//!
//! Signatures are `r || s`, each half fixed to the curve's coordinate
//! width.

use super::{trust_store::TrustStore, KeyIdentity};
use crate::{
    error::{JoseError, JoseResult},
    jwk::{decode_any, Curve, EcPrivateKey, EcPublicKey, Jwk, JwkKey, PublicKey},
    traits::SignatureProvider,
    types::Header,
};
use p256::ecdsa::signature::{Signer, Verifier};
use rand::rngs::OsRng;

/// ECDSA variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcdsaAlgorithm {
    /// P-256 with SHA-256
    Es256,
    /// P-384 with SHA-384
    Es384,
    /// P-521 with SHA-512
    Es512,
}

impl EcdsaAlgorithm {
    /// Header `alg` value.
    pub const fn name(self) -> &'static str {
        match self {
            EcdsaAlgorithm::Es256 => "ES256",
            EcdsaAlgorithm::Es384 => "ES384",
            EcdsaAlgorithm::Es512 => "ES512",
        }
    }

    /// Curve this variant signs on.
    pub const fn curve(self) -> Curve {
        match self {
            EcdsaAlgorithm::Es256 => Curve::P256,
            EcdsaAlgorithm::Es384 => Curve::P384,
            EcdsaAlgorithm::Es512 => Curve::P521,
        }
    }

    /// Length of an encoded signature.
    pub const fn signature_len(self) -> usize {
        2 * self.curve().key_len()
    }

    fn check_curve(self, found: Curve) -> JoseResult<()> {
        if found == self.curve() {
            Ok(())
        } else {
            Err(JoseError::key_type_mismatch(
                self.curve().as_str(),
                found.as_str(),
            ))
        }
    }
}

/// Left-pad a short half, keep the trailing bytes of a long one.
fn fit_to(half: &[u8], width: usize) -> Vec<u8> {
    if half.len() >= width {
        return half[half.len() - width..].to_vec();
    }
    let mut out = vec![0u8; width - half.len()];
    out.extend_from_slice(half);
    out
}

/// Re-encode a primitive's `r || s` at the fixed JWS width.
fn fixed_width(raw: &[u8], width: usize) -> Vec<u8> {
    let (r, s) = raw.split_at(raw.len() / 2);
    let mut out = fit_to(r, width);
    out.extend(fit_to(s, width));
    out
}

fn sign_with(key: &EcPrivateKey, input: &[u8]) -> JoseResult<Vec<u8>> {
    let scalar = key.scalar_bytes();
    let raw = match key {
        EcPrivateKey::P256(_) => {
            let signer =
                p256::ecdsa::SigningKey::from_slice(&scalar).map_err(JoseError::malformed_key)?;
            let sig: p256::ecdsa::Signature = signer.try_sign(input).map_err(JoseError::signing)?;
            sig.to_bytes().to_vec()
        }
        EcPrivateKey::P384(_) => {
            let signer =
                p384::ecdsa::SigningKey::from_slice(&scalar).map_err(JoseError::malformed_key)?;
            let sig: p384::ecdsa::Signature = signer.try_sign(input).map_err(JoseError::signing)?;
            sig.to_bytes().to_vec()
        }
        EcPrivateKey::P521(_) => {
            let signer =
                p521::ecdsa::SigningKey::from_slice(&scalar).map_err(JoseError::malformed_key)?;
            let sig: p521::ecdsa::Signature = signer.try_sign(input).map_err(JoseError::signing)?;
            sig.to_bytes().to_vec()
        }
    };
    Ok(fixed_width(&raw, key.curve().key_len()))
}

fn verify_with(key: &EcPublicKey, input: &[u8], signature: &[u8]) -> JoseResult<()> {
    let sec1 = key.to_sec1();
    let result = match key {
        EcPublicKey::P256(_) => {
            let verifier = p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                .map_err(JoseError::malformed_key)?;
            p256::ecdsa::Signature::from_slice(signature)
                .and_then(|sig| verifier.verify(input, &sig))
        }
        EcPublicKey::P384(_) => {
            let verifier = p384::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                .map_err(JoseError::malformed_key)?;
            p384::ecdsa::Signature::from_slice(signature)
                .and_then(|sig| verifier.verify(input, &sig))
        }
        EcPublicKey::P521(_) => {
            let verifier = p521::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                .map_err(JoseError::malformed_key)?;
            p521::ecdsa::Signature::from_slice(signature)
                .and_then(|sig| verifier.verify(input, &sig))
        }
    };
    result.map_err(|_| JoseError::InvalidSignature)
}

/// Caller-supplied EC key material.
#[derive(Debug, Clone)]
pub struct EcdsaSettings {
    /// Private key.
    pub key: EcPrivateKey,
    /// Key ID and key URL to stamp.
    pub identity: KeyIdentity,
}

impl EcdsaSettings {
    /// Settings for an EC private key.
    pub fn new(key: EcPrivateKey, kid: impl Into<String>) -> Self {
        Self {
            key,
            identity: KeyIdentity::new(kid),
        }
    }

    /// Settings from a private EC JWK. A missing `kid` is generated.
    pub fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        Ok(Self {
            key: EcPrivateKey::from_jwk(jwk)?,
            identity: KeyIdentity::for_jwk(jwk)?,
        })
    }

    /// Settings from PKCS#8 DER.
    pub fn from_pkcs8_der(der: &[u8], kid: impl Into<String>) -> JoseResult<Self> {
        Ok(Self::new(EcPrivateKey::from_pkcs8_der(der)?, kid))
    }

    /// Attach a key URL hint.
    #[must_use]
    pub fn with_key_url(mut self, jku: impl Into<String>) -> Self {
        self.identity = self.identity.with_key_url(jku);
        self
    }
}

/// ECDSA signature provider.
#[derive(Debug)]
pub struct EcdsaProvider {
    algorithm: EcdsaAlgorithm,
    identity: KeyIdentity,
    private: Option<EcPrivateKey>,
    public: EcPublicKey,
    trusted: TrustStore<EcPublicKey>,
}

impl EcdsaProvider {
    /// Fresh key on the variant's curve and random key ID.
    pub fn generate(algorithm: EcdsaAlgorithm) -> JoseResult<(Self, Jwk)> {
        Self::generated(algorithm, KeyIdentity::generate()?)
    }

    /// [`generate`](Self::generate) with a key URL hint.
    pub fn generate_with_key_url(
        algorithm: EcdsaAlgorithm,
        jku: impl Into<String>,
    ) -> JoseResult<(Self, Jwk)> {
        Self::generated(algorithm, KeyIdentity::generate()?.with_key_url(jku))
    }

    fn generated(algorithm: EcdsaAlgorithm, identity: KeyIdentity) -> JoseResult<(Self, Jwk)> {
        let key = match algorithm.curve() {
            Curve::P256 => EcPrivateKey::P256(p256::SecretKey::random(&mut OsRng)),
            Curve::P384 => EcPrivateKey::P384(p384::SecretKey::random(&mut OsRng)),
            _ => EcPrivateKey::P521(p521::SecretKey::random(&mut OsRng)),
        };
        let provider = Self::load(EcdsaSettings { key, identity }, algorithm)?;
        tracing::debug!(alg = algorithm.name(), kid = %provider.kid(), "generated EC key");
        let public = provider.current_key()?;
        Ok((provider, public))
    }

    /// Provider over a caller-supplied key on the variant's curve.
    pub fn load(settings: EcdsaSettings, algorithm: EcdsaAlgorithm) -> JoseResult<Self> {
        algorithm.check_curve(settings.key.curve())?;
        let public = settings.key.public_key();
        Ok(Self {
            algorithm,
            trusted: TrustStore::with_own_key(&settings.identity.kid, public.clone()),
            identity: settings.identity,
            private: Some(settings.key),
            public,
        })
    }

    /// Verify-only provider from a public EC or `internal` JWK.
    pub fn verifier(public: &Jwk, algorithm: EcdsaAlgorithm) -> JoseResult<Self> {
        let key: EcPublicKey = decode_any(public)?;
        algorithm.check_curve(key.curve())?;
        let identity = KeyIdentity::for_jwk(public)?;
        Ok(Self {
            algorithm,
            trusted: TrustStore::with_own_key(&identity.kid, key.clone()),
            identity,
            private: None,
            public: key,
        })
    }

    /// Variant this provider signs with.
    pub fn algorithm(&self) -> EcdsaAlgorithm {
        self.algorithm
    }

    /// Own key ID.
    pub fn kid(&self) -> &str {
        &self.identity.kid
    }

    /// Trust another public key on the same curve under its `kid`.
    pub fn add_trusted_key(&self, jwk: &Jwk) -> JoseResult<()> {
        self.trusted
            .add_jwk(jwk, |key| self.algorithm.check_curve(key.curve()))
    }

    /// Forget a trusted key. The own key ID is ignored.
    pub fn remove_trusted_key(&self, kid: &str) -> bool {
        self.trusted.remove(kid)
    }

    /// Own public key as a JWK.
    pub fn current_key(&self) -> JoseResult<Jwk> {
        Ok(self
            .public
            .to_jwk(Some(&self.identity.kid))?
            .for_verification(self.algorithm.name()))
    }

    /// Own public key as an uncompressed SEC1 point.
    pub fn current_public_key(&self) -> JoseResult<PublicKey> {
        PublicKey::from_key(&self.public, self.identity.kid.clone())
    }
}

impl SignatureProvider for EcdsaProvider {
    fn alg(&self) -> &str {
        self.algorithm.name()
    }

    fn stamp_header(&self, header: &mut Header) {
        self.identity.stamp(self.algorithm.name(), header);
    }

    fn sign(&self, signing_input: &[u8]) -> JoseResult<Vec<u8>> {
        let key = self.private.as_ref().ok_or(JoseError::MissingPrivateKey)?;
        sign_with(key, signing_input)
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8], header: &Header) -> JoseResult<()> {
        if signature.len() != self.algorithm.signature_len() {
            return Err(JoseError::InvalidSignature);
        }
        let key = self.trusted.resolve(header.key_id())?;
        self.algorithm.check_curve(key.curve())?;
        verify_with(&key, signing_input, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_halves_are_left_padded() {
        let raw = [1u8, 2, 3, 4];
        assert_eq!(fixed_width(&raw, 3), vec![0, 1, 2, 0, 3, 4]);
    }

    #[test]
    fn long_halves_keep_trailing_bytes() {
        let raw = [9u8, 1, 2, 8, 3, 4];
        assert_eq!(fixed_width(&raw, 2), vec![1, 2, 3, 4]);
    }

    #[test]
    fn signature_length_matches_curve_width() {
        for algorithm in [
            EcdsaAlgorithm::Es256,
            EcdsaAlgorithm::Es384,
            EcdsaAlgorithm::Es512,
        ] {
            let (provider, _) = EcdsaProvider::generate(algorithm).unwrap();
            let sig = provider.sign(b"payload").unwrap();
            assert_eq!(sig.len(), algorithm.signature_len());
        }
        assert_eq!(EcdsaAlgorithm::Es512.signature_len(), 132);
    }

    #[test]
    fn wrong_length_is_rejected_before_key_lookup() {
        let (provider, _) = EcdsaProvider::generate(EcdsaAlgorithm::Es256).unwrap();
        let mut header = Header::default();
        header.kid = Some("nobody".into());
        assert_eq!(
            provider.verify(b"x", &[0u8; 63], &header),
            Err(JoseError::InvalidSignature)
        );
    }

    #[test]
    fn key_on_other_curve_is_rejected() {
        let key = EcPrivateKey::P384(p384::SecretKey::random(&mut OsRng));
        let err = EcdsaProvider::load(EcdsaSettings::new(key, "k"), EcdsaAlgorithm::Es256)
            .unwrap_err();
        assert_eq!(err, JoseError::key_type_mismatch("P-256", "P-384"));
    }
}
