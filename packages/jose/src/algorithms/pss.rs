//! RSASSA-PSS provider (PS256, PS384, PS512).

use super::{
    rsa::{Padding, RsaKeys, RsaSettings},
    ShaSize,
};
use crate::{
    error::JoseResult,
    jwk::{Jwk, PublicKey},
    traits::SignatureProvider,
    types::Header,
};

/// RSASSA-PSS variants. Salt length and MGF1 hash follow the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PssAlgorithm {
    /// PSS with SHA-256
    Ps256,
    /// PSS with SHA-384
    Ps384,
    /// PSS with SHA-512
    Ps512,
}

impl PssAlgorithm {
    /// Header `alg` value.
    pub const fn name(self) -> &'static str {
        match self {
            PssAlgorithm::Ps256 => "PS256",
            PssAlgorithm::Ps384 => "PS384",
            PssAlgorithm::Ps512 => "PS512",
        }
    }

    const fn sha(self) -> ShaSize {
        match self {
            PssAlgorithm::Ps256 => ShaSize::Sha256,
            PssAlgorithm::Ps384 => ShaSize::Sha384,
            PssAlgorithm::Ps512 => ShaSize::Sha512,
        }
    }
}

/// RSASSA-PSS signature provider.
#[derive(Debug)]
pub struct PssProvider {
    algorithm: PssAlgorithm,
    keys: RsaKeys,
}

impl PssProvider {
    /// Fresh 2048-bit key and random key ID.
    pub fn generate(algorithm: PssAlgorithm) -> JoseResult<(Self, Jwk)> {
        Self::generated(algorithm, RsaKeys::generate(None)?)
    }

    /// [`generate`](Self::generate) with a key URL hint.
    pub fn generate_with_key_url(
        algorithm: PssAlgorithm,
        jku: impl Into<String>,
    ) -> JoseResult<(Self, Jwk)> {
        Self::generated(algorithm, RsaKeys::generate(Some(jku.into()))?)
    }

    fn generated(algorithm: PssAlgorithm, keys: RsaKeys) -> JoseResult<(Self, Jwk)> {
        let provider = Self { algorithm, keys };
        tracing::debug!(alg = algorithm.name(), kid = %provider.kid(), "generated RSA-PSS key");
        let public = provider.current_key()?;
        Ok((provider, public))
    }

    /// Provider over a caller-supplied key.
    pub fn load(settings: RsaSettings, algorithm: PssAlgorithm) -> JoseResult<Self> {
        Ok(Self {
            algorithm,
            keys: RsaKeys::load(settings)?,
        })
    }

    /// Verify-only provider from a public RSA or `internal` JWK.
    pub fn verifier(public: &Jwk, algorithm: PssAlgorithm) -> JoseResult<Self> {
        Ok(Self {
            algorithm,
            keys: RsaKeys::verifier(public)?,
        })
    }

    /// Variant this provider signs with.
    pub fn algorithm(&self) -> PssAlgorithm {
        self.algorithm
    }

    /// Own key ID.
    pub fn kid(&self) -> &str {
        &self.keys.identity.kid
    }

    /// Trust another public key under its `kid`.
    pub fn add_trusted_key(&self, jwk: &Jwk) -> JoseResult<()> {
        self.keys.add_trusted_key(jwk)
    }

    /// Forget a trusted key. The own key ID is ignored.
    pub fn remove_trusted_key(&self, kid: &str) -> bool {
        self.keys.remove_trusted_key(kid)
    }

    /// Own public key as a JWK.
    pub fn current_key(&self) -> JoseResult<Jwk> {
        self.keys.current_key(self.algorithm.name())
    }

    /// Own public key as SPKI DER.
    pub fn current_public_key(&self) -> JoseResult<PublicKey> {
        self.keys.current_public_key()
    }
}

impl SignatureProvider for PssProvider {
    fn alg(&self) -> &str {
        self.algorithm.name()
    }

    fn stamp_header(&self, header: &mut Header) {
        self.keys.identity.stamp(self.algorithm.name(), header);
    }

    fn sign(&self, signing_input: &[u8]) -> JoseResult<Vec<u8>> {
        self.keys.sign(Padding::Pss, self.algorithm.sha(), signing_input)
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8], header: &Header) -> JoseResult<()> {
        self.keys.verify(
            Padding::Pss,
            self.algorithm.sha(),
            signing_input,
            signature,
            header,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoseError;

    #[test]
    fn pss_signatures_are_randomized_and_verify() {
        let (provider, _) = PssProvider::generate(PssAlgorithm::Ps256).unwrap();
        let mut header = Header::default();
        provider.stamp_header(&mut header);
        let a = provider.sign(b"same input").unwrap();
        let b = provider.sign(b"same input").unwrap();
        assert_ne!(a, b);
        provider.verify(b"same input", &a, &header).unwrap();
        provider.verify(b"same input", &b, &header).unwrap();
    }

    #[test]
    fn pkcs1_signature_does_not_pass_pss() {
        use super::super::rsa::{RsaAlgorithm, RsaProvider};
        let (rs, public) = RsaProvider::generate(RsaAlgorithm::Rs256).unwrap();
        let ps = PssProvider::verifier(&public, PssAlgorithm::Ps256).unwrap();
        let mut header = Header::default();
        rs.stamp_header(&mut header);
        let sig = rs.sign(b"input").unwrap();
        assert_eq!(
            ps.verify(b"input", &sig, &header),
            Err(JoseError::InvalidSignature)
        );
    }
}
