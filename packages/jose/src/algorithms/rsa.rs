//! RSASSA-PKCS1-v1_5 provider (RS256, RS384, RS512) and the RSA key set it
//! shares with the PSS provider.

use super::{trust_store::TrustStore, KeyIdentity, ShaSize};
use crate::{
    error::{JoseError, JoseResult},
    jwk::{decode_any, Jwk, JwkKey, PublicKey},
    traits::SignatureProvider,
    types::Header,
};
use rand::rngs::OsRng;
use rsa::{
    pkcs8::DecodePrivateKey, traits::PublicKeyParts, Pkcs1v15Sign, Pss, RsaPrivateKey,
    RsaPublicKey,
};
use sha2::{Sha256, Sha384, Sha512};

/// Smallest modulus accepted for signing or verification.
pub const MIN_RSA_BITS: usize = 2048;

/// RSASSA-PKCS1-v1_5 variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsaAlgorithm {
    /// PKCS#1 v1.5 with SHA-256
    Rs256,
    /// PKCS#1 v1.5 with SHA-384
    Rs384,
    /// PKCS#1 v1.5 with SHA-512
    Rs512,
}

impl RsaAlgorithm {
    /// Header `alg` value.
    pub const fn name(self) -> &'static str {
        match self {
            RsaAlgorithm::Rs256 => "RS256",
            RsaAlgorithm::Rs384 => "RS384",
            RsaAlgorithm::Rs512 => "RS512",
        }
    }

    const fn sha(self) -> ShaSize {
        match self {
            RsaAlgorithm::Rs256 => ShaSize::Sha256,
            RsaAlgorithm::Rs384 => ShaSize::Sha384,
            RsaAlgorithm::Rs512 => ShaSize::Sha512,
        }
    }
}

/// Caller-supplied RSA key material.
#[derive(Debug, Clone)]
pub struct RsaSettings {
    /// Two-prime private key.
    pub key: RsaPrivateKey,
    /// Key ID and key URL to stamp.
    pub identity: KeyIdentity,
}

impl RsaSettings {
    /// Settings for an RSA private key.
    pub fn new(key: RsaPrivateKey, kid: impl Into<String>) -> Self {
        Self {
            key,
            identity: KeyIdentity::new(kid),
        }
    }

    /// Settings from a private RSA JWK. A missing `kid` is generated.
    pub fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        Ok(Self {
            key: RsaPrivateKey::from_jwk(jwk)?,
            identity: KeyIdentity::for_jwk(jwk)?,
        })
    }

    /// Settings from PKCS#8 DER.
    pub fn from_pkcs8_der(der: &[u8], kid: impl Into<String>) -> JoseResult<Self> {
        let key = RsaPrivateKey::from_pkcs8_der(der).map_err(JoseError::malformed_key)?;
        Ok(Self::new(key, kid))
    }

    /// Attach a key URL hint.
    #[must_use]
    pub fn with_key_url(mut self, jku: impl Into<String>) -> Self {
        self.identity = self.identity.with_key_url(jku);
        self
    }
}

fn check_strength(key: &RsaPublicKey) -> JoseResult<()> {
    let bits = key.n().bits();
    if bits < MIN_RSA_BITS {
        return Err(JoseError::WeakKey(format!(
            "{bits} bit RSA modulus, at least {MIN_RSA_BITS} required"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Padding {
    Pkcs1,
    Pss,
}

fn pkcs1(sha: ShaSize) -> Pkcs1v15Sign {
    match sha {
        ShaSize::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        ShaSize::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        ShaSize::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

/// Salt length equals the digest length, MGF1 uses the same hash.
fn pss(sha: ShaSize) -> Pss {
    match sha {
        ShaSize::Sha256 => Pss::new::<Sha256>(),
        ShaSize::Sha384 => Pss::new::<Sha384>(),
        ShaSize::Sha512 => Pss::new::<Sha512>(),
    }
}

/// RSA signing key, identity and trust store shared by RS and PS providers.
#[derive(Debug)]
pub(crate) struct RsaKeys {
    pub(crate) identity: KeyIdentity,
    private: Option<RsaPrivateKey>,
    public: RsaPublicKey,
    trusted: TrustStore<RsaPublicKey>,
}

impl RsaKeys {
    pub(crate) fn generate(jku: Option<String>) -> JoseResult<Self> {
        let mut identity = KeyIdentity::generate()?;
        identity.jku = jku;
        let key = RsaPrivateKey::new(&mut OsRng, MIN_RSA_BITS)
            .map_err(|err| JoseError::Randomness(err.to_string()))?;
        Self::load(RsaSettings { key, identity })
    }

    pub(crate) fn load(settings: RsaSettings) -> JoseResult<Self> {
        let public = settings.key.to_public_key();
        check_strength(&public)?;
        Ok(Self {
            trusted: TrustStore::with_own_key(&settings.identity.kid, public.clone()),
            identity: settings.identity,
            private: Some(settings.key),
            public,
        })
    }

    pub(crate) fn verifier(jwk: &Jwk) -> JoseResult<Self> {
        let public: RsaPublicKey = decode_any(jwk)?;
        check_strength(&public)?;
        let identity = KeyIdentity::for_jwk(jwk)?;
        Ok(Self {
            trusted: TrustStore::with_own_key(&identity.kid, public.clone()),
            identity,
            private: None,
            public,
        })
    }

    pub(crate) fn add_trusted_key(&self, jwk: &Jwk) -> JoseResult<()> {
        self.trusted.add_jwk(jwk, check_strength)
    }

    pub(crate) fn remove_trusted_key(&self, kid: &str) -> bool {
        self.trusted.remove(kid)
    }

    pub(crate) fn current_key(&self, alg: &str) -> JoseResult<Jwk> {
        Ok(self
            .public
            .to_jwk(Some(&self.identity.kid))?
            .for_verification(alg))
    }

    pub(crate) fn current_public_key(&self) -> JoseResult<PublicKey> {
        PublicKey::from_key(&self.public, self.identity.kid.clone())
    }

    pub(crate) fn sign(&self, padding: Padding, sha: ShaSize, input: &[u8]) -> JoseResult<Vec<u8>> {
        let key = self.private.as_ref().ok_or(JoseError::MissingPrivateKey)?;
        let hashed = sha.digest(input);
        match padding {
            Padding::Pkcs1 => key.sign_with_rng(&mut OsRng, pkcs1(sha), &hashed),
            Padding::Pss => key.sign_with_rng(&mut OsRng, pss(sha), &hashed),
        }
        .map_err(JoseError::signing)
    }

    pub(crate) fn verify(
        &self,
        padding: Padding,
        sha: ShaSize,
        input: &[u8],
        signature: &[u8],
        header: &Header,
    ) -> JoseResult<()> {
        let key = self.trusted.resolve(header.key_id())?;
        let hashed = sha.digest(input);
        match padding {
            Padding::Pkcs1 => key.verify(pkcs1(sha), &hashed, signature),
            Padding::Pss => key.verify(pss(sha), &hashed, signature),
        }
        .map_err(|_| JoseError::InvalidSignature)
    }
}

/// RSASSA-PKCS1-v1_5 signature provider.
#[derive(Debug)]
pub struct RsaProvider {
    algorithm: RsaAlgorithm,
    keys: RsaKeys,
}

impl RsaProvider {
    /// Fresh 2048-bit key and random key ID.
    pub fn generate(algorithm: RsaAlgorithm) -> JoseResult<(Self, Jwk)> {
        Self::generated(algorithm, RsaKeys::generate(None)?)
    }

    /// [`generate`](Self::generate) with a key URL hint.
    pub fn generate_with_key_url(
        algorithm: RsaAlgorithm,
        jku: impl Into<String>,
    ) -> JoseResult<(Self, Jwk)> {
        Self::generated(algorithm, RsaKeys::generate(Some(jku.into()))?)
    }

    fn generated(algorithm: RsaAlgorithm, keys: RsaKeys) -> JoseResult<(Self, Jwk)> {
        let provider = Self { algorithm, keys };
        tracing::debug!(alg = algorithm.name(), kid = %provider.kid(), "generated RSA key");
        let public = provider.current_key()?;
        Ok((provider, public))
    }

    /// Provider over a caller-supplied key.
    pub fn load(settings: RsaSettings, algorithm: RsaAlgorithm) -> JoseResult<Self> {
        Ok(Self {
            algorithm,
            keys: RsaKeys::load(settings)?,
        })
    }

    /// Verify-only provider from a public RSA or `internal` JWK.
    pub fn verifier(public: &Jwk, algorithm: RsaAlgorithm) -> JoseResult<Self> {
        Ok(Self {
            algorithm,
            keys: RsaKeys::verifier(public)?,
        })
    }

    /// Variant this provider signs with.
    pub fn algorithm(&self) -> RsaAlgorithm {
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

impl SignatureProvider for RsaProvider {
    fn alg(&self) -> &str {
        self.algorithm.name()
    }

    fn stamp_header(&self, header: &mut Header) {
        self.keys.identity.stamp(self.algorithm.name(), header);
    }

    fn sign(&self, signing_input: &[u8]) -> JoseResult<Vec<u8>> {
        self.keys
            .sign(Padding::Pkcs1, self.algorithm.sha(), signing_input)
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8], header: &Header) -> JoseResult<()> {
        self.keys.verify(
            Padding::Pkcs1,
            self.algorithm.sha(),
            signing_input,
            signature,
            header,
        )
    }
}
