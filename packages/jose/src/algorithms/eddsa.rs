//! EdDSA provider over Ed25519 and Ed448.
//!
//! One registered name covers both curves. Signing uses the default curve;
//! verification follows the header `crv` and looks the `kid` up in that
//! curve's trust store.

use super::{trust_store::TrustStore, KeyIdentity};
use crate::{
    error::{JoseError, JoseResult},
    jwk::{
        decode_any, ed448_private, ed448_public, Curve, Jwk, JwkKey, OkpPrivateKey, OkpPublicKey,
        PublicKey, RawKey,
    },
    traits::SignatureProvider,
    types::Header,
};
use ed25519_dalek::{Signer, Verifier};
use zeroize::Zeroizing;

/// Header `alg` value for both curves.
pub const EDDSA: &str = "EdDSA";

const ED448_SIGNATURE_LEN: usize = 114;

fn check_edwards(curve: Curve) -> JoseResult<Curve> {
    match curve {
        Curve::Ed25519 | Curve::Ed448 => Ok(curve),
        other => Err(JoseError::UnsupportedCurve(other.as_str().to_string())),
    }
}

/// Caller-supplied Edwards key material for one curve.
#[derive(Debug, Clone)]
pub struct EddsaSettings {
    /// Private seed.
    pub key: OkpPrivateKey,
    /// Key ID and key URL to stamp.
    pub identity: KeyIdentity,
}

impl EddsaSettings {
    /// Settings for an OKP private key.
    pub fn new(key: OkpPrivateKey, kid: impl Into<String>) -> Self {
        Self {
            key,
            identity: KeyIdentity::new(kid),
        }
    }

    /// Settings from a private OKP JWK. A missing `kid` is generated.
    pub fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        Ok(Self {
            key: OkpPrivateKey::from_jwk(jwk)?,
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

/// Own key and trust store of one curve.
#[derive(Debug)]
struct CurveKeys {
    identity: Option<KeyIdentity>,
    private: Option<OkpPrivateKey>,
    public: Option<OkpPublicKey>,
    trusted: TrustStore<OkpPublicKey>,
}

impl CurveKeys {
    fn none() -> Self {
        Self {
            identity: None,
            private: None,
            public: None,
            trusted: TrustStore::empty(),
        }
    }

    fn signing(settings: EddsaSettings) -> JoseResult<Self> {
        let public = settings.key.public_key()?;
        Ok(Self {
            trusted: TrustStore::with_own_key(&settings.identity.kid, public.clone()),
            identity: Some(settings.identity),
            private: Some(settings.key),
            public: Some(public),
        })
    }

    fn verifying(public: OkpPublicKey, identity: KeyIdentity) -> Self {
        Self {
            trusted: TrustStore::with_own_key(&identity.kid, public.clone()),
            identity: Some(identity),
            private: None,
            public: Some(public),
        }
    }

    fn current_key(&self) -> JoseResult<Jwk> {
        match (&self.public, &self.identity) {
            (Some(public), Some(identity)) => {
                Ok(public.to_jwk(Some(&identity.kid))?.for_verification(EDDSA))
            }
            _ => Err(JoseError::MissingKeyField("x")),
        }
    }
}

fn generate_key(curve: Curve) -> JoseResult<OkpPrivateKey> {
    let mut seed = Zeroizing::new(vec![0u8; curve.key_len()]);
    getrandom::fill(&mut seed)?;
    OkpPrivateKey::from_raw(&seed)
}

fn sign_with(key: &OkpPrivateKey, input: &[u8]) -> JoseResult<Vec<u8>> {
    match key {
        OkpPrivateKey::Ed25519(key) => Ok(key.sign(input).to_bytes().to_vec()),
        OkpPrivateKey::Ed448(seed) => ed448_private(seed)?
            .sign(input, None)
            .map(|sig| sig.to_vec())
            .map_err(|err| JoseError::signing(format!("{err:?}"))),
    }
}

fn verify_with(key: &OkpPublicKey, input: &[u8], signature: &[u8]) -> JoseResult<()> {
    let verified = match key {
        OkpPublicKey::Ed25519(key) => ed25519_dalek::Signature::from_slice(signature)
            .map(|sig| key.verify(input, &sig).is_ok())
            .unwrap_or(false),
        OkpPublicKey::Ed448(_) if signature.len() != ED448_SIGNATURE_LEN => false,
        OkpPublicKey::Ed448(bytes) => ed448_public(bytes)?
            .verify(input, signature, None)
            .is_ok(),
    };
    if verified {
        Ok(())
    } else {
        Err(JoseError::InvalidSignature)
    }
}

/// EdDSA signature provider.
#[derive(Debug)]
pub struct EddsaProvider {
    default_curve: Curve,
    ed25519: CurveKeys,
    ed448: CurveKeys,
}

impl EddsaProvider {
    /// Fresh keys on both curves, each with a random key ID.
    ///
    /// Returns the public JWKs, default curve first.
    pub fn generate(default_curve: Curve) -> JoseResult<(Self, Vec<Jwk>)> {
        Self::generated(default_curve, None)
    }

    /// [`generate`](Self::generate) with a key URL hint on both curves.
    pub fn generate_with_key_url(
        default_curve: Curve,
        jku: impl Into<String>,
    ) -> JoseResult<(Self, Vec<Jwk>)> {
        Self::generated(default_curve, Some(jku.into()))
    }

    fn generated(default_curve: Curve, jku: Option<String>) -> JoseResult<(Self, Vec<Jwk>)> {
        let default_curve = check_edwards(default_curve)?;
        let settings = |curve: Curve| -> JoseResult<EddsaSettings> {
            let mut identity = KeyIdentity::generate()?;
            identity.jku = jku.clone();
            Ok(EddsaSettings {
                key: generate_key(curve)?,
                identity,
            })
        };
        let provider = Self {
            default_curve,
            ed25519: CurveKeys::signing(settings(Curve::Ed25519)?)?,
            ed448: CurveKeys::signing(settings(Curve::Ed448)?)?,
        };
        tracing::debug!(crv = %default_curve, kid = ?provider.kid(), "generated EdDSA keys");
        let keys = provider.current_keys()?;
        Ok((provider, keys))
    }

    /// Provider signing with one caller-supplied key on `default_curve`.
    pub fn load(settings: EddsaSettings, default_curve: Curve) -> JoseResult<Self> {
        let default_curve = check_edwards(default_curve)?;
        if settings.key.curve() != default_curve {
            return Err(JoseError::key_type_mismatch(
                default_curve.as_str(),
                settings.key.curve().as_str(),
            ));
        }
        let mut provider = Self {
            default_curve,
            ed25519: CurveKeys::none(),
            ed448: CurveKeys::none(),
        };
        *provider.keys_mut(default_curve) = CurveKeys::signing(settings)?;
        Ok(provider)
    }

    /// Provider holding a signing key on each curve.
    pub fn load_pair(
        ed25519: EddsaSettings,
        ed448: EddsaSettings,
        default_curve: Curve,
    ) -> JoseResult<Self> {
        let default_curve = check_edwards(default_curve)?;
        if ed25519.key.curve() != Curve::Ed25519 {
            return Err(JoseError::key_type_mismatch("Ed25519", ed25519.key.curve().as_str()));
        }
        if ed448.key.curve() != Curve::Ed448 {
            return Err(JoseError::key_type_mismatch("Ed448", ed448.key.curve().as_str()));
        }
        Ok(Self {
            default_curve,
            ed25519: CurveKeys::signing(ed25519)?,
            ed448: CurveKeys::signing(ed448)?,
        })
    }

    /// Verify-only provider from a public OKP or `internal` JWK. The key's
    /// curve becomes the default.
    pub fn verifier(public: &Jwk) -> JoseResult<Self> {
        let key: OkpPublicKey = decode_any(public)?;
        let default_curve = key.curve();
        let mut provider = Self {
            default_curve,
            ed25519: CurveKeys::none(),
            ed448: CurveKeys::none(),
        };
        *provider.keys_mut(default_curve) =
            CurveKeys::verifying(key, KeyIdentity::for_jwk(public)?);
        Ok(provider)
    }

    fn keys(&self, curve: Curve) -> &CurveKeys {
        match curve {
            Curve::Ed448 => &self.ed448,
            _ => &self.ed25519,
        }
    }

    fn keys_mut(&mut self, curve: Curve) -> &mut CurveKeys {
        match curve {
            Curve::Ed448 => &mut self.ed448,
            _ => &mut self.ed25519,
        }
    }

    /// Curve used for signing and for tokens without `crv`.
    pub fn default_curve(&self) -> Curve {
        self.default_curve
    }

    /// Own key ID on the default curve.
    pub fn kid(&self) -> Option<&str> {
        self.keys(self.default_curve)
            .identity
            .as_ref()
            .map(|identity| identity.kid.as_str())
    }

    /// Trust another public key; it lands in the store of its curve.
    pub fn add_trusted_key(&self, jwk: &Jwk) -> JoseResult<()> {
        let kid = jwk
            .kid
            .clone()
            .filter(|kid| !kid.is_empty())
            .ok_or(JoseError::MissingKeyField("kid"))?;
        let key: OkpPublicKey = decode_any(jwk)?;
        self.keys(key.curve()).trusted.insert(kid, key)
    }

    /// Forget a trusted key on either curve. Own key IDs are ignored.
    pub fn remove_trusted_key(&self, kid: &str) -> bool {
        let a = self.ed25519.trusted.remove(kid);
        let b = self.ed448.trusted.remove(kid);
        a || b
    }

    /// Own public key on the default curve.
    pub fn current_key(&self) -> JoseResult<Jwk> {
        self.keys(self.default_curve).current_key()
    }

    /// Own public keys on every curve that has one, default curve first.
    pub fn current_keys(&self) -> JoseResult<Vec<Jwk>> {
        let other = match self.default_curve {
            Curve::Ed448 => Curve::Ed25519,
            _ => Curve::Ed448,
        };
        let mut keys = vec![self.current_key()?];
        if self.keys(other).public.is_some() {
            keys.push(self.keys(other).current_key()?);
        }
        Ok(keys)
    }

    /// Own public key on the default curve as raw bytes.
    pub fn current_public_key(&self) -> JoseResult<PublicKey> {
        let keys = self.keys(self.default_curve);
        match (&keys.public, &keys.identity) {
            (Some(public), Some(identity)) => PublicKey::from_key(public, identity.kid.clone()),
            _ => Err(JoseError::MissingKeyField("x")),
        }
    }
}

impl SignatureProvider for EddsaProvider {
    fn alg(&self) -> &str {
        EDDSA
    }

    fn stamp_header(&self, header: &mut Header) {
        match &self.keys(self.default_curve).identity {
            Some(identity) => identity.stamp(EDDSA, header),
            None => header.alg = EDDSA.to_string(),
        }
        header.crv = Some(self.default_curve.as_str().to_string());
    }

    fn sign(&self, signing_input: &[u8]) -> JoseResult<Vec<u8>> {
        let key = self
            .keys(self.default_curve)
            .private
            .as_ref()
            .ok_or(JoseError::MissingPrivateKey)?;
        sign_with(key, signing_input)
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8], header: &Header) -> JoseResult<()> {
        let curve = match header.crv.as_deref() {
            Some(crv) if !crv.is_empty() => check_edwards(Curve::parse(crv)?)?,
            _ => self.default_curve,
        };
        let key = self.keys(curve).trusted.resolve(header.key_id())?;
        verify_with(&key, signing_input, signature)
    }
}
