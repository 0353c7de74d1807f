use super::{b64_encode, Curve, Jwk, JwkKey, KeyType, RawKey};
use crate::error::{JoseError, JoseResult};
use ed25519_dalek::{SigningKey, VerifyingKey};
use zeroize::Zeroizing;

/// Ed25519 public key and seed length.
pub const ED25519_KEY_LEN: usize = 32;
/// Ed448 public key and seed length (RFC 8032).
pub const ED448_KEY_LEN: usize = 57;

/// Edwards curve public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OkpPublicKey {
    /// Ed25519 point
    Ed25519(VerifyingKey),
    /// Ed448 encoded point
    Ed448([u8; ED448_KEY_LEN]),
}

/// Edwards curve private key.
#[derive(Clone)]
pub enum OkpPrivateKey {
    /// Ed25519 seed
    Ed25519(SigningKey),
    /// Ed448 seed
    Ed448(Zeroizing<[u8; ED448_KEY_LEN]>),
}

fn ed448_error(err: impl std::fmt::Debug) -> JoseError {
    JoseError::malformed_key(format!("Ed448: {err:?}"))
}

pub(crate) fn ed448_private(seed: &[u8; ED448_KEY_LEN]) -> JoseResult<ed448_rust::PrivateKey> {
    ed448_rust::PrivateKey::try_from(&seed[..]).map_err(ed448_error)
}

pub(crate) fn ed448_public(bytes: &[u8; ED448_KEY_LEN]) -> JoseResult<ed448_rust::PublicKey> {
    ed448_rust::PublicKey::try_from(&bytes[..]).map_err(ed448_error)
}

fn curve_for_len(len: usize) -> JoseResult<Curve> {
    match len {
        ED25519_KEY_LEN => Ok(Curve::Ed25519),
        ED448_KEY_LEN => Ok(Curve::Ed448),
        // 56-byte public and 144-byte private Ed448 layouts
        56 | 144 => Err(JoseError::NonStandardEd448Key(len)),
        other => Err(JoseError::malformed_key(format!(
            "no OKP curve has {other} byte keys"
        ))),
    }
}

fn okp_curve(jwk: &Jwk, field: &'static str, len: usize) -> JoseResult<Curve> {
    let declared = jwk.curve()?;
    if !matches!(declared, Curve::Ed25519 | Curve::Ed448) {
        return Err(JoseError::UnsupportedCurve(declared.as_str().to_string()));
    }
    if declared == Curve::Ed448 && matches!(len, 56 | 144) {
        return Err(JoseError::NonStandardEd448Key(len));
    }
    if declared.key_len() != len {
        return Err(JoseError::KeyLength {
            field,
            expected: declared.key_len(),
            actual: len,
        });
    }
    curve_for_len(len)
}

impl OkpPublicKey {
    /// Curve of this key.
    pub fn curve(&self) -> Curve {
        match self {
            OkpPublicKey::Ed25519(_) => Curve::Ed25519,
            OkpPublicKey::Ed448(_) => Curve::Ed448,
        }
    }

    /// Encoded point.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            OkpPublicKey::Ed25519(key) => key.as_bytes(),
            OkpPublicKey::Ed448(bytes) => bytes,
        }
    }
}

impl JwkKey for OkpPublicKey {
    fn to_jwk(&self, kid: Option<&str>) -> JoseResult<Jwk> {
        let mut jwk = Jwk::new(KeyType::Okp);
        jwk.crv = Some(self.curve().as_str().to_string());
        jwk.x = Some(b64_encode(self.as_bytes()));
        jwk.kid = kid.map(str::to_string);
        Ok(jwk)
    }

    fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        jwk.expect_type(KeyType::Okp)?;
        let x = Jwk::decode_member(&jwk.x, "x")?;
        okp_curve(jwk, "x", x.len())?;
        Self::from_raw(&x)
    }
}

impl RawKey for OkpPublicKey {
    fn to_raw(&self) -> JoseResult<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }

    fn from_raw(bytes: &[u8]) -> JoseResult<Self> {
        match curve_for_len(bytes.len())? {
            Curve::Ed25519 => {
                let mut point = [0u8; ED25519_KEY_LEN];
                point.copy_from_slice(bytes);
                VerifyingKey::from_bytes(&point)
                    .map(OkpPublicKey::Ed25519)
                    .map_err(JoseError::malformed_key)
            }
            _ => {
                let mut point = [0u8; ED448_KEY_LEN];
                point.copy_from_slice(bytes);
                ed448_public(&point)?;
                Ok(OkpPublicKey::Ed448(point))
            }
        }
    }
}

impl OkpPrivateKey {
    /// Curve of this key.
    pub fn curve(&self) -> Curve {
        match self {
            OkpPrivateKey::Ed25519(_) => Curve::Ed25519,
            OkpPrivateKey::Ed448(_) => Curve::Ed448,
        }
    }

    /// Public half.
    pub fn public_key(&self) -> JoseResult<OkpPublicKey> {
        match self {
            OkpPrivateKey::Ed25519(key) => Ok(OkpPublicKey::Ed25519(key.verifying_key())),
            OkpPrivateKey::Ed448(seed) => {
                let private = ed448_private(seed)?;
                Ok(OkpPublicKey::Ed448(
                    ed448_rust::PublicKey::from(&private).as_byte(),
                ))
            }
        }
    }

    /// Seed bytes.
    pub fn seed(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(match self {
            OkpPrivateKey::Ed25519(key) => key.to_bytes().to_vec(),
            OkpPrivateKey::Ed448(seed) => seed.to_vec(),
        })
    }
}

impl std::fmt::Debug for OkpPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OkpPrivateKey({})", self.curve())
    }
}

impl JwkKey for OkpPrivateKey {
    fn to_jwk(&self, kid: Option<&str>) -> JoseResult<Jwk> {
        let mut jwk = self.public_key()?.to_jwk(kid)?;
        jwk.d = Some(b64_encode(self.seed().as_slice()));
        Ok(jwk)
    }

    fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        jwk.expect_type(KeyType::Okp)?;
        let d = Zeroizing::new(Jwk::decode_member(&jwk.d, "d")?);
        okp_curve(jwk, "d", d.len())?;
        let key = Self::from_raw(&d)?;
        if jwk.x.is_some() && OkpPublicKey::from_jwk(jwk)? != key.public_key()? {
            return Err(JoseError::malformed_key(
                "x does not match the private seed",
            ));
        }
        Ok(key)
    }
}

impl RawKey for OkpPrivateKey {
    fn to_raw(&self) -> JoseResult<Vec<u8>> {
        Ok(self.seed().to_vec())
    }

    fn from_raw(bytes: &[u8]) -> JoseResult<Self> {
        match curve_for_len(bytes.len())? {
            Curve::Ed25519 => {
                let mut seed = Zeroizing::new([0u8; ED25519_KEY_LEN]);
                seed.copy_from_slice(bytes);
                Ok(OkpPrivateKey::Ed25519(SigningKey::from_bytes(&seed)))
            }
            _ => {
                let mut seed = Zeroizing::new([0u8; ED448_KEY_LEN]);
                seed.copy_from_slice(bytes);
                ed448_private(&seed)?;
                Ok(OkpPrivateKey::Ed448(seed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ed25519() -> OkpPrivateKey {
        OkpPrivateKey::from_raw(&[9u8; ED25519_KEY_LEN]).unwrap()
    }

    fn ed448() -> OkpPrivateKey {
        OkpPrivateKey::from_raw(&[7u8; ED448_KEY_LEN]).unwrap()
    }

    #[test]
    fn curve_follows_key_length() {
        assert_eq!(ed25519().curve(), Curve::Ed25519);
        assert_eq!(ed448().curve(), Curve::Ed448);
        assert!(OkpPublicKey::from_raw(&[1u8; 40]).is_err());
    }

    #[test]
    fn public_jwk_round_trip_on_both_curves() {
        for key in [ed25519(), ed448()] {
            let public = key.public_key().unwrap();
            let jwk = public.to_jwk(Some("e")).unwrap();
            assert_eq!(jwk.crv.as_deref(), Some(key.curve().as_str()));
            assert_eq!(OkpPublicKey::from_jwk(&jwk).unwrap(), public);
        }
    }

    #[test]
    fn declared_curve_must_agree_with_length() {
        let mut jwk = ed25519().public_key().unwrap().to_jwk(None).unwrap();
        jwk.crv = Some("Ed448".into());
        assert_eq!(
            OkpPublicKey::from_jwk(&jwk),
            Err(JoseError::KeyLength {
                field: "x",
                expected: ED448_KEY_LEN,
                actual: ED25519_KEY_LEN
            })
        );

        let mut jwk = ed448().to_jwk(None).unwrap();
        jwk.crv = Some("Ed25519".into());
        assert!(matches!(
            OkpPrivateKey::from_jwk(&jwk),
            Err(JoseError::KeyLength { field: "d", .. })
        ));
    }

    #[test]
    fn private_jwk_round_trip_keeps_seed() {
        let key = ed448();
        let decoded = OkpPrivateKey::from_jwk(&key.to_jwk(None).unwrap()).unwrap();
        assert_eq!(decoded.seed(), key.seed());
    }
}
