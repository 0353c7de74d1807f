use super::{b64_encode, pad_to, Curve, Jwk, JwkKey, KeyType, RawKey};
use crate::error::{JoseError, JoseResult};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::DecodePrivateKey;

/// NIST curve public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcPublicKey {
    /// P-256
    P256(p256::PublicKey),
    /// P-384
    P384(p384::PublicKey),
    /// P-521
    P521(p521::PublicKey),
}

/// NIST curve private key.
#[derive(Clone)]
pub enum EcPrivateKey {
    /// P-256
    P256(p256::SecretKey),
    /// P-384
    P384(p384::SecretKey),
    /// P-521
    P521(p521::SecretKey),
}

fn nist_curve(jwk: &Jwk) -> JoseResult<Curve> {
    match jwk.curve()? {
        curve @ (Curve::P256 | Curve::P384 | Curve::P521) => Ok(curve),
        other => Err(JoseError::UnsupportedCurve(other.as_str().to_string())),
    }
}

fn curve_for_width(width: usize) -> JoseResult<Curve> {
    match width {
        32 => Ok(Curve::P256),
        48 => Ok(Curve::P384),
        66 => Ok(Curve::P521),
        other => Err(JoseError::malformed_key(format!(
            "no NIST curve has {other} byte coordinates"
        ))),
    }
}

impl EcPublicKey {
    /// Curve of this key.
    pub fn curve(&self) -> Curve {
        match self {
            EcPublicKey::P256(_) => Curve::P256,
            EcPublicKey::P384(_) => Curve::P384,
            EcPublicKey::P521(_) => Curve::P521,
        }
    }

    /// SEC1 uncompressed point `04 || x || y`.
    pub fn to_sec1(&self) -> Vec<u8> {
        match self {
            EcPublicKey::P256(key) => key.to_encoded_point(false).as_bytes().to_vec(),
            EcPublicKey::P384(key) => key.to_encoded_point(false).as_bytes().to_vec(),
            EcPublicKey::P521(key) => key.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    /// Parse a SEC1 point on `curve`.
    pub fn from_sec1(curve: Curve, bytes: &[u8]) -> JoseResult<Self> {
        match curve {
            Curve::P256 => p256::PublicKey::from_sec1_bytes(bytes)
                .map(EcPublicKey::P256)
                .map_err(JoseError::malformed_key),
            Curve::P384 => p384::PublicKey::from_sec1_bytes(bytes)
                .map(EcPublicKey::P384)
                .map_err(JoseError::malformed_key),
            Curve::P521 => p521::PublicKey::from_sec1_bytes(bytes)
                .map(EcPublicKey::P521)
                .map_err(JoseError::malformed_key),
            other => Err(JoseError::UnsupportedCurve(other.as_str().to_string())),
        }
    }

    /// Affine coordinates, each exactly the curve width.
    fn coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        let width = self.curve().key_len();
        let sec1 = self.to_sec1();
        let (x, y) = sec1[1..].split_at(width);
        (x.to_vec(), y.to_vec())
    }

    fn from_coordinates(curve: Curve, x: &[u8], y: &[u8]) -> JoseResult<Self> {
        let mut sec1 = Vec::with_capacity(1 + x.len() + y.len());
        sec1.push(0x04);
        sec1.extend_from_slice(x);
        sec1.extend_from_slice(y);
        Self::from_sec1(curve, &sec1)
    }
}

impl JwkKey for EcPublicKey {
    fn to_jwk(&self, kid: Option<&str>) -> JoseResult<Jwk> {
        let width = self.curve().key_len();
        let (x, y) = self.coordinates();
        let mut jwk = Jwk::new(KeyType::Ec);
        jwk.crv = Some(self.curve().as_str().to_string());
        jwk.x = Some(b64_encode(pad_to(&x, width)?));
        jwk.y = Some(b64_encode(pad_to(&y, width)?));
        jwk.kid = kid.map(str::to_string);
        Ok(jwk)
    }

    fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        jwk.expect_type(KeyType::Ec)?;
        let curve = nist_curve(jwk)?;
        let width = curve.key_len();
        let x = Jwk::decode_fixed(&jwk.x, "x", width)?;
        let y = Jwk::decode_fixed(&jwk.y, "y", width)?;
        Self::from_coordinates(curve, &x, &y)
    }
}

impl RawKey for EcPublicKey {
    fn to_raw(&self) -> JoseResult<Vec<u8>> {
        Ok(self.to_sec1())
    }

    fn from_raw(bytes: &[u8]) -> JoseResult<Self> {
        if bytes.first() != Some(&0x04) || bytes.len() % 2 == 0 {
            return Err(JoseError::malformed_key(
                "expected an uncompressed SEC1 point",
            ));
        }
        Self::from_sec1(curve_for_width(bytes.len() / 2)?, bytes)
    }
}

impl EcPrivateKey {
    /// Curve of this key.
    pub fn curve(&self) -> Curve {
        match self {
            EcPrivateKey::P256(_) => Curve::P256,
            EcPrivateKey::P384(_) => Curve::P384,
            EcPrivateKey::P521(_) => Curve::P521,
        }
    }

    /// Public half.
    pub fn public_key(&self) -> EcPublicKey {
        match self {
            EcPrivateKey::P256(key) => EcPublicKey::P256(key.public_key()),
            EcPrivateKey::P384(key) => EcPublicKey::P384(key.public_key()),
            EcPrivateKey::P521(key) => EcPublicKey::P521(key.public_key()),
        }
    }

    /// Big-endian scalar, exactly the curve width.
    pub fn scalar_bytes(&self) -> zeroize::Zeroizing<Vec<u8>> {
        zeroize::Zeroizing::new(match self {
            EcPrivateKey::P256(key) => key.to_bytes().to_vec(),
            EcPrivateKey::P384(key) => key.to_bytes().to_vec(),
            EcPrivateKey::P521(key) => key.to_bytes().to_vec(),
        })
    }

    /// Parse a scalar of exactly the curve width.
    pub fn from_scalar(curve: Curve, bytes: &[u8]) -> JoseResult<Self> {
        if bytes.len() != curve.key_len() {
            return Err(JoseError::KeyLength {
                field: "d",
                expected: curve.key_len(),
                actual: bytes.len(),
            });
        }
        match curve {
            Curve::P256 => p256::SecretKey::from_slice(bytes)
                .map(EcPrivateKey::P256)
                .map_err(JoseError::malformed_key),
            Curve::P384 => p384::SecretKey::from_slice(bytes)
                .map(EcPrivateKey::P384)
                .map_err(JoseError::malformed_key),
            Curve::P521 => p521::SecretKey::from_slice(bytes)
                .map(EcPrivateKey::P521)
                .map_err(JoseError::malformed_key),
            other => Err(JoseError::UnsupportedCurve(other.as_str().to_string())),
        }
    }

    /// Parse PKCS#8 DER on any supported curve.
    pub fn from_pkcs8_der(der: &[u8]) -> JoseResult<Self> {
        if let Ok(key) = p256::SecretKey::from_pkcs8_der(der) {
            return Ok(EcPrivateKey::P256(key));
        }
        if let Ok(key) = p384::SecretKey::from_pkcs8_der(der) {
            return Ok(EcPrivateKey::P384(key));
        }
        p521::SecretKey::from_pkcs8_der(der)
            .map(EcPrivateKey::P521)
            .map_err(|_| JoseError::malformed_key("not a PKCS#8 P-256, P-384 or P-521 key"))
    }
}

impl std::fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EcPrivateKey({})", self.curve())
    }
}

impl JwkKey for EcPrivateKey {
    fn to_jwk(&self, kid: Option<&str>) -> JoseResult<Jwk> {
        let mut jwk = self.public_key().to_jwk(kid)?;
        jwk.d = Some(b64_encode(self.scalar_bytes().as_slice()));
        Ok(jwk)
    }

    fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        let public = EcPublicKey::from_jwk(jwk)?;
        let d = zeroize::Zeroizing::new(Jwk::decode_fixed(&jwk.d, "d", public.curve().key_len())?);
        let key = Self::from_scalar(public.curve(), &d)?;
        if key.public_key() != public {
            return Err(JoseError::malformed_key(
                "x and y do not match the private scalar",
            ));
        }
        Ok(key)
    }
}

impl RawKey for EcPrivateKey {
    fn to_raw(&self) -> JoseResult<Vec<u8>> {
        Ok(self.scalar_bytes().to_vec())
    }

    fn from_raw(bytes: &[u8]) -> JoseResult<Self> {
        Self::from_scalar(curve_for_width(bytes.len())?, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn coordinates_are_padded_to_curve_width() {
        let key = EcPrivateKey::P521(p521::SecretKey::random(&mut OsRng));
        let jwk = key.public_key().to_jwk(None).unwrap();
        assert_eq!(
            Jwk::decode_member(&jwk.x, "x").unwrap().len(),
            Curve::P521.key_len()
        );
        assert_eq!(EcPublicKey::from_jwk(&jwk).unwrap(), key.public_key());
    }

    #[test]
    fn unpadded_coordinate_is_rejected() {
        let key = EcPrivateKey::P256(p256::SecretKey::random(&mut OsRng));
        let mut jwk = key.public_key().to_jwk(None).unwrap();
        let x = Jwk::decode_member(&jwk.x, "x").unwrap();
        jwk.x = Some(b64_encode(&x[1..]));
        assert_eq!(
            EcPublicKey::from_jwk(&jwk),
            Err(JoseError::KeyLength {
                field: "x",
                expected: 32,
                actual: 31
            })
        );
    }

    #[test]
    fn mismatched_private_and_public_members_are_rejected() {
        let a = EcPrivateKey::P384(p384::SecretKey::random(&mut OsRng));
        let b = EcPrivateKey::P384(p384::SecretKey::random(&mut OsRng));
        let mut jwk = a.to_jwk(Some("a")).unwrap();
        jwk.d = b.to_jwk(None).unwrap().d;
        assert!(matches!(
            EcPrivateKey::from_jwk(&jwk),
            Err(JoseError::MalformedKey(_))
        ));
    }

    #[test]
    fn raw_point_selects_curve_by_length() {
        let key = EcPrivateKey::P384(p384::SecretKey::random(&mut OsRng));
        let raw = key.public_key().to_raw().unwrap();
        assert_eq!(raw.len(), 97);
        assert_eq!(EcPublicKey::from_raw(&raw).unwrap().curve(), Curve::P384);
    }
}
