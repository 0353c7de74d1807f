use super::{b64_encode, Jwk, KeyType, RawKey};
use crate::error::{JoseError, JoseResult};

/// A verification key in its native byte encoding, bound to a key ID.
///
/// Wrapped in a JWK it travels as `kty: "internal"` with the bytes in `k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Native encoding, see [`RawKey`].
    pub key: Vec<u8>,
    /// Key ID.
    pub kid: String,
}

impl PublicKey {
    /// Encode `key` natively under `kid`.
    pub fn from_key<K: RawKey>(key: &K, kid: impl Into<String>) -> JoseResult<Self> {
        Ok(Self {
            key: key.to_raw()?,
            kid: kid.into(),
        })
    }

    /// Decode the bytes as `K`.
    pub fn decode<K: RawKey>(&self) -> JoseResult<K> {
        K::from_raw(&self.key)
    }

    /// `internal` JWK form.
    pub fn to_jwk(&self) -> Jwk {
        let mut jwk = Jwk::new(KeyType::Internal);
        jwk.k = Some(b64_encode(&self.key));
        jwk.kid = Some(self.kid.clone());
        jwk
    }

    /// Parse an `internal` JWK.
    pub fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        jwk.expect_type(KeyType::Internal)?;
        Ok(Self {
            key: Jwk::decode_member(&jwk.k, "k")?,
            kid: jwk.kid.clone().ok_or(JoseError::MissingKeyField("kid"))?,
        })
    }
}
