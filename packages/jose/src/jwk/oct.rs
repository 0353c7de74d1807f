use super::{b64_encode, Jwk, JwkKey, KeyType, RawKey};
use crate::error::JoseResult;
use std::fmt;
use zeroize::Zeroizing;

/// Symmetric secret, zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey(Zeroizing<Vec<u8>>);

impl SymmetricKey {
    /// Wrap secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    /// Secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Secret length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey({} bytes)", self.0.len())
    }
}

impl JwkKey for SymmetricKey {
    fn to_jwk(&self, kid: Option<&str>) -> JoseResult<Jwk> {
        let mut jwk = Jwk::new(KeyType::Oct);
        jwk.k = Some(b64_encode(self.as_bytes()));
        jwk.kid = kid.map(str::to_string);
        Ok(jwk)
    }

    fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        jwk.expect_type(KeyType::Oct)?;
        Ok(Self::new(Jwk::decode_member(&jwk.k, "k")?))
    }
}

impl RawKey for SymmetricKey {
    fn to_raw(&self) -> JoseResult<Vec<u8>> {
        Ok(self.0.to_vec())
    }

    fn from_raw(bytes: &[u8]) -> JoseResult<Self> {
        Ok(Self::new(bytes))
    }
}
