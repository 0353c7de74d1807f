//! Per-provider map from key ID to verification key.

use crate::{
    error::{JoseError, JoseResult},
    jwk::{decode_any, Jwk, JwkKey, RawKey},
};
use dashmap::{mapref::entry::Entry, DashMap};

/// Verification keys addressed by `kid`.
///
/// The signing kid names the provider's own key; removing it is a no-op.
/// The default kid is resolved for tokens that carry no `kid`. An unknown
/// `kid` never falls back to the default.
#[derive(Debug)]
pub(crate) struct TrustStore<K> {
    keys: DashMap<String, K>,
    signing_kid: Option<String>,
    default_kid: Option<String>,
}

impl<K: Clone> TrustStore<K> {
    /// Store holding the provider's own key, which is also the default.
    pub(crate) fn with_own_key(kid: &str, key: K) -> Self {
        let keys = DashMap::new();
        keys.insert(kid.to_string(), key);
        Self {
            keys,
            signing_kid: Some(kid.to_string()),
            default_kid: Some(kid.to_string()),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            keys: DashMap::new(),
            signing_kid: None,
            default_kid: None,
        }
    }

    /// Insert unless `kid` is already present.
    pub(crate) fn insert(&self, kid: String, key: K) -> JoseResult<()> {
        match self.keys.entry(kid) {
            Entry::Occupied(entry) => {
                tracing::warn!(kid = %entry.key(), "rejected duplicate trusted key");
                Err(JoseError::DuplicateKeyId(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                tracing::debug!(kid = %entry.key(), "trusted key added");
                entry.insert(key);
                Ok(())
            }
        }
    }

    /// Remove `kid`. Returns whether a key was removed.
    pub(crate) fn remove(&self, kid: &str) -> bool {
        if self.signing_kid.as_deref() == Some(kid) {
            tracing::warn!(kid, "ignored removal of the signing key");
            return false;
        }
        let removed = self.keys.remove(kid).is_some();
        if removed {
            tracing::debug!(kid, "trusted key removed");
        }
        removed
    }

    /// Key for `kid`, or the default key when `kid` is absent.
    pub(crate) fn resolve(&self, kid: Option<&str>) -> JoseResult<K> {
        let kid = match kid.filter(|kid| !kid.is_empty()) {
            Some(kid) => kid,
            None => self
                .default_kid
                .as_deref()
                .ok_or_else(|| JoseError::UnknownKeyId(String::new()))?,
        };
        self.keys
            .get(kid)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| JoseError::UnknownKeyId(kid.to_string()))
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }
}

impl<K: Clone + JwkKey + RawKey> TrustStore<K> {
    /// Decode a standard or `internal` JWK, run `accept` on the key and
    /// insert it under the JWK's `kid`.
    pub(crate) fn add_jwk(
        &self,
        jwk: &Jwk,
        accept: impl FnOnce(&K) -> JoseResult<()>,
    ) -> JoseResult<()> {
        let kid = jwk
            .kid
            .clone()
            .filter(|kid| !kid.is_empty())
            .ok_or(JoseError::MissingKeyField("kid"))?;
        let key = decode_any::<K>(jwk)?;
        accept(&key)?;
        self.insert(kid, key)
    }
}
