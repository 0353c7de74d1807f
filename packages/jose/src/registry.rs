//! Algorithm registry.
//!
//! Maps algorithm names to signature providers, names to claim validators,
//! and holds the algorithm used for encoding. Reads never hold a map lock
//! while provider code runs: the `Arc` is cloned out first.

use crate::{
    error::{JoseError, JoseResult},
    traits::{SignatureProvider, ValidationProvider},
};
use arc_swap::ArcSwapOption;
use dashmap::{mapref::entry::Entry, DashMap};
use once_cell::sync::Lazy;
use std::{fmt, sync::Arc};

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// Signature and validation providers plus the active signing algorithm.
///
/// # Example
///
/// ```no_run
/// use cryypt_jose::{HmacAlgorithm, HmacProvider, Registry, Token};
///
/// # fn main() -> cryypt_jose::JoseResult<()> {
/// let registry = Registry::new();
/// let (provider, _secret) = HmacProvider::generate(HmacAlgorithm::Hs256)?;
/// registry.add_signature_provider("HS256", provider)?;
/// registry.set_signing_algorithm("HS256")?;
///
/// let jws = registry.encode(&Token::new(br#"{"sub":"alice"}"#.to_vec()))?;
/// let token = registry.decode(&jws)?;
/// assert!(token.is_valid());
/// # Ok(())
/// # }
/// ```
pub struct Registry {
    signature_providers: DashMap<String, Arc<dyn SignatureProvider>>,
    validation_providers: DashMap<String, Arc<dyn ValidationProvider>>,
    signing_algorithm: ArcSwapOption<String>,
}

impl Registry {
    /// Empty registry with no active algorithm.
    pub fn new() -> Self {
        Self {
            signature_providers: DashMap::new(),
            validation_providers: DashMap::new(),
            signing_algorithm: ArcSwapOption::empty(),
        }
    }

    /// Process-wide registry, created on first use.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Register a provider under a new name.
    pub fn add_signature_provider<P: SignatureProvider>(
        &self,
        name: impl Into<String>,
        provider: P,
    ) -> JoseResult<()> {
        match self.signature_providers.entry(name.into()) {
            Entry::Occupied(entry) => {
                tracing::warn!(name = %entry.key(), "rejected duplicate signature provider");
                Err(JoseError::DuplicateAlgorithm(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                tracing::debug!(name = %entry.key(), alg = provider.alg(), "signature provider added");
                entry.insert(Arc::new(provider));
                Ok(())
            }
        }
    }

    /// Register or replace a provider.
    pub fn set_signature_provider<P: SignatureProvider>(&self, name: impl Into<String>, provider: P) {
        let name = name.into();
        tracing::debug!(%name, alg = provider.alg(), "signature provider set");
        self.signature_providers.insert(name, Arc::new(provider));
    }

    /// Unregister a provider. Returns whether one was registered.
    ///
    /// Removing the active algorithm leaves it selected; encoding then fails
    /// with [`JoseError::AlgorithmNotRegistered`].
    pub fn remove_signature_provider(&self, name: &str) -> bool {
        let removed = self.signature_providers.remove(name).is_some();
        if removed {
            tracing::debug!(name, "signature provider removed");
        }
        removed
    }

    /// Provider registered under `name`.
    pub fn signature_provider(&self, name: &str) -> Option<Arc<dyn SignatureProvider>> {
        self.signature_providers
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Select the algorithm used by subsequent encodes.
    pub fn set_signing_algorithm(&self, name: &str) -> JoseResult<()> {
        if !self.signature_providers.contains_key(name) {
            return Err(JoseError::AlgorithmNotRegistered(name.to_string()));
        }
        self.signing_algorithm.store(Some(Arc::new(name.to_string())));
        tracing::debug!(name, "signing algorithm selected");
        Ok(())
    }

    /// Currently selected signing algorithm.
    pub fn signing_algorithm(&self) -> Option<String> {
        self.signing_algorithm
            .load_full()
            .map(|name| name.as_ref().clone())
    }

    /// Active algorithm name and its provider.
    pub(crate) fn signing_provider(&self) -> JoseResult<(String, Arc<dyn SignatureProvider>)> {
        let name = self
            .signing_algorithm
            .load_full()
            .ok_or(JoseError::NoDefaultAlgorithm)?;
        let provider = self
            .signature_provider(&name)
            .ok_or_else(|| JoseError::AlgorithmNotRegistered(name.as_ref().clone()))?;
        Ok((name.as_ref().clone(), provider))
    }

    /// Register a claim validator under a new name.
    pub fn add_validation_provider<V: ValidationProvider>(
        &self,
        name: impl Into<String>,
        provider: V,
    ) -> JoseResult<()> {
        match self.validation_providers.entry(name.into()) {
            Entry::Occupied(entry) => {
                tracing::warn!(name = %entry.key(), "rejected duplicate validation provider");
                Err(JoseError::DuplicateValidator(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                tracing::debug!(name = %entry.key(), "validation provider added");
                entry.insert(Arc::new(provider));
                Ok(())
            }
        }
    }

    /// Register or replace a claim validator.
    pub fn set_validation_provider<V: ValidationProvider>(
        &self,
        name: impl Into<String>,
        provider: V,
    ) {
        let name = name.into();
        tracing::debug!(%name, "validation provider set");
        self.validation_providers.insert(name, Arc::new(provider));
    }

    /// Unregister a claim validator. Returns whether one was registered.
    pub fn remove_validation_provider(&self, name: &str) -> bool {
        let removed = self.validation_providers.remove(name).is_some();
        if removed {
            tracing::debug!(name, "validation provider removed");
        }
        removed
    }

    /// Names of the registered claim validators, sorted.
    pub fn validation_provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .validation_providers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Snapshot of the claim validators, sorted by name.
    pub(crate) fn validation_providers(&self) -> Vec<(String, Arc<dyn ValidationProvider>)> {
        let mut providers: Vec<_> = self
            .validation_providers
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        providers.sort_by(|a, b| a.0.cmp(&b.0));
        providers
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut algorithms: Vec<String> = self
            .signature_providers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        algorithms.sort();
        f.debug_struct("Registry")
            .field("signature_providers", &algorithms)
            .field("validation_providers", &self.validation_provider_names())
            .field("signing_algorithm", &self.signing_algorithm())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ClaimError, types::Header};

    struct Fixed(&'static str);

    impl SignatureProvider for Fixed {
        fn alg(&self) -> &str {
            self.0
        }
        fn stamp_header(&self, header: &mut Header) {
            header.alg = self.0.to_string();
        }
        fn sign(&self, _: &[u8]) -> JoseResult<Vec<u8>> {
            Ok(vec![1])
        }
        fn verify(&self, _: &[u8], _: &[u8], _: &Header) -> JoseResult<()> {
            Ok(())
        }
    }

    struct Pass;

    impl ValidationProvider for Pass {
        fn validate(&self, _: &[u8]) -> Result<(), ClaimError> {
            Ok(())
        }
    }

    #[test]
    fn add_rejects_duplicates_set_replaces() {
        let registry = Registry::new();
        registry.add_signature_provider("A", Fixed("A")).unwrap();
        assert_eq!(
            registry.add_signature_provider("A", Fixed("B")),
            Err(JoseError::DuplicateAlgorithm("A".into()))
        );
        registry.set_signature_provider("A", Fixed("B"));
        assert_eq!(registry.signature_provider("A").unwrap().alg(), "B");
    }

    #[test]
    fn signing_algorithm_must_be_registered() {
        let registry = Registry::new();
        assert!(matches!(
            registry.signing_provider(),
            Err(JoseError::NoDefaultAlgorithm)
        ));
        assert_eq!(
            registry.set_signing_algorithm("A"),
            Err(JoseError::AlgorithmNotRegistered("A".into()))
        );
        registry.add_signature_provider("A", Fixed("A")).unwrap();
        registry.set_signing_algorithm("A").unwrap();
        assert_eq!(registry.signing_algorithm().as_deref(), Some("A"));

        assert!(registry.remove_signature_provider("A"));
        assert!(matches!(
            registry.signing_provider(),
            Err(JoseError::AlgorithmNotRegistered(name)) if name == "A"
        ));
    }

    #[test]
    fn validation_providers_are_named() {
        let registry = Registry::new();
        registry.add_validation_provider("b", Pass).unwrap();
        registry.add_validation_provider("a", Pass).unwrap();
        assert_eq!(
            registry.add_validation_provider("a", Pass),
            Err(JoseError::DuplicateValidator("a".into()))
        );
        assert_eq!(registry.validation_provider_names(), vec!["a", "b"]);
        assert!(registry.remove_validation_provider("a"));
        assert!(!registry.remove_validation_provider("a"));
    }

    #[test]
    fn concurrent_adds_register_exactly_once() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.add_signature_provider("A", Fixed("A")).is_ok())
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(wins, 1);
    }
}
