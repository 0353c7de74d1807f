//! Validation pipeline run by decode: signature first, then every claim
//! validator in name order, stopping at the first failure.

use crate::{
    error::{JoseError, JoseResult},
    registry::Registry,
    types::{Header, Validity},
};

impl Registry {
    /// Resolve the provider named by the header `alg` and verify.
    ///
    /// Key ID resolution happens inside the provider.
    pub fn verify_signature(
        &self,
        header: &Header,
        signing_input: &[u8],
        signature: &[u8],
    ) -> JoseResult<()> {
        let provider = self
            .signature_provider(&header.alg)
            .ok_or_else(|| JoseError::UnsupportedAlgorithm(header.alg.clone()))?;
        provider.verify(signing_input, signature, header)
    }

    /// Run every registered claim validator over `payload`.
    pub fn validate_claims(&self, payload: &[u8]) -> JoseResult<()> {
        for (name, provider) in self.validation_providers() {
            provider
                .validate(payload)
                .map_err(|source| JoseError::ClaimRejected {
                    validator: name,
                    source,
                })?;
        }
        Ok(())
    }

    pub(crate) fn validate(
        &self,
        header: &Header,
        signing_input: &[u8],
        signature: &[u8],
        payload: &[u8],
    ) -> Validity {
        let verdict = self
            .verify_signature(header, signing_input, signature)
            .and_then(|()| self.validate_claims(payload));
        match verdict {
            Ok(()) => Validity::Valid,
            Err(err) => {
                tracing::debug!(alg = %header.alg, kid = ?header.kid, reason = %err, "token rejected");
                Validity::Invalid(err)
            }
        }
    }
}
