//! Capabilities the registry dispatches to.

use crate::{
    error::{ClaimError, JoseResult},
    types::Header,
};
use std::sync::Arc;

/// Signing algorithm interface.
///
/// Implementations must be thread-safe; the registry hands the same
/// instance to every encoding and decoding thread.
pub trait SignatureProvider: Send + Sync + 'static {
    /// Header `alg` value.
    fn alg(&self) -> &str;

    /// Write `alg` and this provider's key hints into `header`.
    fn stamp_header(&self, header: &mut Header);

    /// Sign `header_b64 "." payload_b64`.
    fn sign(&self, signing_input: &[u8]) -> JoseResult<Vec<u8>>;

    /// Verify a signature, resolving the key from the header `kid`.
    fn verify(&self, signing_input: &[u8], signature: &[u8], header: &Header) -> JoseResult<()>;
}

impl<T: SignatureProvider + ?Sized> SignatureProvider for Arc<T> {
    fn alg(&self) -> &str {
        (**self).alg()
    }

    fn stamp_header(&self, header: &mut Header) {
        (**self).stamp_header(header)
    }

    fn sign(&self, signing_input: &[u8]) -> JoseResult<Vec<u8>> {
        (**self).sign(signing_input)
    }

    fn verify(&self, signing_input: &[u8], signature: &[u8], header: &Header) -> JoseResult<()> {
        (**self).verify(signing_input, signature, header)
    }
}

/// Claim check run over the payload of every token with a good signature.
pub trait ValidationProvider: Send + Sync + 'static {
    /// Inspect the raw payload.
    fn validate(&self, payload: &[u8]) -> Result<(), ClaimError>;
}
