//! JOSE signing for Rust: JWS compact tokens, JWK conversion and JWT claim
//! validation.
//!
//! - HS, RS, PS, ES and EdDSA (Ed25519 and Ed448) signature providers
//! - Per-provider trust stores keyed by `kid`
//! - A registry that selects the signing algorithm and runs claim validators
//!   over every decoded token
//!
//! ```no_run
//! use cryypt_jose::{
//!     Claims, EcdsaAlgorithm, EcdsaProvider, Registry, ValidationOptions,
//! };
//! use chrono::Duration;
//!
//! # fn main() -> cryypt_jose::JoseResult<()> {
//! let registry = Registry::new();
//! let (provider, _public_jwk) = EcdsaProvider::generate(EcdsaAlgorithm::Es256)?;
//! registry.add_signature_provider("ES256", provider)?;
//! registry.set_signing_algorithm("ES256")?;
//! ValidationOptions::default().install(&registry)?;
//!
//! let claims = Claims::new().subject("alice").expires_in(Duration::minutes(5));
//! let jws = registry.encode_claims(&claims)?;
//! let token = registry.verify(&jws)?;
//! assert_eq!(token.claims::<Claims>()?.sub.as_deref(), Some("alice"));
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod claims;
mod codec;
pub mod compact;
mod config;
mod error;
mod futures;
pub mod jwk;
mod registry;
mod traits;
mod types;
mod validation;

pub use algorithms::{
    new_key_id, EcdsaAlgorithm, EcdsaProvider, EcdsaSettings, EddsaProvider, EddsaSettings,
    HmacAlgorithm, HmacProvider, HmacSettings, KeyIdentity, PssAlgorithm, PssProvider,
    RevealedSecret, RsaAlgorithm, RsaProvider, RsaSettings, EDDSA, MIN_RSA_BITS,
};
pub use claims::{
    Audience, AudienceValidator, Claims, ExpiresValidator, IssuedAtValidator, IssuerMode,
    IssuerValidator, NotBeforeValidator, TokenIdValidator,
};
pub use config::ValidationOptions;
pub use error::{ClaimError, ErrorCategory, JoseError, JoseResult};
pub use futures::KeyGenerationFuture;
pub use jwk::{Curve, Jwk, KeyType};
pub use registry::Registry;
pub use traits::{SignatureProvider, ValidationProvider};
pub use types::{Header, Token, Validity, JWT_TYPE};
