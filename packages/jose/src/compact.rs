//! Text form of a [`Token`] through the global registry.
//!
//! `FromStr` decodes with [`Registry::global`]. The `serialize` and
//! `deserialize` functions plug a token field into serde:
//!
//! ```no_run
//! use cryypt_jose::Token;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Session {
//!     #[serde(with = "cryypt_jose::compact")]
//!     token: Token,
//! }
//! ```
//!
//! Serializing signs with the global active algorithm. Deserializing runs
//! the global validation pipeline and keeps the verdict on the token, so a
//! rejected token still deserializes and reports `Invalid`.

use crate::{
    error::{JoseError, JoseResult},
    registry::Registry,
    types::Token,
};
use serde::{de, ser, Deserialize, Deserializer, Serializer};
use std::str::FromStr;

impl FromStr for Token {
    type Err = JoseError;

    fn from_str(jws: &str) -> Result<Self, Self::Err> {
        Registry::global().decode(jws)
    }
}

impl Token {
    /// Encode with [`Registry::global`].
    pub fn to_compact(&self) -> JoseResult<String> {
        Registry::global().encode(self)
    }
}

/// Serialize `token` as a compact JWS signed by the global registry.
pub fn serialize<S: Serializer>(token: &Token, serializer: S) -> Result<S::Ok, S::Error> {
    let jws = token.to_compact().map_err(ser::Error::custom)?;
    serializer.serialize_str(&jws)
}

/// Decode a compact JWS string with the global registry.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Token, D::Error> {
    let jws = String::deserialize(deserializer)?;
    jws.parse().map_err(de::Error::custom)
}
