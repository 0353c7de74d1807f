//! JWS compact serialization.

use crate::{
    error::{JoseError, JoseResult},
    registry::Registry,
    types::{Header, Token, JWT_TYPE},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Serialize;

impl Registry {
    /// Sign `token` with the active algorithm and serialize it as
    /// `header.payload.signature`.
    ///
    /// The token's header is copied and stamped by the provider; `typ` is
    /// always `JWT`.
    pub fn encode(&self, token: &Token) -> JoseResult<String> {
        let (name, provider) = self.signing_provider()?;

        let mut header = token.header.clone();
        provider.stamp_header(&mut header);
        header.typ = JWT_TYPE.to_string();

        let mut jws = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        jws.push('.');
        URL_SAFE_NO_PAD.encode_string(&token.payload, &mut jws);

        let signature = provider.sign(jws.as_bytes())?;
        if signature.is_empty() {
            return Err(JoseError::signing(format!("{name} produced an empty signature")));
        }
        jws.push('.');
        URL_SAFE_NO_PAD.encode_string(signature, &mut jws);
        Ok(jws)
    }

    /// Serialize `claims` as the payload and [`encode`](Self::encode).
    pub fn encode_claims<T: Serialize + ?Sized>(&self, claims: &T) -> JoseResult<String> {
        self.encode(&Token::from_claims(claims)?)
    }

    /// Parse a compact JWS and run the validation pipeline.
    ///
    /// Structural problems are errors. A token that parses but fails
    /// verification or a claim check is returned with an `Invalid` verdict.
    pub fn decode(&self, jws: impl AsRef<[u8]>) -> JoseResult<Token> {
        let jws = jws.as_ref();
        let sections: Vec<&[u8]> = jws.split(|b| *b == b'.').collect();
        let [header_b64, payload_b64, signature_b64] = sections[..] else {
            return Err(JoseError::SectionCount(sections.len()));
        };

        let header: Header = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_b64)?)?;
        if header.typ != JWT_TYPE {
            return Err(JoseError::NotAJwt(header.typ));
        }
        let payload = URL_SAFE_NO_PAD.decode(payload_b64)?;
        let signature = URL_SAFE_NO_PAD.decode(signature_b64)?;
        if signature.is_empty() {
            return Err(JoseError::EmptySignature);
        }

        let signing_input = &jws[..header_b64.len() + 1 + payload_b64.len()];
        let validity = self.validate(&header, signing_input, &signature, &payload);
        Ok(Token::decoded(header, payload, validity))
    }

    /// [`decode`](Self::decode) and turn an `Invalid` verdict into an error.
    pub fn verify(&self, jws: impl AsRef<[u8]>) -> JoseResult<Token> {
        let token = self.decode(jws)?;
        token.valid()?;
        Ok(token)
    }
}
