use super::{b64_encode, Jwk, JwkKey, KeyType, RawKey};
use crate::error::{JoseError, JoseResult};
use rsa::{
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
    traits::{PrivateKeyParts, PublicKeyParts},
    BigUint, RsaPrivateKey, RsaPublicKey,
};

fn encode_uint(value: &BigUint) -> String {
    b64_encode(value.to_bytes_be())
}

fn decode_uint(value: &Option<String>, name: &'static str) -> JoseResult<BigUint> {
    Ok(BigUint::from_bytes_be(&Jwk::decode_member(value, name)?))
}

impl JwkKey for RsaPublicKey {
    fn to_jwk(&self, kid: Option<&str>) -> JoseResult<Jwk> {
        let mut jwk = Jwk::new(KeyType::Rsa);
        jwk.n = Some(encode_uint(self.n()));
        jwk.e = Some(encode_uint(self.e()));
        jwk.kid = kid.map(str::to_string);
        Ok(jwk)
    }

    fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        jwk.expect_type(KeyType::Rsa)?;
        let n = decode_uint(&jwk.n, "n")?;
        let e = decode_uint(&jwk.e, "e")?;
        RsaPublicKey::new(n, e).map_err(JoseError::malformed_key)
    }
}

impl RawKey for RsaPublicKey {
    fn to_raw(&self) -> JoseResult<Vec<u8>> {
        self.to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(JoseError::malformed_key)
    }

    fn from_raw(bytes: &[u8]) -> JoseResult<Self> {
        RsaPublicKey::from_public_key_der(bytes).map_err(JoseError::malformed_key)
    }
}

impl JwkKey for RsaPrivateKey {
    fn to_jwk(&self, kid: Option<&str>) -> JoseResult<Jwk> {
        let [p, q] = self.primes() else {
            return Err(JoseError::malformed_key(format!(
                "{} prime RSA keys cannot be exported",
                self.primes().len()
            )));
        };
        let missing = || JoseError::malformed_key("CRT values were not precomputed");
        let mut jwk = self.to_public_key().to_jwk(kid)?;
        jwk.d = Some(encode_uint(self.d()));
        jwk.p = Some(encode_uint(p));
        jwk.q = Some(encode_uint(q));
        jwk.dp = Some(encode_uint(self.dp().ok_or_else(missing)?));
        jwk.dq = Some(encode_uint(self.dq().ok_or_else(missing)?));
        jwk.qi = Some(encode_uint(&self.crt_coefficient().ok_or_else(missing)?));
        Ok(jwk)
    }

    fn from_jwk(jwk: &Jwk) -> JoseResult<Self> {
        jwk.expect_type(KeyType::Rsa)?;
        let n = decode_uint(&jwk.n, "n")?;
        let e = decode_uint(&jwk.e, "e")?;
        let d = decode_uint(&jwk.d, "d")?;
        let p = decode_uint(&jwk.p, "p")?;
        let q = decode_uint(&jwk.q, "q")?;

        let mut key = RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(JoseError::malformed_key)?;
        key.validate().map_err(JoseError::malformed_key)?;
        key.precompute().map_err(JoseError::malformed_key)?;

        let crt_mismatch =
            |name: &str| JoseError::malformed_key(format!("{name} does not match p, q and d"));
        if jwk.dp.is_some() && key.dp() != Some(&decode_uint(&jwk.dp, "dp")?) {
            return Err(crt_mismatch("dp"));
        }
        if jwk.dq.is_some() && key.dq() != Some(&decode_uint(&jwk.dq, "dq")?) {
            return Err(crt_mismatch("dq"));
        }
        if jwk.qi.is_some() && key.crt_coefficient() != Some(decode_uint(&jwk.qi, "qi")?) {
            return Err(crt_mismatch("qi"));
        }
        Ok(key)
    }
}

impl RawKey for RsaPrivateKey {
    fn to_raw(&self) -> JoseResult<Vec<u8>> {
        self.to_pkcs8_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(JoseError::malformed_key)
    }

    fn from_raw(bytes: &[u8]) -> JoseResult<Self> {
        RsaPrivateKey::from_pkcs8_der(bytes).map_err(JoseError::malformed_key)
    }
}
