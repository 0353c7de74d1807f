//! Key ID resolution, trusted keys and verify-only providers.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cryypt_jose::{
    EcdsaAlgorithm, EcdsaProvider, EddsaProvider, Curve, HmacAlgorithm, HmacProvider, JoseError,
    PssAlgorithm, PssProvider, Registry, RsaSettings, SignatureProvider, Token, Validity,
};

fn registry_with<P: SignatureProvider>(name: &str, provider: P) -> Registry {
    let registry = Registry::new();
    registry.add_signature_provider(name, provider).unwrap();
    registry.set_signing_algorithm(name).unwrap();
    registry
}

/// Hand-built JWS so the header can omit or blank out `kid`.
fn sign_with_header<P: SignatureProvider>(provider: &P, header_json: &str) -> String {
    let input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(b"{}")
    );
    let signature = provider.sign(input.as_bytes()).unwrap();
    format!("{input}.{}", URL_SAFE_NO_PAD.encode(signature))
}

#[test]
fn test_missing_or_empty_kid_uses_the_default_key() {
    let (provider, _) = HmacProvider::generate(HmacAlgorithm::Hs256).unwrap();
    let no_kid = sign_with_header(&provider, r#"{"typ":"JWT","alg":"HS256"}"#);
    let empty_kid = sign_with_header(&provider, r#"{"typ":"JWT","alg":"HS256","kid":""}"#);

    let registry = registry_with("HS256", provider);
    assert!(registry.decode(no_kid).unwrap().is_valid());
    assert!(registry.decode(empty_kid).unwrap().is_valid());
}

#[test]
fn test_unknown_kid_never_falls_back() {
    let (provider, _) = HmacProvider::generate(HmacAlgorithm::Hs256).unwrap();
    let jws = sign_with_header(&provider, r#"{"typ":"JWT","alg":"HS256","kid":"stranger"}"#);

    let registry = registry_with("HS256", provider);
    let token = registry.decode(jws).unwrap();
    assert_eq!(
        token.validity(),
        &Validity::Invalid(JoseError::UnknownKeyId("stranger".into()))
    );
}

#[test]
fn test_shared_secret_verifies_across_providers() {
    let (issuer, secret) = HmacProvider::generate(HmacAlgorithm::Hs512).unwrap();
    let issuer_kid = issuer.kid().to_string();
    let issuer = registry_with("HS512", issuer);
    let jws = issuer.encode(&Token::new(b"{}".to_vec())).unwrap();

    let (verifier, _) = HmacProvider::generate(HmacAlgorithm::Hs512).unwrap();
    verifier.add_trusted_key(secret.expose()).unwrap();
    assert_eq!(
        verifier.add_trusted_key(secret.expose()),
        Err(JoseError::DuplicateKeyId(issuer_kid.clone()))
    );
    let own_kid = verifier.kid().to_string();
    let verifier = std::sync::Arc::new(verifier);

    let registry = Registry::new();
    registry
        .add_signature_provider("HS512", std::sync::Arc::clone(&verifier))
        .unwrap();
    assert!(registry.decode(&jws).unwrap().is_valid());

    assert!(verifier.remove_trusted_key(&issuer_kid));
    assert_eq!(
        registry.decode(&jws).unwrap().validity(),
        &Validity::Invalid(JoseError::UnknownKeyId(issuer_kid))
    );

    // own key stays
    assert!(!verifier.remove_trusted_key(&own_kid));
    registry.set_signing_algorithm("HS512").unwrap();
    let own = registry.encode(&Token::new(b"{}".to_vec())).unwrap();
    assert!(registry.decode(own).unwrap().is_valid());
}

#[test]
fn test_trusted_key_needs_a_kid() {
    let (_, secret) = HmacProvider::generate(HmacAlgorithm::Hs256).unwrap();
    let mut jwk = secret.into_exposed();
    jwk.kid = None;
    let (provider, _) = HmacProvider::generate(HmacAlgorithm::Hs256).unwrap();
    assert_eq!(
        provider.add_trusted_key(&jwk),
        Err(JoseError::MissingKeyField("kid"))
    );
}

#[test]
fn test_verify_only_ecdsa_provider() {
    let (signer, public) = EcdsaProvider::generate(EcdsaAlgorithm::Es384).unwrap();
    assert!(!public.is_private());
    let jws = registry_with("ES384", signer)
        .encode(&Token::new(b"{}".to_vec()))
        .unwrap();

    let verifier = EcdsaProvider::verifier(&public, EcdsaAlgorithm::Es384).unwrap();
    assert_eq!(verifier.sign(b"x"), Err(JoseError::MissingPrivateKey));

    let registry = Registry::new();
    registry.add_signature_provider("ES384", verifier).unwrap();
    assert!(registry.decode(&jws).unwrap().is_valid());
}

#[test]
fn test_ecdsa_trusted_key_must_match_curve() {
    let (provider, _) = EcdsaProvider::generate(EcdsaAlgorithm::Es256).unwrap();
    let (_, other_curve) = EcdsaProvider::generate(EcdsaAlgorithm::Es384).unwrap();
    assert!(matches!(
        provider.add_trusted_key(&other_curve),
        Err(JoseError::KeyTypeMismatch { .. })
    ));
}

#[test]
fn test_eddsa_trusted_key_lands_on_its_curve() {
    let (signer, public) = EddsaProvider::generate(Curve::Ed448).unwrap();
    let jws = registry_with("EdDSA", signer)
        .encode(&Token::new(b"{}".to_vec()))
        .unwrap();

    // default curve is Ed25519, the token says Ed448
    let (verifier, _) = EddsaProvider::generate(Curve::Ed25519).unwrap();
    verifier.add_trusted_key(&public[0]).unwrap();
    let registry = Registry::new();
    registry.add_signature_provider("EdDSA", verifier).unwrap();
    assert!(registry.decode(&jws).unwrap().is_valid());
}

#[test]
fn test_pss384_second_provider_does_not_know_the_first_kid() {
    let (first, _) = PssProvider::generate(PssAlgorithm::Ps384).unwrap();
    let first_kid = first.kid().to_string();
    let registry = registry_with("PS384", first);

    let jws = registry.encode_claims(&serde_json::json!({ "test": 1 })).unwrap();
    let token = registry.decode(&jws).unwrap();
    assert_eq!(token.validity(), &Validity::Valid);

    let other_key = rsa::RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).unwrap();
    let second = PssProvider::load(RsaSettings::new(other_key, "second"), PssAlgorithm::Ps384)
        .unwrap();
    registry.add_signature_provider("PS384-second", second).unwrap();

    let second = registry.signature_provider("PS384-second").unwrap();
    let (input, signature) = jws.rsplit_once('.').unwrap();
    let signature = URL_SAFE_NO_PAD.decode(signature).unwrap();
    assert_eq!(
        second.verify(input.as_bytes(), &signature, &token.header),
        Err(JoseError::UnknownKeyId(first_kid))
    );
}
