//! Encode/decode across every algorithm family, plus tamper detection.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cryypt_jose::{
    Curve, EcdsaAlgorithm, EcdsaProvider, EddsaProvider, HmacAlgorithm, HmacProvider, JoseError,
    PssAlgorithm, PssProvider, Registry, RsaAlgorithm, RsaProvider, RsaSettings,
    SignatureProvider, Token, Validity,
};
use once_cell::sync::Lazy;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

static RSA_KEY: Lazy<rsa::RsaPrivateKey> = Lazy::new(|| {
    rsa::RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).expect("rsa key generation")
});

fn registry_with<P: SignatureProvider>(name: &str, provider: P) -> Registry {
    let registry = Registry::new();
    registry.add_signature_provider(name, provider).unwrap();
    registry.set_signing_algorithm(name).unwrap();
    registry
}

fn assert_round_trip(registry: &Registry, expected_alg: &str) {
    let payload = br#"{"sub":"alice","admin":true}"#.to_vec();
    let jws = registry.encode(&Token::new(payload.clone())).unwrap();
    assert_eq!(jws.split('.').count(), 3);

    let token = registry.decode(&jws).unwrap();
    assert_eq!(token.validity(), &Validity::Valid, "{expected_alg}");
    assert_eq!(token.header.alg, expected_alg);
    assert_eq!(token.header.typ, "JWT");
    assert!(token.header.kid.is_some());
    assert_eq!(token.payload, payload);
}

#[test]
fn test_hmac_round_trip() {
    for algorithm in [HmacAlgorithm::Hs256, HmacAlgorithm::Hs384, HmacAlgorithm::Hs512] {
        let (provider, _secret) = HmacProvider::generate(algorithm).unwrap();
        assert_round_trip(&registry_with(algorithm.name(), provider), algorithm.name());
    }
}

#[test]
fn test_rsa_round_trip() {
    for algorithm in [RsaAlgorithm::Rs256, RsaAlgorithm::Rs384, RsaAlgorithm::Rs512] {
        let settings = RsaSettings::new(RSA_KEY.clone(), "rsa-1");
        let provider = RsaProvider::load(settings, algorithm).unwrap();
        assert_round_trip(&registry_with(algorithm.name(), provider), algorithm.name());
    }
}

#[test]
fn test_pss_round_trip() {
    for algorithm in [PssAlgorithm::Ps256, PssAlgorithm::Ps384, PssAlgorithm::Ps512] {
        let settings = RsaSettings::new(RSA_KEY.clone(), "pss-1");
        let provider = PssProvider::load(settings, algorithm).unwrap();
        assert_round_trip(&registry_with(algorithm.name(), provider), algorithm.name());
    }
}

#[test]
fn test_ecdsa_round_trip() {
    for algorithm in [EcdsaAlgorithm::Es256, EcdsaAlgorithm::Es384, EcdsaAlgorithm::Es512] {
        let (provider, public) = EcdsaProvider::generate(algorithm).unwrap();
        assert_eq!(public.alg.as_deref(), Some(algorithm.name()));
        assert_round_trip(&registry_with(algorithm.name(), provider), algorithm.name());
    }
}

#[test]
fn test_ecdsa_signature_widths() {
    for (algorithm, width) in [
        (EcdsaAlgorithm::Es256, 64),
        (EcdsaAlgorithm::Es384, 96),
        (EcdsaAlgorithm::Es512, 132),
    ] {
        let (provider, _) = EcdsaProvider::generate(algorithm).unwrap();
        assert_eq!(provider.sign(b"input").unwrap().len(), width);
    }
}

#[test]
fn test_eddsa_round_trip_on_both_curves() {
    for curve in [Curve::Ed25519, Curve::Ed448] {
        let (provider, public) = EddsaProvider::generate(curve).unwrap();
        assert_eq!(public.len(), 2);
        assert_eq!(public[0].crv.as_deref(), Some(curve.as_str()));

        let registry = registry_with("EdDSA", provider);
        let jws = registry.encode(&Token::new(b"{}".to_vec())).unwrap();
        let token = registry.decode(&jws).unwrap();
        assert!(token.is_valid());
        assert_eq!(token.header.crv.as_deref(), Some(curve.as_str()));
    }
}

#[test]
fn test_signature_lengths_for_eddsa() {
    let (ed25519, _) = EddsaProvider::generate(Curve::Ed25519).unwrap();
    let (ed448, _) = EddsaProvider::generate(Curve::Ed448).unwrap();
    assert_eq!(ed25519.sign(b"input").unwrap().len(), 64);
    assert_eq!(ed448.sign(b"input").unwrap().len(), 114);
}

#[test]
fn test_key_url_is_stamped() {
    let (provider, _) =
        EcdsaProvider::generate_with_key_url(EcdsaAlgorithm::Es256, "https://keys.example/jwks")
            .unwrap();
    let registry = registry_with("ES256", provider);
    let jws = registry.encode(&Token::new(b"{}".to_vec())).unwrap();
    let token = registry.decode(&jws).unwrap();
    assert_eq!(token.header.jku.as_deref(), Some("https://keys.example/jwks"));
}

#[test]
fn test_unknown_algorithm_is_invalid() {
    let (provider, _) = HmacProvider::generate(HmacAlgorithm::Hs256).unwrap();
    let signer = registry_with("HS256", provider);
    let jws = signer.encode(&Token::new(b"{}".to_vec())).unwrap();

    let empty = Registry::new();
    let token = empty.decode(&jws).unwrap();
    assert_eq!(
        token.validity(),
        &Validity::Invalid(JoseError::UnsupportedAlgorithm("HS256".into()))
    );
}

#[derive(Debug, Serialize, Deserialize)]
struct Session {
    user: String,
    #[serde(with = "cryypt_jose::compact")]
    token: Token,
}

/// The only test in this binary that touches the global registry.
#[test]
fn test_text_form_through_global_registry() {
    let (provider, _) = HmacProvider::generate(HmacAlgorithm::Hs256).unwrap();
    let global = Registry::global();
    global.add_signature_provider("HS256", provider).unwrap();
    global.set_signing_algorithm("HS256").unwrap();

    let payload = br#"{"sub":"alice"}"#.to_vec();
    let jws = Token::new(payload.clone()).to_compact().unwrap();
    let parsed: Token = jws.parse().unwrap();
    assert!(parsed.is_valid());
    assert_eq!(parsed.payload, payload);
    assert_eq!(parsed.to_compact().unwrap(), jws);

    let session = Session {
        user: "alice".into(),
        token: Token::new(payload.clone()),
    };
    let json = serde_json::to_string(&session).unwrap();
    assert!(json.contains(&format!(r#""token":"{jws}""#)));
    let restored: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.user, "alice");
    assert!(restored.token.is_valid());
    assert_eq!(restored.token.payload, payload);

    assert_eq!("test".parse::<Token>(), Err(JoseError::SectionCount(1)));
    assert!(serde_json::from_str::<Session>(r#"{"user":"a","token":"test"}"#).is_err());
}

fn flip(section: &str, bit: usize) -> String {
    let mut bytes = URL_SAFE_NO_PAD.decode(section).unwrap();
    let index = (bit / 8) % bytes.len();
    bytes[index] ^= 1 << (bit % 8);
    URL_SAFE_NO_PAD.encode(bytes)
}

static HMAC_REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let (provider, _) = HmacProvider::generate(HmacAlgorithm::Hs256).unwrap();
    registry_with("HS256", provider)
});

static ECDSA_REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let (provider, _) = EcdsaProvider::generate(EcdsaAlgorithm::Es256).unwrap();
    registry_with("ES256", provider)
});

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_flipped_payload_bit_is_detected(payload in "[a-z]{1,32}", bit in 0usize..256, ecdsa in any::<bool>()) {
        let registry: &Registry = if ecdsa { &ECDSA_REGISTRY } else { &HMAC_REGISTRY };
        let jws = registry.encode(&Token::new(payload.into_bytes())).unwrap();
        let parts: Vec<&str> = jws.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], flip(parts[1], bit), parts[2]);
        let token = registry.decode(&tampered).unwrap();
        prop_assert_eq!(token.validity(), &Validity::Invalid(JoseError::InvalidSignature));
    }

    #[test]
    fn test_flipped_signature_bit_is_detected(bit in 0usize..512, ecdsa in any::<bool>()) {
        let registry: &Registry = if ecdsa { &ECDSA_REGISTRY } else { &HMAC_REGISTRY };
        let jws = registry.encode(&Token::new(b"{}".to_vec())).unwrap();
        let (input, signature) = jws.rsplit_once('.').unwrap();
        let tampered = format!("{input}.{}", flip(signature, bit));
        let token = registry.decode(&tampered).unwrap();
        prop_assert_eq!(token.validity(), &Validity::Invalid(JoseError::InvalidSignature));
    }
}
