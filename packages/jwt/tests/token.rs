//! Encoding, decoding and verification of compact tokens

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use proptest::prelude::*;
use rsa::rand_core::OsRng;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use tokenward_jwt::{token, Algorithm, Claims, JwtError, Key, Token};

static RSA_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("rsa key generation"));

const RAW_TOKEN: &str = concat!(
    "eyJhbGciOiJIUzUxMiIsInR5cCI6IkpXVCJ9",
    ".",
    "eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiYWRtaW4iOnRydWUsImlhdCI6MTYwMDAwMDAwMH0",
    ".",
    "P50peTbENKIPw0tjuHLgosFmJRYGTh_kNA9IcyWIoJ39uYMa4JfKYhnQw5mkgSLB2WYVT68QaDeWWErn4lU69g",
);

fn sample_claims() -> Claims {
    let mut claims = Claims::new();
    claims.set_subject("1234567890");
    claims.set_issuer("tokenward");
    claims.set("name", "John Doe");
    claims.set("admin", true);
    claims
}

fn segment(compact: &str, index: usize) -> Value {
    let part = compact.split('.').nth(index).unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(part).unwrap()).unwrap()
}

fn forge(header: &Value, payload: &Value) -> String {
    format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

#[test]
fn decode_foreign_token() {
    let token = Token::decode(RAW_TOKEN).unwrap();
    assert_eq!(token.algorithm(), Algorithm::HS512);
    assert_eq!(token.header().typ.as_deref(), Some("JWT"));
    assert_eq!(token.claims().len(), 4);
    assert_eq!(token.claims().subject().as_deref(), Some("1234567890"));
    assert_eq!(token.claims().get_string("name").as_deref(), Some("John Doe"));
    assert_eq!(token.claims().get_bool("admin"), Some(true));
    assert_eq!(token.claims().issued_at().map(|t| t.timestamp()), Some(1_600_000_000));
    assert_eq!(token.claims().expiration(), None);
    assert_eq!(token.signature().len(), 64);
    assert_eq!(token.as_str(), RAW_TOKEN);
    assert_eq!(token.key().unwrap_err(), JwtError::NoKeyAvailable);
}

#[test]
fn encoded_header_is_canonical() {
    let token =
        Token::encode(sample_claims(), &Key::symmetric("secret"), Algorithm::HS256).unwrap();
    assert_eq!(segment(token.as_str(), 0), json!({"alg": "HS256", "typ": "JWT"}));
    assert_eq!(segment(token.as_str(), 1)["sub"], json!("1234567890"));
    assert!(!token.as_str().contains('='));
    assert_eq!(token.to_string(), token.as_str());
}

#[test]
fn round_trip_every_algorithm() {
    for alg in Algorithm::ALL {
        let key = match alg {
            Algorithm::NONE => Key::none(),
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Key::symmetric("secret"),
            Algorithm::ES256 => Key::from(p256::ecdsa::SigningKey::random(&mut OsRng)),
            Algorithm::ES384 => Key::from(p384::ecdsa::SigningKey::random(&mut OsRng)),
            Algorithm::ES512 => Key::from(p521::ecdsa::SigningKey::random(&mut OsRng)),
            _ => Key::from(RSA_KEY.clone()),
        };
        let token = Token::encode(sample_claims(), &key, alg).unwrap();
        assert!(token.key().is_ok());

        let mut decoded = Token::decode(token.as_str()).unwrap();
        assert_eq!(decoded.algorithm(), alg);
        assert_eq!(decoded.claims(), &sample_claims());
        assert_eq!(decoded, token);

        decoded.verify(&key.public_key()).unwrap();
        assert!(decoded.key().is_ok(), "{alg} key attached after verify");
    }
}

#[test]
fn verify_is_idempotent() {
    let key = Key::symmetric("secret");
    let token = Token::encode(sample_claims(), &key, Algorithm::HS384).unwrap();
    let mut decoded = token::decode(token.as_str()).unwrap();
    decoded.verify(&key).unwrap();
    decoded.verify(&key).unwrap();
    assert_eq!(decoded, token);
}

#[test]
fn failed_verify_attaches_no_key() {
    let token = Token::encode(sample_claims(), &Key::symmetric("right"), Algorithm::HS256).unwrap();
    let mut decoded = Token::decode(token.as_str()).unwrap();
    assert_eq!(decoded.verify(&Key::symmetric("wrong")), Err(JwtError::SignatureInvalid));
    assert_eq!(decoded.key().unwrap_err(), JwtError::NoKeyAvailable);
    assert!(matches!(
        decoded.verify(&Key::none()),
        Err(JwtError::AlgorithmKeyMismatch { .. })
    ));
    assert_eq!(decoded.key().unwrap_err(), JwtError::NoKeyAvailable);
}

#[test]
fn every_flipped_signature_bit_is_detected() {
    let key = Key::symmetric("secret");
    let token = Token::encode(sample_claims(), &key, Algorithm::HS256).unwrap();
    let (input, _) = token.as_str().rsplit_once('.').unwrap();
    for bit in 0..token.signature().len() * 8 {
        let mut signature = token.signature().to_vec();
        signature[bit / 8] ^= 1 << (bit % 8);
        let tampered = format!("{input}.{}", URL_SAFE_NO_PAD.encode(&signature));
        let mut decoded = Token::decode(&tampered).unwrap();
        assert_eq!(decoded.verify(&key), Err(JwtError::SignatureInvalid), "bit {bit}");
    }
}

#[test]
fn swapped_payload_is_detected() {
    let key = Key::symmetric("secret");
    let token = Token::encode(sample_claims(), &key, Algorithm::HS256).unwrap();
    let signature = token.as_str().rsplit('.').next().unwrap();
    let mut claims = sample_claims();
    claims.set("admin", false);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_json().unwrap());
    let header = token.as_str().split('.').next().unwrap();
    let mut forged = Token::decode(&format!("{header}.{payload}.{signature}")).unwrap();
    assert_eq!(forged.verify(&key), Err(JwtError::SignatureInvalid));
}

#[test]
fn unsecured_tokens() {
    let token = Token::encode(sample_claims(), &Key::none(), Algorithm::NONE).unwrap();
    assert!(token.as_str().ends_with('.'));
    let mut decoded = Token::decode(token.as_str()).unwrap();
    decoded.verify(&Key::none()).unwrap();
    assert!(matches!(
        decoded.verify(&Key::symmetric("secret")),
        Err(JwtError::AlgorithmKeyMismatch { .. })
    ));
}

#[test]
fn malformed_input() {
    let cases = [
        "only.two",
        "four.segments.are.wrong",
        "!!!.e30.",
        "e30.!!!.",
        "e30.e30.!!!",
    ];
    for input in cases {
        assert!(
            matches!(Token::decode(input), Err(JwtError::MalformedToken(_))),
            "{input}"
        );
    }

    let header = json!({"alg": "HS256"});
    assert!(matches!(
        Token::decode(&forge(&header, &json!([1, 2, 3]))),
        Err(JwtError::MalformedToken(_))
    ));
    assert!(matches!(
        Token::decode(&forge(&json!("not an object"), &json!({}))),
        Err(JwtError::MalformedToken(_))
    ));
    assert!(matches!(
        Token::decode(&forge(&json!({"typ": "JWT"}), &json!({}))),
        Err(JwtError::MalformedToken(_))
    ));
}

#[test]
fn unknown_algorithm() {
    let compact = forge(&json!({"alg": "HS999", "typ": "JWT"}), &json!({}));
    assert_eq!(
        Token::decode(&compact).unwrap_err(),
        JwtError::UnknownAlgorithm("HS999".to_string())
    );
}

#[test]
fn header_without_type_is_accepted() {
    let compact = forge(&json!({"alg": "none"}), &json!({"sub": "x"}));
    let token = Token::decode(&compact).unwrap();
    assert_eq!(token.algorithm(), Algorithm::NONE);
    assert_eq!(token.header().typ, None);
}

#[test]
fn uninitialised_claims_encode_as_empty_object() {
    let token =
        Token::encode(Claims::default(), &Key::symmetric("secret"), Algorithm::HS256).unwrap();
    assert_eq!(segment(token.as_str(), 1), json!({}));
    assert!(Token::decode(token.as_str()).unwrap().claims().is_empty());
}

#[test]
fn validity_window() {
    let key = Key::symmetric("secret");
    let leeway = Duration::minutes(1);

    let mut claims = Claims::new();
    claims.set_not_before(Utc::now() - Duration::hours(1));
    claims.set_expiration(Utc::now() + Duration::hours(1));
    assert!(Token::encode(claims, &key, Algorithm::HS256).unwrap().is_valid(leeway));

    let mut claims = Claims::new();
    claims.set_not_before(Utc::now() + Duration::hours(1));
    let token = Token::encode(claims, &key, Algorithm::HS256).unwrap();
    assert!(!token.claims().is_already_valid(leeway));
    assert!(!token.is_valid(leeway));

    let mut claims = Claims::new();
    claims.set_expiration(Utc::now() - Duration::hours(1));
    let token = Token::encode(claims, &key, Algorithm::HS256).unwrap();
    assert!(!token.claims().is_still_valid(leeway));
    assert!(!token.is_valid(leeway));

    let fresh = Token::encode(Claims::new(), &key, Algorithm::HS256).unwrap();
    assert!(fresh.is_valid(Duration::zero()));
}

#[test]
fn leeway_absorbs_skew() {
    let mut claims = Claims::new();
    claims.set_expiration(Utc::now() - Duration::seconds(30));
    let token = Token::encode(claims, &Key::symmetric("secret"), Algorithm::HS256).unwrap();
    assert!(!token.is_valid(Duration::zero()));
    assert!(token.is_valid(Duration::minutes(1)));
}

proptest! {
    #[test]
    fn claims_survive_the_codec(
        subject in "[a-zA-Z0-9 ]{0,24}",
        values in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..8),
        flag in any::<bool>(),
    ) {
        let mut claims = Claims::new();
        claims.set_subject(subject);
        claims.set("flag", flag);
        for (name, value) in &values {
            claims.set(format!("x_{name}"), *value);
        }
        let key = Key::symmetric("property");
        let token = Token::encode(claims.clone(), &key, Algorithm::HS512).unwrap();
        let mut decoded = Token::decode(token.as_str()).unwrap();
        prop_assert_eq!(decoded.algorithm(), Algorithm::HS512);
        prop_assert_eq!(decoded.claims(), &claims);
        prop_assert!(decoded.verify(&key).is_ok());
    }
}
