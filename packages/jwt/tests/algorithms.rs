//! Signing, verification and key family enforcement across all algorithms

use once_cell::sync::Lazy;
use rsa::rand_core::OsRng;
use rsa::RsaPrivateKey;
use tokenward_jwt::{Algorithm, JwtError, Key, KeyFamily};

static RSA_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("rsa key generation"));

const DATA: &[u8] = b"eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ0ZXN0In0";

fn rsa_private() -> Key {
    Key::from(RSA_KEY.clone())
}

fn ecdsa_private(alg: Algorithm) -> Key {
    match alg {
        Algorithm::ES256 => Key::from(p256::ecdsa::SigningKey::random(&mut OsRng)),
        Algorithm::ES384 => Key::from(p384::ecdsa::SigningKey::random(&mut OsRng)),
        Algorithm::ES512 => Key::from(p521::ecdsa::SigningKey::random(&mut OsRng)),
        other => panic!("{other} is not an ECDSA algorithm"),
    }
}

/// A signing key of the family `alg` requires
fn matching_key(alg: Algorithm) -> Key {
    match alg.key_family() {
        KeyFamily::None => Key::none(),
        KeyFamily::Symmetric => Key::symmetric("a shared secret of reasonable length"),
        KeyFamily::Rsa => rsa_private(),
        KeyFamily::Ecdsa => ecdsa_private(alg),
    }
}

fn flip_bit(signature: &[u8], bit: usize) -> Vec<u8> {
    let mut tampered = signature.to_vec();
    tampered[bit / 8] ^= 1 << (bit % 8);
    tampered
}

#[test]
fn every_algorithm_signs_and_verifies() {
    for alg in Algorithm::ALL {
        let key = matching_key(alg);
        let signature = alg.sign(DATA, &key).unwrap();
        assert_eq!(alg.verify(DATA, &signature, &key), Ok(()), "{alg} with private key");
        assert_eq!(
            alg.verify(DATA, &signature, &key.public_key()),
            Ok(()),
            "{alg} with public key"
        );
    }
}

#[test]
fn signature_widths() {
    let hs = Algorithm::HS384.sign(DATA, &matching_key(Algorithm::HS384)).unwrap();
    assert_eq!(hs.len(), 48);
    let rs = Algorithm::RS256.sign(DATA, &rsa_private()).unwrap();
    assert_eq!(rs.len(), 256);
    for (alg, width) in [(Algorithm::ES256, 64), (Algorithm::ES384, 96), (Algorithm::ES512, 132)] {
        let signature = alg.sign(DATA, &ecdsa_private(alg)).unwrap();
        assert_eq!(signature.len(), width, "{alg}");
    }
}

#[test]
fn deterministic_schemes_repeat_signatures() {
    for alg in [Algorithm::HS256, Algorithm::RS512] {
        let key = matching_key(alg);
        assert_eq!(alg.sign(DATA, &key).unwrap(), alg.sign(DATA, &key).unwrap());
    }
}

#[test]
fn flipped_signature_bits_are_rejected() {
    for alg in Algorithm::ALL.into_iter().filter(|a| *a != Algorithm::NONE) {
        let key = matching_key(alg);
        let signature = alg.sign(DATA, &key).unwrap();
        for bit in [0, 7, signature.len() * 4, signature.len() * 8 - 1] {
            assert_eq!(
                alg.verify(DATA, &flip_bit(&signature, bit), &key),
                Err(JwtError::SignatureInvalid),
                "{alg} bit {bit}"
            );
        }
    }
}

#[test]
fn altered_data_is_rejected() {
    for alg in [Algorithm::HS512, Algorithm::PS256, Algorithm::ES384] {
        let key = matching_key(alg);
        let signature = alg.sign(DATA, &key).unwrap();
        assert_eq!(
            alg.verify(b"something else", &signature, &key),
            Err(JwtError::SignatureInvalid)
        );
    }
}

#[test]
fn truncated_signatures_are_invalid_not_mismatched() {
    let key = matching_key(Algorithm::ES256);
    let signature = Algorithm::ES256.sign(DATA, &key).unwrap();
    assert_eq!(
        Algorithm::ES256.verify(DATA, &signature[..10], &key),
        Err(JwtError::SignatureInvalid)
    );
    assert_eq!(Algorithm::RS256.verify(DATA, b"", &rsa_private()), Err(JwtError::SignatureInvalid));
}

#[test]
fn foreign_families_are_rejected_on_both_paths() {
    let keys = [
        Key::none(),
        Key::symmetric("secret"),
        rsa_private(),
        ecdsa_private(Algorithm::ES256),
    ];
    for alg in Algorithm::ALL {
        for key in keys.iter().filter(|k| k.family() != alg.key_family()) {
            assert!(
                matches!(alg.sign(DATA, key), Err(JwtError::AlgorithmKeyMismatch { .. })),
                "sign {alg} with {key:?}"
            );
            assert!(
                matches!(alg.verify(DATA, b"sig", key), Err(JwtError::AlgorithmKeyMismatch { .. })),
                "verify {alg} with {key:?}"
            );
        }
    }
}

#[test]
fn none_accepts_only_empty_key_and_signature() {
    assert_eq!(Algorithm::NONE.sign(DATA, &Key::none()), Ok(Vec::new()));
    assert_eq!(Algorithm::NONE.verify(DATA, &[], &Key::none()), Ok(()));
    assert!(matches!(
        Algorithm::NONE.verify(DATA, b"x", &Key::none()),
        Err(JwtError::AlgorithmKeyMismatch { algorithm: Algorithm::NONE, .. })
    ));
    assert!(matches!(
        Algorithm::NONE.verify(DATA, &[], &Key::symmetric("secret")),
        Err(JwtError::AlgorithmKeyMismatch { algorithm: Algorithm::NONE, .. })
    ));
}

#[test]
fn ecdsa_curve_must_follow_digest() {
    let p384 = ecdsa_private(Algorithm::ES384);
    assert_eq!(
        Algorithm::ES256.sign(DATA, &p384),
        Err(JwtError::mismatch(Algorithm::ES256, "ECDSA P-384 private key"))
    );
    let signature = Algorithm::ES384.sign(DATA, &p384).unwrap();
    assert!(matches!(
        Algorithm::ES512.verify(DATA, &signature, &p384.public_key()),
        Err(JwtError::AlgorithmKeyMismatch { .. })
    ));
}

#[test]
fn public_keys_cannot_sign() {
    let public = rsa_private().public_key();
    assert_eq!(
        Algorithm::RS256.sign(DATA, &public),
        Err(JwtError::mismatch(Algorithm::RS256, "RSA public key"))
    );
    let public = ecdsa_private(Algorithm::ES256).public_key();
    assert!(matches!(
        Algorithm::ES256.sign(DATA, &public),
        Err(JwtError::AlgorithmKeyMismatch { .. })
    ));
}

#[test]
fn pkcs1_and_pss_signatures_do_not_cross_verify() {
    let key = rsa_private();
    let pkcs1 = Algorithm::RS256.sign(DATA, &key).unwrap();
    assert_eq!(Algorithm::PS256.verify(DATA, &pkcs1, &key), Err(JwtError::SignatureInvalid));
    let pss = Algorithm::PS256.sign(DATA, &key).unwrap();
    assert_eq!(Algorithm::RS256.verify(DATA, &pss, &key), Err(JwtError::SignatureInvalid));
}

#[test]
fn hmac_secret_must_match() {
    let signature = Algorithm::HS256.sign(DATA, &Key::symmetric("one")).unwrap();
    assert_eq!(
        Algorithm::HS256.verify(DATA, &signature, &Key::symmetric("two")),
        Err(JwtError::SignatureInvalid)
    );
}
