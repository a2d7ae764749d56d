//! RSA signing: PKCS#1 v1.5 (RS*) and PSS (PS*)
//!
//! PSS signatures use a salt as long as the digest, matching RFC 7518.

use super::HashFunction;
use crate::error::{JwtError, JwtResult};
use rsa::rand_core::OsRng;
use rsa::sha2::{Sha256, Sha384, Sha512};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier};
use rsa::{pkcs1v15, pss, RsaPrivateKey, RsaPublicKey};

pub(crate) fn sign_pkcs1v15(
    hash: HashFunction,
    data: &[u8],
    key: &RsaPrivateKey,
) -> JwtResult<Vec<u8>> {
    let key = key.clone();
    let signature = match hash {
        HashFunction::Sha256 => pkcs1v15::SigningKey::<Sha256>::new(key).try_sign(data),
        HashFunction::Sha384 => pkcs1v15::SigningKey::<Sha384>::new(key).try_sign(data),
        HashFunction::Sha512 => pkcs1v15::SigningKey::<Sha512>::new(key).try_sign(data),
    }
    .map_err(|e| JwtError::signing(format!("RSA PKCS#1 v1.5: {e}")))?;
    Ok(signature.to_vec())
}

pub(crate) fn verify_pkcs1v15(
    hash: HashFunction,
    data: &[u8],
    signature: &[u8],
    key: &RsaPublicKey,
) -> JwtResult<()> {
    let signature =
        pkcs1v15::Signature::try_from(signature).map_err(|_| JwtError::SignatureInvalid)?;
    let key = key.clone();
    match hash {
        HashFunction::Sha256 => {
            pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(data, &signature)
        }
        HashFunction::Sha384 => {
            pkcs1v15::VerifyingKey::<Sha384>::new(key).verify(data, &signature)
        }
        HashFunction::Sha512 => {
            pkcs1v15::VerifyingKey::<Sha512>::new(key).verify(data, &signature)
        }
    }
    .map_err(|_| JwtError::SignatureInvalid)
}

pub(crate) fn sign_pss(
    hash: HashFunction,
    data: &[u8],
    key: &RsaPrivateKey,
) -> JwtResult<Vec<u8>> {
    let mut rng = OsRng;
    let key = key.clone();
    let signature = match hash {
        HashFunction::Sha256 => {
            pss::BlindedSigningKey::<Sha256>::new(key).try_sign_with_rng(&mut rng, data)
        }
        HashFunction::Sha384 => {
            pss::BlindedSigningKey::<Sha384>::new(key).try_sign_with_rng(&mut rng, data)
        }
        HashFunction::Sha512 => {
            pss::BlindedSigningKey::<Sha512>::new(key).try_sign_with_rng(&mut rng, data)
        }
    }
    .map_err(|e| JwtError::signing(format!("RSA PSS: {e}")))?;
    Ok(signature.to_vec())
}

pub(crate) fn verify_pss(
    hash: HashFunction,
    data: &[u8],
    signature: &[u8],
    key: &RsaPublicKey,
) -> JwtResult<()> {
    let signature = pss::Signature::try_from(signature).map_err(|_| JwtError::SignatureInvalid)?;
    let key = key.clone();
    match hash {
        HashFunction::Sha256 => pss::VerifyingKey::<Sha256>::new(key).verify(data, &signature),
        HashFunction::Sha384 => pss::VerifyingKey::<Sha384>::new(key).verify(data, &signature),
        HashFunction::Sha512 => pss::VerifyingKey::<Sha512>::new(key).verify(data, &signature),
    }
    .map_err(|_| JwtError::SignatureInvalid)
}
