//! ECDSA signing for ES256 (P-256), ES384 (P-384) and ES512 (P-521)
//!
//! Signatures are the fixed-width `r || s` concatenation required by JWS,
//! not ASN.1 DER.

use crate::error::{JwtError, JwtResult};
use crate::keys::{EcdsaPrivateKey, EcdsaPublicKey};
use p256::ecdsa::signature::{Signer, Verifier};

pub(crate) fn sign(data: &[u8], key: &EcdsaPrivateKey) -> JwtResult<Vec<u8>> {
    let signature = match key {
        EcdsaPrivateKey::P256(sk) => {
            Signer::<p256::ecdsa::Signature>::try_sign(sk, data).map(|s| s.to_bytes().to_vec())
        }
        EcdsaPrivateKey::P384(sk) => {
            Signer::<p384::ecdsa::Signature>::try_sign(sk, data).map(|s| s.to_bytes().to_vec())
        }
        EcdsaPrivateKey::P521(sk) => {
            Signer::<p521::ecdsa::Signature>::try_sign(sk, data).map(|s| s.to_bytes().to_vec())
        }
    };
    signature.map_err(|e| JwtError::signing(format!("ECDSA: {e}")))
}

pub(crate) fn verify(data: &[u8], signature: &[u8], key: &EcdsaPublicKey) -> JwtResult<()> {
    let outcome = match key {
        EcdsaPublicKey::P256(vk) => {
            p256::ecdsa::Signature::from_slice(signature).and_then(|s| vk.verify(data, &s))
        }
        EcdsaPublicKey::P384(vk) => {
            p384::ecdsa::Signature::from_slice(signature).and_then(|s| vk.verify(data, &s))
        }
        EcdsaPublicKey::P521(vk) => {
            p521::ecdsa::Signature::from_slice(signature).and_then(|s| vk.verify(data, &s))
        }
    };
    outcome.map_err(|_| JwtError::SignatureInvalid)
}
