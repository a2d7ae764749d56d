//! HMAC-SHA2 signing for HS256, HS384 and HS512

use super::utils::constant_time_eq;
use super::HashFunction;
use crate::error::{JwtError, JwtResult};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

macro_rules! mac {
    ($mac:ty, $secret:expr, $data:expr) => {{
        let mut mac = <$mac>::new_from_slice($secret)
            .map_err(|_| JwtError::invalid_key("invalid HMAC key"))?;
        mac.update($data);
        mac.finalize().into_bytes().to_vec()
    }};
}

pub(crate) fn sign(hash: HashFunction, data: &[u8], secret: &[u8]) -> JwtResult<Vec<u8>> {
    Ok(match hash {
        HashFunction::Sha256 => mac!(HmacSha256, secret, data),
        HashFunction::Sha384 => mac!(HmacSha384, secret, data),
        HashFunction::Sha512 => mac!(HmacSha512, secret, data),
    })
}

/// HMAC is deterministic, so the signature is recomputed and compared in
/// constant time.
pub(crate) fn verify(
    hash: HashFunction,
    data: &[u8],
    signature: &[u8],
    secret: &[u8],
) -> JwtResult<()> {
    let expected = sign(hash, data, secret)?;
    if constant_time_eq(signature, &expected) {
        Ok(())
    } else {
        Err(JwtError::SignatureInvalid)
    }
}
