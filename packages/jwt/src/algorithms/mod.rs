//! JWT signing algorithms
//!
//! [`Algorithm`] maps an identifier from the `alg` header onto a signing
//! procedure and the [`KeyFamily`] it accepts. The family check runs before
//! any cryptographic work, identically on the signing and verifying paths, so
//! a mismatched key never reaches a primitive.

mod ecdsa;
mod hmac;
mod rsa;
pub(crate) mod utils;

use crate::error::{JwtError, JwtResult};
use crate::keys::{Curve, Key, KeyFamily};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Digest paired with an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HashFunction {
    Sha256,
    Sha384,
    Sha512,
}

/// Signature procedure of an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Unsecured token, empty signature
    None,
    /// HMAC over a shared secret
    Hmac,
    /// RSASSA-PKCS1-v1_5
    RsaPkcs1,
    /// RSASSA-PSS with salt length equal to the digest size
    RsaPss,
    /// ECDSA on the curve implied by the digest
    Ecdsa,
}

/// Algorithm identifier of a JSON Web Token
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Unsecured, no signature
    NONE,
    /// HMAC with SHA-256
    HS256,
    /// HMAC with SHA-384
    HS384,
    /// HMAC with SHA-512
    HS512,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 with SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 with SHA-512
    RS512,
    /// RSASSA-PSS with SHA-256
    PS256,
    /// RSASSA-PSS with SHA-384
    PS384,
    /// RSASSA-PSS with SHA-512
    PS512,
    /// ECDSA on P-256 with SHA-256
    ES256,
    /// ECDSA on P-384 with SHA-384
    ES384,
    /// ECDSA on P-521 with SHA-512
    ES512,
}

impl Algorithm {
    /// Every supported algorithm
    pub const ALL: [Algorithm; 13] = [
        Algorithm::NONE,
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::PS256,
        Algorithm::PS384,
        Algorithm::PS512,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::ES512,
    ];

    /// Identifier as written into the `alg` header
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Algorithm::NONE => "none",
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
            Algorithm::PS256 => "PS256",
            Algorithm::PS384 => "PS384",
            Algorithm::PS512 => "PS512",
            Algorithm::ES256 => "ES256",
            Algorithm::ES384 => "ES384",
            Algorithm::ES512 => "ES512",
        }
    }

    /// Signature procedure
    #[must_use]
    pub const fn scheme(self) -> Scheme {
        match self {
            Algorithm::NONE => Scheme::None,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Scheme::Hmac,
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => Scheme::RsaPkcs1,
            Algorithm::PS256 | Algorithm::PS384 | Algorithm::PS512 => Scheme::RsaPss,
            Algorithm::ES256 | Algorithm::ES384 | Algorithm::ES512 => Scheme::Ecdsa,
        }
    }

    /// Digest width in bits, `None` for `NONE`
    #[must_use]
    pub const fn hash_size(self) -> Option<u16> {
        match self.hash() {
            Some(HashFunction::Sha256) => Some(256),
            Some(HashFunction::Sha384) => Some(384),
            Some(HashFunction::Sha512) => Some(512),
            None => None,
        }
    }

    /// Key family this algorithm accepts
    #[must_use]
    pub const fn key_family(self) -> KeyFamily {
        match self.scheme() {
            Scheme::None => KeyFamily::None,
            Scheme::Hmac => KeyFamily::Symmetric,
            Scheme::RsaPkcs1 | Scheme::RsaPss => KeyFamily::Rsa,
            Scheme::Ecdsa => KeyFamily::Ecdsa,
        }
    }

    const fn hash(self) -> Option<HashFunction> {
        match self {
            Algorithm::NONE => None,
            Algorithm::HS256 | Algorithm::RS256 | Algorithm::PS256 | Algorithm::ES256 => {
                Some(HashFunction::Sha256)
            }
            Algorithm::HS384 | Algorithm::RS384 | Algorithm::PS384 | Algorithm::ES384 => {
                Some(HashFunction::Sha384)
            }
            Algorithm::HS512 | Algorithm::RS512 | Algorithm::PS512 | Algorithm::ES512 => {
                Some(HashFunction::Sha512)
            }
        }
    }

    const fn curve(self) -> Option<Curve> {
        match self {
            Algorithm::ES256 => Some(Curve::P256),
            Algorithm::ES384 => Some(Curve::P384),
            Algorithm::ES512 => Some(Curve::P521),
            _ => None,
        }
    }

    /// Shared compatibility check of the signing and verifying paths
    fn check_key(self, key: &Key, signing: bool) -> JwtResult<()> {
        let mismatch = || JwtError::mismatch(self, key.kind());
        if key.family() != self.key_family() {
            return Err(mismatch());
        }
        if signing && !key.can_sign() {
            return Err(mismatch());
        }
        let curve = match key {
            Key::EcdsaPrivate(k) => Some(k.curve()),
            Key::EcdsaPublic(k) => Some(k.curve()),
            _ => None,
        };
        if curve.is_some() && curve != self.curve() {
            return Err(mismatch());
        }
        Ok(())
    }

    /// Sign `data` with `key`
    ///
    /// # Errors
    /// Returns [`JwtError::AlgorithmKeyMismatch`] if the key does not belong
    /// to this algorithm's family, or cannot sign.
    pub fn sign(self, data: &[u8], key: &Key) -> JwtResult<Vec<u8>> {
        self.check_key(key, true)?;
        match (self.scheme(), self.hash(), key) {
            (Scheme::None, _, Key::Empty) => Ok(Vec::new()),
            (Scheme::Hmac, Some(hash), Key::Symmetric(secret)) => hmac::sign(hash, data, secret),
            (Scheme::RsaPkcs1, Some(hash), Key::RsaPrivate(k)) => rsa::sign_pkcs1v15(hash, data, k),
            (Scheme::RsaPss, Some(hash), Key::RsaPrivate(k)) => rsa::sign_pss(hash, data, k),
            (Scheme::Ecdsa, Some(_), Key::EcdsaPrivate(k)) => ecdsa::sign(data, k),
            _ => Err(JwtError::mismatch(self, key.kind())),
        }
    }

    /// Verify `signature` over `data` with `key`
    ///
    /// Private asymmetric keys are accepted and reduced to their public half.
    ///
    /// # Errors
    /// Returns [`JwtError::AlgorithmKeyMismatch`] on a family mismatch and
    /// [`JwtError::SignatureInvalid`] if the signature does not match.
    pub fn verify(self, data: &[u8], signature: &[u8], key: &Key) -> JwtResult<()> {
        self.check_key(key, false)?;
        let key = key.public_key();
        match (self.scheme(), self.hash(), &key) {
            (Scheme::None, _, Key::Empty) if signature.is_empty() => Ok(()),
            (Scheme::None, _, Key::Empty) => Err(JwtError::mismatch(self, "non-empty signature")),
            (Scheme::Hmac, Some(hash), Key::Symmetric(secret)) => {
                hmac::verify(hash, data, signature, secret)
            }
            (Scheme::RsaPkcs1, Some(hash), Key::RsaPublic(k)) => {
                rsa::verify_pkcs1v15(hash, data, signature, k)
            }
            (Scheme::RsaPss, Some(hash), Key::RsaPublic(k)) => {
                rsa::verify_pss(hash, data, signature, k)
            }
            (Scheme::Ecdsa, Some(_), Key::EcdsaPublic(k)) => ecdsa::verify(data, signature, k),
            _ => Err(JwtError::mismatch(self, key.kind())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| JwtError::UnknownAlgorithm(s.to_string()))
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
