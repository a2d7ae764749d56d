//! Key material for signing and verification
//!
//! A [`Key`] is a closed set of variants, each carrying a [`KeyFamily`] tag.
//! Algorithms compare that tag against their own required family before any
//! cryptographic work happens. Keys are always supplied by the caller; this
//! module only wraps them and reads them from PEM.

use crate::error::{JwtError, JwtResult};
use p521::elliptic_curve::sec1::ToEncodedPoint;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use zeroize::Zeroizing;

/// Class of key material an algorithm requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// No key at all, only valid for `NONE`
    None,
    /// Shared secret bytes for HMAC
    Symmetric,
    /// RSA keys, used by both PKCS#1 v1.5 and PSS
    Rsa,
    /// Elliptic curve keys on P-256, P-384 or P-521
    Ecdsa,
}

/// NIST curve of an ECDSA key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256, paired with SHA-256
    P256,
    /// NIST P-384, paired with SHA-384
    P384,
    /// NIST P-521, paired with SHA-512
    P521,
}

/// ECDSA private key on one of the supported curves
#[derive(Clone)]
pub enum EcdsaPrivateKey {
    /// P-256 signing key
    P256(p256::ecdsa::SigningKey),
    /// P-384 signing key
    P384(p384::ecdsa::SigningKey),
    /// P-521 signing key
    P521(p521::ecdsa::SigningKey),
}

/// ECDSA public key on one of the supported curves
#[derive(Clone)]
pub enum EcdsaPublicKey {
    /// P-256 verifying key
    P256(p256::ecdsa::VerifyingKey),
    /// P-384 verifying key
    P384(p384::ecdsa::VerifyingKey),
    /// P-521 verifying key
    P521(p521::ecdsa::VerifyingKey),
}

impl EcdsaPrivateKey {
    /// Curve of this key
    #[must_use]
    pub fn curve(&self) -> Curve {
        match self {
            EcdsaPrivateKey::P256(_) => Curve::P256,
            EcdsaPrivateKey::P384(_) => Curve::P384,
            EcdsaPrivateKey::P521(_) => Curve::P521,
        }
    }

    /// Matching public key
    #[must_use]
    pub fn public_key(&self) -> EcdsaPublicKey {
        match self {
            EcdsaPrivateKey::P256(sk) => EcdsaPublicKey::P256(p256::ecdsa::VerifyingKey::from(sk)),
            EcdsaPrivateKey::P384(sk) => EcdsaPublicKey::P384(p384::ecdsa::VerifyingKey::from(sk)),
            EcdsaPrivateKey::P521(sk) => EcdsaPublicKey::P521(p521::ecdsa::VerifyingKey::from(sk)),
        }
    }
}

impl EcdsaPublicKey {
    /// Curve of this key
    #[must_use]
    pub fn curve(&self) -> Curve {
        match self {
            EcdsaPublicKey::P256(_) => Curve::P256,
            EcdsaPublicKey::P384(_) => Curve::P384,
            EcdsaPublicKey::P521(_) => Curve::P521,
        }
    }
}

/// Key handed to signing and verification
#[derive(Clone)]
pub enum Key {
    /// Empty key for the `NONE` algorithm
    Empty,
    /// Shared HMAC secret
    Symmetric(Zeroizing<Vec<u8>>),
    /// RSA private key, signs RS* and PS*
    RsaPrivate(RsaPrivateKey),
    /// RSA public key, verifies RS* and PS*
    RsaPublic(RsaPublicKey),
    /// ECDSA private key
    EcdsaPrivate(EcdsaPrivateKey),
    /// ECDSA public key
    EcdsaPublic(EcdsaPublicKey),
}

impl Key {
    /// The empty key used with `NONE`
    #[must_use]
    pub fn none() -> Self {
        Key::Empty
    }

    /// Shared secret for the HMAC algorithms
    #[must_use]
    pub fn symmetric(secret: impl AsRef<[u8]>) -> Self {
        Key::Symmetric(Zeroizing::new(secret.as_ref().to_vec()))
    }

    /// Family tag checked against the algorithm
    #[must_use]
    pub fn family(&self) -> KeyFamily {
        match self {
            Key::Empty => KeyFamily::None,
            Key::Symmetric(_) => KeyFamily::Symmetric,
            Key::RsaPrivate(_) | Key::RsaPublic(_) => KeyFamily::Rsa,
            Key::EcdsaPrivate(_) | Key::EcdsaPublic(_) => KeyFamily::Ecdsa,
        }
    }

    /// Short description used in error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Key::Empty => "empty key",
            Key::Symmetric(_) => "symmetric key",
            Key::RsaPrivate(_) => "RSA private key",
            Key::RsaPublic(_) => "RSA public key",
            Key::EcdsaPrivate(EcdsaPrivateKey::P256(_)) => "ECDSA P-256 private key",
            Key::EcdsaPrivate(EcdsaPrivateKey::P384(_)) => "ECDSA P-384 private key",
            Key::EcdsaPrivate(EcdsaPrivateKey::P521(_)) => "ECDSA P-521 private key",
            Key::EcdsaPublic(EcdsaPublicKey::P256(_)) => "ECDSA P-256 public key",
            Key::EcdsaPublic(EcdsaPublicKey::P384(_)) => "ECDSA P-384 public key",
            Key::EcdsaPublic(EcdsaPublicKey::P521(_)) => "ECDSA P-521 public key",
        }
    }

    /// Whether this key can produce signatures
    #[must_use]
    pub fn can_sign(&self) -> bool {
        !matches!(self, Key::RsaPublic(_) | Key::EcdsaPublic(_))
    }

    /// Key usable for verification only
    ///
    /// Private asymmetric keys yield their public half; every other key is
    /// returned unchanged.
    #[must_use]
    pub fn public_key(&self) -> Key {
        match self {
            Key::RsaPrivate(k) => Key::RsaPublic(k.to_public_key()),
            Key::EcdsaPrivate(k) => Key::EcdsaPublic(k.public_key()),
            other => other.clone(),
        }
    }

    /// Read an RSA private key from a PKCS#1 or PKCS#8 PEM block
    ///
    /// # Errors
    /// Returns [`JwtError::InvalidKey`] if the block holds no RSA private key.
    pub fn rsa_private_from_pem(pem: impl AsRef<[u8]>) -> JwtResult<Self> {
        let der = pem_body(pem.as_ref())?;
        RsaPrivateKey::from_pkcs1_der(&der)
            .or_else(|_| RsaPrivateKey::from_pkcs8_der(&der))
            .map(Key::RsaPrivate)
            .map_err(|e| JwtError::invalid_key(format!("not an RSA private key: {e}")))
    }

    /// Read an RSA public key from an SPKI or PKCS#1 PEM block
    ///
    /// # Errors
    /// Returns [`JwtError::InvalidKey`] if the block holds no RSA public key.
    pub fn rsa_public_from_pem(pem: impl AsRef<[u8]>) -> JwtResult<Self> {
        let der = pem_body(pem.as_ref())?;
        RsaPublicKey::from_public_key_der(&der)
            .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
            .map(Key::RsaPublic)
            .map_err(|e| JwtError::invalid_key(format!("not an RSA public key: {e}")))
    }

    /// Read an ECDSA private key from a SEC1 or PKCS#8 PEM block
    ///
    /// The curve is detected from the key itself.
    ///
    /// # Errors
    /// Returns [`JwtError::InvalidKey`] if no supported curve accepts the key.
    pub fn ecdsa_private_from_pem(pem: impl AsRef<[u8]>) -> JwtResult<Self> {
        let der = pem_body(pem.as_ref())?;
        ecdsa_private_from_der(&der)
            .map(Key::EcdsaPrivate)
            .ok_or_else(|| {
                JwtError::invalid_key("not an ECDSA private key on P-256, P-384 or P-521")
            })
    }

    /// Read an ECDSA public key from an SPKI PEM block
    ///
    /// # Errors
    /// Returns [`JwtError::InvalidKey`] if no supported curve accepts the key.
    pub fn ecdsa_public_from_pem(pem: impl AsRef<[u8]>) -> JwtResult<Self> {
        let der = pem_body(pem.as_ref())?;
        ecdsa_public_from_der(&der)
            .map(Key::EcdsaPublic)
            .ok_or_else(|| {
                JwtError::invalid_key("not an ECDSA public key on P-256, P-384 or P-521")
            })
    }
}

// PEM labels in the wild do not reliably describe the body, so only the DER
// content is used.
fn pem_body(input: &[u8]) -> JwtResult<Zeroizing<Vec<u8>>> {
    let block = pem::parse(input).map_err(|e| JwtError::invalid_key(format!("invalid PEM: {e}")))?;
    Ok(Zeroizing::new(block.into_contents()))
}

fn ecdsa_private_from_der(der: &[u8]) -> Option<EcdsaPrivateKey> {
    if let Ok(secret) =
        p256::SecretKey::from_sec1_der(der).or_else(|_| p256::SecretKey::from_pkcs8_der(der))
    {
        return Some(EcdsaPrivateKey::P256(secret.into()));
    }
    if let Ok(secret) =
        p384::SecretKey::from_sec1_der(der).or_else(|_| p384::SecretKey::from_pkcs8_der(der))
    {
        return Some(EcdsaPrivateKey::P384(secret.into()));
    }
    let secret = p521::SecretKey::from_sec1_der(der)
        .or_else(|_| p521::SecretKey::from_pkcs8_der(der))
        .ok()?;
    p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes())
        .ok()
        .map(EcdsaPrivateKey::P521)
}

fn ecdsa_public_from_der(der: &[u8]) -> Option<EcdsaPublicKey> {
    if let Ok(public) = p256::PublicKey::from_public_key_der(der) {
        return Some(EcdsaPublicKey::P256(public.into()));
    }
    if let Ok(public) = p384::PublicKey::from_public_key_der(der) {
        return Some(EcdsaPublicKey::P384(public.into()));
    }
    let public = p521::PublicKey::from_public_key_der(der).ok()?;
    p521::ecdsa::VerifyingKey::from_sec1_bytes(public.to_encoded_point(false).as_bytes())
        .ok()
        .map(EcdsaPublicKey::P521)
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.kind()).finish()
    }
}

impl From<&[u8]> for Key {
    fn from(secret: &[u8]) -> Self {
        Key::symmetric(secret)
    }
}

impl From<Vec<u8>> for Key {
    fn from(secret: Vec<u8>) -> Self {
        Key::Symmetric(Zeroizing::new(secret))
    }
}

impl From<RsaPrivateKey> for Key {
    fn from(key: RsaPrivateKey) -> Self {
        Key::RsaPrivate(key)
    }
}

impl From<RsaPublicKey> for Key {
    fn from(key: RsaPublicKey) -> Self {
        Key::RsaPublic(key)
    }
}

macro_rules! ecdsa_key_from {
    ($($curve:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$curve::ecdsa::SigningKey> for Key {
                fn from(key: $curve::ecdsa::SigningKey) -> Self {
                    Key::EcdsaPrivate(EcdsaPrivateKey::$variant(key))
                }
            }

            impl From<$curve::ecdsa::VerifyingKey> for Key {
                fn from(key: $curve::ecdsa::VerifyingKey) -> Self {
                    Key::EcdsaPublic(EcdsaPublicKey::$variant(key))
                }
            }
        )*
    };
}

ecdsa_key_from!(p256 => P256, p384 => P384, p521 => P521);
