//! JWT error types

use crate::algorithms::Algorithm;

/// JWT operation result type
pub type JwtResult<T> = Result<T, JwtError>;

/// JWT error types
///
/// Every error is returned to the immediate caller. Only
/// [`JwtError::CacheActionTimeout`] is transient; all other variants describe
/// input or configuration that will fail again when retried unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtError {
    /// The key family does not fit the algorithm
    #[error("combination of algorithm {algorithm} and key type {key} is invalid")]
    AlgorithmKeyMismatch {
        /// Algorithm the operation was requested for
        algorithm: Algorithm,
        /// Human readable kind of the supplied key
        key: &'static str,
    },
    /// The signature is well formed but does not match
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// Wrong segment count, bad base64 or bad JSON
    #[error("malformed token: {0}")]
    MalformedToken(String),
    /// The header names an algorithm this crate does not know
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    /// Claims cannot be represented as JSON
    #[error("cannot marshal claims: {0}")]
    ClaimsMarshal(String),
    /// The key of a merely decoded token was requested
    #[error("no key available, only after encoding or verifying")]
    NoKeyAvailable,
    /// The cache coordinator did not answer in time
    #[error("cache action timeout")]
    CacheActionTimeout,
    /// Key material could not be parsed
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// The signing primitive refused the key or input
    #[error("signing failed: {0}")]
    Signing(String),
}

impl JwtError {
    /// Create an algorithm/key mismatch error
    #[inline]
    #[must_use]
    pub fn mismatch(algorithm: Algorithm, key: &'static str) -> Self {
        JwtError::AlgorithmKeyMismatch { algorithm, key }
    }

    /// Create a malformed token error
    #[inline]
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        JwtError::MalformedToken(msg.into())
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        JwtError::InvalidKey(msg.into())
    }

    /// Create a claims marshalling error
    #[inline]
    #[must_use]
    pub fn claims_marshal(msg: impl Into<String>) -> Self {
        JwtError::ClaimsMarshal(msg.into())
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        JwtError::Signing(msg.into())
    }

    /// Whether retrying the same call may succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, JwtError::CacheActionTimeout)
    }
}
