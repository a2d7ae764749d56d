//! Token codec
//!
//! A [`Token`] is built in one of two ways. [`Token::encode`] signs a claim
//! set and keeps the signing key; [`Token::decode`] parses a compact string
//! without checking anything cryptographic and carries no key until
//! [`Token::verify`] succeeds.

use crate::algorithms::utils::{base64_url_decode, base64_url_encode};
use crate::algorithms::Algorithm;
use crate::claims::Claims;
use crate::error::{JwtError, JwtResult};
use crate::keys::Key;
use crate::types::JwtHeader;
use chrono::Duration;
use std::fmt;

/// Signed JSON Web Token in compact serialization
#[derive(Debug, Clone)]
pub struct Token {
    algorithm: Algorithm,
    header: JwtHeader,
    claims: Claims,
    signature: Vec<u8>,
    compact: String,
    // Length of `header.payload` within `compact`.
    input_len: usize,
    key: Option<Key>,
}

impl Token {
    /// Sign `claims` with `key` using `algorithm`
    ///
    /// # Errors
    /// Returns [`JwtError::ClaimsMarshal`] if the claims cannot be
    /// serialized, or any error of [`Algorithm::sign`].
    pub fn encode(claims: Claims, key: &Key, algorithm: Algorithm) -> JwtResult<Self> {
        let header = JwtHeader::new(algorithm.as_str());
        let header_json =
            serde_json::to_vec(&header).map_err(|e| JwtError::claims_marshal(e.to_string()))?;
        let payload_json = claims.to_json()?;

        let mut compact = base64_url_encode(&header_json);
        compact.push('.');
        compact.push_str(&base64_url_encode(&payload_json));
        let input_len = compact.len();

        let signature = algorithm.sign(compact.as_bytes(), key)?;
        compact.push('.');
        compact.push_str(&base64_url_encode(&signature));

        Ok(Self {
            algorithm,
            header,
            claims,
            signature,
            compact,
            input_len,
            key: Some(key.clone()),
        })
    }

    /// Parse a compact string without verifying it
    ///
    /// # Errors
    /// Returns [`JwtError::MalformedToken`] on a wrong segment count, bad
    /// base64 or bad JSON, and [`JwtError::UnknownAlgorithm`] if the header
    /// names an unsupported algorithm.
    pub fn decode(compact: &str) -> JwtResult<Self> {
        let segments: Vec<&str> = compact.split('.').collect();
        let [header_b64, payload_b64, signature_b64] = segments[..] else {
            return Err(JwtError::malformed(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };

        let header_json = decode_segment("header", header_b64)?;
        let header: JwtHeader = serde_json::from_slice(&header_json)
            .map_err(|e| JwtError::malformed(format!("invalid header JSON: {e}")))?;
        let algorithm: Algorithm = header.alg.parse()?;
        let claims = Claims::from_json(&decode_segment("payload", payload_b64)?)?;
        let signature = decode_segment("signature", signature_b64)?;

        Ok(Self {
            algorithm,
            header,
            claims,
            signature,
            compact: compact.to_string(),
            input_len: header_b64.len() + 1 + payload_b64.len(),
            key: None,
        })
    }

    /// Check the signature against `key` and attach the key on success
    ///
    /// # Errors
    /// Returns any error of [`Algorithm::verify`]; the token is left
    /// unchanged in that case.
    pub fn verify(&mut self, key: &Key) -> JwtResult<()> {
        let input = self.signing_input().as_bytes();
        self.algorithm.verify(input, &self.signature, key)?;
        self.key = Some(key.clone());
        Ok(())
    }

    /// Algorithm used at signing or declared in the header
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Parsed header
    #[must_use]
    pub fn header(&self) -> &JwtHeader {
        &self.header
    }

    /// Claim set of the payload
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Raw signature bytes
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The signed part, `header.payload`
    #[must_use]
    pub fn signing_input(&self) -> &str {
        &self.compact[..self.input_len]
    }

    /// Compact serialization
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.compact
    }

    /// Key the token was encoded or verified with
    ///
    /// # Errors
    /// Returns [`JwtError::NoKeyAvailable`] for a token that was only decoded.
    pub fn key(&self) -> JwtResult<&Key> {
        self.key.as_ref().ok_or(JwtError::NoKeyAvailable)
    }

    /// Whether the claims' time window contains now, widened by `leeway`
    #[must_use]
    pub fn is_valid(&self, leeway: Duration) -> bool {
        self.claims.is_valid(leeway)
    }
}

fn decode_segment(name: &str, segment: &str) -> JwtResult<Vec<u8>> {
    base64_url_decode(segment)
        .map_err(|e| JwtError::malformed(format!("invalid {name} encoding: {e}")))
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.compact == other.compact
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.compact
    }
}

/// Sign `claims` into a new token, see [`Token::encode`]
///
/// # Errors
/// See [`Token::encode`].
pub fn encode(claims: Claims, key: &Key, algorithm: Algorithm) -> JwtResult<Token> {
    Token::encode(claims, key, algorithm)
}

/// Parse a compact string, see [`Token::decode`]
///
/// # Errors
/// See [`Token::decode`].
pub fn decode(compact: &str) -> JwtResult<Token> {
    Token::decode(compact)
}
