//! JOSE header of a compact token

use serde::{Deserialize, Serialize};

/// Token type written into every header
pub const TOKEN_TYPE: &str = "JWT";

/// JWT header structure
///
/// Only `alg` is required when parsing; foreign tokens may omit `typ` or
/// carry additional members, which are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Algorithm identifier as written on the wire
    pub alg: String,
    /// Token type, `JWT` for tokens built here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl JwtHeader {
    /// Header for a token signed with `alg`
    #[must_use]
    pub fn new(alg: &str) -> Self {
        Self {
            alg: alg.to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        }
    }
}
