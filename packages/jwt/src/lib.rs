//! JSON Web Tokens with a bounded, self-expiring token cache
//!
//! This crate provides:
//! - Signing and verification for `none`, HS*, RS*, PS* and ES* algorithms
//! - Compact encoding and decoding of signed tokens
//! - A claim set with typed access to the registered claims
//! - A coordinator-owned token cache with age, idle and validity expiry
//!
//! ```no_run
//! use tokenward_jwt::{Algorithm, Claims, Key, Token};
//!
//! # fn main() -> tokenward_jwt::JwtResult<()> {
//! let key = Key::symmetric("secret");
//! let mut claims = Claims::new();
//! claims.set_subject("alice");
//!
//! let token = Token::encode(claims, &key, Algorithm::HS256)?;
//! let mut decoded = Token::decode(token.as_str())?;
//! decoded.verify(&key)?;
//! assert_eq!(decoded.claims().subject().as_deref(), Some("alice"));
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod cache;
pub mod claims;
pub mod context;
mod error;
pub mod keys;
pub mod token;
pub mod types;

pub use algorithms::{Algorithm, Scheme};
pub use cache::{Cache, CacheConfig};
pub use claims::Claims;
pub use error::*;
pub use keys::{Curve, EcdsaPrivateKey, EcdsaPublicKey, Key, KeyFamily};
pub use token::Token;
pub use types::*;
