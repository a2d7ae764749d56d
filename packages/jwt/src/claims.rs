//! JWT claim set
//!
//! [`Claims`] is a string keyed map of JSON values with typed accessors and
//! helpers for the registered claims. A default constructed set is
//! *uninitialised*: it reads as empty and silently ignores mutation, so a
//! token without a payload never faults. Use [`Claims::new`] for a writable
//! set.

use crate::error::{JwtError, JwtResult};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Audience claim name
pub const AUDIENCE: &str = "aud";
/// Expiration time claim name
pub const EXPIRATION: &str = "exp";
/// JWT ID claim name
pub const IDENTIFIER: &str = "jti";
/// Issued-at claim name
pub const ISSUED_AT: &str = "iat";
/// Issuer claim name
pub const ISSUER: &str = "iss";
/// Not-before claim name
pub const NOT_BEFORE: &str = "nbf";
/// Subject claim name
pub const SUBJECT: &str = "sub";

/// Claim set carried as a token payload
#[derive(Debug, Clone, Default)]
pub struct Claims {
    values: Option<Map<String, Value>>,
}

impl Claims {
    /// Create an empty, writable claim set
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Some(Map::new()),
        }
    }

    /// Number of claims
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.as_ref().map_or(0, Map::len)
    }

    /// Whether no claim is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the claim set was created writable
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.values.is_some()
    }

    /// Whether `key` is set
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.as_ref().is_some_and(|m| m.contains_key(key))
    }

    /// Raw value of `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.as_ref()?.get(key)
    }

    /// Set `key`, returning the previous value
    ///
    /// A no-op returning `None` on an uninitialised set.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.as_mut()?.insert(key.into(), value.into())
    }

    /// Remove `key`, returning the previous value
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.values.as_mut()?.remove(key)
    }

    /// Iterate over all claims
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter().flat_map(Map::iter)
    }

    /// Claim as string; scalars are rendered, `null` is absent
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Claim as bool, also accepting `1 t T TRUE true True` and their negations
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => parse_bool(s),
            _ => None,
        }
    }

    /// Claim as integer; floats are truncated, numeric strings parsed
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
            }
            _ => None,
        }
    }

    /// Claim as float; numeric strings parsed
    #[must_use]
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Claim as time, from Unix seconds or an RFC 3339 string
    #[must_use]
    pub fn get_time(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key)? {
            Value::Number(n) => match n.as_i64() {
                Some(secs) => DateTime::from_timestamp(secs, 0),
                None => {
                    let f = n.as_f64()?;
                    let secs = f.floor();
                    let nanos = (((f - secs) * 1e9) as u32).min(999_999_999);
                    let secs = secs as i64;
                    DateTime::from_timestamp(secs, nanos)
                }
            },
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Set `key` to `time` as Unix seconds, returning the previous value
    pub fn set_time(&mut self, key: impl Into<String>, time: DateTime<Utc>) -> Option<Value> {
        self.set(key, time.timestamp())
    }

    /// Deserialize the claim into `T`
    ///
    /// # Errors
    /// Returns [`JwtError::ClaimsMarshal`] if the value does not fit `T`.
    pub fn get_marshalled<T: DeserializeOwned>(&self, key: &str) -> JwtResult<Option<T>> {
        self.get(key)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(|e| JwtError::claims_marshal(format!("claim '{key}': {e}")))
    }

    /// Serialize `value` into the claim, returning the previous value
    ///
    /// # Errors
    /// Returns [`JwtError::ClaimsMarshal`] if `value` is not JSON representable.
    pub fn set_marshalled<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> JwtResult<Option<Value>> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|e| JwtError::claims_marshal(format!("claim '{key}': {e}")))?;
        Ok(self.set(key, value))
    }

    /// Audience, a single string or an array on the wire
    #[must_use]
    pub fn audience(&self) -> Option<Vec<String>> {
        match self.get(AUDIENCE)? {
            Value::String(s) => Some(vec![s.clone()]),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Set the audience, returning the previous one
    pub fn set_audience<I, S>(&mut self, audience: I) -> Option<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let previous = self.audience();
        let audience: Vec<Value> = audience.into_iter().map(|s| Value::String(s.into())).collect();
        self.set(AUDIENCE, audience);
        previous
    }

    /// Remove the audience, returning it
    pub fn delete_audience(&mut self) -> Option<Vec<String>> {
        let previous = self.audience();
        self.delete(AUDIENCE);
        previous
    }

    /// Expiration time
    #[must_use]
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.get_time(EXPIRATION)
    }

    /// Set the expiration time, returning the previous one
    pub fn set_expiration(&mut self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.replace_time(EXPIRATION, time)
    }

    /// Remove the expiration time, returning it
    pub fn delete_expiration(&mut self) -> Option<DateTime<Utc>> {
        self.remove_time(EXPIRATION)
    }

    /// JWT ID
    #[must_use]
    pub fn identifier(&self) -> Option<String> {
        self.get_string(IDENTIFIER)
    }

    /// Set the JWT ID, returning the previous one
    pub fn set_identifier(&mut self, id: impl Into<String>) -> Option<String> {
        self.replace_string(IDENTIFIER, id.into())
    }

    /// Remove the JWT ID, returning it
    pub fn delete_identifier(&mut self) -> Option<String> {
        self.remove_string(IDENTIFIER)
    }

    /// Issued-at time
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.get_time(ISSUED_AT)
    }

    /// Set the issued-at time, returning the previous one
    pub fn set_issued_at(&mut self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.replace_time(ISSUED_AT, time)
    }

    /// Remove the issued-at time, returning it
    pub fn delete_issued_at(&mut self) -> Option<DateTime<Utc>> {
        self.remove_time(ISSUED_AT)
    }

    /// Issuer
    #[must_use]
    pub fn issuer(&self) -> Option<String> {
        self.get_string(ISSUER)
    }

    /// Set the issuer, returning the previous one
    pub fn set_issuer(&mut self, issuer: impl Into<String>) -> Option<String> {
        self.replace_string(ISSUER, issuer.into())
    }

    /// Remove the issuer, returning it
    pub fn delete_issuer(&mut self) -> Option<String> {
        self.remove_string(ISSUER)
    }

    /// Not-before time
    #[must_use]
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.get_time(NOT_BEFORE)
    }

    /// Set the not-before time, returning the previous one
    pub fn set_not_before(&mut self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.replace_time(NOT_BEFORE, time)
    }

    /// Remove the not-before time, returning it
    pub fn delete_not_before(&mut self) -> Option<DateTime<Utc>> {
        self.remove_time(NOT_BEFORE)
    }

    /// Subject
    #[must_use]
    pub fn subject(&self) -> Option<String> {
        self.get_string(SUBJECT)
    }

    /// Set the subject, returning the previous one
    pub fn set_subject(&mut self, subject: impl Into<String>) -> Option<String> {
        self.replace_string(SUBJECT, subject.into())
    }

    /// Remove the subject, returning it
    pub fn delete_subject(&mut self) -> Option<String> {
        self.remove_string(SUBJECT)
    }

    /// Whether `nbf` has been reached, allowing `leeway` of clock skew
    ///
    /// An absent `nbf` is always reached. A present but unreadable `nbf`
    /// never is.
    #[must_use]
    pub fn is_already_valid(&self, leeway: Duration) -> bool {
        if !self.contains(NOT_BEFORE) {
            return true;
        }
        match self.not_before() {
            Some(nbf) => Utc::now().checked_add_signed(leeway).map_or(true, |now| now >= nbf),
            None => false,
        }
    }

    /// Whether `exp` has not passed, allowing `leeway` of clock skew
    ///
    /// An absent `exp` never passes. A present but unreadable `exp` always
    /// has.
    #[must_use]
    pub fn is_still_valid(&self, leeway: Duration) -> bool {
        if !self.contains(EXPIRATION) {
            return true;
        }
        match self.expiration() {
            Some(exp) => Utc::now().checked_sub_signed(leeway).map_or(true, |now| now <= exp),
            None => false,
        }
    }

    /// Both [`Claims::is_already_valid`] and [`Claims::is_still_valid`]
    #[must_use]
    pub fn is_valid(&self, leeway: Duration) -> bool {
        self.is_already_valid(leeway) && self.is_still_valid(leeway)
    }

    /// Serialize as a JSON object
    ///
    /// # Errors
    /// Returns [`JwtError::ClaimsMarshal`] if serialization fails.
    pub fn to_json(&self) -> JwtResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| JwtError::claims_marshal(e.to_string()))
    }

    /// Parse from a JSON object
    ///
    /// # Errors
    /// Returns [`JwtError::MalformedToken`] if `json` is not a JSON object.
    pub fn from_json(json: &[u8]) -> JwtResult<Self> {
        match serde_json::from_slice::<Value>(json) {
            Ok(Value::Object(map)) => Ok(Self { values: Some(map) }),
            Ok(_) => Err(JwtError::malformed("claims are not a JSON object")),
            Err(e) => Err(JwtError::malformed(format!("invalid claims JSON: {e}"))),
        }
    }

    fn replace_time(&mut self, key: &str, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let previous = self.get_time(key);
        self.set_time(key, time);
        previous
    }

    fn remove_time(&mut self, key: &str) -> Option<DateTime<Utc>> {
        let previous = self.get_time(key);
        self.delete(key);
        previous
    }

    fn replace_string(&mut self, key: &str, value: String) -> Option<String> {
        let previous = self.get_string(key);
        self.set(key, value);
        previous
    }

    fn remove_string(&mut self, key: &str) -> Option<String> {
        let previous = self.get_string(key);
        self.delete(key);
        previous
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

// An uninitialised set equals an empty one.
impl PartialEq for Claims {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(values: Map<String, Value>) -> Self {
        Self { values: Some(values) }
    }
}

impl Serialize for Claims {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.values {
            Some(values) => values.serialize(serializer),
            None => Map::new().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Claims {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Claims::from)
    }
}
