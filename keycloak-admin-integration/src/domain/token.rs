use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::TokenError;

/// A signed token in compact serialization (`header.claims.signature`).
///
/// The original encoding is kept verbatim so that storing and retrieving a
/// token never changes its string form. Parsing does not verify the signature
/// and accepts any header object, whatever its `alg`.
#[derive(Debug, Clone)]
pub struct Token {
    raw: String,
    header: Map<String, Value>,
    claims: Map<String, Value>,
    signature: Vec<u8>,
}

impl Token {
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let segments: Vec<&str> = raw.split('.').collect();
        if segments.len() != 3 {
            return Err(TokenError::MalformedStructure {
                segments: segments.len(),
            });
        }

        let header = decode_object(segments[0])
            .map_err(|reason| TokenError::InvalidHeader { reason })?;
        let claims = decode_object(segments[1])
            .map_err(|reason| TokenError::InvalidClaims { reason })?;

        let signature = decode_segment(segments[2])
            .map_err(|reason| TokenError::InvalidSignature { reason })?;

        Ok(Self {
            raw: raw.to_string(),
            header,
            claims,
            signature,
        })
    }

    /// The compact encoding this token was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    /// `alg` header parameter, if present
    pub fn alg(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    /// `kid` header parameter, if present
    pub fn kid(&self) -> Option<&str> {
        self.header.get("kid").and_then(Value::as_str)
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// `jti` claim
    pub fn id(&self) -> Option<&str> {
        self.claim("jti").and_then(Value::as_str)
    }

    /// `sub` claim
    pub fn subject(&self) -> Option<&str> {
        self.claim("sub").and_then(Value::as_str)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.numeric_date("iat")
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.numeric_date("exp")
    }

    /// Tokens without an `exp` claim never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expiring_within(Duration::zero())
    }

    pub fn is_expiring_within(&self, leeway: Duration) -> bool {
        match self.expires_at() {
            Some(expires_at) => Utc::now() + leeway >= expires_at,
            None => false,
        }
    }

    fn numeric_date(&self, name: &str) -> Option<DateTime<Utc>> {
        let value = self.claim(name)?;
        let seconds = value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.trunc() as i64))?;
        DateTime::from_timestamp(seconds, 0)
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, String> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| e.to_string())
}

fn decode_object(segment: &str) -> Result<Map<String, Value>, String> {
    let bytes = decode_segment(segment)?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Token::parse(s)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Token {}
