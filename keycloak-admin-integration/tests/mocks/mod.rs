#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, EncodingKey, Header};
use keycloak_admin_integration::{CacheError, CacheStore, InMemoryCacheStore, Token};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const SIGNING_SECRET: &[u8] = b"your-256-bit-secret-your-256-bit-secret";

/// Build an HS256-signed token with the given `jti` and lifetime in seconds
pub fn signed_token(id: &str, expires_in: i64) -> Token {
    let now = chrono::Utc::now().timestamp();
    signed_token_with_claims(json!({
        "jti": id,
        "iat": now,
        "exp": now + expires_in,
    }))
}

pub fn signed_token_with_claims(claims: Value) -> Token {
    let raw = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SIGNING_SECRET),
    )
    .expect("failed to sign test token");
    Token::parse(&raw).expect("failed to parse test token")
}

/// Compact token with an arbitrary header, e.g. an `alg` outside the HMAC/RSA set
pub fn compact_token(header: Value, claims: Value) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode(b"opaque-signature"),
    )
}

/// Keycloak token endpoint response body
pub fn token_response(access: &Token, refresh: Option<&Token>) -> Value {
    let mut body = json!({
        "access_token": access.as_str(),
        "expires_in": 60,
        "refresh_expires_in": 1800,
        "token_type": "Bearer",
        "not-before-policy": 0,
        "session_state": "5d3b9c1e",
        "scope": "profile email",
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh.as_str());
    }
    body
}

/// Cache store that records every call made against it
#[derive(Clone, Default)]
pub struct RecordingCacheStore {
    pub inner: InMemoryCacheStore,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, key: &str) {
        self.calls.lock().unwrap().push(format!("{op}:{key}"));
    }
}

#[async_trait]
impl CacheStore for RecordingCacheStore {
    async fn put(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.record("put", key);
        self.inner.put(key, value).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.record("get", key);
        self.inner.get(key).await
    }

    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        self.record("has", key);
        self.inner.has(key).await
    }

    async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        self.record("forget", key);
        self.inner.forget(key).await
    }
}

/// Cache store whose backend is always down
#[derive(Clone, Default)]
pub struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn put(&self, _key: &str, _value: String) -> Result<(), CacheError> {
        Err(unavailable())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(unavailable())
    }

    async fn has(&self, _key: &str) -> Result<bool, CacheError> {
        Err(unavailable())
    }

    async fn forget(&self, _key: &str) -> Result<bool, CacheError> {
        Err(unavailable())
    }
}

fn unavailable() -> CacheError {
    CacheError::Unavailable {
        message: "Cache connection failed".to_string(),
    }
}

/// Cache store that reports every key as present but evicts before the read
#[derive(Clone, Default)]
pub struct EvictingCacheStore;

#[async_trait]
impl CacheStore for EvictingCacheStore {
    async fn put(&self, _key: &str, _value: String) -> Result<(), CacheError> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn has(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(true)
    }

    async fn forget(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }
}
