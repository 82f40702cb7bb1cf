//! Token service: issues, verifies and revokes signed session tokens.
//!
//! Lifecycle per token is `issued -> valid -> {expired | revoked}`; once a
//! token is invalid nothing makes it valid again.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::models::RoleType;

pub mod revocation;

pub use revocation::{InMemoryRevocationStore, RevocationError, RevocationStore};

const REVOKED_MARKER: &str = "revoked";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub roles: Vec<RoleType>,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Identity a token is issued for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<RoleType>,
}

impl From<&Claims> for TokenSubject {
    fn from(claims: &Claims) -> Self {
        Self { user_id: claims.sub, email: claims.email.clone(), roles: claims.roles.clone() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token expired")]
    Expired,

    #[error("Token revoked")]
    Revoked,

    #[error("Expected {expected} token, got {found}")]
    WrongType { expected: TokenType, found: TokenType },

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error(transparent)]
    Store(#[from] RevocationError),
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    store: Arc<dyn RevocationStore>,
}

impl TokenService {
    pub fn new(
        secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
        store: Arc<dyn RevocationStore>,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
            store,
        })
    }

    pub fn issue(&self, subject: &TokenSubject, token_type: TokenType, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.user_id,
            email: subject.email.clone(),
            roles: subject.roles.clone(),
            token_type,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn issue_access(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        self.issue(subject, TokenType::Access, self.access_ttl)
    }

    pub fn issue_refresh(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        self.issue(subject, TokenType::Refresh, self.refresh_ttl)
    }

    pub fn issue_pair(&self, subject: &TokenSubject) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(subject)?,
            refresh_token: self.issue_refresh(subject)?,
            token_type: "Bearer",
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// Signature and structure only; expiry and revocation are not checked.
    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Malformed(e.to_string()))
    }

    /// Full check: signature, expiry, type and revocation. The revocation
    /// lookup is bounded by `timeout`.
    pub async fn verify(&self, token: &str, expected: TokenType, timeout: StdDuration) -> Result<Claims, TokenError> {
        let claims = self.decode_claims(token)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        if claims.token_type != expected {
            return Err(TokenError::WrongType { expected, found: claims.token_type });
        }
        if self.is_revoked(token, timeout).await? {
            return Err(TokenError::Revoked);
        }
        Ok(claims)
    }

    /// `true` only for a correctly signed, unexpired, unrevoked token of
    /// either type. A revocation store failure counts as invalid.
    pub async fn validate(&self, token: &str, timeout: StdDuration) -> bool {
        let claims = match self.decode_claims(token) {
            Ok(claims) => claims,
            Err(_) => return false,
        };
        if claims.exp <= Utc::now().timestamp() {
            return false;
        }
        match self.is_revoked(token, timeout).await {
            Ok(revoked) => !revoked,
            Err(e) => {
                warn!("Revocation lookup failed, rejecting token: {}", e);
                false
            }
        }
    }

    /// Records the token as revoked for the rest of its lifetime. Expired or
    /// malformed tokens are ignored.
    pub async fn revoke(&self, token: &str, timeout: StdDuration) -> Result<(), TokenError> {
        let claims = match self.decode_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Ignoring revoke of unparseable token: {}", e);
                return Ok(());
            }
        };
        let Some(ttl) = remaining_lifetime(&claims) else {
            return Ok(());
        };

        let key = revocation_key(token);
        tokio::time::timeout(timeout, self.store.set(&key, REVOKED_MARKER, ttl))
            .await
            .map_err(|_| RevocationError::Timeout)??;
        debug!("Revoked {} token {} for {}s", claims.token_type, claims.jti, ttl.as_secs());
        Ok(())
    }

    /// Exchanges a refresh token for a new pair. The presented token is
    /// revoked with an atomic insert-if-absent, so of several concurrent
    /// exchanges of one token exactly one gets a pair.
    pub async fn refresh(&self, refresh_token: &str, timeout: StdDuration) -> Result<TokenPair, TokenError> {
        let claims = self.verify(refresh_token, TokenType::Refresh, timeout).await?;
        let ttl = remaining_lifetime(&claims).ok_or(TokenError::Expired)?;

        let key = revocation_key(refresh_token);
        let claimed = tokio::time::timeout(timeout, self.store.claim(&key, REVOKED_MARKER, ttl))
            .await
            .map_err(|_| RevocationError::Timeout)??;
        if !claimed {
            warn!("Refresh token {} replayed", claims.jti);
            return Err(TokenError::Revoked);
        }
        self.issue_pair(&TokenSubject::from(&claims))
    }

    pub fn extract_subject(&self, token: &str) -> Result<Uuid, TokenError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    async fn is_revoked(&self, token: &str, timeout: StdDuration) -> Result<bool, TokenError> {
        let key = revocation_key(token);
        let found = tokio::time::timeout(timeout, self.store.exists(&key))
            .await
            .map_err(|_| RevocationError::Timeout)??;
        Ok(found)
    }
}

/// Time left before `exp`, or `None` once the token has expired.
fn remaining_lifetime(claims: &Claims) -> Option<StdDuration> {
    let remaining = claims.exp - Utc::now().timestamp();
    (remaining > 0).then(|| StdDuration::from_secs(remaining as u64))
}

pub fn revocation_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("revoked:{:x}", hasher.finalize())
}
