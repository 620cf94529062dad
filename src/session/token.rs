//! Signed session-token codec (HS256).
//!
//! Encodes the authenticated identity into a compact, URL-safe JWT and
//! verifies it back. The codec is constructed once from config; secret
//! presence and minimum length are enforced at startup by `Config`, so a
//! codec never signs with an empty or default key.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::clock::now_unix;
use crate::config::Config;
use crate::models::Role;

/// Verified payload of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: user id.
    pub sub: String,
    pub role: Role,
    #[serde(rename = "orgId")]
    pub org_id: String,
    /// Issued-at (unix seconds).
    pub iat: u64,
    /// Expiry (unix seconds).
    pub exp: u64,
}

/// Token decode/encode failures.
///
/// The three decode variants all collapse to Anonymous at the resolver
/// boundary, but stay distinct here so logs can tell a tampered token from
/// a stale one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed session token")]
    Malformed,

    #[error("invalid session token signature")]
    InvalidSignature,

    #[error("session token expired")]
    Expired,

    #[error("token signing failed: {0}")]
    Signing(String),
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    max_age_secs: u64,
    renew_threshold_secs: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &"HS256")
            .field("max_age_secs", &self.max_age_secs)
            .field("renew_threshold_secs", &self.renew_threshold_secs)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(config: &Config) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: an expired token is expired.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.session_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.session_secret.as_bytes()),
            validation,
            max_age_secs: config.session_max_age_secs,
            renew_threshold_secs: config.session_renew_threshold_secs,
        }
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    pub fn renew_threshold_secs(&self) -> u64 {
        self.renew_threshold_secs
    }

    /// Mint a token for the given identity, issued now.
    pub fn encode(&self, user_id: &str, role: Role, org_id: &str) -> Result<String, TokenError> {
        self.encode_at(user_id, role, org_id, now_unix())
    }

    /// Mint a token with an explicit issued-at. Expiry is always
    /// `iat + max_age`; claims are never partially updated.
    pub fn encode_at(
        &self,
        user_id: &str,
        role: Role,
        org_id: &str,
        iat: u64,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims {
            sub: user_id.to_string(),
            role,
            org_id: org_id.to_string(),
            iat,
            exp: iat + self.max_age_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}
