//! Session token issuance and verification.
//!
//! Tokens are stateless HS256 JWTs binding the username claim with a
//! bounded lifetime. There is no revocation list; expiry is the only exit.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (username)
    pub sub: String,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
}

/// Session token configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret key for signing
    pub secret: String,

    /// Token lifetime
    pub token_ttl: Duration,
}

impl SessionConfig {
    pub fn new(secret: String, token_ttl_secs: i64) -> Self {
        Self {
            secret,
            token_ttl: Duration::seconds(token_ttl_secs),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string(),
            token_ttl: Duration::hours(1),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session token has expired")]
    Expired,

    #[error("session token signature is invalid")]
    InvalidSignature,

    #[error("session token is malformed")]
    Malformed,

    #[error("failed to sign session token")]
    SigningFailed,
}

/// Issues and verifies session tokens for authenticated users
#[derive(Clone)]
pub struct SessionIssuer {
    config: SessionConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionIssuer {
    /// Create a new issuer with the given configuration
    pub fn new(config: SessionConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a token binding the username claim, expiring after the
    /// configured lifetime
    pub fn issue(&self, username: &str) -> Result<String, SessionError> {
        let now = Utc::now();
        let exp = now + self.config.token_ttl;

        let claims = SessionClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| SessionError::SigningFailed)
    }

    /// Verify a token and return the username it was issued to.
    /// Validation is stateless; no lookup against the user registry.
    pub fn verify(&self, token: &str) -> Result<String, SessionError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        SessionError::InvalidSignature
                    }
                    _ => SessionError::Malformed,
                }
            })?;

        Ok(token_data.claims.sub)
    }
}
