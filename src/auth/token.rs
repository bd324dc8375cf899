//! JWT token issuance and verification
//! Implements the access token + refresh token pattern
//!
//! Tokens are self-contained and never stored server-side: validity is
//! signature plus expiry, nothing else. There is no revocation list, so a
//! leaked token stays usable until it expires. A denylist lookup, if ever
//! needed, belongs in [`TokenService::verify`] after the signature check.

use crate::{auth::role::Role, config::AppConfig, error::AppError};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// What a token may be used for. Signed into every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenPurpose::Access => f.write_str("access"),
            TokenPurpose::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Role at issuance time
    pub role: Role,

    /// Token purpose (access or refresh)
    pub purpose: TokenPurpose,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Token pair returned at login and on every refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Identity recovered from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub identity: String,
    pub role: Role,
    pub purpose: TokenPurpose,
    pub expires_at: DateTime<Utc>,
}

/// Why a token was rejected. Only ever logged; callers collapse every
/// variant into the same unauthenticated outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("expected {expected} token, got {actual}")]
    PurposeMismatch {
        expected: TokenPurpose,
        actual: TokenPurpose,
    },
}

impl From<TokenError> for AppError {
    fn from(_: TokenError) -> Self {
        AppError::Unauthorized
    }
}

/// Token service. Holds only the signing keys and lifetimes, all fixed at
/// construction, so a single instance is shared across every request.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_exp_secs: u64,
    refresh_token_exp_secs: u64,
}

impl TokenService {
    pub fn new(secret: &[u8], access_token_exp_secs: u64, refresh_token_exp_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_token_exp_secs,
            refresh_token_exp_secs,
        }
    }

    /// Create token service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self::new(
            secret.as_bytes(),
            config.security.access_token_exp_secs,
            config.security.refresh_token_exp_secs,
        ))
    }

    /// Issue a short-lived access token
    pub fn issue_access_token(&self, identity: &str, role: Role) -> Result<String, AppError> {
        self.issue_at(identity, role, TokenPurpose::Access, Utc::now())
    }

    /// Issue a long-lived refresh token
    pub fn issue_refresh_token(&self, identity: &str, role: Role) -> Result<String, AppError> {
        self.issue_at(identity, role, TokenPurpose::Refresh, Utc::now())
    }

    /// Issue a fresh access + refresh pair
    pub fn issue_pair(&self, identity: &str, role: Role) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            token: self.issue_access_token(identity, role)?,
            refresh_token: self.issue_refresh_token(identity, role)?,
        })
    }

    pub(crate) fn issue_at(
        &self,
        identity: &str,
        role: Role,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let lifetime = match purpose {
            TokenPurpose::Access => self.access_token_exp_secs,
            TokenPurpose::Refresh => self.refresh_token_exp_secs,
        };
        let expiration = now + Duration::seconds(lifetime as i64);

        let claims = Claims {
            sub: identity.to_string(),
            role,
            purpose,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(%purpose, "Failed to encode token: {:?}", e);
            AppError::Internal(format!("Failed to encode {} token: {}", purpose, e))
        })
    }

    /// Decode a token and check signature, expiry and, when given, purpose.
    pub fn verify(
        &self,
        token: &str,
        expected: Option<TokenPurpose>,
    ) -> Result<VerifiedToken, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?
            .claims;

        if let Some(expected) = expected {
            if claims.purpose != expected {
                return Err(TokenError::PurposeMismatch {
                    expected,
                    actual: claims.purpose,
                });
            }
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(TokenError::Malformed)?;

        Ok(VerifiedToken {
            identity: claims.sub,
            role: claims.role,
            purpose: claims.purpose,
            expires_at,
        })
    }
}
