//! JWT authentication module.
//!
//! Turns an `Authorization: Bearer <token>` header into the explicit
//! [`RequestContext`] every order call takes.
//!
//! ```text
//! Authorization: Bearer eyJhbGciOi...
//!         │
//!         ▼
//! JwtManager::validate (HS256, exp checked)
//!         │
//!         ▼
//! Claims { sub, username, is_staff, iat, exp }
//!         │
//!         ▼
//! Caller(RequestContext { identity: sub, privileged: is_staff })
//! ```

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use storefront_core::RequestContext;

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id, becomes the order owner)
    pub sub: String,

    /// Display name, informational only
    pub username: String,

    /// Staff members see every order and may edit the catalog
    #[serde(default)]
    pub is_staff: bool,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn into_context(self) -> RequestContext {
        RequestContext {
            identity: self.sub,
            privileged: self.is_staff,
        }
    }
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        JwtManager {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Sign a token for a user.
    pub fn issue(&self, sub: &str, username: &str, is_staff: bool) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: sub.to_string(),
            username: username.to_string(),
            is_staff,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError::unauthorized("Invalid or expired token")
        })?;

        if token_data.claims.sub.is_empty() {
            return Err(ApiError::unauthorized("Token has no subject"));
        }

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated caller. Handlers that take this reject anonymous
/// requests with 401.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Expected a Bearer token"))?;

        let claims = state.jwt.validate(token)?;
        Ok(Caller(claims.into_context()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);

        let token = manager.issue("user-1", "alice", false).unwrap();
        let claims = manager.validate(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_staff);
        assert_eq!(claims.exp - claims.iat, 3600);

        let ctx = claims.into_context();
        assert_eq!(ctx, RequestContext::customer("user-1"));
    }

    #[test]
    fn test_staff_claim_grants_privilege() {
        let manager = JwtManager::new("test-secret", 3600);
        let token = manager.issue("admin-1", "root", true).unwrap();

        let ctx = manager.validate(&token).unwrap().into_context();
        assert!(ctx.privileged);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret-a", 3600);
        let verifier = JwtManager::new("secret-b", 3600);

        let token = issuer.issue("user-1", "alice", false).unwrap();
        let err = verifier.validate(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_expired_token_rejected() {
        // well past the default 60s leeway
        let manager = JwtManager::new("test-secret", -3600);
        let token = manager.issue("user-1", "alice", false).unwrap();

        assert!(manager.validate(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("bearer abc"), None);
    }
}
