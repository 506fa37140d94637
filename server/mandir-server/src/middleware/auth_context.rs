//! Authentication context extraction
//!
//! Extracts the authenticated user from the `Authorization: Bearer <jwt>`
//! header. The token carries the tenant scope (`temple_id`) and role list;
//! every handler receives both through the [`AuthContext`] extractor.

use async_trait::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::MandirServer;

/// Role allowed to cancel journal entries, approve disposals and manage
/// other privileged workflows.
pub const ROLE_ADMIN: &str = "admin";

/// Authentication context extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub temple_id: Uuid,
    pub roles: Vec<String>,
    pub email: Option<String>,
}

impl AuthContext {
    /// Create a new AuthContext (for testing/mocking)
    pub fn new(user_id: Uuid, temple_id: Uuid) -> Self {
        Self {
            user_id,
            temple_id,
            roles: Vec::new(),
            email: None,
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Require a role, 403 otherwise
    pub fn require_role(&self, role: &str) -> Result<(), ApiError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ApiError::authorization(format!(
                "This action requires the '{}' role",
                role
            )))
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: Uuid,
    pub temple_id: Uuid,
    pub roles: Vec<String>,
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a signed access token
pub fn issue_token(
    user_id: Uuid,
    temple_id: Uuid,
    roles: Vec<String>,
    email: Option<String>,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        temple_id,
        roles,
        email,
        iat: now,
        exp: now + ttl_seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("Failed to issue token: {}", e)))
}

/// Validate a token and extract its claims
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            ApiError::authentication("Token has expired")
        }
        _ => ApiError::authentication("Invalid token"),
    })
}

fn extract_bearer(parts: &Parts) -> Result<String, ApiError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::authentication("Missing Authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            ApiError::authentication("Invalid Authorization header format. Expected: Bearer <token>")
        })
        .map(|s| s.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    MandirServer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let server = MandirServer::from_ref(state);
        let token = extract_bearer(parts)?;
        let claims = decode_token(&token, &server.config.jwt_secret)?;

        Ok(AuthContext {
            user_id: claims.sub,
            temple_id: claims.temple_id,
            roles: claims.roles,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let user_id = Uuid::new_v4();
        let temple_id = Uuid::new_v4();
        let token = issue_token(
            user_id,
            temple_id,
            vec!["admin".to_string()],
            Some("priest@example.org".to_string()),
            "test-secret",
            3600,
        )
        .unwrap();

        let claims = decode_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.temple_id, temple_id);
        assert_eq!(claims.roles, vec!["admin".to_string()]);
        assert_eq!(claims.email.as_deref(), Some("priest@example.org"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(Uuid::new_v4(), Uuid::new_v4(), vec![], None, "secret-a", 3600)
            .unwrap();
        assert!(decode_token(&token, "secret-b").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Expired well past the default leeway
        let token =
            issue_token(Uuid::new_v4(), Uuid::new_v4(), vec![], None, "secret", -3600).unwrap();
        let err = decode_token(&token, "secret").unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_require_role() {
        let ctx = AuthContext::new(Uuid::new_v4(), Uuid::new_v4())
            .with_roles(vec!["accountant".to_string()]);
        assert!(ctx.require_role("accountant").is_ok());
        assert!(ctx.require_role(ROLE_ADMIN).is_err());
    }
}
