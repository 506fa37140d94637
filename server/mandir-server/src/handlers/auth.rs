//! Authentication endpoints: login and current-user lookup.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::{issue_token, AuthContext};
use crate::server::MandirServer;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    temple_id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    roles: Vec<String>,
    is_active: bool,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_field!(self.email, self.email.contains('@'), "Invalid email format");
        validate_required!(self.password, "Password is required");
        Ok(())
    }
}

/// Authenticated user info
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub user_id: Uuid,
    pub temple_id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
}

/// Login response carrying the bearer token
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(server): State<MandirServer>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    request.validate()?;

    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, temple_id, email, password_hash, name, roles, is_active \
         FROM users WHERE lower(email) = lower($1)",
    )
    .bind(&request.email)
    .fetch_optional(&server.db_pool)
    .await?
    .ok_or_else(|| ApiError::authentication("Invalid email or password"))?;

    if !user.is_active {
        return Err(ApiError::authentication("User account is disabled"));
    }

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| ApiError::internal("Stored password hash is invalid"))?;
    Argon2::default()
        .verify_password(request.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::authentication("Invalid email or password"))?;

    let token = issue_token(
        user.id,
        user.temple_id,
        user.roles.clone(),
        Some(user.email.clone()),
        &server.config.jwt_secret,
        server.config.token_ttl_seconds,
    )?;

    tracing::info!(user_id = %user.id, temple_id = %user.temple_id, "User logged in");

    Ok(Json(api_success(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: server.config.token_ttl_seconds,
        user: UserInfo {
            user_id: user.id,
            temple_id: user.temple_id,
            name: user.name,
            email: user.email,
            roles: user.roles,
        },
    })))
}

/// Current authenticated user, doubles as token validation
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(server): State<MandirServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let name: Option<String> =
        sqlx::query_scalar("SELECT name FROM users WHERE id = $1 AND temple_id = $2")
            .bind(auth.user_id)
            .bind(auth.temple_id)
            .fetch_optional(&server.db_pool)
            .await?;

    Ok(Json(api_success(UserInfo {
        user_id: auth.user_id,
        temple_id: auth.temple_id,
        name: name.unwrap_or_default(),
        email: auth.email.clone().unwrap_or_default(),
        roles: auth.roles,
    })))
}
