use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::MandirServer;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
}

/// Version information
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
}

/// Health check endpoint, also pings the database
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health", body = HealthStatus)
    ),
    tag = "health"
)]
pub async fn health_check(
    State(server): State<MandirServer>,
) -> Result<Json<ApiResponse<HealthStatus>>, ApiError> {
    let database = if server.database.is_healthy().await {
        "up"
    } else {
        "down"
    };

    Ok(Json(api_success(HealthStatus {
        status: "ok".to_string(),
        database: database.to_string(),
    })))
}

/// Version endpoint
#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = 200, description = "Server version", body = VersionInfo)
    ),
    tag = "health"
)]
pub async fn version_info() -> Json<ApiResponse<VersionInfo>> {
    Json(api_success(VersionInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
